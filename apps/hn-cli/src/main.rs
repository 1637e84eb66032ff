use clap::Parser;
use hn_components::{CirculationPump, HeatExchanger, Pipe};
use hn_core::units::{bar, k, kgps, km, m, mm, w};
use hn_solver::{
    Network, NetworkBuilder, SolveMode, SolveResult, SolverConfig, SolverResult, solve_with_config,
};
use tracing::info;

#[derive(Parser)]
#[command(name = "hn-cli")]
#[command(about = "heatnet - solve a four-junction district-heating loop", long_about = None)]
struct Cli {
    /// Pump mass flow [kg/s]
    #[arg(long, default_value_t = 20.0)]
    mdot: f64,
    /// Supply temperature [K]
    #[arg(long, default_value_t = 308.15)]
    supply_k: f64,
    /// Supply pressure [bar]
    #[arg(long, default_value_t = 5.0)]
    supply_bar: f64,
    /// Heat taken by the consumer [W]
    #[arg(long, default_value_t = 100_000.0)]
    duty: f64,
    /// Segments per pipe
    #[arg(long, default_value_t = 5)]
    segments: usize,
    /// Hydraulic/thermal passes with updated fluid properties
    #[arg(long, default_value_t = 1)]
    passes: usize,
    /// Skip the thermal sweep
    #[arg(long)]
    hydraulic_only: bool,
}

fn main() -> SolverResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let network = build_loop(&cli)?;
    info!(
        junctions = network.junction_count(),
        branches = network.branch_count(),
        "network built"
    );

    let mut config = SolverConfig::default();
    config.coupling.max_coupling_passes = cli.passes;
    let mode = if cli.hydraulic_only {
        SolveMode::HydraulicOnly
    } else {
        SolveMode::HydraulicAndThermal
    };

    let result = solve_with_config(&network, mode, &config)?;
    print_junctions(&result);
    print_branches(&result);
    print_segments(&network, &result);
    Ok(())
}

/// Pump, 1 km flow pipe, consumer and 1 km return pipe in a ring.
fn build_loop(cli: &Cli) -> SolverResult<Network> {
    let mut b = NetworkBuilder::new();
    let p0 = bar(cli.supply_bar);
    let t0 = k(cli.supply_k);
    let j: Vec<_> = (0..4).map(|i| b.add_junction(format!("j{i}"), p0, t0)).collect();

    let pipe = Pipe::new(km(1.0), m(0.2), mm(0.1))?
        .with_heat_loss(10.0, k(273.15))?
        .with_segments(cli.segments)?;
    b.add_circulation_pump("pump", j[0], j[1], CirculationPump::new(kgps(cli.mdot), p0, t0)?)?;
    b.add_pipe("flow pipe", j[1], j[2], pipe.clone())?;
    b.add_heat_exchanger(
        "consumer",
        j[2],
        j[3],
        HeatExchanger::new(w(cli.duty), m(0.2))?.with_loss_coefficient(2.0)?,
    )?;
    b.add_pipe("return pipe", j[3], j[0], pipe)?;
    b.build()
}

fn print_junctions(result: &SolveResult) {
    println!("\nJunctions");
    println!("  {:<12} {:>14} {:>10}", "name", "p [bar]", "T [K]");
    for j in result.junctions() {
        println!("  {:<12} {:>14.6} {:>10.3}", j.name, j.p_pa / 1e5, j.t_k);
    }
}

fn print_branches(result: &SolveResult) {
    println!("\nBranches");
    println!(
        "  {:<12} {:<17} {:>9} {:>8} {:>10} {:>10} {:>10} {:>12}",
        "name", "kind", "mdot", "v [m/s]", "Re", "T from", "T to", "Q [W]"
    );
    for b in result.branches() {
        println!(
            "  {:<12} {:<17} {:>9.3} {:>8} {:>10} {:>10.3} {:>10.3} {:>12.1}",
            b.name,
            b.kind.to_string(),
            b.mdot_kg_s,
            b.v_mean_m_s.map_or("-".to_string(), |v| format!("{v:.3}")),
            b.reynolds.map_or("-".to_string(), |re| format!("{re:.0}")),
            b.t_from_k,
            b.t_to_k,
            b.heat_to_fluid_w,
        );
    }
}

fn print_segments(network: &Network, result: &SolveResult) {
    for edge in network.graph().branches() {
        let Some(trace) = result.internal_trace(edge.id) else {
            continue;
        };
        println!("\nSegments of '{}'", edge.name);
        println!(
            "  {:>4} {:>10} {:>14} {:>8} {:>10} {:>12}",
            "#", "x [m]", "p [bar]", "v [m/s]", "T [K]", "loss [W]"
        );
        for s in trace {
            println!(
                "  {:>4} {:>10.1} {:>14.6} {:>8.3} {:>10.3} {:>12.1}",
                s.index,
                s.position_m,
                s.p_pa / 1e5,
                s.v_m_s,
                s.t_k,
                s.heat_loss_w
            );
        }
    }
    let d = result.diagnostics();
    println!(
        "\n{} Newton iterations, {} pass(es), final update norm {:.3e}",
        d.iterations, d.coupling_passes, d.update_norm
    );
}
