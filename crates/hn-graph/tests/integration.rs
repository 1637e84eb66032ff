//! Integration tests for hn-graph.

use hn_core::JunctionId;
use hn_graph::{Direction, GraphBuilder, TopologyError};

#[test]
fn build_minimal_graph() {
    // Build: J1 -> [B1] -> J2
    let mut builder = GraphBuilder::new();
    let j1 = builder.add_junction("Junction1");
    let j2 = builder.add_junction("Junction2");
    let b1 = builder.add_branch("Branch1", j1, j2).unwrap();

    let graph = builder.build().unwrap();

    assert_eq!(graph.junctions().len(), 2);
    assert_eq!(graph.branches().len(), 1);
    assert_eq!(graph.endpoints(b1), Some((j1, j2)));

    let out = graph.incident(j1);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].branch, b1);
    assert_eq!(out[0].direction.sign(), -1.0);

    let inc = graph.incident(j2);
    assert_eq!(inc[0].direction, Direction::Incoming);
}

#[test]
fn district_heating_loop_degrees() {
    // J1 -> pump -> J2 -> hx -> J3 -> pipe -> J4 -> pipe -> J1
    let mut builder = GraphBuilder::new();
    let j: Vec<JunctionId> = (1..=4).map(|i| builder.add_junction(format!("J{i}"))).collect();
    builder.add_branch("pump", j[0], j[1]).unwrap();
    builder.add_branch("hx", j[1], j[2]).unwrap();
    builder.add_branch("pipe 1", j[2], j[3]).unwrap();
    builder.add_branch("pipe 2", j[3], j[0]).unwrap();

    let graph = builder.build().unwrap();

    for &junction in &j {
        assert_eq!(graph.degree(junction), 2);
        // One branch in, one branch out on a simple loop.
        let signs: f64 = graph.incident(junction).iter().map(|i| i.direction.sign()).sum();
        assert_eq!(signs, 0.0);
    }

    let (labels, count) = graph.connected_components();
    assert_eq!(count, 1);
    assert!(labels.iter().all(|&l| l == 0));
}

#[test]
fn parallel_branches_are_allowed() {
    let mut builder = GraphBuilder::new();
    let a = builder.add_junction("A");
    let b = builder.add_junction("B");
    let p1 = builder.add_branch("P1", a, b).unwrap();
    let p2 = builder.add_branch("P2", a, b).unwrap();
    let graph = builder.build().unwrap();

    assert_ne!(p1, p2);
    assert_eq!(graph.degree(a), 2);
    assert_eq!(graph.degree(b), 2);
}

#[test]
fn disjoint_networks_get_distinct_components() {
    let mut builder = GraphBuilder::new();
    let a = builder.add_junction("A");
    let b = builder.add_junction("B");
    let c = builder.add_junction("C");
    let d = builder.add_junction("D");
    let isolated = builder.add_junction("E");
    builder.add_branch("AB", a, b).unwrap();
    builder.add_branch("DC", d, c).unwrap();
    let graph = builder.build().unwrap();

    let (labels, count) = graph.connected_components();
    assert_eq!(count, 3);
    assert_eq!(labels[a.slot()], labels[b.slot()]);
    assert_eq!(labels[c.slot()], labels[d.slot()]);
    assert_ne!(labels[a.slot()], labels[c.slot()]);
    assert_eq!(graph.degree(isolated), 0);
}

#[test]
fn dangling_reference_is_a_topology_error() {
    let mut builder = GraphBuilder::new();
    let a = builder.add_junction("A");
    let err = builder
        .add_branch("bad", JunctionId::from_index(5), a)
        .unwrap_err();
    assert_eq!(
        err,
        TopologyError::UnknownJunction {
            branch: "bad".into(),
            junction: JunctionId::from_index(5),
        }
    );
    assert_eq!(builder.branch_count(), 0);
}

#[test]
fn out_of_range_queries_are_empty() {
    let mut builder = GraphBuilder::new();
    builder.add_junction("A");
    let graph = builder.build().unwrap();
    let bogus = JunctionId::from_index(42);
    assert!(graph.incident(bogus).is_empty());
    assert!(graph.junction(bogus).is_none());
    assert!(graph.endpoints(bogus).is_none());
}
