//! Darcy friction factor with laminar/turbulent regime switch.

/// Reynolds number at which the correlation switches from laminar to turbulent.
pub const LAMINAR_LIMIT: f64 = 2300.0;

/// Lower bound applied to the turbulent friction factor.
pub const MIN_FRICTION_FACTOR: f64 = 1e-4;

/// Darcy friction factor and its derivative with respect to the Reynolds number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Friction {
    pub factor: f64,
    pub d_factor_d_re: f64,
}

/// Friction factor for a pipe with relative roughness `rel_roughness = e/d`.
///
/// Laminar (`Re < 2300`): `f = 64/Re`.
/// Turbulent: Swamee-Jain explicit approximation of Colebrook-White.
pub fn darcy(reynolds: f64, rel_roughness: f64) -> Friction {
    if reynolds < LAMINAR_LIMIT {
        let re = reynolds.max(f64::MIN_POSITIVE);
        return Friction {
            factor: 64.0 / re,
            d_factor_d_re: -64.0 / (re * re),
        };
    }

    let a = rel_roughness / 3.7;
    let b = 5.74 / reynolds.powf(0.9);
    let s = a + b;
    let log = s.log10();
    let factor = 0.25 / (log * log);
    if factor < MIN_FRICTION_FACTOR {
        return Friction {
            factor: MIN_FRICTION_FACTOR,
            d_factor_d_re: 0.0,
        };
    }

    // df/dRe = -0.5 / log^3 * (ds/dRe) / (s ln 10), with ds/dRe = -0.9 b / Re
    let ds_dre = -0.9 * b / reynolds;
    let d_factor_d_re = -0.5 / (log * log * log) * ds_dre / (s * std::f64::consts::LN_10);

    Friction {
        factor,
        d_factor_d_re,
    }
}
