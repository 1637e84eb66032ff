//! Damped Newton iteration as an explicit state machine.
//!
//! ```text
//! Initialized -> Iterating -> Converged
//!                          -> Diverged
//!                          -> MaxIterReached
//! ```

use crate::error::SolverResult;
use nalgebra::{DMatrix, DVector};
use serde::Serialize;
use tracing::debug;

/// Where a Newton iteration currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NewtonState {
    Initialized,
    Iterating,
    Converged,
    Diverged,
    MaxIterReached,
}

impl NewtonState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            NewtonState::Converged | NewtonState::Diverged | NewtonState::MaxIterReached
        )
    }
}

/// A square nonlinear system `F(x) = 0`.
pub trait NewtonSystem {
    fn residual(&self, x: &DVector<f64>) -> SolverResult<DVector<f64>>;

    fn jacobian(&self, x: &DVector<f64>) -> SolverResult<DMatrix<f64>>;

    /// Merit of a residual for the line search; smaller is better.
    fn merit(&self, residual: &DVector<f64>) -> f64 {
        residual.norm()
    }

    /// Size of an update relative to the convergence tolerances.
    ///
    /// An update with norm at or below 1 ends the iteration as converged.
    fn update_norm(&self, dx: &DVector<f64>) -> f64 {
        dx.amax()
    }
}

/// Iteration limits and damping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewtonSettings {
    pub max_iterations: usize,
    pub divergence_factor: f64,
    pub line_search_beta: f64,
    pub max_line_search_iters: usize,
}

impl Default for NewtonSettings {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            divergence_factor: 1e6,
            line_search_beta: 0.5,
            max_line_search_iters: 20,
        }
    }
}

/// Final iterate and state of a finished run.
#[derive(Debug, Clone)]
pub struct NewtonOutcome {
    pub x: DVector<f64>,
    pub state: NewtonState,
    pub iterations: usize,
    pub update_norm: f64,
}

/// Newton iteration over a borrowed system.
pub struct Newton<'a, S> {
    system: &'a S,
    settings: NewtonSettings,
    x: DVector<f64>,
    state: NewtonState,
    iterations: usize,
    first_update: Option<f64>,
    last_update: f64,
}

impl<'a, S: NewtonSystem> Newton<'a, S> {
    pub fn new(system: &'a S, x0: DVector<f64>, settings: NewtonSettings) -> Self {
        Self {
            system,
            settings,
            x: x0,
            state: NewtonState::Initialized,
            iterations: 0,
            first_update: None,
            last_update: f64::INFINITY,
        }
    }

    pub fn state(&self) -> NewtonState {
        self.state
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Perform one iteration. Terminal states are sticky.
    ///
    /// Errors from the system (residual or Jacobian evaluation) abort the
    /// iteration; numerical failure is reported as a state instead.
    pub fn step(&mut self) -> SolverResult<NewtonState> {
        if self.state.is_terminal() {
            return Ok(self.state);
        }
        if self.iterations >= self.settings.max_iterations {
            self.state = NewtonState::MaxIterReached;
            return Ok(self.state);
        }
        self.state = NewtonState::Iterating;

        let r = self.system.residual(&self.x)?;
        let jac = self.system.jacobian(&self.x)?;
        self.iterations += 1;

        // Solve J * dx = -r
        let Some(dx) = jac.lu().solve(&(-r.clone())) else {
            debug!(iteration = self.iterations, "singular Jacobian");
            self.state = NewtonState::Diverged;
            return Ok(self.state);
        };
        if dx.iter().any(|v| !v.is_finite()) {
            debug!(iteration = self.iterations, "non-finite Newton update");
            self.state = NewtonState::Diverged;
            return Ok(self.state);
        }

        let norm = self.system.update_norm(&dx);
        self.last_update = norm;
        let first = *self.first_update.get_or_insert(norm);

        if norm <= 1.0 {
            self.x += &dx;
            self.state = NewtonState::Converged;
            debug!(iteration = self.iterations, update_norm = norm, "converged");
            return Ok(self.state);
        }
        if !norm.is_finite() || norm > self.settings.divergence_factor * first {
            debug!(
                iteration = self.iterations,
                update_norm = norm,
                first_update = first,
                "update grew past the divergence limit"
            );
            self.state = NewtonState::Diverged;
            return Ok(self.state);
        }

        let alpha = self.line_search(&r, &dx)?;
        self.x.axpy(alpha, &dx, 1.0);
        debug!(iteration = self.iterations, update_norm = norm, alpha, "newton step");

        if self.iterations >= self.settings.max_iterations {
            self.state = NewtonState::MaxIterReached;
        }
        Ok(self.state)
    }

    /// Iterate until a terminal state is reached.
    pub fn run(mut self) -> SolverResult<NewtonOutcome> {
        while !self.step()?.is_terminal() {}
        Ok(NewtonOutcome {
            x: self.x,
            state: self.state,
            iterations: self.iterations,
            update_norm: self.last_update,
        })
    }

    /// Backtrack until the merit decreases; take the full step if it never does.
    fn line_search(&self, r: &DVector<f64>, dx: &DVector<f64>) -> SolverResult<f64> {
        let merit0 = self.system.merit(r);
        let mut alpha = 1.0;
        for _ in 0..=self.settings.max_line_search_iters {
            let trial = &self.x + alpha * dx;
            let merit = self.system.merit(&self.system.residual(&trial)?);
            if merit.is_finite() && merit < merit0 {
                return Ok(alpha);
            }
            alpha *= self.settings.line_search_beta;
        }
        Ok(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// x0^2 - 4 = 0 and x1 - x0 = 0, converged once updates drop below 1e-10.
    struct Quadratic;

    impl NewtonSystem for Quadratic {
        fn residual(&self, x: &DVector<f64>) -> SolverResult<DVector<f64>> {
            Ok(DVector::from_vec(vec![x[0] * x[0] - 4.0, x[1] - x[0]]))
        }

        fn jacobian(&self, x: &DVector<f64>) -> SolverResult<DMatrix<f64>> {
            Ok(DMatrix::from_row_slice(2, 2, &[2.0 * x[0], 0.0, -1.0, 1.0]))
        }

        fn update_norm(&self, dx: &DVector<f64>) -> f64 {
            dx.amax() / 1e-10
        }
    }

    /// Two identical equations: the Jacobian is exactly singular.
    struct Degenerate;

    impl NewtonSystem for Degenerate {
        fn residual(&self, x: &DVector<f64>) -> SolverResult<DVector<f64>> {
            let r = x[0] + x[1] - 2.0;
            Ok(DVector::from_vec(vec![r, r]))
        }

        fn jacobian(&self, _x: &DVector<f64>) -> SolverResult<DMatrix<f64>> {
            Ok(DMatrix::from_element(2, 2, 1.0))
        }
    }

    #[test]
    fn walks_through_states_to_convergence() {
        let mut newton = Newton::new(
            &Quadratic,
            DVector::from_vec(vec![3.0, 0.0]),
            NewtonSettings::default(),
        );
        assert_eq!(newton.state(), NewtonState::Initialized);
        assert_eq!(newton.step().unwrap(), NewtonState::Iterating);

        let outcome = newton.run().unwrap();
        assert_eq!(outcome.state, NewtonState::Converged);
        assert!((outcome.x[0] - 2.0).abs() < 1e-9);
        assert!((outcome.x[1] - 2.0).abs() < 1e-9);
        assert!(outcome.update_norm <= 1.0);
    }

    #[test]
    fn iteration_budget_ends_in_max_iter_reached() {
        let settings = NewtonSettings {
            max_iterations: 2,
            ..NewtonSettings::default()
        };
        let outcome = Newton::new(&Quadratic, DVector::from_vec(vec![50.0, 0.0]), settings)
            .run()
            .unwrap();
        assert_eq!(outcome.state, NewtonState::MaxIterReached);
        assert_eq!(outcome.iterations, 2);
    }

    #[test]
    fn singular_jacobian_diverges() {
        let outcome = Newton::new(
            &Degenerate,
            DVector::from_vec(vec![0.0, 0.0]),
            NewtonSettings::default(),
        )
        .run()
        .unwrap();
        assert_eq!(outcome.state, NewtonState::Diverged);
        assert_eq!(outcome.iterations, 1);
    }

    #[test]
    fn terminal_state_is_sticky() {
        let mut newton = Newton::new(
            &Degenerate,
            DVector::from_vec(vec![0.0, 0.0]),
            NewtonSettings::default(),
        );
        assert_eq!(newton.step().unwrap(), NewtonState::Diverged);
        assert_eq!(newton.step().unwrap(), NewtonState::Diverged);
        assert_eq!(newton.iterations(), 1);
    }
}
