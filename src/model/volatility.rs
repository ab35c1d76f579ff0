use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use tracing::{trace, warn};

use crate::model::{
    constants::{CONVERGENCE_TOLERANCE, MAX_SOLVER_ITERATIONS},
    error::RatingError
};

/// Competitor state the volatility update depends on. All values are on the internal scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolatilityContext {
    pub volatility: f64,
    pub tau: f64,
    pub rating_deviation: f64,
    pub rating: f64
}

/// Strategy for step 5 of Glicko-2: find the new volatility given the period's
/// estimated variance `v` and estimated improvement `delta`.
pub trait VolatilitySolver {
    fn solve(&self, v: f64, delta: f64, context: &VolatilityContext) -> Result<f64, RatingError>;
}

/// The function whose root is `ln(σ'²)`.
///
/// `f(x) = e^x (Δ² - φ² - v - e^x) / (2 (φ² + v + e^x)²) - (x - a) / τ²`
fn objective(x: f64, v: f64, delta: f64, context: &VolatilityContext) -> f64 {
    let phi_sq = context.rating_deviation.powi(2);
    let a = context.volatility.powi(2).ln();
    let ex = x.exp();
    let d = phi_sq + v + ex;

    ex * (delta.powi(2) - phi_sq - v - ex) / (2.0 * d.powi(2)) - (x - a) / context.tau.powi(2)
}

fn objective_derivative(x: f64, v: f64, delta: f64, context: &VolatilityContext) -> f64 {
    let phi_sq = context.rating_deviation.powi(2);
    let ex = x.exp();
    let d = phi_sq + v + ex;
    let gap = delta.powi(2) - d;

    ex * ((gap - ex) * d - 2.0 * ex * gap) / (2.0 * d.powi(3)) - 1.0 / context.tau.powi(2)
}

fn non_convergence(iterations: u32) -> RatingError {
    warn!(iterations, "volatility solver did not converge");
    RatingError::NonConvergence { iterations }
}

/// The Illinois variant of regula falsi, as described in step 5 of Glickman's
/// Glicko-2 paper.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IllinoisSolver {
    pub tolerance: f64,
    pub max_iterations: u32
}

impl Default for IllinoisSolver {
    fn default() -> Self {
        IllinoisSolver {
            tolerance: CONVERGENCE_TOLERANCE,
            max_iterations: MAX_SOLVER_ITERATIONS
        }
    }
}

impl VolatilitySolver for IllinoisSolver {
    fn solve(&self, v: f64, delta: f64, context: &VolatilityContext) -> Result<f64, RatingError> {
        let f = |x: f64| objective(x, v, delta, context);
        let phi_sq = context.rating_deviation.powi(2);
        let tau = context.tau;

        let mut iterations = 0;

        // Bracket the root
        let mut a = context.volatility.powi(2).ln();
        let mut b = if delta.powi(2) > phi_sq + v {
            (delta.powi(2) - phi_sq - v).ln()
        } else {
            let mut k = 1.0;
            while f(a - k * tau) < 0.0 {
                iterations += 1;
                if iterations > self.max_iterations {
                    return Err(non_convergence(self.max_iterations));
                }
                k += 1.0;
            }
            a - k * tau
        };

        let mut f_a = f(a);
        let mut f_b = f(b);

        while (b - a).abs() > self.tolerance {
            iterations += 1;
            if iterations > self.max_iterations {
                return Err(non_convergence(self.max_iterations));
            }

            let c = a + (a - b) * f_a / (f_b - f_a);
            let f_c = f(c);

            if f_c * f_b <= 0.0 {
                a = b;
                f_a = f_b;
            } else {
                f_a /= 2.0;
            }

            b = c;
            f_b = f_c;

            trace!(iterations, a, b, "illinois step");
        }

        let volatility = (a / 2.0).exp();
        if !volatility.is_finite() || volatility <= 0.0 {
            return Err(non_convergence(iterations));
        }

        Ok(volatility)
    }
}

/// Newton-Raphson iteration on the same objective, started from `ln(σ²)`.
/// Converges quickly for usual values of τ, but unlike the Illinois method it is
/// not guaranteed to stay bracketed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NewtonSolver {
    pub tolerance: f64,
    pub max_iterations: u32
}

impl Default for NewtonSolver {
    fn default() -> Self {
        NewtonSolver {
            tolerance: CONVERGENCE_TOLERANCE,
            max_iterations: MAX_SOLVER_ITERATIONS
        }
    }
}

impl VolatilitySolver for NewtonSolver {
    fn solve(&self, v: f64, delta: f64, context: &VolatilityContext) -> Result<f64, RatingError> {
        let mut x = context.volatility.powi(2).ln();

        for iteration in 1..=self.max_iterations {
            let next = x - objective(x, v, delta, context) / objective_derivative(x, v, delta, context);
            if !next.is_finite() {
                return Err(non_convergence(iteration));
            }

            trace!(iteration, x = next, "newton step");

            if (next - x).abs() < self.tolerance {
                return Ok((next / 2.0).exp());
            }

            x = next;
        }

        Err(non_convergence(self.max_iterations))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum VolatilityAlgorithm {
    #[default]
    Illinois,
    Newton
}

/// A solver picked at runtime from configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnySolver {
    Illinois(IllinoisSolver),
    Newton(NewtonSolver)
}

impl Default for AnySolver {
    fn default() -> Self {
        AnySolver::from(VolatilityAlgorithm::default())
    }
}

impl From<VolatilityAlgorithm> for AnySolver {
    fn from(algorithm: VolatilityAlgorithm) -> Self {
        match algorithm {
            VolatilityAlgorithm::Illinois => AnySolver::Illinois(IllinoisSolver::default()),
            VolatilityAlgorithm::Newton => AnySolver::Newton(NewtonSolver::default())
        }
    }
}

impl VolatilitySolver for AnySolver {
    fn solve(&self, v: f64, delta: f64, context: &VolatilityContext) -> Result<f64, RatingError> {
        match self {
            AnySolver::Illinois(solver) => solver.solve(v, delta, context),
            AnySolver::Newton(solver) => solver.solve(v, delta, context)
        }
    }
}
