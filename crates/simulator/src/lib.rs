//! # TANF Simulator
//!
//! Boundary to the external benefit simulation engine. The engine owns every
//! eligibility and benefit rule; this crate only knows how to hand it a
//! [`Situation`] and read one variable back.
//!
//! ```text
//! Situation ──simulate──> Simulation ──calculate(variable, year)──> f64 | SimulationError
//! ```
//!
//! One [`Simulation`] is created per situation so several variables can be read
//! against the same inputs. Implementations must be stateless across situations.

mod error;
mod policyengine;
pub mod variables;

pub use error::{Result, SimulationError};
pub use policyengine::{PolicyEngineConfig, PolicyEngineSimulator, DEFAULT_BASE_URL};

use async_trait::async_trait;
use tanf_model::Situation;

/// Creates simulations for situations.
pub trait BenefitSimulator: Send + Sync {
    fn simulate(&self, situation: &Situation) -> Result<Box<dyn Simulation>>;
}

/// A situation bound to the engine; each call evaluates one variable for one year.
///
/// Booleans are reported as `1.0` / `0.0`.
#[async_trait]
pub trait Simulation: Send + Sync {
    async fn calculate(&self, variable: &str, year: i32) -> Result<f64>;
}
