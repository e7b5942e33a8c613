//! # TANF Calculator
//!
//! Turns household inputs into benefit estimates by driving an external
//! [`BenefitSimulator`].
//!
//! ## Operations
//!
//! - **evaluate**: one household, primary TANF amount plus optional diagnostics
//!   (breakdown, eligibility barriers, poverty context)
//! - **sweep**: TANF across a range of total income, earned/unearned ratio held fixed
//! - **combined_sweep**: TANF, SNAP, EITC and CTC across a range of total income
//! - **compare_states**: the same household in every supported state, ranked
//! - **compare_scenarios**: two households side by side with a delta
//!
//! ## Failure tiers
//!
//! Only the primary TANF amount is fatal ([`CalculatorError::Simulation`], after the
//! generic-variable fallback). Every other query is soft: an unsupported variable
//! leaves its field out of the result instead of reporting a misleading zero.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tanf_calculator::Calculator;
//! use tanf_model::Household;
//! use tanf_simulator::{PolicyEngineConfig, PolicyEngineSimulator};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let simulator = PolicyEngineSimulator::new(&PolicyEngineConfig::default())?;
//!     let calculator = Calculator::new(Arc::new(simulator));
//!
//!     let mut household = Household::new("CA");
//!     household.num_children = 2;
//!     let result = calculator.evaluate(&household).await?;
//!     println!("{}: ${:.2}/month", result.state_name, result.tanf_monthly);
//!     Ok(())
//! }
//! ```

mod combined;
mod compare;
mod error;
mod evaluate;
pub mod money;
mod parallel;
mod probes;
mod soft;
mod sweep;
mod types;

pub use combined::{programs_available, Program};
pub use compare::rank_states;
pub use error::{CalculatorError, Result};
pub use probes::{Probe, ELIGIBILITY_PROBES};
pub use types::{
    Breakdown, CombinedPoint, EligibilityChecks, EvaluationResult, HouseholdSummary,
    PovertyContext, ScenarioComparison, ScenarioDelta, StateComparison, StateRecord, SweepPoint,
};

use std::sync::Arc;
use tanf_simulator::BenefitSimulator;

pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

#[derive(Debug, Clone, Copy)]
pub struct CalculatorOptions {
    /// Upper bound on sweep points / comparison legs evaluated at the same time.
    pub max_concurrency: usize,
}

impl Default for CalculatorOptions {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

/// Request-scoped entry point. Cloning is cheap; clones share the simulator handle
/// and nothing else.
#[derive(Clone)]
pub struct Calculator {
    simulator: Arc<dyn BenefitSimulator>,
    options: CalculatorOptions,
}

impl Calculator {
    pub fn new(simulator: Arc<dyn BenefitSimulator>) -> Self {
        Self::with_options(simulator, CalculatorOptions::default())
    }

    pub fn with_options(simulator: Arc<dyn BenefitSimulator>, options: CalculatorOptions) -> Self {
        Self { simulator, options }
    }

    pub fn options(&self) -> CalculatorOptions {
        self.options
    }
}
