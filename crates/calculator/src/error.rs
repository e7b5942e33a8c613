use tanf_model::ValidationError;
use tanf_simulator::SimulationError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CalculatorError>;

#[derive(Error, Debug)]
pub enum CalculatorError {
    /// The primary TANF amount could not be computed, even with the generic variable.
    #[error("TANF simulation failed for {state} ({year}) using '{variable}': {source}")]
    Simulation {
        state: String,
        year: i32,
        variable: String,
        #[source]
        source: SimulationError,
    },

    #[error("Invalid income range: {0}")]
    Range(#[from] ValidationError),

    #[error("Evaluation task failed: {0}")]
    Worker(String),
}
