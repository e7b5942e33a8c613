use thiserror::Error;

pub type Result<T> = std::result::Result<T, SimulationError>;

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("Simulator request for '{variable}' failed: {source}")]
    Transport {
        variable: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Simulator returned HTTP {status} for '{variable}': {message}")]
    Http {
        variable: String,
        status: u16,
        message: String,
    },

    #[error("Simulator rejected '{variable}': {message}")]
    Rejected { variable: String, message: String },

    #[error("Variable '{0}' is not modeled by the simulator")]
    UnknownVariable(String),

    #[error("Simulator returned no value for '{variable}' in {year}")]
    MissingValue { variable: String, year: i32 },

    #[error("Simulator returned a non-numeric value for '{variable}': {value}")]
    NotNumeric { variable: String, value: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Simulator client setup failed: {0}")]
    Client(String),
}
