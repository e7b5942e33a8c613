use thiserror::Error;

pub type Result<T> = std::result::Result<T, ValidationError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("State '{0}' not supported")]
    UnsupportedState(String),

    #[error("num_adults must be between 1 and {max}, got {actual}")]
    AdultsOutOfRange { actual: u8, max: u8 },

    #[error("num_children must be between 0 and {max}, got {actual}")]
    ChildrenOutOfRange { actual: u8, max: u8 },

    #[error("child_ages has {actual} entries but num_children is {expected}")]
    ChildAgesMismatch { expected: usize, actual: usize },

    #[error("{field} must be a finite, non-negative amount, got {value}")]
    InvalidAmount { field: &'static str, value: f64 },

    #[error("County '{county}' is not a known county for {state}")]
    UnknownCounty { state: String, county: String },

    #[error("income_step must be greater than 0, got {0}")]
    NonPositiveStep(f64),

    #[error("income_max ({max}) must not be below income_min ({min})")]
    InvertedRange { min: f64, max: f64 },

    #[error("income range spans more than {max} points; raise income_step or narrow the range")]
    TooManyPoints { max: usize },
}
