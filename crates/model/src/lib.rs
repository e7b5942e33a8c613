//! # TANF Model
//!
//! Household inputs, the simulator "situation" they translate into, and the static
//! jurisdiction tables the calculator depends on.
//!
//! ```text
//! Household ──build_situation──> Situation (people + tax/spm/family/marital/household units)
//!     │
//!     └── state ──resolve_variable──> state TANF variable (or generic `tanf`)
//! ```
//!
//! Everything here is pure data: no I/O, no simulator calls.

mod error;
mod household;
pub mod jurisdiction;
mod situation;

pub use error::{Result, ValidationError};
pub use household::{
    Household, IncomeRange, ADULT_PLACEHOLDER_AGE, DEFAULT_CHILD_AGE, DEFAULT_YEAR, MAX_ADULTS,
    MAX_CHILDREN, MAX_SWEEP_POINTS,
};
pub use jurisdiction::{resolve_variable, County, StateInfo, GENERIC_TANF_VARIABLE};
pub use situation::{build_situation, Entity, EntityKind, PeriodValues, Situation};
