use crate::error::{Result, ValidationError};
use crate::jurisdiction;
use serde::{Deserialize, Serialize};

pub const DEFAULT_YEAR: i32 = 2025;
pub const DEFAULT_CHILD_AGE: u32 = 5;
/// Adults are not aged by the caller; the simulator still needs an age.
pub const ADULT_PLACEHOLDER_AGE: u32 = 35;
pub const MAX_ADULTS: u8 = 2;
pub const MAX_CHILDREN: u8 = 10;

fn default_year() -> i32 {
    DEFAULT_YEAR
}

fn default_adults() -> u8 {
    1
}

fn default_children() -> u8 {
    1
}

/// Household attributes accepted from callers.
///
/// Money fields are annual. The first adult is the only earner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Household {
    pub state: String,
    #[serde(default = "default_year")]
    pub year: i32,
    #[serde(default = "default_adults")]
    pub num_adults: u8,
    #[serde(default = "default_children")]
    pub num_children: u8,
    #[serde(default)]
    pub earned_income: f64,
    #[serde(default)]
    pub unearned_income: f64,
    #[serde(default)]
    pub child_ages: Option<Vec<u32>>,
    #[serde(default)]
    pub county: Option<String>,
    #[serde(default)]
    pub is_tanf_enrolled: bool,
    #[serde(default)]
    pub resources: f64,
}

impl Household {
    pub fn new(state: impl Into<String>) -> Self {
        Self {
            state: state.into(),
            year: DEFAULT_YEAR,
            num_adults: default_adults(),
            num_children: default_children(),
            earned_income: 0.0,
            unearned_income: 0.0,
            child_ages: None,
            county: None,
            is_tanf_enrolled: false,
            resources: 0.0,
        }
    }

    pub fn total_income(&self) -> f64 {
        self.earned_income + self.unearned_income
    }

    /// Declared child ages, or the default age for every child.
    pub fn child_ages(&self) -> Vec<u32> {
        match &self.child_ages {
            Some(ages) => ages.clone(),
            None => vec![DEFAULT_CHILD_AGE; usize::from(self.num_children)],
        }
    }

    /// Same household with a different earned/unearned split.
    pub fn with_income(&self, earned_income: f64, unearned_income: f64) -> Self {
        Self {
            earned_income,
            unearned_income,
            ..self.clone()
        }
    }

    /// Same household placed in another state. The county is dropped because
    /// county identifiers are state specific.
    pub fn in_state(&self, state: &str) -> Self {
        Self {
            state: state.to_string(),
            county: None,
            ..self.clone()
        }
    }

    /// Share of income that is earned; a household without income counts as
    /// fully earned.
    pub fn earned_ratio(&self) -> f64 {
        let total = self.total_income();
        if total > 0.0 {
            self.earned_income / total
        } else {
            1.0
        }
    }

    /// Caller-side checks. The calculator assumes a household that passed them.
    pub fn validate(&self) -> Result<()> {
        if !jurisdiction::is_supported(&self.state) {
            return Err(ValidationError::UnsupportedState(self.state.clone()));
        }
        self.validate_composition()?;

        if let Some(county) = &self.county {
            if let Some(counties) = jurisdiction::counties(&self.state) {
                if !counties.iter().any(|c| c.code == county) {
                    return Err(ValidationError::UnknownCounty {
                        state: self.state.clone(),
                        county: county.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Checks that do not depend on the state code.
    pub fn validate_composition(&self) -> Result<()> {
        if self.num_adults == 0 || self.num_adults > MAX_ADULTS {
            return Err(ValidationError::AdultsOutOfRange {
                actual: self.num_adults,
                max: MAX_ADULTS,
            });
        }
        if self.num_children > MAX_CHILDREN {
            return Err(ValidationError::ChildrenOutOfRange {
                actual: self.num_children,
                max: MAX_CHILDREN,
            });
        }
        if let Some(ages) = &self.child_ages {
            if ages.len() != usize::from(self.num_children) {
                return Err(ValidationError::ChildAgesMismatch {
                    expected: usize::from(self.num_children),
                    actual: ages.len(),
                });
            }
        }
        for (field, value) in [
            ("earned_income", self.earned_income),
            ("unearned_income", self.unearned_income),
            ("resources", self.resources),
        ] {
            check_amount(field, value)?;
        }
        Ok(())
    }
}

fn check_amount(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidAmount { field, value })
    }
}

/// Most income levels a single sweep may visit.
pub const MAX_SWEEP_POINTS: usize = 1_000;

/// Total annual income levels visited by a sweep.
///
/// `step` must be strictly positive and the range must span at most
/// [`MAX_SWEEP_POINTS`] levels. [`IncomeRange::point_count`] enforces both.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IncomeRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl IncomeRange {
    pub fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    pub fn validate(&self) -> Result<()> {
        check_amount("income_min", self.min)?;
        check_amount("income_max", self.max)?;
        if !self.step.is_finite() || self.step <= 0.0 {
            return Err(ValidationError::NonPositiveStep(self.step));
        }
        if self.max < self.min {
            return Err(ValidationError::InvertedRange {
                min: self.min,
                max: self.max,
            });
        }
        self.point_count().map(|_| ())
    }

    /// `floor((max - min) / step) + 1` for a well-formed range, rejected above
    /// [`MAX_SWEEP_POINTS`].
    pub fn point_count(&self) -> Result<usize> {
        if !self.step.is_finite() || self.step <= 0.0 {
            return Err(ValidationError::NonPositiveStep(self.step));
        }
        if self.max < self.min {
            return Ok(0);
        }
        let steps = ((self.max - self.min) / self.step).floor();
        let count = if steps.is_finite() && steps < MAX_SWEEP_POINTS as f64 {
            (steps as usize).checked_add(1)
        } else {
            None
        };
        count
            .filter(|count| *count <= MAX_SWEEP_POINTS)
            .ok_or(ValidationError::TooManyPoints {
                max: MAX_SWEEP_POINTS,
            })
    }

    /// `floor((max - min) / step) + 1`, or zero when `max < min` or the range
    /// fails [`IncomeRange::point_count`].
    pub fn len(&self) -> usize {
        self.point_count().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Income levels in ascending order, starting at `min`.
    pub fn levels(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.len()).map(move |idx| self.min + idx as f64 * self.step)
    }
}
