use crate::error::{CalculatorError, Result};
use crate::money::{monthly, monthly_income, round_dp};
use crate::parallel::ordered;
use crate::soft::soft_first;
use crate::sweep::income_points;
use crate::types::CombinedPoint;
use crate::Calculator;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use tanf_model::{build_situation, resolve_variable, Household, IncomeRange, GENERIC_TANF_VARIABLE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Program {
    Tanf,
    Snap,
    Eitc,
    Ctc,
}

impl Program {
    pub const ALL: [Program; 4] = [Program::Tanf, Program::Snap, Program::Eitc, Program::Ctc];

    pub const fn as_str(self) -> &'static str {
        match self {
            Program::Tanf => "tanf",
            Program::Snap => "snap",
            Program::Eitc => "eitc",
            Program::Ctc => "ctc",
        }
    }

    /// Simulator variables to try, in order, for this program in `state`.
    pub fn variables(self, state: &str) -> Vec<&'static str> {
        match self {
            Program::Tanf => {
                let resolved = resolve_variable(state);
                if resolved == GENERIC_TANF_VARIABLE {
                    vec![GENERIC_TANF_VARIABLE]
                } else {
                    vec![resolved, GENERIC_TANF_VARIABLE]
                }
            }
            Program::Snap => vec!["snap"],
            Program::Eitc => vec!["eitc"],
            Program::Ctc => vec!["ctc_value", "ctc"],
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Program {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        Program::ALL
            .into_iter()
            .find(|program| program.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| {
                format!("unknown program '{value}' (expected one of: tanf, snap, eitc, ctc)")
            })
    }
}

impl CombinedPoint {
    pub fn program(&self, program: Program) -> Option<f64> {
        match program {
            Program::Tanf => self.tanf_monthly,
            Program::Snap => self.snap_monthly,
            Program::Eitc => self.eitc_monthly,
            Program::Ctc => self.ctc_monthly,
        }
    }

    fn slot(&mut self, program: Program) -> &mut Option<f64> {
        match program {
            Program::Tanf => &mut self.tanf_monthly,
            Program::Snap => &mut self.snap_monthly,
            Program::Eitc => &mut self.eitc_monthly,
            Program::Ctc => &mut self.ctc_monthly,
        }
    }
}

/// Programs reported by a combined sweep, read from its first point.
pub fn programs_available(points: &[CombinedPoint]) -> Vec<Program> {
    points
        .first()
        .map(|first| {
            Program::ALL
                .into_iter()
                .filter(|program| first.program(*program).is_some())
                .collect()
        })
        .unwrap_or_default()
}

impl Calculator {
    /// Monthly TANF, SNAP, EITC and CTC across a range of total annual income.
    ///
    /// Each point is simulated once and every requested program is read from that
    /// simulation. Program values are best effort: one the simulator cannot
    /// compute reports zero.
    pub async fn combined_sweep(
        &self,
        household: &Household,
        range: IncomeRange,
        programs: &[Program],
    ) -> Result<Vec<CombinedPoint>> {
        let requested: BTreeSet<Program> = programs.iter().copied().collect();
        let points = income_points(household, &range)?;
        log::debug!(
            "combined sweep of {} income levels for {} ({} programs)",
            points.len(),
            household.state,
            requested.len()
        );

        ordered(points, self.options.max_concurrency, {
            let calculator = self.clone();
            move |(total, point)| {
                let calculator = calculator.clone();
                let requested = requested.clone();
                async move { calculator.combined_point(total, &point, &requested).await }
            }
        })
        .await
    }

    async fn combined_point(
        &self,
        total: f64,
        household: &Household,
        requested: &BTreeSet<Program>,
    ) -> Result<CombinedPoint> {
        let simulation = self
            .simulator
            .simulate(&build_situation(household))
            .map_err(|source| CalculatorError::Simulation {
                state: household.state.clone(),
                year: household.year,
                variable: resolve_variable(&household.state).to_string(),
                source,
            })?;

        let mut point = CombinedPoint {
            total_income_monthly: monthly_income(total),
            ..Default::default()
        };
        for program in requested {
            let variables = program.variables(&household.state);
            let annual = soft_first(simulation.as_ref(), &variables, household.year)
                .await
                .unwrap_or(0.0);
            *point.slot(*program) = Some(round_dp(monthly(annual), 2));
        }

        let total_benefits: f64 = Program::ALL
            .into_iter()
            .filter_map(|program| point.program(program))
            .sum();
        point.total_benefits_monthly = round_dp(total_benefits, 2);
        Ok(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tanf_chain_falls_back_to_generic_variable() {
        assert_eq!(Program::Tanf.variables("CA"), vec!["ca_tanf", "tanf"]);
        assert_eq!(Program::Ctc.variables("CA"), vec!["ctc_value", "ctc"]);
    }

    #[test]
    fn parses_program_names() {
        assert_eq!("SNAP".parse::<Program>(), Ok(Program::Snap));
        assert!("wic".parse::<Program>().is_err());
    }

    #[test]
    fn available_programs_follow_first_point() {
        let first = CombinedPoint {
            tanf_monthly: Some(0.0),
            ctc_monthly: Some(166.67),
            total_benefits_monthly: 166.67,
            ..Default::default()
        };
        assert_eq!(
            programs_available(&[first]),
            vec![Program::Tanf, Program::Ctc]
        );
        assert!(programs_available(&[]).is_empty());
    }
}
