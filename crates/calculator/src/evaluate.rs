use crate::error::{CalculatorError, Result};
use crate::money::{monthly, round_dp};
use crate::probes::run_probes;
use crate::soft::soft;
use crate::types::{Breakdown, EligibilityChecks, EvaluationResult, HouseholdSummary, PovertyContext};
use crate::Calculator;
use tanf_model::{build_situation, jurisdiction, resolve_variable, Household, GENERIC_TANF_VARIABLE};
use tanf_simulator::Simulation;

/// Breakdown component name and the simulator variable it is read from.
const BREAKDOWN_VARIABLES: &[(&str, &str)] = &[
    ("max_benefit", "tanf_max_amount"),
    ("countable_income", "tanf_countable_income"),
    ("gross_earned_income", "tanf_gross_earned_income"),
    ("gross_unearned_income", "tanf_gross_unearned_income"),
];

const OVERALL_ELIGIBILITY: &str = "is_tanf_eligible";
const DEMOGRAPHIC_ELIGIBILITY: &str = "is_tanf_demographically_eligible";
const ECONOMIC_ELIGIBILITY: &str = "is_tanf_economically_eligible";
const POVERTY_GUIDELINE: &str = "tax_unit_fpg";

impl Calculator {
    /// Evaluates one household.
    ///
    /// Fails only when the primary amount cannot be computed with either the state
    /// variable or the generic one. Every diagnostic is best effort.
    pub async fn evaluate(&self, household: &Household) -> Result<EvaluationResult> {
        let year = household.year;
        let Primary {
            simulation,
            annual,
            variable,
        } = self.primary(household).await?;
        let eligible = annual > 0.0;
        let tanf_monthly = monthly(annual);

        let breakdown = breakdown(simulation.as_ref(), year).await;

        let mut checks = eligibility_flags(simulation.as_ref(), year).await;
        if !eligible && checks.has_flags() {
            checks.probes = run_probes(self.simulator.as_ref(), household, variable).await;
        }

        let poverty_context = match soft(simulation.as_ref(), POVERTY_GUIDELINE, year).await {
            Some(fpg) if fpg > 0.0 => Some(poverty_context(fpg, household.total_income(), annual)),
            _ => None,
        };

        Ok(EvaluationResult {
            tanf_monthly,
            tanf_annual: annual,
            eligible,
            state: household.state.clone(),
            state_name: jurisdiction::state_name(&household.state).to_string(),
            year,
            household: HouseholdSummary::from(household),
            breakdown: (!breakdown.is_empty()).then_some(breakdown),
            eligibility_checks: checks.has_flags().then_some(checks),
            poverty_context,
            county: household.county.clone(),
        })
    }
}

/// A bound simulation together with the household's annual TANF amount and the
/// variable that produced it.
pub(crate) struct Primary {
    pub simulation: Box<dyn Simulation>,
    pub annual: f64,
    pub variable: &'static str,
}

impl Calculator {
    pub(crate) async fn primary(&self, household: &Household) -> Result<Primary> {
        let resolved = resolve_variable(&household.state);
        let simulation = self
            .simulator
            .simulate(&build_situation(household))
            .map_err(|source| CalculatorError::Simulation {
                state: household.state.clone(),
                year: household.year,
                variable: resolved.to_string(),
                source,
            })?;
        let (annual, variable) = primary_amount(simulation.as_ref(), household, resolved).await?;
        Ok(Primary {
            simulation,
            annual,
            variable,
        })
    }
}

async fn primary_amount<'a>(
    simulation: &dyn Simulation,
    household: &Household,
    resolved: &'a str,
) -> Result<(f64, &'a str)> {
    let year = household.year;
    let err = match simulation.calculate(resolved, year).await {
        Ok(amount) => return Ok((amount, resolved)),
        Err(err) => err,
    };
    if resolved == GENERIC_TANF_VARIABLE {
        return Err(CalculatorError::Simulation {
            state: household.state.clone(),
            year,
            variable: resolved.to_string(),
            source: err,
        });
    }

    log::debug!("{resolved} failed for {}, retrying with {GENERIC_TANF_VARIABLE}: {err}", household.state);
    simulation
        .calculate(GENERIC_TANF_VARIABLE, year)
        .await
        .map(|amount| (amount, GENERIC_TANF_VARIABLE))
        .map_err(|source| CalculatorError::Simulation {
            state: household.state.clone(),
            year,
            variable: GENERIC_TANF_VARIABLE.to_string(),
            source,
        })
}

async fn breakdown(simulation: &dyn Simulation, year: i32) -> Breakdown {
    let mut breakdown = Breakdown::default();
    for (name, variable) in BREAKDOWN_VARIABLES {
        if let Some(annual) = soft(simulation, variable, year).await {
            breakdown.push(*name, annual);
        }
    }
    breakdown
}

async fn eligibility_flags(simulation: &dyn Simulation, year: i32) -> EligibilityChecks {
    let flag = |value: Option<f64>| value.map(|value| value != 0.0);
    EligibilityChecks {
        overall: flag(soft(simulation, OVERALL_ELIGIBILITY, year).await),
        demographic: flag(soft(simulation, DEMOGRAPHIC_ELIGIBILITY, year).await),
        economic: flag(soft(simulation, ECONOMIC_ELIGIBILITY, year).await),
        ..Default::default()
    }
}

fn poverty_context(fpg_annual: f64, income_annual: f64, tanf_annual: f64) -> PovertyContext {
    let fpg_monthly = monthly(fpg_annual);
    let income_monthly = monthly(income_annual);
    let tanf_monthly = monthly(tanf_annual);
    let pct = |value: f64| round_dp(value / fpg_monthly * 100.0, 1);
    PovertyContext {
        fpg_annual,
        fpg_monthly,
        income_pct_fpg: pct(income_monthly),
        income_plus_tanf_pct_fpg: pct(income_monthly + tanf_monthly),
        tanf_pct_fpg: pct(tanf_monthly),
    }
}
