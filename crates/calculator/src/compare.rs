use crate::error::Result;
use crate::parallel::ordered;
use crate::types::{ScenarioComparison, ScenarioDelta, StateComparison, StateRecord};
use crate::Calculator;
use std::cmp::Ordering;
use tanf_model::jurisdiction::{self, STATES};
use tanf_model::Household;

/// Sorts records by descending monthly benefit, keeping input order among ties,
/// and reports the highest benefit (zero for an empty batch).
pub fn rank_states(mut states: Vec<StateRecord>) -> StateComparison {
    states.sort_by(|a, b| {
        b.tanf_monthly
            .partial_cmp(&a.tanf_monthly)
            .unwrap_or(Ordering::Equal)
    });
    let max_benefit = states
        .iter()
        .map(|record| record.tanf_monthly)
        .fold(0.0, f64::max);
    StateComparison {
        max_benefit,
        states,
    }
}

impl Calculator {
    /// The household evaluated in every supported state.
    pub async fn compare_states(&self, household: &Household) -> Result<StateComparison> {
        let codes: Vec<&'static str> = STATES.iter().map(|info| info.code).collect();
        self.compare_jurisdictions(household, &codes).await
    }

    /// The household evaluated in each of `codes`, without a county.
    ///
    /// A state that cannot be evaluated is reported with zero benefit and the
    /// `error` flag instead of failing the batch.
    pub async fn compare_jurisdictions(
        &self,
        household: &Household,
        codes: &[&str],
    ) -> Result<StateComparison> {
        let legs: Vec<Household> = codes.iter().map(|code| household.in_state(code)).collect();
        let calculator = self.clone();
        let records = ordered(legs, self.options.max_concurrency, move |leg| {
            let calculator = calculator.clone();
            async move { Ok(calculator.state_record(&leg).await) }
        })
        .await?;
        Ok(rank_states(records))
    }

    async fn state_record(&self, household: &Household) -> StateRecord {
        let state_name = jurisdiction::state_name(&household.state).to_string();
        match self.evaluate(household).await {
            Ok(result) => StateRecord {
                state: result.state,
                state_name: result.state_name,
                tanf_monthly: result.tanf_monthly,
                tanf_annual: result.tanf_annual,
                eligible: result.eligible,
                error: false,
            },
            Err(err) => {
                log::warn!("{}: {err}", household.state);
                StateRecord {
                    state: household.state.clone(),
                    state_name,
                    tanf_monthly: 0.0,
                    tanf_annual: 0.0,
                    eligible: false,
                    error: true,
                }
            }
        }
    }

    /// Two households side by side. Either leg failing fails the comparison.
    pub async fn compare_scenarios(
        &self,
        scenario_a: &Household,
        scenario_b: &Household,
    ) -> Result<ScenarioComparison> {
        let (scenario_a, scenario_b) =
            tokio::try_join!(self.evaluate(scenario_a), self.evaluate(scenario_b))?;
        let difference = ScenarioDelta {
            tanf_monthly: scenario_b.tanf_monthly - scenario_a.tanf_monthly,
            tanf_annual: scenario_b.tanf_annual - scenario_a.tanf_annual,
            eligible_changed: scenario_a.eligible != scenario_b.eligible,
        };
        Ok(ScenarioComparison {
            scenario_a,
            scenario_b,
            difference,
        })
    }
}
