//! Counterfactual eligibility probes.
//!
//! A probe re-runs the full simulation with one household field zeroed and reports
//! whether the household would then receive a benefit. Adding a probe means adding
//! an entry to [`ELIGIBILITY_PROBES`].

use crate::soft::soft;
use std::collections::BTreeMap;
use tanf_model::{build_situation, Household};
use tanf_simulator::BenefitSimulator;

#[derive(Clone, Copy)]
pub struct Probe {
    /// Key under which the outcome is reported in the eligibility checks.
    pub flag: &'static str,
    pub apply: fn(&mut Household),
}

fn zero_income(household: &mut Household) {
    household.earned_income = 0.0;
    household.unearned_income = 0.0;
}

fn zero_resources(household: &mut Household) {
    household.resources = 0.0;
}

pub const ELIGIBILITY_PROBES: &[Probe] = &[
    Probe {
        flag: "eligible_with_zero_income",
        apply: zero_income,
    },
    Probe {
        flag: "eligible_with_zero_resources",
        apply: zero_resources,
    },
];

impl Probe {
    /// `None` when the counterfactual could not be simulated.
    pub(crate) async fn run(
        &self,
        simulator: &dyn BenefitSimulator,
        household: &Household,
        variable: &str,
    ) -> Option<bool> {
        let mut counterfactual = household.clone();
        (self.apply)(&mut counterfactual);

        let simulation = match simulator.simulate(&build_situation(&counterfactual)) {
            Ok(simulation) => simulation,
            Err(err) => {
                log::debug!("probe {} skipped: {err}", self.flag);
                return None;
            }
        };
        soft(simulation.as_ref(), variable, counterfactual.year)
            .await
            .map(|amount| amount > 0.0)
    }
}

pub(crate) async fn run_probes(
    simulator: &dyn BenefitSimulator,
    household: &Household,
    variable: &str,
) -> BTreeMap<&'static str, bool> {
    let mut outcomes = BTreeMap::new();
    for probe in ELIGIBILITY_PROBES {
        if let Some(eligible) = probe.run(simulator, household, variable).await {
            outcomes.insert(probe.flag, eligible);
        }
    }
    outcomes
}
