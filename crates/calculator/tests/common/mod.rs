//! Scripted in-memory benefit simulator.
//!
//! Toy rules, all annual:
//! - maximum benefit: `12 * (200 + 150 * household size)`, plus `12 * 300` in WY
//! - countable income: earned income minus a 20% disregard (50% when enrolled),
//!   plus unearned income
//! - benefit: maximum minus countable income, floored at zero; zero when assets
//!   exceed 5 000
//! - poverty guideline: `15 000 + 5 000 * (size - 1)`
//! - SNAP: `12 * (300 + 100 * size) - 0.3 * income`, floored at zero
//! - EITC: 20% of earnings capped at 4 000; CTC: 2 000 per child

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tanf_model::{EntityKind, Household, Situation};
use tanf_simulator::{BenefitSimulator, Simulation, SimulationError};

pub const ASSET_LIMIT: f64 = 5_000.0;

#[derive(Default)]
struct Script {
    unsupported: HashSet<String>,
    failing_states: HashSet<String>,
}

#[derive(Clone, Default)]
pub struct FakeEngine {
    script: Arc<Script>,
    simulations: Arc<AtomicUsize>,
    queries: Arc<Mutex<Vec<String>>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Variables the engine refuses to compute anywhere.
    pub fn without(variables: &[&str]) -> Self {
        Self::scripted(variables, &[])
    }

    /// `failing_states`: every TANF variable fails there, generic one included.
    pub fn scripted(variables: &[&str], failing_states: &[&str]) -> Self {
        Self {
            script: Arc::new(Script {
                unsupported: variables.iter().map(|v| v.to_string()).collect(),
                failing_states: failing_states.iter().map(|s| s.to_string()).collect(),
            }),
            ..Self::default()
        }
    }

    pub fn simulations(&self) -> usize {
        self.simulations.load(Ordering::SeqCst)
    }

    pub fn queries(&self, variable: &str) -> usize {
        self.queries
            .lock()
            .unwrap()
            .iter()
            .filter(|query| query.as_str() == variable)
            .count()
    }
}

impl BenefitSimulator for FakeEngine {
    fn simulate(&self, situation: &Situation) -> tanf_simulator::Result<Box<dyn Simulation>> {
        self.simulations.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSimulation {
            situation: situation.clone(),
            script: Arc::clone(&self.script),
            queries: Arc::clone(&self.queries),
        }))
    }
}

struct FakeSimulation {
    situation: Situation,
    script: Arc<Script>,
    queries: Arc<Mutex<Vec<String>>>,
}

struct Inputs {
    state: String,
    size: f64,
    children: f64,
    earned: f64,
    unearned: f64,
    assets: f64,
    enrolled: bool,
}

impl FakeSimulation {
    fn inputs(&self, year: i32) -> Inputs {
        let situation = &self.situation;
        let people = situation.people.len() as f64;
        let children = situation
            .person_ids()
            .filter(|id| id.starts_with("child"))
            .count() as f64;
        let spm = |variable: &str| situation.unit_number(EntityKind::SpmUnit, variable, year);
        Inputs {
            state: situation
                .get(EntityKind::Household, "household", "state_name", year)
                .and_then(|value| value.as_str())
                .unwrap_or_default()
                .to_string(),
            size: people,
            children,
            earned: situation
                .get(EntityKind::Person, "adult_1", "employment_income", year)
                .and_then(|value| value.as_f64())
                .unwrap_or(0.0),
            unearned: spm("spm_unit_unearned_income").unwrap_or(0.0),
            assets: spm("spm_unit_assets").unwrap_or(0.0),
            enrolled: situation
                .get(EntityKind::SpmUnit, "spm_unit", "is_tanf_enrolled", year)
                .and_then(|value| value.as_bool())
                .unwrap_or(false),
        }
    }
}

fn max_benefit(inputs: &Inputs) -> f64 {
    let bonus = if inputs.state == "WY" { 300.0 } else { 0.0 };
    12.0 * (200.0 + 150.0 * inputs.size + bonus)
}

fn countable_income(inputs: &Inputs) -> f64 {
    let disregard = if inputs.enrolled { 0.5 } else { 0.2 };
    inputs.earned * (1.0 - disregard) + inputs.unearned
}

fn benefit(inputs: &Inputs) -> f64 {
    if inputs.assets > ASSET_LIMIT {
        return 0.0;
    }
    (max_benefit(inputs) - countable_income(inputs)).max(0.0)
}

fn is_tanf_variable(variable: &str) -> bool {
    variable == "tanf"
        || tanf_model::jurisdiction::STATES
            .iter()
            .any(|info| info.tanf_variable == variable)
}

#[async_trait]
impl Simulation for FakeSimulation {
    async fn calculate(&self, variable: &str, year: i32) -> tanf_simulator::Result<f64> {
        self.queries.lock().unwrap().push(variable.to_string());
        let inputs = self.inputs(year);

        if self.script.unsupported.contains(variable)
            || (is_tanf_variable(variable) && self.script.failing_states.contains(&inputs.state))
        {
            return Err(SimulationError::UnknownVariable(variable.to_string()));
        }

        let flag = |value: bool| if value { 1.0 } else { 0.0 };
        let value = match variable {
            v if is_tanf_variable(v) => benefit(&inputs),
            "tanf_max_amount" => max_benefit(&inputs),
            "tanf_countable_income" => countable_income(&inputs),
            "tanf_gross_earned_income" => inputs.earned,
            "tanf_gross_unearned_income" => inputs.unearned,
            "is_tanf_eligible" | "is_tanf_economically_eligible" => flag(benefit(&inputs) > 0.0),
            "is_tanf_demographically_eligible" => flag(inputs.children > 0.0),
            "tax_unit_fpg" => 15_000.0 + 5_000.0 * (inputs.size - 1.0),
            "snap" => (12.0 * (300.0 + 100.0 * inputs.size)
                - 0.3 * (inputs.earned + inputs.unearned))
                .max(0.0),
            "eitc" => (inputs.earned * 0.2).min(4_000.0),
            "ctc_value" | "ctc" => 2_000.0 * inputs.children,
            other => return Err(SimulationError::UnknownVariable(other.to_string())),
        };
        Ok(value)
    }
}

pub fn family(state: &str, adults: u8, children: u8) -> Household {
    let mut household = Household::new(state);
    household.num_adults = adults;
    household.num_children = children;
    household
}
