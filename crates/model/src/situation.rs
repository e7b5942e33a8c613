use crate::household::{Household, ADULT_PLACEHOLDER_AGE};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Values of one variable keyed by period (the tax year, as a string).
pub type PeriodValues = BTreeMap<String, Value>;

/// A person or a group of people, together with the variables set on it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<String>,
    #[serde(flatten)]
    pub variables: BTreeMap<String, PeriodValues>,
}

impl Entity {
    fn with_members(members: Vec<String>) -> Self {
        Self {
            members,
            variables: BTreeMap::new(),
        }
    }

    fn set(&mut self, variable: &str, year: i32, value: Value) {
        self.variables
            .entry(variable.to_string())
            .or_default()
            .insert(year.to_string(), value);
    }

    pub fn get(&self, variable: &str, year: i32) -> Option<&Value> {
        self.variables.get(variable)?.get(&year.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Person,
    TaxUnit,
    SpmUnit,
    Family,
    MaritalUnit,
    Household,
}

impl EntityKind {
    pub const GROUPS: [EntityKind; 5] = [
        EntityKind::TaxUnit,
        EntityKind::SpmUnit,
        EntityKind::Family,
        EntityKind::MaritalUnit,
        EntityKind::Household,
    ];

    /// Collection key in the serialized situation.
    pub const fn plural(self) -> &'static str {
        match self {
            EntityKind::Person => "people",
            EntityKind::TaxUnit => "tax_units",
            EntityKind::SpmUnit => "spm_units",
            EntityKind::Family => "families",
            EntityKind::MaritalUnit => "marital_units",
            EntityKind::Household => "households",
        }
    }

    /// Id of the single unit the builder creates for a group entity.
    pub const fn unit_id(self) -> Option<&'static str> {
        match self {
            EntityKind::Person => None,
            EntityKind::TaxUnit => Some("tax_unit"),
            EntityKind::SpmUnit => Some("spm_unit"),
            EntityKind::Family => Some("family"),
            EntityKind::MaritalUnit => Some("marital_unit"),
            EntityKind::Household => Some("household"),
        }
    }
}

/// Household description in the simulator's input format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Situation {
    pub people: BTreeMap<String, Entity>,
    pub tax_units: BTreeMap<String, Entity>,
    pub spm_units: BTreeMap<String, Entity>,
    pub households: BTreeMap<String, Entity>,
    pub families: BTreeMap<String, Entity>,
    pub marital_units: BTreeMap<String, Entity>,
}

impl Situation {
    pub fn entities(&self, kind: EntityKind) -> &BTreeMap<String, Entity> {
        match kind {
            EntityKind::Person => &self.people,
            EntityKind::TaxUnit => &self.tax_units,
            EntityKind::SpmUnit => &self.spm_units,
            EntityKind::Family => &self.families,
            EntityKind::MaritalUnit => &self.marital_units,
            EntityKind::Household => &self.households,
        }
    }

    fn entities_mut(&mut self, kind: EntityKind) -> &mut BTreeMap<String, Entity> {
        match kind {
            EntityKind::Person => &mut self.people,
            EntityKind::TaxUnit => &mut self.tax_units,
            EntityKind::SpmUnit => &mut self.spm_units,
            EntityKind::Family => &mut self.families,
            EntityKind::MaritalUnit => &mut self.marital_units,
            EntityKind::Household => &mut self.households,
        }
    }

    pub fn get(&self, kind: EntityKind, id: &str, variable: &str, year: i32) -> Option<&Value> {
        self.entities(kind).get(id)?.get(variable, year)
    }

    fn set(&mut self, kind: EntityKind, id: &str, variable: &str, year: i32, value: Value) {
        self.entities_mut(kind)
            .entry(id.to_string())
            .or_default()
            .set(variable, year, value);
    }

    /// Reads a numeric variable from the builder's single unit of `kind`.
    pub fn unit_number(&self, kind: EntityKind, variable: &str, year: i32) -> Option<f64> {
        let id = kind.unit_id()?;
        self.get(kind, id, variable, year)?.as_f64()
    }

    pub fn person_ids(&self) -> impl Iterator<Item = &str> {
        self.people.keys().map(String::as_str)
    }
}

fn person_id(prefix: &str, idx: usize) -> String {
    format!("{prefix}_{}", idx + 1)
}

/// Translates a household into the simulator's situation.
///
/// Unearned income, resources and the enrollment flag are written only when they
/// carry information (positive amounts, `true`). The simulator may treat an explicit
/// zero differently from an unset field, so zero is expressed by omission.
pub fn build_situation(household: &Household) -> Situation {
    let year = household.year;
    let mut situation = Situation::default();
    let mut members = Vec::new();
    let mut adults = Vec::new();

    for idx in 0..usize::from(household.num_adults) {
        let id = person_id("adult", idx);
        situation.set(EntityKind::Person, &id, "age", year, ADULT_PLACEHOLDER_AGE.into());
        if idx == 0 && household.earned_income > 0.0 {
            situation.set(
                EntityKind::Person,
                &id,
                "employment_income",
                year,
                household.earned_income.into(),
            );
        }
        adults.push(id.clone());
        members.push(id);
    }

    for (idx, age) in household.child_ages().into_iter().enumerate() {
        let id = person_id("child", idx);
        situation.set(EntityKind::Person, &id, "age", year, age.into());
        members.push(id);
    }

    for kind in EntityKind::GROUPS {
        let Some(unit_id) = kind.unit_id() else {
            continue;
        };
        let unit_members = match kind {
            EntityKind::MaritalUnit => adults.clone(),
            _ => members.clone(),
        };
        situation
            .entities_mut(kind)
            .insert(unit_id.to_string(), Entity::with_members(unit_members));
    }

    let household_id = "household";
    situation.set(
        EntityKind::Household,
        household_id,
        "state_name",
        year,
        household.state.clone().into(),
    );
    if let Some(county) = &household.county {
        situation.set(
            EntityKind::Household,
            household_id,
            "county",
            year,
            county.clone().into(),
        );
    }

    let spm_unit = "spm_unit";
    if household.unearned_income > 0.0 {
        situation.set(
            EntityKind::SpmUnit,
            spm_unit,
            "spm_unit_unearned_income",
            year,
            household.unearned_income.into(),
        );
    }
    if household.resources > 0.0 {
        situation.set(
            EntityKind::SpmUnit,
            spm_unit,
            "spm_unit_assets",
            year,
            household.resources.into(),
        );
    }
    if household.is_tanf_enrolled {
        situation.set(
            EntityKind::SpmUnit,
            spm_unit,
            "is_tanf_enrolled",
            year,
            true.into(),
        );
    }

    situation
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn household() -> Household {
        let mut household = Household::new("CA");
        household.num_children = 2;
        household
    }

    #[test]
    fn assigns_deterministic_ids_and_ages() {
        let mut input = household();
        input.num_adults = 2;
        input.child_ages = Some(vec![3, 9]);
        let situation = build_situation(&input);

        let ids: Vec<_> = situation.person_ids().collect();
        assert_eq!(ids, vec!["adult_1", "adult_2", "child_1", "child_2"]);
        assert_eq!(
            situation.get(EntityKind::Person, "adult_2", "age", 2025),
            Some(&json!(35))
        );
        assert_eq!(
            situation.get(EntityKind::Person, "child_2", "age", 2025),
            Some(&json!(9))
        );
    }

    #[test]
    fn every_person_is_in_every_group_once() {
        let situation = build_situation(&household());
        for kind in [
            EntityKind::TaxUnit,
            EntityKind::SpmUnit,
            EntityKind::Family,
            EntityKind::Household,
        ] {
            let units = situation.entities(kind);
            assert_eq!(units.len(), 1, "{}", kind.plural());
            let members = &units.values().next().unwrap().members;
            for id in situation.person_ids() {
                assert_eq!(members.iter().filter(|m| *m == id).count(), 1);
            }
            assert_eq!(members.len(), situation.people.len());
        }
    }

    #[test]
    fn marital_unit_holds_adults_only() {
        let single = build_situation(&household());
        assert_eq!(single.marital_units["marital_unit"].members, vec!["adult_1"]);

        let mut couple = household();
        couple.num_adults = 2;
        let couple = build_situation(&couple);
        assert_eq!(
            couple.marital_units["marital_unit"].members,
            vec!["adult_1", "adult_2"]
        );
    }

    #[test]
    fn earned_income_attaches_to_first_adult_only() {
        let mut input = household();
        input.num_adults = 2;
        input.earned_income = 12_000.0;
        let situation = build_situation(&input);
        assert_eq!(
            situation.get(EntityKind::Person, "adult_1", "employment_income", 2025),
            Some(&json!(12_000.0))
        );
        assert_eq!(
            situation.get(EntityKind::Person, "adult_2", "employment_income", 2025),
            None
        );
    }

    #[test]
    fn zero_amounts_are_omitted_not_written() {
        let situation = build_situation(&household());
        let spm = &situation.spm_units["spm_unit"];
        assert!(spm.variables.is_empty());
        assert!(!situation.people["adult_1"]
            .variables
            .contains_key("employment_income"));
        assert!(!situation.households["household"]
            .variables
            .contains_key("county"));

        let value = serde_json::to_value(&situation).unwrap();
        assert_eq!(value["spm_units"]["spm_unit"], json!({"members": ["adult_1", "child_1", "child_2"]}));
    }

    #[test]
    fn positive_amounts_and_flags_land_on_benefit_unit() {
        let mut input = household();
        input.unearned_income = 2_400.0;
        input.resources = 1_500.0;
        input.is_tanf_enrolled = true;
        input.county = Some("LOS_ANGELES_COUNTY_CA".to_string());
        let situation = build_situation(&input);

        assert_eq!(
            situation.unit_number(EntityKind::SpmUnit, "spm_unit_unearned_income", 2025),
            Some(2_400.0)
        );
        assert_eq!(
            situation.unit_number(EntityKind::SpmUnit, "spm_unit_assets", 2025),
            Some(1_500.0)
        );
        assert_eq!(
            situation.get(EntityKind::SpmUnit, "spm_unit", "is_tanf_enrolled", 2025),
            Some(&json!(true))
        );
        assert_eq!(
            situation.get(EntityKind::Household, "household", "county", 2025),
            Some(&json!("LOS_ANGELES_COUNTY_CA"))
        );
        assert_eq!(
            situation.get(EntityKind::Household, "household", "state_name", 2025),
            Some(&json!("CA"))
        );
    }

    #[test]
    fn serialized_shape_matches_simulator_format() {
        let value = serde_json::to_value(build_situation(&household())).unwrap();
        assert_eq!(value["people"]["adult_1"], json!({"age": {"2025": 35}}));
        assert_eq!(
            value["households"]["household"]["state_name"],
            json!({"2025": "CA"})
        );
        for key in [
            "people",
            "tax_units",
            "spm_units",
            "households",
            "families",
            "marital_units",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
    }
}
