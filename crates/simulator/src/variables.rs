//! Which entity of the situation holds each variable the calculator reads.

use tanf_model::EntityKind;

const TAX_UNIT_VARIABLES: &[&str] = &["tax_unit_fpg", "eitc", "ctc", "ctc_value"];

/// Entity the engine computes `variable` on. TANF, SNAP and their diagnostics live
/// on the benefit (SPM) unit.
pub fn entity_of(variable: &str) -> EntityKind {
    if TAX_UNIT_VARIABLES.contains(&variable) {
        EntityKind::TaxUnit
    } else {
        EntityKind::SpmUnit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tax_credits_and_fpg_live_on_tax_unit() {
        for variable in ["tax_unit_fpg", "eitc", "ctc_value", "ctc"] {
            assert_eq!(entity_of(variable), EntityKind::TaxUnit, "{variable}");
        }
    }

    #[test]
    fn program_variables_live_on_benefit_unit() {
        for variable in ["ca_tanf", "tanf", "snap", "tanf_max_amount", "is_tanf_eligible"] {
            assert_eq!(entity_of(variable), EntityKind::SpmUnit, "{variable}");
        }
    }
}
