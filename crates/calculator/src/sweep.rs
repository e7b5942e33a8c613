use crate::error::Result;
use crate::money::{monthly, monthly_income};
use crate::parallel::ordered;
use crate::types::SweepPoint;
use crate::Calculator;
use tanf_model::{Household, IncomeRange};

/// Splits each income level of `range` with the household's earned share.
/// Returns `(total, household at that total)` pairs in ascending order; a range
/// that fails validation is rejected before any household is built.
pub(crate) fn income_points(
    household: &Household,
    range: &IncomeRange,
) -> Result<Vec<(f64, Household)>> {
    range.validate()?;
    let ratio = household.earned_ratio();
    Ok(range
        .levels()
        .map(|total| {
            (
                total,
                household.with_income(total * ratio, total * (1.0 - ratio)),
            )
        })
        .collect())
}

impl Calculator {
    /// TANF across a range of total annual income.
    ///
    /// Every other input is held fixed. A failing point fails the whole sweep.
    pub async fn sweep(&self, household: &Household, range: IncomeRange) -> Result<Vec<SweepPoint>> {
        let points = income_points(household, &range)?;
        log::debug!("sweeping {} income levels for {}", points.len(), household.state);

        let calculator = self.clone();
        ordered(points, self.options.max_concurrency, move |(total, point)| {
            let calculator = calculator.clone();
            async move {
                let annual = calculator.primary(&point).await?.annual;
                Ok(SweepPoint {
                    total_income_monthly: monthly_income(total),
                    tanf_monthly: monthly(annual),
                    eligible: annual > 0.0,
                })
            }
        })
        .await
    }
}
