use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::variance::VarianceStatus;
use crate::variance::DerivedRow;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarianceSummary {
    pub total: usize,
    pub breached: usize,
    pub investigate: usize,
    pub total_abs_variance: Decimal,
}

impl VarianceSummary {
    /// Accounts over threshold, whether breached or still under investigation.
    pub fn flagged(&self) -> usize {
        self.breached + self.investigate
    }
}

pub fn summarize(rows: &[DerivedRow<'_>]) -> VarianceSummary {
    rows.iter().fold(VarianceSummary::default(), |mut summary, item| {
        summary.total += 1;
        match item.row.status {
            VarianceStatus::Breached => summary.breached += 1,
            VarianceStatus::Investigate => summary.investigate += 1,
            VarianceStatus::Ok => {}
        }
        summary.total_abs_variance = summary
            .total_abs_variance
            .checked_add(item.absolute_variance().abs())
            .unwrap_or(Decimal::MAX);
        summary
    })
}
