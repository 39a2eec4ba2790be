use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VarianceId(pub String);

impl VarianceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VarianceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VarianceId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Review status assigned by the data source. Never recomputed locally.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VarianceStatus {
    #[serde(rename = "OK")]
    Ok,
    Investigate,
    Breached,
}

impl VarianceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Investigate => "Investigate",
            Self::Breached => "Breached",
        }
    }
}

impl std::fmt::Display for VarianceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for VarianceStatus {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ok" => Ok(Self::Ok),
            "investigate" => Ok(Self::Investigate),
            "breached" => Ok(Self::Breached),
            other => Err(DomainError::InvalidInput(format!(
                "unknown variance status `{other}` (expected OK|Investigate|Breached)"
            ))),
        }
    }
}

/// One balance-sheet line compared across the prior and current period.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VarianceRow {
    pub id: VarianceId,
    pub entity: String,
    pub book_date: NaiveDate,
    pub gl: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub prior: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub current: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub threshold_pct: Decimal,
    pub owner: String,
    pub status: VarianceStatus,
    pub last_updated: NaiveDate,
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{VarianceRow, VarianceStatus};

    #[test]
    fn decodes_wire_row_with_numeric_amounts() {
        let raw = r#"{
            "id": "V1",
            "entity": "IN-BLR-PB",
            "bookDate": "2025-09-16",
            "gl": "101100",
            "description": "Cash Nostro Reconciliation",
            "prior": 1250000,
            "current": 1387500.5,
            "thresholdPct": 5,
            "owner": "a.sharma",
            "status": "Breached",
            "lastUpdated": "2025-09-17"
        }"#;

        let row: VarianceRow = serde_json::from_str(raw).expect("row should decode");
        assert_eq!(row.id.as_str(), "V1");
        assert_eq!(row.prior, Decimal::new(1_250_000, 0));
        assert_eq!(row.current, Decimal::new(13_875_005, 1));
        assert_eq!(row.status, VarianceStatus::Breached);
    }

    #[test]
    fn status_uses_upper_case_ok_label_on_the_wire() {
        let encoded = serde_json::to_string(&VarianceStatus::Ok).expect("encode");
        assert_eq!(encoded, "\"OK\"");
        assert_eq!("investigate".parse::<VarianceStatus>(), Ok(VarianceStatus::Investigate));
        assert!("pending".parse::<VarianceStatus>().is_err());
    }
}
