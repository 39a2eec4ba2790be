use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxnId(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrCr {
    #[serde(rename = "DR")]
    Debit,
    #[serde(rename = "CR")]
    Credit,
}

impl DrCr {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debit => "DR",
            Self::Credit => "CR",
        }
    }
}

/// A posting behind a variance row. Direction lives in `drcr`, not in the sign of `amount`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Txn {
    pub id: TxnId,
    pub date: NaiveDate,
    pub source: String,
    pub narrative: String,
    pub drcr: DrCr,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::{DrCr, Txn};

    #[test]
    fn tags_are_optional_and_omitted_when_absent() {
        let raw = concat!(
            r#"{"id":"T1","date":"2025-09-15","source":"SWIFT","#,
            r#""narrative":"MT940 inflow","drcr":"CR","amount":42000}"#
        );
        let txn: Txn = serde_json::from_str(raw).expect("txn should decode");

        assert_eq!(txn.drcr, DrCr::Credit);
        assert!(txn.tags.is_none());

        let encoded = serde_json::to_string(&txn).expect("encode");
        assert!(!encoded.contains("tags"));
        assert!(encoded.contains("\"drcr\":\"CR\""));
    }
}
