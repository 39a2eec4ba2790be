use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::txn::Txn;
use crate::domain::variance::{VarianceId, VarianceRow};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("request to `{url}` failed: {message}")]
    Transport { url: String, message: String },
    #[error("request to `{url}` timed out after {after_secs}s")]
    Timeout { url: String, after_secs: u64 },
    #[error("`{url}` responded with status {status}")]
    Status { url: String, status: u16 },
    #[error("could not decode response from `{url}`: {message}")]
    Decode { url: String, message: String },
}

/// Source of variance rows and their underlying transactions.
#[async_trait]
pub trait DataGateway: Send + Sync {
    async fn fetch_variances(&self) -> Result<Vec<VarianceRow>, GatewayError>;
    async fn fetch_transactions(&self, var_id: &VarianceId) -> Result<Vec<Txn>, GatewayError>;
}

/// Gateway over an in-memory dataset. Unknown row ids resolve to an empty list.
#[derive(Clone, Debug, Default)]
pub struct StaticGateway {
    rows: Vec<VarianceRow>,
    transactions: BTreeMap<VarianceId, Vec<Txn>>,
}

impl StaticGateway {
    pub fn new(rows: Vec<VarianceRow>, transactions: BTreeMap<VarianceId, Vec<Txn>>) -> Self {
        Self { rows, transactions }
    }

    pub fn rows(&self) -> &[VarianceRow] {
        &self.rows
    }

    pub fn transactions_for(&self, var_id: &VarianceId) -> Vec<Txn> {
        self.transactions.get(var_id).cloned().unwrap_or_default()
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.values().map(Vec::len).sum()
    }
}

#[async_trait]
impl DataGateway for StaticGateway {
    async fn fetch_variances(&self) -> Result<Vec<VarianceRow>, GatewayError> {
        Ok(self.rows.clone())
    }

    async fn fetch_transactions(&self, var_id: &VarianceId) -> Result<Vec<Txn>, GatewayError> {
        Ok(self.transactions_for(var_id))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use crate::domain::variance::VarianceId;

    use super::{DataGateway, StaticGateway};

    #[tokio::test]
    async fn unknown_row_resolves_to_empty_transactions() {
        let gateway = StaticGateway::new(Vec::new(), BTreeMap::new());

        let txns = gateway
            .fetch_transactions(&VarianceId("V404".to_string()))
            .await
            .expect("static gateway never fails");
        assert!(txns.is_empty());
        assert_eq!(gateway.transaction_count(), 0);
    }
}
