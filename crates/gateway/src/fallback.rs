use async_trait::async_trait;
use balview_core::domain::txn::Txn;
use balview_core::domain::variance::{VarianceId, VarianceRow};
use balview_core::gateway::{DataGateway, GatewayError, StaticGateway};
use tracing::warn;

/// Serves from `primary` and substitutes the canned dataset on any failure.
///
/// Callers never see a gateway error through this type, so an unreachable
/// review API degrades to fixture data instead of an empty dashboard.
pub struct FallbackGateway<P> {
    primary: P,
    fixtures: StaticGateway,
}

impl<P: DataGateway> FallbackGateway<P> {
    pub fn new(primary: P, fixtures: StaticGateway) -> Self {
        Self { primary, fixtures }
    }

    pub fn fixtures(&self) -> &StaticGateway {
        &self.fixtures
    }
}

#[async_trait]
impl<P: DataGateway> DataGateway for FallbackGateway<P> {
    async fn fetch_variances(&self) -> Result<Vec<VarianceRow>, GatewayError> {
        match self.primary.fetch_variances().await {
            Ok(rows) => Ok(rows),
            Err(error) => {
                warn!(
                    event_name = "gateway.fallback.variances",
                    error = %error,
                    fixture_rows = self.fixtures.rows().len(),
                    "review api unavailable, serving fixture variances"
                );
                self.fixtures.fetch_variances().await
            }
        }
    }

    async fn fetch_transactions(&self, var_id: &VarianceId) -> Result<Vec<Txn>, GatewayError> {
        match self.primary.fetch_transactions(var_id).await {
            Ok(txns) => Ok(txns),
            Err(error) => {
                warn!(
                    event_name = "gateway.fallback.transactions",
                    var_id = %var_id,
                    error = %error,
                    "review api unavailable, serving fixture transactions"
                );
                self.fixtures.fetch_transactions(var_id).await
            }
        }
    }
}
