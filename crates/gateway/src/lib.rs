//! Data sources for the review dashboard: the HTTP review API, the canned
//! fixture dataset, and the fallback wrapper joining the two.

pub mod fallback;
pub mod fixtures;
pub mod http;

use std::sync::Arc;

use balview_core::config::GatewayConfig;
use balview_core::gateway::{DataGateway, GatewayError};
use tracing::info;

pub use fallback::FallbackGateway;
pub use http::HttpGateway;

pub fn build_gateway(config: &GatewayConfig) -> Result<Arc<dyn DataGateway>, GatewayError> {
    let http = HttpGateway::new(&config.base_url, config.timeout_secs)?;
    info!(
        event_name = "gateway.configured",
        base_url = %http.base_url(),
        timeout_secs = config.timeout_secs,
        fallback_to_fixtures = config.fallback_to_fixtures,
        "review gateway configured"
    );

    if config.fallback_to_fixtures {
        Ok(Arc::new(FallbackGateway::new(http, fixtures::static_gateway())))
    } else {
        Ok(Arc::new(http))
    }
}
