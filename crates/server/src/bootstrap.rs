use std::sync::Arc;

use axum::Router;
use balview_core::config::AppConfig;
use balview_core::gateway::StaticGateway;
use balview_gateway::fixtures;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::{api, health};

pub struct Application {
    pub config: AppConfig,
    pub fixtures: Arc<StaticGateway>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("failed to bind `{address}`: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

pub fn bootstrap_with_config(config: AppConfig) -> Application {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );
    let fixtures = Arc::new(fixtures::static_gateway());
    info!(
        event_name = "system.bootstrap.fixtures_loaded",
        correlation_id = "bootstrap",
        variances = fixtures.rows().len(),
        transactions = fixtures.transaction_count(),
        "fixture dataset loaded"
    );
    Application { config, fixtures }
}

impl Application {
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.server.bind_address, self.config.server.port)
    }

    /// Review api plus health, open to any browser origin.
    pub fn router(&self) -> Router {
        api::router(Arc::clone(&self.fixtures))
            .merge(health::router(Arc::clone(&self.fixtures)))
            .layer(CorsLayer::permissive())
    }

    pub async fn bind(&self) -> Result<TcpListener, BootstrapError> {
        let address = self.address();
        TcpListener::bind(&address)
            .await
            .map_err(|source| BootstrapError::Bind { address, source })
    }
}
