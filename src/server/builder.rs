//! ServerBuilder for fluent API to build HTTP servers

use super::handlers::AppState;
use super::router::{api_routes, health_routes};
use crate::core::service::{ListingRepository, SearchIndex};
use crate::market::Marketplace;
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Builder for the marketplace HTTP server
///
/// # Example
///
/// ```ignore
/// ServerBuilder::new()
///     .with_repository(InMemoryRepository::seeded())
///     .serve("127.0.0.1:3000")
///     .await?;
/// ```
#[derive(Default)]
pub struct ServerBuilder {
    repository: Option<Arc<dyn ListingRepository>>,
    index: Option<Arc<dyn SearchIndex>>,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the listing repository (required)
    pub fn with_repository(mut self, repository: impl ListingRepository + 'static) -> Self {
        self.repository = Some(Arc::new(repository));
        self
    }

    pub fn with_shared_repository(mut self, repository: Arc<dyn ListingRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Put an external search index in front of local matching
    pub fn with_search_index(mut self, index: Arc<dyn SearchIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// Merge additional routes into the router
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    pub fn build_marketplace(&mut self) -> Result<Marketplace> {
        let repository = self
            .repository
            .take()
            .ok_or_else(|| anyhow::anyhow!("ListingRepository is required. Call .with_repository()"))?;

        let mut marketplace = Marketplace::new(repository);
        if let Some(index) = self.index.take() {
            marketplace = marketplace.with_index(index);
        }
        Ok(marketplace)
    }

    /// Build the router with tracing and CORS layers
    pub fn build(mut self) -> Result<Router> {
        let marketplace = self.build_marketplace()?;
        tracing::info!(
            store = marketplace.repository().backend_name(),
            search = marketplace.index().map(|i| i.provider_name()).unwrap_or("local"),
            "marketplace ready"
        );

        let mut app = health_routes().merge(api_routes(AppState::new(marketplace)));
        for custom_router in std::mem::take(&mut self.custom_routes) {
            app = app.merge(custom_router);
        }

        Ok(app
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()))
    }

    /// Serve the application with graceful shutdown
    ///
    /// Handles SIGTERM and SIGINT (Ctrl+C).
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
