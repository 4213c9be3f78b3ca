//! Gateway server assembly
//!
//! Builds the store components, wires them into shared state, and runs
//! the axum router. The request pipeline is uniform: authentication
//! (extractor) then access evaluation, then dispatch to the proxy, page,
//! or API handler.

pub mod handlers;
mod state;

pub use state::AppState;

use std::sync::Arc;

use axum::routing::{any, get, patch, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use svchub_storage::{RegistrationStore, ServiceRegistry, UserStore};

use crate::config::GatewayConfig;
use crate::token::TokenService;
use crate::{pages, proxy};

pub struct GatewayServer {
    config: GatewayConfig,
}

impl GatewayServer {
    pub fn new(config: GatewayConfig) -> Self {
        Self { config }
    }

    /// Open the stores, load the registry, and assemble shared state.
    pub async fn init_state(config: &GatewayConfig) -> anyhow::Result<AppState> {
        let users = Arc::new(UserStore::open(&config.data_dir).await?);
        let registrations = Arc::new(RegistrationStore::open(&config.data_dir).await?);
        let registry = Arc::new(ServiceRegistry::new(&config.services_dir));
        registry.load().await?;
        Ok(AppState {
            users,
            registrations,
            registry,
            tokens: Arc::new(TokenService::new(config.token_secret.as_bytes().to_vec())),
            http: reqwest::Client::new(),
            default_proxy_target: config.default_proxy_target.clone(),
        })
    }

    /// Run the gateway server until the process is stopped.
    pub async fn run(self) -> anyhow::Result<()> {
        let addr = self.config.addr()?;
        let state = Self::init_state(&self.config).await?;

        let mut router = build_router(state);
        if self.config.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
            router = router.layer(cors);
        }

        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("[gateway] listening on http://{addr}");
        axum::serve(listener, router).await?;
        Ok(())
    }
}

/// Build the Axum router.
///
/// Static prefixes (`/auth`, `/admin`, `/api`, ...) take precedence over
/// the `/{service_id}` captures, so service ids never shadow gateway
/// routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health))
        // Authentication
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login))
        .route("/auth/me", get(handlers::me))
        .route("/auth/change-password", post(handlers::change_password))
        .route("/auth/assign", post(handlers::assign))
        // Administration
        .route("/admin/users", get(handlers::admin_list_users))
        .route(
            "/admin/users/{user_id}",
            patch(handlers::admin_update_user).delete(handlers::admin_delete_user),
        )
        .route(
            "/admin/registration-requests",
            get(handlers::admin_list_requests),
        )
        .route(
            "/admin/registration-requests/{request_id}/approve",
            post(handlers::admin_approve_request),
        )
        .route(
            "/admin/registration-requests/{request_id}/reject",
            post(handlers::admin_reject_request),
        )
        .route("/admin/services", get(handlers::admin_list_services))
        .route(
            "/admin/services/{service_id}",
            patch(handlers::admin_update_service),
        )
        // Service catalog and documentation
        .route("/api/services", get(handlers::list_services))
        .route(
            "/api/services/{service_id}/docs/{doc_type}",
            get(pages::service_doc),
        )
        // Service assets, proxy, and entry pages
        .route(
            "/services-assets/{service_id}/{*asset}",
            get(pages::service_asset),
        )
        .route("/{service_id}/api", any(proxy::proxy_root))
        .route("/{service_id}/api/{*rest}", any(proxy::proxy_rest))
        .route("/{service_id}", get(pages::service_page))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
