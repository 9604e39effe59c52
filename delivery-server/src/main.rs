use std::process::ExitCode;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use delivery_server::api::{ApiClient, Backend, DeliveryApi, MockDeliveryApi, Session};
use delivery_server::cache::{CacheConfig, CachedDeliveryApi};
use delivery_server::config::ServerConfig;
use delivery_server::resolver::ResolveMode;
use delivery_server::web::{AppState, create_router};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("delivery_server=info,tower_http=info")),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("{message}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), String> {
    let config = ServerConfig::from_env().map_err(|e| e.to_string())?;

    let session = match &config.api_token {
        Some(token) => Session::with_token(token.clone()),
        None => Session::new(),
    };

    let backend = match &config.mock_data {
        Some(path) => {
            let mock = MockDeliveryApi::from_file(path)
                .map_err(|e| format!("failed to load {}: {e}", path.display()))?;
            let (locations, routes) = mock.counts().await;
            info!(
                path = %path.display(),
                locations,
                routes,
                "serving in-memory delivery catalog"
            );
            Backend::Mock(mock)
        }
        None => {
            if config.api_token.is_none() {
                warn!("DELIVERY_API_TOKEN not set; sign in at /login before using the API");
            }
            let client = ApiClient::new(config.api_config(), session.clone())
                .map_err(|e| format!("failed to create API client: {e}"))?;
            info!(url = %config.api_url, "using delivery API");
            Backend::Http(client)
        }
    };

    let api = CachedDeliveryApi::new(backend, &CacheConfig::default());
    warm_cache(&api, config.resolve_mode).await;

    let state = AppState::new(api, session, config.resolve_mode);
    let app = create_router(state, &config.static_dir);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .map_err(|e| format!("failed to bind {}: {e}", config.bind_addr))?;
    info!(
        addr = %config.bind_addr,
        mode = %config.resolve_mode,
        "delivery price calculator listening on http://{}",
        config.bind_addr
    );

    axum::serve(listener, app)
        .await
        .map_err(|e| format!("server error: {e}"))
}

/// Load the hub list, and in by-origin mode every hub's routes, up front.
///
/// Failures only cost the first visitor a slower page.
async fn warm_cache(api: &CachedDeliveryApi<Backend>, mode: ResolveMode) {
    let locations = match api.list_locations().await {
        Ok(locations) => locations,
        Err(e) => {
            warn!(error = %e, "could not preload locations");
            return;
        }
    };
    if mode == ResolveMode::ByOrigin {
        let origins: Vec<_> = locations.iter().map(|l| l.id.clone()).collect();
        let warmed = api.warm(&origins).await;
        info!(hubs = locations.len(), warmed, "route cache warmed");
    } else {
        info!(hubs = locations.len(), "location cache warmed");
    }
}
