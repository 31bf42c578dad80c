use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    config::{self, AppConfig, CorsConfig, ServerConfig},
    database::{self, PgProductStore, ProductStore},
    error::{AppError, Result},
    routes,
    services::{ImageUploader, S3ImageUploader},
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ProductStore>,
    pub uploader: Arc<dyn ImageUploader>,
}

impl AppState {
    pub fn new(store: Arc<dyn ProductStore>, uploader: Arc<dyn ImageUploader>) -> Self {
        Self { store, uploader }
    }
}

pub async fn build(config: &AppConfig) -> Result<Router> {
    let pool = database::create_pool(&config.database)?;
    database::spawn_migrations(pool.clone());

    let s3_client = config::load_s3_client(&config.s3).await;

    let state = AppState::new(
        Arc::new(PgProductStore::new(pool)),
        Arc::new(S3ImageUploader::new(s3_client, &config.s3)),
    );

    router(state, &config.server, &config.cors)
}

pub fn router(state: AppState, server: &ServerConfig, cors: &CorsConfig) -> Result<Router> {
    let app = routes::create_router()
        .layer(DefaultBodyLimit::max(server.max_body_size))
        .layer(cors_layer(cors)?)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

fn cors_layer(config: &CorsConfig) -> Result<CorsLayer> {
    if config.allowed_origins.is_empty() {
        return Ok(CorsLayer::permissive());
    }

    let allowed_origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|_| AppError::ConfigError(format!("Invalid CORS origin: {}", origin)))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .allow_origin(allowed_origins))
}
