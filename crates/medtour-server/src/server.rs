use std::{net::SocketAddr, sync::Arc};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};
use medtour_core::models::{Appointment, Doctor, Hospital, Invoice, Patient, User};
use medtour_core::{Record, UserService};
use medtour_db_postgres::PostgresStorage;
use medtour_storage::DynStorage;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, services::ServeDir, trace::TraceLayer,
};

use crate::{
    bootstrap,
    config::{AppConfig, StorageBackend},
    handlers, middleware as app_middleware, upload,
};

/// Multipart framing allowance on top of the file size limit.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub storage: DynStorage,
    pub users: UserService,
}

impl AppState {
    pub fn new(config: AppConfig, storage: DynStorage) -> Self {
        Self {
            users: UserService::new(storage.clone()),
            config: Arc::new(config),
            storage,
        }
    }
}

pub struct MedtourServer {
    addr: SocketAddr,
    app: Router,
}

/// Opens the configured storage backend. Postgres connects lazily.
pub fn create_storage(cfg: &AppConfig) -> anyhow::Result<DynStorage> {
    match cfg.storage.backend {
        StorageBackend::Memory => {
            tracing::info!("using in-memory storage");
            Ok(medtour_db_memory::create_storage())
        }
        StorageBackend::Postgres => {
            let pg = cfg
                .storage
                .postgres
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("storage.postgres is not configured"))?;
            let storage = PostgresStorage::new(pg.to_backend_config())?;
            tracing::info!(pool_size = pg.pool_size, "using postgres storage");
            Ok(Arc::new(storage))
        }
    }
}

fn resource_routes<T: Record>(router: Router<AppState>, path: &str) -> Router<AppState> {
    router
        .route(
            path,
            get(handlers::list_records::<T>).post(handlers::create_record::<T>),
        )
        .route(
            &format!("{path}/{{id}}"),
            get(handlers::get_record::<T>)
                .put(handlers::update_record::<T>)
                .delete(handlers::delete_record::<T>),
        )
}

/// Builds the router over an existing state.
pub fn router(state: AppState) -> Router {
    let body_limit = state.config.server.body_limit_bytes;
    let upload_limit = state.config.uploads.max_file_bytes + MULTIPART_OVERHEAD_BYTES;
    let uploads_dir = state.config.uploads.dir.clone();

    let mut api = Router::new()
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .route("/readyz", get(handlers::readyz))
        .route("/kpi", get(handlers::get_kpi))
        .route("/search", get(handlers::search))
        .route(
            "/upload",
            post(upload::upload_file).layer(DefaultBodyLimit::max(upload_limit)),
        );
    api = resource_routes::<Patient>(api, "/patients");
    api = resource_routes::<Doctor>(api, "/doctors");
    api = resource_routes::<Hospital>(api, "/hospitals");
    api = resource_routes::<Invoice>(api, "/invoices");
    api = resource_routes::<Appointment>(api, "/appointments");
    // Users are created through the service so the password gets hashed
    api = api
        .route(
            "/users",
            get(handlers::list_records::<User>).post(handlers::create_user),
        )
        .route(
            "/users/{id}",
            get(handlers::get_record::<User>)
                .put(handlers::update_record::<User>)
                .delete(handlers::delete_record::<User>),
        );

    api.nest_service("/uploads", ServeDir::new(uploads_dir))
        .fallback(handlers::fallback)
        .with_state(state)
        // Layer order, outermost last: body limit, trace, compression, cors, request id
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    use tracing::field::Empty;
                    let req_id = req
                        .extensions()
                        .get::<app_middleware::RequestId>()
                        .and_then(|id| id.0.to_str().ok())
                        .unwrap_or("")
                        .to_string();
                    tracing::info_span!(
                        "http.request",
                        http.method = %req.method(),
                        http.target = %req.uri(),
                        http.status_code = Empty,
                        request_id = %req_id
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        span.record(
                            "http.status_code",
                            tracing::field::display(res.status().as_u16()),
                        );
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = latency.as_millis() as u64,
                            "request handled"
                        );
                    },
                ),
        )
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(app_middleware::request_id))
}

/// Opens storage, seeds demo data when enabled, and builds the router.
pub async fn build_app(cfg: &AppConfig) -> anyhow::Result<Router> {
    let storage = create_storage(cfg)?;
    if cfg.bootstrap.seed_demo_data {
        // Seeding failures are logged and the server still starts
        if let Err(e) = bootstrap::seed_demo_data(&storage).await {
            tracing::warn!(error = %e, "demo data seeding failed");
        }
    }
    Ok(router(AppState::new(cfg.clone(), storage)))
}

pub struct ServerBuilder {
    addr: SocketAddr,
    config: AppConfig,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    pub fn new() -> Self {
        let cfg = AppConfig::default();
        Self {
            addr: cfg.addr(),
            config: cfg,
        }
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.addr = cfg.addr();
        self.config = cfg;
        self
    }

    pub async fn build(self) -> anyhow::Result<MedtourServer> {
        let app = build_app(&self.config).await?;
        Ok(MedtourServer {
            addr: self.addr,
            app,
        })
    }
}

impl MedtourServer {
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
