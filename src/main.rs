mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::{Config, ContentBackendKind};
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware};
use crate::features::content::backends::{
    ContentBackend, FileContentBackend, MemoryContentBackend,
};
use crate::features::content::clients::{HeroRemote, HttpHeroRemote, RepositoryHeroRemote};
use crate::features::content::repositories::{HeroRepository, PgHeroRepository};
use crate::features::content::{self, ContentStore, HeroService};
use crate::features::gallery::repositories::PgGalleryRepository;
use crate::features::gallery::{self, GalleryService};
use crate::features::uploads::{self, UploadPolicy, UploadService};
use crate::modules::storage::{LocalFileStore, MediaProbe};
use crate::shared::constants::{ADMIN_REALM, UPLOAD_DIR};
use axum::{extract::DefaultBodyLimit, middleware::from_fn, Router};
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

const SWAGGER_REALM: &str = "Swagger UI";

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    // Log system info
    let available_cpus = std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);
    tracing::info!(
        "System info: available_cpus={}, tokio_worker_threads={}, pid={}",
        available_cpus,
        worker_threads,
        std::process::id()
    );

    tracing::info!("Configuration loaded successfully");

    // Create database connection pool
    let pool = database::create_pool(&config.database).await?;
    tracing::info!("Database connection pool created");

    // Run migrations automatically
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    tracing::info!("Database migrations completed successfully");

    // Upload pipeline: an invalid policy table aborts startup
    let upload_policy = UploadPolicy::with_overrides(&config.uploads.max_size_overrides_mb)
        .map_err(|e| anyhow::anyhow!("Invalid upload policy: {}", e))?;
    let media_probe = MediaProbe::new(
        config.uploads.identify_bin.clone(),
        config.uploads.ffprobe_bin.clone(),
        config.uploads.ffmpeg_bin.clone(),
    );
    let file_store = LocalFileStore::new(config.uploads.public_root.clone(), media_probe);
    let upload_service = Arc::new(UploadService::new(Arc::new(upload_policy), file_store));
    upload_service
        .ensure_folders()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create upload folders: {}", e))?;
    tracing::info!(
        "Upload folders ready under {}",
        config.uploads.public_root.join(UPLOAD_DIR).display()
    );

    // Content store
    let content_backend: Arc<dyn ContentBackend> = match config.content.backend {
        ContentBackendKind::Memory => Arc::new(MemoryContentBackend::new()),
        ContentBackendKind::File => {
            Arc::new(FileContentBackend::new(config.content.file_path.clone()))
        }
    };
    tracing::info!("Content backend: {:?}", config.content.backend);

    let hero_repository: Arc<dyn HeroRepository> = Arc::new(PgHeroRepository::new(pool.clone()));
    let hero_remote: Arc<dyn HeroRemote> = match &config.content.hero_remote_url {
        Some(url) => {
            tracing::info!("Hero content syncs with remote {}", url);
            Arc::new(HttpHeroRemote::new(url))
        }
        None => {
            tracing::info!("Hero content syncs with the local database");
            Arc::new(RepositoryHeroRemote::new(Arc::clone(&hero_repository)))
        }
    };
    let content_store = Arc::new(ContentStore::new(
        content_backend,
        Some(hero_remote),
        config.content.hero_remote_timeout,
    ));
    let hero_service = Arc::new(HeroService::new(hero_repository));

    // Gallery
    let gallery_service = Arc::new(GalleryService::new(Arc::new(PgGalleryRepository::new(
        pool.clone(),
    ))));
    tracing::info!("Services initialized");

    // Build application router with dynamic swagger config
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    // Build swagger router
    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(
                Arc::new(credentials),
                SWAGGER_REALM,
            )))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    // Routes that modify content, guarded by basic auth when configured
    let admin_routes = Router::new()
        .merge(uploads::admin_routes(Arc::clone(&upload_service)))
        .merge(content::admin_routes(Arc::clone(&content_store)))
        .merge(content::hero_admin_routes(Arc::clone(&hero_service)))
        .merge(gallery::admin_routes(Arc::clone(&gallery_service)));
    let admin_routes = if let Some(credentials) = config.admin.credentials() {
        tracing::info!("Admin basic auth enabled");
        admin_routes.route_layer(from_fn(middleware::basic_auth_middleware(
            Arc::new(credentials),
            ADMIN_REALM,
        )))
    } else {
        tracing::warn!("Admin basic auth disabled (ADMIN_USERNAME/ADMIN_PASSWORD not set)");
        admin_routes
    };

    // Simple health check endpoint (no auth required)
    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    // Public routes (no auth required)
    let public_routes = Router::new()
        .merge(uploads::routes(Arc::clone(&upload_service)))
        .merge(content::routes(Arc::clone(&content_store)))
        .merge(content::hero_routes(Arc::clone(&hero_service)))
        .merge(gallery::routes(Arc::clone(&gallery_service)))
        .nest_service(
            "/upload",
            ServeDir::new(config.uploads.public_root.join(UPLOAD_DIR)),
        );

    let app = Router::new()
        .merge(swagger)
        .merge(admin_routes)
        .merge(public_routes)
        .merge(health_route)
        .layer(DefaultBodyLimit::max(config.app.max_request_body_size))
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    // Start server
    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    // Use socket2 for TCP listener configuration
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nodelay(true)?;

    socket.set_recv_buffer_size(256 * 1024)?;
    socket.set_send_buffer_size(256 * 1024)?;

    #[cfg(target_os = "linux")]
    {
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(std::time::Duration::from_secs(60))
            .with_interval(std::time::Duration::from_secs(10))
            .with_retries(3);
        socket.set_tcp_keepalive(&keepalive)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
        socket.set_tcp_keepalive(&keepalive)?;
    }

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on {}", format!("http://{}", addr));
    tracing::info!(
        "Swagger UI available at {}",
        format!("http://{}/swagger-ui/", addr)
    );

    axum::serve(listener, app).await?;

    Ok(())
}
