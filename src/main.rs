mod core;
mod features;
mod shared;

use crate::core::config::Config;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware, seeder};
use crate::features::comments::{routes as comments_routes, CommentService};
use crate::features::files::{routes as files_routes, FileService};
use crate::features::organizations::{routes as organizations_routes, OrganizationService};
use crate::features::stats::{routes as stats_routes, PostgresIntrospector, StatsService};
use crate::features::users::{routes as users_routes, UserService};
use axum::{extract::DefaultBodyLimit, Router};
use clap::{Parser, Subcommand};
use sqlx::PgPool;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP server (default)
    Serve,
    /// Fill the database with generated demo data
    Seed {
        #[arg(long, default_value_t = 100)]
        organizations: usize,
        #[arg(long, default_value_t = 10_000)]
        users: usize,
        #[arg(long, default_value_t = 100_000)]
        files: usize,
        #[arg(long, default_value_t = 1_000)]
        batch_size: usize,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

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
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads, cli.command.unwrap_or(Command::Serve)))
}

async fn async_main(worker_threads: usize, command: Command) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;
    tracing::info!(
        "Configuration loaded: tokio_worker_threads={}, pid={}",
        worker_threads,
        std::process::id()
    );

    let pool = database::create_pool(&config.database).await?;
    tracing::info!("Database connection pool created");

    if config.database.run_migrations {
        tracing::info!("Running database migrations...");
        database::run_migrations(&pool)
            .await
            .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
        tracing::info!("Database migrations completed successfully");
    } else {
        tracing::info!("Skipping database migrations (DB_RUN_MIGRATIONS=false)");
    }

    if let Command::Seed {
        organizations,
        users,
        files,
        batch_size,
    } = command
    {
        let plan = seeder::SeedPlan {
            organizations,
            users,
            files,
            batch_size,
        };
        tracing::info!(?plan, "Seeding database");
        seeder::seed(&pool, &plan).await?;
        return Ok(());
    }

    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };
    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
        .merge(api_routes(pool))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.app.max_request_body_size))
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        .layer(
            ServiceBuilder::new()
                // Generate X-Request-Id using UUID v7 (or use client-provided one)
                .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(middleware::MakeSpanWithRequestId)
                        .on_request(DefaultOnRequest::new().level(Level::INFO))
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                .layer(PropagateRequestIdLayer::x_request_id()),
        );

    let addr = config.app.server_address();
    let listener = bind_listener(&addr)?;
    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    // Peer address feeds the activity log when no proxy header is present
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Wire services to their feature routers
fn api_routes(pool: PgPool) -> Router {
    let organization_service = Arc::new(OrganizationService::new(pool.clone()));
    let user_service = Arc::new(UserService::new(pool.clone()));
    let comment_service = Arc::new(CommentService::new(
        pool.clone(),
        Arc::clone(&user_service),
    ));
    let file_service = Arc::new(FileService::new(
        pool.clone(),
        Arc::clone(&user_service),
        Arc::clone(&organization_service),
        Arc::clone(&comment_service),
    ));
    let stats_service = Arc::new(StatsService::new(Arc::new(PostgresIntrospector::new(pool))));
    tracing::info!("Services initialized");

    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }

    Router::new()
        .route("/health", axum::routing::get(health_check))
        .merge(organizations_routes::routes(organization_service))
        .merge(users_routes::routes(user_service))
        .merge(files_routes::routes(file_service))
        .merge(comments_routes::routes(comment_service))
        .merge(stats_routes::routes(stats_service))
}

/// TCP listener tuned for many short-lived keep-alive connections
fn bind_listener(addr: &str) -> anyhow::Result<tokio::net::TcpListener> {
    let socket_addr: SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nodelay(true)?;

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

    Ok(tokio::net::TcpListener::from_std(socket.into())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    use crate::shared::test_helpers::{lazy_pool, test_server};

    #[test]
    fn test_cli_defaults_to_serve() {
        let cli = Cli::try_parse_from(["designhub-core"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_seed_arguments() {
        let cli = Cli::try_parse_from(["designhub-core", "seed"]).unwrap();
        let Some(Command::Seed {
            organizations,
            users,
            files,
            batch_size,
        }) = cli.command
        else {
            panic!("expected seed command");
        };
        assert_eq!(
            seeder::SeedPlan {
                organizations,
                users,
                files,
                batch_size,
            },
            seeder::SeedPlan::default()
        );

        let cli = Cli::try_parse_from(["designhub-core", "seed", "--files", "50"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Seed { files: 50, .. })));
        assert!(Cli::try_parse_from(["designhub-core", "seed", "--users", "many"]).is_err());
    }

    #[tokio::test]
    async fn test_health() {
        let server = test_server(api_routes(lazy_pool()));
        server.get("/health").await.assert_status(StatusCode::OK);
    }

    #[tokio::test]
    async fn test_routers_merge_without_conflicts() {
        let server = test_server(api_routes(lazy_pool()));

        server
            .get("/v1/files?sort_by=nope")
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        server
            .post("/v1/users")
            .json(&serde_json::json!({}))
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }
}
