pub mod api;
pub mod routes;
pub mod shared;
pub mod system;
pub mod usecases;

use clap::{Parser, Subcommand};
use usecases::u501_resolve_part_status::cli::{self, ResolveArgs};

/// Запрос статуса жизненного цикла деталей DigiKey для Excel-таблиц
#[derive(Debug, Parser)]
#[command(name = "digikey-status", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Запустить web-сервер (по умолчанию)
    Serve,
    /// Обработать Excel файл в консоли
    Resolve(ResolveArgs),
    /// Запросить статус одной детали
    Lookup,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Serve);

    system::tracing::initialize(matches!(command, Command::Serve))?;
    let config = shared::config::load_config()?;

    match command {
        Command::Serve => serve(&config).await,
        Command::Resolve(args) => {
            if !cli::run_resolve(&config, args).await? {
                std::process::exit(1);
            }
            Ok(())
        }
        Command::Lookup => cli::run_lookup(&config).await,
    }
}

async fn serve(config: &shared::config::Config) -> anyhow::Result<()> {
    use axum::body::Body;
    use contracts::usecases::common::UseCaseMetadata;
    use contracts::usecases::u501_resolve_part_status::ResolvePartStatus;
    use axum::http::{header, Method, Request};
    use axum::middleware::{self, Next};
    use axum::response::Response;
    use std::net::SocketAddr;
    use tokio::net::TcpListener;
    use tower_http::cors::{Any, CorsLayer};

    // Простой middleware для логирования запросов
    async fn request_logger(req: Request<Body>, next: Next) -> Response {
        use axum::body::to_bytes;

        let start = std::time::Instant::now();
        let method = req.method().clone();
        let uri = req.uri().clone();

        let response = next.run(req).await;
        let (parts, body) = response.into_parts();

        // Читаем тело ответа, чтобы узнать реальный размер
        let bytes = match to_bytes(body, usize::MAX).await {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(
                    "{} {} -> {} body error after {}ms: {}",
                    method,
                    uri.path(),
                    parts.status.as_u16(),
                    start.elapsed().as_millis(),
                    e
                );
                return Response::from_parts(parts, Body::default());
            }
        };

        tracing::info!(
            "{:>6} {} -> {} | {:>5}ms | {:>12} bytes",
            method,
            uri.path(),
            parts.status.as_u16(),
            start.elapsed().as_millis(),
            shared::format::format_number(bytes.len())
        );

        Response::from_parts(parts, Body::from(bytes))
    }

    api::handlers::usecases::init_u501(config)?;
    tracing::info!(
        "Use case {} ready: {}",
        ResolvePartStatus::full_name(),
        ResolvePartStatus::display_name()
    );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    let app = routes::configure_routes(config)
        .layer(middleware::from_fn(request_logger))
        .layer(cors);

    let port = config.server.port;
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();

    tracing::info!("Attempting to bind server to http://{}", addr);
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => {
            tracing::info!("Server successfully bound to {}", addr);
            listener
        }
        Err(e) => {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                tracing::error!(
                    "Error: Port {} is already in use. Please ensure no other process is using this port.",
                    port
                );
            } else {
                tracing::error!("Failed to bind to port {}. Error: {}", port, e);
            }
            return Err(e.into());
        }
    };

    axum::serve(listener, app).await?;

    Ok(())
}
