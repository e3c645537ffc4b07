use timeline_server::llm::{OpenAiClient, OpenAiConfig, TimelineGenerator};
use timeline_server::{server, storage};
mod cli;

use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    use clap::Parser;
    let args = cli::Cli::parse();

    if let Some(cli::Command::Schema) = args.command {
        print!("{}", server::schema::sdl());
        return;
    }

    // Missing .env is fine; real environment wins over it
    dotenvy::dotenv().ok();

    // Console-only logging with env-driven level
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_ansi(true)
        .init();

    let config = match server::AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error=%e, "Failed to load config");
            std::process::exit(2);
        }
    };

    // Ensure data dir exists
    if let Some(parent) = std::path::Path::new(&config.db_path).parent()
        && !parent.as_os_str().is_empty()
    {
        let _ = std::fs::create_dir_all(parent);
    }
    let store = match storage::Store::connect_sqlite(&config.db_path).await {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error=%e, path=%config.db_path, "Failed to connect DB");
            std::process::exit(3);
        }
    };

    if let Some(cli::Command::Seed) = args.command {
        seed(&store).await;
        return;
    }

    let api_key = config.openai_api_key.clone().unwrap_or_else(|| {
        tracing::warn!("OPENAI_API_KEY is not set; generateTimeline will fail upstream");
        String::new()
    });
    let backend = match OpenAiClient::new(OpenAiConfig {
        base_url: config.openai_base_url.clone(),
        api_key,
        timeout: config.llm_timeout(),
    }) {
        Ok(b) => b,
        Err(e) => {
            tracing::error!(error=%e, "Failed to build LLM client");
            std::process::exit(2);
        }
    };
    let generator = TimelineGenerator::new(Arc::new(backend), config.openai_model.clone());
    tracing::info!(
        model = %generator.model(),
        base_url = %config.openai_base_url,
        origins = config.allow_origins.len(),
        "LLM backend configured"
    );

    let port = config.listen_port;
    let state = server::AppState::new(config, store, generator);
    let app = server::router(state);

    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    tracing::info!(%addr, "Starting server");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(error=%e, %addr, "Failed to bind listener");
            std::process::exit(4);
        }
    };

    let shutdown_token = CancellationToken::new();
    let shutdown_token_for_server = shutdown_token.clone();

    // Graceful shutdown on SIGINT/SIGTERM with fallback timeout for slow in-flight requests (LLM calls)
    let mut server_task = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_token_for_server.cancelled_owned())
            .await
    });

    tokio::select! {
        _ = shutdown_signal() => {}
        res = &mut server_task => {
            match res {
                Ok(Ok(())) => {}
                Ok(Err(err)) => tracing::error!(%err, "server error"),
                Err(e) => tracing::error!(error=%e, "server task join error"),
            }
            return;
        }
    }
    tracing::info!("shutdown: initiating graceful stop");
    shutdown_token.cancel();
    match tokio::time::timeout(std::time::Duration::from_secs(3), &mut server_task).await {
        Ok(join_res) => match join_res {
            Ok(Ok(())) => {}
            Ok(Err(err)) => tracing::error!(%err, "server error"),
            Err(e) => tracing::error!(error=%e, "server task join error"),
        },
        Err(_) => {
            tracing::warn!("shutdown: forcing server abort due to timeout");
            server_task.abort();
        }
    }
}

async fn seed(store: &storage::Store) {
    let summary = match store.reset_and_seed().await {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error=%e, "Failed to seed DB");
            std::process::exit(5);
        }
    };
    tracing::info!(
        user_id = %summary.user_id,
        goal_id = %summary.goal_id,
        timeline_id = %summary.timeline_id,
        tasks = summary.task_ids.len(),
        "seed: inserted sample data"
    );
    match store.table_counts().await {
        Ok(c) => tracing::info!(
            users = c.users,
            goals = c.goals,
            timelines = c.timelines,
            tasks = c.tasks,
            "seed: table counts"
        ),
        Err(e) => tracing::warn!(error=%e, "seed: could not count rows"),
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigint = signal(SignalKind::interrupt()).expect("listen SIGINT");
        let mut sigterm = signal(SignalKind::terminate()).expect("listen SIGTERM");
        tokio::select! {
            _ = sigint.recv() => {
                tracing::info!("shutdown: received SIGINT");
            }
            _ = sigterm.recv() => {
                tracing::info!("shutdown: received SIGTERM");
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("shutdown: received Ctrl+C");
    }
}
