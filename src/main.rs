use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use ladle::user::UserBuilder;

const DEFAULT_PORT: u16 = 8000;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(
            |_| EnvFilter::new("ladle=info,tower_http=info"),
        ))
        .init();

    let state = ladle::initialize_state().await?;

    // `ladle --create-superuser EMAIL PASSWORD` provisions an admin account
    // and exits.
    let args: Vec<String> = std::env::args().collect();
    if args.get(1).map(String::as_str) == Some("--create-superuser") {
        let (Some(email), Some(password)) = (args.get(2), args.get(3)) else {
            tracing::error!("usage: ladle --create-superuser EMAIL PASSWORD");
            std::process::exit(1);
        };

        let user = UserBuilder::new()
            .email(email)
            .password(password)
            .superuser()
            .build(state.db.sqlite.clone(), Arc::clone(&state.crypto))
            .create()
            .await?;
        tracing::info!(email = %user.data.email, "superuser created");

        return Ok(());
    }

    let port = state.config.port.unwrap_or(DEFAULT_PORT);
    let address = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&address).await?;
    tracing::info!(%address, "server started");

    axum::serve(listener, ladle::app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "cannot install ^C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(err) => {
                tracing::error!(error = %err, "cannot install SIGTERM handler");
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received ^C, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
