use anyhow::{anyhow, Context, Result};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use orkes_blob_bridge::azure::{InvokeRequest, InvokeResponse};
use orkes_blob_bridge::trigger::Trigger;
use orkes_blob_bridge::{app, client};
use std::env;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Handle one blob invocation delivered by the Functions host. A 500
/// answer makes the host mark the invocation failed.
async fn function_handler(Json(invocation): Json<InvokeRequest>) -> Response {
    let result = async {
        let trigger = Trigger::from_invocation(&invocation)?;
        app::current().handle(&trigger, client::current()).await
    }
    .await;
    match result {
        Ok(execution_id) => Json(InvokeResponse::started(&execution_id)).into_response(),
        Err(e) => {
            error!("Failed to start Orkes workflow: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Run the Azure Functions custom handler: an HTTP server the
/// Functions host invokes once per blob landing in the watched
/// container, each invocation starting one Conductor workflow.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .without_time()
        .init();
    app::init()?;
    client::init()?;

    let port = env::var("FUNCTIONS_CUSTOMHANDLER_PORT")
        .unwrap_or(String::from("8080"))
        .parse::<u16>()
        .context("FUNCTIONS_CUSTOMHANDLER_PORT must be a port number")?;
    let addr = format!("127.0.0.1:{}", port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening for Functions host invocations on {}", addr);

    let router = Router::new().route("/OrkesBlobTrigger", post(function_handler));
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow!("{:?}", e))
}

/// Wait for Ctrl+C or SIGTERM, letting in-flight invocations finish.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
