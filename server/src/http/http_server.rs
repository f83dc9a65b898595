use crate::http::error::CustomError;
use crate::http::hello_world;
use crate::http::state::AppState;
use crate::server_error::ServerError;
use crate::templates::Templates;
use axum::Router;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

pub fn router(templates: Templates) -> Router {
    let app_state = Arc::new(AppState { templates });
    hello_world::router(app_state).fallback(|| async { CustomError::NotFound })
}

/// Binds `address` and serves until `shutdown` resolves.
pub async fn start<F>(address: &str, shutdown: F) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(address).await?;
    serve(listener, shutdown).await
}

pub async fn serve<F>(listener: TcpListener, shutdown: F) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(Templates::new()?);
    info!("Started HTTP server on: {:?}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("HTTP server closed.");
    Ok(())
}
