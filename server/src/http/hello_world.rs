use crate::http::error::CustomError;
use crate::http::state::AppState;
use axum::extract::State;
use axum::http::Method;
use axum::response::Html;
use axum::routing::any;
use axum::Router;
use std::sync::Arc;
use tracing::error;

pub const HELLO_WORLD_PATH: &str = "/helloworld";
const TITLE: &str = "HelloWorld";
const MESSAGE: &str = "Hello World!";

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(HELLO_WORLD_PATH, any(hello_world))
        .with_state(state)
}

async fn hello_world(
    State(state): State<Arc<AppState>>,
    method: Method,
) -> Result<Html<String>, CustomError> {
    if method != Method::GET {
        return Err(CustomError::MethodNotAllowed);
    }

    match state.templates.render_hello_world(TITLE, MESSAGE) {
        Ok(page) => Ok(Html(page)),
        Err(err) => {
            error!("Failed to render {HELLO_WORLD_PATH}: {err}");
            panic!("rendering {HELLO_WORLD_PATH} failed: {err}");
        }
    }
}
