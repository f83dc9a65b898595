use thiserror::Error;
use tokio::io;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("IO error")]
    IoError(#[from] io::Error),
    #[error("Cannot load templates")]
    CannotLoadTemplates(#[from] RenderError),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Template error: {0}")]
    TemplateError(#[from] minijinja::Error),
}
