pub mod args;
pub mod http;
pub mod server_error;
pub mod templates;
