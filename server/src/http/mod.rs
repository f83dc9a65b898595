pub mod error;
pub mod hello_world;
pub mod http_server;
pub mod state;
