pub mod args;
pub mod error;
pub mod probe;
pub mod runner;
pub mod server;
pub mod shutdown;
pub mod signals;
pub mod vegeta;
