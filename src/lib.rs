pub mod config;
pub mod error;
pub mod model;
pub mod reddit;
pub mod routes;
pub mod server;
pub mod session;

pub use config::Config;
pub use server::Server;
