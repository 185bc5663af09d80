pub mod auth;
pub mod health;
pub mod user;

pub use auth::create_auth_routes;
pub use health::create_health_routes;
pub use user::create_api_routes;
