pub mod config;
pub mod controllers;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;

pub use config::AppConfig;
pub use error::ApiError;
pub use routes::router;
pub use state::AppState;
