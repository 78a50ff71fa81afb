pub mod config;
pub mod error;
pub mod render;
pub mod routes;
pub mod warehouse;

pub use error::AppError;
pub use routes::{create_router, AppState};
