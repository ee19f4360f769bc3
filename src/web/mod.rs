//! HTTP surface: HTML form pages and a JSON prediction API

pub mod handlers;
pub mod routes;
pub mod views;

pub use routes::{create_router, AppState};
