// Study Mode - upload study material and ask questions grounded on it

pub mod config;
pub mod documents;
pub mod llm;
pub mod models;
pub mod routes;
pub mod session;
pub mod types;
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
