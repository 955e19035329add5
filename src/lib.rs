pub mod api;
pub mod backend;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod service;

pub use api::{router, AppState};
pub use backend::{create_client, HttpStoreBackend, StoreBackend};
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use service::{CategoryService, StockService};
