pub mod app;
pub mod auth;
pub mod config;
pub mod controller;
pub mod dates;
pub mod errors;
pub mod export;
pub mod handlers;
pub mod models;
pub mod quotes;
pub mod remote;
pub mod state;
pub mod stats;
pub mod storage;
pub mod sync;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use storage::load_data;
