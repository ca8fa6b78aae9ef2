mod error;
mod routes;

pub mod app;
pub mod config;
pub mod decision;
pub mod model_service;
pub mod normalizer;
pub mod ort_service;
pub mod server;
pub mod store;
pub mod telemetry;
pub mod upload;

pub use app::start_app;
