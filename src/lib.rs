pub mod app;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod imaging;
pub mod ingest;
pub mod models;
pub mod repositories;
pub mod schema;
pub mod storage;
pub mod store;
