pub mod app;
pub mod config;
pub mod engine;
pub mod event;
pub mod notify;
pub mod quotes;
pub mod session;
pub mod store;
pub mod ui;
