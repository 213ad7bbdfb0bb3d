pub mod api;
pub mod auth;
pub mod config;
pub mod counter;
pub mod database;
pub mod error;
pub mod logger;
pub mod model;
pub mod store;
pub mod trigger;
pub mod views;
