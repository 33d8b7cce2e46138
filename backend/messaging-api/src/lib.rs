pub mod clients;
pub mod config;
pub mod error;
pub mod friendship;
pub mod logging;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod state;
