//! Product catalog: CRUD screens over SQLite with image uploads kept on disk.

pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
