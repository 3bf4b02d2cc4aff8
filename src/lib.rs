pub mod api;
pub mod calendar;
pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod state;
