// Common library for the tubewatch upload announcer

pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod notify;
pub mod pacing;
pub mod scanner;
pub mod search;
pub mod sweeper;
