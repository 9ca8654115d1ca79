// Channel scan scheduling and the announcement pipeline

pub mod engine;

pub use engine::{CycleReport, ScanConfig, ScanEngine};
