//! Utility functions shared across the engine

pub mod progress;

pub use progress::{create_main_progress_bar, finish_progress_bar};
