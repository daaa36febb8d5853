pub mod common;
pub mod config;
pub mod history;
pub mod queue;
pub mod roll;
pub mod scan;
pub mod stats;
pub mod submit;
pub mod sync;
