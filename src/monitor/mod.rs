pub mod dedup;
pub mod evaluator;
pub mod history;
pub mod observer;
pub mod summary;


pub use observer::{AckOutcome, ConcurrentMonitor};
