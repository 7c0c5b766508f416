pub mod engine;

pub use engine::{ConcurrentQueryEngine, QueryEngine};
