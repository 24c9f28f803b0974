mod types;

pub use types::{BodyRecord, BodyRepository, InMemoryBodyRepository};
