//! Definiciones de eventos y trait EventStore.

mod store;
mod types;

pub use store::{EventStore, InMemoryEventStore, SharedEventStore};
pub use types::{BodyEvent, BodyEventKind};
