use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use super::{BodyEvent, BodyEventKind};
use crate::errors::StoreError;

/// Almacenamiento de eventos append-only.
pub trait EventStore {
    /// Agrega un evento a partir de su kind y devuelve el evento completo (con seq y ts).
    fn append_kind(&mut self, body_id: Uuid, kind: BodyEventKind) -> Result<BodyEvent, StoreError>;
    /// Lista eventos de un body (orden ascendente por seq).
    fn list(&self, body_id: Uuid) -> Result<Vec<BodyEvent>, StoreError>;
}

/// Store compartido entre el handle, su hilo de trabajo y quien lo creó.
pub type SharedEventStore = Arc<Mutex<dyn EventStore + Send>>;

#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    pub inner: HashMap<Uuid, Vec<BodyEvent>>,
}

impl InMemoryEventStore {
    pub fn shared() -> Arc<Mutex<Self>> {
        Arc::new(Mutex::new(Self::default()))
    }
}

impl EventStore for InMemoryEventStore {
    fn append_kind(&mut self, body_id: Uuid, kind: BodyEventKind) -> Result<BodyEvent, StoreError> {
        let vec = self.inner.entry(body_id).or_default();
        let ev = BodyEvent { seq: vec.len() as u64,
                             body_id,
                             kind,
                             ts: Utc::now() };
        vec.push(ev.clone());
        Ok(ev)
    }

    fn list(&self, body_id: Uuid) -> Result<Vec<BodyEvent>, StoreError> {
        Ok(self.inner.get(&body_id).cloned().unwrap_or_default())
    }
}
