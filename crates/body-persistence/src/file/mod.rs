//! `EventStore` durable sobre archivos JSON-lines.
//!
//! Objetivo general del módulo:
//! - Paridad 1:1 con `InMemoryEventStore`: mismo orden por `seq`, mismo
//!   replay.
//! - Un archivo por body (`<body_id>.jsonl`), sólo append; nunca se
//!   reescriben líneas.
//! - Cada línea guarda `{hash, event}` donde `hash` es blake3 sobre el JSON
//!   canónico del evento; una línea que no verifica se reporta como
//!   `PersistenceError::Corrupted` en lugar de reproducirse.
//! - Una última línea sin `\n` que no parsea es una escritura incompleta
//!   (caída durante el append): se ignora al leer y se trunca antes del
//!   siguiente append.

use chrono::Utc;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use body_core::hashing::hash_value;
use body_core::{BodyEvent, BodyEventKind, BodyRecord, BodyRepository, EventStore, StoreError};

use crate::config::StoreConfig;
use crate::error::PersistenceError;

const EXTENSION: &str = "jsonl";

#[derive(Serialize, Deserialize)]
struct StoredLine {
    hash: String,
    event: Value,
}

/// Estado del final del archivo tras leerlo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tail {
    Clean,
    /// Última línea válida pero sin `\n`.
    MissingNewline,
    /// Escritura incompleta a partir de este byte.
    Torn(u64),
}

/// Resultado de `recover_records`: los records sanos y los bodies que no
/// pudieron leerse.
#[derive(Debug, Default)]
pub struct Recovery {
    pub records: Vec<BodyRecord>,
    pub failures: Vec<(Uuid, PersistenceError)>,
}

#[derive(Debug)]
pub struct FileEventStore {
    dir: PathBuf,
    sync_on_append: bool,
    // siguiente seq por body, cargado perezosamente desde disco
    next_seq: HashMap<Uuid, u64>,
}

impl FileEventStore {
    pub fn open(dir: impl Into<PathBuf>, sync_on_append: bool) -> Result<Self, PersistenceError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| PersistenceError::io(&dir, e))?;
        debug!("open dir={} sync={sync_on_append}", dir.display());
        Ok(Self { dir,
                  sync_on_append,
                  next_seq: HashMap::new() })
    }

    pub fn from_config(config: &StoreConfig) -> Result<Self, PersistenceError> {
        Self::open(&config.dir, config.sync_on_append)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, body_id: Uuid) -> PathBuf {
        self.dir.join(format!("{body_id}.{EXTENSION}"))
    }

    pub fn append(&mut self, body_id: Uuid, kind: BodyEventKind) -> Result<BodyEvent, PersistenceError> {
        let seq = match self.next_seq.get(&body_id) {
            Some(seq) => *seq,
            None => {
                let (events, tail) = self.scan(body_id)?;
                self.repair_tail(body_id, tail)?;
                events.len() as u64
            }
        };
        let event = BodyEvent { seq,
                                body_id,
                                kind,
                                ts: Utc::now() };
        let value = serde_json::to_value(&event)?;
        let line = serde_json::to_string(&StoredLine { hash: hash_value(&value),
                                                       event: value })?;

        let path = self.path_for(body_id);
        let mut file = OpenOptions::new().create(true)
                                         .append(true)
                                         .open(&path)
                                         .map_err(|e| PersistenceError::io(&path, e))?;
        writeln!(file, "{line}").map_err(|e| PersistenceError::io(&path, e))?;
        if self.sync_on_append {
            file.sync_data().map_err(|e| PersistenceError::io(&path, e))?;
        }
        self.next_seq.insert(body_id, seq + 1);
        debug!("append body_id={body_id} seq={seq} kind={}", event.kind.name());
        Ok(event)
    }

    /// Eventos de un body en orden de `seq`; vacío si el body no existe.
    pub fn read(&self, body_id: Uuid) -> Result<Vec<BodyEvent>, PersistenceError> {
        Ok(self.scan(body_id)?.0)
    }

    fn scan(&self, body_id: Uuid) -> Result<(Vec<BodyEvent>, Tail), PersistenceError> {
        let path = self.path_for(body_id);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok((Vec::new(), Tail::Clean)),
            Err(e) => return Err(PersistenceError::io(&path, e)),
        };
        let mut events = Vec::new();
        let mut offset = 0u64;
        let mut tail = Tail::Clean;
        for (index, chunk) in text.split_inclusive('\n').enumerate() {
            let start = offset;
            offset += chunk.len() as u64;
            let complete = chunk.ends_with('\n');
            let raw = chunk.trim_end_matches(['\n', '\r']);
            if raw.trim().is_empty() {
                continue;
            }
            let line = index + 1;
            let corrupted = |detail: String| {
                warn!("corrupted line {line} in {}: {detail}", path.display());
                PersistenceError::Corrupted { path: path.clone(),
                                              line,
                                              detail }
            };
            let stored: StoredLine = match serde_json::from_str(raw) {
                Ok(stored) => stored,
                Err(e) if !complete => {
                    warn!("incomplete trailing line {line} in {}: {e}; ignored", path.display());
                    tail = Tail::Torn(start);
                    break;
                }
                Err(e) => return Err(corrupted(e.to_string())),
            };
            if hash_value(&stored.event) != stored.hash {
                return Err(corrupted("hash mismatch".into()));
            }
            let event: BodyEvent = serde_json::from_value(stored.event).map_err(|e| corrupted(e.to_string()))?;
            if event.seq != events.len() as u64 {
                return Err(corrupted(format!("expected seq {}, found {}", events.len(), event.seq)));
            }
            events.push(event);
            if !complete {
                tail = Tail::MissingNewline;
            }
        }
        Ok((events, tail))
    }

    /// Deja el archivo terminado en `\n` tras la última línea válida.
    fn repair_tail(&self, body_id: Uuid, tail: Tail) -> Result<(), PersistenceError> {
        let path = self.path_for(body_id);
        match tail {
            Tail::Clean => Ok(()),
            Tail::MissingNewline => {
                let mut file = OpenOptions::new().append(true)
                                                 .open(&path)
                                                 .map_err(|e| PersistenceError::io(&path, e))?;
                writeln!(file).map_err(|e| PersistenceError::io(&path, e))
            }
            Tail::Torn(len) => {
                warn!("truncating incomplete write in {} at byte {len}", path.display());
                let file = OpenOptions::new().write(true)
                                             .open(&path)
                                             .map_err(|e| PersistenceError::io(&path, e))?;
                file.set_len(len).map_err(|e| PersistenceError::io(&path, e))
            }
        }
    }

    /// Ids de todos los bodies con log en el directorio.
    pub fn body_ids(&self) -> Result<Vec<Uuid>, PersistenceError> {
        let entries = fs::read_dir(&self.dir).map_err(|e| PersistenceError::io(&self.dir, e))?;
        let mut ids = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| PersistenceError::io(&self.dir, e))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            match path.file_stem().and_then(|s| s.to_str()).map(Uuid::parse_str) {
                Some(Ok(id)) => ids.push(id),
                _ => debug!("skip foreign file {}", path.display()),
            }
        }
        ids.sort();
        Ok(ids)
    }
}

impl EventStore for FileEventStore {
    fn append_kind(&mut self, body_id: Uuid, kind: BodyEventKind) -> Result<BodyEvent, StoreError> {
        Ok(self.append(body_id, kind)?)
    }

    fn list(&self, body_id: Uuid) -> Result<Vec<BodyEvent>, StoreError> {
        Ok(self.read(body_id)?)
    }
}

/// Record de un body concreto; `NotFound` si no tiene log o le falta `BodyCreated`.
pub fn load_record<R: BodyRepository>(store: &FileEventStore, body_id: Uuid, repository: &R) -> Result<BodyRecord, PersistenceError> {
    let events = store.read(body_id)?;
    repository.load(body_id, &events)
              .ok_or_else(|| PersistenceError::NotFound(body_id.to_string()))
}

/// Reconstruye los records de todos los bodies persistidos (p. ej. tras un
/// reinicio del proceso). Un body ilegible se reporta en `failures` sin
/// impedir la recuperación de los demás.
pub fn recover_records<R: BodyRepository>(store: &FileEventStore, repository: &R) -> Result<Recovery, PersistenceError> {
    let mut recovery = Recovery::default();
    for body_id in store.body_ids()? {
        let events = match store.read(body_id) {
            Ok(events) => events,
            Err(e) => {
                warn!("body_id={body_id} not recovered: {e}");
                recovery.failures.push((body_id, e));
                continue;
            }
        };
        match repository.load(body_id, &events) {
            Some(record) => recovery.records.push(record),
            None => warn!("body_id={body_id} has events but no BodyCreated; skipped"),
        }
    }
    Ok(recovery)
}
