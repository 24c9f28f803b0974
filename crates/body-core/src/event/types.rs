//! Tipos de evento de un body y estructura `BodyEvent`.
//!
//! Rol:
//! - Cada transición de estado de un `BodyHandle` se registra en un
//!   `EventStore` append-only.
//! - El `BodyRepository` reconstruye el `BodyRecord` por replay, de modo que
//!   el handle sobrevive a un reinicio sin persistir estado vivo.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::reason::{CancellationReason, FailureReason};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BodyEventKind {
    /// Primer evento de un `body_id`: fija el step dueño y el formato.
    BodyCreated { step_id: String, format_version: u32 },
    /// Un hilo comenzó a ejecutar el body (puede repetirse tras rehidratar).
    BodyStarted,
    /// Se pidió al body en ejecución que se detenga. A lo sumo una vez.
    BodyInterrupted { reason: CancellationReason },
    BodyCompleted { result: Value },
    BodyFailed { failure: FailureReason },
    /// Cancelación aceptada; estado terminal.
    BodyCancelled { reason: CancellationReason },
}

impl BodyEventKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::BodyCreated { .. } => "BodyCreated",
            Self::BodyStarted => "BodyStarted",
            Self::BodyInterrupted { .. } => "BodyInterrupted",
            Self::BodyCompleted { .. } => "BodyCompleted",
            Self::BodyFailed { .. } => "BodyFailed",
            Self::BodyCancelled { .. } => "BodyCancelled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyEvent {
    pub seq: u64, // asignado por el EventStore (orden append)
    pub body_id: Uuid,
    pub kind: BodyEventKind,
    pub ts: DateTime<Utc>,
}
