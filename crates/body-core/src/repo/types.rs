//! Estado persistible de un body (`BodyRecord`) y su reconstrucción por replay.
//!
//! El record sólo contiene datos: identidad, estado y desenlace. El mecanismo
//! de espera (mutex, condvar, hilo) se reconstruye al rehidratar el handle.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::event::{BodyEvent, BodyEventKind};
use crate::execution::{BodyOutcome, BodyStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyRecord {
    pub body_id: Uuid,
    pub step_id: String,
    pub format_version: u32,
    pub status: BodyStatus,
    pub outcome: Option<BodyOutcome>,
    /// Si ya se ejecutó la lógica de interrupción del body.
    pub interrupted: bool,
    pub starts: u32,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// Reconstruye (`replay`) el estado de un body a partir de sus eventos.
pub trait BodyRepository {
    /// `None` si los eventos no contienen `BodyCreated`.
    fn load(&self, body_id: Uuid, events: &[BodyEvent]) -> Option<BodyRecord>;
}

#[derive(Debug, Default)]
pub struct InMemoryBodyRepository;

impl InMemoryBodyRepository {
    pub fn new() -> Self {
        Self
    }
}

impl BodyRepository for InMemoryBodyRepository {
    fn load(&self, body_id: Uuid, events: &[BodyEvent]) -> Option<BodyRecord> {
        let mut record: Option<BodyRecord> = None;
        for ev in events {
            if let BodyEventKind::BodyCreated { step_id, format_version } = &ev.kind {
                record = Some(BodyRecord { body_id,
                                           step_id: step_id.clone(),
                                           format_version: *format_version,
                                           status: BodyStatus::Pending,
                                           outcome: None,
                                           interrupted: false,
                                           starts: 0,
                                           created_at: ev.ts,
                                           finished_at: None });
                continue;
            }
            let Some(rec) = record.as_mut() else { continue };
            // Estados terminales son pegajosos.
            if rec.status.is_terminal() {
                continue;
            }
            match &ev.kind {
                BodyEventKind::BodyCreated { .. } => {}
                BodyEventKind::BodyStarted => {
                    rec.status = BodyStatus::Running;
                    rec.starts += 1;
                }
                // Sólo una cancelación aceptada escribe este evento: el body
                // queda cancelado aunque falte el `BodyCancelled` posterior.
                BodyEventKind::BodyInterrupted { reason } => {
                    rec.interrupted = true;
                    finish(rec, BodyOutcome::Cancelled(reason.clone()), ev);
                }
                BodyEventKind::BodyCompleted { result } => finish(rec, BodyOutcome::Completed(result.clone()), ev),
                BodyEventKind::BodyFailed { failure } => finish(rec, BodyOutcome::Failed(failure.clone()), ev),
                BodyEventKind::BodyCancelled { reason } => finish(rec, BodyOutcome::Cancelled(reason.clone()), ev),
            }
        }
        record
    }
}

fn finish(rec: &mut BodyRecord, outcome: BodyOutcome, ev: &BodyEvent) {
    rec.status = outcome.status();
    rec.outcome = Some(outcome);
    rec.finished_at = Some(ev.ts);
}
