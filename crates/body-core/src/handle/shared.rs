//! Estado vivo compartido entre el handle, su hilo y los que esperan.
//!
//! El `BodyRecord` protegido por el mutex es lo único persistible; condvar,
//! flag de interrupción y ejecuciones activas se reconstruyen al rehidratar.
use chrono::Utc;
use log::error;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::errors::BodyError;
use crate::event::{BodyEventKind, SharedEventStore};
use crate::execution::{BodyOutcome, StepExecutionRef};
use crate::repo::BodyRecord;

pub(crate) struct ActiveExecution {
    pub execution: StepExecutionRef,
    pub parent: Option<Uuid>,
}

pub(crate) struct Shared {
    pub body_id: Uuid,
    record: Mutex<BodyRecord>,
    changed: Condvar,
    interrupted: AtomicBool,
    executions: Mutex<Vec<ActiveExecution>>,
    store: SharedEventStore,
}

impl Shared {
    pub fn new(record: BodyRecord, store: SharedEventStore) -> Self {
        Self { body_id: record.body_id,
               interrupted: AtomicBool::new(record.interrupted),
               record: Mutex::new(record),
               changed: Condvar::new(),
               executions: Mutex::new(Vec::new()),
               store }
    }

    pub fn lock_record(&self) -> MutexGuard<'_, BodyRecord> {
        self.record.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn lock_executions(&self) -> MutexGuard<'_, Vec<ActiveExecution>> {
        self.executions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registra el evento; un fallo del store no revierte la transición en memoria.
    pub fn append(&self, kind: BodyEventKind) {
        let name = kind.name();
        let mut store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = store.append_kind(self.body_id, kind) {
            error!("append failed body_id={} kind={name}: {e}", self.body_id);
        }
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    /// Marca el body como interrumpido y despierta a quien duerma en él.
    /// Debe llamarse con el record bloqueado.
    pub fn raise_interrupt(&self) {
        self.interrupted.store(true, Ordering::SeqCst);
        self.changed.notify_all();
    }

    /// Fija el desenlace terminal. Debe llamarse con el record bloqueado y no terminal.
    pub fn finish_locked(&self, record: &mut BodyRecord, outcome: BodyOutcome) {
        let kind = match &outcome {
            BodyOutcome::Completed(result) => BodyEventKind::BodyCompleted { result: result.clone() },
            BodyOutcome::Failed(failure) => BodyEventKind::BodyFailed { failure: failure.clone() },
            BodyOutcome::Cancelled(reason) => BodyEventKind::BodyCancelled { reason: reason.clone() },
        };
        self.append(kind);
        record.status = outcome.status();
        record.outcome = Some(outcome);
        record.finished_at = Some(Utc::now());
        self.changed.notify_all();
    }

    pub fn notify_waiters(&self) {
        let _record = self.lock_record();
        self.changed.notify_all();
    }

    /// Espera un estado terminal.
    ///
    /// `waiter` es el flag de interrupción del hilo que espera; se consume al
    /// reportarse.
    pub fn wait_outcome(&self, timeout: Option<Duration>, waiter: Option<&AtomicBool>) -> Result<BodyOutcome, BodyError> {
        let mut record = self.lock_record();
        // Un plazo que no cabe en `Instant` equivale a esperar sin límite.
        let deadline = timeout.and_then(|t| Instant::now().checked_add(t));
        loop {
            if let Some(outcome) = &record.outcome {
                return Ok(outcome.clone());
            }
            if waiter.is_some_and(|flag| flag.swap(false, Ordering::SeqCst)) {
                return Err(BodyError::WaitInterrupted);
            }
            record = match (deadline, timeout) {
                (Some(deadline), Some(timeout)) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Err(BodyError::Timeout(timeout));
                    }
                    let (guard, _) = self.changed
                                         .wait_timeout(record, deadline - now)
                                         .unwrap_or_else(PoisonError::into_inner);
                    guard
                }
                _ => self.changed.wait(record).unwrap_or_else(PoisonError::into_inner),
            };
        }
    }

    /// Duerme hasta `duration` o hasta ser interrumpido; devuelve si hubo interrupción.
    pub fn sleep_interruptibly(&self, duration: Duration) -> bool {
        let mut record = self.lock_record();
        let deadline = Instant::now().checked_add(duration);
        loop {
            if self.is_interrupted() {
                return true;
            }
            record = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return false;
                    }
                    let (guard, _) = self.changed
                                         .wait_timeout(record, deadline - now)
                                         .unwrap_or_else(PoisonError::into_inner);
                    guard
                }
                None => self.changed.wait(record).unwrap_or_else(PoisonError::into_inner),
            };
        }
    }
}
