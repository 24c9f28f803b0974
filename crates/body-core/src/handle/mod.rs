//! Implementación de referencia de `BodyExecution` respaldada por un hilo.
//!
//! Notas de diseño
//! - La cancelación es terminal de inmediato: `get` reporta
//!   `BodyError::Cancelled` sin esperar a que el código del body lo observe.
//! - La lógica de interrupción (flag + despertar + evento `BodyInterrupted`)
//!   corre a lo sumo una vez, bajo el lock del record.
//! - El resultado tardío de un body ya cancelado se descarta.

mod context;
mod shared;
mod waiter;

use chrono::Utc;
use log::{debug, warn};
use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, PoisonError};
use std::thread;
use std::time::Duration;
use uuid::Uuid;

use crate::constants::{RECORD_FORMAT_VERSION, WORKER_THREAD_PREFIX};
use crate::errors::{BodyError, HandleError, StoreError};
use crate::event::{BodyEventKind, SharedEventStore};
use crate::execution::{BodyExecution, BodyOutcome, BodyStatus, CancelByReason, CancelEntry, StepExecutionRef};
use crate::reason::{CancellationReason, FailureReason};
use crate::repo::{BodyRecord, BodyRepository};

pub use context::{BodyContext, ExecutionGuard};
pub use waiter::WaitInterrupt;

use shared::Shared;

#[derive(Clone)]
pub struct BodyHandle {
    shared: Arc<Shared>,
}

impl BodyHandle {
    /// Crea un body pendiente para `step_id` y registra `BodyCreated`.
    pub fn new(step_id: impl Into<String>, store: SharedEventStore) -> Self {
        let record = BodyRecord { body_id: Uuid::new_v4(),
                                  step_id: step_id.into(),
                                  format_version: RECORD_FORMAT_VERSION,
                                  status: BodyStatus::Pending,
                                  outcome: None,
                                  interrupted: false,
                                  starts: 0,
                                  created_at: Utc::now(),
                                  finished_at: None };
        let shared = Shared::new(record.clone(), store);
        shared.append(BodyEventKind::BodyCreated { step_id: record.step_id,
                                                   format_version: record.format_version });
        debug!("create body_id={}", shared.body_id);
        Self { shared: Arc::new(shared) }
    }

    /// Crea y arranca un body en un solo paso.
    pub fn spawn<F>(step_id: impl Into<String>, store: SharedEventStore, body: F) -> Result<Self, HandleError>
        where F: FnOnce(&BodyContext) -> Result<Value, FailureReason> + Send + 'static
    {
        let handle = Self::new(step_id, store);
        handle.start(body)?;
        Ok(handle)
    }

    /// Reconstruye un handle desde su record persistido, con un mecanismo de
    /// espera nuevo. Un body no terminal vuelve a `Pending` y puede
    /// reanudarse con `start` o cancelarse.
    pub fn rehydrate(mut record: BodyRecord, store: SharedEventStore) -> Self {
        if !record.status.is_terminal() {
            record.status = BodyStatus::Pending;
        }
        debug!("rehydrate body_id={} status={:?}", record.body_id, record.status);
        Self { shared: Arc::new(Shared::new(record, store)) }
    }

    /// Lee los eventos de `body_id`, los reproduce y rehidrata el handle.
    pub fn load<R: BodyRepository>(body_id: Uuid, store: SharedEventStore, repository: &R) -> Result<Option<Self>, StoreError> {
        let events = store.lock()
                          .unwrap_or_else(PoisonError::into_inner)
                          .list(body_id)?;
        Ok(repository.load(body_id, &events)
                     .map(|record| Self::rehydrate(record, store)))
    }

    /// Arranca el body en un hilo propio. Sólo válido desde `Pending`.
    pub fn start<F>(&self, body: F) -> Result<(), HandleError>
        where F: FnOnce(&BodyContext) -> Result<Value, FailureReason> + Send + 'static
    {
        let mut record = self.shared.lock_record();
        match record.status {
            BodyStatus::Pending => {}
            BodyStatus::Running => return Err(HandleError::AlreadyStarted),
            terminal => return Err(HandleError::Terminal(terminal)),
        }
        record.status = BodyStatus::Running;
        record.starts += 1;
        self.shared.append(BodyEventKind::BodyStarted);

        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new().name(format!("{WORKER_THREAD_PREFIX}{}", self.shared.body_id))
                                            .spawn(move || run_body(shared, body));
        if let Err(e) = spawned {
            self.shared.finish_locked(&mut record, BodyOutcome::Failed(FailureReason::from_error(&e)));
            return Err(HandleError::Spawn(e.to_string()));
        }
        debug!("start body_id={} attempt={}", self.shared.body_id, record.starts);
        Ok(())
    }

    pub fn body_id(&self) -> Uuid {
        self.shared.body_id
    }

    pub fn step_id(&self) -> String {
        self.shared.lock_record().step_id.clone()
    }

    pub fn status(&self) -> BodyStatus {
        self.shared.lock_record().status
    }

    /// Copia del estado persistible actual.
    pub fn record(&self) -> BodyRecord {
        self.shared.lock_record().clone()
    }

    /// Token para interrumpir a un hilo bloqueado en `get_interruptibly`.
    pub fn wait_interrupt(&self) -> WaitInterrupt {
        WaitInterrupt::new(Arc::clone(&self.shared))
    }

    /// `get` que además retorna `BodyError::WaitInterrupted` si `waiter` se dispara.
    pub fn get_interruptibly(&self, waiter: &WaitInterrupt, timeout: Option<Duration>) -> Result<Value, BodyError> {
        self.shared.wait_outcome(timeout, Some(waiter.flag()))?.into_result()
    }
}

impl CancelByReason for BodyHandle {
    fn cancel_by_reason(&self, reason: CancellationReason) -> bool {
        let mut record = self.shared.lock_record();
        if record.status.is_terminal() {
            debug!("cancel:rejected body_id={} status={:?}", self.shared.body_id, record.status);
            return false;
        }
        if record.status == BodyStatus::Running && !record.interrupted {
            record.interrupted = true;
            self.shared.append(BodyEventKind::BodyInterrupted { reason: reason.clone() });
        }
        self.shared.raise_interrupt();
        debug!("cancel:accepted body_id={} reason={reason}", self.shared.body_id);
        self.shared.finish_locked(&mut record, BodyOutcome::Cancelled(reason));
        true
    }
}

impl BodyExecution for BodyHandle {
    fn current_executions(&self) -> Vec<StepExecutionRef> {
        context::innermost(&self.shared)
    }

    fn cancel_entry(&self) -> CancelEntry<'_> {
        CancelEntry::Reason(self)
    }

    fn is_done(&self) -> bool {
        self.status().is_terminal()
    }

    fn is_cancelled(&self) -> bool {
        self.status() == BodyStatus::Cancelled
    }

    fn get(&self) -> Result<Value, BodyError> {
        self.shared.wait_outcome(None, None)?.into_result()
    }

    fn get_timeout(&self, timeout: Duration) -> Result<Value, BodyError> {
        self.shared.wait_outcome(Some(timeout), None)?.into_result()
    }

    fn type_label(&self) -> &'static str {
        "BodyHandle"
    }
}

impl fmt::Debug for BodyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let record = self.shared.lock_record();
        f.debug_struct("BodyHandle")
         .field("body_id", &record.body_id)
         .field("step_id", &record.step_id)
         .field("status", &record.status)
         .finish()
    }
}

fn run_body<F>(shared: Arc<Shared>, body: F)
    where F: FnOnce(&BodyContext) -> Result<Value, FailureReason>
{
    let ctx = BodyContext { shared: Arc::clone(&shared) };
    let outcome = match panic::catch_unwind(AssertUnwindSafe(|| body(&ctx))) {
        Ok(Ok(value)) => BodyOutcome::Completed(value),
        Ok(Err(failure)) => BodyOutcome::Failed(failure),
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!("body panicked body_id={}: {message}", shared.body_id);
            BodyOutcome::Failed(FailureReason::new("panic", message))
        }
    };
    drop(ctx);

    let mut record = shared.lock_record();
    if record.status.is_terminal() {
        debug!("finish:ignored body_id={} already {:?}", shared.body_id, record.status);
        return;
    }
    debug!("finish body_id={} status={:?}", shared.body_id, outcome.status());
    shared.finish_locked(&mut record, outcome);
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "body panicked".to_string()
    }
}
