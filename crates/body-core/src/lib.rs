//! body-core: handle durable y cancelable del body de un step.
//!
//! Módulos:
//! - `reason`: vocabulario de cancelación (razones, causas, `ReasonAdapter`).
//! - `execution`: contrato `BodyExecution` y dispatcher entre generaciones.
//! - `handle`: `BodyHandle`, implementación de referencia sobre hilos.
//! - `event` / `repo`: log append-only y replay hacia `BodyRecord`.
pub mod constants;
pub mod errors;
pub mod event;
pub mod execution;
pub mod handle;
pub mod hashing;
pub mod reason;
pub mod repo;

pub use errors::{BodyError, BodyInterrupted, HandleError, StoreError};
pub use event::{BodyEvent, BodyEventKind, EventStore, InMemoryEventStore, SharedEventStore};
pub use execution::{BodyExecution, BodyOutcome, BodyStatus, CancelByCauses, CancelByReason, CancelEntry, StepExecutionRef};
pub use handle::{BodyContext, BodyHandle, ExecutionGuard, WaitInterrupt};
pub use reason::{CancellationReason, FailureReason, FlowInterrupted, InterruptionCause, Outcome, ReasonAdapter};
pub use repo::{BodyRecord, BodyRepository, InMemoryBodyRepository};
