//! Errores del núcleo.

use std::time::Duration;
use thiserror::Error;

use crate::execution::BodyStatus;
use crate::reason::{CancellationReason, FailureReason};

/// Desenlace fallido de esperar un body (`get`).
///
/// `Cancelled` y `WaitInterrupted` son condiciones distintas: la primera
/// describe al body, la segunda al hilo que espera.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BodyError {
    #[error("body failed: {0}")]
    Failed(FailureReason),
    #[error("body cancelled: {0}")]
    Cancelled(CancellationReason),
    #[error("timed out after {0:?} waiting for body")]
    Timeout(Duration),
    #[error("waiting thread was interrupted")]
    WaitInterrupted,
}

/// Errores de ciclo de vida al arrancar o reanudar un body.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HandleError {
    #[error("body already started")]
    AlreadyStarted,
    #[error("body already terminal ({0:?})")]
    Terminal(BodyStatus),
    #[error("could not spawn worker thread: {0}")]
    Spawn(String),
}

/// Error de un backend de `EventStore`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("event store backend: {0}")]
    Backend(String),
}

/// Señal devuelta al código del body cuando se le pidió detenerse.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("body execution was interrupted")]
pub struct BodyInterrupted;

impl From<BodyInterrupted> for FailureReason {
    fn from(value: BodyInterrupted) -> Self {
        FailureReason::from_error(&value)
    }
}
