//! Contrato público de un body en ejecución.
//!
//! `BodyExecution` se comporta como un handle de resultado asíncrono
//! (esperar, cancelar, inspeccionar) y además acepta peticiones de
//! cancelación en las dos formas históricas:
//! - `cancel(reason)`: forma canónica con una `CancellationReason`;
//! - `cancel_causes(causes)` / `cancel_flag(bool)`: formas obsoletas.
//!
//! Cada implementación declara qué punto de entrada implementa de verdad
//! mediante `cancel_entry`; el dispatcher adapta el resto.

pub mod dispatch;
mod status;
mod step_ref;

use serde_json::Value;
use std::time::Duration;

use crate::errors::BodyError;
use crate::reason::{CancellationReason, FlowInterrupted, InterruptionCause};

pub use status::{BodyOutcome, BodyStatus};
pub use step_ref::StepExecutionRef;

/// Punto de entrada canónico: cancelar con una razón arbitraria.
pub trait CancelByReason {
    /// Devuelve `false` si el body ya es terminal; `true` sólo indica que la
    /// petición fue aceptada, no que la interrupción haya concluido.
    fn cancel_by_reason(&self, reason: CancellationReason) -> bool;
}

/// Punto de entrada histórico: cancelar con causas estructuradas.
pub trait CancelByCauses {
    /// Una lista vacía significa "abortado, sin más detalle".
    fn cancel_by_causes(&self, causes: Vec<InterruptionCause>) -> bool;
}

/// Capacidad de cancelación declarada por una implementación.
pub enum CancelEntry<'a> {
    Reason(&'a dyn CancelByReason),
    Causes(&'a dyn CancelByCauses),
    Both {
        reason: &'a dyn CancelByReason,
        causes: &'a dyn CancelByCauses,
    },
    /// Ninguno implementado: error de programación de la implementación.
    Missing,
}

/// Body de un step en ejecución.
///
/// Las implementaciones no sobreescriben `cancel`, `cancel_causes` ni
/// `cancel_flag`: declaran su punto de entrada con `cancel_entry`.
pub trait BodyExecution: Send + Sync {
    /// Ejecuciones internas más profundas activas en este momento. No
    /// bloquea; vacío si no hay nada activo.
    fn current_executions(&self) -> Vec<StepExecutionRef>;

    fn cancel_entry(&self) -> CancelEntry<'_>;

    fn is_done(&self) -> bool;

    fn is_cancelled(&self) -> bool;

    /// Bloquea hasta un estado terminal.
    fn get(&self) -> Result<Value, BodyError>;

    /// Igual que `get`, pero falla con `BodyError::Timeout` al vencer `timeout`.
    fn get_timeout(&self, timeout: Duration) -> Result<Value, BodyError>;

    /// Nombre usado en los diagnósticos del dispatcher.
    fn type_label(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Intenta cancelar el body. Asíncrono: no garantiza que la interrupción
    /// haya terminado al retornar. `false` si ya no puede cancelarse.
    fn cancel(&self, reason: CancellationReason) -> bool {
        dispatch::dispatch_reason(self.cancel_entry(), reason, self.type_label())
    }

    #[deprecated(note = "use `cancel` with a `FlowInterrupted` reason")]
    fn cancel_causes(&self, causes: Vec<InterruptionCause>) -> bool {
        dispatch::dispatch_causes(self.cancel_entry(), causes, self.type_label())
    }

    /// El flag se ignora: siempre equivale a "abortado, forzado".
    #[deprecated(note = "use `cancel` to provide richer context")]
    fn cancel_flag(&self, _may_interrupt: bool) -> bool {
        self.cancel(FlowInterrupted::aborted().into())
    }
}
