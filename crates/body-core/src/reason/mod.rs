//! Vocabulario de cancelación.
//!
//! Existen dos generaciones de API para explicar por qué se detiene un body:
//! - causas estructuradas (`InterruptionCause`), la forma histórica;
//! - razones arbitrarias (`CancellationReason`), la forma canónica actual.
//!
//! `ReasonAdapter` permite presentar una razón arbitraria como causa
//! estructurada cuando la implementación sólo entiende la forma histórica.

mod adapter;
mod cause;
mod interrupted;

pub use adapter::ReasonAdapter;
pub use cause::InterruptionCause;
pub use interrupted::{CancellationReason, FailureReason, FlowInterrupted, Outcome};
