//! Razones de cancelación: interrupción estructurada o fallo arbitrario.
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;

use super::InterruptionCause;

/// Resultado que una interrupción impone sobre el flujo que la contiene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Unstable,
    Failure,
    NotBuilt,
    Aborted,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Unstable => "UNSTABLE",
            Self::Failure => "FAILURE",
            Self::NotBuilt => "NOT_BUILT",
            Self::Aborted => "ABORTED",
        }
    }
}

/// Interrupción estructurada: resultado, si realmente interrumpe, y causas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowInterrupted {
    pub outcome: Outcome,
    pub actually_interrupting: bool,
    pub causes: Vec<InterruptionCause>,
}

impl FlowInterrupted {
    pub fn new(outcome: Outcome, actually_interrupting: bool, causes: Vec<InterruptionCause>) -> Self {
        Self { outcome,
               actually_interrupting,
               causes }
    }

    /// Interrupción por defecto: abortada y forzada, sin causas adicionales.
    pub fn aborted() -> Self {
        Self::with_causes(Vec::new())
    }

    /// Interrupción abortada y forzada con las causas dadas (puede ser vacío).
    pub fn with_causes(causes: Vec<InterruptionCause>) -> Self {
        Self::new(Outcome::Aborted, true, causes)
    }

    pub fn description(&self) -> String {
        if self.causes.is_empty() {
            return self.outcome.as_str().to_string();
        }
        let causes: Vec<String> = self.causes.iter().map(InterruptionCause::short_description).collect();
        format!("{}: {}", self.outcome.as_str(), causes.join("; "))
    }
}

/// Fallo arbitrario reducido a una forma persistible (tipo + mensaje).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureReason {
    pub kind: String,
    pub message: String,
}

impl FailureReason {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self { kind: kind.into(),
               message: message.into() }
    }

    /// Captura un error cualquiera; la cadena de `source()` se aplana en el mensaje.
    pub fn from_error<E: Error + ?Sized>(err: &E) -> Self {
        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(inner) = source {
            message.push_str(": caused by ");
            message.push_str(&inner.to_string());
            source = inner.source();
        }
        Self::new(short_type_name::<E>(), message)
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

fn short_type_name<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}

/// Razón canónica de una cancelación.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CancellationReason {
    Interrupted(FlowInterrupted),
    Failure(FailureReason),
}

impl CancellationReason {
    /// Razón sintetizada a partir de causas históricas.
    pub fn from_causes(causes: Vec<InterruptionCause>) -> Self {
        Self::Interrupted(FlowInterrupted::with_causes(causes))
    }

    pub fn description(&self) -> String {
        match self {
            Self::Interrupted(interrupted) => interrupted.description(),
            Self::Failure(failure) => failure.to_string(),
        }
    }

    /// Causas estructuradas visibles para la API histórica, si las hay.
    pub fn causes(&self) -> &[InterruptionCause] {
        match self {
            Self::Interrupted(interrupted) => &interrupted.causes,
            Self::Failure(_) => &[],
        }
    }
}

impl fmt::Display for CancellationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

impl From<FlowInterrupted> for CancellationReason {
    fn from(value: FlowInterrupted) -> Self {
        Self::Interrupted(value)
    }
}

impl From<FailureReason> for CancellationReason {
    fn from(value: FailureReason) -> Self {
        Self::Failure(value)
    }
}
