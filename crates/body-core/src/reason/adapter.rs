use serde::{Deserialize, Serialize};

use super::{CancellationReason, InterruptionCause};

/// Vista transitoria de una `CancellationReason` como causa estructurada.
///
/// Se crea bajo demanda para una sola petición de cancelación; la igualdad
/// no tiene significado propio más allá de la razón envuelta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasonAdapter {
    reason: CancellationReason,
}

impl ReasonAdapter {
    pub fn new(reason: CancellationReason) -> Self {
        Self { reason }
    }

    pub fn reason(&self) -> &CancellationReason {
        &self.reason
    }

    pub fn into_reason(self) -> CancellationReason {
        self.reason
    }

    pub fn short_description(&self) -> String {
        format!("Exception: {}", self.reason.description())
    }

    /// Envuelve la razón como la única causa de una petición histórica.
    pub fn into_cause(self) -> InterruptionCause {
        InterruptionCause::Reason(self)
    }
}
