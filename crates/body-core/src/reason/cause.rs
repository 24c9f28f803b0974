use serde::{Deserialize, Serialize};
use std::fmt;

use super::ReasonAdapter;

/// Causa estructurada de una interrupción.
///
/// Se persiste junto con la razón de cancelación, por lo que todas las
/// variantes deben ser serializables y no referenciar estado vivo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InterruptionCause {
    /// Un usuario pidió detener la ejecución.
    UserInterruption { user: String },
    /// Se agotó el tiempo máximo permitido al body.
    Timeout { limit_ms: u64 },
    /// Otra ejecución reemplazó a esta.
    Superseded { by: String },
    /// Razón arbitraria envuelta para la API histórica.
    Reason(ReasonAdapter),
}

impl InterruptionCause {
    pub fn user(user: impl Into<String>) -> Self {
        Self::UserInterruption { user: user.into() }
    }

    /// Descripción corta legible por humanos.
    pub fn short_description(&self) -> String {
        match self {
            Self::UserInterruption { user } => format!("Aborted by {user}"),
            Self::Timeout { limit_ms } => format!("Timeout has been exceeded ({limit_ms} ms)"),
            Self::Superseded { by } => format!("Superseded by {by}"),
            Self::Reason(adapter) => adapter.short_description(),
        }
    }
}

impl fmt::Display for InterruptionCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.short_description())
    }
}
