use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::BodyError;
use crate::reason::{CancellationReason, FailureReason};

/// Estado de un body.
///
/// Las transiciones válidas son:
/// - `Pending` -> `Running`
/// - `Pending` -> `Cancelled`
/// - `Running` -> `Completed` | `Failed` | `Cancelled`
///
/// Los estados terminales no tienen salida.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyStatus {
    /// Creado (o rehidratado) pero sin hilo de ejecución.
    Pending,
    /// El body está ejecutándose.
    Running,
    /// Terminó normalmente.
    Completed,
    /// Terminó con su propio fallo.
    Failed,
    /// Se aceptó una cancelación.
    Cancelled,
}

impl BodyStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

/// Desenlace terminal persistible de un body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum BodyOutcome {
    Completed(Value),
    Failed(FailureReason),
    Cancelled(CancellationReason),
}

impl BodyOutcome {
    pub fn status(&self) -> BodyStatus {
        match self {
            Self::Completed(_) => BodyStatus::Completed,
            Self::Failed(_) => BodyStatus::Failed,
            Self::Cancelled(_) => BodyStatus::Cancelled,
        }
    }

    /// Traduce el desenlace al contrato de `get`.
    pub fn into_result(self) -> Result<Value, BodyError> {
        match self {
            Self::Completed(value) => Ok(value),
            Self::Failed(failure) => Err(BodyError::Failed(failure)),
            Self::Cancelled(reason) => Err(BodyError::Cancelled(reason)),
        }
    }
}
