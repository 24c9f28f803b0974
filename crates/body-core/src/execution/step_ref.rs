use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Referencia a una ejecución interna (sub-step) activa dentro de un body.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StepExecutionRef {
    pub execution_id: Uuid,
    pub step_id: String,
    pub display_name: String,
}

impl StepExecutionRef {
    pub fn new(step_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self { execution_id: Uuid::new_v4(),
               step_id: step_id.into(),
               display_name: display_name.into() }
    }
}
