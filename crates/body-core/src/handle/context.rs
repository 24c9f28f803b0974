use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use super::shared::{ActiveExecution, Shared};
use crate::errors::BodyInterrupted;
use crate::execution::StepExecutionRef;

/// Vista que el código del body tiene de su propio handle.
///
/// Permite observar la interrupción de forma cooperativa y registrar las
/// ejecuciones internas que `current_executions` expone.
pub struct BodyContext {
    pub(crate) shared: Arc<Shared>,
}

impl BodyContext {
    pub fn body_id(&self) -> Uuid {
        self.shared.body_id
    }

    pub fn is_interrupted(&self) -> bool {
        self.shared.is_interrupted()
    }

    pub fn check_interrupted(&self) -> Result<(), BodyInterrupted> {
        if self.is_interrupted() {
            Err(BodyInterrupted)
        } else {
            Ok(())
        }
    }

    /// Duerme, despertando en cuanto se cancela el body.
    pub fn sleep(&self, duration: Duration) -> Result<(), BodyInterrupted> {
        if self.shared.sleep_interruptibly(duration) {
            Err(BodyInterrupted)
        } else {
            Ok(())
        }
    }

    /// Registra una ejecución interna de primer nivel.
    pub fn enter(&self, step_id: &str, display_name: &str) -> Result<ExecutionGuard, BodyInterrupted> {
        register(&self.shared, StepExecutionRef::new(step_id, display_name), None)
    }
}

/// Ejecución interna activa; se desregistra al soltarse.
pub struct ExecutionGuard {
    shared: Arc<Shared>,
    execution: StepExecutionRef,
}

impl ExecutionGuard {
    pub fn execution(&self) -> &StepExecutionRef {
        &self.execution
    }

    /// Registra una ejecución anidada; mientras viva, ésta deja de ser la más interna.
    pub fn enter(&self, step_id: &str, display_name: &str) -> Result<ExecutionGuard, BodyInterrupted> {
        register(&self.shared,
                 StepExecutionRef::new(step_id, display_name),
                 Some(self.execution.execution_id))
    }
}

impl Drop for ExecutionGuard {
    fn drop(&mut self) {
        let id = self.execution.execution_id;
        self.shared.lock_executions().retain(|active| active.execution.execution_id != id);
    }
}

fn register(shared: &Arc<Shared>,
            execution: StepExecutionRef,
            parent: Option<Uuid>)
            -> Result<ExecutionGuard, BodyInterrupted> {
    // El record bloqueado ordena esta alta respecto de una cancelación concurrente.
    let _record = shared.lock_record();
    if shared.is_interrupted() {
        return Err(BodyInterrupted);
    }
    shared.lock_executions().push(ActiveExecution { execution: execution.clone(),
                                                    parent });
    Ok(ExecutionGuard { shared: Arc::clone(shared),
                        execution })
}

/// Ejecuciones activas sin hijas activas.
pub(crate) fn innermost(shared: &Shared) -> Vec<StepExecutionRef> {
    let active = shared.lock_executions();
    active.iter()
          .filter(|candidate| {
              !active.iter()
                     .any(|other| other.parent == Some(candidate.execution.execution_id))
          })
          .map(|leaf| leaf.execution.clone())
          .collect()
}
