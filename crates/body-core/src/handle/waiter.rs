use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::shared::Shared;

/// Interrupción del hilo que espera un body (no del body).
///
/// Un `get_interruptibly` bloqueado con este token retorna
/// `BodyError::WaitInterrupted` cuando otro hilo llama a `interrupt`; el body
/// sigue ejecutándose. El flag se consume al reportarse.
#[derive(Clone)]
pub struct WaitInterrupt {
    shared: Arc<Shared>,
    flag: Arc<AtomicBool>,
}

impl WaitInterrupt {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self { shared,
               flag: Arc::new(AtomicBool::new(false)) }
    }

    pub fn interrupt(&self) {
        self.flag.store(true, Ordering::SeqCst);
        self.shared.notify_waiters();
    }

    pub fn is_interrupted(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    pub(crate) fn flag(&self) -> &AtomicBool {
        &self.flag
    }
}
