//! Enrutado entre las dos generaciones de cancelación.
//!
//! La capacidad se resuelve por la declaración `CancelEntry`, nunca por
//! inspección en cada llamada:
//! - razón hacia una implementación de causas: una única causa
//!   `ReasonAdapter` envuelve la razón;
//! - causas hacia una implementación de razones: se sintetiza
//!   `FlowInterrupted(Aborted, true, causes)`;
//! - `Both`: cada forma va directa a su punto de entrada;
//! - `Missing`: pánico con el nombre del tipo.

use log::debug;

use super::CancelEntry;
use crate::reason::{CancellationReason, InterruptionCause, ReasonAdapter};

pub fn dispatch_reason(entry: CancelEntry<'_>, reason: CancellationReason, type_label: &str) -> bool {
    match entry {
        CancelEntry::Reason(target) | CancelEntry::Both { reason: target, .. } => target.cancel_by_reason(reason),
        CancelEntry::Causes(target) => {
            debug!("cancel:adapt reason->causes type={type_label}");
            target.cancel_by_causes(vec![ReasonAdapter::new(reason).into_cause()])
        }
        CancelEntry::Missing => missing_entry(type_label),
    }
}

pub fn dispatch_causes(entry: CancelEntry<'_>, causes: Vec<InterruptionCause>, type_label: &str) -> bool {
    match entry {
        CancelEntry::Causes(target) | CancelEntry::Both { causes: target, .. } => target.cancel_by_causes(causes),
        CancelEntry::Reason(target) => {
            debug!("cancel:adapt causes->reason type={type_label} causes={}", causes.len());
            target.cancel_by_reason(CancellationReason::from_causes(causes))
        }
        CancelEntry::Missing => missing_entry(type_label),
    }
}

fn missing_entry(type_label: &str) -> ! {
    panic!("{type_label} declares no cancellation entry point; implement CancelByReason and return it from cancel_entry")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::{CancelByCauses, CancelByReason};
    use crate::reason::{FailureReason, FlowInterrupted};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        reasons: Mutex<Vec<CancellationReason>>,
        causes: Mutex<Vec<Vec<InterruptionCause>>>,
    }

    impl CancelByReason for Recorder {
        fn cancel_by_reason(&self, reason: CancellationReason) -> bool {
            self.reasons.lock().unwrap().push(reason);
            true
        }
    }

    impl CancelByCauses for Recorder {
        fn cancel_by_causes(&self, causes: Vec<InterruptionCause>) -> bool {
            self.causes.lock().unwrap().push(causes);
            true
        }
    }

    fn failure() -> CancellationReason {
        FailureReason::new("Boom", "exploded").into()
    }

    #[test]
    fn reason_into_causes_entry_wraps_single_adapter() {
        let rec = Recorder::default();
        assert!(dispatch_reason(CancelEntry::Causes(&rec), failure(), "Recorder"));
        let causes = rec.causes.lock().unwrap();
        assert_eq!(causes.len(), 1);
        assert_eq!(causes[0], vec![ReasonAdapter::new(failure()).into_cause()]);
        assert!(rec.reasons.lock().unwrap().is_empty());
    }

    #[test]
    fn causes_into_reason_entry_synthesizes_aborted() {
        let rec = Recorder::default();
        let causes = vec![InterruptionCause::user("bob")];
        assert!(dispatch_causes(CancelEntry::Reason(&rec), causes.clone(), "Recorder"));
        let reasons = rec.reasons.lock().unwrap();
        assert_eq!(reasons.as_slice(), &[CancellationReason::from(FlowInterrupted::with_causes(causes))]);
    }

    #[test]
    fn both_entries_route_without_adaptation() {
        let rec = Recorder::default();
        let both = || CancelEntry::Both { reason: &rec, causes: &rec };
        assert!(dispatch_reason(both(), failure(), "Recorder"));
        assert!(dispatch_causes(both(), vec![], "Recorder"));
        assert_eq!(rec.reasons.lock().unwrap().as_slice(), &[failure()]);
        assert_eq!(rec.causes.lock().unwrap().as_slice(), &[Vec::<InterruptionCause>::new()]);
    }

    #[test]
    #[should_panic(expected = "MyBody declares no cancellation entry point")]
    fn missing_entry_panics_with_type_name() {
        dispatch_causes(CancelEntry::Missing, vec![], "MyBody");
    }
}
