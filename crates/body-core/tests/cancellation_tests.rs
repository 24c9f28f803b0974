#![allow(deprecated)]

use body_core::{BodyError, BodyEventKind, BodyExecution, BodyHandle, BodyStatus, CancellationReason, EventStore, FailureReason, FlowInterrupted, InMemoryEventStore, InterruptionCause};
use serde_json::json;
use std::sync::mpsc;
use std::time::{Duration, Instant};

fn sleeping_body(store: &std::sync::Arc<std::sync::Mutex<InMemoryEventStore>>) -> BodyHandle {
    let (tx, rx) = mpsc::channel();
    let handle = BodyHandle::spawn("sleep", store.clone(), move |ctx| {
                     tx.send(()).ok();
                     ctx.sleep(Duration::from_secs(10))?;
                     Ok(json!("woke up"))
                 }).expect("spawn");
    rx.recv_timeout(Duration::from_secs(5)).expect("body should start");
    handle
}

#[test]
fn cancel_interrupts_sleeping_body_promptly() {
    let store = InMemoryEventStore::shared();
    let handle = sleeping_body(&store);
    let started = Instant::now();
    let reason: CancellationReason = FlowInterrupted::aborted().into();

    assert!(handle.cancel(reason.clone()));
    assert!(handle.is_cancelled());
    assert!(handle.is_done());
    assert_eq!(handle.get(), Err(BodyError::Cancelled(reason)));
    assert!(started.elapsed() < Duration::from_secs(1), "cancellation must not wait for the body");
}

#[test]
fn finished_body_rejects_cancel_and_keeps_result() {
    let store = InMemoryEventStore::shared();
    let handle = BodyHandle::spawn("quick", store.clone(), |_ctx| Ok(json!({"answer": 42}))).expect("spawn");
    assert_eq!(handle.get(), Ok(json!({"answer": 42})));

    for _ in 0..3 {
        assert!(!handle.cancel(FlowInterrupted::aborted().into()));
        assert!(!handle.cancel_causes(vec![InterruptionCause::user("alice")]));
        assert!(!handle.cancel_flag(true));
    }
    assert!(!handle.is_cancelled());
    assert_eq!(handle.status(), BodyStatus::Completed);
    assert_eq!(handle.get(), Ok(json!({"answer": 42})));

    let events = store.lock().unwrap().list(handle.body_id()).unwrap();
    assert!(!events.iter().any(|e| matches!(e.kind, BodyEventKind::BodyCancelled { .. })));
}

#[test]
fn second_cancel_does_not_replace_recorded_reason() {
    let store = InMemoryEventStore::shared();
    let handle = sleeping_body(&store);
    let first: CancellationReason = FlowInterrupted::with_causes(vec![InterruptionCause::user("first")]).into();
    let second: CancellationReason = FailureReason::new("Later", "too late").into();

    assert!(handle.cancel(first.clone()));
    assert!(!handle.cancel(second));
    assert_eq!(handle.get(), Err(BodyError::Cancelled(first)));
}

#[test]
fn flag_cancel_matches_default_aborted_reason() {
    let store = InMemoryEventStore::shared();
    let by_flag = sleeping_body(&store);
    let by_reason = sleeping_body(&store);

    assert!(by_flag.cancel_flag(false));
    assert!(by_reason.cancel(FlowInterrupted::aborted().into()));
    assert_eq!(by_flag.get(), by_reason.get());
}

#[test]
fn legacy_causes_on_reason_handle_become_aborted_reason() {
    let store = InMemoryEventStore::shared();
    let handle = sleeping_body(&store);
    let causes = vec![InterruptionCause::Timeout { limit_ms: 500 }];

    assert!(handle.cancel_causes(causes.clone()));
    assert_eq!(handle.get(), Err(BodyError::Cancelled(FlowInterrupted::with_causes(causes).into())));
}

#[test]
fn body_failure_is_distinct_from_cancellation() {
    let store = InMemoryEventStore::shared();
    let handle = BodyHandle::spawn("fails", store, |_ctx| Err(FailureReason::new("Validation", "bad input"))).expect("spawn");
    assert_eq!(handle.get(), Err(BodyError::Failed(FailureReason::new("Validation", "bad input"))));
    assert!(handle.is_done());
    assert!(!handle.is_cancelled());
}

#[test]
fn panicking_body_reports_failure() {
    let store = InMemoryEventStore::shared();
    let handle = BodyHandle::spawn("panics", store, |_ctx| -> Result<serde_json::Value, FailureReason> { panic!("kaboom") }).expect("spawn");
    match handle.get() {
        Err(BodyError::Failed(failure)) => {
            assert_eq!(failure.kind, "panic");
            assert_eq!(failure.message, "kaboom");
        }
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[test]
fn get_timeout_reports_timeout_while_running() {
    let store = InMemoryEventStore::shared();
    let handle = sleeping_body(&store);
    assert_eq!(handle.get_timeout(Duration::from_millis(50)), Err(BodyError::Timeout(Duration::from_millis(50))));
    assert_eq!(handle.status(), BodyStatus::Running);
    handle.cancel(FlowInterrupted::aborted().into());
}

#[test]
fn unbounded_timeout_returns_finished_outcome() {
    let store = InMemoryEventStore::shared();
    let cancelled = BodyHandle::new("pending", store.clone());
    assert!(cancelled.cancel(FlowInterrupted::aborted().into()));
    assert_eq!(cancelled.get_timeout(Duration::MAX), Err(BodyError::Cancelled(FlowInterrupted::aborted().into())));

    let completed = BodyHandle::spawn("quick", store, |_ctx| Ok(json!(7))).expect("spawn");
    assert_eq!(completed.get_timeout(Duration::MAX), Ok(json!(7)));
}

#[test]
fn unbounded_timeout_waits_on_pending_handle_until_cancelled() {
    let store = InMemoryEventStore::shared();
    let handle = BodyHandle::new("pending", store);
    let waiting = {
        let handle = handle.clone();
        std::thread::spawn(move || handle.get_timeout(Duration::MAX))
    };
    std::thread::sleep(Duration::from_millis(50));
    assert!(handle.cancel(FlowInterrupted::aborted().into()));
    assert_eq!(waiting.join().expect("waiter thread"), Err(BodyError::Cancelled(FlowInterrupted::aborted().into())));

    let waiter = handle.wait_interrupt();
    assert_eq!(handle.get_interruptibly(&waiter, Some(Duration::MAX)), Err(BodyError::Cancelled(FlowInterrupted::aborted().into())));
}

#[test]
fn unbounded_sleep_in_body_ends_as_cancellation() {
    let store = InMemoryEventStore::shared();
    let (tx, rx) = mpsc::channel();
    let (woke_tx, woke_rx) = mpsc::channel();
    let handle = BodyHandle::spawn("forever", store, move |ctx| {
                     tx.send(()).ok();
                     let slept = ctx.sleep(Duration::MAX);
                     woke_tx.send(slept.is_err()).ok();
                     slept?;
                     Ok(json!("never"))
                 }).expect("spawn");
    rx.recv_timeout(Duration::from_secs(5)).expect("body should start");
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(handle.status(), BodyStatus::Running);

    assert!(handle.cancel(FlowInterrupted::aborted().into()));
    assert_eq!(woke_rx.recv_timeout(Duration::from_secs(1)), Ok(true));
    assert_eq!(handle.get(), Err(BodyError::Cancelled(FlowInterrupted::aborted().into())));
}

#[test]
fn waiter_interruption_is_not_body_cancellation() {
    let store = InMemoryEventStore::shared();
    let handle = sleeping_body(&store);
    let waiter = handle.wait_interrupt();

    let waiting = {
        let handle = handle.clone();
        let waiter = waiter.clone();
        std::thread::spawn(move || handle.get_interruptibly(&waiter, None))
    };
    std::thread::sleep(Duration::from_millis(50));
    waiter.interrupt();

    assert_eq!(waiting.join().expect("waiter thread"), Err(BodyError::WaitInterrupted));
    assert!(!waiter.is_interrupted(), "flag is consumed when reported");
    assert_eq!(handle.status(), BodyStatus::Running);
    assert!(!handle.is_cancelled());
    handle.cancel(FlowInterrupted::aborted().into());
}

#[test]
fn cancel_before_start_prevents_running() {
    let store = InMemoryEventStore::shared();
    let handle = BodyHandle::new("never", store);
    assert!(handle.cancel(FlowInterrupted::aborted().into()));
    assert_eq!(handle.start(|_ctx| Ok(json!(null))), Err(body_core::HandleError::Terminal(BodyStatus::Cancelled)));
    assert_eq!(handle.get(), Err(BodyError::Cancelled(FlowInterrupted::aborted().into())));
}

#[test]
fn current_executions_reports_innermost_and_stops_new_work() {
    let store = InMemoryEventStore::shared();
    let (entered_tx, entered_rx) = mpsc::channel();
    let (refused_tx, refused_rx) = mpsc::channel();
    let handle = BodyHandle::spawn("nested", store, move |ctx| {
                     let outer = ctx.enter("stage", "Stage: build")?;
                     let inner = outer.enter("sh", "Shell script")?;
                     entered_tx.send(inner.execution().clone()).ok();
                     let slept = ctx.sleep(Duration::from_secs(10));
                     refused_tx.send(ctx.enter("late", "Late step").is_err()).ok();
                     slept?;
                     Ok(json!(null))
                 }).expect("spawn");

    let inner = entered_rx.recv_timeout(Duration::from_secs(5)).expect("entered");
    assert_eq!(handle.current_executions(), vec![inner]);

    handle.cancel(FlowInterrupted::aborted().into());
    assert!(refused_rx.recv_timeout(Duration::from_secs(5)).expect("late enter"), "no new work after cancel");
}

#[test]
fn executions_are_empty_after_completion() {
    let store = InMemoryEventStore::shared();
    let handle = BodyHandle::spawn("done", store, |ctx| {
                     let _guard = ctx.enter("echo", "Print message")?;
                     Ok(json!(1))
                 }).expect("spawn");
    assert_eq!(handle.get(), Ok(json!(1)));
    assert!(handle.current_executions().is_empty());
}
