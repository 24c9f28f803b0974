//! Demo: recupera los bodies persistidos y ejecuta/cancela uno nuevo.
//!
//! Variables: `BODY_STORE_DIR`, `BODY_STORE_SYNC`, `RUST_LOG`.
use std::error::Error;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use body_core::{BodyExecution, BodyHandle, FlowInterrupted, InMemoryBodyRepository, InterruptionCause};
use body_persistence::{init_dotenv, recover_records, FileEventStore, StoreConfig};
use log::info;
use serde_json::json;

fn main() -> Result<(), Box<dyn Error>> {
    // .env puede traer RUST_LOG
    init_dotenv();
    env_logger::init();
    let config = StoreConfig::from_env();
    let store = FileEventStore::from_config(&config)?;
    info!("store dir={}", store.dir().display());

    let recovery = recover_records(&store, &InMemoryBodyRepository::new())?;
    println!("Bodies recuperados: {}", recovery.records.len());
    for record in &recovery.records {
        println!("  {} step={} status={:?}", record.body_id, record.step_id, record.status);
    }
    for (body_id, error) in &recovery.failures {
        println!("  {body_id} ilegible: {error}");
    }

    let store = Arc::new(Mutex::new(store));
    let handle = BodyHandle::spawn("demo", store.clone(), |ctx| {
        let stage = ctx.enter("stage", "Stage: long task")?;
        let _step = stage.enter("sleep", "Sleep 10s")?;
        ctx.sleep(Duration::from_secs(10))?;
        Ok(json!({"slept": true}))
    })?;

    std::thread::sleep(Duration::from_millis(200));
    for execution in handle.current_executions() {
        println!("Ejecutando: {} ({})", execution.display_name, execution.step_id);
    }

    let accepted = handle.cancel(FlowInterrupted::with_causes(vec![InterruptionCause::user("demo")]).into());
    println!("Cancelación aceptada: {accepted}");
    match handle.get_timeout(Duration::from_secs(1)) {
        Ok(value) => println!("Resultado: {value}"),
        Err(e) => println!("Desenlace: {e}"),
    }
    println!("Record: {}", serde_json::to_string_pretty(&handle.record())?);
    Ok(())
}
