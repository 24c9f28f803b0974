//! body-persistence
//!
//! Backend durable para el log de eventos de bodies: un archivo JSON-lines
//! por `body_id`, cada línea con su hash de integridad.
//!
//! Módulos:
//! - `file`: `FileEventStore`, implementación de `EventStore` sobre disco.
//! - `config`: carga de configuración desde variables de entorno / .env.
//! - `error`: errores de persistencia.

pub mod config;
pub mod error;
pub mod file;

pub use config::{init_dotenv, StoreConfig};
pub use error::PersistenceError;
pub use file::{load_record, recover_records, FileEventStore, Recovery};
