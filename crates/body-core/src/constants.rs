//! Constantes del núcleo de ejecución de bodies.

/// Versión del formato de `BodyRecord` y de los eventos persistidos. Se
/// registra en `BodyCreated`; incrementarla sólo ante cambios incompatibles.
pub const RECORD_FORMAT_VERSION: u32 = 1;

/// Prefijo del nombre de los hilos que ejecutan bodies.
pub const WORKER_THREAD_PREFIX: &str = "body-";
