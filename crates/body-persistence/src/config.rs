//! Carga de configuración del store desde variables de entorno.
//! Usa `BODY_STORE_DIR` y `BODY_STORE_SYNC`.

use dotenvy::dotenv;
use once_cell::sync::Lazy;
use std::env;
use std::path::PathBuf;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

pub const DEFAULT_STORE_DIR: &str = ".body-store";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Directorio con un archivo `<body_id>.jsonl` por body.
    pub dir: PathBuf,
    /// Forzar `fsync` tras cada append.
    pub sync_on_append: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { dir: PathBuf::from(DEFAULT_STORE_DIR),
               sync_on_append: false }
    }
}

impl StoreConfig {
    pub fn from_env() -> Self {
        // asegura que .env se haya cargado
        Lazy::force(&DOTENV_LOADED);
        Self::from_vars(env::var("BODY_STORE_DIR").ok(), env::var("BODY_STORE_SYNC").ok())
    }

    fn from_vars(dir: Option<String>, sync: Option<String>) -> Self {
        let defaults = Self::default();
        let dir = dir.filter(|d| !d.trim().is_empty()).map(PathBuf::from).unwrap_or(defaults.dir);
        let sync_on_append = sync.map(|v| parse_flag(&v)).unwrap_or(defaults.sync_on_append);
        Self { dir, sync_on_append }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// Forzar carga temprana de .env desde aplicaciones externas si se desea.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}
