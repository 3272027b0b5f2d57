#![allow(clippy::module_name_repetitions)]
//! Container runtime discovery.

use std::env;
use std::io;
use std::path::PathBuf;

use once_cell::sync::OnceCell;
use which::which;

static RUNTIME_PATH: OnceCell<PathBuf> = OnceCell::new();

/// Locate the container runtime binary.
///
/// Resolution order: the `RUSTAINER_BIN` environment variable, then
/// `apptainer` on PATH, then `singularity` (the runtime's pre-rename name).
/// PATH lookups are cached for the process lifetime; the env override is
/// consulted on every call so tests can redirect invocations.
pub fn runtime_binary_path() -> io::Result<PathBuf> {
    // Allow tests or callers to explicitly disable discovery to avoid hard failures
    if env::var("RUSTAINER_SKIP_RUNTIME").ok().as_deref() == Some("1") {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            "container runtime disabled by environment override.",
        ));
    }

    if let Ok(p) = env::var("RUSTAINER_BIN") {
        if !p.trim().is_empty() {
            return Ok(PathBuf::from(p));
        }
    }

    if let Some(p) = RUNTIME_PATH.get() {
        return Ok(p.clone());
    }

    let found = which("apptainer").or_else(|_| which("singularity")).map_err(|_| {
        io::Error::new(
            io::ErrorKind::NotFound,
            "apptainer (or singularity) is required but was not found in PATH.",
        )
    })?;
    Ok(RUNTIME_PATH.get_or_init(|| found).clone())
}
