use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io;
use std::path::Path;
use std::thread::sleep;
use std::time::Duration;

static INIT_ONCE: std::sync::Once = std::sync::Once::new();
pub fn init_tracing_once() {
    INIT_ONCE.call_once(|| {
        let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let _ = tracing_subscriber::fmt().with_env_filter(env_filter).try_init();
    });
}

/// Install the rayon global pool with `threads` workers. Returns `false` when
/// nothing was installed: no size given, or a global pool already exists (the
/// global pool can only be built once per process).
pub fn init_thread_pool(threads: Option<usize>) -> bool {
    let Some(n) = threads.filter(|&n| n > 0) else {
        return false;
    };
    match rayon::ThreadPoolBuilder::new().num_threads(n).build_global() {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!(
                requested = n,
                active = rayon::current_num_threads(),
                error = %e,
                "rayon global pool already initialized; requested parallelism ignored"
            );
            false
        }
    }
}

/// Transient errors seen on Windows when AV/backup filter drivers or
/// network volumes hold a file: access denied (5), sharing violation (32),
/// lock violation (33), device not ready (21), I/O device error (1117),
/// user-mapped section open (1224).
fn is_retriable_io_error(e: &io::Error) -> bool {
    matches!(e.raw_os_error(), Some(5 | 21 | 32 | 33 | 1117 | 1224))
}

/// Run `op` up to `tries` times with linear backoff while it fails with a
/// retriable error.
fn with_backoff<T>(tries: usize, delay_ms: u64, mut op: impl FnMut() -> io::Result<T>) -> io::Result<T> {
    let tries = tries.max(1);
    let mut attempt = 0;
    loop {
        match op() {
            Ok(v) => return Ok(v),
            Err(e) if attempt + 1 < tries && is_retriable_io_error(&e) => {
                attempt += 1;
                sleep(Duration::from_millis(delay_ms.saturating_mul(attempt as u64)));
            }
            Err(e) => return Err(e),
        }
    }
}

pub fn open_with_backoff(path: &Path, tries: usize, delay_ms: u64) -> io::Result<File> {
    with_backoff(tries, delay_ms, || File::open(path))
}

pub fn create_with_backoff(path: &Path, tries: usize, delay_ms: u64) -> io::Result<File> {
    with_backoff(tries, delay_ms, || File::create(path))
}

/// Atomically replace `dest` with `tmp`. Falls back to copy+remove when the
/// rename is refused (e.g. across volumes).
pub fn replace_file_atomic_backoff(tmp: &Path, dest: &Path) -> Result<()> {
    let (tries, delay_ms) = (20, 50);
    match with_backoff(tries, delay_ms, || fs::rename(tmp, dest)) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            tracing::debug!(error = %rename_err, "rename failed, copying instead");
            with_backoff(tries, delay_ms, || fs::copy(tmp, dest))
                .with_context(|| format!("copy {} -> {}", tmp.display(), dest.display()))?;
            with_backoff(tries, delay_ms, || match fs::remove_file(tmp) {
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
                other => other,
            })
            .with_context(|| format!("remove {}", tmp.display()))?;
            Ok(())
        }
    }
}
