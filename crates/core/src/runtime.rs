//! Global Async Runtime
//!
//! Provides the shared Tokio runtime the `promptdeck` binary runs on. The
//! library itself only needs an ambient runtime, so tests use `#[tokio::test]`.

use once_cell::sync::Lazy;
use tokio::runtime::Runtime;

/// Global shared Tokio runtime
///
/// Initialized lazily on first use; hosts the HTTP server, the startup
/// migration and any task they spawn (the delayed migration completion).
pub static RUNTIME: Lazy<Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("promptdeck")
        .build()
        .expect("Failed to create Tokio runtime")
});

/// Run a future to completion (blocking the current thread)
pub fn block_on<F: std::future::Future>(future: F) -> F::Output {
    RUNTIME.block_on(future)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_on_hosts_spawned_tasks() {
        let value = block_on(async { tokio::spawn(async { 40 + 2 }).await.unwrap() });
        assert_eq!(value, 42);
    }
}
