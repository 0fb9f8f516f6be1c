use std::thread::JoinHandle;

use anyhow::{Context, Result, anyhow};

// ---------------------------------------------------------------------------
// Background task polled from the UI thread
// ---------------------------------------------------------------------------

/// Work running on its own thread. The UI calls [`BackgroundTask::poll`] each
/// frame and gets the result exactly once.
pub struct BackgroundTask<T> {
    name: String,
    handle: Option<JoinHandle<T>>,
}

impl<T: Send + 'static> BackgroundTask<T> {
    pub fn spawn<F>(name: &str, work: F) -> Result<Self>
    where
        F: FnOnce() -> T + Send + 'static,
    {
        let handle = std::thread::Builder::new()
            .name(name.to_string())
            .spawn(work)
            .with_context(|| format!("spawning task '{name}'"))?;
        Ok(Self {
            name: name.to_string(),
            handle: Some(handle),
        })
    }

    /// `Some` once the work has finished; `None` while it runs or after the
    /// result was taken. A panic in the work surfaces as an error.
    pub fn poll(&mut self) -> Option<Result<T>> {
        if !self.handle.as_ref()?.is_finished() {
            return None;
        }
        let handle = self.handle.take()?;
        Some(
            handle
                .join()
                .map_err(|_| anyhow!("task '{}' panicked", self.name)),
        )
    }

    pub fn is_pending(&self) -> bool {
        self.handle.is_some()
    }
}
