//! Presentation seam for loader and toast side effects.
//!
//! Core operations never touch the UI. Callers that want a loader or toast
//! around a call hand a [`UiSink`] to a presentation helper, which holds a
//! [`LoadingGuard`] for the duration of the call.

use std::future::Future;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    PresentLoader,
    DismissLoader,
    Toast(String),
}

pub trait UiSink: Send + Sync {
    fn emit(&self, event: UiEvent);

    fn toast(&self, message: &str) {
        self.emit(UiEvent::Toast(message.to_string()));
    }
}

/// Discards every event.
pub struct NoopUiSink;

impl UiSink for NoopUiSink {
    fn emit(&self, _event: UiEvent) {}
}

pub fn noop_sink() -> Arc<dyn UiSink> {
    Arc::new(NoopUiSink)
}

/// Records events in order, for tests.
#[derive(Default)]
pub struct InMemoryUiSink {
    events: Mutex<Vec<UiEvent>>,
}

impl InMemoryUiSink {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn events(&self) -> Vec<UiEvent> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
    pub fn toasts(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                UiEvent::Toast(m) => Some(m),
                _ => None,
            })
            .collect()
    }
}

impl UiSink for InMemoryUiSink {
    fn emit(&self, event: UiEvent) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event);
    }
}

/// Forwards toasts to `tracing` at info level and loader events at debug.
pub struct TracingUiSink;

impl UiSink for TracingUiSink {
    fn emit(&self, event: UiEvent) {
        match event {
            UiEvent::Toast(message) => tracing::info!(%message, "toast"),
            other => tracing::debug!(event = ?other, "ui event"),
        }
    }
}

/// Presents the loader on creation and dismisses it on drop.
#[must_use = "the loader is dismissed as soon as the guard is dropped"]
pub struct LoadingGuard<'a> {
    sink: &'a dyn UiSink,
}

impl<'a> LoadingGuard<'a> {
    pub fn present(sink: &'a dyn UiSink) -> Self {
        sink.emit(UiEvent::PresentLoader);
        Self { sink }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.sink.emit(UiEvent::DismissLoader);
    }
}

/// Run `fut` with the loader shown. The loader is dismissed however the
/// future ends, including when it is dropped before completion.
pub async fn with_loader<F, T>(sink: &dyn UiSink, fut: F) -> T
where
    F: Future<Output = T>,
{
    let _guard = LoadingGuard::present(sink);
    fut.await
}
