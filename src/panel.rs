//! Plumbing shared by the panels: the single in-flight request slot that
//! doubles as each panel's busy flag, and the one-line status notice.

use std::future::Future;

use tokio::task::JoinHandle;

use crate::backend::BackendResult;

/// Holds at most one outstanding backend request. While occupied the owning
/// panel is busy and refuses to start another.
pub struct RequestSlot<T> {
    handle: Option<JoinHandle<BackendResult<T>>>,
}

impl<T> Default for RequestSlot<T> {
    fn default() -> Self {
        Self { handle: None }
    }
}

impl<T: Send + 'static> RequestSlot<T> {
    pub fn is_busy(&self) -> bool {
        self.handle.is_some()
    }

    /// Spawns `request` unless one is already in flight. Returns whether it started.
    pub fn start<F>(&mut self, request: F) -> bool
    where
        F: Future<Output = BackendResult<T>> + Send + 'static,
    {
        if self.handle.is_some() {
            return false;
        }
        self.handle = Some(tokio::spawn(request));
        true
    }

    /// Takes the result if the request has settled. Never blocks on a request
    /// that is still running.
    pub async fn poll(&mut self) -> Option<BackendResult<T>> {
        if !self.handle.as_ref().is_some_and(|h| h.is_finished()) {
            return None;
        }
        self.settle().await
    }

    /// Waits for the in-flight request, if any, to settle.
    pub async fn settle(&mut self) -> Option<BackendResult<T>> {
        let handle = self.handle.take()?;
        Some(handle.await.unwrap_or_else(|e| Err(e.into())))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// Last outcome of a panel's primary action, shown beneath it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }
}
