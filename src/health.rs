use tracing::{info, warn};

use crate::backend::{BackendClient, BackendHealth, BackendResult};
use crate::panel::RequestSlot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    NotReady,
}

impl Readiness {
    pub fn label(&self) -> &'static str {
        match self {
            Readiness::Ready => "Ready",
            Readiness::NotReady => "Not Ready",
        }
    }
}

/// Backend readiness shown in the sidebar. The snapshot is fetched once and
/// never refreshed.
#[derive(Default)]
pub struct HealthIndicator {
    snapshot: Option<BackendHealth>,
    request: RequestSlot<BackendHealth>,
    mounted: bool,
}

impl HealthIndicator {
    pub fn mount(&mut self, client: &BackendClient) {
        if self.mounted {
            return;
        }
        self.mounted = true;

        let client = client.clone();
        self.request.start(async move { client.health().await });
    }

    pub async fn poll(&mut self) {
        if let Some(result) = self.request.poll().await {
            self.apply(result);
        }
    }

    fn apply(&mut self, result: BackendResult<BackendHealth>) {
        self.snapshot = match result {
            Ok(health) => {
                info!(status = %health.status, "backend health received");
                Some(health)
            }
            Err(e) => {
                warn!("backend health check failed: {}", e);
                None
            }
        };
    }

    pub fn snapshot(&self) -> Option<&BackendHealth> {
        self.snapshot.as_ref()
    }

    /// A missing snapshot reads the same as an explicit non-ok status.
    pub fn readiness(&self) -> Readiness {
        match &self.snapshot {
            Some(health) if health.is_ok() => Readiness::Ready,
            _ => Readiness::NotReady,
        }
    }

    /// Embedding, vector store and language-model lines, verbatim. Empty when
    /// there is no snapshot.
    pub fn info_lines(&self) -> [String; 3] {
        self.snapshot
            .as_ref()
            .map(BackendHealth::info_lines)
            .unwrap_or_default()
    }
}
