use ratatui::widgets::ListState;
use tracing::{info, warn};

use crate::backend::{BackendClient, BackendError, BackendResult};
use crate::panel::{Notice, RequestSlot};

pub const EMPTY_INDEX_PLACEHOLDER: &str = "No embedded files yet.";

/// Outcome of an embed call plus the list refresh that always follows it.
struct EmbedOutcome {
    embed: BackendResult<()>,
    files: BackendResult<Vec<String>>,
}

#[derive(Default)]
pub struct IndexPanel {
    files: Vec<String>,
    pub list_state: ListState,
    refresh: RequestSlot<Vec<String>>,
    embedding: RequestSlot<EmbedOutcome>,
    notice: Option<Notice>,
}

impl IndexPanel {
    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Busy while an embed call or its follow-up refresh is outstanding.
    pub fn is_busy(&self) -> bool {
        self.embedding.is_busy()
    }

    /// Initial list fetch.
    pub fn mount(&mut self, client: &BackendClient) {
        let client = client.clone();
        self.refresh
            .start(async move { client.embedded_files().await });
    }

    /// Asks the backend to index new uploads, then re-fetches the list
    /// exactly once whether or not indexing succeeded.
    pub fn trigger_embedding(&mut self, client: &BackendClient) -> bool {
        let client = client.clone();
        let started = self.embedding.start(async move {
            let embed = client.embed_all().await;
            let files = client.embedded_files().await;
            Ok::<_, BackendError>(EmbedOutcome { embed, files })
        });
        if started {
            self.notice = None;
            info!("embedding started");
        }
        started
    }

    pub async fn poll(&mut self) {
        if let Some(result) = self.refresh.poll().await {
            self.apply_listing(result);
        }
        if let Some(result) = self.embedding.poll().await {
            self.finish_embedding(result);
        }
    }

    fn apply_listing(&mut self, result: BackendResult<Vec<String>>) {
        match result {
            Ok(files) => self.replace_files(files),
            Err(e) => warn!("failed to fetch embedded files: {}", e),
        }
    }

    fn finish_embedding(&mut self, result: BackendResult<EmbedOutcome>) {
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("embedding task failed: {}", e);
                self.notice = Some(Notice::error(format!("Embedding failed: {}", e)));
                return;
            }
        };

        self.notice = Some(match outcome.embed {
            Ok(()) => {
                info!("embedding complete");
                Notice::info("Embedding complete.")
            }
            Err(e) => {
                warn!("embedding failed: {}", e);
                Notice::error(format!("Embedding failed: {}", e))
            }
        });
        self.apply_listing(outcome.files);
    }

    fn replace_files(&mut self, files: Vec<String>) {
        self.files = files;
        let selected = match self.list_state.selected() {
            _ if self.files.is_empty() => None,
            Some(i) => Some(i.min(self.files.len() - 1)),
            None => None,
        };
        self.list_state.select(selected);
    }

    pub fn nav_down(&mut self) {
        let len = self.files.len();
        if len > 0 {
            let i = self.list_state.selected().map_or(0, |i| (i + 1).min(len - 1));
            self.list_state.select(Some(i));
        }
    }

    pub fn nav_up(&mut self) {
        if !self.files.is_empty() {
            let i = self.list_state.selected().unwrap_or(0);
            self.list_state.select(Some(i.saturating_sub(1)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::NoticeKind;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn settle(panel: &mut IndexPanel) {
        if let Some(result) = panel.refresh.settle().await {
            panel.apply_listing(result);
        }
        if let Some(result) = panel.embedding.settle().await {
            panel.finish_embedding(result);
        }
    }

    async fn mount_listing(server: &MockServer, files: &[&str], expected: u64) {
        Mock::given(method("GET"))
            .and(path("/embedded_files"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "files": files })),
            )
            .expect(expected)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_mount_fetches_list() {
        let server = MockServer::start().await;
        mount_listing(&server, &["a.pdf", "b.txt"], 1).await;
        let client = BackendClient::new(&server.uri());

        let mut panel = IndexPanel::default();
        panel.mount(&client);
        assert!(!panel.is_busy());
        settle(&mut panel).await;

        assert_eq!(panel.files(), &["a.pdf".to_string(), "b.txt".to_string()]);
    }

    #[tokio::test]
    async fn test_refetch_after_failed_embed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embed_all"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;
        mount_listing(&server, &["kept.pdf"], 1).await;
        let client = BackendClient::new(&server.uri());

        let mut panel = IndexPanel::default();
        assert!(panel.trigger_embedding(&client));
        assert!(panel.is_busy());
        assert!(!panel.trigger_embedding(&client));
        settle(&mut panel).await;

        assert!(!panel.is_busy());
        assert_eq!(panel.files(), &["kept.pdf".to_string()]);
        assert_eq!(panel.notice().map(|n| n.kind), Some(NoticeKind::Error));
    }

    #[tokio::test]
    async fn test_refetch_after_successful_embed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embed_all"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        mount_listing(&server, &["new.docx"], 1).await;
        let client = BackendClient::new(&server.uri());

        let mut panel = IndexPanel::default();
        panel.trigger_embedding(&client);
        settle(&mut panel).await;

        assert_eq!(panel.files(), &["new.docx".to_string()]);
        assert_eq!(panel.notice(), Some(&Notice::info("Embedding complete.")));
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_stale_list() {
        let mut panel = IndexPanel::default();
        panel.replace_files(vec!["old.txt".to_string()]);

        let client = BackendClient::new("http://127.0.0.1:9");
        panel.mount(&client);
        settle(&mut panel).await;

        assert_eq!(panel.files(), &["old.txt".to_string()]);
    }

    #[test]
    fn test_list_is_replaced_not_merged() {
        let mut panel = IndexPanel::default();
        panel.replace_files(vec!["a".into(), "b".into(), "c".into()]);
        panel.list_state.select(Some(2));
        panel.replace_files(vec!["d".into()]);

        assert_eq!(panel.files(), &["d".to_string()]);
        assert_eq!(panel.list_state.selected(), Some(0));

        panel.replace_files(Vec::new());
        assert_eq!(panel.list_state.selected(), None);
    }

    #[test]
    fn test_nav_clamps() {
        let mut panel = IndexPanel::default();
        panel.nav_down();
        assert_eq!(panel.list_state.selected(), None);

        panel.replace_files(vec!["a".into(), "b".into()]);
        panel.nav_down();
        panel.nav_down();
        panel.nav_down();
        assert_eq!(panel.list_state.selected(), Some(1));
        panel.nav_up();
        panel.nav_up();
        assert_eq!(panel.list_state.selected(), Some(0));
    }
}
