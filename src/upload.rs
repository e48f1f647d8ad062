use std::path::PathBuf;

use tracing::{info, warn};

use crate::backend::{BackendClient, BackendError, BackendResult};
use crate::input::InputBuffer;
use crate::panel::{Notice, RequestSlot};

/// Splits a typed selection into paths. Entries are separated by commas or
/// newlines; a leading `~/` expands to the home directory.
pub fn parse_selection(text: &str) -> Vec<PathBuf> {
    text.split([',', '\n'])
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(expand_home)
        .collect()
}

fn expand_home(entry: &str) -> PathBuf {
    if let Some(rest) = entry.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(entry)
}

#[derive(Default)]
pub struct UploadPanel {
    pub path_input: InputBuffer,
    selection: Vec<PathBuf>,
    request: RequestSlot<usize>,
    notice: Option<Notice>,
}

impl UploadPanel {
    pub fn selection(&self) -> &[PathBuf] {
        &self.selection
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.request.is_busy()
    }

    /// Replaces the selection wholesale.
    pub fn select_files(&mut self, paths: Vec<PathBuf>) {
        self.selection = paths;
    }

    /// Moves whatever was typed into the path field into the selection.
    pub fn select_from_input(&mut self) {
        let typed = self.path_input.take();
        self.select_files(parse_selection(&typed));
    }

    /// Sends every selected file in one multipart request. Does nothing when
    /// the selection is empty or an upload is already running.
    pub fn upload(&mut self, client: &BackendClient) -> bool {
        if self.is_busy() || self.selection.is_empty() {
            return false;
        }

        let paths = self.selection.clone();
        let client = client.clone();
        self.notice = None;
        self.request.start(async move {
            client.upload(&paths).await?;
            Ok::<_, BackendError>(paths.len())
        });
        info!(files = self.selection.len(), "upload started");
        true
    }

    pub async fn poll(&mut self) {
        if let Some(result) = self.request.poll().await {
            self.finish(result);
        }
    }

    fn finish(&mut self, result: BackendResult<usize>) {
        self.notice = Some(match result {
            Ok(count) => {
                info!(files = count, "upload finished");
                Notice::info(format!("Uploaded {} file(s).", count))
            }
            Err(e) => {
                warn!("upload failed: {}", e);
                Notice::error(format!("Upload failed: {}", e))
            }
        });
        self.selection.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::NoticeKind;
    use std::fs;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn settle(panel: &mut UploadPanel) {
        if let Some(result) = panel.request.settle().await {
            panel.finish(result);
        }
    }

    fn write_files(dir: &std::path::Path, names: &[&str]) -> Vec<PathBuf> {
        names
            .iter()
            .map(|name| {
                let path = dir.join(name);
                fs::write(&path, format!("body of {}", name)).unwrap();
                path
            })
            .collect()
    }

    #[test]
    fn test_parse_selection() {
        let paths = parse_selection(" a.txt, docs/b.pdf ,,\nc d.docx\n");
        assert_eq!(
            paths,
            vec![
                PathBuf::from("a.txt"),
                PathBuf::from("docs/b.pdf"),
                PathBuf::from("c d.docx"),
            ]
        );
        assert!(parse_selection("  ,\n ").is_empty());
    }

    #[test]
    fn test_select_files_replaces() {
        let mut panel = UploadPanel::default();
        panel.select_files(vec![PathBuf::from("a"), PathBuf::from("b")]);
        panel.select_files(vec![PathBuf::from("c")]);
        assert_eq!(panel.selection(), &[PathBuf::from("c")]);
    }

    #[test]
    fn test_select_from_input_clears_field() {
        let mut panel = UploadPanel::default();
        panel.path_input.insert_str("x.txt, y.txt");
        panel.select_from_input();
        assert_eq!(panel.selection().len(), 2);
        assert_eq!(panel.path_input.text(), "");
    }

    #[tokio::test]
    async fn test_empty_selection_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        let client = BackendClient::new(&server.uri());

        let mut panel = UploadPanel::default();
        assert!(!panel.upload(&client));
        assert!(!panel.is_busy());
    }

    #[tokio::test]
    async fn test_upload_sends_one_request_with_all_parts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        let client = BackendClient::new(&server.uri());

        let dir = tempfile::tempdir().unwrap();
        let mut panel = UploadPanel::default();
        panel.select_files(write_files(dir.path(), &["one.txt", "two.txt", "three.txt"]));

        assert!(panel.upload(&client));
        assert!(panel.is_busy());
        assert!(!panel.upload(&client));
        settle(&mut panel).await;

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let body = String::from_utf8_lossy(&requests[0].body);
        assert_eq!(body.matches("name=\"files\"").count(), 3);

        assert!(panel.selection().is_empty());
        assert!(!panel.is_busy());
        assert_eq!(panel.notice(), Some(&Notice::info("Uploaded 3 file(s).")));
    }

    #[tokio::test]
    async fn test_failed_upload_still_clears_selection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;
        let client = BackendClient::new(&server.uri());

        let dir = tempfile::tempdir().unwrap();
        let mut panel = UploadPanel::default();
        panel.select_files(write_files(dir.path(), &["a.txt", "b.txt"]));

        panel.upload(&client);
        settle(&mut panel).await;

        assert!(panel.selection().is_empty());
        assert!(!panel.is_busy());
        assert_eq!(panel.notice().map(|n| n.kind), Some(NoticeKind::Error));
    }
}
