use tracing::{info, warn};

use crate::backend::{strip_angle_brackets, BackendClient, BackendResult};
use crate::input::InputBuffer;
use crate::panel::RequestSlot;

/// Stored in place of a reply when the chat request fails for any reason.
pub const CHAT_ERROR_REPLY: &str = "Error: Could not reach backend.";

/// A chat message in the conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Default)]
pub struct ConversationPanel {
    transcript: Vec<ChatMessage>,
    input: InputBuffer,
    request: RequestSlot<String>,

    pub scroll: u16,
    pub view_height: u16, // inner height of the transcript area, set during render
    rendered_lines: u16,  // wrapped line count of the last drawn transcript
    detached: bool,       // user scrolled away from the bottom
}

impl ConversationPanel {
    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn input(&self) -> &InputBuffer {
        &self.input
    }

    /// The input is read-only while a request is in flight.
    pub fn input_mut(&mut self) -> Option<&mut InputBuffer> {
        if self.is_busy() {
            None
        } else {
            Some(&mut self.input)
        }
    }

    pub fn is_busy(&self) -> bool {
        self.request.is_busy()
    }

    /// Sends the current input. Blank input or an exchange already in flight
    /// makes this a no-op. The user entry lands in the transcript before the
    /// request is spawned.
    pub fn submit(&mut self, client: &BackendClient) -> bool {
        if self.is_busy() || self.input.is_blank() {
            return false;
        }

        let message = self.input.text().to_string();
        self.push(ChatMessage::user(message.clone()));

        let client = client.clone();
        self.request
            .start(async move { client.chat(&message).await });
        // The pending reply placeholder adds lines below the user entry
        self.scroll_to_bottom();
        info!(entries = self.transcript.len(), "chat message sent");
        true
    }

    /// Applies the reply if the outstanding exchange has settled.
    pub async fn poll(&mut self) {
        if let Some(result) = self.request.poll().await {
            self.finish(result);
        }
    }

    fn finish(&mut self, result: BackendResult<String>) {
        let reply = match result {
            Ok(reply) => strip_angle_brackets(&reply),
            Err(e) => {
                warn!("chat request failed: {}", e);
                CHAT_ERROR_REPLY.to_string()
            }
        };
        self.push(ChatMessage::assistant(reply));
        self.input.clear();
    }

    pub(crate) fn push(&mut self, message: ChatMessage) {
        self.transcript.push(message);
        self.scroll_to_bottom();
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_sub(lines);
        self.detached = self.scroll < self.max_scroll();
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_add(lines).min(self.max_scroll());
        self.detached = self.scroll < self.max_scroll();
    }

    pub fn half_page(&self) -> u16 {
        (self.view_height / 2).max(1)
    }

    /// Records how many wrapped lines the transcript took when it was last
    /// drawn. A view pinned to the bottom follows new content.
    pub fn set_rendered_lines(&mut self, lines: u16) {
        self.rendered_lines = lines;
        if self.detached {
            self.scroll = self.scroll.min(self.max_scroll());
        } else {
            self.scroll = self.max_scroll();
        }
    }

    fn max_scroll(&self) -> u16 {
        self.rendered_lines.saturating_sub(self.view_height)
    }

    /// Keep the latest entry in view, now and on following draws.
    pub fn scroll_to_bottom(&mut self) {
        self.detached = false;
        self.scroll = self.max_scroll();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn panel_with_input(text: &str) -> ConversationPanel {
        let mut panel = ConversationPanel::default();
        if let Some(input) = panel.input_mut() {
            input.insert_str(text);
        }
        panel
    }

    async fn settle(panel: &mut ConversationPanel) {
        if let Some(result) = panel.request.settle().await {
            panel.finish(result);
        }
    }

    async fn reply_server(body: serde_json::Value) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_blank_submit_is_noop() {
        let client = BackendClient::new("http://127.0.0.1:9");
        for text in ["", "   ", "\n\t"] {
            let mut panel = panel_with_input(text);
            assert!(!panel.submit(&client));
            assert!(panel.transcript().is_empty());
            assert!(!panel.is_busy());
        }
    }

    #[tokio::test]
    async fn test_user_entry_appended_before_reply() {
        let server = reply_server(serde_json::json!({ "response": "hello there" })).await;
        let client = BackendClient::new(&server.uri());

        let mut panel = panel_with_input("hi");
        assert!(panel.submit(&client));
        assert_eq!(panel.transcript(), &[ChatMessage::user("hi")]);
        assert!(panel.is_busy());
        assert!(panel.input_mut().is_none());

        settle(&mut panel).await;
        assert_eq!(
            panel.transcript(),
            &[ChatMessage::user("hi"), ChatMessage::assistant("hello there")]
        );
        assert!(!panel.is_busy());
        assert_eq!(panel.input().text(), "");
    }

    #[tokio::test]
    async fn test_reply_angle_brackets_stripped() {
        let server = reply_server(serde_json::json!({ "response": "<b>hi</b>" })).await;
        let client = BackendClient::new(&server.uri());

        let mut panel = panel_with_input("format please");
        panel.submit(&client);
        settle(&mut panel).await;

        assert_eq!(panel.transcript()[1], ChatMessage::assistant("bhi/b"));
    }

    #[tokio::test]
    async fn test_structured_reply_stored_as_text() {
        let server = reply_server(serde_json::json!({ "response": { "answer": [1, 2] } })).await;
        let client = BackendClient::new(&server.uri());

        let mut panel = panel_with_input("numbers?");
        panel.submit(&client);
        settle(&mut panel).await;

        assert_eq!(panel.transcript()[1].content, r#"{"answer":[1,2]}"#);
    }

    #[tokio::test]
    async fn test_network_failure_appends_error_entry() {
        // Nothing listens on the discard port
        let client = BackendClient::new("http://127.0.0.1:9");

        let mut panel = panel_with_input("anyone there?");
        panel.submit(&client);
        settle(&mut panel).await;

        assert_eq!(panel.transcript().len(), 2);
        assert_eq!(panel.transcript()[1], ChatMessage::assistant(CHAT_ERROR_REPLY));
        assert!(!panel.is_busy());
        assert_eq!(panel.input().text(), "");
    }

    #[tokio::test]
    async fn test_server_error_appends_error_entry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let client = BackendClient::new(&server.uri());

        let mut panel = panel_with_input("hello");
        panel.submit(&client);
        settle(&mut panel).await;

        assert_eq!(panel.transcript()[1].content, CHAT_ERROR_REPLY);
    }

    #[tokio::test]
    async fn test_second_submit_while_busy_refused() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "response": "ok" }))
                    .set_delay(std::time::Duration::from_millis(100)),
            )
            .expect(1)
            .mount(&server)
            .await;
        let client = BackendClient::new(&server.uri());

        let mut panel = panel_with_input("first");
        assert!(panel.submit(&client));
        assert!(!panel.submit(&client));
        assert_eq!(panel.transcript().len(), 1);

        settle(&mut panel).await;
        assert_eq!(panel.transcript().len(), 2);
    }

    #[tokio::test]
    async fn test_each_exchange_adds_two_entries() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "response": "ok" })),
            )
            .mount(&server)
            .await;
        let client = BackendClient::new(&server.uri());

        let mut panel = ConversationPanel::default();
        for (i, text) in ["one", "two", "three"].iter().enumerate() {
            panel.input_mut().unwrap().insert_str(text);
            panel.submit(&client);
            settle(&mut panel).await;
            assert_eq!(panel.transcript().len(), 2 * (i + 1));
        }
    }

    #[test]
    fn test_view_follows_bottom_until_scrolled_away() {
        let mut panel = ConversationPanel {
            view_height: 4,
            ..ConversationPanel::default()
        };
        for i in 0..5 {
            panel.push(ChatMessage::user(format!("message {}", i)));
        }
        panel.set_rendered_lines(15);
        assert_eq!(panel.scroll, 11);

        panel.scroll_up(5);
        assert_eq!(panel.scroll, 6);
        panel.set_rendered_lines(20);
        assert_eq!(panel.scroll, 6, "detached view stays put");

        panel.scroll_down(100);
        assert_eq!(panel.scroll, 16);
        panel.set_rendered_lines(22);
        assert_eq!(panel.scroll, 18);
    }

    #[test]
    fn test_new_entry_reattaches_view() {
        let mut panel = ConversationPanel {
            view_height: 4,
            ..ConversationPanel::default()
        };
        panel.set_rendered_lines(10);
        panel.scroll_up(3);
        assert_eq!(panel.scroll, 3);

        panel.push(ChatMessage::assistant("more"));
        panel.set_rendered_lines(13);
        assert_eq!(panel.scroll, 9);
    }
}
