use ratatui::layout::Position;

use crate::backend::BackendClient;
use crate::conversation::ConversationPanel;
use crate::health::HealthIndicator;
use crate::index::IndexPanel;
use crate::input::InputBuffer;
use crate::layout::{PanelVisibility, ShellAreas};
use crate::upload::UploadPanel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Sidebar,
    Conversation,
    Index,
}

impl FocusPane {
    const ORDER: [FocusPane; 3] = [FocusPane::Sidebar, FocusPane::Conversation, FocusPane::Index];
}

/// Top-level screen state. Each panel owns its own data and requests; the
/// app only routes input to them and tracks focus.
pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub focus: FocusPane,
    pub visibility: PanelVisibility,

    // Panels
    pub upload: UploadPanel,
    pub health: HealthIndicator,
    pub conversation: ConversationPanel,
    pub index: IndexPanel,

    pub client: BackendClient,

    // Animation state for busy indicators
    pub animation_frame: u16,

    // Panel areas for mouse hit-testing (updated during render)
    pub areas: Option<ShellAreas>,
}

impl App {
    pub fn new(client: BackendClient) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            focus: FocusPane::Conversation,
            visibility: PanelVisibility::default(),

            upload: UploadPanel::default(),
            health: HealthIndicator::default(),
            conversation: ConversationPanel::default(),
            index: IndexPanel::default(),

            client,

            animation_frame: 0,
            areas: None,
        }
    }

    /// Kicks off the one-time fetches the panels make when they first appear.
    pub fn mount(&mut self) {
        self.health.mount(&self.client);
        self.index.mount(&self.client);
    }

    /// Applies any request results that have arrived since the last call.
    pub async fn poll_requests(&mut self) {
        self.upload.poll().await;
        self.health.poll().await;
        self.index.poll().await;
        self.conversation.poll().await;
    }

    pub fn is_busy(&self) -> bool {
        self.upload.is_busy() || self.index.is_busy() || self.conversation.is_busy()
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.is_busy() {
            self.animation_frame = self.animation_frame.wrapping_add(1);
        }
    }

    pub fn is_visible(&self, pane: FocusPane) -> bool {
        match pane {
            FocusPane::Sidebar => self.visibility.sidebar,
            FocusPane::Conversation => true,
            FocusPane::Index => self.visibility.index_panel,
        }
    }

    pub fn focus_next(&mut self) {
        self.cycle_focus(1);
    }

    pub fn focus_prev(&mut self) {
        self.cycle_focus(FocusPane::ORDER.len() - 1);
    }

    fn cycle_focus(&mut self, step: usize) {
        let len = FocusPane::ORDER.len();
        let mut i = FocusPane::ORDER
            .iter()
            .position(|p| *p == self.focus)
            .unwrap_or(1);
        for _ in 0..len {
            i = (i + step) % len;
            if self.is_visible(FocusPane::ORDER[i]) {
                break;
            }
        }
        self.set_focus(FocusPane::ORDER[i]);
    }

    pub fn set_focus(&mut self, pane: FocusPane) {
        if pane != self.focus {
            self.input_mode = InputMode::Normal;
        }
        self.focus = pane;
    }

    pub fn toggle_sidebar(&mut self) {
        self.visibility.toggle_sidebar();
        self.refocus_if_hidden();
    }

    pub fn toggle_index_panel(&mut self) {
        self.visibility.toggle_index_panel();
        self.refocus_if_hidden();
    }

    fn refocus_if_hidden(&mut self) {
        if !self.is_visible(self.focus) {
            self.set_focus(FocusPane::Conversation);
        }
    }

    /// The text field that typing goes to in editing mode, if the focused
    /// panel has one and it currently accepts input.
    pub fn editing_buffer(&mut self) -> Option<&mut InputBuffer> {
        match self.focus {
            FocusPane::Sidebar => Some(&mut self.upload.path_input),
            FocusPane::Conversation => self.conversation.input_mut(),
            FocusPane::Index => None,
        }
    }

    pub fn pane_at(&self, column: u16, row: u16) -> Option<FocusPane> {
        let areas = self.areas?;
        let position = Position::new(column, row);
        if areas.sidebar.is_some_and(|a| a.contains(position)) {
            Some(FocusPane::Sidebar)
        } else if areas.index_panel.is_some_and(|a| a.contains(position)) {
            Some(FocusPane::Index)
        } else if areas.conversation.contains(position) {
            Some(FocusPane::Conversation)
        } else {
            None
        }
    }
}
