use ratatui::layout::{Constraint, Layout, Rect};

/// Which optional panels are on screen. Presentation only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelVisibility {
    pub sidebar: bool,
    pub index_panel: bool,
}

impl Default for PanelVisibility {
    fn default() -> Self {
        Self {
            sidebar: true,
            index_panel: true,
        }
    }
}

/// Regions for one frame. Hidden panels get no area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShellAreas {
    pub sidebar: Option<Rect>,
    pub conversation: Rect,
    pub index_panel: Option<Rect>,
}

impl PanelVisibility {
    pub fn toggle_sidebar(&mut self) {
        self.sidebar = !self.sidebar;
    }

    pub fn toggle_index_panel(&mut self) {
        self.index_panel = !self.index_panel;
    }

    /// Width split depends only on how many optional panels are shown:
    /// none gives the conversation everything, one gives it two thirds,
    /// both make three equal columns.
    pub fn split(&self, area: Rect) -> ShellAreas {
        match (self.sidebar, self.index_panel) {
            (false, false) => ShellAreas {
                sidebar: None,
                conversation: area,
                index_panel: None,
            },
            (true, false) => {
                let [sidebar, conversation] =
                    Layout::horizontal([Constraint::Ratio(1, 3), Constraint::Ratio(2, 3)])
                        .areas(area);
                ShellAreas {
                    sidebar: Some(sidebar),
                    conversation,
                    index_panel: None,
                }
            }
            (false, true) => {
                let [conversation, index_panel] =
                    Layout::horizontal([Constraint::Ratio(2, 3), Constraint::Ratio(1, 3)])
                        .areas(area);
                ShellAreas {
                    sidebar: None,
                    conversation,
                    index_panel: Some(index_panel),
                }
            }
            (true, true) => {
                let [sidebar, conversation, index_panel] = Layout::horizontal([
                    Constraint::Ratio(1, 3),
                    Constraint::Ratio(1, 3),
                    Constraint::Ratio(1, 3),
                ])
                .areas(area);
                ShellAreas {
                    sidebar: Some(sidebar),
                    conversation,
                    index_panel: Some(index_panel),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AREA: Rect = Rect {
        x: 0,
        y: 1,
        width: 120,
        height: 40,
    };

    #[test]
    fn test_both_hidden_full_width() {
        let visibility = PanelVisibility {
            sidebar: false,
            index_panel: false,
        };
        let areas = visibility.split(AREA);
        assert_eq!(areas.conversation, AREA);
        assert!(areas.sidebar.is_none());
        assert!(areas.index_panel.is_none());
    }

    #[test]
    fn test_both_visible_three_equal_columns() {
        let areas = PanelVisibility::default().split(AREA);
        let sidebar = areas.sidebar.unwrap();
        let index = areas.index_panel.unwrap();

        for width in [sidebar.width, areas.conversation.width, index.width] {
            assert!(width.abs_diff(AREA.width / 3) <= 1, "width {}", width);
        }
        assert_eq!(sidebar.width + areas.conversation.width + index.width, AREA.width);
        assert!(sidebar.x < areas.conversation.x && areas.conversation.x < index.x);
    }

    #[test]
    fn test_one_visible_conversation_wider() {
        for visibility in [
            PanelVisibility {
                sidebar: true,
                index_panel: false,
            },
            PanelVisibility {
                sidebar: false,
                index_panel: true,
            },
        ] {
            let areas = visibility.split(AREA);
            let side = areas.sidebar.or(areas.index_panel).unwrap();
            assert!(areas.conversation.width > side.width);
            assert_eq!(areas.conversation.width + side.width, AREA.width);
        }
    }

    #[test]
    fn test_toggles_are_independent() {
        let mut visibility = PanelVisibility::default();
        visibility.toggle_sidebar();
        assert_eq!(
            visibility,
            PanelVisibility {
                sidebar: false,
                index_panel: true,
            }
        );
        visibility.toggle_index_panel();
        visibility.toggle_sidebar();
        assert_eq!(
            visibility,
            PanelVisibility {
                sidebar: true,
                index_panel: false,
            }
        );
    }
}
