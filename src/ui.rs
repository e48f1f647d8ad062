use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};
use crate::app::{App, FocusPane, InputMode};
use crate::conversation::{ChatRole, ConversationPanel};
use crate::health::Readiness;
use crate::index::EMPTY_INDEX_PLACEHOLDER;
use crate::input::InputBuffer;
use crate::markdown::render_markdown;
use crate::panel::{Notice, NoticeKind};

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    let areas = app.visibility.split(body_area);
    app.areas = Some(areas);

    if let Some(sidebar_area) = areas.sidebar {
        render_sidebar(app, frame, sidebar_area);
    }
    render_conversation(app, frame, areas.conversation);
    if let Some(index_area) = areas.index_panel {
        render_index_panel(app, frame, index_area);
    }

    render_footer(app, frame, footer_area);
}

fn border_color(app: &App, pane: FocusPane) -> Color {
    if app.focus == pane {
        Color::Cyan
    } else {
        Color::DarkGray
    }
}

/// Moving block across a track, for requests with no measurable progress.
fn indeterminate_bar(width: u16, frame: u16) -> Line<'static> {
    let width = width as usize;
    if width == 0 {
        return Line::default();
    }
    let segment = (width / 4).max(1);
    let travel = width - segment;
    let pos = if travel == 0 {
        0
    } else {
        let cycle = travel * 2;
        let step = frame as usize % cycle;
        if step > travel { cycle - step } else { step }
    };

    Line::from(vec![
        Span::styled("━".repeat(pos), Style::default().fg(Color::DarkGray)),
        Span::styled("━".repeat(segment), Style::default().fg(Color::Cyan)),
        Span::styled(
            "━".repeat(width - pos - segment),
            Style::default().fg(Color::DarkGray),
        ),
    ])
}

fn notice_line(notice: &Notice) -> Line<'static> {
    let color = match notice.kind {
        NoticeKind::Info => Color::Green,
        NoticeKind::Error => Color::Red,
    };
    Line::from(Span::styled(notice.text.clone(), Style::default().fg(color)))
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" docchat ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(app.client.base_url().to_string(), Style::default().fg(Color::Gray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::Black));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };

    let mode_text = match app.focus {
        FocusPane::Sidebar => " UPLOAD ",
        FocusPane::Conversation => " CHAT ",
        FocusPane::Index => " INDEX ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);
    let hint = |k: &'static str, label: &'static str| {
        [Span::styled(k, key_style), Span::styled(label, label_style)]
    };

    let mut hints: Vec<Span> = Vec::new();
    match (app.input_mode, app.focus) {
        (InputMode::Editing, FocusPane::Conversation) => {
            hints.extend(hint(" Enter ", " send "));
            hints.extend(hint(" S-Enter ", " newline "));
            hints.extend(hint(" Esc ", " stop typing "));
        }
        (InputMode::Editing, _) => {
            hints.extend(hint(" Enter ", " select files "));
            hints.extend(hint(" Esc ", " cancel "));
        }
        (InputMode::Normal, focus) => {
            match focus {
                FocusPane::Sidebar => {
                    hints.extend(hint(" i ", " paths "));
                    hints.extend(hint(" u ", " upload "));
                    hints.extend(hint(" x ", " clear "));
                }
                FocusPane::Conversation => {
                    hints.extend(hint(" i ", " type "));
                    hints.extend(hint(" j/k ", " scroll "));
                }
                FocusPane::Index => {
                    hints.extend(hint(" e ", " embed "));
                    hints.extend(hint(" j/k ", " nav "));
                }
            }
            hints.extend(hint(" Tab ", " focus "));
            hints.extend(hint(" b ", " sidebar "));
            hints.extend(hint(" f ", " files "));
            hints.extend(hint(" q ", " quit "));
        }
    }

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

fn render_sidebar(app: &mut App, frame: &mut Frame, area: Rect) {
    let [upload_area, health_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(6),
    ])
    .areas(area);

    render_upload(app, frame, upload_area);
    render_health(app, frame, health_area);
}

fn render_upload(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color(app, FocusPane::Sidebar)))
        .title(" Upload Documents ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [input_area, list_area, status_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(2),
    ])
    .areas(inner);

    let editing = app.focus == FocusPane::Sidebar && app.input_mode == InputMode::Editing;
    render_input(
        frame,
        input_area,
        &app.upload.path_input,
        " Paths (comma separated) ",
        editing,
    );

    let selection = app.upload.selection();
    let items: Vec<ListItem> = if selection.is_empty() {
        vec![ListItem::new(Span::styled(
            "No files selected.",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        selection
            .iter()
            .map(|path| ListItem::new(format!(" {}", path.display())))
            .collect()
    };
    frame.render_widget(List::new(items), list_area);

    let status = if app.upload.is_busy() {
        vec![
            Line::from(Span::styled("Uploading...", Style::default().fg(Color::Yellow))),
            indeterminate_bar(status_area.width, app.animation_frame),
        ]
    } else {
        let button_style = if selection.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        };
        let mut lines = vec![Line::from(Span::styled(
            format!(" Upload ({}) [u] ", selection.len()),
            button_style,
        ))];
        if let Some(notice) = app.upload.notice() {
            lines.push(notice_line(notice));
        }
        lines
    };
    frame.render_widget(Paragraph::new(status), status_area);
}

fn render_health(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Backend ");

    let readiness = app.health.readiness();
    let color = match readiness {
        Readiness::Ready => Color::Green,
        Readiness::NotReady => Color::Red,
    };

    let mut lines = vec![Line::from(vec![
        Span::raw("Backend: "),
        Span::styled(
            readiness.label(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
    ])];
    for info in app.health.info_lines() {
        lines.push(Line::from(Span::styled(info, Style::default().fg(Color::Gray))));
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_input(frame: &mut Frame, area: Rect, input: &InputBuffer, title: &str, editing: bool) {
    let border_color = if editing { Color::Yellow } else { Color::DarkGray };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title.to_string());

    // Inner width = total width - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;

    // Single-line view: newlines show as a return glyph
    let display: Vec<char> = input
        .text()
        .chars()
        .map(|c| if c == '\n' { '⏎' } else { c })
        .collect();
    let cursor_pos = input.cursor();

    // Calculate scroll offset to keep cursor visible
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = display
        .iter()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let paragraph = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(block);
    frame.render_widget(paragraph, area);

    if editing {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

/// Everything the transcript pane shows: user entries verbatim, assistant
/// entries through the markdown renderer, and the pending reply indicator.
fn transcript_text(conversation: &ConversationPanel, animation_frame: u16) -> Text<'static> {
    if conversation.transcript().is_empty() && !conversation.is_busy() {
        return Text::from(Span::styled(
            "Ask a question about your documents...",
            Style::default().fg(Color::DarkGray),
        ));
    }

    let mut lines: Vec<Line<'static>> = Vec::new();

    for msg in conversation.transcript() {
        match msg.role {
            ChatRole::User => {
                lines.push(Line::from(Span::styled(
                    "You:",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )));
                for line in msg.content.lines() {
                    lines.push(Line::from(line.to_string()));
                }
                lines.push(Line::default());
            }
            ChatRole::Assistant => {
                lines.push(Line::from(Span::styled(
                    "Bot:",
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                )));
                lines.extend(render_markdown(&msg.content));
                lines.push(Line::default());
            }
        }
    }

    if conversation.is_busy() {
        lines.push(Line::from(Span::styled(
            "Bot:",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((animation_frame % 3) as usize + 1);
        lines.push(Line::from(Span::styled(
            format!("Thinking{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    Text::from(lines)
}

fn render_conversation(app: &mut App, frame: &mut Frame, area: Rect) {
    let [chat_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(area);

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color(app, FocusPane::Conversation)))
        .title(" RAG Chat ");

    let chat = Paragraph::new(transcript_text(&app.conversation, app.animation_frame))
        .wrap(Wrap { trim: false });

    // Scroll bounds come from the wrapped text as drawn (inner size minus borders)
    let rendered = chat.line_count(chat_area.width.saturating_sub(2));
    app.conversation.view_height = chat_area.height.saturating_sub(2);
    app.conversation
        .set_rendered_lines(u16::try_from(rendered).unwrap_or(u16::MAX));

    let conversation = &app.conversation;
    let chat = chat.block(chat_block).scroll((conversation.scroll, 0));
    frame.render_widget(chat, chat_area);

    let editing = app.focus == FocusPane::Conversation && app.input_mode == InputMode::Editing;
    let title = if conversation.is_busy() {
        " Waiting for reply... "
    } else {
        " Type your message... "
    };
    render_input(frame, input_area, conversation.input(), title, editing && !conversation.is_busy());
}

fn render_index_panel(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color(app, FocusPane::Index)))
        .title(" Embedded Files ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [button_area, status_area, list_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .areas(inner);

    let busy = app.index.is_busy();
    let button = if busy {
        Span::styled(" Embedding... ", Style::default().fg(Color::DarkGray))
    } else {
        Span::styled(
            " Embed New Documents [e] ",
            Style::default().fg(Color::Black).bg(Color::Magenta),
        )
    };
    frame.render_widget(Paragraph::new(Line::from(button)), button_area);

    let status = if busy {
        indeterminate_bar(status_area.width, app.animation_frame)
    } else if let Some(notice) = app.index.notice() {
        notice_line(notice)
    } else {
        Line::default()
    };
    frame.render_widget(Paragraph::new(status), status_area);

    // Stale list stays visible while a refresh is pending
    let files = app.index.files();
    if files.is_empty() {
        let placeholder = Paragraph::new(Span::styled(
            EMPTY_INDEX_PLACEHOLDER,
            Style::default().fg(Color::DarkGray),
        ));
        frame.render_widget(placeholder, list_area);
        return;
    }

    let items: Vec<ListItem> = files
        .iter()
        .map(|file| ListItem::new(format!(" {}", file)))
        .collect();
    let list = List::new(items)
        .highlight_style(
            Style::default()
                .bg(Color::Magenta)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, list_area, &mut app.index.list_state);
}
