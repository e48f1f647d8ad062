use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::app::{App, FocusPane, InputMode};
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Paste(text) => handle_paste(app, &text),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick_animation(),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        // Tab to cycle focus between visible panels
        KeyCode::Tab => app.focus_next(),
        KeyCode::BackTab => app.focus_prev(),

        // Panel toggles
        KeyCode::Char('b') => app.toggle_sidebar(),
        KeyCode::Char('f') => app.toggle_index_panel(),

        _ => match app.focus {
            FocusPane::Sidebar => handle_sidebar_normal(app, key),
            FocusPane::Conversation => handle_conversation_normal(app, key),
            FocusPane::Index => handle_index_normal(app, key),
        },
    }
}

fn handle_sidebar_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('i') | KeyCode::Enter => app.input_mode = InputMode::Editing,
        KeyCode::Char('u') => {
            app.upload.upload(&app.client);
        }
        KeyCode::Char('x') => app.upload.select_files(Vec::new()),
        _ => {}
    }
}

fn handle_conversation_normal(app: &mut App, key: KeyEvent) {
    let conversation = &mut app.conversation;
    match key.code {
        KeyCode::Char('i') | KeyCode::Enter => app.input_mode = InputMode::Editing,
        KeyCode::Char('j') | KeyCode::Down => conversation.scroll_down(1),
        KeyCode::Char('k') | KeyCode::Up => conversation.scroll_up(1),

        // Half-page scroll
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            conversation.scroll_down(conversation.half_page());
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            conversation.scroll_up(conversation.half_page());
        }
        KeyCode::PageDown => conversation.scroll_down(conversation.half_page()),
        KeyCode::PageUp => conversation.scroll_up(conversation.half_page()),

        KeyCode::Char('g') => conversation.scroll_up(u16::MAX),
        KeyCode::Char('G') => conversation.scroll_to_bottom(),
        _ => {}
    }
}

fn handle_index_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('e') | KeyCode::Enter => {
            app.index.trigger_embedding(&app.client);
        }
        KeyCode::Char('j') | KeyCode::Down => app.index.nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.index.nav_up(),
        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            return;
        }
        KeyCode::Tab => {
            app.focus_next();
            return;
        }
        KeyCode::Enter if !key.modifiers.contains(KeyModifiers::SHIFT) => {
            match app.focus {
                FocusPane::Conversation => {
                    app.conversation.submit(&app.client);
                }
                FocusPane::Sidebar => {
                    app.upload.select_from_input();
                    app.input_mode = InputMode::Normal;
                }
                FocusPane::Index => app.input_mode = InputMode::Normal,
            }
            return;
        }
        _ => {}
    }

    let Some(input) = app.editing_buffer() else {
        return;
    };
    match key.code {
        KeyCode::Enter => input.insert('\n'), // Shift+Enter
        KeyCode::Backspace => input.backspace(),
        KeyCode::Delete => input.delete(),
        KeyCode::Left => input.move_left(),
        KeyCode::Right => input.move_right(),
        KeyCode::Home => input.move_home(),
        KeyCode::End => input.move_end(),
        KeyCode::Char(c) => input.insert(c),
        _ => {}
    }
}

fn handle_paste(app: &mut App, text: &str) {
    if app.input_mode != InputMode::Editing {
        return;
    }
    if let Some(input) = app.editing_buffer() {
        input.insert_str(&text.replace("\r\n", "\n"));
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let Some(pane) = app.pane_at(mouse.column, mouse.row) else {
        return;
    };

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => app.set_focus(pane),
        MouseEventKind::ScrollDown => match pane {
            FocusPane::Conversation => app.conversation.scroll_down(3),
            FocusPane::Index => app.index.nav_down(),
            FocusPane::Sidebar => {}
        },
        MouseEventKind::ScrollUp => match pane {
            FocusPane::Conversation => app.conversation.scroll_up(3),
            FocusPane::Index => app.index.nav_up(),
            FocusPane::Sidebar => {}
        },
        _ => {}
    }
}
