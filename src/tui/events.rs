use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, size as terminal_size, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;
use std::io;
use std::time::Duration;
use tracing::debug;

use crate::commands::Command;
use crate::note::NoteKind;
use crate::tui::app::{App, Mode};
use crate::tui::error::TuiError;
use crate::tui::layout::Layout;
use crate::tui::widgets::editor::Editor;

const POLL_INTERVAL: Duration = Duration::from_millis(16);

/// Guard that ensures terminal state is restored even on panic.
/// Leaving raw mode, mouse capture or the alternate screen on would
/// make the user's terminal unusable.
struct TerminalGuard {
    raw_mode_enabled: bool,
    alternate_screen_enabled: bool,
}

impl TerminalGuard {
    fn new() -> Result<Self, TuiError> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture)?;
        Ok(Self {
            raw_mode_enabled: true,
            alternate_screen_enabled: true,
        })
    }

    /// Restore on normal exit; the guard does nothing on drop afterwards
    fn restore(&mut self) -> Result<(), TuiError> {
        if self.raw_mode_enabled {
            disable_raw_mode()?;
            self.raw_mode_enabled = false;
        }
        if self.alternate_screen_enabled {
            execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen)?;
            self.alternate_screen_enabled = false;
        }
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        // Already cleaning up, errors have nowhere to go
        if self.raw_mode_enabled {
            let _ = disable_raw_mode();
        }
        if self.alternate_screen_enabled {
            let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
        }
    }
}

/// Run the UI until the user exits.
///
/// Everything happens on this thread: due alarms are delivered first on
/// every tick, then the screen is drawn, then at most one input event is
/// handled.
pub fn run_event_loop(mut app: App) -> Result<(), TuiError> {
    let (width, height) = terminal_size()?;
    let min_width = Layout::MIN_WIDTH + 2;
    let min_height = Layout::MIN_HEIGHT + 2;
    if width < min_width || height < min_height {
        return Err(TuiError::RenderError(format!(
            "Terminal size too small. Current: {}x{}, Minimum required: {}x{}. Please resize your terminal window.",
            width, height, min_width, min_height
        )));
    }

    let mut guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    loop {
        app.pump_alarms();
        app.check_status_message_timeout();

        let size = terminal.size()?;
        let layout = Layout::calculate(Rect::new(0, 0, size.width, size.height));
        terminal.draw(|f| crate::tui::render::render(f, &mut app, &layout))?;

        if event::poll(POLL_INTERVAL)? {
            match event::read()? {
                // Only Press events; Windows also reports releases
                Event::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                    if handle_key_event(&mut app, key_event)? {
                        break;
                    }
                }
                Event::Mouse(mouse_event) => handle_mouse_event(&mut app, mouse_event),
                // Layout is recalculated every frame
                _ => {}
            }
        }
    }

    guard.restore()?;
    Ok(())
}

/// Handle one key press. Returns true when the app should quit.
pub fn handle_key_event(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    // A fired alarm blocks all other input until acknowledged
    if !app.alerts.is_empty() {
        if matches!(key_event.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
            app.dismiss_alert();
        }
        return Ok(false);
    }

    match app.mode {
        Mode::Edit => handle_edit_key(app, key_event),
        Mode::Prompt => handle_prompt_key(app, key_event),
        Mode::Help => {
            if key_event.code == KeyCode::Esc
                || app.keys.help.matches(key_event.code, key_event.modifiers)
            {
                app.toggle_help();
            }
        }
        Mode::Browse => handle_browse_key(app, key_event),
    }

    Ok(app.should_quit)
}

enum BrowseAction {
    Run(Command),
    Edit,
    NextNote,
    PrevNote,
    Help,
}

fn browse_action(app: &App, key_event: KeyEvent) -> Option<BrowseAction> {
    let keys = &app.keys;
    let (code, mods) = (key_event.code, key_event.modifiers);
    let hit = |binding: &crate::utils::ParsedKeyBinding| binding.matches(code, mods);

    let action = if hit(&keys.quit) {
        BrowseAction::Run(Command::Exit)
    } else if hit(&keys.help) {
        BrowseAction::Help
    } else if hit(&keys.next_note) {
        BrowseAction::NextNote
    } else if hit(&keys.prev_note) {
        BrowseAction::PrevNote
    } else if hit(&keys.new_text) {
        BrowseAction::Run(Command::NewTextNote)
    } else if hit(&keys.new_sketch) {
        BrowseAction::Run(Command::NewSketchNote)
    } else if hit(&keys.import) {
        BrowseAction::Run(Command::Import)
    } else if hit(&keys.export) {
        BrowseAction::Run(Command::Export)
    } else if hit(&keys.close) {
        BrowseAction::Run(Command::CloseNote)
    } else if hit(&keys.edit) {
        BrowseAction::Edit
    } else if hit(&keys.title) {
        BrowseAction::Run(Command::SetTitle)
    } else if hit(&keys.lock) {
        BrowseAction::Run(Command::ToggleLock)
    } else if hit(&keys.alarm) {
        BrowseAction::Run(Command::AttachAlarm)
    } else if hit(&keys.font) {
        BrowseAction::Run(Command::CycleFont)
    } else if hit(&keys.eraser) {
        BrowseAction::Run(Command::Eraser)
    } else if hit(&keys.copy) {
        BrowseAction::Run(Command::CopyText)
    } else if hit(&keys.paste) {
        BrowseAction::Run(Command::PasteText)
    } else if let KeyCode::Char(digit @ '1'..='9') = code {
        // Number keys pick a palette color for whichever variant is focused
        let index = digit as usize - '1' as usize;
        match app.focused_note()?.kind() {
            NoteKind::Text(_) => BrowseAction::Run(Command::TextColor(index)),
            NoteKind::Graphic(_) => BrowseAction::Run(Command::PenColor(index)),
        }
    } else {
        return None;
    };
    Some(action)
}

fn handle_browse_key(app: &mut App, key_event: KeyEvent) {
    match browse_action(app, key_event) {
        Some(BrowseAction::Run(command)) => app.run(command),
        Some(BrowseAction::Edit) => app.enter_edit_mode(),
        Some(BrowseAction::NextNote) => app.focus_next(),
        Some(BrowseAction::PrevNote) => app.focus_prev(),
        Some(BrowseAction::Help) => app.toggle_help(),
        None => {}
    }
}

/// Keys shared by the note editor and prompt fields. Returns false when
/// the key wasn't an editing key.
fn apply_editing_key(editor: &mut Editor, key_event: KeyEvent) -> bool {
    match key_event.code {
        KeyCode::Backspace => editor.delete_char(),
        KeyCode::Left => editor.move_cursor_left(),
        KeyCode::Right => editor.move_cursor_right(),
        KeyCode::Home => editor.move_cursor_home(),
        KeyCode::End => editor.move_cursor_end(),
        KeyCode::Char(ch) if !key_event.modifiers.contains(KeyModifiers::CONTROL) => {
            editor.insert_char(ch)
        }
        _ => return false,
    }
    true
}

fn handle_edit_key(app: &mut App, key_event: KeyEvent) {
    if key_event.code == KeyCode::Esc {
        app.exit_edit_mode();
        return;
    }
    let Some(editor) = app.editor.as_mut() else {
        app.mode = Mode::Browse;
        return;
    };
    match key_event.code {
        KeyCode::Enter => editor.insert_newline(),
        KeyCode::Tab => editor.insert_char('\t'),
        KeyCode::Up => editor.move_cursor_up(),
        KeyCode::Down => editor.move_cursor_down(),
        _ => {
            apply_editing_key(editor, key_event);
        }
    }
}

fn handle_prompt_key(app: &mut App, key_event: KeyEvent) {
    match key_event.code {
        KeyCode::Esc => app.cancel_prompt(),
        KeyCode::Enter => app.submit_prompt(),
        _ => {
            let Some(prompt) = app.prompt.as_mut() else {
                app.mode = Mode::Browse;
                return;
            };
            match key_event.code {
                KeyCode::Tab | KeyCode::Down => prompt.next_field(),
                KeyCode::BackTab | KeyCode::Up => prompt.prev_field(),
                _ => {
                    if let Some(editor) = prompt.active_editor() {
                        if apply_editing_key(editor, key_event) {
                            prompt.error = None;
                        }
                    }
                }
            }
        }
    }
}

fn handle_mouse_event(app: &mut App, mouse_event: MouseEvent) {
    if app.mode != Mode::Browse || !app.alerts.is_empty() {
        // A release still ends the stroke it belongs to
        if let MouseEventKind::Up(MouseButton::Left) = mouse_event.kind {
            app.end_stroke();
        }
        return;
    }
    debug!(kind = ?mouse_event.kind, col = mouse_event.column, row = mouse_event.row, "mouse");
    app.handle_pointer(mouse_event.kind, mouse_event.column, mouse_event.row);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarm::{AlarmScheduler, ManualClock};
    use crate::config::Config;
    use crate::desk::Desk;
    use crate::note::NoteDefaults;
    use crate::palette::{ColorPalette, Rgb};
    use crate::registry::{NoteRegistry, PlacementPolicy};
    use crossterm::event::KeyEventState;
    use crate::canvas::CaptureState;

    fn app() -> App {
        let desk = Desk::new(
            ColorPalette::default(),
            NoteDefaults::default(),
            NoteRegistry::new(PlacementPolicy::Cascade, 23),
            AlarmScheduler::new(Box::new(ManualClock::new())),
        );
        App::new(Config::default(), desk).unwrap()
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        let key = KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        };
        handle_key_event(app, key).unwrap()
    }

    fn mouse(app: &mut App, kind: MouseEventKind, column: u16, row: u16) {
        handle_mouse_event(
            app,
            MouseEvent { kind, column, row, modifiers: KeyModifiers::NONE },
        );
    }

    #[test]
    fn quit_key_exits() {
        let mut app = app();
        assert!(press(&mut app, KeyCode::Char('q')));
    }

    #[test]
    fn typing_goes_to_the_note_only_in_edit_mode() {
        let mut app = app();
        press(&mut app, KeyCode::Char('n'));
        press(&mut app, KeyCode::Char('e'));
        assert_eq!(app.mode, Mode::Edit);
        // 'q' is text here, not quit
        assert!(!press(&mut app, KeyCode::Char('q')));
        press(&mut app, KeyCode::Esc);

        let text = app.focused_note().and_then(|n| n.as_text()).unwrap();
        assert_eq!(text.content(), "q");
    }

    #[test]
    fn number_keys_pick_color_for_focused_variant() {
        let mut app = app();
        press(&mut app, KeyCode::Char('n'));
        press(&mut app, KeyCode::Char('2'));
        let text = app.focused_note().and_then(|n| n.as_text()).unwrap();
        assert_eq!(text.text_color().name, "Red");

        press(&mut app, KeyCode::Char('k'));
        press(&mut app, KeyCode::Char('4'));
        let graphic = app.focused_note().and_then(|n| n.as_graphic()).unwrap();
        assert_eq!(graphic.pen().name, "Blue");
    }

    #[test]
    fn mouse_drag_draws_on_focused_sketch() {
        let mut app = app();
        press(&mut app, KeyCode::Char('k'));
        press(&mut app, KeyCode::Char('2'));
        app.canvas_area = Some(Rect::new(10, 5, 40, 20));

        mouse(&mut app, MouseEventKind::Down(MouseButton::Left), 10, 5);
        mouse(&mut app, MouseEventKind::Drag(MouseButton::Left), 14, 5);
        mouse(&mut app, MouseEventKind::Up(MouseButton::Left), 14, 5);

        let graphic = app.focused_note().and_then(|n| n.as_graphic()).unwrap();
        assert_eq!(graphic.segments_drawn(), 1);
        assert_eq!(graphic.raster().pixel(2, 0), Some(Rgb::RED));
    }

    #[test]
    fn release_under_alert_still_ends_stroke() {
        let mut app = app();
        press(&mut app, KeyCode::Char('k'));
        app.canvas_area = Some(Rect::new(0, 0, 40, 20));

        mouse(&mut app, MouseEventKind::Down(MouseButton::Left), 0, 0);
        mouse(&mut app, MouseEventKind::Drag(MouseButton::Left), 2, 0);
        app.alerts.push_back("tea".to_string());
        mouse(&mut app, MouseEventKind::Up(MouseButton::Left), 2, 0);
        press(&mut app, KeyCode::Enter);

        let graphic = app.focused_note().and_then(|n| n.as_graphic()).unwrap();
        assert_eq!(graphic.capture_state(), CaptureState::Idle);

        // A fresh press starts a new stroke rather than continuing the old one
        mouse(&mut app, MouseEventKind::Down(MouseButton::Left), 30, 10);
        mouse(&mut app, MouseEventKind::Drag(MouseButton::Left), 31, 10);
        let graphic = app.focused_note().and_then(|n| n.as_graphic()).unwrap();
        assert_eq!(graphic.segments_drawn(), 2);
        // Nothing joins the end of the first stroke to the second
        assert_eq!(graphic.raster().pixel(16, 10), Some(graphic.background()));
    }

    #[test]
    fn opening_help_mid_stroke_ends_it() {
        let mut app = app();
        press(&mut app, KeyCode::Char('k'));
        app.canvas_area = Some(Rect::new(0, 0, 40, 20));

        mouse(&mut app, MouseEventKind::Down(MouseButton::Left), 0, 0);
        mouse(&mut app, MouseEventKind::Drag(MouseButton::Left), 3, 0);
        press(&mut app, KeyCode::F(1));
        assert_eq!(app.mode, Mode::Help);

        let graphic = app.focused_note().and_then(|n| n.as_graphic()).unwrap();
        assert_eq!(graphic.capture_state(), CaptureState::Idle);
    }

    #[test]
    fn alert_swallows_keys_until_dismissed() {
        let mut app = app();
        app.alerts.push_back("stand up".to_string());
        assert!(!press(&mut app, KeyCode::Char('q')));
        assert_eq!(app.alerts.len(), 1);
        press(&mut app, KeyCode::Enter);
        assert!(app.alerts.is_empty());
        assert!(press(&mut app, KeyCode::Char('q')));
    }
}
