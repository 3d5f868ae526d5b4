use crossterm::event::{MouseButton, MouseEventKind};
use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use std::collections::VecDeque;
use std::time::Instant;
use tracing::{debug, info};

use crate::canvas::Point;
use crate::commands::{Command, CommandArgs, CommandError, InputKind, Outcome};
use crate::config::{Config, KeyBindings};
use crate::desk::Desk;
use crate::note::{LockState, Note, NoteError, NoteId, NoteKind};
use crate::tui::error::TuiError;
use crate::tui::widgets::editor::Editor;
use crate::tui::widgets::sketch::cell_to_point;
use crate::utils::{format_key_binding_for_display, parse_key_binding, ParsedKeyBinding};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Moving between notes and running commands
    Browse,
    /// Typing into the focused text note
    Edit,
    /// Collecting input for a command
    Prompt,
    Help,
}

/// Key bindings parsed once at startup
#[derive(Debug, Clone)]
pub struct KeyMap {
    pub quit: ParsedKeyBinding,
    pub new_text: ParsedKeyBinding,
    pub new_sketch: ParsedKeyBinding,
    pub import: ParsedKeyBinding,
    pub export: ParsedKeyBinding,
    pub close: ParsedKeyBinding,
    pub edit: ParsedKeyBinding,
    pub title: ParsedKeyBinding,
    pub lock: ParsedKeyBinding,
    pub alarm: ParsedKeyBinding,
    pub font: ParsedKeyBinding,
    pub eraser: ParsedKeyBinding,
    pub copy: ParsedKeyBinding,
    pub paste: ParsedKeyBinding,
    pub next_note: ParsedKeyBinding,
    pub prev_note: ParsedKeyBinding,
    pub help: ParsedKeyBinding,
}

impl KeyMap {
    pub fn from_config(kb: &KeyBindings) -> Result<Self, TuiError> {
        let parse = |s: &str| parse_key_binding(s).map_err(TuiError::KeyBindingError);
        Ok(Self {
            quit: parse(&kb.quit)?,
            new_text: parse(&kb.new_text)?,
            new_sketch: parse(&kb.new_sketch)?,
            import: parse(&kb.import)?,
            export: parse(&kb.export)?,
            close: parse(&kb.close)?,
            edit: parse(&kb.edit)?,
            title: parse(&kb.title)?,
            lock: parse(&kb.lock)?,
            alarm: parse(&kb.alarm)?,
            font: parse(&kb.font)?,
            eraser: parse(&kb.eraser)?,
            copy: parse(&kb.copy)?,
            paste: parse(&kb.paste)?,
            next_note: parse(&kb.next_note)?,
            prev_note: parse(&kb.prev_note)?,
            help: parse(&kb.help)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct PromptField {
    pub label: &'static str,
    pub editor: Editor,
}

impl PromptField {
    fn new(label: &'static str, initial: &str) -> Self {
        let mut editor = Editor::single_line();
        for ch in initial.chars() {
            editor.insert_char(ch);
        }
        Self { label, editor }
    }

    fn value(&self) -> String {
        self.editor.content()
    }
}

/// Dialog collecting the input a command needs
#[derive(Debug, Clone)]
pub struct Prompt {
    pub command: Command,
    pub target: Option<NoteId>,
    pub fields: Vec<PromptField>,
    pub active: usize,
    pub error: Option<String>,
}

impl Prompt {
    pub fn new(
        command: Command,
        kind: InputKind,
        target: Option<NoteId>,
        current_title: &str,
    ) -> Self {
        let fields = match kind {
            InputKind::Title => vec![PromptField::new("Title", current_title)],
            InputKind::Alarm => vec![
                PromptField::new("Message", ""),
                PromptField::new("Minutes (1-60)", ""),
            ],
            InputKind::ImportPath => vec![PromptField::new("File to import", "")],
            InputKind::ExportPath => vec![PromptField::new("Export to", "")],
        };
        Self {
            command,
            target,
            fields,
            active: 0,
            error: None,
        }
    }

    pub fn title(&self) -> String {
        self.command.label().trim_end_matches("...").to_string()
    }

    pub fn next_field(&mut self) {
        self.active = (self.active + 1) % self.fields.len();
    }

    pub fn prev_field(&mut self) {
        self.active = (self.active + self.fields.len() - 1) % self.fields.len();
    }

    pub fn active_editor(&mut self) -> Option<&mut Editor> {
        self.fields.get_mut(self.active).map(|field| &mut field.editor)
    }

    fn field(&self, index: usize) -> String {
        self.fields.get(index).map(PromptField::value).unwrap_or_default()
    }

    /// Arguments for the command built from the current field values
    pub fn args(&self) -> CommandArgs {
        match self.command.input() {
            Some(InputKind::Title) => CommandArgs::Title(self.field(0)),
            Some(InputKind::Alarm) => CommandArgs::Alarm {
                message: self.field(0),
                minutes: self.field(1),
            },
            Some(InputKind::ImportPath | InputKind::ExportPath) => {
                CommandArgs::Path(crate::utils::expand_path(self.field(0).trim()))
            }
            None => CommandArgs::None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StatusState {
    pub message: Option<String>,
    pub message_time: Option<Instant>,
}

/// Terminal front end state around a [`Desk`]
pub struct App {
    pub config: Config,
    pub desk: Desk,
    pub keys: KeyMap,
    pub mode: Mode,
    pub focus: Option<NoteId>,
    pub list_state: ListState,
    pub prompt: Option<Prompt>,
    /// Fired alarm messages waiting to be acknowledged, oldest first
    pub alerts: VecDeque<String>,
    /// Edit buffer while in [`Mode::Edit`]
    pub editor: Option<Editor>,
    /// Where the focused sketch was last drawn, for mapping mouse input
    pub canvas_area: Option<Rect>,
    pub status: StatusState,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: Config, desk: Desk) -> Result<Self, TuiError> {
        let keys = KeyMap::from_config(&config.key_bindings)?;
        let focus = desk.notes().first().map(Note::id);
        let mut app = Self {
            config,
            desk,
            keys,
            mode: Mode::Browse,
            focus,
            list_state: ListState::default(),
            prompt: None,
            alerts: VecDeque::new(),
            editor: None,
            canvas_area: None,
            status: StatusState::default(),
            should_quit: false,
        };
        app.sync_list_state();
        Ok(app)
    }

    pub fn focused_note(&self) -> Option<&Note> {
        self.focus.and_then(|id| self.desk.note(id).ok())
    }

    pub fn sync_list_state(&mut self) {
        self.list_state
            .select(self.focus.and_then(|id| self.desk.position(id)));
    }

    fn focus_at(&mut self, index: usize) {
        self.end_stroke();
        self.focus = self.desk.notes().get(index).map(Note::id);
        self.canvas_area = None;
        self.sync_list_state();
    }

    pub fn focus_next(&mut self) {
        let count = self.desk.notes().len();
        if count == 0 {
            return;
        }
        let next = match self.focus.and_then(|id| self.desk.position(id)) {
            Some(index) => (index + 1) % count,
            None => 0,
        };
        self.focus_at(next);
    }

    pub fn focus_prev(&mut self) {
        let count = self.desk.notes().len();
        if count == 0 {
            return;
        }
        let prev = match self.focus.and_then(|id| self.desk.position(id)) {
            Some(index) => (index + count - 1) % count,
            None => count - 1,
        };
        self.focus_at(prev);
    }

    pub fn set_status_message(&mut self, message: impl Into<String>) {
        self.status.message = Some(message.into());
        self.status.message_time = Some(Instant::now());
    }

    pub fn clear_status_message(&mut self) {
        self.status.message = None;
        self.status.message_time = None;
    }

    /// Check if status message should be auto-cleared (after 3 seconds)
    pub fn check_status_message_timeout(&mut self) {
        const STATUS_MESSAGE_TIMEOUT_SECS: u64 = 3;
        if let Some(time) = self.status.message_time {
            if time.elapsed().as_secs() >= STATUS_MESSAGE_TIMEOUT_SECS {
                self.clear_status_message();
            }
        }
    }

    /// Deliver due alarms as modal alerts
    pub fn pump_alarms(&mut self) {
        let alerts = &mut self.alerts;
        let before = alerts.len();
        self.desk
            .fire_due_alarms(|alarm| alerts.push_back(alarm.message().to_string()));
        if self.alerts.len() > before {
            self.end_stroke();
        }
    }

    pub fn dismiss_alert(&mut self) {
        self.alerts.pop_front();
    }

    /// Run a command against the focused note, opening a prompt first when
    /// it needs input
    pub fn run(&mut self, command: Command) {
        let available = self
            .desk
            .command_table(self.focus)
            .is_ok_and(|table| table.contains(command));

        if let (true, Some(kind)) = (available, command.input()) {
            if command == Command::SetTitle {
                if let Some(note) = self.focused_note().filter(|note| note.is_locked()) {
                    let err = NoteError::Locked(note.id());
                    self.set_status_message(err.to_string());
                    return;
                }
            }
            let current_title = self
                .focused_note()
                .map(|note| note.title().to_string())
                .unwrap_or_default();
            self.end_stroke();
            self.prompt = Some(Prompt::new(command, kind, self.focus, &current_title));
            self.mode = Mode::Prompt;
            return;
        }

        if let Err(err) = self.dispatch(self.focus, command, CommandArgs::None) {
            self.set_status_message(err.to_string());
        }
    }

    fn dispatch(
        &mut self,
        target: Option<NoteId>,
        command: Command,
        args: CommandArgs,
    ) -> Result<(), CommandError> {
        debug!(?command, ?target, "dispatching");
        let outcome = self.desk.dispatch(target, command, args)?;
        self.apply(outcome);
        Ok(())
    }

    fn apply(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Done => {}
            Outcome::Created(id) => {
                self.end_stroke();
                self.focus = Some(id);
                self.canvas_area = None;
                self.sync_list_state();
            }
            Outcome::Closed(id) => {
                let index = self.list_state.selected().unwrap_or(0);
                let last = self.desk.notes().len().saturating_sub(1);
                self.focus_at(index.min(last));
                self.set_status_message(format!("Closed note {}", id));
            }
            Outcome::Lock(LockState::Locked) => self.set_status_message("Note locked"),
            Outcome::Lock(LockState::Unlocked) => self.set_status_message("Note unlocked"),
            Outcome::AlarmSet(alarm) => {
                self.set_status_message(format!(
                    "Alarm set for {} minute(s)",
                    alarm.duration_ms() / 60_000
                ));
            }
            Outcome::Exported(path) => {
                self.set_status_message(format!("Exported to {}", path.display()));
            }
            Outcome::Font(font) => self.set_status_message(format!("Font: {}", font.label())),
            Outcome::Copied(chars) => {
                self.set_status_message(format!("Copied {} characters", chars));
            }
            Outcome::Exit => {
                info!("exit requested");
                self.should_quit = true;
            }
        }
    }

    /// Submit the open prompt. An invalid alarm duration keeps the dialog
    /// open with the validation message.
    pub fn submit_prompt(&mut self) {
        let Some(prompt) = self.prompt.take() else {
            self.mode = Mode::Browse;
            return;
        };

        match self.dispatch(prompt.target, prompt.command, prompt.args()) {
            Ok(()) => self.mode = Mode::Browse,
            Err(CommandError::Alarm(err)) => {
                self.prompt = Some(Prompt {
                    error: Some(err.to_string()),
                    ..prompt
                });
            }
            Err(err) => {
                self.mode = Mode::Browse;
                self.set_status_message(err.to_string());
            }
        }
    }

    pub fn cancel_prompt(&mut self) {
        self.prompt = None;
        self.mode = Mode::Browse;
    }

    /// Start editing the focused text note. Locked notes stay read-only.
    pub fn enter_edit_mode(&mut self) {
        let Some(note) = self.focused_note() else {
            return;
        };
        let Some(text) = note.as_text() else {
            self.set_status_message("Sketch notes are drawn with the mouse");
            return;
        };
        if note.is_locked() {
            let err = NoteError::Locked(note.id());
            self.set_status_message(err.to_string());
            return;
        }
        self.editor = Some(Editor::from_string(text.content()));
        self.mode = Mode::Edit;
    }

    /// Commit the edit buffer back to the note
    pub fn exit_edit_mode(&mut self) {
        self.mode = Mode::Browse;
        let (Some(editor), Some(id)) = (self.editor.take(), self.focus) else {
            return;
        };
        let result = self
            .desk
            .note_mut(id)
            .and_then(|note| note.set_content(editor.content()).map_err(CommandError::from));
        if let Err(err) = result {
            self.set_status_message(err.to_string());
        }
    }

    pub fn toggle_help(&mut self) {
        self.mode = match self.mode {
            Mode::Help => Mode::Browse,
            _ => {
                self.end_stroke();
                Mode::Help
            }
        };
    }

    /// Finish any stroke on the focused sketch. Used wherever the button
    /// release would otherwise never reach the canvas.
    pub fn end_stroke(&mut self) {
        let Some(id) = self.focus else {
            return;
        };
        if let Ok(note) = self.desk.note_mut(id) {
            if note.pointer_up(Point::default()) {
                debug!(note = %id, "stroke ended");
            }
        }
    }

    /// Feed a mouse event to the focused sketch. Strokes only start inside
    /// the canvas but may continue outside it.
    pub fn handle_pointer(&mut self, kind: MouseEventKind, column: u16, row: u16) {
        let (Some(id), Some(area)) = (self.focus, self.canvas_area) else {
            return;
        };
        let Ok(note) = self.desk.note_mut(id) else {
            return;
        };
        if !matches!(note.kind(), NoteKind::Graphic(_)) {
            return;
        }

        let point = cell_to_point(area, column, row);
        match kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if area.contains((column, row).into()) {
                    note.pointer_down(point);
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                note.pointer_move(point);
            }
            MouseEventKind::Up(MouseButton::Left) => {
                note.pointer_up(point);
            }
            _ => {}
        }
    }

    pub fn key_hints(&self) -> Vec<String> {
        let kb = &self.config.key_bindings;
        let hint =
            |key: &str, what: &str| format!("{}: {}", format_key_binding_for_display(key), what);
        match self.mode {
            Mode::Edit => vec!["Esc: Finish editing".to_string()],
            Mode::Prompt => vec![
                "Enter: OK".to_string(),
                "Tab: Next field".to_string(),
                "Esc: Cancel".to_string(),
            ],
            Mode::Help => vec![hint(&kb.help, "Close help")],
            Mode::Browse => {
                let mut hints = vec![hint(&kb.new_text, "New"), hint(&kb.new_sketch, "Sketch")];
                match self.focused_note().map(Note::kind) {
                    Some(NoteKind::Text(_)) => {
                        hints.push(hint(&kb.edit, "Edit"));
                        hints.push(hint(&kb.font, "Font"));
                        hints.push("1-9: Color".to_string());
                    }
                    Some(NoteKind::Graphic(_)) => {
                        hints.push("Drag: Draw".to_string());
                        hints.push("1-9: Pen".to_string());
                        hints.push(hint(&kb.eraser, "Eraser"));
                    }
                    None => {}
                }
                hints.push(hint(&kb.lock, "Lock"));
                hints.push(hint(&kb.alarm, "Alarm"));
                hints.push(hint(&kb.help, "Help"));
                hints.push(hint(&kb.quit, "Quit"));
                hints
            }
        }
    }
}
