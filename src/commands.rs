//! Command table: every menu action a note offers, as data.
//!
//! Each note variant gets one table, built once per desk, mapping a
//! [`Command`] to a plain handler function. Front ends route everything
//! through [`Desk::dispatch`](crate::desk::Desk::dispatch), so the whole
//! command surface can be exercised without a terminal.

use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

use crate::alarm::{Alarm, AlarmError};
use crate::desk::Desk;
use crate::note::{FontChoice, LockState, NoteError, NoteId};
use crate::palette::PaletteError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    NewTextNote,
    NewSketchNote,
    Import,
    Export,
    CloseNote,
    Exit,
    SetTitle,
    ToggleLock,
    AttachAlarm,
    /// Palette position, zero-based
    TextColor(usize),
    PenColor(usize),
    Eraser,
    CycleFont,
    CopyText,
    PasteText,
}

/// What a command needs collected from the user before it can run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Title,
    Alarm,
    ImportPath,
    ExportPath,
}

impl Command {
    pub fn label(&self) -> String {
        match self {
            Command::NewTextNote => "New Text Note".to_string(),
            Command::NewSketchNote => "New Sketch Note".to_string(),
            Command::Import => "Import...".to_string(),
            Command::Export => "Export...".to_string(),
            Command::CloseNote => "Close note".to_string(),
            Command::Exit => "Exit".to_string(),
            Command::SetTitle => "Set Title".to_string(),
            Command::ToggleLock => "Lock/Unlock note".to_string(),
            Command::AttachAlarm => "Attach new alarm...".to_string(),
            Command::TextColor(i) => format!("Text Color {}", i + 1),
            Command::PenColor(i) => format!("Pen Color {}", i + 1),
            Command::Eraser => "Eraser".to_string(),
            Command::CycleFont => "Font".to_string(),
            Command::CopyText => "Copy".to_string(),
            Command::PasteText => "Paste".to_string(),
        }
    }

    pub fn input(&self) -> Option<InputKind> {
        match self {
            Command::SetTitle => Some(InputKind::Title),
            Command::AttachAlarm => Some(InputKind::Alarm),
            Command::Import => Some(InputKind::ImportPath),
            Command::Export => Some(InputKind::ExportPath),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CommandArgs {
    #[default]
    None,
    Title(String),
    Alarm { message: String, minutes: String },
    Path(PathBuf),
}

#[derive(Debug)]
pub enum Outcome {
    Done,
    Created(NoteId),
    Closed(NoteId),
    Lock(LockState),
    AlarmSet(Alarm),
    Exported(PathBuf),
    Font(FontChoice),
    Copied(usize),
    Exit,
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("'{label}' is not available for {target}", label = .command.label())]
    Unsupported { command: Command, target: &'static str },
    #[error("'{label}' needs input", label = .0.label())]
    MissingInput(Command),
    #[error("No note with id {0}")]
    UnknownNote(NoteId),
    #[error("{0}")]
    Note(#[from] NoteError),
    #[error("{0}")]
    Alarm(#[from] AlarmError),
    #[error("{0}")]
    Palette(#[from] PaletteError),
    #[error("Clipboard error: {0}")]
    Clipboard(String),
}

/// A single dispatched command with its target and collected input
#[derive(Debug, Clone)]
pub struct Invocation {
    pub command: Command,
    pub note: Option<NoteId>,
    pub args: CommandArgs,
}

impl Invocation {
    fn note(&self) -> Result<NoteId, CommandError> {
        self.note.ok_or(CommandError::Unsupported {
            command: self.command,
            target: "the desk",
        })
    }
}

pub type Handler = fn(&mut Desk, &Invocation) -> Result<Outcome, CommandError>;

#[derive(Debug, Clone)]
pub struct CommandTable {
    target: &'static str,
    // Insertion order doubles as menu order
    order: Vec<Command>,
    handlers: HashMap<Command, Handler>,
}

impl CommandTable {
    fn new(target: &'static str) -> Self {
        Self {
            target,
            order: Vec::new(),
            handlers: HashMap::new(),
        }
    }

    fn register(&mut self, command: Command, handler: Handler) {
        if self.handlers.insert(command, handler).is_none() {
            self.order.push(command);
        }
    }

    pub fn target(&self) -> &'static str {
        self.target
    }

    pub fn handler(&self, command: Command) -> Result<Handler, CommandError> {
        self.handlers
            .get(&command)
            .copied()
            .ok_or(CommandError::Unsupported {
                command,
                target: self.target,
            })
    }

    pub fn contains(&self, command: Command) -> bool {
        self.handlers.contains_key(&command)
    }

    pub fn commands(&self) -> &[Command] {
        &self.order
    }

    /// Commands available with no note open
    pub fn desk() -> Self {
        let mut table = Self::new("the desk");
        table.register_file_menu(true, false);
        table
    }

    pub fn text_note(palette_len: usize) -> Self {
        let mut table = Self::new("text notes");
        table.register_file_menu(true, true);
        table.register_note_menu();
        table.register(Command::CopyText, copy_text);
        table.register(Command::PasteText, paste_text);
        table.register(Command::CycleFont, cycle_font);
        for i in 0..palette_len {
            table.register(Command::TextColor(i), text_color);
        }
        table
    }

    pub fn sketch_note(palette_len: usize) -> Self {
        let mut table = Self::new("sketch notes");
        // Sketches cannot be imported
        table.register_file_menu(false, true);
        table.register_note_menu();
        for i in 0..palette_len {
            table.register(Command::PenColor(i), pen_color);
        }
        table.register(Command::Eraser, eraser);
        table
    }

    fn register_file_menu(&mut self, with_import: bool, with_note: bool) {
        self.register(Command::NewTextNote, new_text_note);
        self.register(Command::NewSketchNote, new_sketch_note);
        if with_import {
            self.register(Command::Import, import);
        }
        if with_note {
            self.register(Command::Export, export);
            self.register(Command::CloseNote, close_note);
        }
        self.register(Command::Exit, exit);
    }

    fn register_note_menu(&mut self) {
        self.register(Command::SetTitle, set_title);
        self.register(Command::ToggleLock, toggle_lock);
        self.register(Command::AttachAlarm, attach_alarm);
    }
}

/// The three tables a desk routes through
#[derive(Debug, Clone)]
pub struct CommandTables {
    pub desk: CommandTable,
    pub text: CommandTable,
    pub sketch: CommandTable,
}

impl CommandTables {
    pub fn new(palette_len: usize) -> Self {
        Self {
            desk: CommandTable::desk(),
            text: CommandTable::text_note(palette_len),
            sketch: CommandTable::sketch_note(palette_len),
        }
    }
}

fn new_text_note(desk: &mut Desk, _: &Invocation) -> Result<Outcome, CommandError> {
    Ok(Outcome::Created(desk.new_text_note()?))
}

fn new_sketch_note(desk: &mut Desk, _: &Invocation) -> Result<Outcome, CommandError> {
    Ok(Outcome::Created(desk.new_sketch_note()?))
}

fn import(desk: &mut Desk, inv: &Invocation) -> Result<Outcome, CommandError> {
    let CommandArgs::Path(path) = &inv.args else {
        return Err(CommandError::MissingInput(inv.command));
    };
    Ok(Outcome::Created(desk.import_text(path)?))
}

fn export(desk: &mut Desk, inv: &Invocation) -> Result<Outcome, CommandError> {
    let CommandArgs::Path(path) = &inv.args else {
        return Err(CommandError::MissingInput(inv.command));
    };
    Ok(Outcome::Exported(desk.export(inv.note()?, path)?))
}

fn close_note(desk: &mut Desk, inv: &Invocation) -> Result<Outcome, CommandError> {
    let id = inv.note()?;
    desk.close(id)?;
    Ok(Outcome::Closed(id))
}

fn exit(_: &mut Desk, _: &Invocation) -> Result<Outcome, CommandError> {
    Ok(Outcome::Exit)
}

fn set_title(desk: &mut Desk, inv: &Invocation) -> Result<Outcome, CommandError> {
    let CommandArgs::Title(title) = &inv.args else {
        return Err(CommandError::MissingInput(inv.command));
    };
    desk.set_title(inv.note()?, title.clone())?;
    Ok(Outcome::Done)
}

fn toggle_lock(desk: &mut Desk, inv: &Invocation) -> Result<Outcome, CommandError> {
    Ok(Outcome::Lock(desk.toggle_lock(inv.note()?)?))
}

fn attach_alarm(desk: &mut Desk, inv: &Invocation) -> Result<Outcome, CommandError> {
    let CommandArgs::Alarm { message, minutes } = &inv.args else {
        return Err(CommandError::MissingInput(inv.command));
    };
    Ok(Outcome::AlarmSet(desk.create_alarm(inv.note()?, message, minutes)?))
}

fn text_color(desk: &mut Desk, inv: &Invocation) -> Result<Outcome, CommandError> {
    let Command::TextColor(index) = inv.command else {
        return Err(CommandError::MissingInput(inv.command));
    };
    desk.note_mut(inv.note()?)?.set_text_color_at(index)?;
    Ok(Outcome::Done)
}

fn pen_color(desk: &mut Desk, inv: &Invocation) -> Result<Outcome, CommandError> {
    let Command::PenColor(index) = inv.command else {
        return Err(CommandError::MissingInput(inv.command));
    };
    desk.note_mut(inv.note()?)?.set_pen_color_at(index)?;
    Ok(Outcome::Done)
}

fn eraser(desk: &mut Desk, inv: &Invocation) -> Result<Outcome, CommandError> {
    desk.note_mut(inv.note()?)?.select_eraser()?;
    Ok(Outcome::Done)
}

fn cycle_font(desk: &mut Desk, inv: &Invocation) -> Result<Outcome, CommandError> {
    Ok(Outcome::Font(desk.note_mut(inv.note()?)?.cycle_font()?))
}

fn copy_text(desk: &mut Desk, inv: &Invocation) -> Result<Outcome, CommandError> {
    let note = desk.note(inv.note()?)?;
    let content = note
        .as_text()
        .map(|text| text.content().to_string())
        .unwrap_or_default();
    let mut clipboard =
        arboard::Clipboard::new().map_err(|e| CommandError::Clipboard(e.to_string()))?;
    clipboard
        .set_text(content.clone())
        .map_err(|e| CommandError::Clipboard(e.to_string()))?;
    Ok(Outcome::Copied(content.chars().count()))
}

fn paste_text(desk: &mut Desk, inv: &Invocation) -> Result<Outcome, CommandError> {
    let id = inv.note()?;
    // Check the lock before touching the clipboard
    if desk.note(id)?.is_locked() {
        return Err(NoteError::Locked(id).into());
    }
    let mut clipboard =
        arboard::Clipboard::new().map_err(|e| CommandError::Clipboard(e.to_string()))?;
    let text = clipboard
        .get_text()
        .map_err(|e| CommandError::Clipboard(e.to_string()))?;
    desk.note_mut(id)?.append_content(&text)?;
    Ok(Outcome::Done)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eraser_only_on_sketch_table() {
        let tables = CommandTables::new(7);
        assert!(tables.sketch.contains(Command::Eraser));
        assert!(!tables.text.contains(Command::Eraser));
        assert!(!tables.desk.contains(Command::Eraser));
    }

    #[test]
    fn color_entries_follow_palette_size() {
        let tables = CommandTables::new(3);
        assert!(tables.text.contains(Command::TextColor(2)));
        assert!(!tables.text.contains(Command::TextColor(3)));
        assert!(tables.sketch.contains(Command::PenColor(0)));
        assert!(!tables.sketch.contains(Command::TextColor(0)));
    }

    #[test]
    fn import_is_text_only() {
        let tables = CommandTables::new(7);
        assert!(tables.text.contains(Command::Import));
        assert!(tables.desk.contains(Command::Import));
        assert!(!tables.sketch.contains(Command::Import));
    }

    #[test]
    fn missing_handler_is_unsupported() {
        let tables = CommandTables::new(7);
        let err = tables.desk.handler(Command::ToggleLock).unwrap_err();
        assert!(matches!(
            err,
            CommandError::Unsupported { command: Command::ToggleLock, target: "the desk" }
        ));
    }

    #[test]
    fn menu_order_is_registration_order() {
        let table = CommandTable::desk();
        assert_eq!(
            table.commands(),
            &[Command::NewTextNote, Command::NewSketchNote, Command::Import, Command::Exit]
        );
    }
}
