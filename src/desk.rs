use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;
use tracing::{info, warn};

use crate::alarm::{Alarm, AlarmScheduler};
use crate::commands::{
    Command, CommandArgs, CommandError, CommandTable, CommandTables, Invocation, Outcome,
};
use crate::config::Config;
use crate::note::{LockState, Note, NoteDefaults, NoteError, NoteId, NoteKind};
use crate::palette::{ColorPalette, PaletteError};
use crate::registry::NoteRegistry;

/// Everything a running session owns: the shared palette, id registry,
/// alarm scheduler, the open notes and the command tables.
///
/// Built once at startup and passed by reference to whatever front end is
/// driving it. All methods run on the caller's thread.
#[derive(Debug)]
pub struct Desk {
    palette: Rc<ColorPalette>,
    defaults: NoteDefaults,
    registry: NoteRegistry,
    scheduler: AlarmScheduler,
    notes: Vec<Note>,
    commands: CommandTables,
}

impl Desk {
    pub fn new(
        palette: ColorPalette,
        defaults: NoteDefaults,
        registry: NoteRegistry,
        scheduler: AlarmScheduler,
    ) -> Self {
        let commands = CommandTables::new(palette.len());
        Self {
            palette: Rc::new(palette),
            defaults,
            registry,
            scheduler,
            notes: Vec::new(),
            commands,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, PaletteError> {
        let palette = config.palette.build()?;
        // Fail at startup rather than on the first new note
        palette.lookup(&config.notes.default_text_color)?;
        Ok(Self::new(
            palette,
            config.notes.defaults(),
            NoteRegistry::new(config.notes.placement, config.notes.cascade_step),
            AlarmScheduler::with_system_clock(),
        ))
    }

    pub fn palette(&self) -> &Rc<ColorPalette> {
        &self.palette
    }

    pub fn registry(&self) -> &NoteRegistry {
        &self.registry
    }

    pub fn scheduler(&self) -> &AlarmScheduler {
        &self.scheduler
    }

    /// Open notes in creation order
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn note(&self, id: NoteId) -> Result<&Note, CommandError> {
        self.notes
            .iter()
            .find(|note| note.id() == id)
            .ok_or(CommandError::UnknownNote(id))
    }

    pub fn note_mut(&mut self, id: NoteId) -> Result<&mut Note, CommandError> {
        self.notes
            .iter_mut()
            .find(|note| note.id() == id)
            .ok_or(CommandError::UnknownNote(id))
    }

    pub fn position(&self, id: NoteId) -> Option<usize> {
        self.notes.iter().position(|note| note.id() == id)
    }

    pub fn new_text_note(&mut self) -> Result<NoteId, NoteError> {
        let note = self.registry.create_text_note(&self.palette, &self.defaults)?;
        Ok(self.push(note))
    }

    pub fn new_sketch_note(&mut self) -> Result<NoteId, NoteError> {
        let note = self.registry.create_sketch_note(&self.palette, &self.defaults)?;
        Ok(self.push(note))
    }

    fn push(&mut self, note: Note) -> NoteId {
        let id = note.id();
        self.notes.push(note);
        id
    }

    /// Read a plain-text file into a new text note.
    /// The note is only created once the whole file has been read.
    pub fn import_text(&mut self, path: &Path) -> Result<NoteId, NoteError> {
        let content = fs::read_to_string(path).map_err(|source| {
            warn!(?path, error = %source, "import failed");
            NoteError::ImportIo {
                path: path.to_path_buf(),
                source,
            }
        })?;

        let mut note = self.registry.create_text_note(&self.palette, &self.defaults)?;
        note.set_content(content)?;
        info!(note = %note.id(), ?path, "text imported");
        Ok(self.push(note))
    }

    pub fn export(&self, id: NoteId, path: &Path) -> Result<PathBuf, CommandError> {
        Ok(self.note(id)?.export(path)?)
    }

    /// Discard a note. Its pending alarm, if any, keeps running.
    pub fn close(&mut self, id: NoteId) -> Result<Note, CommandError> {
        let index = self.position(id).ok_or(CommandError::UnknownNote(id))?;
        let note = self.notes.remove(index);
        info!(note = %id, pending_alarm = note.has_pending_alarm(), "note closed");
        Ok(note)
    }

    pub fn toggle_lock(&mut self, id: NoteId) -> Result<LockState, CommandError> {
        Ok(self.note_mut(id)?.toggle_lock())
    }

    pub fn set_title(&mut self, id: NoteId, title: String) -> Result<(), CommandError> {
        self.note_mut(id)?.set_title(title)?;
        Ok(())
    }

    pub fn create_alarm(
        &mut self,
        id: NoteId,
        message: &str,
        minutes: &str,
    ) -> Result<Alarm, CommandError> {
        let note = self
            .notes
            .iter_mut()
            .find(|note| note.id() == id)
            .ok_or(CommandError::UnknownNote(id))?;
        Ok(self.scheduler.create_alarm(note, message, minutes)?)
    }

    /// Deliver expired alarms. Call from the loop that owns the desk.
    pub fn fire_due_alarms(&mut self, notify: impl FnMut(&Alarm)) -> usize {
        let fired = self.scheduler.fire_due(notify);
        if fired > 0 {
            self.scheduler.prune_expired();
        }
        fired
    }

    pub fn time_until_next_alarm(&self) -> Option<Duration> {
        self.scheduler.time_until_next()
    }

    /// The table that applies to `note`, or the desk table when no note is targeted
    pub fn command_table(&self, note: Option<NoteId>) -> Result<&CommandTable, CommandError> {
        let Some(id) = note else {
            return Ok(&self.commands.desk);
        };
        Ok(match self.note(id)?.kind() {
            NoteKind::Text(_) => &self.commands.text,
            NoteKind::Graphic(_) => &self.commands.sketch,
        })
    }

    /// Route a command to its handler in the table for the target note
    pub fn dispatch(
        &mut self,
        note: Option<NoteId>,
        command: Command,
        args: CommandArgs,
    ) -> Result<Outcome, CommandError> {
        let handler = self.command_table(note)?.handler(command)?;
        handler(self, &Invocation { command, note, args })
    }
}
