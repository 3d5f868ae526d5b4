use chrono::{DateTime, Local};
use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;
use tracing::info;

use crate::alarm::{Alarm, ALARM_MARKER};
use crate::canvas::{CanvasError, CaptureState, DrawingCanvas, PenHandle, Point, Raster};
use crate::palette::{ColorEntry, ColorPalette, PaletteError, Rgb};
use crate::registry::Placement;

/// Prefixed to the displayed title of a locked note
pub const LOCK_MARKER: &str = "(locked) ";
pub const DEFAULT_TITLE: &str = "New Note";

#[derive(Debug, Error)]
pub enum NoteError {
    #[error("Note {0} is locked")]
    Locked(NoteId),
    #[error("Note {id} is not a {expected} note")]
    WrongKind { id: NoteId, expected: &'static str },
    #[error("Failed to import {path:?}: {source}")]
    ImportIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to export to {path:?}: {source}")]
    ExportIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to encode {path:?}: {source}")]
    ExportEncode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("Palette error: {0}")]
    Palette(#[from] PaletteError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NoteId(u64);

impl NoteId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for NoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockState {
    #[default]
    Unlocked,
    Locked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontChoice {
    #[default]
    Helvetica,
    MarkerFelt,
    Typewriter,
}

impl FontChoice {
    pub const ALL: [FontChoice; 3] = [
        FontChoice::Helvetica,
        FontChoice::MarkerFelt,
        FontChoice::Typewriter,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FontChoice::Helvetica => "Helvetica",
            FontChoice::MarkerFelt => "Marker Felt",
            FontChoice::Typewriter => "Typewriter",
        }
    }

    pub fn next(self) -> Self {
        match self {
            FontChoice::Helvetica => FontChoice::MarkerFelt,
            FontChoice::MarkerFelt => FontChoice::Typewriter,
            FontChoice::Typewriter => FontChoice::Helvetica,
        }
    }
}

/// Starting look of newly created notes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDefaults {
    pub text_color: String,
    pub text_background: Rgb,
    pub sketch_background: Rgb,
    pub canvas_width: u32,
    pub canvas_height: u32,
}

impl Default for NoteDefaults {
    fn default() -> Self {
        Self {
            text_color: "Black".to_string(),
            text_background: Rgb::STICKY,
            sketch_background: Rgb::WHITE,
            canvas_width: 160,
            canvas_height: 96,
        }
    }
}

#[derive(Debug)]
pub struct TextNote {
    content: String,
    text_color: ColorEntry,
    font: FontChoice,
    background: Rgb,
    palette: Rc<ColorPalette>,
}

impl TextNote {
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn text_color(&self) -> &ColorEntry {
        &self.text_color
    }

    pub fn font(&self) -> FontChoice {
        self.font
    }

    pub fn background(&self) -> Rgb {
        self.background
    }

    pub fn palette(&self) -> &Rc<ColorPalette> {
        &self.palette
    }
}

#[derive(Debug)]
pub struct GraphicNote {
    canvas: DrawingCanvas,
    pen: PenHandle,
    pen_entry: ColorEntry,
    palette: Rc<ColorPalette>,
}

impl GraphicNote {
    pub fn raster(&self) -> &Raster {
        self.canvas.surface()
    }

    pub fn capture_state(&self) -> CaptureState {
        self.canvas.state()
    }

    pub fn accepts_input(&self) -> bool {
        self.canvas.is_attached()
    }

    pub fn segments_drawn(&self) -> u64 {
        self.canvas.segments_drawn()
    }

    /// The current pen menu selection (possibly the eraser)
    pub fn pen(&self) -> &ColorEntry {
        &self.pen_entry
    }

    pub fn background(&self) -> Rgb {
        use crate::canvas::Surface;
        self.canvas.surface().background()
    }

    pub fn palette(&self) -> &Rc<ColorPalette> {
        &self.palette
    }

    fn select_pen(&mut self, entry: ColorEntry) {
        self.pen.set(entry.value);
        self.pen_entry = entry;
    }
}

#[derive(Debug)]
pub enum NoteKind {
    Text(TextNote),
    Graphic(GraphicNote),
}

impl NoteKind {
    pub fn label(&self) -> &'static str {
        match self {
            NoteKind::Text(_) => "text",
            NoteKind::Graphic(_) => "sketch",
        }
    }
}

/// A single sticky note.
///
/// The title the user typed and the lock state are stored separately;
/// `display_title()` derives the window title from both plus the alarm
/// state, so lock/unlock never edits the title string itself.
#[derive(Debug)]
pub struct Note {
    id: NoteId,
    created_at: DateTime<Local>,
    placement: Placement,
    title: String,
    lock_state: LockState,
    alarm: Option<Alarm>,
    kind: NoteKind,
}

impl Note {
    pub(crate) fn new_text(
        id: NoteId,
        placement: Placement,
        palette: &Rc<ColorPalette>,
        defaults: &NoteDefaults,
    ) -> Result<Self, PaletteError> {
        let text_color = palette.lookup(&defaults.text_color)?.clone();
        Ok(Self::with_kind(
            id,
            placement,
            NoteKind::Text(TextNote {
                content: String::new(),
                text_color,
                font: FontChoice::default(),
                background: defaults.text_background,
                palette: Rc::clone(palette),
            }),
        ))
    }

    pub(crate) fn new_sketch(
        id: NoteId,
        placement: Placement,
        palette: &Rc<ColorPalette>,
        defaults: &NoteDefaults,
    ) -> Result<Self, PaletteError> {
        let pen_entry = palette.at(0)?.clone();
        let pen: PenHandle = Rc::new(Cell::new(pen_entry.value));
        let raster = Raster::new(
            defaults.canvas_width,
            defaults.canvas_height,
            defaults.sketch_background,
        );
        Ok(Self::with_kind(
            id,
            placement,
            NoteKind::Graphic(GraphicNote {
                canvas: DrawingCanvas::new(raster, &pen),
                pen,
                pen_entry,
                palette: Rc::clone(palette),
            }),
        ))
    }

    fn with_kind(id: NoteId, placement: Placement, kind: NoteKind) -> Self {
        info!(note = %id, kind = kind.label(), ?placement, "note created");
        Self {
            id,
            created_at: Local::now(),
            placement,
            title: DEFAULT_TITLE.to_string(),
            lock_state: LockState::Unlocked,
            alarm: None,
            kind,
        }
    }

    pub fn id(&self) -> NoteId {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Local> {
        self.created_at
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    /// The title as the user set it
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The title with its lock and alarm markers applied
    pub fn display_title(&self) -> String {
        let capacity = self.title.len() + LOCK_MARKER.len() + ALARM_MARKER.len();
        let mut shown = String::with_capacity(capacity);
        if self.is_locked() {
            shown.push_str(LOCK_MARKER);
        }
        shown.push_str(&self.title);
        if self.has_pending_alarm() {
            shown.push_str(ALARM_MARKER);
        }
        shown
    }

    pub fn lock_state(&self) -> LockState {
        self.lock_state
    }

    pub fn is_locked(&self) -> bool {
        self.lock_state == LockState::Locked
    }

    pub fn alarm(&self) -> Option<&Alarm> {
        self.alarm.as_ref()
    }

    /// Whether the note's most recent alarm has yet to fire. Only that alarm
    /// is tracked: an earlier one it replaced may still be counting down and
    /// does not count here, and the marker drops once the tracked one fires.
    pub fn has_pending_alarm(&self) -> bool {
        self.alarm.as_ref().is_some_and(|alarm| !alarm.is_expired())
    }

    pub(crate) fn attach_alarm(&mut self, alarm: Alarm) {
        self.alarm = Some(alarm);
    }

    pub fn kind(&self) -> &NoteKind {
        &self.kind
    }

    pub fn as_text(&self) -> Option<&TextNote> {
        match &self.kind {
            NoteKind::Text(text) => Some(text),
            NoteKind::Graphic(_) => None,
        }
    }

    pub fn as_graphic(&self) -> Option<&GraphicNote> {
        match &self.kind {
            NoteKind::Graphic(graphic) => Some(graphic),
            NoteKind::Text(_) => None,
        }
    }

    fn text_mut(&mut self) -> Result<&mut TextNote, NoteError> {
        let id = self.id;
        match &mut self.kind {
            NoteKind::Text(text) => Ok(text),
            NoteKind::Graphic(_) => Err(NoteError::WrongKind { id, expected: "text" }),
        }
    }

    fn graphic_mut(&mut self) -> Result<&mut GraphicNote, NoteError> {
        let id = self.id;
        match &mut self.kind {
            NoteKind::Graphic(graphic) => Ok(graphic),
            NoteKind::Text(_) => Err(NoteError::WrongKind { id, expected: "sketch" }),
        }
    }

    fn ensure_unlocked(&self) -> Result<(), NoteError> {
        if self.is_locked() {
            return Err(NoteError::Locked(self.id));
        }
        Ok(())
    }

    /// Flip between Unlocked and Locked, detaching or reattaching the note's
    /// input surface. Returns the new state.
    pub fn toggle_lock(&mut self) -> LockState {
        self.lock_state = match self.lock_state {
            LockState::Unlocked => {
                if let NoteKind::Graphic(graphic) = &mut self.kind {
                    graphic.canvas.detach();
                }
                LockState::Locked
            }
            LockState::Locked => {
                if let NoteKind::Graphic(graphic) = &mut self.kind {
                    graphic.canvas.attach();
                }
                LockState::Unlocked
            }
        };
        info!(note = %self.id, state = ?self.lock_state, "lock toggled");
        self.lock_state
    }

    /// Rejected while locked
    pub fn set_title(&mut self, title: impl Into<String>) -> Result<(), NoteError> {
        self.ensure_unlocked()?;
        self.title = title.into();
        Ok(())
    }

    pub fn set_content(&mut self, content: impl Into<String>) -> Result<(), NoteError> {
        self.ensure_unlocked()?;
        self.text_mut()?.content = content.into();
        Ok(())
    }

    pub fn append_content(&mut self, more: &str) -> Result<(), NoteError> {
        self.ensure_unlocked()?;
        self.text_mut()?.content.push_str(more);
        Ok(())
    }

    pub fn set_text_color(&mut self, name: &str) -> Result<(), NoteError> {
        let text = self.text_mut()?;
        text.text_color = text.palette.lookup(name)?.clone();
        Ok(())
    }

    pub fn set_text_color_at(&mut self, index: usize) -> Result<(), NoteError> {
        let text = self.text_mut()?;
        text.text_color = text.palette.at(index)?.clone();
        Ok(())
    }

    pub fn set_font(&mut self, font: FontChoice) -> Result<(), NoteError> {
        self.text_mut()?.font = font;
        Ok(())
    }

    pub fn cycle_font(&mut self) -> Result<FontChoice, NoteError> {
        let text = self.text_mut()?;
        text.font = text.font.next();
        Ok(text.font)
    }

    /// Select a pen color by name. Only affects segments drawn afterwards.
    pub fn set_pen_color(&mut self, name: &str) -> Result<(), NoteError> {
        let graphic = self.graphic_mut()?;
        let entry = graphic.palette.lookup(name)?.clone();
        graphic.select_pen(entry);
        Ok(())
    }

    pub fn set_pen_color_at(&mut self, index: usize) -> Result<(), NoteError> {
        let graphic = self.graphic_mut()?;
        let entry = graphic.palette.at(index)?.clone();
        graphic.select_pen(entry);
        Ok(())
    }

    pub fn select_eraser(&mut self) -> Result<(), NoteError> {
        let graphic = self.graphic_mut()?;
        let entry = graphic.palette.eraser(graphic.background());
        graphic.select_pen(entry);
        Ok(())
    }

    // Pointer input goes through the canvas, which ignores it while detached

    pub fn pointer_down(&mut self, p: Point) -> bool {
        match &mut self.kind {
            NoteKind::Graphic(graphic) => graphic.canvas.on_pointer_down(p),
            NoteKind::Text(_) => false,
        }
    }

    pub fn pointer_move(&mut self, p: Point) -> bool {
        match &mut self.kind {
            NoteKind::Graphic(graphic) => graphic.canvas.on_pointer_move(p),
            NoteKind::Text(_) => false,
        }
    }

    pub fn pointer_up(&mut self, p: Point) -> bool {
        match &mut self.kind {
            NoteKind::Graphic(graphic) => graphic.canvas.on_pointer_up(p),
            NoteKind::Text(_) => false,
        }
    }

    /// Write the note out: plain text for text notes, a PNG snapshot for
    /// sketches (`.png` is appended when `path` has no extension).
    /// Returns the path actually written. Never touches note state.
    pub fn export(&self, path: &Path) -> Result<PathBuf, NoteError> {
        match &self.kind {
            NoteKind::Text(text) => {
                fs::write(path, &text.content).map_err(|source| NoteError::ExportIo {
                    path: path.to_path_buf(),
                    source,
                })?;
                info!(note = %self.id, ?path, "text exported");
                Ok(path.to_path_buf())
            }
            NoteKind::Graphic(graphic) => {
                let target = if path.extension().is_none() {
                    path.with_extension("png")
                } else {
                    path.to_path_buf()
                };
                graphic
                    .canvas
                    .snapshot()
                    .save_png(&target)
                    .map_err(|e| match e {
                        CanvasError::Io(source)
                        | CanvasError::Encode(image::ImageError::IoError(source)) => {
                            NoteError::ExportIo { path: target.clone(), source }
                        }
                        CanvasError::Encode(source) => NoteError::ExportEncode {
                            path: target.clone(),
                            source,
                        },
                    })?;
                info!(note = %self.id, path = ?target, "sketch exported");
                Ok(target)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::NoteRegistry;

    fn palette() -> Rc<ColorPalette> {
        Rc::new(ColorPalette::default())
    }

    fn text_note() -> Note {
        NoteRegistry::default()
            .create_text_note(&palette(), &NoteDefaults::default())
            .unwrap()
    }

    fn sketch_note() -> Note {
        NoteRegistry::default()
            .create_sketch_note(&palette(), &NoteDefaults::default())
            .unwrap()
    }

    #[test]
    fn new_note_starts_unlocked_with_default_title() {
        let note = text_note();
        assert_eq!(note.lock_state(), LockState::Unlocked);
        assert_eq!(note.title(), DEFAULT_TITLE);
        assert_eq!(note.display_title(), DEFAULT_TITLE);
        assert!(note.alarm().is_none());
    }

    #[test]
    fn lock_round_trip_recovers_title_even_with_marker_text() {
        for title in ["Groceries", "", "(locked) already", "(locked) "] {
            let mut note = text_note();
            note.set_title(title).unwrap();

            note.toggle_lock();
            assert_eq!(note.display_title(), format!("{}{}", LOCK_MARKER, title));
            note.toggle_lock();

            assert_eq!(note.title(), title);
            assert_eq!(note.display_title(), title);
            assert_eq!(note.lock_state(), LockState::Unlocked);
        }
    }

    #[test]
    fn locked_note_rejects_content_and_title_edits() {
        let mut note = text_note();
        note.set_content("draft").unwrap();
        note.toggle_lock();

        assert!(matches!(note.set_content("changed"), Err(NoteError::Locked(_))));
        assert!(matches!(note.append_content("!"), Err(NoteError::Locked(_))));
        assert!(matches!(note.set_title("new"), Err(NoteError::Locked(_))));
        assert_eq!(note.as_text().unwrap().content(), "draft");
        assert_eq!(note.title(), DEFAULT_TITLE);

        note.toggle_lock();
        note.set_content("changed").unwrap();
        assert_eq!(note.as_text().unwrap().content(), "changed");
    }

    #[test]
    fn locked_sketch_ignores_pointer_input() {
        let mut note = sketch_note();
        note.toggle_lock();

        assert!(!note.pointer_down(Point::new(1, 1)));
        assert!(!note.pointer_move(Point::new(5, 5)));
        assert!(!note.pointer_up(Point::new(5, 5)));

        let graphic = note.as_graphic().unwrap();
        assert_eq!(graphic.capture_state(), CaptureState::Idle);
        assert_eq!(graphic.segments_drawn(), 0);
        assert_eq!(graphic.raster().pixel(3, 3), Some(Rgb::WHITE));
    }

    #[test]
    fn locking_mid_stroke_keeps_rendered_segments() {
        let mut note = sketch_note();
        note.pointer_down(Point::new(0, 0));
        note.pointer_move(Point::new(4, 0));
        note.toggle_lock();

        let graphic = note.as_graphic().unwrap();
        assert_eq!(graphic.capture_state(), CaptureState::Idle);
        assert_eq!(graphic.raster().pixel(2, 0), Some(Rgb::BLACK));

        note.toggle_lock();
        assert!(!note.pointer_move(Point::new(8, 0)));
        assert_eq!(note.as_graphic().unwrap().raster().pixel(6, 0), Some(Rgb::WHITE));
    }

    #[test]
    fn eraser_paints_background() {
        let mut note = sketch_note();
        note.pointer_down(Point::new(0, 0));
        note.pointer_move(Point::new(3, 0));
        note.pointer_up(Point::new(3, 0));

        note.select_eraser().unwrap();
        assert!(note.as_graphic().unwrap().pen().is_eraser());
        note.pointer_down(Point::new(0, 0));
        note.pointer_move(Point::new(3, 0));
        note.pointer_up(Point::new(3, 0));

        assert_eq!(note.as_graphic().unwrap().raster().pixel(1, 0), Some(Rgb::WHITE));
    }

    #[test]
    fn color_lookup_miss_is_reported() {
        let mut note = text_note();
        let err = note.set_text_color("Chartreuse").unwrap_err();
        assert!(matches!(err, NoteError::Palette(PaletteError::ColorNotFound(_))));
        assert_eq!(note.as_text().unwrap().text_color().name, "Black");

        note.set_text_color("Red").unwrap();
        assert_eq!(note.as_text().unwrap().text_color().value, Rgb::RED);
    }

    #[test]
    fn variant_specific_operations_check_kind() {
        let mut text = text_note();
        let mut sketch = sketch_note();
        assert!(matches!(text.select_eraser(), Err(NoteError::WrongKind { .. })));
        assert!(matches!(sketch.set_content("x"), Err(NoteError::WrongKind { .. })));
        assert!(!text.pointer_down(Point::new(0, 0)));
        assert_eq!(text.cycle_font().unwrap(), FontChoice::MarkerFelt);
    }

    #[test]
    fn notes_share_one_palette() {
        let palette = palette();
        let mut registry = NoteRegistry::default();
        let a = registry.create_text_note(&palette, &NoteDefaults::default()).unwrap();
        let b = registry.create_sketch_note(&palette, &NoteDefaults::default()).unwrap();

        let pa = a.as_text().unwrap().palette();
        let pb = b.as_graphic().unwrap().palette();
        assert!(Rc::ptr_eq(pa, pb));
        assert_eq!(pa.lookup("Cyan").unwrap(), pb.lookup("Cyan").unwrap());
    }
}
