use serde::{Deserialize, Serialize};
use std::rc::Rc;
use tracing::debug;

use crate::note::{Note, NoteDefaults, NoteId};
use crate::palette::{ColorPalette, PaletteError};

/// Offset between successive cascaded notes
pub const CASCADE_STEP: i32 = 23;

/// How new notes get their initial position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlacementPolicy {
    /// Let the windowing layer choose
    Platform,
    /// Place at the registry's cascade cursor
    Cascade,
}

impl Default for PlacementPolicy {
    // Automatic placement is unreliable on macOS, so cascade there
    fn default() -> Self {
        if cfg!(target_os = "macos") {
            PlacementPolicy::Cascade
        } else {
            PlacementPolicy::Platform
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Platform,
    At { x: i32, y: i32 },
}

/// Hands out note ids and initial placements.
///
/// Ids start at 0, only ever increase, and are never reused even after the
/// note is closed.
#[derive(Debug, Clone)]
pub struct NoteRegistry {
    next_id: u64,
    last_x: i32,
    last_y: i32,
    step: i32,
    policy: PlacementPolicy,
}

impl Default for NoteRegistry {
    fn default() -> Self {
        Self::new(PlacementPolicy::default(), CASCADE_STEP)
    }
}

impl NoteRegistry {
    pub fn new(policy: PlacementPolicy, step: i32) -> Self {
        Self {
            next_id: 0,
            last_x: 0,
            last_y: 0,
            step,
            policy,
        }
    }

    pub fn policy(&self) -> PlacementPolicy {
        self.policy
    }

    /// Where the next cascaded note would go
    pub fn cursor(&self) -> (i32, i32) {
        (self.last_x, self.last_y)
    }

    /// Reserve an id and a placement for a note about to be created.
    /// The cursor advances on every registration whatever the policy.
    pub fn register(&mut self) -> (NoteId, Placement) {
        let id = NoteId::new(self.next_id);
        self.next_id += 1;

        let placement = match self.policy {
            PlacementPolicy::Platform => Placement::Platform,
            PlacementPolicy::Cascade => Placement::At {
                x: self.last_x,
                y: self.last_y,
            },
        };
        self.last_x += self.step;
        self.last_y += self.step;
        debug!(note = %id, ?placement, "note registered");
        (id, placement)
    }

    pub fn create_text_note(
        &mut self,
        palette: &Rc<ColorPalette>,
        defaults: &NoteDefaults,
    ) -> Result<Note, PaletteError> {
        // Validate before consuming an id
        palette.lookup(&defaults.text_color)?;
        let (id, placement) = self.register();
        Note::new_text(id, placement, palette, defaults)
    }

    pub fn create_sketch_note(
        &mut self,
        palette: &Rc<ColorPalette>,
        defaults: &NoteDefaults,
    ) -> Result<Note, PaletteError> {
        palette.at(0)?;
        let (id, placement) = self.register();
        Note::new_sketch(id, placement, palette, defaults)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_increase_monotonically() {
        let mut registry = NoteRegistry::new(PlacementPolicy::Platform, CASCADE_STEP);
        let ids: Vec<u64> = (0..4).map(|_| registry.register().0.get()).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }

    #[test]
    fn cascade_steps_by_23() {
        let mut registry = NoteRegistry::new(PlacementPolicy::Cascade, CASCADE_STEP);
        assert_eq!(registry.register().1, Placement::At { x: 0, y: 0 });
        assert_eq!(registry.register().1, Placement::At { x: 23, y: 23 });
        assert_eq!(registry.register().1, Placement::At { x: 46, y: 46 });
        assert_eq!(registry.cursor(), (69, 69));
    }

    #[test]
    fn platform_policy_still_moves_cursor() {
        let mut registry = NoteRegistry::new(PlacementPolicy::Platform, CASCADE_STEP);
        assert_eq!(registry.register().1, Placement::Platform);
        assert_eq!(registry.cursor(), (23, 23));
    }

    #[test]
    fn failed_creation_does_not_consume_an_id() {
        let palette = Rc::new(ColorPalette::default());
        let mut registry = NoteRegistry::default();
        let bad = NoteDefaults {
            text_color: "Ultraviolet".to_string(),
            ..NoteDefaults::default()
        };
        assert!(registry.create_text_note(&palette, &bad).is_err());
        let note = registry.create_text_note(&palette, &NoteDefaults::default()).unwrap();
        assert_eq!(note.id().get(), 0);
    }
}
