use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Name of the synthetic entry that paints with the canvas background
pub const ERASER_NAME: &str = "Eraser";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaletteError {
    #[error("Palette has {colors} colors but {names} names")]
    LengthMismatch { colors: usize, names: usize },
    #[error("Color not found: {0}")]
    ColorNotFound(String),
    #[error("Invalid color value: {0}")]
    InvalidColor(String),
}

/// A plain 24-bit color, independent of any rendering backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const RED: Rgb = Rgb::new(255, 0, 0);
    pub const GREEN: Rgb = Rgb::new(0, 255, 0);
    pub const BLUE: Rgb = Rgb::new(0, 0, 255);
    pub const CYAN: Rgb = Rgb::new(0, 255, 255);
    pub const MAGENTA: Rgb = Rgb::new(255, 0, 255);
    pub const YELLOW: Rgb = Rgb::new(255, 255, 0);
    /// Classic sticky note yellow
    pub const STICKY: Rgb = Rgb::new(252, 250, 118);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = PaletteError;

    /// Parse `#RRGGBB` or the short `#RGB` form
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PaletteError::InvalidColor(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !hex.is_ascii() {
            return Err(invalid());
        }

        match hex.len() {
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).map_err(|_| invalid())?;
                let g = u8::from_str_radix(&hex[2..4], 16).map_err(|_| invalid())?;
                let b = u8::from_str_radix(&hex[4..6], 16).map_err(|_| invalid())?;
                Ok(Rgb::new(r, g, b))
            }
            3 => {
                let r = u8::from_str_radix(&hex[0..1], 16).map_err(|_| invalid())?;
                let g = u8::from_str_radix(&hex[1..2], 16).map_err(|_| invalid())?;
                let b = u8::from_str_radix(&hex[2..3], 16).map_err(|_| invalid())?;
                // Expand: 0xF -> 0xFF
                Ok(Rgb::new((r << 4) | r, (g << 4) | g, (b << 4) | b))
            }
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for Rgb {
    type Error = PaletteError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

/// A named color plus the icon shown next to it in color menus
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColorEntry {
    pub value: Rgb,
    pub name: String,
    pub icon_ref: PathBuf,
}

impl ColorEntry {
    pub fn new(value: Rgb, name: impl Into<String>, icon_dir: &Path) -> Self {
        let name = name.into();
        let icon_ref = icon_dir.join(format!("{}.png", name));
        Self { value, name, icon_ref }
    }

    pub fn is_eraser(&self) -> bool {
        self.name == ERASER_NAME
    }
}

/// The ordered set of named colors every note draws from.
///
/// Built once at startup and handed out behind an `Rc`, so all notes share
/// one instance. There is no mutation path after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorPalette {
    entries: Vec<ColorEntry>,
    icon_dir: PathBuf,
}

impl ColorPalette {
    /// Pair up colors and names, preserving input order
    pub fn build<S: AsRef<str>>(
        base_colors: &[Rgb],
        base_names: &[S],
        icon_dir: impl Into<PathBuf>,
    ) -> Result<Self, PaletteError> {
        if base_colors.len() != base_names.len() {
            return Err(PaletteError::LengthMismatch {
                colors: base_colors.len(),
                names: base_names.len(),
            });
        }

        let icon_dir = icon_dir.into();
        let entries = base_colors
            .iter()
            .zip(base_names)
            .map(|(color, name)| ColorEntry::new(*color, name.as_ref(), &icon_dir))
            .collect();

        Ok(Self { entries, icon_dir })
    }

    pub fn entries(&self) -> &[ColorEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ColorEntry> {
        self.entries.get(index)
    }

    /// Case-sensitive exact match on the color name
    pub fn lookup(&self, name: &str) -> Result<&ColorEntry, PaletteError> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .ok_or_else(|| PaletteError::ColorNotFound(name.to_string()))
    }

    /// Lookup by menu position, reporting the miss the same way as a name miss
    pub fn at(&self, index: usize) -> Result<&ColorEntry, PaletteError> {
        self.get(index)
            .ok_or_else(|| PaletteError::ColorNotFound(format!("#{}", index + 1)))
    }

    /// The eraser pseudo-color for a canvas with the given background.
    /// Not part of `entries()`: only sketch menus offer it.
    pub fn eraser(&self, background: Rgb) -> ColorEntry {
        ColorEntry::new(background, ERASER_NAME, &self.icon_dir)
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        let colors = [
            Rgb::BLACK,
            Rgb::RED,
            Rgb::GREEN,
            Rgb::BLUE,
            Rgb::CYAN,
            Rgb::MAGENTA,
            Rgb::YELLOW,
        ];
        let names = ["Black", "Red", "Green", "Blue", "Cyan", "Magenta", "Yellow"];
        Self {
            entries: colors
                .iter()
                .zip(names)
                .map(|(color, name)| ColorEntry::new(*color, name, Path::new("assets")))
                .collect(),
            icon_dir: PathBuf::from("assets"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_keeps_insertion_order() {
        let palette =
            ColorPalette::build(&[Rgb::RED, Rgb::BLACK], &["Red", "Black"], "icons").unwrap();
        let names: Vec<_> = palette.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Red", "Black"]);
        assert_eq!(palette.entries()[0].icon_ref, PathBuf::from("icons/Red.png"));
    }

    #[test]
    fn build_rejects_mismatched_lengths() {
        let err = ColorPalette::build(&[Rgb::RED], &["Red", "Black"], "assets").unwrap_err();
        assert_eq!(err, PaletteError::LengthMismatch { colors: 1, names: 2 });
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let palette = ColorPalette::default();
        assert_eq!(palette.lookup("Blue").unwrap().value, Rgb::BLUE);
        assert_eq!(
            palette.lookup("blue").unwrap_err(),
            PaletteError::ColorNotFound("blue".to_string())
        );
    }

    #[test]
    fn eraser_is_not_in_the_shared_list() {
        let palette = ColorPalette::default();
        let eraser = palette.eraser(Rgb::WHITE);
        assert!(eraser.is_eraser());
        assert_eq!(eraser.value, Rgb::WHITE);
        assert!(palette.lookup(ERASER_NAME).is_err());
    }

    #[test]
    fn parses_hex_forms() {
        assert_eq!("#FCFA76".parse::<Rgb>().unwrap(), Rgb::STICKY);
        assert_eq!("#fff".parse::<Rgb>().unwrap(), Rgb::WHITE);
        assert!("FCFA76".parse::<Rgb>().is_err());
        assert!("#12345".parse::<Rgb>().is_err());
        assert_eq!(Rgb::STICKY.to_string(), "#FCFA76");
    }
}
