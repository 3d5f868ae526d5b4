pub mod alarm;
pub mod canvas;
pub mod cli;
pub mod commands;
pub mod config;
pub mod desk;
pub mod logging;
pub mod note;
pub mod palette;
pub mod registry;
pub mod tui;
pub mod utils;

pub use alarm::{Alarm, AlarmScheduler, Clock, ManualClock, SystemClock};
pub use canvas::{DrawingCanvas, Raster};
pub use commands::{Command, CommandArgs, Outcome};
pub use config::Config;
pub use desk::Desk;
pub use note::{Note, NoteId};
pub use palette::{ColorPalette, Rgb};
pub use registry::NoteRegistry;
pub use utils::Profile;
