use std::fs;
use std::time::Duration;
use tempfile::TempDir;

use stickies::alarm::{AlarmScheduler, ManualClock};
use stickies::canvas::Point;
use stickies::commands::{Command, CommandArgs, CommandError, Outcome};
use stickies::note::{NoteDefaults, NoteError, LOCK_MARKER};
use stickies::palette::{ColorPalette, Rgb};
use stickies::registry::{NoteRegistry, PlacementPolicy};
use stickies::Desk;

fn desk() -> (Desk, ManualClock) {
    let clock = ManualClock::new();
    let desk = Desk::new(
        ColorPalette::default(),
        NoteDefaults::default(),
        NoteRegistry::new(PlacementPolicy::Cascade, 23),
        AlarmScheduler::new(Box::new(clock.clone())),
    );
    (desk, clock)
}

#[test]
fn import_then_export_keeps_text() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("groceries.txt");
    fs::write(&source, "eggs\nmilk\n\nbread\n").unwrap();

    let (mut desk, _) = desk();
    let outcome = desk
        .dispatch(None, Command::Import, CommandArgs::Path(source.clone()))
        .unwrap();
    let id = match outcome {
        Outcome::Created(id) => id,
        other => panic!("expected a new note, got {:?}", other),
    };

    let note = desk.note(id).unwrap();
    assert_eq!(note.title(), "New Note");
    assert_eq!(note.as_text().unwrap().content(), "eggs\nmilk\n\nbread\n");

    let target = tmp.path().join("copy.txt");
    let outcome = desk
        .dispatch(Some(id), Command::Export, CommandArgs::Path(target.clone()))
        .unwrap();
    assert!(matches!(outcome, Outcome::Exported(ref path) if *path == target));
    assert_eq!(fs::read_to_string(&target).unwrap(), "eggs\nmilk\n\nbread\n");
}

#[test]
fn failed_import_creates_nothing() {
    let tmp = TempDir::new().unwrap();
    let (mut desk, _) = desk();

    let err = desk
        .dispatch(None, Command::Import, CommandArgs::Path(tmp.path().join("nope.txt")))
        .unwrap_err();

    assert!(matches!(err, CommandError::Note(NoteError::ImportIo { .. })));
    assert!(desk.notes().is_empty());
    // The failed attempt did not consume an id
    let id = desk.new_text_note().unwrap();
    assert_eq!(id.get(), 0);
}

#[test]
fn sketch_export_appends_png() {
    let tmp = TempDir::new().unwrap();
    let (mut desk, _) = desk();
    let id = desk.new_sketch_note().unwrap();

    let note = desk.note_mut(id).unwrap();
    note.set_pen_color("Blue").unwrap();
    assert!(note.pointer_down(Point::new(0, 0)));
    assert!(note.pointer_move(Point::new(9, 0)));
    assert!(note.pointer_up(Point::new(9, 0)));

    let written = desk.export(id, &tmp.path().join("doodle")).unwrap();
    assert_eq!(written, tmp.path().join("doodle.png"));

    let image = image::open(&written).unwrap().to_rgb8();
    assert_eq!(image.dimensions(), (160, 96));
    assert_eq!(image.get_pixel(5, 0).0, [0, 0, 255]);
    assert_eq!(image.get_pixel(5, 50).0, [255, 255, 255]);
}

#[test]
fn locked_sketch_ignores_pointer_but_keeps_pixels() {
    let (mut desk, _) = desk();
    let id = desk.new_sketch_note().unwrap();
    {
        let note = desk.note_mut(id).unwrap();
        note.pointer_down(Point::new(0, 0));
        note.pointer_move(Point::new(3, 3));
    }

    desk.dispatch(Some(id), Command::ToggleLock, CommandArgs::None).unwrap();
    let note = desk.note_mut(id).unwrap();
    assert!(note.display_title().starts_with(LOCK_MARKER));
    assert!(!note.pointer_move(Point::new(6, 6)));
    assert!(!note.pointer_down(Point::new(6, 6)));

    let graphic = note.as_graphic().unwrap();
    assert_eq!(graphic.segments_drawn(), 1);
    assert_eq!(graphic.raster().pixel(3, 3), Some(Rgb::BLACK));
    assert_eq!(graphic.raster().pixel(6, 6), Some(Rgb::WHITE));
}

#[test]
fn locked_text_rejects_title_and_paste() {
    let (mut desk, _) = desk();
    let id = desk.new_text_note().unwrap();
    desk.dispatch(Some(id), Command::ToggleLock, CommandArgs::None).unwrap();

    let err = desk
        .dispatch(Some(id), Command::SetTitle, CommandArgs::Title("Plans".to_string()))
        .unwrap_err();
    assert!(matches!(err, CommandError::Note(NoteError::Locked(_))));

    // Rejected before the clipboard is touched, so this holds headless too
    let err = desk.dispatch(Some(id), Command::PasteText, CommandArgs::None).unwrap_err();
    assert!(matches!(err, CommandError::Note(NoteError::Locked(_))));

    desk.dispatch(Some(id), Command::ToggleLock, CommandArgs::None).unwrap();
    desk.dispatch(Some(id), Command::SetTitle, CommandArgs::Title("Plans".to_string()))
        .unwrap();
    assert_eq!(desk.note(id).unwrap().display_title(), "Plans");
}

#[test]
fn alarm_marker_tracks_countdown() {
    let (mut desk, clock) = desk();
    let id = desk.new_text_note().unwrap();

    let outcome = desk
        .dispatch(
            Some(id),
            Command::AttachAlarm,
            CommandArgs::Alarm { message: "call back".to_string(), minutes: " 2 ".to_string() },
        )
        .unwrap();
    let alarm = match outcome {
        Outcome::AlarmSet(alarm) => alarm,
        other => panic!("expected an alarm, got {:?}", other),
    };
    assert_eq!(alarm.duration_ms(), 120_000);
    assert_eq!(desk.note(id).unwrap().display_title(), "New Note(Alarm)");

    clock.advance(Duration::from_secs(119));
    assert_eq!(desk.fire_due_alarms(|_| {}), 0);
    assert_eq!(desk.time_until_next_alarm(), Some(Duration::from_secs(1)));

    clock.advance(Duration::from_secs(1));
    let mut fired = Vec::new();
    assert_eq!(desk.fire_due_alarms(|a| fired.push(a.message().to_string())), 1);
    assert_eq!(fired, ["call back"]);
    assert_eq!(desk.note(id).unwrap().display_title(), "New Note");

    // One-shot
    clock.advance(Duration::from_secs(600));
    assert_eq!(desk.fire_due_alarms(|_| {}), 0);
}

#[test]
fn invalid_minutes_leave_note_untouched() {
    let (mut desk, _) = desk();
    let id = desk.new_text_note().unwrap();

    for minutes in ["0", "61", "soon", ""] {
        let err = desk
            .dispatch(
                Some(id),
                Command::AttachAlarm,
                CommandArgs::Alarm { message: "x".to_string(), minutes: minutes.to_string() },
            )
            .unwrap_err();
        assert!(matches!(err, CommandError::Alarm(_)), "minutes {:?}", minutes);
    }
    assert!(desk.note(id).unwrap().alarm().is_none());
    assert_eq!(desk.scheduler().pending_count(), 0);
}

#[test]
fn new_notes_cascade() {
    let (mut desk, _) = desk();
    let first = desk.new_text_note().unwrap();
    let second = desk.new_sketch_note().unwrap();
    let third = desk.new_text_note().unwrap();

    use stickies::registry::Placement;
    assert_eq!(desk.note(first).unwrap().placement(), Placement::At { x: 0, y: 0 });
    assert_eq!(desk.note(second).unwrap().placement(), Placement::At { x: 23, y: 23 });
    assert_eq!(desk.note(third).unwrap().placement(), Placement::At { x: 46, y: 46 });
}
