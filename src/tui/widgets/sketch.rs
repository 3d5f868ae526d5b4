use ratatui::buffer::Buffer;
use ratatui::layout::{Position, Rect};
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Widget};
use ratatui::Frame;

use crate::canvas::{CaptureState, Point, Raster, Surface};
use crate::note::{GraphicNote, Note};
use crate::tui::widgets::color::{get_contrast_text_color, to_color};

const UPPER_HALF: &str = "▀";

/// Draws a raster with two vertical pixels per cell: the upper pixel as the
/// glyph's foreground, the lower as its background.
pub struct SketchView<'a> {
    raster: &'a Raster,
}

impl<'a> SketchView<'a> {
    pub fn new(raster: &'a Raster) -> Self {
        Self { raster }
    }
}

impl Widget for SketchView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let background = to_color(self.raster.background());
        for row in 0..area.height {
            for col in 0..area.width {
                let x = col as i32;
                let y = row as i32 * 2;
                let upper = self.raster.pixel(x, y).map(to_color).unwrap_or(background);
                let lower = self.raster.pixel(x, y + 1).map(to_color).unwrap_or(background);
                if let Some(cell) = buf.cell_mut(Position::new(area.x + col, area.y + row)) {
                    cell.set_symbol(UPPER_HALF).set_fg(upper).set_bg(lower);
                }
            }
        }
    }
}

/// Raster coordinate under a terminal cell. Cells left of or above the
/// canvas give negative coordinates, which the raster clips.
pub fn cell_to_point(canvas: Rect, column: u16, row: u16) -> Point {
    Point::new(
        column as i32 - canvas.x as i32,
        (row as i32 - canvas.y as i32) * 2,
    )
}

/// Render a sketch note and return the area its canvas occupies
pub fn render_sketch_note(f: &mut Frame, area: Rect, note: &Note, graphic: &GraphicNote) -> Rect {
    let background = to_color(graphic.background());
    let chrome = get_contrast_text_color(background);
    let state = match graphic.capture_state() {
        CaptureState::Idle => "",
        CaptureState::Capturing => " · drawing",
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(note.display_title())
        .title_bottom(Line::from(format!(" pen: {}{} ", graphic.pen().name, state)))
        .border_style(Style::default().fg(chrome))
        .style(Style::default().bg(background));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let raster = graphic.raster();
    let canvas = Rect::new(
        inner.x,
        inner.y,
        inner.width.min(u16::try_from(raster.width()).unwrap_or(u16::MAX)),
        inner.height.min(u16::try_from(raster.height().div_ceil(2)).unwrap_or(u16::MAX)),
    );
    f.render_widget(SketchView::new(raster), canvas);
    canvas
}
