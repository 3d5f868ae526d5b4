use std::cell::Cell;
use std::path::Path;
use std::rc::{Rc, Weak};
use thiserror::Error;
use tracing::debug;

use crate::palette::Rgb;

#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("Failed to write image: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to encode image: {0}")]
    Encode(#[from] image::ImageError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// One committed line piece of a stroke
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub from: Point,
    pub to: Point,
    pub color: Rgb,
}

/// Something segments can be rendered onto immediately
pub trait Surface {
    fn draw_segment(&mut self, segment: &Segment);
    fn background(&self) -> Rgb;
}

/// The pixel buffer behind a sketch note
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    background: Rgb,
    pixels: Vec<Rgb>,
}

impl Raster {
    pub fn new(width: u32, height: u32, background: Rgb) -> Self {
        Self {
            width,
            height,
            background,
            pixels: vec![background; (width as usize) * (height as usize)],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel at (x, y), or None outside the raster
    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgb> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    fn plot(&mut self, x: i32, y: i32, color: Rgb) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    /// Point-in-time copy of what is currently visible
    pub fn snapshot(&self) -> Raster {
        self.clone()
    }

    pub fn to_image(&self) -> image::RgbImage {
        image::RgbImage::from_fn(self.width, self.height, |x, y| {
            let px = self.pixels[y as usize * self.width as usize + x as usize];
            image::Rgb([px.r, px.g, px.b])
        })
    }

    /// Write the raster as a PNG file
    pub fn save_png(&self, path: &Path) -> Result<(), CanvasError> {
        self.to_image()
            .save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }
}

impl Surface for Raster {
    // Bresenham; pixels outside the raster are clipped
    fn draw_segment(&mut self, segment: &Segment) {
        let (mut x0, mut y0) = (segment.from.x, segment.from.y);
        let (x1, y1) = (segment.to.x, segment.to.y);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.plot(x0, y0, segment.color);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    fn background(&self) -> Rgb {
        self.background
    }
}

/// Shared pen cell: the owning note writes it, the canvas only reads it
pub type PenHandle = Rc<Cell<Rgb>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    Capturing,
}

#[derive(Debug, Clone, Copy)]
enum Stroke {
    Idle,
    // Holding `color` here is the drawing context; dropping back to Idle releases it
    Capturing { prev: Point, color: Rgb },
}

/// Turns pointer input into line segments rendered straight onto a surface.
///
/// No stroke list is retained: once a segment is drawn only the surface
/// remembers it. Input is ignored while the canvas is detached (note locked).
#[derive(Debug)]
pub struct DrawingCanvas<S: Surface = Raster> {
    surface: S,
    pen: Weak<Cell<Rgb>>,
    attached: bool,
    stroke: Stroke,
    segments_drawn: u64,
}

impl<S: Surface> DrawingCanvas<S> {
    pub fn new(surface: S, pen: &PenHandle) -> Self {
        Self {
            surface,
            pen: Rc::downgrade(pen),
            attached: true,
            stroke: Stroke::Idle,
            segments_drawn: 0,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn state(&self) -> CaptureState {
        match self.stroke {
            Stroke::Idle => CaptureState::Idle,
            Stroke::Capturing { .. } => CaptureState::Capturing,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Total segments rendered over the canvas lifetime
    pub fn segments_drawn(&self) -> u64 {
        self.segments_drawn
    }

    fn pen_color(&self) -> Option<Rgb> {
        self.pen.upgrade().map(|pen| pen.get())
    }

    /// Begin a stroke. Returns false when the press was ignored.
    pub fn on_pointer_down(&mut self, p: Point) -> bool {
        if !self.attached || matches!(self.stroke, Stroke::Capturing { .. }) {
            return false;
        }
        let Some(color) = self.pen_color() else {
            return false;
        };
        self.stroke = Stroke::Capturing { prev: p, color };
        debug!(x = p.x, y = p.y, %color, "stroke started");
        true
    }

    /// Draw from the previous point to `p`. A no-op unless a stroke is active.
    pub fn on_pointer_move(&mut self, p: Point) -> bool {
        if !self.attached {
            return false;
        }
        let Stroke::Capturing { prev, color } = self.stroke else {
            return false;
        };

        // Pen changes made mid-stroke apply from the next segment on
        let color = self.pen_color().unwrap_or(color);
        self.surface.draw_segment(&Segment { from: prev, to: p, color });
        self.segments_drawn += 1;
        self.stroke = Stroke::Capturing { prev: p, color };
        true
    }

    pub fn on_pointer_up(&mut self, _p: Point) -> bool {
        if !self.attached || matches!(self.stroke, Stroke::Idle) {
            return false;
        }
        self.stroke = Stroke::Idle;
        debug!(segments = self.segments_drawn, "stroke finished");
        true
    }

    /// Stop accepting input. An in-flight stroke is dropped; what it already
    /// rendered stays on the surface.
    pub fn detach(&mut self) {
        self.attached = false;
        self.stroke = Stroke::Idle;
    }

    pub fn attach(&mut self) {
        self.attached = true;
    }
}

impl DrawingCanvas<Raster> {
    pub fn snapshot(&self) -> Raster {
        self.surface.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        segments: Vec<Segment>,
    }

    impl Surface for Recorder {
        fn draw_segment(&mut self, segment: &Segment) {
            self.segments.push(*segment);
        }

        fn background(&self) -> Rgb {
            Rgb::WHITE
        }
    }

    fn pen(color: Rgb) -> PenHandle {
        Rc::new(Cell::new(color))
    }

    #[test]
    fn moves_without_press_draw_nothing() {
        let pen = pen(Rgb::BLACK);
        let mut canvas = DrawingCanvas::new(Recorder::default(), &pen);
        assert!(!canvas.on_pointer_move(Point::new(1, 1)));
        assert!(!canvas.on_pointer_move(Point::new(2, 2)));
        assert!(!canvas.on_pointer_up(Point::new(2, 2)));
        assert!(canvas.surface().segments.is_empty());
        assert_eq!(canvas.state(), CaptureState::Idle);
    }

    #[test]
    fn press_move_move_release_commits_two_segments() {
        let pen = pen(Rgb::RED);
        let mut canvas = DrawingCanvas::new(Recorder::default(), &pen);
        let (p0, p1, p2) = (Point::new(0, 0), Point::new(5, 0), Point::new(5, 5));

        assert!(canvas.on_pointer_down(p0));
        assert_eq!(canvas.state(), CaptureState::Capturing);
        canvas.on_pointer_move(p1);
        pen.set(Rgb::BLUE);
        canvas.on_pointer_move(p2);
        canvas.on_pointer_up(p2);

        assert_eq!(
            canvas.surface().segments,
            vec![
                Segment { from: p0, to: p1, color: Rgb::RED },
                Segment { from: p1, to: p2, color: Rgb::BLUE },
            ]
        );
        assert_eq!(canvas.state(), CaptureState::Idle);
    }

    #[test]
    fn detach_mid_stroke_returns_to_idle_and_ignores_input() {
        let pen = pen(Rgb::BLACK);
        let mut canvas = DrawingCanvas::new(Recorder::default(), &pen);
        canvas.on_pointer_down(Point::new(0, 0));
        canvas.on_pointer_move(Point::new(1, 0));
        canvas.detach();

        assert_eq!(canvas.state(), CaptureState::Idle);
        assert!(!canvas.on_pointer_down(Point::new(3, 3)));
        assert!(!canvas.on_pointer_move(Point::new(4, 4)));
        assert_eq!(canvas.surface().segments.len(), 1);

        canvas.attach();
        // The stroke interrupted by the detach does not resume
        assert!(!canvas.on_pointer_move(Point::new(5, 5)));
        assert!(canvas.on_pointer_down(Point::new(5, 5)));
    }

    #[test]
    fn raster_draws_diagonal_line() {
        let pen = pen(Rgb::GREEN);
        let mut canvas = DrawingCanvas::new(Raster::new(4, 4, Rgb::WHITE), &pen);
        canvas.on_pointer_down(Point::new(0, 0));
        canvas.on_pointer_move(Point::new(3, 3));
        canvas.on_pointer_up(Point::new(3, 3));

        let raster = canvas.snapshot();
        for i in 0..4 {
            assert_eq!(raster.pixel(i, i), Some(Rgb::GREEN));
        }
        assert_eq!(raster.pixel(3, 0), Some(Rgb::WHITE));
        assert_eq!(raster.pixel(4, 4), None);
    }

    #[test]
    fn snapshot_is_not_a_live_view() {
        let pen = pen(Rgb::BLACK);
        let mut canvas = DrawingCanvas::new(Raster::new(3, 3, Rgb::WHITE), &pen);
        let before = canvas.snapshot();
        canvas.on_pointer_down(Point::new(0, 1));
        canvas.on_pointer_move(Point::new(2, 1));
        assert_eq!(before.pixel(1, 1), Some(Rgb::WHITE));
        assert_eq!(canvas.snapshot().pixel(1, 1), Some(Rgb::BLACK));
    }

    #[test]
    fn segments_outside_raster_are_clipped() {
        let mut raster = Raster::new(2, 2, Rgb::WHITE);
        raster.draw_segment(&Segment {
            from: Point::new(-3, 0),
            to: Point::new(5, 0),
            color: Rgb::RED,
        });
        assert_eq!(raster.pixel(0, 0), Some(Rgb::RED));
        assert_eq!(raster.pixel(1, 0), Some(Rgb::RED));
        assert_eq!(raster.pixel(0, 1), Some(Rgb::WHITE));
    }
}
