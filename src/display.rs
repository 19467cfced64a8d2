use std::io;
use tui::backend::CrosstermBackend;
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders};
use tui::Terminal;

/// Standard CHIP-8 resolution.
pub const CHIP8_DISPLAY_WIDTH: usize = 64;
pub const CHIP8_DISPLAY_HEIGHT: usize = 32;

/// Display is used by the interpreter to put pixels on the screen. It
/// abstracts the implementation details, so a variety of kinds of screen
/// work.
///
/// Sprites are drawn by XOR, so the single pixel primitive is a toggle; its
/// return value is the collision signal the interpreter folds into VF.
pub trait Display {
    /// Toggle one pixel. Returns true iff the pixel went from on to off,
    /// i.e. a sprite collision.
    fn toggle_pixel(&mut self, x: usize, y: usize) -> bool;

    /// Called once at the end of any tick that changed the screen, after
    /// all pixels are toggled. Buffered implementations render here.
    fn notify_frame_complete(&mut self) -> Result<(), io::Error>;

    /// Blank the whole screen.
    fn clear(&mut self) -> Result<(), io::Error>;

    /// (width, height) in pixels; sprite coordinates wrap at these.
    fn resolution(&self) -> (usize, usize);
}

/// One bit per pixel, row-major.
struct FrameBuffer {
    width: usize,
    height: usize,
    pixels: Vec<bool>,
}

impl FrameBuffer {
    fn new(width: usize, height: usize) -> Self {
        FrameBuffer {
            width,
            height,
            pixels: vec![false; width * height],
        }
    }

    fn toggle(&mut self, x: usize, y: usize) -> bool {
        let idx = y * self.width + x;
        self.pixels[idx] = !self.pixels[idx];
        !self.pixels[idx]
    }

    fn get(&self, x: usize, y: usize) -> bool {
        self.pixels[y * self.width + x]
    }

    fn clear(&mut self) {
        self.pixels.fill(false);
    }

    fn x_bounds(&self) -> [f64; 2] {
        [0.0, (self.width - 1) as f64]
    }

    fn y_bounds(&self) -> [f64; 2] {
        [-1.0 * (self.height - 1) as f64, 0.0]
    }

    /// lit pixels as float coords suitable for a TUI canvas; y grows
    /// downward on the chip-8 so it is negated for the canvas
    fn lit_points(&self) -> Vec<(f64, f64)> {
        self.pixels
            .iter()
            .enumerate()
            .filter(|(_, &on)| on)
            .map(|(i, _)| ((i % self.width) as f64, -1.0 * (i / self.width) as f64))
            .collect()
    }
}

/// Monochrome display in a terminal, rendered with TUI over crossterm.
pub struct MonoTermDisplay {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    frame: FrameBuffer,
}

impl MonoTermDisplay {
    pub fn new(x: usize, y: usize) -> Result<MonoTermDisplay, io::Error> {
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;
        terminal.hide_cursor()?;
        terminal.clear()?;
        Ok(MonoTermDisplay {
            terminal,
            frame: FrameBuffer::new(x, y),
        })
    }

    fn render(&mut self) -> Result<(), io::Error> {
        // assumes a 1:1 ratio between terminal cells, chip8 pixels and the
        // internal TUI canvas
        let frame = &self.frame;
        self.terminal.draw(|f| {
            let size = Rect::new(
                0,
                0,
                2 + frame.width as u16,
                2 + frame.height as u16,
            );

            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title("CHIP-8")
                        .borders(Borders::ALL)
                        .style(Style::default().bg(Color::Black)),
                )
                .x_bounds(frame.x_bounds())
                .y_bounds(frame.y_bounds())
                .marker(Marker::Block)
                .paint(|ctx| {
                    ctx.draw(&Points {
                        coords: &frame.lit_points(),
                        color: Color::White,
                    });
                });
            f.render_widget(canvas, size);
        })?;
        Ok(())
    }
}

impl Display for MonoTermDisplay {
    fn toggle_pixel(&mut self, x: usize, y: usize) -> bool {
        self.frame.toggle(x, y)
    }

    fn notify_frame_complete(&mut self) -> Result<(), io::Error> {
        self.render()
    }

    fn clear(&mut self) -> Result<(), io::Error> {
        self.frame.clear();
        self.render()
    }

    fn resolution(&self) -> (usize, usize) {
        (self.frame.width, self.frame.height)
    }
}

impl Drop for MonoTermDisplay {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
    }
}

/// Headless display, useful for testing non-rendering routines: keeps the
/// framebuffer and counts frame notifications, draws nothing.
pub struct DummyDisplay {
    frame: FrameBuffer,
    frames_completed: usize,
}

impl DummyDisplay {
    pub fn new(x: usize, y: usize) -> Self {
        DummyDisplay {
            frame: FrameBuffer::new(x, y),
            frames_completed: 0,
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.frame.get(x, y)
    }

    pub fn lit_pixel_count(&self) -> usize {
        self.frame.pixels.iter().filter(|&&p| p).count()
    }

    pub fn frames_completed(&self) -> usize {
        self.frames_completed
    }
}

impl Display for DummyDisplay {
    fn toggle_pixel(&mut self, x: usize, y: usize) -> bool {
        self.frame.toggle(x, y)
    }

    fn notify_frame_complete(&mut self) -> Result<(), io::Error> {
        self.frames_completed += 1;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), io::Error> {
        self.frame.clear();
        Ok(())
    }

    fn resolution(&self) -> (usize, usize) {
        (self.frame.width, self.frame.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // FrameBuffer tests
    #[test]
    fn test_toggle_reports_collision_on_unset_only() {
        let mut fb = FrameBuffer::new(64, 32);
        assert!(!fb.toggle(3, 4)); // off -> on, no collision
        assert!(fb.get(3, 4));
        assert!(fb.toggle(3, 4)); // on -> off, collision
        assert!(!fb.get(3, 4));
    }

    #[test]
    fn test_x_bounds() {
        let fb = FrameBuffer::new(64, 32);
        assert_eq!(fb.x_bounds(), [0.0, 63.0]);
    }

    #[test]
    fn test_y_bounds() {
        let fb = FrameBuffer::new(64, 32);
        assert_eq!(fb.y_bounds(), [-31.0, 0.0]);
    }

    #[test]
    fn test_lit_points_empty_when_clear() {
        let mut fb = FrameBuffer::new(64, 32);
        fb.toggle(1, 1);
        fb.clear();
        assert!(fb.lit_points().is_empty());
    }

    #[test]
    fn test_lit_points_coords() {
        let mut fb = FrameBuffer::new(64, 32);
        fb.toggle(5, 2);
        assert_eq!(fb.lit_points(), vec![(5.0, -2.0)]);
    }

    // DummyDisplay tests
    #[test]
    fn test_dummy_display_counts_frames() {
        let mut d = DummyDisplay::new(64, 32);
        assert_eq!(d.frames_completed(), 0);
        d.notify_frame_complete().unwrap();
        d.notify_frame_complete().unwrap();
        assert_eq!(d.frames_completed(), 2);
    }

    #[test]
    fn test_dummy_display_resolution() {
        let d = DummyDisplay::new(64, 32);
        assert_eq!(d.resolution(), (64, 32));
    }
}
