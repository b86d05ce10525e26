/// Half-block true-colour output of a pixel buffer
use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    QueueableCommand,
};
use std::io::Write;

use softview_core::{Canvas, Color as Rgb, PixelBuffer};

/// Upper half block: foreground paints the top pixel, background the bottom
const HALF_BLOCK: char = '▀';

/// Draws two pixel rows per terminal row starting at a given terminal row
pub struct HalfBlockPresenter {
    top_row: u16,
}

impl HalfBlockPresenter {
    pub fn new(top_row: u16) -> Self {
        Self { top_row }
    }

    /// Pixel buffer size that fills `cols` x `rows` terminal cells below the
    /// first `top_row` rows
    pub fn buffer_size(&self, cols: u16, rows: u16) -> (usize, usize) {
        let rows = rows.saturating_sub(self.top_row).max(1);
        (cols.max(1) as usize, rows as usize * 2)
    }

    /// Colours of the cell at `(col, row)`: top pixel, bottom pixel
    pub fn cell(buffer: &PixelBuffer, col: usize, row: usize) -> (Rgb, Rgb) {
        let top = buffer.pixel(col, row * 2).unwrap_or_default();
        let bottom = buffer.pixel(col, row * 2 + 1).unwrap_or(top);
        (top, bottom)
    }

    pub fn draw<W: Write>(&self, buffer: &PixelBuffer, writer: &mut W) -> std::io::Result<()> {
        let rows = buffer.height().div_ceil(2);
        let mut current: Option<(Rgb, Rgb)> = None;

        for row in 0..rows {
            writer.queue(cursor::MoveTo(0, self.top_row + row as u16))?;
            for col in 0..buffer.width() {
                let (top, bottom) = Self::cell(buffer, col, row);
                // Only emit colour changes
                if current != Some((top, bottom)) {
                    writer.queue(SetForegroundColor(to_terminal(top)))?;
                    writer.queue(SetBackgroundColor(to_terminal(bottom)))?;
                    current = Some((top, bottom));
                }
                writer.queue(Print(HALF_BLOCK))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

fn to_terminal(color: Rgb) -> Color {
    let [r, g, b] = color.to_rgb8();
    Color::Rgb { r, g, b }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_size() {
        let presenter = HalfBlockPresenter::new(1);
        assert_eq!(presenter.buffer_size(80, 25), (80, 48));
        assert_eq!(presenter.buffer_size(0, 0), (1, 2));
    }

    #[test]
    fn test_cell_pairs_rows() {
        let mut buffer = PixelBuffer::new(2, 3);
        buffer.put_pixel(1, 0, Rgb::WHITE);
        buffer.put_pixel(1, 2, Rgb::new(1.0, 0.0, 0.0));
        assert_eq!(HalfBlockPresenter::cell(&buffer, 1, 0), (Rgb::WHITE, Rgb::BLACK));
        // Odd height: the last cell repeats its top pixel
        let red = Rgb::new(1.0, 0.0, 0.0);
        assert_eq!(HalfBlockPresenter::cell(&buffer, 1, 1), (red, red));
    }

    #[test]
    fn test_draw_emits_one_block_per_cell() {
        let mut buffer = PixelBuffer::new(3, 4);
        buffer.fill_rect(0, 0, 3, 2, Rgb::WHITE);
        let mut out = Vec::new();
        HalfBlockPresenter::new(0).draw(&buffer, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches(HALF_BLOCK).count(), 6);
        assert!(text.contains("38;2;255;255;255"));
    }
}
