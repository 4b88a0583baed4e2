use bitvec::{BitArr, array::BitArray};

pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;

/// The 64x32 monochrome framebuffer.
///
/// Sprites are combined with the existing pixels by XOR, and coordinates wrap
/// modulo the display dimensions so drawing near an edge is always defined.
/// The dirty flag records that the buffer changed since the host last
/// consumed a frame; clear and draw both set it, the host clears it.
pub struct FrameBuffer {
    pixels: BitArr!(for DISPLAY_WIDTH * DISPLAY_HEIGHT),
    dirty: bool,
}

impl FrameBuffer {
    pub fn new() -> Self {
        FrameBuffer {
            pixels: BitArray::ZERO,
            dirty: false,
        }
    }

    pub fn clear(&mut self) {
        self.pixels.fill(false);
        self.dirty = true;
    }

    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.pixels[(y % DISPLAY_HEIGHT) * DISPLAY_WIDTH + (x % DISPLAY_WIDTH)]
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// XORs `sprite` onto the buffer with its top-left corner at (x, y), one
    /// byte per 8-pixel row. Returns true if any set pixel was turned off
    /// (collision). Marks the buffer dirty even when no bit was drawn.
    pub fn draw_sprite(&mut self, x: usize, y: usize, sprite: &[u8]) -> bool {
        let mut collision = false;

        for (row, &byte) in sprite.iter().enumerate() {
            for bit in 0..8 {
                let new_pixel = (byte >> (7 - bit)) & 1 == 1;
                if !new_pixel {
                    continue;
                }

                let pixel_x = (x + bit) % DISPLAY_WIDTH;
                let pixel_y = (y + row) % DISPLAY_HEIGHT;
                let index = pixel_y * DISPLAY_WIDTH + pixel_x;

                let current_pixel = self.pixels[index];
                if current_pixel {
                    collision = true;
                }
                self.pixels.set(index, !current_pixel);
            }
        }
        self.dirty = true;

        collision
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_sets_pixels_from_sprite_bits() {
        let mut frame = FrameBuffer::new();
        let collision = frame.draw_sprite(0, 0, &[0b1010_0001]);
        assert!(!collision);
        assert!(frame.pixel(0, 0));
        assert!(!frame.pixel(1, 0));
        assert!(frame.pixel(2, 0));
        assert!(frame.pixel(7, 0));
    }

    #[test]
    fn test_draw_wraps_at_screen_edges() {
        let mut frame = FrameBuffer::new();
        frame.draw_sprite(62, 31, &[0xFF, 0xFF]);
        // Row 0 of the sprite lands on the last display row, columns 62, 63
        // then wraps to 0..6; row 1 wraps to the top row.
        assert!(frame.pixel(62, 31));
        assert!(frame.pixel(63, 31));
        assert!(frame.pixel(0, 31));
        assert!(frame.pixel(5, 31));
        assert!(frame.pixel(62, 0));
        assert!(frame.pixel(0, 0));
    }

    #[test]
    fn test_blank_sprite_still_marks_dirty() {
        let mut frame = FrameBuffer::new();
        assert!(!frame.is_dirty());
        let collision = frame.draw_sprite(10, 10, &[0x00]);
        assert!(!collision);
        assert!(!frame.pixel(10, 10));
        assert!(frame.is_dirty());
    }

    #[test]
    fn test_clear_zeroes_buffer_and_marks_dirty() {
        let mut frame = FrameBuffer::new();
        frame.draw_sprite(4, 4, &[0xFF]);
        frame.clear_dirty();
        frame.clear();
        assert!(frame.is_dirty());
        for x in 0..DISPLAY_WIDTH {
            for y in 0..DISPLAY_HEIGHT {
                assert!(!frame.pixel(x, y));
            }
        }
    }

    #[test]
    fn test_redraw_erases_and_reports_collision() {
        let mut frame = FrameBuffer::new();
        assert!(!frame.draw_sprite(12, 7, &[0x3C, 0x42]));
        assert!(frame.draw_sprite(12, 7, &[0x3C, 0x42]));
        for x in 0..DISPLAY_WIDTH {
            for y in 0..DISPLAY_HEIGHT {
                assert!(!frame.pixel(x, y));
            }
        }
    }
}
