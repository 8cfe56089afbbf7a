/// display resolution
pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;

/// sprites are always one byte wide
pub const SPRITE_WIDTH: usize = 8;

/// The machine's 64x32 monochrome screen plus a flag telling the front end
/// that it has changed since it was last presented.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Framebuffer {
    pixels: [[bool; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
    dirty: bool,
}

impl Framebuffer {
    pub fn new() -> Self {
        Framebuffer {
            pixels: [[false; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
            dirty: true,
        }
    }

    /// pixel at column `x`, row `y`; anything off-screen reads as unset
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.pixels
            .get(y)
            .and_then(|row| row.get(x))
            .copied()
            .unwrap_or(false)
    }

    pub fn rows(&self) -> &[[bool; DISPLAY_WIDTH]; DISPLAY_HEIGHT] {
        &self.pixels
    }

    /// blank the screen
    pub fn clear(&mut self) {
        self.pixels = [[false; DISPLAY_WIDTH]; DISPLAY_HEIGHT];
        self.dirty = true;
    }

    /// XOR a sprite onto the screen with its top-left corner at (x, y).
    ///
    /// The origin is reduced modulo the screen size; rows and columns that
    /// then run off the right or bottom edge are clipped. Returns true if
    /// any lit pixel was turned off.
    pub fn draw_sprite(&mut self, x: u8, y: u8, sprite: &[u8]) -> bool {
        let x0 = x as usize % DISPLAY_WIDTH;
        let y0 = y as usize % DISPLAY_HEIGHT;
        let mut collision = false;

        for (row, bits) in sprite.iter().enumerate() {
            let py = y0 + row;
            if py >= DISPLAY_HEIGHT {
                break;
            }
            for col in 0..SPRITE_WIDTH {
                let px = x0 + col;
                if px >= DISPLAY_WIDTH {
                    break;
                }
                if bits & (0x80 >> col) != 0 {
                    let pixel = &mut self.pixels[py][px];
                    collision |= *pixel;
                    *pixel = !*pixel;
                }
            }
        }
        self.dirty = true;
        collision
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// called by the front end once it has presented the current frame
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// number of lit pixels
    pub fn lit_count(&self) -> usize {
        self.pixels.iter().flatten().filter(|p| **p).count()
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}
