use crate::Datum;
use std::fmt;

pub const WIDTH: usize = 64;
pub const HEIGHT: usize = 32;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum Pixel {
    #[default]
    Black,
    White,
}

pub type Frame = [[Pixel; WIDTH]; HEIGHT];

/// The 64x32 monochrome frame buffer.
///
/// Sprites wrap: a sprite's origin is reduced modulo the screen size, and any
/// part that runs past the right or bottom edge reappears on the opposite edge.
#[derive(Debug, Clone, Eq, PartialEq)]
#[allow(missing_copy_implementations)]
pub struct Display(Frame);

impl Display {
    pub fn blank() -> Self {
        Self([[Pixel::Black; WIDTH]; HEIGHT])
    }

    pub fn raw(&self) -> &Frame {
        &self.0
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Pixel; WIDTH]> {
        self.0.iter()
    }

    pub fn clear(&mut self) {
        self.0 = [[Pixel::Black; WIDTH]; HEIGHT];
    }

    /// XORs `data` onto the screen, one byte per row, with its top left corner at (`x`, `y`).
    pub fn sprite(&mut self, x: Datum, y: Datum, data: &[Datum]) -> ScreenModification {
        let mut modified = ScreenModification::Nothing;
        let origin_x = x.inner() as usize;
        let origin_y = y.inner() as usize;
        for (row, byte) in data.iter().enumerate() {
            let screen_y = (origin_y + row) % HEIGHT;
            for (column, bit) in byte.bits().into_iter().enumerate() {
                if !bit {
                    continue;
                }
                let screen_x = (origin_x + column) % WIDTH;
                modified.set();
                if self.xor_pixel_at(screen_x, screen_y) {
                    modified.clear();
                }
            }
        }
        modified
    }

    /// The pixel at column `x` of row `y`, if that lies on screen.
    pub fn pixel(&self, x: usize, y: usize) -> Option<Pixel> {
        self.0.get(y).and_then(|row| row.get(x)).copied()
    }

    pub fn lit(&self) -> usize {
        self.0
            .iter()
            .flatten()
            .filter(|&&pixel| pixel == Pixel::White)
            .count()
    }

    fn pixel_at_mut(&mut self, x: usize, y: usize) -> &mut Pixel {
        &mut self.0[y][x]
    }

    /// Flips a pixel, returning whether it was switched off.
    fn xor_pixel_at(&mut self, x: usize, y: usize) -> bool {
        let pixel = self.pixel_at_mut(x, y);
        match *pixel {
            Pixel::Black => {
                *pixel = Pixel::White;
                false
            }
            Pixel::White => {
                *pixel = Pixel::Black;
                true
            }
        }
    }
}

impl Default for Display {
    fn default() -> Self {
        Self::blank()
    }
}

impl fmt::Display for Display {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for pixel in row {
                let cell = match pixel {
                    Pixel::Black => ' ',
                    Pixel::White => '█',
                };
                write!(f, "{}", cell)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ScreenModification {
    Nothing,
    Sets,
    Clears,
}

impl ScreenModification {
    fn set(&mut self) {
        if *self == Self::Nothing {
            *self = Self::Sets;
        }
    }

    fn clear(&mut self) {
        *self = Self::Clears;
    }

    /// Whether a lit pixel was switched off.
    pub fn collided(self) -> bool {
        self == Self::Clears
    }
}
