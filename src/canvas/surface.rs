use crate::foundation::core::{CanvasSize, ClipRect, Rgba8, Rgba8Premul};

/// Pixel buffer behind one widget, premultiplied RGBA8 in row-major order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Surface {
    /// Transparent surface of `size`.
    pub fn new(size: CanvasSize) -> Self {
        let len = (size.width as usize) * (size.height as usize) * 4;
        Self {
            width: size.width,
            height: size.height,
            data: vec![0; len],
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Width and height.
    pub fn size(&self) -> CanvasSize {
        CanvasSize {
            width: self.width,
            height: self.height,
        }
    }

    /// Premultiplied pixel bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let x = u32::try_from(x).ok().filter(|&x| x < self.width)?;
        let y = u32::try_from(y).ok().filter(|&y| y < self.height)?;
        Some(((y as usize) * (self.width as usize) + (x as usize)) * 4)
    }

    /// Straight color at `(x, y)`; out of bounds reads as transparent black.
    pub fn get_pixel(&self, x: i32, y: i32) -> Rgba8 {
        match self.index(x, y) {
            Some(i) => Rgba8Premul::from_array([
                self.data[i],
                self.data[i + 1],
                self.data[i + 2],
                self.data[i + 3],
            ])
            .to_straight(),
            None => Rgba8::TRANSPARENT,
        }
    }

    /// Overwrite one pixel without blending. Pixels outside the surface or `clip` are ignored.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Rgba8, clip: Option<ClipRect>) {
        if clip.is_some_and(|c| !c.contains(x, y)) {
            return;
        }
        if let Some(i) = self.index(x, y) {
            self.data[i..i + 4].copy_from_slice(&color.premultiply().to_array());
        }
    }

    /// Fill the whole surface with `color`, ignoring any clip.
    pub fn clear(&mut self, color: Rgba8) {
        let px = color.premultiply().to_array();
        for chunk in self.data.chunks_exact_mut(4) {
            chunk.copy_from_slice(&px);
        }
    }

    /// Straight RGBA8 copy, e.g. for PNG export.
    pub fn to_rgba8_straight(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.data.len());
        for px in self.data.chunks_exact(4) {
            out.extend_from_slice(
                &Rgba8Premul::from_array([px[0], px[1], px[2], px[3]])
                    .to_straight()
                    .to_array(),
            );
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/canvas/surface.rs"]
mod tests;
