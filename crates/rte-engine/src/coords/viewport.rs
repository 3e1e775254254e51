/// Window size in physical pixels plus the post-process pixelation factor.
///
/// The scene is rendered off-screen at [`Viewport::scaled_size`] and stretched
/// back to the full window.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pixel_size: u32,
}

impl Viewport {
    /// `pixel_size` below 1 is treated as 1.
    #[inline]
    pub fn new(width: u32, height: u32, pixel_size: u32) -> Self {
        Self {
            width,
            height,
            pixel_size: pixel_size.max(1),
        }
    }

    #[inline]
    pub fn pixel_size(self) -> u32 {
        self.pixel_size
    }

    /// Off-screen target size; never zero in either dimension.
    #[inline]
    pub fn scaled_size(self) -> (u32, u32) {
        (
            (self.width / self.pixel_size).max(1),
            (self.height / self.pixel_size).max(1),
        )
    }

    #[inline]
    pub fn aspect(self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    /// Minimized windows report a zero size.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub fn resized(self, width: u32, height: u32) -> Self {
        Self::new(width, height, self.pixel_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaled_size_divides_by_pixel_size() {
        let vp = Viewport::new(800, 600, 4);
        assert_eq!(vp.scaled_size(), (200, 150));
        assert_eq!(vp.resized(1024, 768).scaled_size(), (256, 192));
    }

    #[test]
    fn degenerate_inputs_are_clamped() {
        let vp = Viewport::new(3, 2, 0);
        assert_eq!(vp.pixel_size(), 1);
        assert_eq!(Viewport::new(3, 2, 8).scaled_size(), (1, 1));
        assert!(Viewport::new(0, 10, 1).is_empty());
    }
}
