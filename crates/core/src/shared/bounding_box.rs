/// An axis-aligned face rectangle in frame-pixel coordinates.
///
/// Boxes produced by a locator are always non-empty and fully contained in
/// the frame they were found in; [`BoundingBox::from_signed`] is the single
/// place raw detector output is brought into that shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Builds a box from signed detector coordinates, clipping it to a
    /// `frame_width` x `frame_height` frame.
    ///
    /// Returns `None` if nothing of the box remains inside the frame.
    pub fn from_signed(
        x: i64,
        y: i64,
        width: i64,
        height: i64,
        frame_width: u32,
        frame_height: u32,
    ) -> Option<Self> {
        let x1 = x.max(0);
        let y1 = y.max(0);
        let x2 = (x + width).min(frame_width as i64);
        let y2 = (y + height).min(frame_height as i64);
        if x2 <= x1 || y2 <= y1 {
            return None;
        }
        Some(Self::new(
            x1 as u32,
            y1 as u32,
            (x2 - x1) as u32,
            (y2 - y1) as u32,
        ))
    }

    /// Exclusive right edge, saturating at `u32::MAX`.
    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge, saturating at `u32::MAX`.
    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    pub fn is_within(&self, frame_width: u32, frame_height: u32) -> bool {
        self.width > 0
            && self.height > 0
            && self.right() <= frame_width
            && self.bottom() <= frame_height
    }

    /// Intersection of this box with a `frame_width` x `frame_height` frame.
    pub fn clamp_to(&self, frame_width: u32, frame_height: u32) -> Option<Self> {
        Self::from_signed(
            self.x as i64,
            self.y as i64,
            self.width as i64,
            self.height as i64,
            frame_width,
            frame_height,
        )
    }
}
