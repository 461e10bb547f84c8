use image::RgbImage;
use ndarray::{s, ArrayView3};

use crate::shared::bounding_box::BoundingBox;

/// Number of interleaved colour channels in every frame.
pub const CHANNELS: usize = 3;

/// A single captured frame: contiguous RGB bytes in row-major order,
/// origin top-left.
///
/// Frames are ephemeral. The capture loop owns each one for exactly one
/// iteration; anything that needs to draw on it works on a copy.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * CHANNELS,
            "data length must equal width * height * 3"
        );
        Self {
            data,
            width,
            height,
            index,
        }
    }

    pub fn from_rgb_image(image: RgbImage, index: usize) -> Self {
        let (width, height) = image.dimensions();
        Self::new(image.into_raw(), width, height, index)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Position of this frame in its source's decode order.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Copies the pixels into an `image` buffer.
    pub fn to_rgb_image(&self) -> RgbImage {
        RgbImage::from_raw(self.width, self.height, self.data.clone())
            .expect("Frame data length must match dimensions")
    }

    pub fn into_rgb_image(self) -> RgbImage {
        RgbImage::from_raw(self.width, self.height, self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Luma plane using the ITU-R BT.601 weights (the same conversion
    /// classical detectors are trained against).
    pub fn to_grayscale(&self) -> Vec<u8> {
        self.data
            .chunks_exact(CHANNELS)
            .map(|px| {
                let y = 0.299 * px[0] as f32 + 0.587 * px[1] as f32 + 0.114 * px[2] as f32;
                y.round().min(255.0) as u8
            })
            .collect()
    }

    /// Copies the pixels under `bbox`, clamped to the frame.
    ///
    /// Returns `None` when the box lies entirely outside the frame.
    pub fn crop(&self, bbox: &BoundingBox) -> Option<Frame> {
        let clamped = bbox.clamp_to(self.width, self.height)?;
        let view = self.as_ndarray();
        let region = view.slice(s![
            clamped.y as usize..clamped.bottom() as usize,
            clamped.x as usize..clamped.right() as usize,
            ..
        ]);
        let data: Vec<u8> = region.iter().copied().collect();
        Some(Frame::new(data, clamped.width, clamped.height, self.index))
    }

    fn shape(&self) -> (usize, usize, usize) {
        (self.height as usize, self.width as usize, CHANNELS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> Frame {
        let mut data = Vec::with_capacity((width * height) as usize * CHANNELS);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&[x as u8, y as u8, 7]);
            }
        }
        Frame::new(data, width, height, 0)
    }

    #[test]
    fn test_construction_and_accessors() {
        let data = vec![0u8; 12]; // 2x2x3
        let frame = Frame::new(data.clone(), 2, 2, 5);
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.index(), 5);
        assert_eq!(frame.data(), &data[..]);
    }

    #[test]
    #[should_panic(expected = "data length must equal width * height * 3")]
    fn test_mismatched_data_length_panics_in_debug() {
        Frame::new(vec![0u8; 10], 2, 2, 0);
    }

    #[test]
    fn test_as_ndarray_pixel_access() {
        let mut data = vec![0u8; 12];
        data[6] = 255; // row=1, col=0, R
        let frame = Frame::new(data, 2, 2, 0);
        let arr = frame.as_ndarray();
        assert_eq!(arr.shape(), &[2, 2, 3]);
        assert_eq!(arr[[1, 0, 0]], 255);
        assert_eq!(arr[[1, 0, 1]], 0);
    }

    #[test]
    fn test_rgb_image_conversion_keeps_pixels() {
        let frame = gradient(4, 3);
        let image = frame.to_rgb_image();
        assert_eq!(image.dimensions(), (4, 3));
        assert_eq!(image.get_pixel(3, 2).0, [3, 2, 7]);
        let back = Frame::from_rgb_image(image, 9);
        assert_eq!(back.data(), frame.data());
        assert_eq!(back.index(), 9);
    }

    #[test]
    fn test_grayscale_of_white_and_black() {
        let frame = Frame::new(vec![255, 255, 255, 0, 0, 0], 2, 1, 0);
        assert_eq!(frame.to_grayscale(), vec![255, 0]);
    }

    #[test]
    fn test_crop_inside_frame() {
        let frame = gradient(10, 8);
        let crop = frame.crop(&BoundingBox::new(2, 3, 4, 2)).unwrap();
        assert_eq!((crop.width(), crop.height()), (4, 2));
        let arr = crop.as_ndarray();
        assert_eq!(arr[[0, 0, 0]], 2);
        assert_eq!(arr[[0, 0, 1]], 3);
        assert_eq!(arr[[1, 3, 0]], 5);
        assert_eq!(arr[[1, 3, 1]], 4);
    }

    #[test]
    fn test_crop_is_clamped_to_frame() {
        let frame = gradient(10, 8);
        let crop = frame.crop(&BoundingBox::new(7, 6, 10, 10)).unwrap();
        assert_eq!((crop.width(), crop.height()), (3, 2));
    }

    #[test]
    fn test_crop_outside_frame_is_none() {
        let frame = gradient(10, 8);
        assert!(frame.crop(&BoundingBox::new(20, 20, 5, 5)).is_none());
    }

    #[test]
    fn test_crop_does_not_touch_source() {
        let frame = gradient(6, 6);
        let before = frame.data().to_vec();
        let _ = frame.crop(&BoundingBox::new(1, 1, 3, 3));
        assert_eq!(frame.data(), &before[..]);
    }
}
