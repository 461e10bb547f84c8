use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};

use crate::shared::frame::Frame;

/// Size of a `width` x `height` image shrunk to fit `max_width` x
/// `max_height`. Never upscales; fractional sizes are truncated.
pub fn bounded_size(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (width, height);
    }
    let scale = (max_width as f64 / width as f64)
        .min(max_height as f64 / height as f64)
        .min(1.0);
    if scale < 1.0 {
        (
            ((width as f64 * scale) as u32).max(1),
            ((height as f64 * scale) as u32).max(1),
        )
    } else {
        (width, height)
    }
}

/// Shrinks `frame` to fit within `max_width` x `max_height`, keeping its
/// aspect ratio. Frames that already fit are returned untouched.
pub fn resize_frame(frame: Frame, max_width: u32, max_height: u32) -> Frame {
    let (w, h) = bounded_size(frame.width(), frame.height(), max_width, max_height);
    if (w, h) == (frame.width(), frame.height()) {
        return frame;
    }
    let index = frame.index();
    let resized = imageops::resize(&frame.into_rgb_image(), w, h, FilterType::Triangle);
    Frame::from_rgb_image(resized, index)
}

/// Placement of an image fitted into a `target` box: `(x, y, width, height)`.
pub fn letterbox_rect(
    width: u32,
    height: u32,
    target_width: u32,
    target_height: u32,
) -> (u32, u32, u32, u32) {
    if width == 0 || height == 0 || target_width == 0 || target_height == 0 {
        return (0, 0, 0, 0);
    }
    let img_aspect = width as f64 / height as f64;
    let target_aspect = target_width as f64 / target_height as f64;
    let (w, h) = if img_aspect > target_aspect {
        (target_width, (target_width as f64 / img_aspect) as u32)
    } else {
        ((target_height as f64 * img_aspect) as u32, target_height)
    };
    let (w, h) = (w.clamp(1, target_width), h.clamp(1, target_height));
    ((target_width - w) / 2, (target_height - h) / 2, w, h)
}

/// Scales `image` to fit `target_width` x `target_height` and centres it on
/// a canvas of exactly that size filled with `fill`.
pub fn letterbox(image: &RgbImage, target_width: u32, target_height: u32, fill: [u8; 3]) -> RgbImage {
    let mut canvas = RgbImage::from_pixel(target_width, target_height, Rgb(fill));
    let (x, y, w, h) = letterbox_rect(image.width(), image.height(), target_width, target_height);
    if w == 0 || h == 0 {
        return canvas;
    }
    let scaled = if (w, h) == image.dimensions() {
        image.clone()
    } else {
        imageops::resize(image, w, h, FilterType::Triangle)
    };
    imageops::replace(&mut canvas, &scaled, x as i64, y as i64);
    canvas
}
