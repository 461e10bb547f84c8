//! Draws detection boxes, labels and the mode title onto a copy of a frame.

use std::path::{Path, PathBuf};

use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;

use crate::capture::domain::frame_source::SourceKind;
use crate::detection::domain::detection::Detection;
use crate::shared::frame::Frame;

pub const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
pub const TITLE_COLOR: Rgb<u8> = Rgb([0, 0, 255]);

const BOX_THICKNESS: u32 = 2;
const LABEL_PX: f32 = 20.0;
/// Gap between a label's baseline and the top of its box.
const LABEL_GAP: i32 = 10;
const MIN_TITLE_PX: f32 = 12.0;

/// Fonts tried, in order, when no font path is configured.
const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Title shown in the top-left corner for each capture mode.
pub fn title_for(kind: SourceKind, target_fps: u32) -> String {
    match kind {
        SourceKind::Camera => format!("Emotion Detection (FPS: {target_fps})"),
        SourceKind::Video => format!("Video Emotion Detection (FPS: {target_fps})"),
        SourceKind::Image => "Image Emotion Detection".to_string(),
    }
}

/// Renders annotations. Without a font only the boxes are drawn.
pub struct OverlayRenderer {
    font: Option<FontVec>,
}

impl OverlayRenderer {
    pub fn new(font: Option<FontVec>) -> Self {
        Self { font }
    }

    /// Loads `font_path` if given, otherwise the first readable system font.
    pub fn with_font_search(font_path: Option<&Path>) -> Self {
        let candidates: Vec<PathBuf> = match font_path {
            Some(p) => vec![p.to_path_buf()],
            None => SYSTEM_FONT_CANDIDATES.iter().map(PathBuf::from).collect(),
        };
        for path in &candidates {
            match load_font(path) {
                Ok(font) => {
                    log::debug!("Using overlay font {}", path.display());
                    return Self::new(Some(font));
                }
                Err(e) if font_path.is_some() => {
                    log::warn!("Could not load font {}: {e}", path.display());
                }
                Err(_) => {}
            }
        }
        log::warn!("No usable font found; overlay labels are disabled");
        Self::new(None)
    }

    #[cfg(test)]
    pub(crate) fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Annotated copy of `frame`; the frame itself is not modified.
    pub fn render(&self, frame: &Frame, detections: &[Detection], title: &str) -> RgbImage {
        let mut image = frame.to_rgb_image();

        for detection in detections {
            let b = detection.bounding_box;
            draw_thick_rect(&mut image, b.x as i32, b.y as i32, b.width, b.height);

            if let Some(font) = &self.font {
                let label = format!("{}: {:.2}", detection.dominant_emotion, detection.confidence);
                let scale = PxScale::from(LABEL_PX);
                let (_, text_h) = text_size(scale, font, &label);
                let y = (b.y as i32 - LABEL_GAP - text_h as i32).max(0);
                draw_text_mut(&mut image, BOX_COLOR, b.x as i32, y, scale, font, &label);
            }
        }

        if let Some(font) = &self.font {
            let (w, h) = image.dimensions();
            let scale = PxScale::from((w as f32 / 20.0).max(MIN_TITLE_PX));
            let padding = (h as f32 * 0.02) as i32;
            draw_text_mut(&mut image, TITLE_COLOR, padding, padding, scale, font, title);
        }

        image
    }
}

fn load_font(path: &Path) -> Result<FontVec, Box<dyn std::error::Error>> {
    let bytes = std::fs::read(path)?;
    Ok(FontVec::try_from_vec(bytes)?)
}

fn draw_thick_rect(image: &mut RgbImage, x: i32, y: i32, width: u32, height: u32) {
    for inset in 0..BOX_THICKNESS {
        let w = width.saturating_sub(2 * inset);
        let h = height.saturating_sub(2 * inset);
        if w == 0 || h == 0 {
            break;
        }
        let rect = Rect::at(x + inset as i32, y + inset as i32).of_size(w, h);
        draw_hollow_rect_mut(image, rect, BOX_COLOR);
    }
}
