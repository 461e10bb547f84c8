use image::RgbImage;

/// Background hint for the summary text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextStyle {
    /// At least one face: green.
    Detected,
    /// Live session, no face in this frame: yellow.
    NoFace,
    /// Still image without a face: red.
    Failed,
}

impl TextStyle {
    pub fn rgb(&self) -> [u8; 3] {
        match self {
            TextStyle::Detected => [0, 255, 0],
            TextStyle::NoFace => [255, 255, 0],
            TextStyle::Failed => [255, 0, 0],
        }
    }
}

/// A render command sent from the worker to whoever owns the display.
#[derive(Clone, Debug, PartialEq)]
pub enum DisplayCommand {
    /// Replace the image surface (already letterboxed to the display size)
    /// and the summary text.
    Show {
        image: RgbImage,
        text: String,
        style: TextStyle,
    },
    /// Blank the image surface.
    Clear,
}

/// Receives render commands. Implementations are shared with the capture
/// worker thread and must never block it for long.
pub trait DisplaySink: Send + Sync {
    fn publish(&self, command: DisplayCommand);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_colours() {
        assert_eq!(TextStyle::Detected.rgb(), [0, 255, 0]);
        assert_eq!(TextStyle::NoFace.rgb(), [255, 255, 0]);
        assert_eq!(TextStyle::Failed.rgb(), [255, 0, 0]);
    }
}
