use std::path::PathBuf;

use crate::capture::domain::frame_source::{FrameSource, SourceError, SourceInfo, SourceKind};
use crate::shared::constants::ASSUMED_CAMERA_FPS;
use crate::shared::frame::Frame;

/// Decodes a video file via ffmpeg-next (libavformat + libavcodec).
///
/// Each decoded frame is converted to RGB24 and wrapped in a [`Frame`].
/// Frames are decoded lazily, one per [`FrameSource::read`].
pub struct FfmpegVideoSource {
    path: PathBuf,
    state: Option<DecodeState>,
}

struct DecodeState {
    ictx: ffmpeg_next::format::context::Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: ffmpeg_next::software::scaling::Context,
    width: u32,
    height: u32,
    video_stream_index: usize,
    frame_index: usize,
    flushing: bool,
    done: bool,
}

impl FfmpegVideoSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            state: None,
        }
    }

    fn open_err(&self, reason: impl ToString) -> SourceError {
        SourceError::Open {
            target: self.path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

impl FrameSource for FfmpegVideoSource {
    fn open(&mut self) -> Result<SourceInfo, SourceError> {
        self.close();
        ffmpeg_next::init().map_err(|e| self.open_err(e))?;

        let ictx = ffmpeg_next::format::input(&self.path).map_err(|e| self.open_err(e))?;

        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or_else(|| self.open_err("no video stream found"))?;
        let video_stream_index = stream.index();
        let native_fps = probe_fps(stream.rate());

        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())
            .map_err(|e| self.open_err(e))?;
        let decoder = codec_ctx.decoder().video().map_err(|e| self.open_err(e))?;

        let width = decoder.width();
        let height = decoder.height();
        let scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )
        .map_err(|e| self.open_err(e))?;

        log::info!(
            "Opened {} ({}x{} @ {:.2} fps)",
            self.path.display(),
            width,
            height,
            native_fps
        );

        self.state = Some(DecodeState {
            ictx,
            decoder,
            scaler,
            width,
            height,
            video_stream_index,
            frame_index: 0,
            flushing: false,
            done: false,
        });

        Ok(SourceInfo {
            kind: SourceKind::Video,
            native_fps,
            width,
            height,
        })
    }

    fn read(&mut self) -> Result<Option<Frame>, SourceError> {
        let state = self.state.as_mut().ok_or(SourceError::NotOpen)?;
        state.next_frame()
    }

    fn close(&mut self) {
        if self.state.take().is_some() {
            log::debug!("Closed {}", self.path.display());
        }
    }

    fn is_open(&self) -> bool {
        self.state.is_some()
    }
}

impl DecodeState {
    fn try_receive(&mut self) -> Option<Result<Frame, SourceError>> {
        let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
        if self.decoder.receive_frame(&mut decoded).is_err() {
            return None;
        }
        let mut rgb_frame = ffmpeg_next::util::frame::video::Video::empty();
        if let Err(e) = self.scaler.run(&decoded, &mut rgb_frame) {
            self.frame_index += 1;
            return Some(Err(SourceError::Decode(e.to_string())));
        }

        let pixels = extract_rgb_pixels(&rgb_frame, self.width, self.height);
        let frame = Frame::new(pixels, self.width, self.height, self.frame_index);
        self.frame_index += 1;
        Some(Ok(frame))
    }

    fn next_frame(&mut self) -> Result<Option<Frame>, SourceError> {
        if self.done {
            return Ok(None);
        }

        if let Some(result) = self.try_receive() {
            return result.map(Some);
        }

        if self.flushing {
            self.done = true;
            return Ok(None);
        }

        loop {
            let Some((stream, packet)) = self.ictx.packets().next() else {
                let _ = self.decoder.send_eof();
                self.flushing = true;
                if let Some(result) = self.try_receive() {
                    return result.map(Some);
                }
                self.done = true;
                return Ok(None);
            };

            if stream.index() != self.video_stream_index {
                continue;
            }

            if let Err(e) = self.decoder.send_packet(&packet) {
                log::debug!("Skipping undecodable packet: {e}");
                continue;
            }

            if let Some(result) = self.try_receive() {
                return result.map(Some);
            }
        }
    }
}

/// Stream frame rate, or the assumed camera rate when the container does
/// not report one.
fn probe_fps(rate: ffmpeg_next::Rational) -> f64 {
    if rate.denominator() != 0 && rate.numerator() > 0 {
        rate.numerator() as f64 / rate.denominator() as f64
    } else {
        log::warn!("Video frame rate unknown; assuming {ASSUMED_CAMERA_FPS} fps");
        ASSUMED_CAMERA_FPS
    }
}

/// Copies pixel data from an ffmpeg frame into a tightly-packed RGB buffer,
/// dropping any per-row stride padding.
fn extract_rgb_pixels(
    rgb_frame: &ffmpeg_next::util::frame::video::Video,
    width: u32,
    height: u32,
) -> Vec<u8> {
    let stride = rgb_frame.stride(0);
    let data = rgb_frame.data(0);
    let w = width as usize;
    let h = height as usize;

    let mut pixels = Vec::with_capacity(w * h * 3);
    for row in 0..h {
        let row_start = row * stride;
        pixels.extend_from_slice(&data[row_start..row_start + w * 3]);
    }
    pixels
}
