pub mod camera_source;
pub mod ffmpeg_video_source;
pub mod still_image_source;
