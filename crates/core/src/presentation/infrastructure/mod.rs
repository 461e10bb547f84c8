pub mod display_channel;
pub mod overlay_renderer;
pub mod scaling;
