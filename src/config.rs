//! Fixed defaults for the rain page, with the one overlay the canvas element
//! can carry (`data-video-src`).

/// Element id of the canvas the effect renders into.
pub const DEFAULT_CANVAS_ID: &str = "glCanvas";

/// Relative path of the looping background video.
pub const DEFAULT_VIDEO_SRC: &str = "video.mp4";

/// Canvas attribute that overrides [`Config::video_src`].
pub const VIDEO_SRC_ATTRIBUTE: &str = "data-video-src";

/// Texel shown until the video has a frame: opaque blue.
pub const PLACEHOLDER_TEXEL: [u8; 4] = [0, 0, 255, 255];

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub canvas_id: String,
    pub video_src: String,
    /// RGBA the framebuffer is cleared to before each draw.
    pub clear_color: [f32; 4],
    pub placeholder_texel: [u8; 4],
}

impl Default for Config {
    fn default() -> Self {
        Self {
            canvas_id: DEFAULT_CANVAS_ID.to_string(),
            video_src: DEFAULT_VIDEO_SRC.to_string(),
            clear_color: [0.0, 0.0, 0.0, 1.0],
            placeholder_texel: PLACEHOLDER_TEXEL,
        }
    }
}

impl Config {
    pub fn new(canvas_id: impl Into<String>, video_src: impl Into<String>) -> Self {
        Self {
            canvas_id: canvas_id.into(),
            video_src: video_src.into(),
            ..Self::default()
        }
    }

    /// Replace the video path when `src` holds something other than whitespace.
    pub fn with_video_src(mut self, src: Option<String>) -> Self {
        if let Some(src) = src {
            let trimmed = src.trim();
            if !trimmed.is_empty() {
                self.video_src = trimmed.to_string();
            }
        }
        self
    }
}
