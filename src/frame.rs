//! Per-frame bookkeeping that does not touch the GPU: the animation clock,
//! backing-store sizing and video readiness.

/// `HTMLMediaElement.HAVE_CURRENT_DATA`.
pub const HAVE_CURRENT_DATA: u16 = 2;

/// True once the media element can hand out the frame at its current position.
pub fn has_current_frame(ready_state: u16) -> bool {
    ready_state >= HAVE_CURRENT_DATA
}

/// Elapsed time since the first frame callback.
///
/// The zero point is latched lazily so that the first rendered frame is
/// always `t = 0`, however long initialisation took.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct FrameClock {
    origin_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_latched(&self) -> bool {
        self.origin_ms.is_some()
    }

    /// Seconds elapsed at `now_ms`, latching the origin on the first call.
    pub fn tick(&mut self, now_ms: f64) -> f32 {
        let origin = *self.origin_ms.get_or_insert(now_ms);
        ((now_ms - origin) * 0.001) as f32
    }
}

/// Pixel dimensions of a canvas backing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackingStore {
    pub width: u32,
    pub height: u32,
}

impl BackingStore {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Match the backing store to the displayed size. Returns the new size
    /// when it changed, `None` when it was already in sync.
    pub fn fit(&mut self, display_width: u32, display_height: u32) -> Option<(u32, u32)> {
        if self.width == display_width && self.height == display_height {
            return None;
        }
        self.width = display_width;
        self.height = display_height;
        Some((display_width, display_height))
    }
}

/// Layout sizes arrive as `i32`; a detached element can report negatives.
pub fn display_dimension(client: i32) -> u32 {
    u32::try_from(client).unwrap_or(0)
}
