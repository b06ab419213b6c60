//! Full-screen "digital rain" composited over a looping video, drawn by a
//! single WebGL fragment pass.
//!
//! The formula, clock and sizing logic live in target-independent modules so
//! they can be tested on the host; everything that touches the browser is
//! compiled only for `wasm32`.

pub mod config;
pub mod error;
pub mod frame;
pub mod rain;
pub mod shader;

// Only compile wasm-specific code when targeting wasm32.

#[cfg(target_arch = "wasm32")]
mod wasm {
    use std::cell::RefCell;

    use wasm_bindgen::prelude::*;
    use web_sys::HtmlCanvasElement;

    use crate::config::{Config, VIDEO_SRC_ATTRIBUTE};
    use crate::error::RainError;

    mod program;
    mod render;
    mod video;

    pub use render::{RainHandle, Renderer};

    thread_local! {
        static ACTIVE: RefCell<Option<RainHandle>> = const { RefCell::new(None) };
    }

    fn find_canvas(id: &str) -> Result<HtmlCanvasElement, RainError> {
        let window = web_sys::window().ok_or(RainError::NoWindow)?;
        let document = window.document().ok_or(RainError::NoDocument)?;
        document
            .get_element_by_id(id)
            .ok_or_else(|| RainError::CanvasNotFound(id.to_string()))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| RainError::NotACanvas(id.to_string()))
    }

    /// Log a fatal start-up error and show it to the user.
    fn alert(err: RainError) -> JsValue {
        log::error!("{err}");
        if let Some(window) = web_sys::window() {
            let _ = window.alert_with_message(&err.to_string());
        }
        err.into()
    }

    fn run(canvas: HtmlCanvasElement, config: &Config) -> Result<RainHandle, JsValue> {
        let renderer = Renderer::new(canvas, config).map_err(alert)?;
        render::start(renderer)
    }

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).ok();

        let defaults = Config::default();
        let canvas = match find_canvas(&defaults.canvas_id) {
            Ok(canvas) => canvas,
            Err(RainError::CanvasNotFound(id)) => {
                log::info!("no #{id} on the page, waiting for launch()");
                return Ok(());
            }
            Err(err) => return Err(alert(err)),
        };
        let config = defaults.with_video_src(canvas.get_attribute(VIDEO_SRC_ATTRIBUTE));

        let handle = run(canvas, &config)?;
        ACTIVE.with(|active| *active.borrow_mut() = Some(handle));
        Ok(())
    }

    /// Start the effect on an arbitrary canvas, for pages that embed it
    /// themselves.
    #[wasm_bindgen]
    pub fn launch(canvas_id: &str, video_src: &str) -> Result<RainHandle, JsValue> {
        let config = Config::new(canvas_id, video_src);
        let canvas = find_canvas(canvas_id).map_err(alert)?;
        run(canvas, &config)
    }

    /// Stop the instance started automatically on `#glCanvas`, if any.
    #[wasm_bindgen]
    pub fn stop() {
        ACTIVE.with(|active| {
            if let Some(handle) = active.borrow_mut().take() {
                handle.stop();
            }
        });
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm::{launch, stop, RainHandle, Renderer};
