use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{Document, Event, HtmlVideoElement, WebGl2RenderingContext as GL, WebGlTexture};

use crate::config::Config;
use crate::error::RainError;
use crate::frame;

/// Looping, muted `<video>` plus the texture its frames are copied into.
///
/// The element decodes on its own schedule; [`VideoTexture::refresh`] polls
/// it and leaves the texture alone until a frame is available, so the
/// placeholder (or the last good frame) stays visible through stalls.
///
/// Dropping it detaches the handlers and stops the element from loading.
/// The texture is released by the owner through [`VideoTexture::release`],
/// since that needs the GL context.
pub struct VideoTexture {
    video: HtmlVideoElement,
    texture: WebGlTexture,
    // Held so the element's handlers stay alive as long as the texture.
    _on_error: Closure<dyn FnMut(Event)>,
    _on_loaded: Closure<dyn FnMut(Event)>,
}

impl VideoTexture {
    pub fn new(gl: &GL, document: &Document, config: &Config) -> Result<Self, RainError> {
        let video: HtmlVideoElement = document
            .create_element("video")
            .map_err(|e| RainError::js(&e))?
            .dyn_into()
            .map_err(|_| RainError::Allocation("video element"))?;

        video.set_src(&config.video_src);
        video.set_autoplay(true);
        video.set_loop(true);
        video.set_muted(true);
        video.set_cross_origin(Some("anonymous"));
        video.set_attribute("playsinline", "true").ok();

        let src = config.video_src.clone();
        let on_error = Closure::wrap(Box::new(move |_event: Event| {
            log::error!("failed to load video {src}");
        }) as Box<dyn FnMut(Event)>);
        video.set_onerror(Some(on_error.as_ref().unchecked_ref()));

        let src = config.video_src.clone();
        let on_loaded = Closure::wrap(Box::new(move |_event: Event| {
            log::info!("video {src} loaded");
        }) as Box<dyn FnMut(Event)>);
        video.set_onloadeddata(Some(on_loaded.as_ref().unchecked_ref()));

        match video.play() {
            Ok(promise) => {
                // The play promise can settle after this texture is gone (a
                // pause on drop rejects it), so JS keeps the handler.
                let on_play_rejected = Closure::wrap(Box::new(move |reason: JsValue| {
                    log::warn!("video playback did not start: {}", RainError::js(&reason));
                }) as Box<dyn FnMut(JsValue)>);
                let _ = promise.catch(&on_play_rejected);
                on_play_rejected.forget();
            }
            Err(err) => log::warn!("video playback did not start: {}", RainError::js(&err)),
        }

        let texture = placeholder_texture(gl, config.placeholder_texel)?;

        Ok(Self {
            video,
            texture,
            _on_error: on_error,
            _on_loaded: on_loaded,
        })
    }

    pub fn has_current_frame(&self) -> bool {
        frame::has_current_frame(self.video.ready_state())
    }

    /// Copy the current video frame into the texture when one is available.
    /// Returns whether an upload happened.
    pub fn refresh(&self, gl: &GL) -> bool {
        if !self.has_current_frame() {
            return false;
        }
        gl.bind_texture(GL::TEXTURE_2D, Some(&self.texture));
        match gl.tex_image_2d_with_u32_and_u32_and_html_video_element(
            GL::TEXTURE_2D,
            0,
            GL::RGBA as i32,
            GL::RGBA,
            GL::UNSIGNED_BYTE,
            &self.video,
        ) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("video frame upload failed: {}", RainError::js(&err));
                false
            }
        }
    }

    pub fn bind(&self, gl: &GL, unit: u32) {
        gl.active_texture(GL::TEXTURE0 + unit);
        gl.bind_texture(GL::TEXTURE_2D, Some(&self.texture));
    }

    pub fn release(&self, gl: &GL) {
        gl.delete_texture(Some(&self.texture));
    }
}

impl Drop for VideoTexture {
    fn drop(&mut self) {
        // The closures die with `self`; JS must not call them afterwards.
        self.video.set_onerror(None);
        self.video.set_onloadeddata(None);
        if let Err(err) = self.video.pause() {
            log::debug!("pausing video on drop failed: {}", RainError::js(&err));
        }
        self.video.remove_attribute("src").ok();
        self.video.load();
    }
}

fn placeholder_texture(gl: &GL, texel: [u8; 4]) -> Result<WebGlTexture, RainError> {
    let texture = gl.create_texture().ok_or(RainError::Allocation("texture"))?;
    gl.bind_texture(GL::TEXTURE_2D, Some(&texture));
    gl.tex_image_2d_with_i32_and_i32_and_i32_and_format_and_type_and_opt_u8_array(
        GL::TEXTURE_2D,
        0,
        GL::RGBA as i32,
        1,
        1,
        0,
        GL::RGBA,
        GL::UNSIGNED_BYTE,
        Some(&texel[..]),
    )
    .map_err(|e| RainError::js(&e))?;

    gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_WRAP_S, GL::CLAMP_TO_EDGE as i32);
    gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_WRAP_T, GL::CLAMP_TO_EDGE as i32);
    gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_MIN_FILTER, GL::LINEAR as i32);
    gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_MAG_FILTER, GL::LINEAR as i32);
    Ok(texture)
}
