use std::cell::{Cell, RefCell};
use std::rc::Rc;

use js_sys::Float32Array;
use wasm_bindgen::prelude::*;
use web_sys::{window, HtmlCanvasElement, WebGl2RenderingContext as GL, WebGlBuffer};

use super::program::ShaderProgram;
use super::video::VideoTexture;
use crate::config::Config;
use crate::error::RainError;
use crate::frame::{display_dimension, BackingStore, FrameClock};
use crate::shader;

/// Full-screen quad as a triangle strip, in clip space.
const QUAD_POSITIONS: [f32; 8] = [-1.0, -1.0, 1.0, -1.0, -1.0, 1.0, 1.0, 1.0];
/// Top of the screen samples `v = 0`, the first row of the video frame.
const QUAD_TEX_COORDS: [f32; 8] = [0.0, 1.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0];
const QUAD_VERTICES: i32 = 4;

struct QuadBuffers {
    position: WebGlBuffer,
    tex_coord: WebGlBuffer,
}

impl QuadBuffers {
    fn upload(gl: &GL) -> Result<Self, RainError> {
        Ok(Self {
            position: static_buffer(gl, &QUAD_POSITIONS)?,
            tex_coord: static_buffer(gl, &QUAD_TEX_COORDS)?,
        })
    }

    fn bind(&self, gl: &GL, program: &ShaderProgram) {
        for (buffer, location) in [(&self.position, program.position), (&self.tex_coord, program.tex_coord)] {
            let Some(location) = location else { continue };
            gl.bind_buffer(GL::ARRAY_BUFFER, Some(buffer));
            gl.vertex_attrib_pointer_with_i32(location, 2, GL::FLOAT, false, 0, 0);
            gl.enable_vertex_attrib_array(location);
        }
    }
}

fn static_buffer(gl: &GL, data: &[f32]) -> Result<WebGlBuffer, RainError> {
    let buffer = gl.create_buffer().ok_or(RainError::Allocation("vertex buffer"))?;
    gl.bind_buffer(GL::ARRAY_BUFFER, Some(&buffer));
    gl.buffer_data_with_array_buffer_view(GL::ARRAY_BUFFER, &Float32Array::from(data), GL::STATIC_DRAW);
    Ok(buffer)
}

/// Every GPU object the effect needs, created once and owned by the frame
/// loop until it is stopped. Dropping it releases the GL objects and
/// unloads the video.
pub struct Renderer {
    gl: GL,
    canvas: HtmlCanvasElement,
    program: ShaderProgram,
    video: VideoTexture,
    quad: QuadBuffers,
    clock: FrameClock,
    clear_color: [f32; 4],
}

impl Renderer {
    pub fn new(canvas: HtmlCanvasElement, config: &Config) -> Result<Self, RainError> {
        Self::with_shaders(canvas, config, shader::VERTEX_SHADER, shader::FRAGMENT_SHADER)
    }

    /// Like [`Renderer::new`] with caller-supplied GLSL.
    pub fn with_shaders(
        canvas: HtmlCanvasElement,
        config: &Config,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Self, RainError> {
        let gl: GL = canvas
            .get_context("webgl2")
            .map_err(|_| RainError::ContextUnavailable)?
            .ok_or(RainError::ContextUnavailable)?
            .dyn_into()
            .map_err(|_| RainError::ContextUnavailable)?;
        let document = window()
            .ok_or(RainError::NoWindow)?
            .document()
            .ok_or(RainError::NoDocument)?;

        // Link first: a shader failure must halt before the video starts loading.
        let program = ShaderProgram::link(&gl, vertex_source, fragment_source)?;
        let quad = QuadBuffers::upload(&gl)?;
        let video = VideoTexture::new(&gl, &document, config)?;
        log::info!("rain pipeline ready on {}x{} canvas", canvas.width(), canvas.height());

        Ok(Self {
            gl,
            canvas,
            program,
            video,
            quad,
            clock: FrameClock::new(),
            clear_color: config.clear_color,
        })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    pub fn video_ready(&self) -> bool {
        self.video.has_current_frame()
    }

    /// Resize the backing store to the layout size. Returns whether anything
    /// changed; an unchanged size touches no GPU state.
    pub fn sync_viewport(&self) -> bool {
        let mut store = BackingStore::new(self.canvas.width(), self.canvas.height());
        let display_w = display_dimension(self.canvas.client_width());
        let display_h = display_dimension(self.canvas.client_height());
        match store.fit(display_w, display_h) {
            Some((w, h)) => {
                self.canvas.set_width(w);
                self.canvas.set_height(h);
                self.gl.viewport(0, 0, w as i32, h as i32);
                log::debug!("backing store resized to {w}x{h}");
                true
            }
            None => false,
        }
    }

    /// Draw one frame for the `requestAnimationFrame` timestamp `now_ms`.
    pub fn frame(&mut self, now_ms: f64) {
        let time = self.clock.tick(now_ms);
        self.sync_viewport();

        let gl = &self.gl;
        let [r, g, b, a] = self.clear_color;
        gl.clear_color(r, g, b, a);
        gl.clear(GL::COLOR_BUFFER_BIT);

        gl.use_program(Some(&self.program.program));
        self.video.refresh(gl);

        gl.uniform1f(self.program.time.as_ref(), time);
        gl.uniform2f(
            self.program.resolution.as_ref(),
            self.canvas.width() as f32,
            self.canvas.height() as f32,
        );
        self.video.bind(gl, 0);
        gl.uniform1i(self.program.channel0.as_ref(), 0);

        self.quad.bind(gl, &self.program);
        gl.draw_arrays(GL::TRIANGLE_STRIP, 0, QUAD_VERTICES);
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        let gl = &self.gl;
        gl.use_program(None);
        gl.delete_program(Some(&self.program.program));
        gl.delete_buffer(Some(&self.quad.position));
        gl.delete_buffer(Some(&self.quad.tex_coord));
        self.video.release(gl);
    }
}

/// Keeps a running rain loop cancellable from JS.
#[wasm_bindgen]
#[derive(Clone)]
pub struct RainHandle {
    running: Rc<Cell<bool>>,
}

#[wasm_bindgen]
impl RainHandle {
    /// Stop before the next frame and release the renderer. The loop cannot
    /// be restarted.
    pub fn stop(&self) {
        self.running.set(false);
    }

    #[wasm_bindgen(getter)]
    pub fn running(&self) -> bool {
        self.running.get()
    }
}

fn request_frame(callback: &Closure<dyn FnMut(f64)>) -> Result<i32, JsValue> {
    window()
        .ok_or(RainError::NoWindow)?
        .request_animation_frame(callback.as_ref().unchecked_ref())
}

/// Hand `renderer` to a self-rescheduling animation-frame callback.
///
/// Once the handle is stopped the next callback drops the renderer and does
/// not reschedule.
pub fn start(renderer: Renderer) -> Result<RainHandle, JsValue> {
    let running = Rc::new(Cell::new(true));
    let flag = running.clone();
    let mut renderer = Some(renderer);

    // `f` holds the animation-frame closure so it can schedule itself again;
    // the `Option` lets the closure exist before it refers to itself.
    let f: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |now: f64| {
        if !flag.get() {
            if renderer.take().is_some() {
                log::info!("rain loop stopped");
            }
            return;
        }
        let Some(active) = renderer.as_mut() else { return };
        active.frame(now);

        if let Some(callback) = f.borrow().as_ref() {
            if let Err(err) = request_frame(callback) {
                log::error!("could not schedule next frame: {}", RainError::js(&err));
                flag.set(false);
                renderer = None;
            }
        }
    }) as Box<dyn FnMut(f64)>));

    if let Some(callback) = g.borrow().as_ref() {
        request_frame(callback)?;
    }
    Ok(RainHandle { running })
}
