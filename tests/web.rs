#![cfg(target_arch = "wasm32")]

use std::cell::Cell;
use std::rc::Rc;

use js_sys::{Function, Promise};
use rain_wasm::config::Config;
use rain_wasm::error::{RainError, ShaderStage};
use rain_wasm::shader::{FRAGMENT_SHADER, VERTEX_SHADER};
use rain_wasm::{launch, Renderer};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;
use web_sys::{HtmlCanvasElement, WebGl2RenderingContext as GL};

wasm_bindgen_test_configure!(run_in_browser);

fn mount_canvas(id: &str, style: &str) -> HtmlCanvasElement {
    let document = web_sys::window().unwrap().document().unwrap();
    let canvas: HtmlCanvasElement = document
        .create_element("canvas")
        .unwrap()
        .dyn_into()
        .unwrap();
    canvas.set_id(id);
    canvas.set_attribute("style", style).unwrap();
    document.body().unwrap().append_child(&canvas).unwrap();
    canvas
}

fn test_config(id: &str) -> Config {
    Config::new(id, "missing-test-video.mp4")
}

/// The context `Renderer` created on `canvas`; WebGL hands back the same one.
fn context_of(canvas: &HtmlCanvasElement) -> GL {
    canvas.get_context("webgl2").unwrap().unwrap().dyn_into().unwrap()
}

async fn sleep(ms: i32) {
    let promise = Promise::new(&mut |resolve, _reject| {
        web_sys::window()
            .unwrap()
            .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
            .unwrap();
    });
    JsFuture::from(promise).await.unwrap();
}

/// Counts uncaught errors reaching `window.onerror` while alive.
struct ErrorWatch {
    count: Rc<Cell<u32>>,
    previous: Option<Function>,
    _handler: Closure<dyn FnMut(JsValue)>,
}

impl ErrorWatch {
    fn install() -> Self {
        let window = web_sys::window().unwrap();
        let count = Rc::new(Cell::new(0));
        let seen = count.clone();
        let handler = Closure::wrap(Box::new(move |_event: JsValue| {
            seen.set(seen.get() + 1);
        }) as Box<dyn FnMut(JsValue)>);
        let previous = window.onerror();
        window.set_onerror(Some(handler.as_ref().unchecked_ref()));
        Self { count, previous, _handler: handler }
    }

    fn count(&self) -> u32 {
        self.count.get()
    }
}

impl Drop for ErrorWatch {
    fn drop(&mut self) {
        web_sys::window().unwrap().set_onerror(self.previous.as_ref());
    }
}

#[wasm_bindgen_test]
fn pipeline_builds_and_draws() {
    let canvas = mount_canvas("rain-build", "display:block;width:64px;height:32px");
    let mut renderer = Renderer::new(canvas, &test_config("rain-build")).expect("renderer");
    renderer.frame(1000.0);
    renderer.frame(1016.0);
}

#[wasm_bindgen_test]
fn broken_fragment_shader_halts_with_diagnostic() {
    let canvas = mount_canvas("rain-broken", "display:block;width:16px;height:16px");
    let broken = FRAGMENT_SHADER.replace("gl_FragColor = result;", "gl_FragColor = undefinedColor;");
    let err = Renderer::with_shaders(canvas, &test_config("rain-broken"), VERTEX_SHADER, &broken)
        .err()
        .expect("compilation must fail");
    match err {
        RainError::ShaderCompile { stage, log } => {
            assert_eq!(stage, ShaderStage::Fragment);
            assert!(!log.is_empty());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[wasm_bindgen_test]
async fn failed_start_leaves_nothing_running() {
    let watch = ErrorWatch::install();
    let canvas = mount_canvas("rain-halted", "display:block;width:16px;height:16px");
    let broken = FRAGMENT_SHADER.replace("gl_FragColor = result;", "gl_FragColor = undefinedColor;");
    assert!(Renderer::with_shaders(canvas, &test_config("rain-halted"), VERTEX_SHADER, &broken).is_err());

    // Long enough for the missing video to 404 had it been requested.
    sleep(500).await;
    assert_eq!(watch.count(), 0, "uncaught error after a failed start");
}

#[wasm_bindgen_test]
async fn dropped_renderer_detaches_video_handlers() {
    let watch = ErrorWatch::install();
    let canvas = mount_canvas("rain-dropped", "display:block;width:16px;height:16px");
    let renderer = Renderer::new(canvas, &test_config("rain-dropped")).expect("renderer");
    drop(renderer);

    sleep(500).await;
    assert_eq!(watch.count(), 0, "uncaught error after dropping the renderer");
}

#[wasm_bindgen_test]
fn placeholder_texel_tints_dark_rain_blue() {
    let canvas = mount_canvas("rain-video", "display:block;width:16px;height:16px");
    let gl = context_of(&canvas);
    let mut renderer = Renderer::new(canvas, &test_config("rain-video")).expect("renderer");
    assert!(!renderer.video_ready());
    renderer.frame(0.0);

    let (w, h) = (renderer.canvas().width() as i32, renderer.canvas().height() as i32);
    let mut pixels = vec![0u8; (w * h * 4) as usize];
    gl.read_pixels_with_opt_u8_array(0, 0, w, h, GL::RGBA, GL::UNSIGNED_BYTE, Some(&mut pixels[..]))
        .unwrap();

    // Half of the (0, 0, 255, 255) texel lands in blue; the fix-up never
    // fires once blue reaches 0.5.
    for px in pixels.chunks_exact(4) {
        let [r, g, b, _] = [px[0], px[1], px[2], px[3]];
        assert!(b >= 127, "blue {b} below half in {px:?}");
        if g == 0 {
            assert_eq!(r, 0, "dark rain pixel {px:?}");
            assert!(b <= 128, "dark rain pixel {px:?}");
        }
    }
}

#[wasm_bindgen_test]
async fn stopping_releases_the_renderer() {
    let canvas = mount_canvas("rain-stop", "display:block;width:16px;height:16px");
    let gl = context_of(&canvas);
    let handle = launch("rain-stop", "missing-test-video.mp4").expect("launch");

    sleep(200).await;
    assert!(!gl.get_parameter(GL::CURRENT_PROGRAM).unwrap().is_null());

    handle.stop();
    assert!(!handle.running());
    sleep(200).await;
    // Dropping the renderer unbinds and deletes its program.
    assert!(gl.get_parameter(GL::CURRENT_PROGRAM).unwrap().is_null());
}

#[wasm_bindgen_test]
fn backing_store_follows_css_size() {
    let canvas = mount_canvas("rain-resize", "display:block;width:120px;height:80px");
    let mut renderer = Renderer::new(canvas, &test_config("rain-resize")).expect("renderer");

    renderer.frame(0.0);
    assert_eq!((renderer.canvas().width(), renderer.canvas().height()), (120, 80));
    assert!(!renderer.sync_viewport(), "unchanged size must not resize again");

    renderer
        .canvas()
        .set_attribute("style", "display:block;width:200px;height:50px")
        .unwrap();
    renderer.frame(16.0);
    assert_eq!((renderer.canvas().width(), renderer.canvas().height()), (200, 50));
}
