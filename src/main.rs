//! Host-side helper: `cargo run` packs the wasm bundle into `static/pkg` and
//! serves `static/` locally so the rain page can be opened in a browser.

use std::process::{Command, ExitCode};

const ADDR: &str = "127.0.0.1";
const PORT: &str = "8000";

fn pack_wasm() -> Result<(), String> {
    println!("Building WASM pkg …");
    let status = Command::new("wasm-pack")
        .args(["build", "--release", "--target", "web", "--out-dir", "static/pkg"])
        .status()
        .map_err(|_| "wasm-pack not found in PATH (https://rustwasm.github.io/wasm-pack/)".to_string())?;
    if status.success() {
        Ok(())
    } else {
        Err(format!("wasm-pack exited with {status}"))
    }
}

fn serve() -> Result<(), String> {
    println!("Serving static/ at http://{ADDR}:{PORT} (page expects static/video.mp4) …");
    let status = Command::new("python3")
        .args(["-m", "http.server", PORT, "--bind", ADDR, "--directory", "static"])
        .status()
        .map_err(|e| format!("failed to start http server: {e}"))?;
    if status.success() {
        Ok(())
    } else {
        Err(format!("http server exited with {status}"))
    }
}

fn main() -> ExitCode {
    if let Err(err) = pack_wasm() {
        eprintln!("{err}");
        if !std::path::Path::new("static/pkg").exists() {
            return ExitCode::FAILURE;
        }
        eprintln!("serving the previously built bundle");
    }
    match serve() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
