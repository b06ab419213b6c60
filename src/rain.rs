//! CPU model of the rain fragment program.
//!
//! Every function here mirrors a step of [`crate::shader::FRAGMENT_SHADER`] in
//! `f32`, using GLSL's `fract`/`mod` conventions (floor based, so negative
//! inputs wrap into `[0, 1)` and `[0, y)`). The model is a pure function of the
//! fragment and the sampled video texel; it holds no state between calls.

use std::ops::{Add, Mul};

pub const RAIN_SPEED: f32 = 1.75;
pub const DROP_SIZE: f32 = 3.0;

/// Vertical pitch of one character cell in `ry` units.
const CELL_PITCH: f32 = 15.0;
/// Lit span of a cell (and of a column slot, scaled by `DROP_SIZE`).
const GLYPH_SPAN: f32 = 12.0;
/// Rows whose hash exceeds this re-roll their glyphs three times a second.
const BURST_THRESHOLD: f32 = 0.98;
const VIDEO_WEIGHT: f32 = 0.5;

/// Per-layer tuning. Layer 1 is nudged right and scrolls on narrower speed
/// columns so the two sheets never line up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerParams {
    pub shift: f32,
    pub speed_column: f32,
    pub row_scale: f32,
}

pub const LAYERS: [LayerParams; 2] = [
    LayerParams { shift: 0.0, speed_column: 15.0, row_scale: 600.0 },
    LayerParams { shift: 0.05, speed_column: 12.0, row_scale: 700.0 },
];

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Normalise an 8-bit texel the way `texture2D` does.
    pub fn from_texel(texel: [u8; 4]) -> Self {
        let [r, g, b, a] = texel.map(|c| c as f32 / 255.0);
        Self { r, g, b, a }
    }

    pub fn to_bits(self) -> [u32; 4] {
        [self.r.to_bits(), self.g.to_bits(), self.b.to_bits(), self.a.to_bits()]
    }
}

impl Add for Rgba {
    type Output = Rgba;

    fn add(self, rhs: Rgba) -> Rgba {
        Rgba::new(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b, self.a + rhs.a)
    }
}

impl Mul<f32> for Rgba {
    type Output = Rgba;

    fn mul(self, k: f32) -> Rgba {
        Rgba::new(self.r * k, self.g * k, self.b * k, self.a * k)
    }
}

/// Inputs the fragment program sees for one pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fragment {
    /// `gl_FragCoord.xy`: pixel centre, origin bottom-left.
    pub coord: [f32; 2],
    /// Interpolated `vTextureCoord`; `v` grows downwards.
    pub tex_coord: [f32; 2],
    pub resolution: [f32; 2],
    /// `iTime` in seconds.
    pub time: f32,
}

impl Fragment {
    /// Fragment for pixel `(px, py)` counted from the bottom-left corner of a
    /// `resolution` sized target.
    pub fn at_pixel(px: u32, py: u32, resolution: [f32; 2], time: f32) -> Self {
        let coord = [px as f32 + 0.5, py as f32 + 0.5];
        Self {
            coord,
            tex_coord: [coord[0] / resolution[0], 1.0 - coord[1] / resolution[1]],
            resolution,
            time,
        }
    }
}

pub fn fract(x: f32) -> f32 {
    x - x.floor()
}

/// GLSL `mod`: result takes the sign of `y`.
pub fn glsl_mod(x: f32, y: f32) -> f32 {
    x - y * (x / y).floor()
}

/// The classic `fract(sin(dot(seed, k)) * 43758.5453)` hash, in `[0, 1)`.
pub fn rand(seed: [f32; 2]) -> f32 {
    fract((seed[0] * 12.9898 + seed[1] * 78.233).sin() * 43758.5453)
}

/// 1.0 when the glyph sub-cell `inner` of row `outer.y` is lit.
pub fn glyph(outer: [f32; 2], inner: [f32; 2], global_time: f32) -> f32 {
    let row = outer[1];
    let mut seed = [(inner[0] * 4.0).floor() + row, (inner[1] * 4.0).floor() + row];
    if rand([row, 23.0]) > BURST_THRESHOLD {
        let flicker = ((global_time + rand([row, 49.0])) * 3.0).floor();
        seed[0] += flicker;
        seed[1] += flicker;
    }
    if rand(seed) > 0.5 { 1.0 } else { 0.0 }
}

/// Trail colour for cell row `row`: black at the tail, green through the
/// body, whitening over the last fifth before the head.
pub fn depth_color(row: f32) -> [f32; 3] {
    let depth = (glsl_mod(-row, 24.0) - 4.0).max(0.0) / 20.0;
    if depth < 0.8 {
        [0.0, depth / 0.8, 0.0]
    } else {
        let t = (depth - 0.8) / 0.2;
        // mix((0,1,0), (1,1,1), t)
        [t, 1.0, t]
    }
}

pub fn layer(frag: &Fragment, position: [f32; 2], params: &LayerParams, global_time: f32) -> Rgba {
    let rx = frag.coord[0] / (40.0 * DROP_SIZE);
    let mx = 40.0 * DROP_SIZE * fract(position[0] * 30.0 * DROP_SIZE);
    if mx > GLYPH_SPAN * DROP_SIZE {
        return Rgba::TRANSPARENT;
    }

    let x = rx.floor();
    let r1x = (frag.coord[0] / params.speed_column).floor();
    let ry = position[1] * params.row_scale
        + rand([x, x * 3.0]) * 100000.0
        + global_time * rand([r1x, 23.0]) * 120.0;
    let my = glsl_mod(ry, CELL_PITCH);
    if my > GLYPH_SPAN * DROP_SIZE {
        return Rgba::TRANSPARENT;
    }

    let y = (ry / CELL_PITCH).floor();
    let lit = glyph([rx, y], [mx / GLYPH_SPAN, my / GLYPH_SPAN], global_time);
    let [r, g, b] = depth_color(y);
    Rgba::new(r * lit, g * lit, b * lit, 1.0)
}

/// Both rain layers summed, before video and the blue fix-up.
pub fn rain(frag: &Fragment) -> Rgba {
    let aspect = frag.resolution[0] / frag.resolution[1];
    let position = [frag.tex_coord[0] * aspect, frag.tex_coord[1]];
    let global_time = frag.time * RAIN_SPEED;

    // The shift accumulates, matching `position.x += 0.05` between layers.
    let mut x = position[0];
    LAYERS.iter().fold(Rgba::TRANSPARENT, |acc, params| {
        x += params.shift;
        acc + layer(frag, [x, position[1]], params, global_time)
    })
}

pub fn composite_video(rain: Rgba, video: Rgba) -> Rgba {
    rain + video * VIDEO_WEIGHT
}

/// Rain-dominated pixels take half their green as blue, so the video blend
/// cannot tint them.
pub fn blue_fixup(mut color: Rgba) -> Rgba {
    if color.b < 0.5 {
        color.b = color.g * 0.5;
    }
    color
}

/// Final colour for one fragment. `video` is the sampled texel; `None` drops
/// the video term entirely.
pub fn shade(frag: &Fragment, video: Option<Rgba>) -> Rgba {
    let rain = rain(frag);
    let color = match video {
        Some(texel) => composite_video(rain, texel),
        None => rain,
    };
    blue_fixup(color)
}
