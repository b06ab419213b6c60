//! GLSL ES 1.00 sources for the full-screen rain pass.
//!
//! The fragment program is the GPU twin of [`crate::rain`]; the tuning
//! `#define`s here must stay equal to the constants there.

pub const TIME_UNIFORM: &str = "iTime";
pub const RESOLUTION_UNIFORM: &str = "iResolution";
pub const CHANNEL0_UNIFORM: &str = "iChannel0";
pub const POSITION_ATTRIBUTE: &str = "aVertexPosition";
pub const TEX_COORD_ATTRIBUTE: &str = "aTextureCoord";

/// Pass-through: clip-space position and texture coordinate, untouched.
pub const VERTEX_SHADER: &str = r#"
attribute vec4 aVertexPosition;
attribute vec2 aTextureCoord;
varying vec2 vTextureCoord;

void main() {
    gl_Position = aVertexPosition;
    vTextureCoord = aTextureCoord;
}
"#;

pub const FRAGMENT_SHADER: &str = r#"
precision highp float;

uniform float iTime;
uniform vec2 iResolution;
uniform sampler2D iChannel0;
varying vec2 vTextureCoord;

#define RAIN_SPEED 1.75
#define DROP_SIZE 3.0

float rand(vec2 seed) {
    return fract(sin(dot(seed, vec2(12.9898, 78.233))) * 43758.5453);
}

float glyph(vec2 outer, vec2 inner, float globalTime) {
    vec2 seed = floor(inner * 4.0) + outer.y;
    if (rand(vec2(outer.y, 23.0)) > 0.98) {
        seed += floor((globalTime + rand(vec2(outer.y, 49.0))) * 3.0);
    }
    return float(rand(seed) > 0.5);
}

vec3 depthColor(float row) {
    float depth = max(mod(-row, 24.0) - 4.0, 0.0) / 20.0;
    return depth < 0.8
        ? vec3(0.0, depth / 0.8, 0.0)
        : mix(vec3(0.0, 1.0, 0.0), vec3(1.0), (depth - 0.8) / 0.2);
}

vec4 layer(vec2 fragCoord, vec2 position, float speedColumn, float rowScale, float globalTime) {
    float rx = fragCoord.x / (40.0 * DROP_SIZE);
    float mx = 40.0 * DROP_SIZE * fract(position.x * 30.0 * DROP_SIZE);
    if (mx > 12.0 * DROP_SIZE) {
        return vec4(0.0);
    }
    float x = floor(rx);
    float r1x = floor(fragCoord.x / speedColumn);
    float ry = position.y * rowScale
        + rand(vec2(x, x * 3.0)) * 100000.0
        + globalTime * rand(vec2(r1x, 23.0)) * 120.0;
    float my = mod(ry, 15.0);
    if (my > 12.0 * DROP_SIZE) {
        return vec4(0.0);
    }
    float y = floor(ry / 15.0);
    float lit = glyph(vec2(rx, y), vec2(mx, my) / 12.0, globalTime);
    return vec4(depthColor(y) * lit, 1.0);
}

void main() {
    vec2 fragCoord = gl_FragCoord.xy;
    vec2 position = vTextureCoord;
    position.x *= iResolution.x / iResolution.y;
    float globalTime = iTime * RAIN_SPEED;

    vec4 result = layer(fragCoord, position, 15.0, 600.0, globalTime);
    position.x += 0.05;
    result += layer(fragCoord, position, 12.0, 700.0, globalTime);

    result += texture2D(iChannel0, vTextureCoord) * 0.5;
    if (result.b < 0.5) {
        result.b = result.g * 0.5;
    }
    gl_FragColor = result;
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rain::{DROP_SIZE, LAYERS, RAIN_SPEED};

    #[test]
    fn defines_agree_with_cpu_model() {
        assert!(FRAGMENT_SHADER.contains(&format!("#define RAIN_SPEED {RAIN_SPEED:?}")));
        assert!(FRAGMENT_SHADER.contains(&format!("#define DROP_SIZE {DROP_SIZE:?}")));
    }

    #[test]
    fn layer_calls_agree_with_cpu_model() {
        for params in LAYERS {
            let call = format!(
                "layer(fragCoord, position, {:?}, {:?}, globalTime)",
                params.speed_column, params.row_scale
            );
            assert!(FRAGMENT_SHADER.contains(&call), "missing {call}");
        }
        assert!(FRAGMENT_SHADER.contains(&format!("position.x += {:?};", LAYERS[1].shift)));
    }

    #[test]
    fn interface_names_are_declared() {
        for decl in [
            format!("uniform float {TIME_UNIFORM};"),
            format!("uniform vec2 {RESOLUTION_UNIFORM};"),
            format!("uniform sampler2D {CHANNEL0_UNIFORM};"),
        ] {
            assert!(FRAGMENT_SHADER.contains(&decl), "missing {decl}");
        }
        for decl in [
            format!("attribute vec4 {POSITION_ATTRIBUTE};"),
            format!("attribute vec2 {TEX_COORD_ATTRIBUTE};"),
        ] {
            assert!(VERTEX_SHADER.contains(&decl), "missing {decl}");
        }
    }
}
