use lumen_engine::gfx::PolygonMode;
use lumen_engine::input::{InputFrame, InputState, Key};

/// How fast the arrow keys move `mix_value`, in units per second.
pub const MIX_RATE: f32 = 0.5;

/// Render parameters a lesson reads every frame.
///
/// Updated from input once per frame, then passed to the draw code.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RenderParams {
    /// Blend weight of the second texture, in `0.0..=1.0`.
    pub mix_value: f32,
    /// Draw triangle outlines instead of filled triangles.
    pub wireframe: bool,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            mix_value: 0.2,
            wireframe: false,
        }
    }
}

impl RenderParams {
    /// Up/Down arrows move `mix_value` while held; `W` toggles wireframe.
    pub fn update(&mut self, input: &InputState, frame: &InputFrame, dt: f32) {
        let mut direction = 0.0;
        if input.key_down(Key::ArrowUp) {
            direction += 1.0;
        }
        if input.key_down(Key::ArrowDown) {
            direction -= 1.0;
        }
        self.mix_value = (self.mix_value + direction * MIX_RATE * dt).clamp(0.0, 1.0);

        if frame.key_pressed(Key::W) {
            self.wireframe = !self.wireframe;
            log::info!("wireframe {}", if self.wireframe { "on" } else { "off" });
        }
    }

    pub fn polygon_mode(&self) -> PolygonMode {
        if self.wireframe {
            PolygonMode::Line
        } else {
            PolygonMode::Fill
        }
    }
}
