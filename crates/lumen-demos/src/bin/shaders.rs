//! Vertex attributes and uniforms.
//!
//! The default view interpolates a color per corner. `U` switches to a single
//! uniform color whose green channel pulses with time.

use lumen_demos::{geometry, run_demo, AssetDir, RenderParams};
use lumen_engine::core::{App, AppControl, FrameCtx, StartCtx};
use lumen_engine::gfx::{ShaderProgram, VertexArray, VertexLayout};
use lumen_engine::input::Key;
use lumen_engine::paint::Color;

struct Scene {
    per_vertex: ShaderProgram,
    uniform: ShaderProgram,
    colored: VertexArray,
    plain: VertexArray,
}

#[derive(Default)]
struct Shaders {
    scene: Option<Scene>,
    params: RenderParams,
    use_uniform: bool,
}

impl App for Shaders {
    fn on_start(&mut self, ctx: &StartCtx<'_>) -> anyhow::Result<()> {
        let assets = AssetDir::from_env();
        self.scene = Some(Scene {
            per_vertex: assets.program(ctx.gpu, "per-vertex color", "colored", "colored"),
            uniform: assets.program(ctx.gpu, "uniform color", "position", "uniform_color"),
            colored: VertexArray::upload(
                ctx.gpu,
                "colored triangle",
                &geometry::COLORED_TRIANGLE,
                VertexLayout::interleaved(geometry::POSITION_COLOR)?,
                None,
            )?,
            plain: VertexArray::upload(
                ctx.gpu,
                "triangle",
                &geometry::TRIANGLE,
                VertexLayout::interleaved(geometry::POSITION)?,
                None,
            )?,
        });
        Ok(())
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let Some(scene) = self.scene.as_mut() else {
            return AppControl::Continue;
        };
        if ctx.input_frame.key_pressed(Key::U) {
            self.use_uniform = !self.use_uniform;
        }
        self.params.update(ctx.input, ctx.input_frame, ctx.time.dt);

        let params = self.params;
        let use_uniform = self.use_uniform;
        let green = ctx.time.elapsed.sin() / 2.0 + 0.5;

        ctx.render(Color::SLATE, |pass| {
            pass.set_polygon_mode(params.polygon_mode());
            if use_uniform {
                pass.use_program(&mut scene.uniform)
                    .set_color("ourColor", Color::rgb(0.0, green, 0.0))
                    .draw(&scene.plain)
            } else {
                pass.use_program(&mut scene.per_vertex).draw(&scene.colored)
            }
        })
    }
}

fn main() -> anyhow::Result<()> {
    run_demo("shaders", Shaders::default())
}
