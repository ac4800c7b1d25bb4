//! A single orange triangle drawn from three vertices.

use lumen_demos::{geometry, run_demo, AssetDir, RenderParams};
use lumen_engine::core::{App, AppControl, FrameCtx, StartCtx};
use lumen_engine::gfx::{ShaderProgram, VertexArray, VertexLayout};
use lumen_engine::paint::Color;

struct Scene {
    program: ShaderProgram,
    triangle: VertexArray,
}

#[derive(Default)]
struct HelloTriangle {
    scene: Option<Scene>,
    params: RenderParams,
}

impl App for HelloTriangle {
    fn on_start(&mut self, ctx: &StartCtx<'_>) -> anyhow::Result<()> {
        let assets = AssetDir::from_env();
        self.scene = Some(Scene {
            program: assets.program(ctx.gpu, "triangle", "position", "orange"),
            triangle: VertexArray::upload(
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
        self.params.update(ctx.input, ctx.input_frame, ctx.time.dt);
        let params = self.params;

        ctx.render(Color::SLATE, |pass| {
            pass.set_polygon_mode(params.polygon_mode());
            pass.use_program(&mut scene.program).draw(&scene.triangle)
        })
    }
}

fn main() -> anyhow::Result<()> {
    run_demo("hello triangle", HelloTriangle::default())
}
