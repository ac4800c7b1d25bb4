//! A rectangle drawn as two indexed triangles. `W` toggles wireframe.

use lumen_demos::{geometry, run_demo, AssetDir, RenderParams};
use lumen_engine::core::{App, AppControl, FrameCtx, StartCtx};
use lumen_engine::gfx::{ShaderProgram, VertexArray, VertexLayout};
use lumen_engine::paint::Color;

struct Scene {
    program: ShaderProgram,
    rectangle: VertexArray,
}

#[derive(Default)]
struct HelloRectangle {
    scene: Option<Scene>,
    params: RenderParams,
}

impl App for HelloRectangle {
    fn on_start(&mut self, ctx: &StartCtx<'_>) -> anyhow::Result<()> {
        let assets = AssetDir::from_env();
        self.scene = Some(Scene {
            program: assets.program(ctx.gpu, "rectangle", "position", "orange"),
            rectangle: VertexArray::upload(
                ctx.gpu,
                "rectangle",
                &geometry::RECTANGLE,
                VertexLayout::interleaved(geometry::POSITION)?,
                Some(&geometry::QUAD_INDICES),
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
            pass.use_program(&mut scene.program).draw(&scene.rectangle)
        })
    }
}

fn main() -> anyhow::Result<()> {
    run_demo("hello rectangle", HelloRectangle::default())
}
