//! The blended quad drawn twice per frame with different transforms.
//!
//! One copy spins in the bottom-right corner, the other pulses in scale in the
//! top-left corner. Up/Down change the blend.

use lumen_demos::{geometry, run_demo, AssetDir, RenderParams};
use lumen_engine::coords::{Mat4, Vec3};
use lumen_engine::core::{App, AppControl, FrameCtx, StartCtx};
use lumen_engine::gfx::{
    ImageLoader, ShaderProgram, Texture, TextureOptions, VertexArray, VertexLayout, WrapMode,
};
use lumen_engine::paint::Color;

struct Scene {
    program: ShaderProgram,
    quad: VertexArray,
    container: Texture,
    face: Texture,
}

/// Transforms of the two quads `t` seconds in.
fn transforms(t: f32) -> (Mat4, Mat4) {
    let spinning = Mat4::IDENTITY
        .translate(Vec3::new(0.5, -0.5, 0.0))
        .rotate(t, Vec3::Z);
    let s = t.sin();
    let pulsing = Mat4::IDENTITY
        .translate(Vec3::new(-0.5, 0.5, 0.0))
        .scale(Vec3::new(s, s, 1.0));
    (spinning, pulsing)
}

#[derive(Default)]
struct Transformations {
    scene: Option<Scene>,
    params: RenderParams,
}

impl App for Transformations {
    fn on_start(&mut self, ctx: &StartCtx<'_>) -> anyhow::Result<()> {
        let assets = AssetDir::from_env();
        let loader = ImageLoader::flipped();

        self.scene = Some(Scene {
            program: assets.program(ctx.gpu, "transform", "transform", "textured"),
            quad: VertexArray::upload(
                ctx.gpu,
                "textured quad",
                &geometry::TEXTURED_QUAD,
                VertexLayout::interleaved(geometry::POSITION_COLOR_UV)?,
                Some(&geometry::QUAD_INDICES),
            )?,
            container: assets.texture(
                ctx.gpu,
                "container.png",
                &loader,
                &TextureOptions::default().with_wrap(WrapMode::ClampToEdge),
            ),
            face: assets.texture(
                ctx.gpu,
                "awesomeface.png",
                &loader,
                &TextureOptions::default(),
            ),
        });
        Ok(())
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let Some(scene) = self.scene.as_mut() else {
            return AppControl::Continue;
        };
        self.params.update(ctx.input, ctx.input_frame, ctx.time.dt);

        let params = self.params;
        let (spinning, pulsing) = transforms(ctx.time.elapsed);

        ctx.render(Color::SLATE, |pass| {
            pass.set_polygon_mode(params.polygon_mode());
            pass.bind_texture(0, &scene.container)?;
            pass.bind_texture(1, &scene.face)?;

            let mut program = pass.use_program(&mut scene.program);
            program
                .set_i32("texture1", 0)
                .set_i32("texture2", 1)
                .set_f32("mixValue", params.mix_value);

            program.set_mat4("transform", spinning).draw(&scene.quad)?;
            program.set_mat4("transform", pulsing).draw(&scene.quad)
        })
    }
}

fn main() -> anyhow::Result<()> {
    run_demo("transformations", Transformations::default())
}
