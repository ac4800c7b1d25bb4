//! Model, view and projection matrices.
//!
//! The blended quad lies tilted back on the floor, seen through a perspective
//! camera three units away. Up/Down change the blend.

use std::f32::consts::FRAC_PI_4;

use lumen_demos::{geometry, run_demo, AssetDir, RenderParams};
use lumen_engine::coords::{Mat4, Vec3, Viewport};
use lumen_engine::core::{App, AppControl, FrameCtx, StartCtx};
use lumen_engine::gfx::{
    ImageLoader, ShaderProgram, Texture, TextureOptions, VertexArray, VertexLayout, WrapMode,
};
use lumen_engine::paint::Color;

const NEAR: f32 = 0.1;
const FAR: f32 = 100.0;

struct Camera {
    model: Mat4,
    view: Mat4,
    projection: Mat4,
}

impl Camera {
    fn for_viewport(viewport: Viewport) -> Self {
        let aspect = if viewport.is_empty() {
            1.0
        } else {
            viewport.aspect_ratio()
        };
        Self {
            model: Mat4::rotation((-55.0f32).to_radians(), Vec3::X),
            view: Mat4::translation(Vec3::new(0.0, 0.0, -3.0)),
            projection: Mat4::perspective(FRAC_PI_4, aspect, NEAR, FAR),
        }
    }
}

struct Scene {
    program: ShaderProgram,
    quad: VertexArray,
    container: Texture,
    face: Texture,
}

#[derive(Default)]
struct CoordSystems {
    scene: Option<Scene>,
    params: RenderParams,
}

impl App for CoordSystems {
    fn on_start(&mut self, ctx: &StartCtx<'_>) -> anyhow::Result<()> {
        let assets = AssetDir::from_env();
        let loader = ImageLoader::flipped();

        self.scene = Some(Scene {
            program: assets.program(ctx.gpu, "coord", "coord", "textured"),
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
        let camera = Camera::for_viewport(ctx.viewport());

        ctx.render(Color::SLATE, |pass| {
            pass.set_polygon_mode(params.polygon_mode());
            pass.bind_texture(0, &scene.container)?;
            pass.bind_texture(1, &scene.face)?;
            pass.use_program(&mut scene.program)
                .set_i32("texture1", 0)
                .set_i32("texture2", 1)
                .set_f32("mixValue", params.mix_value)
                .set_mat4("model", camera.model)
                .set_mat4("view", camera.view)
                .set_mat4("projection", camera.projection)
                .draw(&scene.quad)
        })
    }
}

fn main() -> anyhow::Result<()> {
    run_demo("coordinate systems", CoordSystems::default())
}
