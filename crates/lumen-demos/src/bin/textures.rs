//! Two textures blended on a quad.
//!
//! Up/Down change the blend, `T` cycles the container's wrap mode and `F`
//! switches between nearest and linear filtering. Texture coordinates run from
//! -0.5 to 1.5 so the wrap mode is visible around the edges.

use lumen_demos::{geometry, run_demo, AssetDir, RenderParams};
use lumen_engine::core::{App, AppControl, FrameCtx, StartCtx};
use lumen_engine::gfx::{
    FilterMode, ImageLoader, ShaderProgram, Texture, TextureOptions, VertexArray, VertexLayout,
    WrapMode,
};
use lumen_engine::input::Key;
use lumen_engine::paint::Color;

const WRAP_MODES: [WrapMode; 4] = [
    WrapMode::Repeat,
    WrapMode::MirroredRepeat,
    WrapMode::ClampToEdge,
    WrapMode::ClampToBorder,
];
const FILTERS: [FilterMode; 2] = [FilterMode::Linear, FilterMode::Nearest];

/// [`geometry::TEXTURED_QUAD`] with texture coordinates widened to -0.5..1.5.
fn widened_quad() -> [f32; 32] {
    let mut quad = geometry::TEXTURED_QUAD;
    for vertex in quad.chunks_exact_mut(8) {
        vertex[6] = vertex[6] * 2.0 - 0.5;
        vertex[7] = vertex[7] * 2.0 - 0.5;
    }
    quad
}

struct Scene {
    program: ShaderProgram,
    quad: VertexArray,
    /// One container per (filter, wrap) combination, filter-major.
    containers: Vec<Texture>,
    face: Texture,
}

#[derive(Default)]
struct Textures {
    scene: Option<Scene>,
    params: RenderParams,
    wrap: usize,
    filter: usize,
}

impl App for Textures {
    fn on_start(&mut self, ctx: &StartCtx<'_>) -> anyhow::Result<()> {
        let assets = AssetDir::from_env();
        let loader = ImageLoader::flipped();

        let containers = FILTERS
            .iter()
            .flat_map(|&filter| WRAP_MODES.iter().map(move |&wrap| (filter, wrap)))
            .map(|(filter, wrap)| {
                let options = TextureOptions::default()
                    .with_wrap(wrap)
                    .with_filter(filter);
                assets.texture(ctx.gpu, "container.png", &loader, &options)
            })
            .collect();

        self.scene = Some(Scene {
            program: assets.program(ctx.gpu, "textured", "textured", "textured"),
            quad: VertexArray::upload(
                ctx.gpu,
                "textured quad",
                &widened_quad(),
                VertexLayout::interleaved(geometry::POSITION_COLOR_UV)?,
                Some(&geometry::QUAD_INDICES),
            )?,
            containers,
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
        if ctx.input_frame.key_pressed(Key::T) {
            self.wrap = (self.wrap + 1) % WRAP_MODES.len();
            log::info!("container wrap: {:?}", WRAP_MODES[self.wrap]);
        }
        if ctx.input_frame.key_pressed(Key::F) {
            self.filter = (self.filter + 1) % FILTERS.len();
            log::info!("container filter: {:?}", FILTERS[self.filter]);
        }
        self.params.update(ctx.input, ctx.input_frame, ctx.time.dt);

        let params = self.params;
        let container = &scene.containers[self.filter * WRAP_MODES.len() + self.wrap];

        ctx.render(Color::SLATE, |pass| {
            pass.set_polygon_mode(params.polygon_mode());
            pass.bind_texture(0, container)?;
            pass.bind_texture(1, &scene.face)?;
            pass.use_program(&mut scene.program)
                .set_i32("texture1", 0)
                .set_i32("texture2", 1)
                .set_f32("mixValue", params.mix_value)
                .draw(&scene.quad)
        })
    }
}

fn main() -> anyhow::Result<()> {
    run_demo("textures", Textures::default())
}
