//! Hello-triangle exercises.
//!
//! - `1`: two triangles from one vertex array
//! - `2`: the same triangles from two vertex arrays
//! - `3`: two vertex arrays drawn with two programs (orange and yellow)

use lumen_demos::{geometry, run_demo, AssetDir, RenderParams};
use lumen_engine::core::{App, AppControl, FrameCtx, StartCtx};
use lumen_engine::gfx::{DrawError, DrawPass, ShaderProgram, VertexArray, VertexLayout};
use lumen_engine::input::Key;
use lumen_engine::paint::Color;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Exercise {
    OneArray,
    TwoArrays,
    TwoPrograms,
}

impl Exercise {
    fn from_key(key: Key) -> Option<Self> {
        match key {
            Key::Digit1 => Some(Exercise::OneArray),
            Key::Digit2 => Some(Exercise::TwoArrays),
            Key::Digit3 => Some(Exercise::TwoPrograms),
            _ => None,
        }
    }
}

struct Scene {
    orange: ShaderProgram,
    yellow: ShaderProgram,
    both: VertexArray,
    left: VertexArray,
    right: VertexArray,
}

impl Scene {
    fn draw(&mut self, pass: &mut DrawPass<'_>, exercise: Exercise) -> Result<(), DrawError> {
        match exercise {
            Exercise::OneArray => pass.use_program(&mut self.orange).draw(&self.both),
            Exercise::TwoArrays => {
                let mut orange = pass.use_program(&mut self.orange);
                orange.draw(&self.left)?;
                orange.draw(&self.right)
            }
            Exercise::TwoPrograms => {
                pass.use_program(&mut self.orange).draw(&self.left)?;
                pass.use_program(&mut self.yellow).draw(&self.right)
            }
        }
    }
}

struct Exercises {
    scene: Option<Scene>,
    exercise: Exercise,
    params: RenderParams,
}

impl App for Exercises {
    fn on_start(&mut self, ctx: &StartCtx<'_>) -> anyhow::Result<()> {
        let assets = AssetDir::from_env();
        let layout = VertexLayout::interleaved(geometry::POSITION)?;
        let upload = |label: &str, data: &[f32]| {
            VertexArray::upload(ctx.gpu, label, data, layout.clone(), None)
        };

        self.scene = Some(Scene {
            orange: assets.program(ctx.gpu, "orange", "position", "orange"),
            yellow: assets.program(ctx.gpu, "yellow", "position", "yellow"),
            both: upload("two triangles", &geometry::TWO_TRIANGLES)?,
            left: upload("left triangle", &geometry::LEFT_TRIANGLE)?,
            right: upload("right triangle", &geometry::RIGHT_TRIANGLE)?,
        });
        log::info!("press 1, 2 or 3 to switch exercises");
        Ok(())
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let Some(scene) = self.scene.as_mut() else {
            return AppControl::Continue;
        };

        if let Some(next) = ctx
            .input_frame
            .keys_pressed
            .iter()
            .find_map(|&key| Exercise::from_key(key))
        {
            if next != self.exercise {
                log::info!("exercise {next:?}");
                self.exercise = next;
            }
        }
        self.params.update(ctx.input, ctx.input_frame, ctx.time.dt);

        let exercise = self.exercise;
        let params = self.params;
        ctx.render(Color::SLATE, |pass| {
            pass.set_polygon_mode(params.polygon_mode());
            scene.draw(pass, exercise)
        })
    }
}

fn main() -> anyhow::Result<()> {
    run_demo(
        "hello triangle exercises",
        Exercises {
            scene: None,
            exercise: Exercise::TwoPrograms,
            params: RenderParams::default(),
        },
    )
}
