//! An empty window cleared to a fixed color every frame.

use lumen_demos::run_demo;
use lumen_engine::core::{App, AppControl, FrameCtx};
use lumen_engine::paint::Color;
use winit::event::WindowEvent;

struct HelloWindow;

impl App for HelloWindow {
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        if let WindowEvent::Resized(size) = event {
            log::info!("framebuffer resized to {}x{}", size.width, size.height);
        }
        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        ctx.render(Color::SLATE, |_| Ok(()))
    }
}

fn main() -> anyhow::Result<()> {
    run_demo("hello window", HelloWindow)
}
