use winit::window::Window;

use crate::coords::Viewport;
use crate::device::{Gpu, GpuDevice, SurfaceErrorAction};
use crate::gfx::{DrawError, DrawPass};
use crate::input::{InputFrame, InputState};
use crate::paint::Color;
use crate::time::FrameTime;

use super::app::AppControl;

/// Context passed to `App::on_start`.
pub struct StartCtx<'a> {
    pub gpu: &'a GpuDevice,
    pub surface_format: wgpu::TextureFormat,
    pub viewport: Viewport,
}

/// Per-frame context passed to `core::App::on_frame`.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `Gpu<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window: &'a Window,
    pub gpu: &'a mut Gpu<'w>,
    pub input: &'a InputState,
    pub input_frame: &'a InputFrame,
    pub time: FrameTime,
    draw_errors: &'a mut DrawErrorLatch,
    surface_fatal: bool,
}

impl<'a, 'w> FrameCtx<'a, 'w> {
    pub(crate) fn new(
        window: &'a Window,
        gpu: &'a mut Gpu<'w>,
        input: &'a InputState,
        input_frame: &'a InputFrame,
        time: FrameTime,
        draw_errors: &'a mut DrawErrorLatch,
    ) -> Self {
        Self {
            window,
            gpu,
            input,
            input_frame,
            time,
            draw_errors,
            surface_fatal: false,
        }
    }

    /// Whether `render` hit an unrecoverable surface error this frame.
    pub(crate) fn surface_fatal(&self) -> bool {
        self.surface_fatal
    }

    /// Device for creating resources mid-run.
    pub fn device(&self) -> &GpuDevice {
        self.gpu.gpu()
    }

    /// Viewport the frame is rendered with; follows the last resize.
    pub fn viewport(&self) -> Viewport {
        self.gpu.viewport()
    }

    /// Acquires the next frame, clears it to `clear`, lets `draw` record into a
    /// [`DrawPass`], then submits and presents.
    ///
    /// A draw error is logged (once until it changes) and the frame is still
    /// presented. A fatal surface error returns `AppControl::Exit`.
    pub fn render<F>(&mut self, clear: Color, draw: F) -> AppControl
    where
        F: FnOnce(&mut DrawPass<'_>) -> Result<(), DrawError>,
    {
        let mut frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                return match self.gpu.handle_surface_error(err) {
                    SurfaceErrorAction::Fatal => {
                        log::error!("surface lost beyond recovery; closing");
                        self.surface_fatal = true;
                        AppControl::Exit
                    }
                    _ => AppControl::Continue,
                };
            }
        };

        // The pass borrows frame.encoder; it must end before submit() takes the frame.
        let result = {
            let mut pass = DrawPass::begin(
                self.gpu.gpu(),
                &mut frame.encoder,
                &frame.view,
                self.gpu.surface_format(),
                self.gpu.viewport(),
                clear,
            );
            draw(&mut pass)
        };
        self.draw_errors.report(result);

        self.window.pre_present_notify();
        self.gpu.submit(frame);

        AppControl::Continue
    }
}

/// Logs draw errors without repeating the same one every frame.
#[derive(Debug, Default)]
pub struct DrawErrorLatch {
    last: Option<DrawError>,
}

impl DrawErrorLatch {
    /// Records the outcome of a frame's draws. Returns `true` if it was logged.
    pub fn report(&mut self, result: Result<(), DrawError>) -> bool {
        match result {
            Ok(()) => {
                self.last = None;
                false
            }
            Err(err) if self.last.as_ref() == Some(&err) => false,
            Err(err) => {
                log::error!("{err}");
                self.last = Some(err);
                true
            }
        }
    }
}
