use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App as CoreApp, AppControl, DrawErrorLatch, FrameCtx, StartCtx};
use crate::device::{Gpu, GpuInit};
use crate::error::InitError;
use crate::input::platform::winit::translate_window_event;
use crate::input::{InputEvent, InputFrame, InputState, Key, KeyState};
use crate::time::{FrameClock, FrameTime};

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    /// Escape moves the loop to `Closing`.
    pub close_on_escape: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "lumen".to_string(),
            initial_size: LogicalSize::new(800.0, 600.0),
            close_on_escape: true,
        }
    }
}

/// Render-loop state.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Closing,
}

/// Inputs that drive `LoopState` transitions.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LoopEvent {
    /// Escape was pressed (only when `close_on_escape` is set).
    EscapePressed,
    /// The window's close button or the OS asked to close.
    CloseRequested,
    /// An app callback returned `AppControl::Exit`.
    AppExit,
    /// The surface failed beyond recovery.
    Fatal,
}

impl LoopState {
    /// Every event closes the loop; `Closing` is terminal.
    pub fn on(self, event: LoopEvent) -> Self {
        match (self, event) {
            (LoopState::Closing, _) => LoopState::Closing,
            (
                LoopState::Running,
                LoopEvent::EscapePressed
                | LoopEvent::CloseRequested
                | LoopEvent::AppExit
                | LoopEvent::Fatal,
            ) => LoopState::Closing,
        }
    }

    #[inline]
    pub fn is_running(self) -> bool {
        self == LoopState::Running
    }
}

fn is_escape_press(ev: &InputEvent) -> bool {
    matches!(
        ev,
        InputEvent::Key {
            key: Key::Escape,
            state: KeyState::Pressed,
            ..
        }
    )
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens the window, calls `App::on_start`, then renders until the loop
    /// reaches `Closing`.
    ///
    /// Startup failures (window, GPU, `on_start`) are returned as errors.
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: 'static + CoreApp,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        // Dropping the window entry (and with it every GPU object the app did not
        // own) happens here, after the loop has stopped.
        state.entry = None;

        match state.startup_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    input_state: InputState,
    input_frame: InputFrame,
    clock: FrameClock,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct AppState<A>
where
    A: CoreApp + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    entry: Option<WindowEntry>,
    loop_state: LoopState,
    startup_error: Option<anyhow::Error>,
    draw_errors: DrawErrorLatch,
}

impl<A> AppState<A>
where
    A: CoreApp + 'static,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        Self {
            config,
            gpu_init,
            app,
            entry: None,
            loop_state: LoopState::Running,
            startup_error: None,
            draw_errors: DrawErrorLatch::default(),
        }
    }

    fn transition(&mut self, event: LoopEvent) {
        let next = self.loop_state.on(event);
        if next != self.loop_state {
            log::info!("{event:?}: closing");
        }
        self.loop_state = next;
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .map_err(|e| InitError::WindowCreation(e.to_string()))?;

        let gpu_init = self.gpu_init.clone();
        let entry = WindowEntryTryBuilder {
            input_state: InputState::default(),
            input_frame: InputFrame::default(),
            clock: FrameClock::default(),
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()?;

        let app = &mut self.app;
        entry
            .with_gpu(|gpu| {
                let ctx = StartCtx {
                    gpu: gpu.gpu(),
                    surface_format: gpu.surface_format(),
                    viewport: gpu.viewport(),
                };
                app.on_start(&ctx)
            })
            .context("application startup failed")?;

        // The clock starts with the first frame, not with asset loading.
        let mut entry = entry;
        entry.with_clock_mut(|c| c.reset());
        entry.with_window(|w| w.request_redraw());

        self.entry = Some(entry);
        log::info!("window `{}` ready", self.config.title);
        Ok(())
    }

    fn redraw(&mut self) {
        let Some(entry) = self.entry.as_mut() else {
            return;
        };
        let app = &mut self.app;
        let draw_errors = &mut self.draw_errors;

        let (control, fatal) = entry.with_mut(|fields| {
            if !fields.gpu.is_drawable() {
                // Minimized: nothing to present until a non-zero resize arrives.
                return (AppControl::Continue, false);
            }

            let ft: FrameTime = fields.clock.tick();
            let mut ctx = FrameCtx::new(
                fields.window,
                fields.gpu,
                fields.input_state,
                fields.input_frame,
                ft,
                draw_errors,
            );
            let control = app.on_frame(&mut ctx);
            let fatal = ctx.surface_fatal();

            // Per-frame deltas are consumed by exactly one frame.
            fields.input_frame.clear();
            (control, fatal)
        });

        if fatal {
            self.transition(LoopEvent::Fatal);
        }
        if control == AppControl::Exit {
            self.transition(LoopEvent::AppExit);
        }
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: CoreApp + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() || self.startup_error.is_some() {
            return;
        }

        if let Err(e) = self.start(event_loop) {
            log::error!("startup failed: {e:#}");
            self.startup_error = Some(e);
            self.loop_state = LoopState::Closing;
            event_loop.exit();
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if !self.loop_state.is_running() {
            event_loop.exit();
            return;
        }

        // Continuous redraw, paced by the surface's present mode.
        event_loop.set_control_flow(ControlFlow::Wait);
        if let Some(entry) = &self.entry {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(entry) = self.entry.as_mut() else {
            return;
        };

        let close_on_escape = self.config.close_on_escape;
        let mut escape = false;
        if let Some(ev) = translate_window_event(&event) {
            escape = close_on_escape && is_escape_press(&ev);
            entry.with_mut(|fields| fields.input_state.apply_event(fields.input_frame, ev));
        }
        if escape {
            self.transition(LoopEvent::EscapePressed);
        }

        if self.app.on_window_event(&event) == AppControl::Exit {
            self.transition(LoopEvent::AppExit);
        }

        match &event {
            WindowEvent::CloseRequested => self.transition(LoopEvent::CloseRequested),

            WindowEvent::Resized(new_size) => {
                if let Some(entry) = self.entry.as_mut() {
                    entry.with_gpu_mut(|gpu| gpu.resize(*new_size));
                    entry.with_window(|w| w.request_redraw());
                }
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(entry) = self.entry.as_mut() {
                    let new_size = entry.with_window(|w| w.inner_size());
                    entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                }
            }

            WindowEvent::RedrawRequested if self.loop_state.is_running() => self.redraw(),

            _ => {}
        }

        if !self.loop_state.is_running() {
            event_loop.exit();
        }
    }
}
