use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::coords::Viewport;
use crate::error::InitError;

use super::surface::{self, ResizeOutcome};
use super::{GpuDevice, GpuFrame, GpuInit, SurfaceErrorAction};

/// Window-bound rendering context.
///
/// - owns the `GpuDevice` used to create programs, buffers and textures
/// - creates and configures the Surface (swapchain)
/// - tracks the drawable size and the viewport derived from it
/// - acquires frames and submits them
pub struct Gpu<'w> {
    /// Surface bound to the window; the window must outlive `Gpu`.
    surface: wgpu::Surface<'w>,

    gpu: GpuDevice,

    /// Active surface configuration.
    config: wgpu::SurfaceConfiguration,

    /// Current drawable size in physical pixels.
    size: PhysicalSize<u32>,

    /// Viewport applied to the next frame.
    viewport: Viewport,
}

impl<'w> Gpu<'w> {
    /// Creates a GPU context bound to a window.
    pub async fn new(window: &'w Window, init: GpuInit) -> Result<Self, InitError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .map_err(|e| InitError::GraphicsInit(format!("failed to create surface: {e}")))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| InitError::GraphicsInit(format!("no suitable GPU adapter: {e}")))?;

        let gpu = GpuDevice::from_adapter(&adapter, &init).await?;

        let caps = surface.get_capabilities(&adapter);
        let format = surface::choose_surface_format(&caps, init.prefer_srgb)
            .ok_or_else(|| InitError::GraphicsInit("surface reports no formats".to_string()))?;
        let alpha_mode = surface::choose_alpha_mode(&caps, init.alpha_mode);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: init.present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: init.desired_maximum_frame_latency,
        };

        if size.width > 0 && size.height > 0 {
            surface.configure(gpu.device(), &config);
        }

        log::debug!("surface configured: {format:?}, {}x{}", size.width, size.height);

        Ok(Self {
            surface,
            gpu,
            config,
            size,
            viewport: Viewport::from_size(size.width, size.height),
        })
    }

    /// Device and queue for resource creation.
    #[inline]
    pub fn gpu(&self) -> &GpuDevice {
        &self.gpu
    }

    /// Returns the active surface format.
    #[inline]
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Returns the current drawable size (physical pixels).
    #[inline]
    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    /// Viewport the next frame renders with.
    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Whether the drawable has a non-zero area.
    #[inline]
    pub fn is_drawable(&self) -> bool {
        self.size.width > 0 && self.size.height > 0
    }

    /// Reconfigures the surface and resets the viewport to `(0, 0, width, height)`.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        match surface::apply_resize(&mut self.config, &mut self.size, new_size) {
            ResizeOutcome::Reconfigure(viewport) => {
                self.surface.configure(self.gpu.device(), &self.config);
                self.viewport = viewport;
                log::debug!("viewport set to {viewport:?}");
            }
            ResizeOutcome::Deferred => {
                log::debug!("drawable is empty; surface configuration deferred");
            }
        }
    }

    /// Acquires the next surface texture and creates an encoder.
    pub fn begin_frame(&self) -> Result<GpuFrame, wgpu::SurfaceError> {
        let surface_texture = self.surface.get_current_texture()?;
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let encoder = self
            .gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("lumen frame encoder"),
            });

        Ok(GpuFrame {
            surface_texture,
            view,
            encoder,
        })
    }

    /// Submits the recorded commands and presents the frame.
    pub fn submit(&self, frame: GpuFrame) {
        let GpuFrame {
            surface_texture,
            view,
            encoder,
        } = frame;

        self.gpu.queue().submit(std::iter::once(encoder.finish()));
        drop(view);
        surface_texture.present();
    }

    /// Converts a `SurfaceError` into a higher-level action, reconfiguring when needed.
    pub fn handle_surface_error(&mut self, err: wgpu::SurfaceError) -> SurfaceErrorAction {
        let action = surface::map_surface_error(&err);
        if action == SurfaceErrorAction::Reconfigured && self.is_drawable() {
            self.surface.configure(self.gpu.device(), &self.config);
        }
        log::debug!("surface error {err:?} -> {action:?}");
        action
    }
}
