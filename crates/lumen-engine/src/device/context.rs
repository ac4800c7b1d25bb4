use crate::error::InitError;

use super::GpuInit;

/// Logical device + queue shared by every GPU object the demos create.
///
/// Owned by `Gpu` for windowed rendering; tests and offscreen tools create one
/// directly with [`GpuDevice::headless`].
pub struct GpuDevice {
    device: wgpu::Device,
    queue: wgpu::Queue,
    features: wgpu::Features,
    adapter_info: wgpu::AdapterInfo,
}

impl GpuDevice {
    /// Requests a device from `adapter`.
    ///
    /// Required features must be present; optional ones are enabled only when
    /// the adapter supports them.
    pub(crate) async fn from_adapter(
        adapter: &wgpu::Adapter,
        init: &GpuInit,
    ) -> Result<Self, InitError> {
        let available = adapter.features();
        if !available.contains(init.required_features) {
            return Err(InitError::GraphicsInit(format!(
                "adapter does not support required features {:?}",
                init.required_features
            )));
        }

        let features = init.required_features | (init.optional_features & available);
        let limits = init.required_limits.clone().using_resolution(adapter.limits());

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("lumen device"),
                required_features: features,
                required_limits: limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| InitError::GraphicsInit(format!("failed to create device/queue: {e}")))?;

        let adapter_info = adapter.get_info();
        log::info!(
            "using {} ({:?} backend), optional features: {:?}",
            adapter_info.name,
            adapter_info.backend,
            init.optional_features & available
        );

        Ok(Self {
            device,
            queue,
            features,
            adapter_info,
        })
    }

    /// Creates a device without a window surface.
    ///
    /// Blocks on adapter/device acquisition.
    pub fn headless(init: &GpuInit) -> Result<Self, InitError> {
        pollster::block_on(async {
            let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
                backends: wgpu::Backends::all(),
                ..Default::default()
            });

            let adapter = instance
                .request_adapter(&wgpu::RequestAdapterOptions {
                    power_preference: wgpu::PowerPreference::default(),
                    compatible_surface: None,
                    force_fallback_adapter: false,
                })
                .await
                .map_err(|e| InitError::GraphicsInit(format!("no suitable GPU adapter: {e}")))?;

            Self::from_adapter(&adapter, init).await
        })
    }

    #[inline]
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    #[inline]
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Features actually enabled on the device.
    #[inline]
    pub fn features(&self) -> wgpu::Features {
        self.features
    }

    #[inline]
    pub fn supports(&self, feature: wgpu::Features) -> bool {
        self.features.contains(feature)
    }

    pub fn adapter_info(&self) -> &wgpu::AdapterInfo {
        &self.adapter_info
    }
}
