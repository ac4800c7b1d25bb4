use winit::dpi::PhysicalSize;

use crate::coords::Viewport;

use super::SurfaceErrorAction;

pub(crate) fn choose_surface_format(
    caps: &wgpu::SurfaceCapabilities,
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    if caps.formats.is_empty() {
        return None;
    }

    caps.formats
        .iter()
        .copied()
        .find(|f| f.is_srgb() == prefer_srgb)
        .or_else(|| caps.formats.first().copied())
}

pub(crate) fn choose_alpha_mode(
    caps: &wgpu::SurfaceCapabilities,
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .filter(|m| caps.alpha_modes.contains(m))
        .or_else(|| caps.alpha_modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

/// Outcome of a drawable-size change.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) enum ResizeOutcome {
    /// The surface must be reconfigured; the viewport becomes the new size.
    Reconfigure(Viewport),
    /// Zero-sized drawable (minimized); configuration is deferred.
    Deferred,
}

/// Applies a resize to the surface configuration and tracked size.
///
/// wgpu cannot configure a 0x0 surface, so a zero-sized resize only updates the
/// tracked size.
pub(crate) fn apply_resize(
    config: &mut wgpu::SurfaceConfiguration,
    size: &mut PhysicalSize<u32>,
    new_size: PhysicalSize<u32>,
) -> ResizeOutcome {
    *size = new_size;

    if new_size.width == 0 || new_size.height == 0 {
        return ResizeOutcome::Deferred;
    }

    config.width = new_size.width;
    config.height = new_size.height;

    ResizeOutcome::Reconfigure(Viewport::from_size(new_size.width, new_size.height))
}

pub(crate) fn map_surface_error(err: &wgpu::SurfaceError) -> SurfaceErrorAction {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => SurfaceErrorAction::Reconfigured,
        wgpu::SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
        wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other => SurfaceErrorAction::SkipFrame,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(width: u32, height: u32) -> wgpu::SurfaceConfiguration {
        wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: wgpu::TextureFormat::Bgra8Unorm,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        }
    }

    #[test]
    fn resize_to_400x300_yields_full_viewport() {
        let mut cfg = config(800, 600);
        let mut size = PhysicalSize::new(800, 600);

        let outcome = apply_resize(&mut cfg, &mut size, PhysicalSize::new(400, 300));

        assert_eq!(outcome, ResizeOutcome::Reconfigure(Viewport::new(0, 0, 400, 300)));
        assert_eq!((cfg.width, cfg.height), (400, 300));
        assert_eq!(size, PhysicalSize::new(400, 300));
    }

    #[test]
    fn zero_size_defers_configuration() {
        let mut cfg = config(800, 600);
        let mut size = PhysicalSize::new(800, 600);

        let outcome = apply_resize(&mut cfg, &mut size, PhysicalSize::new(0, 0));

        assert_eq!(outcome, ResizeOutcome::Deferred);
        assert_eq!((cfg.width, cfg.height), (800, 600));
        assert_eq!(size, PhysicalSize::new(0, 0));
    }

    #[test]
    fn format_selection_honours_srgb_preference() {
        let caps = wgpu::SurfaceCapabilities {
            formats: vec![
                wgpu::TextureFormat::Bgra8UnormSrgb,
                wgpu::TextureFormat::Bgra8Unorm,
            ],
            present_modes: vec![wgpu::PresentMode::Fifo],
            alpha_modes: vec![wgpu::CompositeAlphaMode::Opaque],
            usages: wgpu::TextureUsages::RENDER_ATTACHMENT,
        };

        assert_eq!(choose_surface_format(&caps, false), Some(wgpu::TextureFormat::Bgra8Unorm));
        assert_eq!(choose_surface_format(&caps, true), Some(wgpu::TextureFormat::Bgra8UnormSrgb));
        assert_eq!(choose_alpha_mode(&caps, None), wgpu::CompositeAlphaMode::Opaque);
    }

    #[test]
    fn surface_errors_map_to_actions() {
        assert_eq!(map_surface_error(&wgpu::SurfaceError::Outdated), SurfaceErrorAction::Reconfigured);
        assert_eq!(map_surface_error(&wgpu::SurfaceError::Timeout), SurfaceErrorAction::SkipFrame);
        assert_eq!(map_surface_error(&wgpu::SurfaceError::OutOfMemory), SurfaceErrorAction::Fatal);
    }
}
