use std::sync::Once;

use crate::coords::Viewport;
use crate::device::GpuDevice;
use crate::gfx::shader::{PipelineKey, ShaderProgram};
use crate::gfx::texture::Texture;
use crate::gfx::vertex::VertexArray;
use crate::gfx::ResourceId;
use crate::paint::Color;

use super::active::ActiveProgram;
use super::bind_state::BindState;
use super::{BoundTexture, DrawError, PolygonMode, MAX_TEXTURE_UNITS};

static LINE_MODE_UNSUPPORTED: Once = Once::new();

/// One render pass over a color target.
///
/// The target is cleared when the pass begins. Bindings persist across draws
/// until replaced; re-binding the same object is skipped.
///
/// Uniform snapshots are written through the queue, so each pass must be
/// submitted before the next pass using the same programs is recorded.
pub struct DrawPass<'e> {
    id: ResourceId,
    gpu: &'e GpuDevice,
    rpass: wgpu::RenderPass<'e>,
    format: wgpu::TextureFormat,
    viewport: Viewport,
    polygon_mode: PolygonMode,
    units: [Option<BoundTexture>; MAX_TEXTURE_UNITS],
    state: BindState,
}

impl<'e> DrawPass<'e> {
    /// Begins a pass that clears `target` to `clear` and draws into `viewport`.
    ///
    /// `format` must be the format of `target`.
    pub fn begin(
        gpu: &'e GpuDevice,
        encoder: &'e mut wgpu::CommandEncoder,
        target: &'e wgpu::TextureView,
        format: wgpu::TextureFormat,
        viewport: Viewport,
        clear: Color,
    ) -> Self {
        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("lumen draw pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear.to_wgpu()),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        if !viewport.is_empty() {
            rpass.set_viewport(
                viewport.x as f32,
                viewport.y as f32,
                viewport.width as f32,
                viewport.height as f32,
                0.0,
                1.0,
            );
        }

        Self {
            id: ResourceId::next(),
            gpu,
            rpass,
            format,
            viewport,
            polygon_mode: PolygonMode::Fill,
            units: std::array::from_fn(|_| None),
            state: BindState::default(),
        }
    }

    #[inline]
    pub fn gpu(&self) -> &'e GpuDevice {
        self.gpu
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[inline]
    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    pub fn bind_state(&self) -> &BindState {
        &self.state
    }

    /// Selects fill or outline rasterization for subsequent draws.
    ///
    /// Without `Features::POLYGON_MODE_LINE`, `Line` logs a warning once and
    /// draws filled.
    pub fn set_polygon_mode(&mut self, mode: PolygonMode) {
        if mode == PolygonMode::Line && !self.gpu.supports(wgpu::Features::POLYGON_MODE_LINE) {
            LINE_MODE_UNSUPPORTED.call_once(|| {
                log::warn!("device lacks POLYGON_MODE_LINE; wireframe draws are filled");
            });
        }
        self.polygon_mode = mode;
    }

    #[inline]
    pub fn polygon_mode(&self) -> PolygonMode {
        self.polygon_mode
    }

    /// Binds `texture` to `unit` for the remaining draws of the pass.
    pub fn bind_texture(&mut self, unit: u32, texture: &Texture) -> Result<(), DrawError> {
        let index = unit as usize;
        if index >= MAX_TEXTURE_UNITS {
            return Err(DrawError::TextureUnit { unit });
        }

        if self.state.bind_texture(index, texture.id()) {
            self.units[index] = Some(BoundTexture {
                id: texture.id(),
                view: texture.view().clone(),
                sampler: texture.sampler().clone(),
            });
            log::trace!("texture `{}` bound to unit {unit}", texture.label());
        }
        Ok(())
    }

    /// Makes `program` current. Calling it again with the same program changes nothing.
    pub fn use_program<'p>(&'p mut self, program: &'p mut ShaderProgram) -> ActiveProgram<'p, 'e> {
        if self.state.use_program(program.id()) {
            log::trace!("program `{}` is current", program.label());
        }
        ActiveProgram::new(self, program)
    }

    fn effective_polygon_mode(&self) -> wgpu::PolygonMode {
        match self.polygon_mode {
            PolygonMode::Line if !self.gpu.supports(wgpu::Features::POLYGON_MODE_LINE) => {
                wgpu::PolygonMode::Fill
            }
            mode => mode.to_wgpu(),
        }
    }

    pub(crate) fn draw_with(
        &mut self,
        program: &mut ShaderProgram,
        vertices: &VertexArray,
    ) -> Result<(), DrawError> {
        let key = PipelineKey {
            layout: vertices.layout().clone(),
            format: self.format,
            polygon_mode: self.effective_polygon_mode(),
        };

        let linked = program.linked_for_draw()?;
        let prepared = linked.prepare(self.gpu, self.id, &key, vertices.label(), &self.units)?;

        if self.state.set_pipeline(prepared.pipeline_id) {
            self.rpass.set_pipeline(&prepared.pipeline);
        }
        if self
            .state
            .set_bind_group(prepared.bind_group_id, &prepared.dynamic_offsets)
        {
            self.rpass
                .set_bind_group(0, &prepared.bind_group, &prepared.dynamic_offsets);
        }
        if self.state.set_vertex_array(vertices.id()) {
            self.rpass
                .set_vertex_buffer(0, vertices.vertex_buffer().slice(..));
            if let Some(indices) = vertices.index_buffer() {
                self.rpass
                    .set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);
            }
        }

        match vertices.index_count() {
            Some(count) => self.rpass.draw_indexed(0..count, 0, 0..1),
            None => self.rpass.draw(0..vertices.vertex_count(), 0..1),
        }
        Ok(())
    }
}
