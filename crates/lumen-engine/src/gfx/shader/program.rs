use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;

use crate::device::GpuDevice;
use crate::gfx::pass::{BoundTexture, DrawError, MAX_TEXTURE_UNITS};
use crate::gfx::vertex::VertexLayout;
use crate::gfx::ResourceId;

use super::compile::compile_stage;
use super::error::{ShaderError, ShaderStage};
use super::link::{check_limits, link, LinkedStages, ProgramInterface};
use super::reflect::ResourceKind;
use super::source::ShaderSource;
use super::uniform_ring::UniformRing;
use super::uniforms::{UniformStore, UniformValue, UniformWrite};

/// Everything a render pipeline depends on besides the program itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct PipelineKey {
    pub layout: VertexLayout,
    pub format: wgpu::TextureFormat,
    pub polygon_mode: wgpu::PolygonMode,
}

/// A vertex + fragment stage pair linked into a drawable program.
///
/// A program whose build failed is kept as an *invalid* program: it has no GPU
/// objects, uniform writes on it are ignored and drawing with it is rejected.
/// Uniform writes and draws go through the
/// [`ActiveProgram`](crate::gfx::ActiveProgram) returned by
/// [`DrawPass::use_program`](crate::gfx::DrawPass::use_program).
pub struct ShaderProgram {
    id: ResourceId,
    label: String,
    source: ShaderSource,
    state: ProgramState,
}

enum ProgramState {
    Linked(Box<LinkedProgram>),
    Invalid,
}

impl ShaderProgram {
    /// Compiles both stages, links them and creates the GPU shader modules.
    pub fn build(gpu: &GpuDevice, label: &str, source: ShaderSource) -> Result<Self, ShaderError> {
        let vertex = compile_stage(ShaderStage::Vertex, &source.vertex)?;
        let fragment = compile_stage(ShaderStage::Fragment, &source.fragment)?;
        let linked = link(vertex, fragment)?;
        check_limits(&linked.interface, &gpu.device().limits())?;

        let program = LinkedProgram::create(gpu, label, linked);
        log::info!(
            "built shader program `{label}` ({} uniform block(s), {} texture slot(s))",
            program.interface.uniform_blocks.len(),
            program.interface.textures.len()
        );

        Ok(Self {
            id: ResourceId::next(),
            label: label.to_string(),
            source,
            state: ProgramState::Linked(Box::new(program)),
        })
    }

    /// Like [`build`](Self::build), but logs a failure and returns an invalid program.
    pub fn build_or_invalid(gpu: &GpuDevice, label: &str, source: ShaderSource) -> Self {
        match Self::build(gpu, label, source.clone()) {
            Ok(program) => program,
            Err(err) => {
                log::error!("shader program `{label}`: {err}");
                Self::invalid(label, source)
            }
        }
    }

    /// Reads both stage sources from disk and builds the program.
    pub fn from_files(
        gpu: &GpuDevice,
        label: &str,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Result<Self, ShaderError> {
        let source = ShaderSource::from_files(vertex_path, fragment_path)?;
        Self::build(gpu, label, source)
    }

    /// Like [`from_files`](Self::from_files), but never fails.
    ///
    /// Read and build errors are logged and produce an invalid program.
    pub fn load_or_invalid(
        gpu: &GpuDevice,
        label: &str,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Self {
        match ShaderSource::from_files(vertex_path, fragment_path) {
            Ok(source) => Self::build_or_invalid(gpu, label, source),
            Err(err) => {
                log::error!("shader program `{label}`: {err}");
                Self::invalid(label, ShaderSource::new("", ""))
            }
        }
    }

    /// A program that never draws.
    pub fn invalid(label: &str, source: ShaderSource) -> Self {
        Self {
            id: ResourceId::next(),
            label: label.to_string(),
            source,
            state: ProgramState::Invalid,
        }
    }

    #[inline]
    pub fn id(&self) -> ResourceId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// The two source texts the program was built from.
    pub fn source(&self) -> &ShaderSource {
        &self.source
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        matches!(self.state, ProgramState::Linked(_))
    }

    /// Reflection data, for valid programs.
    pub fn interface(&self) -> Option<&ProgramInterface> {
        match &self.state {
            ProgramState::Linked(p) => Some(&p.interface),
            ProgramState::Invalid => None,
        }
    }

    /// Staged uniform values, for valid programs.
    pub fn uniforms(&self) -> Option<&UniformStore> {
        match &self.state {
            ProgramState::Linked(p) => Some(&p.uniforms),
            ProgramState::Invalid => None,
        }
    }

    /// Texture unit each texture slot samples from, in slot order.
    pub fn texture_units(&self) -> &[u32] {
        match &self.state {
            ProgramState::Linked(p) => &p.texture_units,
            ProgramState::Invalid => &[],
        }
    }

    pub(crate) fn linked_for_draw(&mut self) -> Result<&mut LinkedProgram, DrawError> {
        match &mut self.state {
            ProgramState::Linked(p) => Ok(p.as_mut()),
            ProgramState::Invalid => Err(DrawError::InvalidProgram {
                program: self.label.clone(),
            }),
        }
    }

    /// Stages a uniform value.
    ///
    /// An `I32` written to the name of a texture variable selects the texture
    /// unit that slot samples from. Unknown names and mismatched types are
    /// ignored.
    pub(crate) fn set_uniform(&mut self, name: &str, value: UniformValue) {
        let ShaderProgram { label, state, .. } = self;
        let ProgramState::Linked(linked) = state else {
            return;
        };

        match linked.uniforms.write(name, value) {
            UniformWrite::Written => {}
            UniformWrite::TypeMismatch { expected } => {
                log::trace!(
                    "program `{label}`: uniform `{name}` is {expected}, ignoring {:?}",
                    value.value_type()
                );
            }
            UniformWrite::Unresolved => match value {
                UniformValue::I32(unit) if linked.remap_texture(name, unit) => {}
                _ => log::trace!("program `{label}`: no uniform named `{name}`"),
            },
        }
    }
}

impl std::fmt::Debug for ShaderProgram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShaderProgram")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("valid", &self.is_valid())
            .finish()
    }
}

/// GPU objects a draw binds, with the ids used to skip redundant binds.
pub(crate) struct Prepared {
    pub pipeline_id: ResourceId,
    pub pipeline: wgpu::RenderPipeline,
    pub bind_group_id: ResourceId,
    pub bind_group: wgpu::BindGroup,
    pub dynamic_offsets: Vec<u32>,
}

struct CachedPipeline {
    id: ResourceId,
    pipeline: wgpu::RenderPipeline,
}

/// A pipeline per key, or the device's reason for refusing it.
type PipelineEntry = Result<CachedPipeline, String>;

struct CachedBindGroup {
    id: ResourceId,
    textures: Vec<ResourceId>,
    uniform_generation: u64,
    group: wgpu::BindGroup,
}

/// GPU side of a valid program.
pub(crate) struct LinkedProgram {
    label: String,
    interface: ProgramInterface,
    vertex_module: wgpu::ShaderModule,
    fragment_module: wgpu::ShaderModule,
    bind_group_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    uniform_ring: UniformRing,
    uniforms: UniformStore,
    texture_units: Vec<u32>,
    pipelines: HashMap<PipelineKey, PipelineEntry>,
    bind_group: Option<CachedBindGroup>,
}

impl LinkedProgram {
    fn create(gpu: &GpuDevice, label: &str, linked: LinkedStages) -> Self {
        let device = gpu.device();
        let LinkedStages {
            vertex,
            fragment,
            interface,
        } = linked;

        let vertex_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{label} vertex stage")),
            source: wgpu::ShaderSource::Naga(Cow::Owned(vertex)),
        });
        let fragment_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{label} fragment stage")),
            source: wgpu::ShaderSource::Naga(Cow::Owned(fragment)),
        });

        let layout_entries: Vec<wgpu::BindGroupLayoutEntry> = interface
            .bindings
            .iter()
            .map(|entry| wgpu::BindGroupLayoutEntry {
                binding: entry.binding,
                visibility: entry.visibility,
                ty: match &entry.kind {
                    ResourceKind::Uniform(block) => wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: wgpu::BufferSize::new(block.size as u64),
                    },
                    ResourceKind::Texture => wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    ResourceKind::Sampler => {
                        wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering)
                    }
                },
                count: None,
            })
            .collect();

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(&format!("{label} bgl")),
            entries: &layout_entries,
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{label} pipeline layout")),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let uniform_ring = UniformRing::new(gpu, label, &interface.uniform_blocks);

        Self {
            label: label.to_string(),
            uniforms: UniformStore::new(&interface.uniform_blocks),
            texture_units: (0..interface.textures.len() as u32).collect(),
            interface,
            vertex_module,
            fragment_module,
            bind_group_layout,
            pipeline_layout,
            uniform_ring,
            pipelines: HashMap::new(),
            bind_group: None,
        }
    }

    fn remap_texture(&mut self, name: &str, unit: i32) -> bool {
        let Some(slot) = self.interface.textures.iter().position(|t| t.name == name) else {
            return false;
        };
        match usize::try_from(unit) {
            Ok(u) if u < MAX_TEXTURE_UNITS => {
                self.texture_units[slot] = u as u32;
                log::trace!("program `{}`: `{name}` samples texture unit {u}", self.label);
            }
            _ => log::warn!(
                "program `{}`: texture unit {unit} for `{name}` is out of range (0..{MAX_TEXTURE_UNITS})",
                self.label
            ),
        }
        true
    }

    /// Creates the pipeline for `key` if needed, snapshots staged uniforms for
    /// this draw and rebuilds the bind group when the bound textures changed.
    pub(crate) fn prepare(
        &mut self,
        gpu: &GpuDevice,
        pass: ResourceId,
        key: &PipelineKey,
        vertices_label: &str,
        units: &[Option<BoundTexture>],
    ) -> Result<Prepared, DrawError> {
        let (pipeline_id, pipeline) = self.ensure_pipeline(gpu, key, vertices_label)?;

        self.uniform_ring.stage(gpu, pass, &mut self.uniforms);
        let (bind_group_id, bind_group) = self.ensure_bind_group(gpu, units)?;

        Ok(Prepared {
            pipeline_id,
            pipeline,
            bind_group_id,
            bind_group,
            dynamic_offsets: self.uniform_ring.dynamic_offsets(),
        })
    }

    fn ensure_pipeline(
        &mut self,
        gpu: &GpuDevice,
        key: &PipelineKey,
        vertices_label: &str,
    ) -> Result<(ResourceId, wgpu::RenderPipeline), DrawError> {
        match self.pipelines.get(key) {
            Some(Ok(cached)) => return Ok((cached.id, cached.pipeline.clone())),
            Some(Err(message)) => {
                return Err(DrawError::Pipeline {
                    program: self.label.clone(),
                    message: message.clone(),
                });
            }
            None => {}
        }

        let attributes = key
            .layout
            .attributes_for(&self.interface.vertex_inputs)
            .map_err(|reason| DrawError::LayoutMismatch {
                program: self.label.clone(),
                vertices: vertices_label.to_string(),
                reason,
            })?;

        let label = format!("{} pipeline", self.label);
        log::debug!(
            "program `{}`: creating `{label}` for {:?}, stride {}, {:?}",
            self.label,
            key.format,
            key.layout.stride,
            key.polygon_mode
        );

        let device = gpu.device();
        let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&label),
            layout: Some(&self.pipeline_layout),

            vertex: wgpu::VertexState {
                module: &self.vertex_module,
                entry_point: Some(&self.interface.vertex_entry),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: key.layout.stride,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &attributes,
                }],
            },

            fragment: Some(wgpu::FragmentState {
                module: &self.fragment_module,
                entry_point: Some(&self.interface.fragment_entry),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: key.format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: key.polygon_mode,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        // Native error scopes resolve as soon as they are popped.
        if let Some(err) = pollster::block_on(scope.pop()) {
            let message = err.to_string();
            log::error!("program `{}`: `{label}` rejected: {message}", self.label);
            self.pipelines.insert(key.clone(), Err(message.clone()));
            return Err(DrawError::Pipeline {
                program: self.label.clone(),
                message,
            });
        }

        let id = ResourceId::next();
        log::debug!("program `{}`: `{label}` is pipeline {id}", self.label);
        self.pipelines.insert(
            key.clone(),
            Ok(CachedPipeline {
                id,
                pipeline: pipeline.clone(),
            }),
        );
        Ok((id, pipeline))
    }

    fn ensure_bind_group(
        &mut self,
        gpu: &GpuDevice,
        units: &[Option<BoundTexture>],
    ) -> Result<(ResourceId, wgpu::BindGroup), DrawError> {
        let mut bound = Vec::with_capacity(self.interface.textures.len());
        for (slot, &unit) in self.interface.textures.iter().zip(&self.texture_units) {
            match units.get(unit as usize).and_then(Option::as_ref) {
                Some(texture) => bound.push(texture),
                None => {
                    return Err(DrawError::MissingTexture {
                        program: self.label.clone(),
                        texture: slot.name.clone(),
                        unit,
                    });
                }
            }
        }
        let texture_ids: Vec<ResourceId> = bound.iter().map(|t| t.id).collect();

        if let Some(cached) = &self.bind_group {
            if cached.textures == texture_ids
                && cached.uniform_generation == self.uniform_ring.generation()
            {
                return Ok((cached.id, cached.group.clone()));
            }
        }

        let mut entries = Vec::with_capacity(self.interface.bindings.len());
        for entry in &self.interface.bindings {
            let resource = match &entry.kind {
                ResourceKind::Uniform(_) => {
                    let Some(resource) = self.uniform_ring.binding_resource(entry.binding) else {
                        continue;
                    };
                    resource
                }
                ResourceKind::Texture => {
                    let Some(i) = self
                        .interface
                        .textures
                        .iter()
                        .position(|s| s.texture_binding == entry.binding)
                    else {
                        continue;
                    };
                    wgpu::BindingResource::TextureView(&bound[i].view)
                }
                ResourceKind::Sampler => {
                    let Some(i) = self
                        .interface
                        .textures
                        .iter()
                        .position(|s| s.sampler_binding == entry.binding)
                    else {
                        continue;
                    };
                    wgpu::BindingResource::Sampler(&bound[i].sampler)
                }
            };
            entries.push(wgpu::BindGroupEntry {
                binding: entry.binding,
                resource,
            });
        }

        let group = gpu.device().create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{} bind group", self.label)),
            layout: &self.bind_group_layout,
            entries: &entries,
        });

        let id = ResourceId::next();
        self.bind_group = Some(CachedBindGroup {
            id,
            textures: texture_ids,
            uniform_generation: self.uniform_ring.generation(),
            group: group.clone(),
        });
        Ok((id, group))
    }
}
