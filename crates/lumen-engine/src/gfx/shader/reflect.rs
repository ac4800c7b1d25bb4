//! Interface data pulled out of naga IR.
//!
//! Only the subset the lessons use is modelled: 32-bit scalars, vectors and
//! float matrices for stage IO and uniforms, `texture_2d<f32>` and filtering
//! samplers for resources.

use std::fmt;

use naga::{
    AddressSpace, Binding, BuiltIn, ImageClass, ImageDimension, Interpolation, Sampling,
    ScalarKind, TypeInner,
};

/// 32-bit scalar kinds.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ScalarType {
    F32,
    I32,
    U32,
    Bool,
}

/// Shape of a stage IO variable or uniform field.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ValueType {
    Scalar(ScalarType),
    Vector { size: u8, scalar: ScalarType },
    /// Always `f32` elements.
    Matrix { columns: u8, rows: u8 },
}

impl ValueType {
    pub(crate) fn from_naga(inner: &TypeInner) -> Option<Self> {
        match *inner {
            TypeInner::Scalar(s) => scalar_type(s).map(ValueType::Scalar),
            TypeInner::Vector { size, scalar } => Some(ValueType::Vector {
                size: size as u8,
                scalar: scalar_type(scalar)?,
            }),
            TypeInner::Matrix {
                columns,
                rows,
                scalar,
            } if scalar_type(scalar) == Some(ScalarType::F32) => Some(ValueType::Matrix {
                columns: columns as u8,
                rows: rows as u8,
            }),
            _ => None,
        }
    }

    /// Size in bytes when stored in a uniform buffer.
    pub fn size(self) -> u32 {
        match self {
            ValueType::Scalar(_) => 4,
            ValueType::Vector { size, .. } => 4 * size as u32,
            ValueType::Matrix { columns, rows } => {
                let column_stride = if rows == 2 { 8 } else { 16 };
                columns as u32 * column_stride
            }
        }
    }

    /// Component count when the value is a float scalar or vector.
    pub fn float_components(self) -> Option<u8> {
        match self {
            ValueType::Scalar(ScalarType::F32) => Some(1),
            ValueType::Vector {
                size,
                scalar: ScalarType::F32,
            } => Some(size),
            _ => None,
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScalarType::F32 => "f32",
            ScalarType::I32 => "i32",
            ScalarType::U32 => "u32",
            ScalarType::Bool => "bool",
        })
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Scalar(s) => write!(f, "{s}"),
            ValueType::Vector { size, scalar } => write!(f, "vec{size}<{scalar}>"),
            ValueType::Matrix { columns, rows } => write!(f, "mat{columns}x{rows}<f32>"),
        }
    }
}

fn scalar_type(s: naga::Scalar) -> Option<ScalarType> {
    match (s.kind, s.width) {
        (ScalarKind::Float, 4) => Some(ScalarType::F32),
        (ScalarKind::Sint, 4) => Some(ScalarType::I32),
        (ScalarKind::Uint, 4) => Some(ScalarType::U32),
        (ScalarKind::Bool, _) => Some(ScalarType::Bool),
        _ => None,
    }
}

/// A `@location(n)` stage input or output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IoVariable {
    pub location: u32,
    pub name: Option<String>,
    pub ty: ValueType,
    /// As lowered by the WGSL front end, defaults already applied.
    pub interpolation: Option<Interpolation>,
    pub sampling: Option<Sampling>,
}

impl IoVariable {
    pub(crate) fn describe(&self) -> String {
        match &self.name {
            Some(name) => format!("`{name}` (location {})", self.location),
            None => format!("location {}", self.location),
        }
    }

    /// `@interpolate(..)` as written in WGSL.
    pub(crate) fn qualifier(&self) -> String {
        let interpolation = match self.interpolation {
            Some(Interpolation::Perspective) => "perspective",
            Some(Interpolation::Linear) => "linear",
            Some(Interpolation::Flat) => "flat",
            None => return "no interpolation".to_string(),
        };
        let sampling = match self.sampling {
            Some(Sampling::Center) => "center",
            Some(Sampling::Centroid) => "centroid",
            Some(Sampling::Sample) => "sample",
            Some(Sampling::First) => "first",
            Some(Sampling::Either) => "either",
            None => return format!("@interpolate({interpolation})"),
        };
        format!("@interpolate({interpolation}, {sampling})")
    }
}

/// Inputs and outputs of one entry point.
#[derive(Debug, Clone, Default)]
pub(crate) struct StageInterface {
    pub inputs: Vec<IoVariable>,
    pub outputs: Vec<IoVariable>,
    pub writes_position: bool,
}

impl StageInterface {
    /// Walks the entry point's arguments and result, flattening IO structs.
    pub fn of(module: &naga::Module, entry: &naga::EntryPoint, errors: &mut Vec<String>) -> Self {
        let mut iface = StageInterface::default();

        for arg in &entry.function.arguments {
            let mut builtin_position = false;
            collect_io(
                module,
                arg.name.as_deref(),
                arg.ty,
                arg.binding.as_ref(),
                &mut iface.inputs,
                &mut builtin_position,
                errors,
            );
        }

        if let Some(result) = &entry.function.result {
            collect_io(
                module,
                None,
                result.ty,
                result.binding.as_ref(),
                &mut iface.outputs,
                &mut iface.writes_position,
                errors,
            );
        }

        iface.inputs.sort_by_key(|v| v.location);
        iface.outputs.sort_by_key(|v| v.location);
        iface
    }

    pub fn output(&self, location: u32) -> Option<&IoVariable> {
        self.outputs.iter().find(|v| v.location == location)
    }
}

fn collect_io(
    module: &naga::Module,
    name: Option<&str>,
    ty: naga::Handle<naga::Type>,
    binding: Option<&Binding>,
    out: &mut Vec<IoVariable>,
    position: &mut bool,
    errors: &mut Vec<String>,
) {
    let inner = &module.types[ty].inner;
    match binding {
        Some(Binding::Location {
            location,
            interpolation,
            sampling,
            ..
        }) => match ValueType::from_naga(inner) {
            Some(ty) => out.push(IoVariable {
                location: *location,
                name: name.map(str::to_owned),
                ty,
                interpolation: *interpolation,
                sampling: *sampling,
            }),
            None => errors.push(format!(
                "unsupported type for stage variable at location {location}"
            )),
        },
        Some(Binding::BuiltIn(BuiltIn::Position { .. })) => *position = true,
        Some(Binding::BuiltIn(_)) => {}
        None => {
            if let TypeInner::Struct { members, .. } = inner {
                for member in members {
                    collect_io(
                        module,
                        member.name.as_deref(),
                        member.ty,
                        member.binding.as_ref(),
                        out,
                        position,
                        errors,
                    );
                }
            }
        }
    }
}

/// One named, addressable member of a uniform block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformField {
    pub name: String,
    pub offset: u32,
    pub ty: ValueType,
}

/// A `var<uniform>` in bind group 0.
///
/// A block declared with a bare type (`var<uniform> transform: mat4x4<f32>`)
/// has a single field named after the variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformBlock {
    pub name: String,
    pub binding: u32,
    /// Buffer size, rounded up to 16 bytes.
    pub size: u32,
    pub fields: Vec<UniformField>,
}

impl UniformBlock {
    /// Resolves `field` or `block.field`.
    pub fn field(&self, name: &str) -> Option<&UniformField> {
        let local = match name.split_once('.') {
            Some((block, field)) if block == self.name => field,
            Some(_) => return None,
            None => name,
        };
        self.fields.iter().find(|f| f.name == local)
    }

    /// Same buffer shape, ignoring the variable name.
    pub(crate) fn same_layout(&self, other: &UniformBlock) -> bool {
        self.size == other.size
            && self.fields.len() == other.fields.len()
            && self
                .fields
                .iter()
                .zip(&other.fields)
                .all(|(a, b)| a.offset == b.offset && a.ty == b.ty)
    }
}

/// What a bind group 0 entry holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ResourceKind {
    Uniform(UniformBlock),
    Texture,
    Sampler,
}

impl ResourceKind {
    fn describe(&self) -> &'static str {
        match self {
            ResourceKind::Uniform(_) => "uniform buffer",
            ResourceKind::Texture => "texture_2d<f32>",
            ResourceKind::Sampler => "sampler",
        }
    }

    pub fn compatible(&self, other: &ResourceKind) -> bool {
        match (self, other) {
            (ResourceKind::Uniform(a), ResourceKind::Uniform(b)) => a.same_layout(b),
            (ResourceKind::Texture, ResourceKind::Texture) => true,
            (ResourceKind::Sampler, ResourceKind::Sampler) => true,
            _ => false,
        }
    }
}

/// A resource global declared by one module.
#[derive(Debug, Clone)]
pub(crate) struct ResourceDecl {
    pub name: String,
    pub binding: u32,
    pub kind: ResourceKind,
}

impl ResourceDecl {
    pub fn describe(&self) -> String {
        format!(
            "`{}` ({} at binding {})",
            self.name,
            self.kind.describe(),
            self.binding
        )
    }
}

/// Collects the uniform, texture and sampler globals of `module`.
///
/// Anything outside group 0 or outside the supported resource set is reported
/// in `errors`.
pub(crate) fn module_resources(module: &naga::Module, errors: &mut Vec<String>) -> Vec<ResourceDecl> {
    let mut out = Vec::new();

    for (_, var) in module.global_variables.iter() {
        let name = var.name.clone().unwrap_or_else(|| "<unnamed>".to_string());

        match var.space {
            AddressSpace::Uniform | AddressSpace::Handle => {}
            AddressSpace::Storage { .. } => {
                errors.push(format!("storage buffer `{name}` is not supported"));
                continue;
            }
            _ => continue,
        }

        let Some(rb) = &var.binding else {
            errors.push(format!("resource `{name}` has no @group/@binding"));
            continue;
        };
        if rb.group != 0 {
            errors.push(format!(
                "resource `{name}` is in bind group {}; only group 0 is supported",
                rb.group
            ));
            continue;
        }

        let inner = &module.types[var.ty].inner;
        let kind = match (var.space, inner) {
            (AddressSpace::Uniform, _) => match uniform_block(module, &name, rb.binding, inner) {
                Some(block) => ResourceKind::Uniform(block),
                None => {
                    errors.push(format!("uniform `{name}` has an unsupported type"));
                    continue;
                }
            },
            (
                _,
                TypeInner::Image {
                    dim: ImageDimension::D2,
                    arrayed: false,
                    class:
                        ImageClass::Sampled {
                            kind: ScalarKind::Float,
                            multi: false,
                        },
                },
            ) => ResourceKind::Texture,
            (_, TypeInner::Image { .. }) => {
                errors.push(format!(
                    "texture `{name}` must be a texture_2d<f32>; other texture types are not supported"
                ));
                continue;
            }
            (_, TypeInner::Sampler { comparison: false }) => ResourceKind::Sampler,
            (_, TypeInner::Sampler { comparison: true }) => {
                errors.push(format!("comparison sampler `{name}` is not supported"));
                continue;
            }
            _ => {
                errors.push(format!("resource `{name}` has an unsupported type"));
                continue;
            }
        };

        out.push(ResourceDecl {
            name,
            binding: rb.binding,
            kind,
        });
    }

    out.sort_by_key(|r| r.binding);
    out
}

fn uniform_block(
    module: &naga::Module,
    name: &str,
    binding: u32,
    inner: &TypeInner,
) -> Option<UniformBlock> {
    let (fields, size) = match inner {
        TypeInner::Struct { members, span } => {
            let fields = members
                .iter()
                .filter_map(|m| {
                    let ty = ValueType::from_naga(&module.types[m.ty].inner)?;
                    Some(UniformField {
                        name: m.name.clone()?,
                        offset: m.offset,
                        ty,
                    })
                })
                .collect();
            (fields, *span)
        }
        other => {
            let ty = ValueType::from_naga(other)?;
            let field = UniformField {
                name: name.to_string(),
                offset: 0,
                ty,
            };
            (vec![field], ty.size())
        }
    };

    Some(UniformBlock {
        name: name.to_string(),
        binding,
        size: size.next_multiple_of(16).max(16),
        fields,
    })
}
