use std::collections::BTreeMap;

use crate::gfx::pass::MAX_TEXTURE_UNITS;

use super::compile::CompiledStage;
use super::error::{ShaderError, ShaderStage};
use super::reflect::{
    module_resources, IoVariable, ResourceDecl, ResourceKind, StageInterface, UniformBlock,
};

/// A `texture_2d` / `sampler` pair sampled through one texture unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureSlot {
    /// Texture variable name; `set_i32(name, unit)` remaps the slot.
    pub name: String,
    pub texture_binding: u32,
    pub sampler_binding: u32,
}

/// One bind group 0 entry with the stages that read it.
#[derive(Debug, Clone)]
pub(crate) struct BindingEntry {
    pub binding: u32,
    pub visibility: wgpu::ShaderStages,
    pub kind: ResourceKind,
}

/// Reflection data of a linked program.
#[derive(Debug, Clone)]
pub struct ProgramInterface {
    pub vertex_entry: String,
    pub fragment_entry: String,
    /// Vertex stage inputs, sorted by location.
    pub vertex_inputs: Vec<IoVariable>,
    pub uniform_blocks: Vec<UniformBlock>,
    /// Texture slots in binding order; slot `i` samples unit `i` by default.
    pub textures: Vec<TextureSlot>,
    pub(crate) bindings: Vec<BindingEntry>,
}

/// Both stage modules plus the interface they agreed on.
#[derive(Debug)]
pub struct LinkedStages {
    pub(crate) vertex: naga::Module,
    pub(crate) fragment: naga::Module,
    pub interface: ProgramInterface,
}

/// Checks that two compiled stages form a usable program.
///
/// Every problem found is collected into the error log rather than stopping
/// at the first one.
pub fn link(vertex: CompiledStage, fragment: CompiledStage) -> Result<LinkedStages, ShaderError> {
    let mut errors = Vec::new();

    for (stage, expected) in [
        (&vertex, ShaderStage::Vertex),
        (&fragment, ShaderStage::Fragment),
    ] {
        if stage.stage != expected {
            errors.push(format!(
                "{expected} slot was given a {} stage",
                stage.stage
            ));
        }
    }
    if !errors.is_empty() {
        return Err(link_error(errors));
    }

    let vs = StageInterface::of(&vertex.module, vertex.entry(), &mut errors);
    let fs = StageInterface::of(&fragment.module, fragment.entry(), &mut errors);

    if !vs.writes_position {
        errors.push("vertex stage does not write @builtin(position)".to_string());
    }

    for input in &fs.inputs {
        match vs.output(input.location) {
            None => errors.push(format!(
                "fragment input {} is not written by the vertex stage",
                input.describe()
            )),
            Some(out) if out.ty != input.ty => errors.push(format!(
                "fragment input {} is {} but the vertex stage writes {}",
                input.describe(),
                input.ty,
                out.ty
            )),
            Some(out)
                if out.interpolation != input.interpolation || out.sampling != input.sampling =>
            {
                errors.push(format!(
                    "fragment input {} uses {} but the vertex stage writes it with {}",
                    input.describe(),
                    input.qualifier(),
                    out.qualifier()
                ))
            }
            Some(_) => {}
        }
    }

    match fs.output(0) {
        None => errors.push("fragment stage does not write @location(0)".to_string()),
        Some(out) if out.ty.float_components() != Some(4) => errors.push(format!(
            "fragment output {} is {}; color targets need vec4<f32>",
            out.describe(),
            out.ty
        )),
        Some(_) => {}
    }

    let bindings = merge_resources(
        [
            (ShaderStage::Vertex, module_resources(&vertex.module, &mut errors)),
            (ShaderStage::Fragment, module_resources(&fragment.module, &mut errors)),
        ],
        &mut errors,
    );

    let textures = pair_textures(&bindings, &mut errors);

    if !errors.is_empty() {
        return Err(link_error(errors));
    }

    let uniform_blocks = bindings
        .values()
        .filter_map(|(decl, _)| match &decl.kind {
            ResourceKind::Uniform(block) => Some(block.clone()),
            _ => None,
        })
        .collect();

    let bindings = bindings
        .into_values()
        .map(|(decl, visibility)| BindingEntry {
            binding: decl.binding,
            visibility,
            kind: decl.kind,
        })
        .collect();

    let interface = ProgramInterface {
        vertex_entry: vertex.entry_point().to_string(),
        fragment_entry: fragment.entry_point().to_string(),
        vertex_inputs: vs.inputs,
        uniform_blocks,
        textures,
        bindings,
    };

    Ok(LinkedStages {
        vertex: vertex.module,
        fragment: fragment.module,
        interface,
    })
}

/// Checks a linked interface against what `limits` allow in one pipeline.
///
/// Every uniform block is bound with a dynamic offset, so the block count is
/// bounded by the dynamic uniform buffer limit as well as the per-stage one.
pub(crate) fn check_limits(
    interface: &ProgramInterface,
    limits: &wgpu::Limits,
) -> Result<(), ShaderError> {
    let mut errors = Vec::new();

    let blocks = interface.uniform_blocks.len() as u32;
    if blocks > limits.max_dynamic_uniform_buffers_per_pipeline_layout {
        errors.push(format!(
            "{blocks} uniform blocks declared; the device allows {} per program",
            limits.max_dynamic_uniform_buffers_per_pipeline_layout
        ));
    }

    for name in [ShaderStage::Vertex, ShaderStage::Fragment] {
        let stage = name.to_wgpu();
        let count = |kind: fn(&ResourceKind) -> bool| {
            interface
                .bindings
                .iter()
                .filter(|b| b.visibility.contains(stage) && kind(&b.kind))
                .count() as u32
        };

        let uniforms = count(|k| matches!(k, ResourceKind::Uniform(_)));
        if uniforms > limits.max_uniform_buffers_per_shader_stage {
            errors.push(format!(
                "{name} stage reads {uniforms} uniform blocks; the device allows {}",
                limits.max_uniform_buffers_per_shader_stage
            ));
        }
        let textures = count(|k| *k == ResourceKind::Texture);
        if textures > limits.max_sampled_textures_per_shader_stage {
            errors.push(format!(
                "{name} stage samples {textures} textures; the device allows {}",
                limits.max_sampled_textures_per_shader_stage
            ));
        }
    }

    for block in &interface.uniform_blocks {
        if block.size > limits.max_uniform_buffer_binding_size {
            errors.push(format!(
                "uniform block `{}` is {} bytes; the device allows {}",
                block.name, block.size, limits.max_uniform_buffer_binding_size
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(link_error(errors))
    }
}

fn link_error(errors: Vec<String>) -> ShaderError {
    ShaderError::Link {
        log: errors.join("\n"),
    }
}

type MergedBindings = BTreeMap<u32, (ResourceDecl, wgpu::ShaderStages)>;

fn merge_resources(
    stages: [(ShaderStage, Vec<ResourceDecl>); 2],
    errors: &mut Vec<String>,
) -> MergedBindings {
    let mut merged = MergedBindings::new();

    for (stage, decls) in stages {
        for decl in decls {
            match merged.get_mut(&decl.binding) {
                None => {
                    merged.insert(decl.binding, (decl, stage.to_wgpu()));
                }
                Some((existing, visibility)) => {
                    if existing.kind.compatible(&decl.kind) {
                        *visibility |= stage.to_wgpu();
                    } else {
                        errors.push(format!(
                            "binding {} is declared as {} by the vertex stage and as {} by the fragment stage",
                            decl.binding,
                            existing.describe(),
                            decl.describe()
                        ));
                    }
                }
            }
        }
    }

    merged
}

fn pair_textures(bindings: &MergedBindings, errors: &mut Vec<String>) -> Vec<TextureSlot> {
    let textures: Vec<&ResourceDecl> = bindings
        .values()
        .map(|(d, _)| d)
        .filter(|d| d.kind == ResourceKind::Texture)
        .collect();
    let samplers: Vec<&ResourceDecl> = bindings
        .values()
        .map(|(d, _)| d)
        .filter(|d| d.kind == ResourceKind::Sampler)
        .collect();

    if textures.len() != samplers.len() {
        errors.push(format!(
            "{} texture(s) but {} sampler(s); each texture_2d needs its own sampler",
            textures.len(),
            samplers.len()
        ));
        return Vec::new();
    }

    if textures.len() > MAX_TEXTURE_UNITS {
        errors.push(format!(
            "{} textures declared; at most {MAX_TEXTURE_UNITS} texture units are available",
            textures.len()
        ));
        return Vec::new();
    }

    textures
        .into_iter()
        .zip(samplers)
        .map(|(t, s)| TextureSlot {
            name: t.name.clone(),
            texture_binding: t.binding,
            sampler_binding: s.binding,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::shader::compile::compile_stage;

    fn link_src(vs: &str, fs: &str) -> Result<LinkedStages, ShaderError> {
        let vertex = compile_stage(ShaderStage::Vertex, vs).unwrap();
        let fragment = compile_stage(ShaderStage::Fragment, fs).unwrap();
        link(vertex, fragment)
    }

    fn link_log(vs: &str, fs: &str) -> String {
        match link_src(vs, fs) {
            Err(ShaderError::Link { log }) => log,
            other => panic!("expected a link error, got {other:?}"),
        }
    }

    const COLOR_VS: &str = r#"
struct VsOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) color: vec3<f32>,
};
@vertex
fn vs_main(@location(0) pos: vec3<f32>, @location(1) color: vec3<f32>) -> VsOut {
    var out: VsOut;
    out.clip = vec4<f32>(pos, 1.0);
    out.color = color;
    return out;
}
"#;

    const COLOR_FS: &str = r#"
@fragment
fn fs_main(@location(0) color: vec3<f32>) -> @location(0) vec4<f32> {
    return vec4<f32>(color, 1.0);
}
"#;

    #[test]
    fn matching_stages_link() {
        let linked = link_src(COLOR_VS, COLOR_FS).unwrap();
        let iface = &linked.interface;
        assert_eq!(iface.vertex_entry, "vs_main");
        assert_eq!(iface.fragment_entry, "fs_main");
        assert_eq!(iface.vertex_inputs.len(), 2);
        assert!(iface.textures.is_empty());
        assert!(iface.bindings.is_empty());
    }

    #[test]
    fn missing_varying_fails() {
        let vs = r#"
@vertex
fn vs_main(@location(0) pos: vec3<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(pos, 1.0);
}
"#;
        let log = link_log(vs, COLOR_FS);
        assert!(log.contains("`color` (location 0) is not written"), "{log}");
    }

    #[test]
    fn varying_type_mismatch_fails() {
        let fs = r#"
@fragment
fn fs_main(@location(0) color: vec4<f32>) -> @location(0) vec4<f32> {
    return color;
}
"#;
        let log = link_log(COLOR_VS, fs);
        assert!(log.contains("vec4<f32> but the vertex stage writes vec3<f32>"), "{log}");
    }

    #[test]
    fn color_output_must_be_vec4() {
        let fs = r#"
@fragment
fn fs_main(@location(0) color: vec3<f32>) -> @location(0) vec3<f32> {
    return color;
}
"#;
        let log = link_log(COLOR_VS, fs);
        assert!(log.contains("is vec3<f32>; color targets need vec4<f32>"), "{log}");
    }

    #[test]
    fn varying_interpolation_mismatch_fails() {
        let vs = r#"
struct VsOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) @interpolate(flat) color: vec3<f32>,
};
@vertex
fn vs_main(@location(0) pos: vec3<f32>) -> VsOut {
    var out: VsOut;
    out.clip = vec4<f32>(pos, 1.0);
    out.color = pos;
    return out;
}
"#;
        let log = link_log(vs, COLOR_FS);
        assert!(log.contains("uses @interpolate(perspective, center)"), "{log}");
        assert!(log.contains("writes it with @interpolate(flat"), "{log}");
    }

    #[test]
    fn varying_sampling_mismatch_fails() {
        let fs = r#"
@fragment
fn fs_main(@location(0) @interpolate(perspective, centroid) color: vec3<f32>) -> @location(0) vec4<f32> {
    return vec4<f32>(color, 1.0);
}
"#;
        let log = link_log(COLOR_VS, fs);
        assert!(log.contains("@interpolate(perspective, centroid)"), "{log}");
    }

    fn uniform_heavy_program(blocks: u32) -> LinkedStages {
        let mut vs = String::new();
        let mut sum = String::from("vec4<f32>(pos, 1.0)");
        for i in 0..blocks {
            vs.push_str(&format!("@group(0) @binding({i}) var<uniform> u{i}: vec4<f32>;\n"));
            sum.push_str(&format!(" + u{i}"));
        }
        vs.push_str(&format!(
            "@vertex\nfn vs_main(@location(0) pos: vec3<f32>) -> @builtin(position) vec4<f32> {{ return {sum}; }}\n"
        ));
        let fs = "@fragment\nfn fs_main() -> @location(0) vec4<f32> { return vec4<f32>(1.0); }\n";
        link_src(&vs, fs).unwrap()
    }

    #[test]
    fn uniform_block_count_is_bounded_by_limits() {
        let limits = wgpu::Limits::downlevel_defaults();
        let allowed = limits.max_dynamic_uniform_buffers_per_pipeline_layout;

        let fits = uniform_heavy_program(allowed);
        assert!(check_limits(&fits.interface, &limits).is_ok());

        let over = uniform_heavy_program(allowed + 1);
        let Err(ShaderError::Link { log }) = check_limits(&over.interface, &limits) else {
            panic!("expected a link error");
        };
        assert!(log.contains(&format!("{} uniform blocks declared", allowed + 1)), "{log}");
    }

    #[test]
    fn shared_uniform_must_agree() {
        let vs = r#"
@group(0) @binding(0) var<uniform> transform: mat4x4<f32>;
@vertex
fn vs_main(@location(0) pos: vec3<f32>) -> @builtin(position) vec4<f32> {
    return transform * vec4<f32>(pos, 1.0);
}
"#;
        let fs = r#"
@group(0) @binding(0) var<uniform> tint: vec4<f32>;
@fragment
fn fs_main() -> @location(0) vec4<f32> { return tint; }
"#;
        let log = link_log(vs, fs);
        assert!(log.contains("binding 0"), "{log}");
    }

    #[test]
    fn shared_uniform_gets_both_stages() {
        let vs = r#"
@group(0) @binding(0) var<uniform> tint: vec4<f32>;
@vertex
fn vs_main(@location(0) pos: vec3<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(pos, tint.w);
}
"#;
        let fs = r#"
@group(0) @binding(0) var<uniform> tint: vec4<f32>;
@fragment
fn fs_main() -> @location(0) vec4<f32> { return tint; }
"#;
        let linked = link_src(vs, fs).unwrap();
        let iface = linked.interface;
        assert_eq!(iface.uniform_blocks.len(), 1);
        assert_eq!(iface.bindings[0].visibility, wgpu::ShaderStages::VERTEX_FRAGMENT);
    }

    #[test]
    fn textures_pair_with_samplers_in_binding_order() {
        let fs = r#"
@group(0) @binding(1) var texture1: texture_2d<f32>;
@group(0) @binding(2) var sampler1: sampler;
@group(0) @binding(3) var texture2: texture_2d<f32>;
@group(0) @binding(4) var sampler2: sampler;
@fragment
fn fs_main(@location(0) color: vec3<f32>) -> @location(0) vec4<f32> {
    let uv = color.xy;
    return textureSample(texture1, sampler1, uv) * textureSample(texture2, sampler2, uv);
}
"#;
        let linked = link_src(COLOR_VS, fs).unwrap();
        let slots = linked.interface.textures;
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].name, "texture1");
        assert_eq!((slots[0].texture_binding, slots[0].sampler_binding), (1, 2));
        assert_eq!(slots[1].name, "texture2");
        assert_eq!((slots[1].texture_binding, slots[1].sampler_binding), (3, 4));
    }

    #[test]
    fn unpaired_texture_fails() {
        let fs = r#"
@group(0) @binding(0) var tex: texture_2d<f32>;
@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return textureLoad(tex, vec2<i32>(0, 0), 0);
}
"#;
        let log = link_log(COLOR_VS, fs);
        assert!(log.contains("1 texture(s) but 0 sampler(s)"), "{log}");
    }

    #[test]
    fn all_problems_are_reported_together() {
        let vs = r#"
struct VsOut {
    @builtin(position) clip: vec4<f32>,
    @location(1) extra: vec4<f32>,
};
@vertex
fn vs_main() -> VsOut {
    var out: VsOut;
    out.clip = vec4<f32>(0.0);
    out.extra = vec4<f32>(1.0);
    return out;
}
"#;
        let fs = r#"
@fragment
fn fs_main(@location(3) v: f32) -> @location(1) vec4<f32> { return vec4<f32>(v); }
"#;
        let log = link_log(vs, fs);
        assert!(log.contains("location 3"), "{log}");
        assert!(log.contains("@location(0)"), "{log}");
        assert_eq!(log.lines().count(), 2);
    }
}
