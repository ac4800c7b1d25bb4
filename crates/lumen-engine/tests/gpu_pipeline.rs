//! End-to-end checks against a headless device.
//!
//! Each test skips (passes without asserting) when no adapter is available.
//! wgpu's default error handler panics on validation errors, so a test that
//! finishes also proves its draws raised none.

use lumen_engine::coords::Viewport;
use lumen_engine::device::{readback, GpuDevice, GpuInit};
use lumen_engine::gfx::{
    DecodedImage, DrawError, DrawPass, ShaderError, ShaderProgram, ShaderSource, Texture,
    TextureError, TextureOptions, VertexArray, VertexLayout,
};
use lumen_engine::paint::Color;

const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
const SIZE: u32 = 64;

const QUAD: [f32; 12] = [
    0.5, 0.5, 0.0, //
    0.5, -0.5, 0.0, //
    -0.5, -0.5, 0.0, //
    -0.5, 0.5, 0.0, //
];
const QUAD_INDICES: [u32; 6] = [0, 1, 3, 1, 2, 3];

const POSITION_VS: &str = r#"
@vertex
fn vs_main(@location(0) pos: vec3<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(pos, 1.0);
}
"#;

const WHITE_FS: &str = r#"
@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0, 1.0, 1.0, 1.0);
}
"#;

const UNIFORM_FS: &str = r#"
@group(0) @binding(0) var<uniform> ourColor: vec4<f32>;

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return ourColor;
}
"#;

const TEXTURED_VS: &str = r#"
struct VsOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(@location(0) pos: vec3<f32>, @location(1) uv: vec2<f32>) -> VsOut {
    var out: VsOut;
    out.clip = vec4<f32>(pos, 1.0);
    out.uv = uv;
    return out;
}
"#;

const TEXTURED_FS: &str = r#"
@group(0) @binding(0) var tex: texture_2d<f32>;
@group(0) @binding(1) var tex_sampler: sampler;

@fragment
fn fs_main(@location(0) uv: vec2<f32>) -> @location(0) vec4<f32> {
    return textureSample(tex, tex_sampler, uv);
}
"#;

fn device() -> Option<GpuDevice> {
    match GpuDevice::headless(&GpuInit::default()) {
        Ok(gpu) => Some(gpu),
        Err(err) => {
            eprintln!("skipping: {err}");
            None
        }
    }
}

/// Renders into a fresh `SIZE` x `SIZE` target cleared to black and reads it back.
fn render(
    gpu: &GpuDevice,
    viewport: Viewport,
    draw: impl FnOnce(&mut DrawPass<'_>) -> Result<(), DrawError>,
) -> (Result<(), DrawError>, Vec<u8>) {
    let target = gpu.device().create_texture(&wgpu::TextureDescriptor {
        label: Some("test target"),
        size: wgpu::Extent3d {
            width: SIZE,
            height: SIZE,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: TARGET_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let view = target.create_view(&wgpu::TextureViewDescriptor::default());
    let mut encoder = gpu
        .device()
        .create_command_encoder(&wgpu::CommandEncoderDescriptor::default());

    let result = {
        let mut pass = DrawPass::begin(
            gpu,
            &mut encoder,
            &view,
            TARGET_FORMAT,
            viewport,
            Color::BLACK,
        );
        draw(&mut pass)
    };
    gpu.queue().submit(std::iter::once(encoder.finish()));

    let pixels = readback::read_texture(gpu, &target).unwrap();
    (result, pixels)
}

fn full_viewport() -> Viewport {
    Viewport::from_size(SIZE, SIZE)
}

fn pixel(pixels: &[u8], x: u32, y: u32) -> [u8; 4] {
    let i = ((y * SIZE + x) * 4) as usize;
    [pixels[i], pixels[i + 1], pixels[i + 2], pixels[i + 3]]
}

fn covered(pixels: &[u8]) -> Vec<(u32, u32)> {
    (0..SIZE)
        .flat_map(|y| (0..SIZE).map(move |x| (x, y)))
        .filter(|&(x, y)| pixel(pixels, x, y)[0] > 0)
        .collect()
}

fn program(gpu: &GpuDevice, label: &str, vs: &str, fs: &str) -> ShaderProgram {
    ShaderProgram::build(gpu, label, ShaderSource::new(vs, fs)).unwrap()
}

#[test]
fn upload_round_trip_is_byte_exact() {
    let Some(gpu) = device() else { return };
    let layout = VertexLayout::interleaved(&[3]).unwrap();
    let va = VertexArray::upload(&gpu, "quad", &QUAD, layout, Some(&QUAD_INDICES)).unwrap();

    assert_eq!(va.vertex_count(), 4);
    assert_eq!(va.index_count(), Some(6));
    assert_eq!(va.read_back(&gpu).unwrap(), QUAD.to_vec());
    assert_eq!(
        va.read_back_indices(&gpu).unwrap(),
        Some(QUAD_INDICES.to_vec())
    );
}

#[test]
fn indexed_unit_square_covers_exactly_the_center() {
    let Some(gpu) = device() else { return };
    let mut white = program(&gpu, "white", POSITION_VS, WHITE_FS);
    let layout = VertexLayout::interleaved(&[3]).unwrap();
    let quad = VertexArray::upload(&gpu, "quad", &QUAD, layout, Some(&QUAD_INDICES)).unwrap();

    let (result, pixels) = render(&gpu, full_viewport(), |pass| {
        pass.use_program(&mut white).draw(&quad)
    });
    assert_eq!(result, Ok(()));

    let covered = covered(&pixels);
    assert_eq!(covered.len(), 32 * 32);
    assert!(covered
        .iter()
        .all(|&(x, y)| (16..48).contains(&x) && (16..48).contains(&y)));
}

#[test]
fn sequential_triangle_draws_without_indices() {
    let Some(gpu) = device() else { return };
    let mut white = program(&gpu, "white", POSITION_VS, WHITE_FS);
    let tri = [-0.5f32, -0.5, 0.0, 0.5, -0.5, 0.0, 0.0, 0.5, 0.0];
    let va = VertexArray::upload(
        &gpu,
        "triangle",
        &tri,
        VertexLayout::interleaved(&[3]).unwrap(),
        None,
    )
    .unwrap();

    let (result, pixels) = render(&gpu, full_viewport(), |pass| {
        pass.use_program(&mut white).draw(&va)
    });
    assert_eq!(result, Ok(()));
    assert_eq!(pixel(&pixels, 32, 40), [255, 255, 255, 255]);
    assert_eq!(pixel(&pixels, 2, 2), [0, 0, 0, 255]);
}

#[test]
fn uniform_value_reaches_the_fragment_stage() {
    let Some(gpu) = device() else { return };
    let mut tinted = program(&gpu, "tinted", POSITION_VS, UNIFORM_FS);
    let quad = VertexArray::upload(
        &gpu,
        "quad",
        &QUAD,
        VertexLayout::interleaved(&[3]).unwrap(),
        Some(&QUAD_INDICES),
    )
    .unwrap();

    let (result, pixels) = render(&gpu, full_viewport(), |pass| {
        let mut active = pass.use_program(&mut tinted);
        active.set_vec4("ourColor", [0.0, 1.0, 0.0, 1.0]);
        active.set_f32("does_not_exist", 3.0);
        active.draw(&quad)
    });
    assert_eq!(result, Ok(()));
    assert_eq!(pixel(&pixels, 32, 32), [0, 255, 0, 255]);
}

#[test]
fn each_draw_sees_the_uniforms_written_before_it() {
    let Some(gpu) = device() else { return };
    let mut tinted = program(&gpu, "tinted", POSITION_VS, UNIFORM_FS);
    let half = |x0: f32, x1: f32| [x1, 1.0, 0.0, x1, -1.0, 0.0, x0, -1.0, 0.0, x0, 1.0, 0.0];
    let layout = VertexLayout::interleaved(&[3]).unwrap();
    let left = VertexArray::upload(
        &gpu,
        "left",
        &half(-1.0, 0.0),
        layout.clone(),
        Some(&QUAD_INDICES),
    )
    .unwrap();
    let right =
        VertexArray::upload(&gpu, "right", &half(0.0, 1.0), layout, Some(&QUAD_INDICES)).unwrap();

    let (result, pixels) = render(&gpu, full_viewport(), |pass| {
        let mut active = pass.use_program(&mut tinted);
        active.set_color("ourColor", Color::rgb(1.0, 0.0, 0.0));
        active.draw(&left)?;
        active.set_color("ourColor", Color::rgb(0.0, 0.0, 1.0));
        active.draw(&right)
    });
    assert_eq!(result, Ok(()));
    assert_eq!(pixel(&pixels, 16, 32), [255, 0, 0, 255]);
    assert_eq!(pixel(&pixels, 48, 32), [0, 0, 255, 255]);
}

#[test]
fn textured_quad_samples_bound_texture() {
    let Some(gpu) = device() else { return };
    let mut textured = program(&gpu, "textured", TEXTURED_VS, TEXTURED_FS);
    #[rustfmt::skip]
    let vertices = [
        1.0f32, 1.0, 0.0,   1.0, 1.0,
        1.0, -1.0, 0.0,     1.0, 0.0,
        -1.0, -1.0, 0.0,    0.0, 0.0,
        -1.0, 1.0, 0.0,     0.0, 1.0,
    ];
    let quad = VertexArray::upload(
        &gpu,
        "textured quad",
        &vertices,
        VertexLayout::interleaved(&[3, 2]).unwrap(),
        Some(&QUAD_INDICES),
    )
    .unwrap();
    let red = Texture::from_image(
        &gpu,
        "red",
        &DecodedImage::solid(4, 4, [255, 0, 0, 255]),
        &TextureOptions::default(),
    )
    .unwrap();
    assert_eq!(red.mip_level_count(), 3);

    let (result, pixels) = render(&gpu, full_viewport(), |pass| {
        pass.bind_texture(0, &red)?;
        pass.use_program(&mut textured).draw(&quad)
    });
    assert_eq!(result, Ok(()));
    assert_eq!(pixel(&pixels, 32, 32), [255, 0, 0, 255]);
}

#[test]
fn missing_texture_is_rejected() {
    let Some(gpu) = device() else { return };
    let mut textured = program(&gpu, "textured", TEXTURED_VS, TEXTURED_FS);
    let quad = VertexArray::upload(
        &gpu,
        "quad",
        &[0.0f32; 20],
        VertexLayout::interleaved(&[3, 2]).unwrap(),
        None,
    )
    .unwrap();

    let (result, _) = render(&gpu, full_viewport(), |pass| {
        pass.use_program(&mut textured).draw(&quad)
    });
    assert!(matches!(
        result,
        Err(DrawError::MissingTexture { unit: 0, .. })
    ));
}

#[test]
fn layout_mismatch_is_rejected() {
    let Some(gpu) = device() else { return };
    let mut textured = program(&gpu, "textured", TEXTURED_VS, TEXTURED_FS);
    let positions_only = VertexArray::upload(
        &gpu,
        "positions",
        &QUAD,
        VertexLayout::interleaved(&[3]).unwrap(),
        None,
    )
    .unwrap();
    let fallback = Texture::fallback(&gpu, "white");

    let (result, _) = render(&gpu, full_viewport(), |pass| {
        pass.bind_texture(0, &fallback)?;
        pass.use_program(&mut textured).draw(&positions_only)
    });
    assert!(matches!(result, Err(DrawError::LayoutMismatch { .. })));
}

#[test]
fn malformed_source_yields_log_and_invalid_program() {
    let Some(gpu) = device() else { return };
    let source = ShaderSource::new(POSITION_VS, "@fragment fn fs_main( -> {");

    match ShaderProgram::build(&gpu, "broken", source.clone()) {
        Err(ShaderError::Compile { log, .. }) => assert!(!log.trim().is_empty()),
        other => panic!("expected a compile error, got {other:?}"),
    }

    let mut broken = ShaderProgram::build_or_invalid(&gpu, "broken", source);
    assert!(!broken.is_valid());
    assert!(broken.interface().is_none());

    let quad = VertexArray::upload(
        &gpu,
        "quad",
        &QUAD,
        VertexLayout::interleaved(&[3]).unwrap(),
        None,
    )
    .unwrap();
    let (result, pixels) = render(&gpu, full_viewport(), |pass| {
        pass.use_program(&mut broken).draw(&quad)
    });
    assert!(matches!(result, Err(DrawError::InvalidProgram { .. })));
    assert!(covered(&pixels).is_empty());
}

#[test]
fn using_a_program_twice_is_the_same_as_once() {
    let Some(gpu) = device() else { return };
    let mut white = program(&gpu, "white", POSITION_VS, WHITE_FS);
    let quad = VertexArray::upload(
        &gpu,
        "quad",
        &QUAD,
        VertexLayout::interleaved(&[3]).unwrap(),
        Some(&QUAD_INDICES),
    )
    .unwrap();

    let (once, once_pixels) = render(&gpu, full_viewport(), |pass| {
        pass.use_program(&mut white).draw(&quad)
    });
    let (twice, twice_pixels) = render(&gpu, full_viewport(), |pass| {
        pass.use_program(&mut white);
        let state_after_first = pass.bind_state().clone();
        pass.use_program(&mut white);
        assert_eq!(pass.bind_state(), &state_after_first);
        pass.use_program(&mut white).draw(&quad)
    });

    assert_eq!(once, Ok(()));
    assert_eq!(twice, Ok(()));
    assert_eq!(once_pixels, twice_pixels);
}

#[test]
fn viewport_restricts_drawing() {
    let Some(gpu) = device() else { return };
    let mut white = program(&gpu, "white", POSITION_VS, WHITE_FS);
    let full = [
        1.0f32, 1.0, 0.0, 1.0, -1.0, 0.0, -1.0, -1.0, 0.0, -1.0, 1.0, 0.0,
    ];
    let quad = VertexArray::upload(
        &gpu,
        "full quad",
        &full,
        VertexLayout::interleaved(&[3]).unwrap(),
        Some(&QUAD_INDICES),
    )
    .unwrap();

    let (result, pixels) = render(&gpu, Viewport::new(0, 0, 32, 32), |pass| {
        pass.use_program(&mut white).draw(&quad)
    });
    assert_eq!(result, Ok(()));

    let covered = covered(&pixels);
    assert_eq!(covered.len(), 32 * 32);
    assert!(covered.iter().all(|&(x, y)| x < 32 && y < 32));
}

/// Builds `vs` + `fs`, expecting the link step to refuse it, then checks the
/// resulting invalid program draws nothing.
fn assert_rejected_at_link(gpu: &GpuDevice, label: &str, vs: &str, fs: &str) -> String {
    let source = ShaderSource::new(vs, fs);
    let log = match ShaderProgram::build(gpu, label, source.clone()) {
        Err(ShaderError::Link { log }) => log,
        other => panic!("expected a link error for `{label}`, got {other:?}"),
    };

    let mut program = ShaderProgram::build_or_invalid(gpu, label, source);
    assert!(!program.is_valid());

    let quad = VertexArray::upload(
        gpu,
        "quad",
        &QUAD,
        VertexLayout::interleaved(&[3]).unwrap(),
        Some(&QUAD_INDICES),
    )
    .unwrap();
    let (result, pixels) = render(gpu, full_viewport(), |pass| {
        pass.use_program(&mut program).draw(&quad)
    });
    assert!(matches!(result, Err(DrawError::InvalidProgram { .. })));
    assert!(covered(&pixels).is_empty());
    log
}

#[test]
fn non_vec4_color_output_is_rejected_at_link() {
    let Some(gpu) = device() else { return };
    let fs = r#"
@fragment
fn fs_main() -> @location(0) vec3<f32> {
    return vec3<f32>(1.0, 0.0, 0.0);
}
"#;
    let log = assert_rejected_at_link(&gpu, "vec3 output", POSITION_VS, fs);
    assert!(log.contains("vec4<f32>"), "{log}");
}

#[test]
fn interpolation_mismatch_is_rejected_at_link() {
    let Some(gpu) = device() else { return };
    let vs = r#"
struct VsOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) @interpolate(flat) color: vec3<f32>,
};

@vertex
fn vs_main(@location(0) pos: vec3<f32>) -> VsOut {
    var out: VsOut;
    out.clip = vec4<f32>(pos, 1.0);
    out.color = vec3<f32>(1.0, 0.0, 0.0);
    return out;
}
"#;
    let fs = r#"
@fragment
fn fs_main(@location(0) color: vec3<f32>) -> @location(0) vec4<f32> {
    return vec4<f32>(color, 1.0);
}
"#;
    let log = assert_rejected_at_link(&gpu, "flat color", vs, fs);
    assert!(log.contains("@interpolate(flat"), "{log}");
}

#[test]
fn matching_flat_varyings_draw() {
    let Some(gpu) = device() else { return };
    let vs = r#"
struct VsOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) @interpolate(flat) color: vec3<f32>,
};

@vertex
fn vs_main(@location(0) pos: vec3<f32>) -> VsOut {
    var out: VsOut;
    out.clip = vec4<f32>(pos, 1.0);
    out.color = vec3<f32>(1.0, 0.0, 0.0);
    return out;
}
"#;
    let fs = r#"
@fragment
fn fs_main(@location(0) @interpolate(flat) color: vec3<f32>) -> @location(0) vec4<f32> {
    return vec4<f32>(color, 1.0);
}
"#;
    let mut flat = program(&gpu, "flat color", vs, fs);
    let quad = VertexArray::upload(
        &gpu,
        "quad",
        &QUAD,
        VertexLayout::interleaved(&[3]).unwrap(),
        Some(&QUAD_INDICES),
    )
    .unwrap();

    let (result, pixels) = render(&gpu, full_viewport(), |pass| {
        pass.use_program(&mut flat).draw(&quad)
    });
    assert_eq!(result, Ok(()));
    assert_eq!(pixel(&pixels, SIZE / 2, SIZE / 2), [255, 0, 0, 255]);
}

#[test]
fn too_many_uniform_blocks_are_rejected_at_link() {
    let Some(gpu) = device() else { return };
    let blocks = gpu
        .device()
        .limits()
        .max_dynamic_uniform_buffers_per_pipeline_layout
        + 1;

    let mut vs = String::new();
    let mut sum = String::from("vec4<f32>(pos, 1.0)");
    for i in 0..blocks {
        vs.push_str(&format!("@group(0) @binding({i}) var<uniform> u{i}: vec4<f32>;\n"));
        sum.push_str(&format!(" + u{i}"));
    }
    vs.push_str(&format!(
        "@vertex\nfn vs_main(@location(0) pos: vec3<f32>) -> @builtin(position) vec4<f32> {{\n    return {sum};\n}}\n"
    ));

    let log = assert_rejected_at_link(&gpu, "uniform heavy", &vs, WHITE_FS);
    assert!(log.contains("uniform blocks declared"), "{log}");
}

#[test]
fn zero_sized_image_is_refused_not_uploaded() {
    let Some(gpu) = device() else { return };
    let empty = DecodedImage::solid(0, 0, [0; 4]);

    let result = Texture::from_image(&gpu, "empty", &empty, &TextureOptions::default());
    assert!(matches!(
        result,
        Err(TextureError::Empty {
            width: 0,
            height: 0
        })
    ));
}
