//! Shader and image lookup.
//!
//! Lessons read their stage sources and images from disk at startup, relative
//! to one root directory:
//!
//! - `shaders/<name>.vert.wgsl` and `shaders/<name>.frag.wgsl`
//! - `assets/<file>`
//!
//! The root is `LUMEN_ASSET_DIR` when set, otherwise this crate's directory.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use lumen_engine::device::GpuDevice;
use lumen_engine::gfx::{ImageLoader, ShaderProgram, Texture, TextureOptions};

/// Environment variable overriding the asset root.
pub const ASSET_DIR_VAR: &str = "LUMEN_ASSET_DIR";

/// Resolved asset root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetDir {
    root: PathBuf,
}

impl AssetDir {
    /// Root from `LUMEN_ASSET_DIR`, falling back to the crate directory.
    pub fn from_env() -> Self {
        Self::resolve(std::env::var_os(ASSET_DIR_VAR))
    }

    /// Root from an explicit override value. Empty values count as unset.
    pub fn resolve(override_dir: Option<OsString>) -> Self {
        let root = match override_dir {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => PathBuf::from(env!("CARGO_MANIFEST_DIR")),
        };
        log::debug!("asset root: {}", root.display());
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn vertex_stage(&self, name: &str) -> PathBuf {
        self.root.join("shaders").join(format!("{name}.vert.wgsl"))
    }

    pub fn fragment_stage(&self, name: &str) -> PathBuf {
        self.root.join("shaders").join(format!("{name}.frag.wgsl"))
    }

    pub fn image(&self, file: &str) -> PathBuf {
        self.root.join("assets").join(file)
    }

    /// Builds a program from `shaders/<vertex>.vert.wgsl` and
    /// `shaders/<fragment>.frag.wgsl`.
    ///
    /// Failures are logged and yield an invalid program, so the lesson keeps
    /// running and simply draws nothing with it.
    pub fn program(
        &self,
        gpu: &GpuDevice,
        label: &str,
        vertex: &str,
        fragment: &str,
    ) -> ShaderProgram {
        ShaderProgram::load_or_invalid(
            gpu,
            label,
            self.vertex_stage(vertex),
            self.fragment_stage(fragment),
        )
    }

    /// Loads `assets/<file>`, or the white fallback texture if that fails.
    pub fn texture(
        &self,
        gpu: &GpuDevice,
        file: &str,
        loader: &ImageLoader,
        options: &TextureOptions,
    ) -> Texture {
        Texture::load_or_fallback(gpu, file, loader, self.image(file), options)
    }
}

/// Vertex/fragment stage pairs the lessons link together.
pub const PROGRAMS: &[(&str, &str)] = &[
    ("position", "orange"),
    ("position", "yellow"),
    ("position", "uniform_color"),
    ("colored", "colored"),
    ("textured", "textured"),
    ("transform", "textured"),
    ("coord", "textured"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_engine::gfx::shader::{compile_stage, link};
    use lumen_engine::gfx::ShaderStage;

    fn crate_dir() -> AssetDir {
        AssetDir::resolve(None)
    }

    #[test]
    fn defaults_to_the_crate_directory() {
        assert_eq!(crate_dir().root(), Path::new(env!("CARGO_MANIFEST_DIR")));
        assert_eq!(
            AssetDir::resolve(Some(OsString::new())),
            crate_dir(),
            "an empty override is ignored"
        );
    }

    #[test]
    fn override_replaces_the_root() {
        let dir = AssetDir::resolve(Some("/opt/lessons".into()));
        assert_eq!(
            dir.vertex_stage("coord"),
            Path::new("/opt/lessons/shaders/coord.vert.wgsl")
        );
        assert_eq!(
            dir.image("container.png"),
            Path::new("/opt/lessons/assets/container.png")
        );
    }

    #[test]
    fn shipped_programs_compile_and_link() {
        let dir = crate_dir();
        for (vertex, fragment) in PROGRAMS {
            let vs = std::fs::read_to_string(dir.vertex_stage(vertex)).unwrap();
            let fs = std::fs::read_to_string(dir.fragment_stage(fragment)).unwrap();

            let vs = compile_stage(ShaderStage::Vertex, &vs)
                .unwrap_or_else(|e| panic!("{vertex}.vert: {e}"));
            let fs = compile_stage(ShaderStage::Fragment, &fs)
                .unwrap_or_else(|e| panic!("{fragment}.frag: {e}"));
            link(vs, fs).unwrap_or_else(|e| panic!("{vertex} + {fragment}: {e}"));
        }
    }

    #[test]
    fn textured_programs_expose_two_texture_slots_and_mix_value() {
        let dir = crate_dir();
        let vs = std::fs::read_to_string(dir.vertex_stage("transform")).unwrap();
        let fs = std::fs::read_to_string(dir.fragment_stage("textured")).unwrap();
        let linked = link(
            compile_stage(ShaderStage::Vertex, &vs).unwrap(),
            compile_stage(ShaderStage::Fragment, &fs).unwrap(),
        )
        .unwrap();

        let names: Vec<&str> = linked
            .interface
            .textures
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(names, ["texture1", "texture2"]);
        assert!(linked
            .interface
            .uniform_blocks
            .iter()
            .any(|b| b.field("mixValue").is_some()));
        assert!(linked
            .interface
            .uniform_blocks
            .iter()
            .any(|b| b.field("transform").is_some()));
    }

    #[test]
    fn shipped_images_decode() {
        let dir = crate_dir();
        let loader = ImageLoader::flipped();

        let container = loader.decode(dir.image("container.png")).unwrap();
        assert_eq!(container.channels(), 3);

        let face = loader.decode(dir.image("awesomeface.png")).unwrap();
        assert_eq!(face.channels(), 4);
        assert_eq!(face.width(), face.height());
    }
}
