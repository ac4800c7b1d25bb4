use std::fs;
use std::path::Path;

use super::error::{ShaderError, ShaderStage};

/// The two source texts a program is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    pub vertex: String,
    pub fragment: String,
}

impl ShaderSource {
    pub fn new(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }

    /// Reads the vertex and fragment stage sources from disk.
    pub fn from_files(
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Result<Self, ShaderError> {
        let vertex = read_stage(ShaderStage::Vertex, vertex_path.as_ref())?;
        let fragment = read_stage(ShaderStage::Fragment, fragment_path.as_ref())?;
        Ok(Self { vertex, fragment })
    }

    pub fn stage(&self, stage: ShaderStage) -> &str {
        match stage {
            ShaderStage::Vertex => &self.vertex,
            ShaderStage::Fragment => &self.fragment,
        }
    }
}

fn read_stage(stage: ShaderStage, path: &Path) -> Result<String, ShaderError> {
    fs::read_to_string(path).map_err(|source| ShaderError::Io {
        stage,
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_both_stages_from_disk() {
        let mut vs = tempfile::NamedTempFile::new().unwrap();
        let mut fs = tempfile::NamedTempFile::new().unwrap();
        write!(vs, "// vertex").unwrap();
        write!(fs, "// fragment").unwrap();

        let src = ShaderSource::from_files(vs.path(), fs.path()).unwrap();
        assert_eq!(src.stage(ShaderStage::Vertex), "// vertex");
        assert_eq!(src.stage(ShaderStage::Fragment), "// fragment");
    }

    #[test]
    fn missing_file_reports_stage_and_path() {
        let vs = tempfile::NamedTempFile::new().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.frag.wgsl");

        let err = ShaderSource::from_files(vs.path(), &missing).unwrap_err();
        match err {
            ShaderError::Io { stage, path, .. } => {
                assert_eq!(stage, ShaderStage::Fragment);
                assert_eq!(path, missing);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
