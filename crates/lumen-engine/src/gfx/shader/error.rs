use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Programmable stage a piece of shader source belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub(crate) fn to_naga(self) -> naga::ShaderStage {
        match self {
            ShaderStage::Vertex => naga::ShaderStage::Vertex,
            ShaderStage::Fragment => naga::ShaderStage::Fragment,
        }
    }

    pub(crate) fn to_wgpu(self) -> wgpu::ShaderStages {
        match self {
            ShaderStage::Vertex => wgpu::ShaderStages::VERTEX,
            ShaderStage::Fragment => wgpu::ShaderStages::FRAGMENT,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Failures while reading, compiling or linking a shader program.
///
/// `log` carries the diagnostic text as the compiler printed it; it is never
/// empty.
#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("failed to read {stage} shader source {}: {source}", .path.display())]
    Io {
        stage: ShaderStage,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{stage} shader compilation failed:\n{log}")]
    Compile { stage: ShaderStage, log: String },

    #[error("program linking failed:\n{log}")]
    Link { log: String },
}

impl ShaderError {
    /// Diagnostic text suitable for printing to the user.
    pub fn log(&self) -> String {
        match self {
            ShaderError::Io { .. } => self.to_string(),
            ShaderError::Compile { log, .. } | ShaderError::Link { log } => log.clone(),
        }
    }
}
