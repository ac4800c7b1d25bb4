use naga::valid::{Capabilities, ValidationFlags, Validator};

use super::error::{ShaderError, ShaderStage};

/// One stage parsed and validated into naga IR.
///
/// Consumed by [`link`](super::link::link); only the linked program's GPU
/// modules and reflection data outlive it.
#[derive(Debug)]
pub struct CompiledStage {
    pub(crate) stage: ShaderStage,
    pub(crate) module: naga::Module,
    pub(crate) entry_index: usize,
}

impl CompiledStage {
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    /// Name of the stage's entry point function.
    pub fn entry_point(&self) -> &str {
        &self.module.entry_points[self.entry_index].name
    }

    pub(crate) fn entry(&self) -> &naga::EntryPoint {
        &self.module.entry_points[self.entry_index]
    }
}

/// Parses and validates WGSL source for a single stage.
///
/// The module must declare exactly one entry point for `stage`; entry points
/// for other stages are ignored.
pub fn compile_stage(stage: ShaderStage, source: &str) -> Result<CompiledStage, ShaderError> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| ShaderError::Compile {
        stage,
        log: diagnostic(e.emit_to_string(source), || e.to_string()),
    })?;

    let mut validator = Validator::new(ValidationFlags::all(), Capabilities::default());
    validator
        .validate(&module)
        .map_err(|e| ShaderError::Compile {
            stage,
            log: diagnostic(e.emit_to_string(source), || e.to_string()),
        })?;

    let wanted = stage.to_naga();
    let matching: Vec<usize> = module
        .entry_points
        .iter()
        .enumerate()
        .filter(|(_, ep)| ep.stage == wanted)
        .map(|(i, _)| i)
        .collect();

    let entry_index = match matching.as_slice() {
        [index] => *index,
        [] => {
            return Err(ShaderError::Compile {
                stage,
                log: format!("no @{stage} entry point declared"),
            });
        }
        many => {
            let names: Vec<&str> = many
                .iter()
                .map(|&i| module.entry_points[i].name.as_str())
                .collect();
            return Err(ShaderError::Compile {
                stage,
                log: format!(
                    "expected one @{stage} entry point, found {}: {}",
                    names.len(),
                    names.join(", ")
                ),
            });
        }
    };

    log::trace!(
        "compiled {stage} stage, entry point `{}`",
        module.entry_points[entry_index].name
    );

    Ok(CompiledStage {
        stage,
        module,
        entry_index,
    })
}

fn diagnostic(emitted: String, fallback: impl FnOnce() -> String) -> String {
    if emitted.trim().is_empty() {
        fallback()
    } else {
        emitted
    }
}
