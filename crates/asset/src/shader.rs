//! Shader source loading. Compilation/linking belongs to the GPU layer; this
//! only gets validated source text into memory and reports errors as values.

use std::{fmt, fs, path::Path, str::FromStr};

use corelib::{CoreError, CoreResult};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl FromStr for ShaderStage {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s {
            "vertex" => Ok(Self::Vertex),
            "fragment" => Ok(Self::Fragment),
            other => Err(CoreError::InvalidShaderStage(other.to_string())),
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ShaderSource {
    pub stage: ShaderStage,
    pub source: String,
}

impl ShaderSource {
    /// Read a shader file. Empty (or whitespace-only) files are rejected.
    pub fn load(stage: ShaderStage, path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|e| CoreError::io(path, e))?;
        if source.trim().is_empty() {
            return Err(CoreError::EmptyAsset(format!(
                "{} shader {}",
                stage,
                path.display()
            )));
        }

        log::debug!("Loaded {} shader {} ({} bytes)", stage, path.display(), source.len());
        Ok(Self { stage, source })
    }
}

/// Vertex + fragment pair for one program.
#[derive(Clone, Debug, PartialEq)]
pub struct ProgramSource {
    pub vertex: ShaderSource,
    pub fragment: ShaderSource,
}

impl ProgramSource {
    pub fn load(vertex: impl AsRef<Path>, fragment: impl AsRef<Path>) -> CoreResult<Self> {
        Ok(Self {
            vertex: ShaderSource::load(ShaderStage::Vertex, vertex)?,
            fragment: ShaderSource::load(ShaderStage::Fragment, fragment)?,
        })
    }
}
