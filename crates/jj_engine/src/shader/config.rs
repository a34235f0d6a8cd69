//! Shader source locations

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::Config;

/// Directories searched by [`ShaderConfig::with_path_resolution`], in order
const SHADER_DIRS: [&str; 5] = ["shaders", "resources/shaders", "test_app/resources/shaders", "../shaders", "."];

/// # Shader Configuration
///
/// Paths of the GLSL sources for one program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShaderConfig {
    /// Path to the vertex shader source
    pub vertex_shader_path: PathBuf,
    /// Path to the fragment shader source
    pub fragment_shader_path: PathBuf,
}

impl ShaderConfig {
    /// Create a new shader configuration
    pub fn new(vertex_path: impl Into<PathBuf>, fragment_path: impl Into<PathBuf>) -> Self {
        Self {
            vertex_shader_path: vertex_path.into(),
            fragment_shader_path: fragment_path.into(),
        }
    }

    /// Create shader config with automatic path resolution
    ///
    /// Looks for each file in a few common shader directories so the host
    /// can be started from the workspace root or from its own directory.
    /// Files that are found nowhere fall back to `shaders/<name>`.
    pub fn with_path_resolution(base_vertex: &str, base_fragment: &str) -> Self {
        Self {
            vertex_shader_path: resolve(base_vertex),
            fragment_shader_path: resolve(base_fragment),
        }
    }

    /// Check that both shader files exist
    pub fn validate(&self) -> Result<(), String> {
        if !self.vertex_shader_path.exists() {
            return Err(format!("Vertex shader not found: {}", self.vertex_shader_path.display()));
        }
        if !self.fragment_shader_path.exists() {
            return Err(format!("Fragment shader not found: {}", self.fragment_shader_path.display()));
        }
        Ok(())
    }
}

fn resolve(name: &str) -> PathBuf {
    SHADER_DIRS
        .iter()
        .map(|dir| Path::new(dir).join(name))
        .find(|candidate| candidate.exists())
        .unwrap_or_else(|| Path::new("shaders").join(name))
}

impl Default for ShaderConfig {
    fn default() -> Self {
        Self::with_path_resolution("basic.vert", "basic.frag")
    }
}

impl Config for ShaderConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolved_paths_fall_back_to_shaders_dir() {
        let config = ShaderConfig::with_path_resolution("no_such_shader.vert", "no_such_shader.frag");
        assert_eq!(config.vertex_shader_path, Path::new("shaders").join("no_such_shader.vert"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_reports_missing_fragment() {
        let dir = tempfile::tempdir().unwrap();
        let vertex = dir.path().join("a.vert");
        std::fs::write(&vertex, "void main() {}").unwrap();

        let config = ShaderConfig::new(&vertex, dir.path().join("a.frag"));
        let err = config.validate().unwrap_err();
        assert!(err.starts_with("Fragment shader not found"));
    }
}
