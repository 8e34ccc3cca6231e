//! @ai:module:intent Configuration structs for the tag verifier
//! @ai:module:layer infrastructure
//! @ai:module:public_api CheckConfig, ToolchainConfig, CheckSettings, RunOptions
//! @ai:module:stateless true

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Smallest accepted worker pool size.
pub const MIN_WORKERS: usize = 1;
/// Largest accepted worker pool size.
pub const MAX_WORKERS: usize = 20;

/// @ai:intent Main configuration, loadable from a TOML file
/// @ai:effects pure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckConfig {
    #[serde(default)]
    pub toolchain: ToolchainConfig,
    #[serde(default)]
    pub check: CheckSettings,
}

/// @ai:intent Locations of the Visual Studio tools and the build platform
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolchainConfig {
    #[serde(default = "default_msbuild")]
    pub msbuild: PathBuf,
    #[serde(default = "default_vcvars")]
    pub vcvars: PathBuf,
    #[serde(default = "default_platform")]
    pub platform: String,
}

/// @ai:intent Settings of the check itself
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckSettings {
    /// Extension (without the dot) of the files that are scanned for tags.
    #[serde(default = "default_source_extension")]
    pub source_extension: String,
    /// Inserted into the names of the materialized files.
    #[serde(default = "default_tool_name")]
    pub tool_name: String,
}

/// @ai:intent Resolved command-line options of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub path: PathBuf,
    pub configuration: String,
    pub workers: usize,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            msbuild: default_msbuild(),
            vcvars: default_vcvars(),
            platform: default_platform(),
        }
    }
}

impl Default for CheckSettings {
    fn default() -> Self {
        Self {
            source_extension: default_source_extension(),
            tool_name: default_tool_name(),
        }
    }
}

fn default_msbuild() -> PathBuf {
    PathBuf::from(
        r"C:\Program Files\Microsoft Visual Studio\2022\Community\MSBuild\Current\Bin\amd64\MSBuild.exe",
    )
}

fn default_vcvars() -> PathBuf {
    PathBuf::from(
        r"C:\Program Files\Microsoft Visual Studio\2022\Community\VC\Auxiliary\Build\vcvars64.bat",
    )
}

fn default_platform() -> String {
    "x64".to_string()
}

fn default_source_extension() -> String {
    "cpp".to_string()
}

fn default_tool_name() -> String {
    "checkce".to_string()
}

impl CheckConfig {
    /// @ai:intent Load configuration from a TOML file
    /// @ai:pre path exists and is readable
    /// @ai:effects fs:read
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }
}

impl CheckSettings {
    /// @ai:intent Check whether a path carries the configured source extension
    /// @ai:example ("a/Foo.CPP") -> true with extension "cpp"
    /// @ai:effects pure
    pub fn is_source_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(&self.source_extension))
    }
}

impl RunOptions {
    /// @ai:intent Build options from raw argument values, validating the worker count
    /// @ai:post workers is within MIN_WORKERS..=MAX_WORKERS
    /// @ai:effects pure
    pub fn new(path: PathBuf, configuration: String, workers: &str) -> Result<Self> {
        Ok(Self {
            path,
            configuration,
            workers: parse_workers(workers)?,
        })
    }
}

/// @ai:intent Parse and range-check the worker count argument
/// @ai:effects pure
pub fn parse_workers(raw: &str) -> Result<usize> {
    let workers: usize = raw.trim().parse().map_err(|_| {
        Error::InvalidArgument(format!(
            "The given number of worker threads '{}' is not an integer.",
            raw
        ))
    })?;

    if !(MIN_WORKERS..=MAX_WORKERS).contains(&workers) {
        return Err(Error::InvalidArgument(format!(
            "The given number of worker threads '{}' is out of range. Should be between {}-{}.",
            workers, MIN_WORKERS, MAX_WORKERS
        )));
    }

    Ok(workers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_workers_accepts_range_bounds() {
        assert_eq!(parse_workers("1").unwrap(), 1);
        assert_eq!(parse_workers("20").unwrap(), 20);
    }

    #[test]
    fn test_parse_workers_rejects_out_of_range() {
        let err = parse_workers("0").unwrap_err();
        assert!(err.to_string().contains("out of range"));
        assert!(parse_workers("21").is_err());
    }

    #[test]
    fn test_parse_workers_rejects_non_integer() {
        let err = parse_workers("ten").unwrap_err();
        assert!(err.to_string().contains("is not an integer"));
    }

    #[test]
    fn test_load_partial_config_keeps_defaults() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(
            file,
            r#"[toolchain]
platform = "Win32"
"#
        )
        .unwrap();

        let config = CheckConfig::load(file.path()).unwrap();

        assert_eq!(config.toolchain.platform, "Win32");
        assert_eq!(config.toolchain.msbuild, default_msbuild());
        assert_eq!(config.check.source_extension, "cpp");
    }

    #[test]
    fn test_load_invalid_config_is_config_error() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(file, "toolchain = 3").unwrap();

        let err = CheckConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_is_source_file_ignores_case() {
        let settings = CheckSettings::default();
        assert!(settings.is_source_file(Path::new("dir/Foo.CPP")));
        assert!(settings.is_source_file(Path::new("Foo.cpp")));
        assert!(!settings.is_source_file(Path::new("Foo.hpp")));
        assert!(!settings.is_source_file(Path::new("cpp")));
    }
}
