//! @ai:module:intent Run the Visual Studio toolchain: developer environment, console setup and MSBuild
//! @ai:module:layer infrastructure
//! @ai:module:public_api ProcessOutput, BuildMode, BuildSystemTrait, MsBuild, DeveloperEnvironment, prepare_console, validate_toolchain
//! @ai:module:depends_on config, error
//! @ai:module:stateless true

use crate::config::ToolchainConfig;
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;

/// @ai:intent Captured result of a finished subprocess
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    /// @ai:intent Convert a std process output, decoding the streams lossily
    /// @ai:effects pure
    pub fn from_output(output: std::process::Output) -> Self {
        Self {
            success: output.status.success(),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/// @ai:intent Run a prepared command to completion and capture its output
/// @ai:effects io
pub fn run_command(command: &mut Command) -> Result<ProcessOutput> {
    let program = command.get_program().to_string_lossy().into_owned();
    let output = command
        .output()
        .map_err(|source| Error::Spawn { program, source })?;
    Ok(ProcessOutput::from_output(output))
}

/// @ai:intent Kind of solution build to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    /// Build everything.
    Full,
    /// Run only the compile step for stale units.
    CompileOnly,
}

/// @ai:intent Trait for the build system that produces the build transcripts
pub trait BuildSystemTrait: Send + Sync {
    /// @ai:intent Build the solution in solution_dir under a configuration
    fn build(&self, solution_dir: &Path, configuration: &str, mode: BuildMode)
        -> Result<ProcessOutput>;
}

/// @ai:intent MSBuild driven build system
pub struct MsBuild {
    program: PathBuf,
    platform: String,
}

impl MsBuild {
    /// @ai:intent Create an MSBuild runner from the toolchain configuration
    /// @ai:effects pure
    pub fn new(config: &ToolchainConfig) -> Self {
        Self {
            program: config.msbuild.clone(),
            platform: config.platform.clone(),
        }
    }

    /// @ai:intent Arguments passed to MSBuild for a build
    /// @ai:effects pure
    fn arguments(&self, configuration: &str, mode: BuildMode) -> Vec<String> {
        let mut args = vec![
            format!("/p:Configuration={}", configuration),
            format!("/p:Platform={}", self.platform),
        ];

        if mode == BuildMode::CompileOnly {
            args.push("/t:ClCompile".to_string());
        }

        args
    }
}

impl BuildSystemTrait for MsBuild {
    /// @ai:intent Run MSBuild in the solution directory
    /// @ai:effects io
    fn build(
        &self,
        solution_dir: &Path,
        configuration: &str,
        mode: BuildMode,
    ) -> Result<ProcessOutput> {
        tracing::info!(
            "Building {} ({:?}, configuration={})",
            solution_dir.display(),
            mode,
            configuration
        );

        run_command(
            Command::new(&self.program)
                .args(self.arguments(configuration, mode))
                .current_dir(solution_dir),
        )
    }
}

/// @ai:intent Environment variables of a Visual Studio developer prompt
#[derive(Debug, Clone, Default)]
pub struct DeveloperEnvironment {
    vars: HashMap<String, String>,
}

impl DeveloperEnvironment {
    /// @ai:intent Capture the environment by running vcvars and dumping the variables
    /// @ai:post the result contains the current process environment overlaid with vcvars
    /// @ai:effects io, env
    pub fn capture(vcvars: &Path) -> Result<Self> {
        let mut vars: HashMap<String, String> = std::env::vars().collect();

        if !vcvars.is_file() {
            tracing::warn!(
                "'{}' not found - compiling with the current environment",
                vcvars.display()
            );
            return Ok(Self { vars });
        }

        let name = vcvars
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut command = Command::new("cmd");
        command.arg("/C").arg(format!("{} >nul && set", name));
        if let Some(dir) = vcvars.parent() {
            command.current_dir(dir);
        }

        let output = run_command(&mut command)?;
        vars.extend(parse_set_output(&output.stdout));

        tracing::debug!("Captured {} developer environment variables", vars.len());
        Ok(Self { vars })
    }

    /// @ai:intent Create an environment from explicit variables
    /// @ai:effects pure
    pub fn from_vars(vars: HashMap<String, String>) -> Self {
        Self { vars }
    }

    /// @ai:intent Apply the environment to a command, replacing the inherited one
    /// @ai:effects pure
    pub fn apply(&self, command: &mut Command) {
        command.env_clear().envs(&self.vars);
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }
}

/// @ai:intent Parse KEY=VALUE lines as printed by the cmd `set` builtin
/// @ai:example ("PATH=C:\\a;C:\\b") -> [("PATH", "C:\\a;C:\\b")]
/// @ai:effects pure
pub fn parse_set_output(output: &str) -> Vec<(String, String)> {
    output
        .lines()
        .filter_map(|line| line.split_once('='))
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

/// @ai:intent Switch the console to UTF-8 so compiler output decodes cleanly
/// @ai:effects io
pub fn prepare_console() {
    #[cfg(windows)]
    {
        let result = run_command(Command::new("cmd").args(["/C", "CHCP 65001"]));
        match result {
            Ok(output) if output.success => {}
            Ok(output) => tracing::warn!("Failed to change code page: {}", output.stderr.trim()),
            Err(e) => tracing::warn!("Failed to change code page: {}", e),
        }
    }
}

/// @ai:intent Fail early when the configured MSBuild does not exist
/// @ai:effects fs:read
pub fn validate_toolchain(config: &ToolchainConfig) -> Result<()> {
    if config.msbuild.components().count() > 1 && !config.msbuild.is_file() {
        return Err(Error::Config(format!(
            "MSBuild not found at '{}'. Install Visual Studio 2022 or set [toolchain] msbuild in the config file.",
            config.msbuild.display()
        )));
    }
    Ok(())
}
