//! @ai:module:intent Syntax-check one materialized file with the synthesized compiler invocation
//! @ai:module:layer infrastructure
//! @ai:module:public_api CompilationChecker, CompilationCheckerTrait, CompilationResult
//! @ai:module:depends_on invocation, toolchain, error
//! @ai:module:stateless true

use crate::error::{Error, Result};
use crate::invocation::CompileInvocationTemplate;
use crate::toolchain::{run_command, DeveloperEnvironment};
use std::path::Path;
use std::process::Command;

/// @ai:intent Result of compiling a single file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationResult {
    /// Exit code zero: no errors were diagnosed.
    pub success: bool,
    /// Compiler stdout; the first line echoes the source name.
    pub output: String,
}

/// @ai:intent Trait for compiling a single file, shared by all workers
pub trait CompilationCheckerTrait: Send + Sync {
    /// @ai:intent Compile the file at an absolute path inside the project directory
    fn check_file(&self, path: &Path) -> Result<CompilationResult>;
}

/// @ai:intent Runs the compiler invocation template in the developer environment
pub struct CompilationChecker {
    template: CompileInvocationTemplate,
    environment: DeveloperEnvironment,
}

impl CompilationChecker {
    /// @ai:intent Create a checker from a finished template
    /// @ai:effects pure
    pub fn new(template: CompileInvocationTemplate, environment: DeveloperEnvironment) -> Self {
        Self {
            template,
            environment,
        }
    }

    /// @ai:intent Prepare the compiler command for a file
    /// @ai:pre path is inside the project directory
    /// @ai:effects pure
    fn command_for(&self, path: &Path) -> Result<Command> {
        let relative = path
            .strip_prefix(&self.template.project_dir)
            .map_err(|_| Error::OutsideProject {
                path: path.to_path_buf(),
                project: self.template.project_dir.clone(),
            })?;

        let mut command = Command::new(&self.template.program);
        command
            .args(&self.template.args)
            .arg(relative)
            .current_dir(&self.template.project_dir);
        self.environment.apply(&mut command);

        Ok(command)
    }
}

impl CompilationCheckerTrait for CompilationChecker {
    /// @ai:intent Compile the file and capture the compiler's report
    /// @ai:effects io
    fn check_file(&self, path: &Path) -> Result<CompilationResult> {
        let mut command = self.command_for(path)?;
        let output = run_command(&mut command)?;

        tracing::debug!(
            "Compiled {} (exit code {:?})",
            path.display(),
            output.exit_code
        );

        Ok(CompilationResult {
            success: output.success,
            output: output.stdout,
        })
    }
}
