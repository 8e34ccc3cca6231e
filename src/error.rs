//! @ai:module:intent Define error types for the tag verifier
//! @ai:module:layer domain
//! @ai:module:public_api Error, Result
//! @ai:module:stateless true

use std::path::PathBuf;
use thiserror::Error;

/// @ai:intent Unified error type for all technical (non-verification) failures
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    InvalidArgument(String),

    #[error("The path '{0}' is not an existing directory or file.")]
    PathNotFound(PathBuf),

    #[error("The specified file '{0}' is not a .cpp file.")]
    NotASourceFile(PathBuf),

    #[error("The directory '{0}' contains more than one .sln file.")]
    AmbiguousSolution(PathBuf),

    #[error("No directory with a .sln file found while walking up from '{0}'.")]
    SolutionNotFound(PathBuf),

    #[error("The directory '{0}' contains more than one .vcxproj file.")]
    AmbiguousProject(PathBuf),

    #[error("The C++ project directory '{project}' is not the same or the child of the solution directory '{solution}'.")]
    ProjectOutsideSolution { project: PathBuf, solution: PathBuf },

    #[error("No .vcxproj file found while walking up from '{start}' to '{solution}'.")]
    ProjectNotFound { start: PathBuf, solution: PathBuf },

    #[error("'{path}' is not inside the solution directory '{solution}'.")]
    OutsideSolution { path: PathBuf, solution: PathBuf },

    #[error("'{path}' is not inside the project directory '{project}'.")]
    OutsideProject { path: PathBuf, project: PathBuf },

    #[error("The solution does not contain '{0}' as a solution configuration.")]
    InvalidConfiguration(String),

    #[error("The solution did not build successfully.")]
    BuildFailed,

    #[error("The compile-only build of the solution did not succeed.")]
    CompileOnlyBuildFailed,

    #[error("No .cpp file in directory '{0}'.")]
    NoSourceFile(PathBuf),

    #[error("No CL.exe call found in the output of MSBuild.")]
    CompilerInvocationNotFound,

    #[error("The output of MSBuild contains {0} CL.exe calls instead of 1.")]
    AmbiguousCompilerInvocation(usize),

    #[error("Unrecognized CL.exe call: {0}")]
    UnrecognizedCompilerInvocation(String),

    #[error("Unrecognized diagnostic line format in the output for {file}: '{line}'")]
    UnrecognizedDiagnostic { file: PathBuf, line: String },

    #[error("Failed to start the worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
