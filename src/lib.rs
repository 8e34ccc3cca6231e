//! @ai:module:intent Verify [CompilationError] tags in C++ sources by compiling each tagged line
//! @ai:module:layer infrastructure
//! @ai:module:public_api annotation, diagnostic, discovery, toolchain, invocation, compiler, verifier, reporter, orchestrator, output, config, error
//! @ai:module:stateless true
//!
//! # checkce
//!
//! A negative-compilation test harness for MSVC projects. A commented-out line
//! carrying a `[CompilationError]` tag is activated in a temporary copy of its
//! file, syntax-checked with the project's own compiler invocation, and must
//! produce the expected error.
//!
//! ## Example
//!
//! ```rust,no_run
//! use checkce::{annotation, LineScan};
//! use std::path::Path;
//!
//! let line = "//int x = \"str\";    // [CompilationError]: cannot convert\n";
//! if let LineScan::Occurrence(tag) = annotation::parse_tagged_line(Path::new("Foo.cpp"), 0, line) {
//!     println!("{} expects '{}'", tag.line_number(), tag.expected);
//! }
//! ```

pub mod annotation;
pub mod compiler;
pub mod config;
pub mod diagnostic;
pub mod discovery;
pub mod error;
pub mod invocation;
pub mod orchestrator;
pub mod output;
pub mod reporter;
pub mod toolchain;
pub mod verifier;

#[cfg(test)]
pub(crate) mod testing;

pub use annotation::{AnnotationOccurrence, LineScan, MalformedTag};
pub use compiler::{CompilationChecker, CompilationCheckerTrait, CompilationResult};
pub use config::{CheckConfig, CheckSettings, RunOptions, ToolchainConfig};
pub use diagnostic::{DiagnosticKind, DiagnosticRecord};
pub use discovery::ProjectLayout;
pub use error::{Error, Result};
pub use invocation::CompileInvocationTemplate;
pub use output::OutputFormat;
pub use reporter::{Reporter, RunOutcome, RunSummary};
pub use toolchain::{BuildMode, BuildSystemTrait, DeveloperEnvironment, MsBuild};
pub use verifier::{Verdict, Verifier};
