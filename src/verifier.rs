//! @ai:module:intent Verify one tagged line: parse, filter, materialize, compile, evaluate
//! @ai:module:layer application
//! @ai:module:public_api Verifier, Verdict, MaterializedFile, materialized_path
//! @ai:module:depends_on annotation, compiler, diagnostic, reporter, error
//! @ai:module:stateless true

use crate::annotation::{parse_tagged_line, AnnotationOccurrence, LineScan};
use crate::compiler::{CompilationCheckerTrait, CompilationResult};
use crate::diagnostic::{first_diagnostic_line, parse_diagnostic_line, DiagnosticKind};
use crate::error::{Error, Result};
use crate::reporter::{ReportLine, Reporter};
use std::path::{Path, PathBuf};

/// @ai:intent Terminal state of one verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail(Vec<ReportLine>),
    Skip,
}

/// @ai:intent Path of the materialized copy of a file for one tagged line
/// @ai:example ("dir/Foo.T.cpp", 4, "checkce") -> "dir/Foo.T.checkce-5.cpp"
/// @ai:effects pure
pub fn materialized_path(original: &Path, line_index: usize, tool_name: &str) -> PathBuf {
    let stem = original
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let name = match original.extension() {
        Some(ext) => format!("{}.{}-{}.{}", stem, tool_name, line_index + 1, ext.to_string_lossy()),
        None => format!("{}.{}-{}", stem, tool_name, line_index + 1),
    };

    original.with_file_name(name)
}

/// @ai:intent Temporary source file that is removed when dropped
/// @ai:invariant the file does not outlive the guard
pub struct MaterializedFile {
    path: PathBuf,
}

impl MaterializedFile {
    /// @ai:intent Write contents to path, owning the file from then on
    /// @ai:effects fs:write
    pub fn create(path: PathBuf, contents: &str) -> Result<Self> {
        let guard = Self { path };
        std::fs::write(&guard.path, contents).map_err(|source| Error::FileWrite {
            path: guard.path.clone(),
            source,
        })?;
        Ok(guard)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for MaterializedFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Failed to remove {}: {}", self.path.display(), e);
            }
        }
    }
}

/// @ai:intent Runs the verification protocol for tagged lines against one compiler
pub struct Verifier<'a> {
    compiler: &'a dyn CompilationCheckerTrait,
    configuration: &'a str,
    tool_name: &'a str,
}

impl<'a> Verifier<'a> {
    pub fn new(
        compiler: &'a dyn CompilationCheckerTrait,
        configuration: &'a str,
        tool_name: &'a str,
    ) -> Self {
        Self {
            compiler,
            configuration,
            tool_name,
        }
    }

    /// @ai:intent Verify the tagged line at line_index and report the outcome
    /// @ai:pre lines[line_index] contains a tag token
    /// @ai:effects fs:write, io, state:write
    pub fn run(&self, reporter: &Reporter, file: &Path, lines: &[String], line_index: usize) {
        reporter.announce(file);

        match self.verify_line(file, lines, line_index) {
            Ok(Verdict::Pass) => reporter.record_pass(),
            Ok(Verdict::Skip) => reporter.record_skip(),
            Ok(Verdict::Fail(report)) => reporter.report_failure(file, line_index, &report),
            Err(e) => reporter.report_technical(&e),
        }
    }

    /// @ai:intent Decide the verdict for the tagged line at line_index
    /// @ai:pre line_index < lines.len()
    /// @ai:post no materialized file remains on disk
    /// @ai:effects fs:write, io
    pub fn verify_line(&self, file: &Path, lines: &[String], line_index: usize) -> Result<Verdict> {
        let occurrence = match parse_tagged_line(file, line_index, &lines[line_index]) {
            LineScan::Occurrence(occurrence) => occurrence,
            LineScan::Malformed(malformed) => {
                return Ok(Verdict::Fail(vec![ReportLine::error(malformed.message())]))
            }
            LineScan::Untagged => return Ok(Verdict::Skip),
        };

        if !occurrence.applies_to(self.configuration) {
            tracing::debug!(
                "Skipping {}({}): tag is for another configuration",
                file.display(),
                occurrence.line_number()
            );
            return Ok(Verdict::Skip);
        }

        let contents = activate(lines, &occurrence);
        let materialized = MaterializedFile::create(
            materialized_path(file, line_index, self.tool_name),
            &contents,
        )?;

        let result = self.compiler.check_file(materialized.path())?;
        evaluate(&occurrence, &result, materialized.path())
    }
}

/// @ai:intent The file's text with the tagged line replaced by its activated form
/// @ai:effects pure
fn activate(lines: &[String], occurrence: &AnnotationOccurrence) -> String {
    let index = occurrence.line_index;
    let mut contents = lines[..index].concat();
    contents.push_str(&occurrence.activated_line);
    contents.push_str(&lines[index + 1..].concat());
    contents
}

/// @ai:intent Compare the compiler's first diagnostic with the expectation
/// @ai:effects pure
fn evaluate(
    occurrence: &AnnotationOccurrence,
    result: &CompilationResult,
    compiled: &Path,
) -> Result<Verdict> {
    if result.success {
        return Ok(Verdict::Fail(vec![ReportLine::error("Compilation succeeded.")]));
    }

    let source_name = compiled
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let line = first_diagnostic_line(&result.output, &source_name).unwrap_or_default();
    let diagnostic = parse_diagnostic_line(line).ok_or_else(|| Error::UnrecognizedDiagnostic {
        file: occurrence.file.clone(),
        line: line.to_string(),
    })?;

    let expected = &occurrence.expected;

    if diagnostic.kind != DiagnosticKind::Error {
        return Ok(Verdict::Fail(vec![
            ReportLine::error(format!("The first diagnostic is a {}.", diagnostic.kind)),
            ReportLine::message(format!("Expected error:    {}", expected)),
            ReportLine::message(format!("Actual diagnostic: {}", diagnostic.message)),
        ]));
    }

    if !diagnostic.message.contains(expected.as_str()) {
        return Ok(Verdict::Fail(vec![
            ReportLine::error("Expected error not found."),
            ReportLine::message(format!("Expected error: {}", expected)),
            ReportLine::message(format!("Actual error:   {}", diagnostic.message)),
        ]));
    }

    Ok(Verdict::Pass)
}
