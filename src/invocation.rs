//! @ai:module:intent Synthesize a single-file syntax-check compiler invocation from MSBuild transcripts
//! @ai:module:layer application
//! @ai:module:public_api CompileInvocationTemplate, build_template, extract_compiler_line, parse_compiler_line, split_command_line
//! @ai:module:depends_on discovery, toolchain, config, error
//! @ai:module:stateless true

use crate::config::CheckSettings;
use crate::discovery::ProjectLayout;
use crate::error::{Error, Result};
use crate::toolchain::{BuildMode, BuildSystemTrait};
use filetime::FileTime;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use walkdir::WalkDir;

static INVALID_CONFIGURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"error MSB4126: The specified solution configuration ".*\|.*" is invalid\."#)
        .expect("Invalid regex")
});

static COMPILER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bCL\.exe\b").expect("Invalid regex"));

static COMPILER_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^.*\bCL\.exe\b").expect("Invalid regex"));

static QUOTED_SOURCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""[^"]+"$"#).expect("Invalid regex"));

static BARE_SOURCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+$").expect("Invalid regex"));

/// Switches that make the compiler emit debug information.
const DEBUG_INFO_SWITCHES: [&str; 3] = ["/Z7", "/Zi", "/ZI"];

/// Syntax check only, no output files.
pub const SYNTAX_CHECK_SWITCH: &str = "/Zs";

/// @ai:intent Immutable recipe for syntax-checking one file of the project
/// @ai:invariant never mutated after build_template returns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileInvocationTemplate {
    pub program: PathBuf,
    /// Ends with the syntax-check switch; the source file is appended per call.
    pub args: Vec<String>,
    pub project_dir: PathBuf,
}

impl CompileInvocationTemplate {
    /// @ai:intent Render the invocation for logs
    /// @ai:effects pure
    pub fn display_command(&self) -> String {
        format!("\"{}\" {}", self.program.display(), self.args.join(" "))
    }
}

/// @ai:intent Build the invocation template: full build, touch one unit, compile-only build, parse
/// @ai:pre called once, before any worker starts
/// @ai:effects fs:write, io
pub fn build_template(
    build: &dyn BuildSystemTrait,
    layout: &ProjectLayout,
    configuration: &str,
    settings: &CheckSettings,
) -> Result<CompileInvocationTemplate> {
    let full = build.build(&layout.solution_dir, configuration, BuildMode::Full)?;
    if !full.success {
        if INVALID_CONFIGURATION_RE.is_match(&full.stdout) {
            return Err(Error::InvalidConfiguration(configuration.to_string()));
        }
        tracing::debug!("Full build output:\n{}", full.stdout);
        return Err(Error::BuildFailed);
    }

    let smallest = find_smallest_source_file(&layout.target_dir, settings)
        .ok_or_else(|| Error::NoSourceFile(layout.target_dir.clone()))?;
    tracing::debug!("Touching {}", smallest.display());
    touch_file(&smallest)?;

    let compile_only = build.build(&layout.solution_dir, configuration, BuildMode::CompileOnly)?;
    if !compile_only.success {
        tracing::debug!("Compile-only build output:\n{}", compile_only.stdout);
        return Err(Error::CompileOnlyBuildFailed);
    }

    let line = extract_compiler_line(&compile_only.stdout)?;
    let (program, args) = parse_compiler_line(line, &settings.source_extension)?;

    let template = CompileInvocationTemplate {
        program,
        args,
        project_dir: layout.project_dir.clone(),
    };
    tracing::info!("Compiler invocation: {}", template.display_command());

    Ok(template)
}

/// @ai:intent Find the smallest source file by byte size under a directory
/// @ai:post ties resolve to the first file in file-name order
/// @ai:effects fs:read
pub fn find_smallest_source_file(dir: &Path, settings: &CheckSettings) -> Option<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && settings.is_source_file(e.path()))
        .filter_map(|e| {
            let size = e.metadata().ok()?.len();
            Some((size, e.into_path()))
        })
        .fold(None, |best: Option<(u64, PathBuf)>, (size, path)| match best {
            Some((best_size, _)) if best_size <= size => best,
            _ => Some((size, path)),
        })
        .map(|(_, path)| path)
}

/// @ai:intent Set the modification time of an existing file to now
/// @ai:pre path exists; write permission on the file is not required
/// @ai:effects fs:write
fn touch_file(path: &Path) -> Result<()> {
    filetime::set_file_mtime(path, FileTime::now()).map_err(|source| Error::FileWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// @ai:intent Find the single compiler call in a build transcript
/// @ai:post exactly one line of the transcript mentions CL.exe
/// @ai:effects pure
pub fn extract_compiler_line(transcript: &str) -> Result<&str> {
    let calls: Vec<&str> = transcript
        .lines()
        .filter(|line| COMPILER_RE.is_match(line))
        .collect();

    match calls.as_slice() {
        [] => Err(Error::CompilerInvocationNotFound),
        [line] => Ok(line.trim()),
        _ => Err(Error::AmbiguousCompilerInvocation(calls.len())),
    }
}

/// @ai:intent Turn a compiler call into program and syntax-check arguments
/// @ai:pre line mentions the compiler once and the source extension once
/// @ai:post the trailing source file and debug-information switches are removed, /Zs is appended
/// @ai:effects pure
pub fn parse_compiler_line(line: &str, source_extension: &str) -> Result<(PathBuf, Vec<String>)> {
    let line = line.trim();
    let lower = line.to_lowercase();
    let unrecognized = || Error::UnrecognizedCompilerInvocation(line.to_string());

    if lower.matches("cl.exe").count() != 1 {
        return Err(unrecognized());
    }
    let dotted_extension = format!(".{}", source_extension.to_lowercase());
    if lower.matches(dotted_extension.as_str()).count() != 1 {
        return Err(unrecognized());
    }
    if line.starts_with('"') {
        return Err(unrecognized());
    }

    let program = COMPILER_PATH_RE.find(line).ok_or_else(unrecognized)?;
    let rest = &line[program.end()..];

    let source_re: &Regex = if rest.ends_with('"') {
        &*QUOTED_SOURCE_RE
    } else {
        &*BARE_SOURCE_RE
    };
    let switches = source_re.replace(rest, "");

    let mut args: Vec<String> = split_command_line(&switches)
        .into_iter()
        .filter(|arg| !DEBUG_INFO_SWITCHES.contains(&arg.as_str()))
        .collect();
    args.push(SYNTAX_CHECK_SWITCH.to_string());

    Ok((PathBuf::from(program.as_str()), args))
}

/// @ai:intent Split a command line into arguments using the MSVC runtime quoting rules
/// @ai:example ("/c /Fo\"x64\\Debug\\\\\"") -> ["/c", "/Fox64\\Debug\\"]
/// @ai:effects pure
pub fn split_command_line(line: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut in_quotes = false;
    let mut backslashes = 0usize;

    for ch in line.chars() {
        match ch {
            '\\' => {
                backslashes += 1;
                in_token = true;
            }
            '"' => {
                // 2n backslashes + quote: n backslashes and a delimiter
                // 2n+1 backslashes + quote: n backslashes and a literal quote
                current.extend(std::iter::repeat('\\').take(backslashes / 2));
                if backslashes % 2 == 1 {
                    current.push('"');
                } else {
                    in_quotes = !in_quotes;
                }
                backslashes = 0;
                in_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                current.extend(std::iter::repeat('\\').take(backslashes));
                backslashes = 0;
                if in_token {
                    args.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                current.extend(std::iter::repeat('\\').take(backslashes));
                backslashes = 0;
                current.push(c);
                in_token = true;
            }
        }
    }

    current.extend(std::iter::repeat('\\').take(backslashes));
    if in_token {
        args.push(current);
    }

    args
}
