//! @ai:module:intent Test doubles for the build system, the compiler and the output streams
//! @ai:module:layer test
//! @ai:module:public_api MockBuildSystem, MockCompiler, SharedBuffer, fake_compile
//! @ai:module:stateless false

use crate::compiler::{CompilationCheckerTrait, CompilationResult};
use crate::error::Result;
use crate::toolchain::{BuildMode, BuildSystemTrait, ProcessOutput};
use parking_lot::Mutex;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// @ai:intent Build system returning canned transcripts per build mode
pub struct MockBuildSystem {
    full: ProcessOutput,
    compile_only: ProcessOutput,
    modes: Mutex<Vec<BuildMode>>,
}

impl MockBuildSystem {
    pub fn new(full: ProcessOutput, compile_only: ProcessOutput) -> Self {
        Self {
            full,
            compile_only,
            modes: Mutex::new(Vec::new()),
        }
    }

    /// Build modes requested so far, in call order.
    pub fn modes(&self) -> Vec<BuildMode> {
        self.modes.lock().clone()
    }
}

impl BuildSystemTrait for MockBuildSystem {
    fn build(&self, _solution_dir: &Path, _configuration: &str, mode: BuildMode) -> Result<ProcessOutput> {
        self.modes.lock().push(mode);
        Ok(match mode {
            BuildMode::Full => self.full.clone(),
            BuildMode::CompileOnly => self.compile_only.clone(),
        })
    }
}

type Responder = dyn Fn(&Path, &str) -> CompilationResult + Send + Sync;

/// @ai:intent Compiler that answers from the contents of the file it is given
pub struct MockCompiler {
    respond: Box<Responder>,
    calls: AtomicUsize,
    seen: Mutex<Vec<(PathBuf, String)>>,
}

impl MockCompiler {
    pub fn new(respond: impl Fn(&Path, &str) -> CompilationResult + Send + Sync + 'static) -> Self {
        Self {
            respond: Box::new(respond),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Compiler that behaves like `fake_compile`.
    pub fn fake() -> Self {
        Self::new(fake_compile)
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Paths and contents of the compiled files, in call order.
    pub fn seen(&self) -> Vec<(PathBuf, String)> {
        self.seen.lock().clone()
    }
}

impl CompilationCheckerTrait for MockCompiler {
    fn check_file(&self, path: &Path) -> Result<CompilationResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let content = std::fs::read_to_string(path)?;
        self.seen.lock().push((path.to_path_buf(), content.clone()));
        Ok((self.respond)(path, &content))
    }
}

/// A tiny stand-in for the compiler: any line that is not a comment and
/// contains `"str"` is a conversion error, `#error` is a fatal error and
/// `warn_me` is a warning. The first such line decides the result.
pub fn fake_compile(path: &Path, content: &str) -> CompilationResult {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let diagnostic = content.lines().enumerate().find_map(|(index, line)| {
        let code = line.trim_start();
        if code.starts_with("//") {
            return None;
        }
        let (kind, id, message) = if code.contains("\"str\"") {
            ("error", "C2440", "'initializing': cannot convert from 'const char [4]' to 'int'")
        } else if code.starts_with("#error") {
            ("fatal error", "C1189", "#error:  stop")
        } else if code.contains("warn_me") {
            ("warning", "C4996", "'warn_me': was declared deprecated")
        } else {
            return None;
        };
        Some(format!(
            "{}({},5): {} {}: {}",
            path.display(),
            index + 1,
            kind,
            id,
            message
        ))
    });

    match diagnostic {
        Some(line) => CompilationResult {
            success: false,
            output: format!("{}\n{}\n", name, line),
        },
        None => CompilationResult {
            success: true,
            output: format!("{}\n", name),
        },
    }
}

/// @ai:intent In-memory writer whose contents can be inspected after the run
#[derive(Clone, Default)]
pub struct SharedBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes.lock()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.bytes.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
