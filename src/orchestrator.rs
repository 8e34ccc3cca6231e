//! @ai:module:intent Enumerate source files and fan tagged lines out over a fixed worker pool
//! @ai:module:layer application
//! @ai:module:public_api collect_source_files, run_checks
//! @ai:module:depends_on annotation, verifier, reporter, config, error
//! @ai:module:stateless true

use crate::annotation::{split_lines, tagged_line_indices};
use crate::config::CheckSettings;
use crate::error::{Error, Result};
use crate::reporter::Reporter;
use crate::verifier::Verifier;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// @ai:intent List the files to check: the file itself, or every source file below a directory
/// @ai:pre path exists
/// @ai:post directory results are in a stable, name-sorted walk order
/// @ai:effects fs:read
pub fn collect_source_files(path: &Path, settings: &CheckSettings) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.file_type().is_file() && settings.is_source_file(entry.path()) {
            files.push(entry.into_path());
        }
    }

    tracing::debug!("Found {} source files under {}", files.len(), path.display());
    Ok(files)
}

/// @ai:intent Verify every tagged line of the files on a pool of `workers` threads
/// @ai:pre workers >= 1
/// @ai:post every submitted unit has finished
/// @ai:effects fs:read, fs:write, io, state:write
pub fn run_checks(
    files: &[PathBuf],
    verifier: &Verifier<'_>,
    reporter: &Reporter,
    workers: usize,
) -> Result<()> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("checkce-worker-{}", i))
        .build()?;

    tracing::info!("Checking {} files with {} workers", files.len(), workers);

    pool.scope(|scope| {
        for file in files {
            let text = match std::fs::read_to_string(file) {
                Ok(text) => text,
                Err(source) => {
                    reporter.report_technical(&Error::FileRead {
                        path: file.clone(),
                        source,
                    });
                    continue;
                }
            };

            let lines = Arc::new(split_lines(&text));
            let tagged = tagged_line_indices(&lines);

            if tagged.is_empty() {
                scope.spawn(move |_| reporter.announce(file));
                continue;
            }

            for line_index in tagged {
                let lines = Arc::clone(&lines);
                scope.spawn(move |_| verifier.run(reporter, file, &lines, line_index));
            }
        }
    });

    Ok(())
}
