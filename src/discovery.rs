//! @ai:module:intent Locate the solution directory and the C++ project directory of a path
//! @ai:module:layer infrastructure
//! @ai:module:public_api ProjectLayout, find_solution_dir, find_project_dir, dir_of, validate_target
//! @ai:module:depends_on config, error
//! @ai:module:stateless true

use crate::config::CheckSettings;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

const SOLUTION_EXT: &str = "sln";
const PROJECT_EXT: &str = "vcxproj";

/// @ai:intent Directories that frame one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    pub solution_dir: PathBuf,
    /// Compilation-unit directory; compiler paths are relative to it.
    pub project_dir: PathBuf,
    /// Directory of the checked path.
    pub target_dir: PathBuf,
}

impl ProjectLayout {
    /// @ai:intent Discover the solution and project directories around target_dir
    /// @ai:pre target_dir is an existing absolute directory
    /// @ai:effects fs:read
    pub fn discover(target_dir: &Path) -> Result<Self> {
        let solution_dir = find_solution_dir(target_dir)?;
        let project_dir = find_project_dir(target_dir, &solution_dir)?;

        Ok(Self {
            solution_dir,
            project_dir,
            target_dir: target_dir.to_path_buf(),
        })
    }
}

/// @ai:intent Check that the target is a directory or a source file
/// @ai:effects fs:read
pub fn validate_target(path: &Path, settings: &CheckSettings) -> Result<()> {
    if path.is_dir() {
        Ok(())
    } else if path.is_file() {
        if settings.is_source_file(path) {
            Ok(())
        } else {
            Err(Error::NotASourceFile(path.to_path_buf()))
        }
    } else {
        Err(Error::PathNotFound(path.to_path_buf()))
    }
}

/// @ai:intent The directory itself, or the parent directory of a file
/// @ai:effects fs:read
pub fn dir_of(path: &Path) -> PathBuf {
    if path.is_file() {
        path.parent().map(Path::to_path_buf).unwrap_or_default()
    } else {
        path.to_path_buf()
    }
}

/// @ai:intent Count the regular files in a directory with the given extension
/// @ai:effects fs:read
fn count_files_with_extension(dir: &Path, ext: &str) -> Result<usize> {
    let mut count = 0;

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(ext));

        if matches && path.is_file() {
            count += 1;
        }
    }

    Ok(count)
}

/// @ai:intent Walk up from start_dir to the first directory holding exactly one .sln file
/// @ai:pre start_dir is an existing absolute directory
/// @ai:post the returned directory is start_dir or one of its ancestors
/// @ai:effects fs:read
pub fn find_solution_dir(start_dir: &Path) -> Result<PathBuf> {
    for dir in start_dir.ancestors() {
        match count_files_with_extension(dir, SOLUTION_EXT)? {
            0 => continue,
            1 => {
                tracing::debug!("Solution directory: {}", dir.display());
                return Ok(dir.to_path_buf());
            }
            _ => return Err(Error::AmbiguousSolution(dir.to_path_buf())),
        }
    }

    Err(Error::SolutionNotFound(start_dir.to_path_buf()))
}

/// @ai:intent Walk up from start_dir to the nearest directory holding exactly one .vcxproj file
/// @ai:pre start_dir is solution_dir or a descendant of it
/// @ai:post the returned directory is solution_dir or a direct child of it
/// @ai:effects fs:read
pub fn find_project_dir(start_dir: &Path, solution_dir: &Path) -> Result<PathBuf> {
    if !start_dir.starts_with(solution_dir) {
        return Err(Error::OutsideSolution {
            path: start_dir.to_path_buf(),
            solution: solution_dir.to_path_buf(),
        });
    }

    for dir in start_dir.ancestors() {
        match count_files_with_extension(dir, PROJECT_EXT)? {
            0 => {}
            1 => {
                if dir == solution_dir || dir.parent() == Some(solution_dir) {
                    tracing::debug!("Project directory: {}", dir.display());
                    return Ok(dir.to_path_buf());
                }
                return Err(Error::ProjectOutsideSolution {
                    project: dir.to_path_buf(),
                    solution: solution_dir.to_path_buf(),
                });
            }
            _ => return Err(Error::AmbiguousProject(dir.to_path_buf())),
        }

        if dir == solution_dir {
            break;
        }
    }

    Err(Error::ProjectNotFound {
        start: start_dir.to_path_buf(),
        solution: solution_dir.to_path_buf(),
    })
}
