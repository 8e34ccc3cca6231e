//! @ai:module:intent Recognize [CompilationError] tags and derive the activated form of a tagged line
//! @ai:module:layer domain
//! @ai:module:public_api AnnotationOccurrence, LineScan, MalformedTag, parse_tagged_line, tagged_line_indices, split_lines
//! @ai:module:stateless true

use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// How the tag is named in user-facing messages.
pub const TAG_DISPLAY: &str = "[CompilationError-*]";

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[CompilationError(?:-(\w*))?\]").expect("Invalid regex"));

// 1: indentation, 2: the character after the comment opener, 3: the rest of the line,
// 4: configuration name, 5: expected diagnostic
static TAGGED_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\s*)//([^/])(.*[^/]//\s*\[CompilationError(?:-(\w*))?\]:\s*(.*\S)\s*)$")
        .expect("Invalid regex")
});

/// @ai:intent A well-formed tag on one line of a source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotationOccurrence {
    pub file: PathBuf,
    /// Zero-based.
    pub line_index: usize,
    /// `None` applies the tag to every configuration.
    pub configuration: Option<String>,
    pub expected: String,
    /// The line with its comment opener removed, terminator included.
    pub activated_line: String,
}

/// @ai:intent Reasons a tagged line is rejected without compiling it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedTag {
    DuplicateTag,
    IncorrectFormat,
    EmptyConfiguration,
}

/// @ai:intent Outcome of scanning a single line for a tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineScan {
    Untagged,
    Occurrence(AnnotationOccurrence),
    Malformed(MalformedTag),
}

impl MalformedTag {
    /// @ai:intent Message reported for the malformed tag
    /// @ai:effects pure
    pub fn message(&self) -> String {
        match self {
            MalformedTag::DuplicateTag => {
                format!("'{}' occurs more than once on the line.", TAG_DISPLAY)
            }
            MalformedTag::IncorrectFormat => format!(
                "'{}' is in the line, but the line's format is incorrect.",
                TAG_DISPLAY
            ),
            MalformedTag::EmptyConfiguration => format!(
                "The solution configuration in '{}' is empty.",
                TAG_DISPLAY
            ),
        }
    }
}

impl AnnotationOccurrence {
    /// @ai:intent One-based line number, as shown to the user
    /// @ai:effects pure
    pub fn line_number(&self) -> usize {
        self.line_index + 1
    }

    /// @ai:intent Check whether the tag is active under the given configuration
    /// @ai:example (None, "Release") -> true
    /// @ai:example (Some("Debug"), "Release") -> false
    /// @ai:effects pure
    pub fn applies_to(&self, configuration: &str) -> bool {
        self.configuration
            .as_deref()
            .map_or(true, |c| c == configuration)
    }
}

/// @ai:intent Split text into lines, keeping each line's terminator
/// @ai:post split_lines(text).concat() == text
/// @ai:effects pure
pub fn split_lines(text: &str) -> Vec<String> {
    text.split_inclusive('\n').map(str::to_string).collect()
}

/// @ai:intent Check whether a line contains at least one tag token
/// @ai:effects pure
pub fn has_tag(line: &str) -> bool {
    TAG_RE.is_match(line)
}

/// @ai:intent Zero-based indices of the lines that contain a tag token, in line order
/// @ai:effects pure
pub fn tagged_line_indices(lines: &[String]) -> Vec<usize> {
    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| has_tag(line))
        .map(|(index, _)| index)
        .collect()
}

/// @ai:intent Parse one line into a tag occurrence, a malformed tag, or nothing
/// @ai:pre line is a single line, optionally ending in "\n" or "\r\n"
/// @ai:effects pure
pub fn parse_tagged_line(file: &Path, line_index: usize, line: &str) -> LineScan {
    let tag_count = TAG_RE.find_iter(line).count();
    if tag_count == 0 {
        return LineScan::Untagged;
    }
    if tag_count > 1 {
        return LineScan::Malformed(MalformedTag::DuplicateTag);
    }

    let (body, terminator) = split_terminator(line);

    let Some(captures) = TAGGED_LINE_RE.captures(body) else {
        return LineScan::Malformed(MalformedTag::IncorrectFormat);
    };

    let indentation = &captures[1];
    let first = &captures[2];
    let rest = &captures[3];
    let configuration = captures.get(4).map(|m| m.as_str().to_string());
    let expected = captures[5].to_string();

    if configuration.as_deref() == Some("") {
        return LineScan::Malformed(MalformedTag::EmptyConfiguration);
    }

    // A single space after "//" belongs to the comment, anything else to the code.
    let first = if first == " " { "" } else { first };
    let activated_line = format!("{indentation}{first}{rest}{terminator}");

    LineScan::Occurrence(AnnotationOccurrence {
        file: file.to_path_buf(),
        line_index,
        configuration,
        expected,
        activated_line,
    })
}

/// @ai:intent Separate a line from its "\n" or "\r\n" terminator
/// @ai:effects pure
fn split_terminator(line: &str) -> (&str, &str) {
    if let Some(body) = line.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = line.strip_suffix('\n') {
        (body, "\n")
    } else {
        (line, "")
    }
}
