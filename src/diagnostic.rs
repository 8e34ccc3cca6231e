//! @ai:module:intent Parse MSVC-style diagnostic lines from compiler output
//! @ai:module:layer domain
//! @ai:module:public_api DiagnosticKind, DiagnosticRecord, parse_diagnostic_line, first_diagnostic_line
//! @ai:module:stateless true

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

// <file>(<line>[,<col>]): <kind> <CODE>: <message>, the file may start with a drive letter
static DIAGNOSTIC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^..[^:]*\(([0-9,]+)\): ([a-z ]+) ([A-Z]+\d+): (.*)$").expect("Invalid regex")
});

/// @ai:intent Severity of a compiler diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    Error,
    FatalError,
    Warning,
    Note,
    /// Any other kind word, kept as printed.
    Other(String),
}

/// @ai:intent One diagnostic decoded from a line of compiler output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticRecord {
    pub kind: DiagnosticKind,
    pub code: String,
    pub message: String,
}

impl DiagnosticKind {
    /// @ai:intent Decode the kind word(s) used by the compiler
    /// @ai:example ("fatal error") -> FatalError
    /// @ai:example ("remark") -> Other("remark")
    /// @ai:effects pure
    pub fn parse(s: &str) -> Self {
        match s {
            "error" => Self::Error,
            "fatal error" => Self::FatalError,
            "warning" => Self::Warning,
            "note" | "message" => Self::Note,
            other => Self::Other(other.to_string()),
        }
    }

    /// @ai:intent Get the kind as printed by the compiler
    /// @ai:effects pure
    pub fn as_str(&self) -> &str {
        match self {
            Self::Error => "error",
            Self::FatalError => "fatal error",
            Self::Warning => "warning",
            Self::Note => "note",
            Self::Other(kind) => kind,
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// @ai:intent Parse a single diagnostic line
/// @ai:example ("C:\\a\\b.cpp(12,5): error C2440: 'x': cannot convert") -> Some(error, C2440)
/// @ai:example ("b.cpp") -> None
/// @ai:effects pure
pub fn parse_diagnostic_line(line: &str) -> Option<DiagnosticRecord> {
    let captures = DIAGNOSTIC_RE.captures(line.trim_end())?;

    Some(DiagnosticRecord {
        kind: DiagnosticKind::parse(&captures[2]),
        code: captures[3].to_string(),
        message: captures[4].to_string(),
    })
}

/// @ai:intent Find the line holding the first diagnostic of a compiler run
/// @ai:pre source_name is the file name passed to the compiler
/// @ai:post the echoed source file name, if present, is skipped
/// @ai:effects pure
pub fn first_diagnostic_line<'a>(output: &'a str, source_name: &str) -> Option<&'a str> {
    let mut lines = output.lines().filter(|l| !l.trim().is_empty());
    let first = lines.next()?;

    if first.trim().eq_ignore_ascii_case(source_name) {
        lines.next()
    } else {
        Some(first)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_error_with_column() {
        let record = parse_diagnostic_line(
            r"C:\src\BFTest\Foo.T.checkce-12.cpp(12,18): error C2440: 'initializing': cannot convert from 'const char [4]' to 'int'",
        )
        .unwrap();

        assert_eq!(
            record,
            DiagnosticRecord {
                kind: DiagnosticKind::Error,
                code: "C2440".to_string(),
                message: "'initializing': cannot convert from 'const char [4]' to 'int'"
                    .to_string(),
            }
        );
    }

    #[test]
    fn test_parse_relative_path_without_column() {
        let record =
            parse_diagnostic_line("Foo.T.checkce-3.cpp(3): warning C4101: 'x': unreferenced local variable\r")
                .unwrap();

        assert_eq!(record.kind, DiagnosticKind::Warning);
        assert_eq!(record.code, "C4101");
    }

    #[test]
    fn test_parse_fatal_error() {
        let record = parse_diagnostic_line(
            r"D:\p\x.cpp(1): fatal error C1083: Cannot open include file: 'nope.h': No such file or directory",
        )
        .unwrap();

        assert_eq!(record.kind, DiagnosticKind::FatalError);
        assert_eq!(record.kind.to_string(), "fatal error");
    }

    #[test]
    fn test_parse_rejects_other_lines() {
        assert_eq!(parse_diagnostic_line("Foo.T.checkce-3.cpp"), None);
        assert_eq!(
            parse_diagnostic_line("cl : Command line warning D9025 : overriding '/W3' with '/W4'"),
            None
        );
    }

    #[test]
    fn test_parse_keeps_unknown_kind() {
        let record = parse_diagnostic_line(r"C:\x.cpp(1): remark C1: hm").unwrap();

        assert_eq!(record.kind, DiagnosticKind::Other("remark".to_string()));
        assert_eq!(record.kind.to_string(), "remark");
        assert_eq!(record.message, "hm");
    }

    #[test]
    fn test_first_diagnostic_line_skips_echoed_name() {
        let output = "Foo.checkce-7.cpp\r\nC:\\p\\Foo.checkce-7.cpp(7): error C2065: 'y': undeclared identifier\r\n";

        assert_eq!(
            first_diagnostic_line(output, "Foo.checkce-7.cpp"),
            Some("C:\\p\\Foo.checkce-7.cpp(7): error C2065: 'y': undeclared identifier")
        );
    }

    #[test]
    fn test_first_diagnostic_line_without_echo() {
        let output = "C:\\p\\Foo.cpp(7): error C2065: 'y': undeclared identifier\n";

        assert_eq!(
            first_diagnostic_line(output, "Foo.checkce-7.cpp"),
            Some("C:\\p\\Foo.cpp(7): error C2065: 'y': undeclared identifier")
        );
        assert_eq!(first_diagnostic_line("Foo.checkce-7.cpp\n", "Foo.checkce-7.cpp"), None);
        assert_eq!(first_diagnostic_line("", "Foo.checkce-7.cpp"), None);
    }
}
