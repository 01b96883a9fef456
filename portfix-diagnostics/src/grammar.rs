use regex::Regex;
use thiserror::Error;

/// Names accepted by [`DiagnosticGrammar::builtin`].
pub const BUILTIN_GRAMMARS: &[&str] = &["maven", "javac", "gcc"];

const MAVEN_PATTERN: &str =
    r"\[ERROR\] (?P<path>.+?):\[(?P<line>\d+),(?P<column>\d+)\] (?P<message>.*)";
const JAVAC_PATTERN: &str = r"^(?P<path>[^\s:][^:]*):(?P<line>\d+): error: (?P<message>.*)";
const GCC_PATTERN: &str =
    r"^(?P<path>[^\s:][^:]*):(?P<line>\d+):(?P<column>\d+): (?:fatal )?error: (?P<message>.*)";

const REQUIRED_GROUPS: &[&str] = &["path", "line", "message"];

#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("grammar '{name}' has an invalid pattern: {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },

    #[error("grammar '{name}' is missing the named capture group '{group}'")]
    MissingGroup { name: String, group: &'static str },

    #[error("unknown built-in grammar '{name}' (known: {known})")]
    UnknownBuiltin { name: String, known: String },
}

/// A declarative diagnostic line format.
///
/// The pattern must define the named groups `path`, `line` and `message`;
/// `column` is optional. The pattern is searched within each output line,
/// so it does not need to be anchored.
#[derive(Debug, Clone)]
pub struct DiagnosticGrammar {
    name: String,
    pattern: Regex,
}

/// One matched line, before path resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDiagnostic<'a> {
    pub path: &'a str,
    pub line: u32,
    pub column: Option<u32>,
    pub message: &'a str,
}

impl DiagnosticGrammar {
    pub fn new(name: impl Into<String>, pattern: &str) -> Result<Self, GrammarError> {
        let name = name.into();
        let pattern = Regex::new(pattern).map_err(|source| GrammarError::InvalidPattern {
            name: name.clone(),
            source,
        })?;

        let groups: Vec<&str> = pattern.capture_names().flatten().collect();
        for &group in REQUIRED_GROUPS {
            if !groups.contains(&group) {
                return Err(GrammarError::MissingGroup { name, group });
            }
        }

        Ok(Self { name, pattern })
    }

    pub fn builtin(name: &str) -> Result<Self, GrammarError> {
        let pattern = match name {
            "maven" => MAVEN_PATTERN,
            "javac" => JAVAC_PATTERN,
            "gcc" => GCC_PATTERN,
            _ => {
                return Err(GrammarError::UnknownBuiltin {
                    name: name.to_string(),
                    known: BUILTIN_GRAMMARS.join(", "),
                });
            }
        };
        Self::new(name, pattern)
    }

    /// `[ERROR] <path>:[<line>,<col>] <message>` as printed by maven-compiler-plugin.
    pub fn maven() -> Self {
        Self::new("maven", MAVEN_PATTERN).expect("maven grammar is a valid pattern")
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }

    /// Match one output line. Returns `None` for noise, including lines whose
    /// line/column numbers do not fit in `u32`.
    pub fn parse_line<'a>(&self, line: &'a str) -> Option<RawDiagnostic<'a>> {
        let caps = self.pattern.captures(line)?;
        let path = caps.name("path")?.as_str().trim();
        if path.is_empty() {
            return None;
        }
        let line_no = caps.name("line")?.as_str().parse().ok()?;
        let column = match caps.name("column") {
            Some(m) => Some(m.as_str().parse().ok()?),
            None => None,
        };
        let message = caps.name("message").map_or("", |m| m.as_str().trim_end());

        Some(RawDiagnostic {
            path,
            line: line_no,
            column,
            message,
        })
    }
}

impl Default for DiagnosticGrammar {
    fn default() -> Self {
        Self::maven()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maven_line_parses_all_groups() {
        let g = DiagnosticGrammar::maven();
        let raw = g
            .parse_line("[ERROR] /work/out/src/main/java/App.java:[18,50] <identifier> expected")
            .expect("match");
        assert_eq!(raw.path, "/work/out/src/main/java/App.java");
        assert_eq!(raw.line, 18);
        assert_eq!(raw.column, Some(50));
        assert_eq!(raw.message, "<identifier> expected");
    }

    #[test]
    fn maven_ignores_plain_error_lines() {
        let g = DiagnosticGrammar::maven();
        assert!(g.parse_line("[ERROR] COMPILATION ERROR :").is_none());
        assert!(g.parse_line("[INFO] BUILD FAILURE").is_none());
    }

    #[test]
    fn javac_grammar_has_no_column() {
        let g = DiagnosticGrammar::builtin("javac").expect("builtin");
        let raw = g
            .parse_line("src/main/java/A.java:7: error: ';' expected")
            .expect("match");
        assert_eq!(raw.line, 7);
        assert_eq!(raw.column, None);
        assert_eq!(raw.message, "';' expected");
    }

    #[test]
    fn gcc_grammar_matches_fatal_errors() {
        let g = DiagnosticGrammar::builtin("gcc").expect("builtin");
        let raw = g
            .parse_line("src/main.c:3:10: fatal error: foo.h: No such file or directory")
            .expect("match");
        assert_eq!(raw.path, "src/main.c");
        assert_eq!(raw.column, Some(10));
    }

    #[test]
    fn overflowing_line_number_is_noise() {
        let g = DiagnosticGrammar::maven();
        assert!(
            g.parse_line("[ERROR] A.java:[99999999999,1] too big")
                .is_none()
        );
    }

    #[test]
    fn missing_group_is_rejected() {
        let err = DiagnosticGrammar::new("custom", r"(?P<path>\S+):(?P<line>\d+)")
            .expect_err("message group missing");
        assert!(matches!(
            err,
            GrammarError::MissingGroup {
                group: "message",
                ..
            }
        ));
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let err = DiagnosticGrammar::new("broken", r"(?P<path>").expect_err("invalid");
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn unknown_builtin_lists_known_names() {
        let err = DiagnosticGrammar::builtin("msbuild").expect_err("unknown");
        assert!(err.to_string().contains("maven, javac, gcc"));
    }
}
