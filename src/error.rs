use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn single(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos + 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    MissingClass,
    MissingMain,
    MalformedClassName,
    UnbalancedBraces,
    MainBodyNotFound,
    UnrecognizedExpression,
    UnsupportedMathMethod,
    UndeclaredVariable,
    DuplicateDeclaration,
    UnsupportedStatement,
    CoercionFailure,
}

impl ErrorKind {
    /// Validation errors are reported before any statement runs and read like
    /// compiler messages; everything else reads like a runtime exception.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ErrorKind::MissingClass
                | ErrorKind::MissingMain
                | ErrorKind::MalformedClassName
                | ErrorKind::UnbalancedBraces
                | ErrorKind::MainBodyNotFound
        )
    }

    /// Default student-facing hint for this kind of failure.
    pub fn hint(&self) -> &'static str {
        match self {
            ErrorKind::MissingClass => {
                "Every program needs a class wrapper like 'public class Main { ... }'."
            }
            ErrorKind::MissingMain => {
                "Add 'public static void main(String[] args) { ... }' inside your class."
            }
            ErrorKind::MalformedClassName => {
                "The class keyword must be followed by a name, e.g. 'public class Main'."
            }
            ErrorKind::UnbalancedBraces => {
                "Every '{' needs a matching '}'. Count your braces from the top of the file."
            }
            ErrorKind::MainBodyNotFound => {
                "The main method was found but its '{ ... }' body could not be read."
            }
            ErrorKind::UnrecognizedExpression => {
                "Supported expressions: literals, variables, Math calls, and + - * / arithmetic."
            }
            ErrorKind::UnsupportedMathMethod => {
                "Supported Math methods: abs, max, min, sqrt, pow, round, floor, ceil, random."
            }
            ErrorKind::UndeclaredVariable => {
                "Declare the variable first, e.g. 'int x = 0;', before assigning to it."
            }
            ErrorKind::DuplicateDeclaration => {
                "This name is already declared. Assign to it instead, without the type keyword."
            }
            ErrorKind::UnsupportedStatement => {
                "Supported statements: variable declarations, assignments, and System.out.print/println."
            }
            ErrorKind::CoercionFailure => {
                "The value does not fit the variable's declared type."
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JaviError {
    pub kind: ErrorKind,
    #[serde(skip)]
    pub span: Span,
    pub message: String,
    #[serde(skip)]
    pub help: Option<String>,
}

impl JaviError {
    pub fn new(kind: ErrorKind, span: Span, message: String) -> Self {
        Self {
            kind,
            span,
            message,
            help: None,
        }
    }

    pub fn with_help(kind: ErrorKind, span: Span, message: String, help: String) -> Self {
        Self {
            kind,
            span,
            message,
            help: Some(help),
        }
    }

    /// The hint shown under the error: an explicit help text if one was
    /// attached, otherwise the kind's default.
    pub fn help_text(&self) -> &str {
        self.help.as_deref().unwrap_or_else(|| self.kind.hint())
    }

    pub fn report(&self, source: &str, filename: Option<&str>) {
        let filename = filename.unwrap_or("<student code>");

        let color = if self.kind.is_validation() {
            Color::Red
        } else {
            Color::Magenta
        };

        let kind_str = if self.kind.is_validation() {
            "Compile Error"
        } else {
            "Runtime Error"
        };

        Report::build(ReportKind::Error, filename, self.span.start)
            .with_message(format!("{}: {}", kind_str.fg(color), self.message))
            .with_label(
                Label::new((filename, self.span.start..self.span.end))
                    .with_message(&self.message)
                    .with_color(color),
            )
            .with_note(format!("{}: {}", "help".fg(Color::Cyan), self.help_text()))
            .finish()
            .print((filename, Source::from(source)))
            .unwrap();
    }
}

impl fmt::Display for JaviError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for JaviError {}
