//! The REPL session and its terminal rendering, shared by the binary and the integration tests.
use miette::{Diagnostic, GraphicalReportHandler, LabeledSpan, Severity, SourceCode};

pub mod session;
pub mod table;

pub use session::{Session, SessionError};

/// Renders `diagnostic` as a graphical report. Labels point into `source_code` when given.
pub fn render_diagnostic(diagnostic: &dyn Diagnostic, source_code: Option<&str>) -> String {
    let handler = GraphicalReportHandler::new();
    let mut string = String::new();
    let result = match source_code {
        Some(source_code) => handler.render_report(
            &mut string,
            &WithSource {
                diagnostic,
                source_code,
            },
        ),
        None => handler.render_report(&mut string, diagnostic),
    };
    if result.is_err() {
        return diagnostic.to_string();
    }
    string
}

/// Attaches the text a diagnostic's labels refer to.
struct WithSource<'a> {
    diagnostic: &'a dyn Diagnostic,
    source_code: &'a str,
}

impl std::fmt::Display for WithSource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.diagnostic)
    }
}

impl std::fmt::Debug for WithSource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.diagnostic)
    }
}

impl std::error::Error for WithSource<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.diagnostic.source()
    }
}

impl Diagnostic for WithSource<'_> {
    fn source_code(&self) -> Option<&dyn SourceCode> {
        Some(&self.source_code)
    }

    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        self.diagnostic.code()
    }

    fn severity(&self) -> Option<Severity> {
        self.diagnostic.severity()
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        self.diagnostic.help()
    }

    fn url<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        self.diagnostic.url()
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        self.diagnostic.labels()
    }

    fn related<'a>(&'a self) -> Option<Box<dyn Iterator<Item = &'a dyn Diagnostic> + 'a>> {
        self.diagnostic.related()
    }

    fn diagnostic_source(&self) -> Option<&dyn Diagnostic> {
        self.diagnostic.diagnostic_source()
    }
}
