//! Error adapter for converting CLI errors to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's rich diagnostic formatting used in the CLI. Manifest errors
//! carry their source text and are rendered with a labelled snippet; every
//! other error gets a stable code and, where one helps, a hint.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};

use smartart::{InputError, PackagingError, SmartArtError, TemplateError};

use crate::{CliError, ManifestError};

/// Adapter for a manifest that failed to deserialize.
pub struct ManifestAdapter<'a>(pub &'a ManifestError);

impl fmt::Debug for ManifestAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManifestAdapter")
            .field("path", &self.0.path)
            .field("span", &self.0.span)
            .finish()
    }
}

impl fmt::Display for ManifestAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid manifest {}", self.0.path)
    }
}

impl std::error::Error for ManifestAdapter<'_> {}

impl MietteDiagnostic for ManifestAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new("smartart::manifest"))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(
            "each [[block]] needs a `kind` of heading, paragraph, list, process, tree, cycle, pyramid or hub",
        ))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.0.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.0.span.clone()?;
        let span = SourceSpan::new(span.start.into(), span.len());
        Some(Box::new(std::iter::once(LabeledSpan::new_primary_with_span(
            Some(self.0.message.clone()),
            span,
        ))))
    }
}

/// Adapter for [`SmartArtError`] variants.
pub struct ErrorAdapter<'a>(pub &'a SmartArtError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(self.0)
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            SmartArtError::Input(_) => "smartart::input",
            SmartArtError::Template(_) => "smartart::template",
            SmartArtError::Packaging(_) => "smartart::packaging",
            SmartArtError::Io(_) => "smartart::io",
            SmartArtError::Config(_) => "smartart::config",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        help_for(self.0).map(|help| Box::new(help) as Box<dyn fmt::Display>)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        None
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        None
    }
}

fn help_for(err: &SmartArtError) -> Option<String> {
    let help = match err {
        SmartArtError::Input(InputError::EmptyLabel { .. }) => {
            "give every label some text, or drop the blank entry".to_string()
        }
        SmartArtError::Input(InputError::InvalidCharacter { .. } | InputError::InvalidText { .. }) => {
            "remove control characters; only tab, line feed and carriage return are allowed".to_string()
        }
        SmartArtError::Input(InputError::CyclicTree { .. }) => {
            "a tree node cannot appear below itself".to_string()
        }
        SmartArtError::Template(TemplateError::NotFound { path, .. }) => format!(
            "run the template generator on a machine with Word to create {}, or pass --templates",
            path.display()
        ),
        SmartArtError::Template(_) => {
            "regenerate the template archive with the template generator".to_string()
        }
        SmartArtError::Packaging(PackagingError::MissingPart(_) | PackagingError::Malformed { .. }) => {
            "the host document is incomplete; re-save it in Word and try again".to_string()
        }
        SmartArtError::Config(_) => {
            "known sections are [templates], [drawing] and [extent]".to_string()
        }
        _ => return None,
    };
    Some(help)
}

/// A reportable error that can be rendered by miette.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A manifest error with a source snippet.
    Manifest(ManifestAdapter<'a>),
    /// A library error without source location.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Manifest(m) => fmt::Display::fmt(m, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Manifest(_) => None,
            Reportable::Error(e) => std::error::Error::source(e),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Manifest(m) => m.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Manifest(m) => m.help(),
            Reportable::Error(e) => e.help(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Manifest(m) => m.source_code(),
            Reportable::Error(e) => e.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Manifest(m) => m.labels(),
            Reportable::Error(e) => e.labels(),
        }
    }
}

/// Convert a [`CliError`] into the list of reportable errors to render.
pub fn to_reportables(err: &CliError) -> Vec<Reportable<'_>> {
    match err {
        CliError::Manifest(manifest) => vec![Reportable::Manifest(ManifestAdapter(manifest))],
        CliError::SmartArt(err) => vec![Reportable::Error(ErrorAdapter(err))],
    }
}
