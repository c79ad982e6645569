//! Core diagnostic types for structured conflict reporting.
//!
//! Defines [`Diagnostic`], [`Label`], [`Severity`], and [`Attachment`].

use std::fmt;

use loom_ir::TextRange;

use crate::ErrorCode;

/// Severity level for diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// A labeled document range with a message.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Label {
    pub range: TextRange,
    pub message: String,
    /// Whether this is the block the diagnostic is about.
    pub is_primary: bool,
}

impl Label {
    /// Create a primary label (the block that failed).
    pub fn primary(range: TextRange, message: impl Into<String>) -> Self {
        Label {
            range,
            message: message.into(),
            is_primary: true,
        }
    }

    /// Create a secondary label (related block).
    pub fn secondary(range: TextRange, message: impl Into<String>) -> Self {
        Label {
            range,
            message: message.into(),
            is_primary: false,
        }
    }
}

/// Named blob carried along for offline reproduction.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Attachment {
    pub name: String,
    pub content: String,
}

impl Attachment {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Attachment {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// A diagnostic about a layout rule that had to be abandoned.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[must_use = "diagnostics should be reported or returned, not silently dropped"]
pub struct Diagnostic {
    /// Error code for searchability.
    pub code: ErrorCode,
    pub severity: Severity,
    /// Main message.
    pub message: String,
    /// Labeled ranges showing where the conflict occurred.
    pub labels: Vec<Label>,
    /// Owning language of the primary block, when known.
    pub language: Option<String>,
    /// Additional notes providing context.
    pub notes: Vec<String>,
    pub attachments: Vec<Attachment>,
}

impl Diagnostic {
    fn new_with_severity(code: ErrorCode, severity: Severity) -> Self {
        Diagnostic {
            code,
            severity,
            message: code.description().to_owned(),
            labels: Vec::new(),
            language: None,
            notes: Vec::new(),
            attachments: Vec::new(),
        }
    }

    /// Create a new error diagnostic.
    #[cold]
    pub fn error(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Error)
    }

    /// Create a new warning diagnostic.
    #[cold]
    pub fn warning(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Warning)
    }

    /// Set the main message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add a primary label.
    pub fn with_label(mut self, range: TextRange, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(range, message));
        self
    }

    /// Add a secondary label for context.
    pub fn with_secondary_label(mut self, range: TextRange, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(range, message));
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Add a note providing additional context.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_attachment(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.attachments.push(Attachment::new(name, content));
        self
    }

    /// Get the primary range (first primary label's range).
    pub fn primary_range(&self) -> Option<TextRange> {
        self.labels.iter().find(|l| l.is_primary).map(|l| l.range)
    }

    /// Check if this is an error (vs warning/note).
    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }

    pub fn attachment(&self, name: &str) -> Option<&Attachment> {
        self.attachments.iter().find(|a| a.name == name)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.severity, self.code, self.message)?;

        if let Some(language) = &self.language {
            write!(f, " ({language})")?;
        }

        for label in &self.labels {
            let marker = if label.is_primary { "-->" } else { "   " };
            write!(f, "\n  {} {}: {}", marker, label.range, label.message)?;
        }

        for note in &self.notes {
            write!(f, "\n  = note: {note}")?;
        }

        // Attachments can be whole documents; only name them.
        for attachment in &self.attachments {
            write!(
                f,
                "\n  = attached: {} ({} bytes)",
                attachment.name,
                attachment.content.len()
            )?;
        }

        Ok(())
    }
}
