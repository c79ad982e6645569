//! Formatter configuration.
//!
//! Supplied by the code-style settings store of the host; the engine only
//! reads it.

use rustc_hash::FxHashMap;

/// Default right margin column.
pub const DEFAULT_RIGHT_MARGIN: u32 = 120;

/// Upper bound on line width used when deciding whether a range "is too long"
/// to fit on one line, independent of the configured margin.
pub const MAX_RIGHT_MARGIN: u32 = 1000;

/// Indentation settings, optionally overridden per language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndentOptions {
    /// Width of a tab character in columns.
    pub tab_size: u32,
    pub indent_size: u32,
    pub continuation_indent_size: u32,
    pub label_indent_size: u32,
    /// Render line indentation with tabs where possible.
    pub use_tab_character: bool,
    /// Cap on blank lines kept anywhere, on top of each rule's own cap.
    pub keep_blank_lines_max: u32,
}

impl Default for IndentOptions {
    fn default() -> Self {
        Self {
            tab_size: 4,
            indent_size: 4,
            continuation_indent_size: 8,
            label_indent_size: 0,
            use_tab_character: false,
            keep_blank_lines_max: 2,
        }
    }
}

impl IndentOptions {
    /// Options with the given indent size and a doubled continuation indent.
    pub fn with_indent_size(indent_size: u32) -> Self {
        Self {
            indent_size,
            continuation_indent_size: indent_size * 2,
            ..Default::default()
        }
    }

    /// Options that indent with tabs of the given width.
    pub fn with_tabs(tab_size: u32) -> Self {
        Self {
            tab_size,
            indent_size: tab_size,
            continuation_indent_size: tab_size * 2,
            use_tab_character: true,
            ..Default::default()
        }
    }
}

/// Configuration for one formatting run.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FormatOptions {
    pub indent: IndentOptions,
    /// Column lines should not extend past.
    pub right_margin: u32,
    /// Whether `language_overrides` is consulted.
    pub override_language_options: bool,
    /// Indent options keyed by language name.
    pub language_overrides: FxHashMap<String, IndentOptions>,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            indent: IndentOptions::default(),
            right_margin: DEFAULT_RIGHT_MARGIN,
            override_language_options: false,
            language_overrides: FxHashMap::default(),
        }
    }
}

impl FormatOptions {
    /// Create options with the specified right margin.
    pub fn with_right_margin(right_margin: u32) -> Self {
        Self {
            right_margin,
            ..Default::default()
        }
    }

    /// Create options with the specified indent settings.
    pub fn with_indent(indent: IndentOptions) -> Self {
        Self {
            indent,
            ..Default::default()
        }
    }

    /// Add a per-language override and turn overriding on.
    #[must_use]
    pub fn override_language(mut self, language: &str, indent: IndentOptions) -> Self {
        self.override_language_options = true;
        self.language_overrides.insert(language.to_owned(), indent);
        self
    }

    /// Indent options in effect for blocks of `language`.
    pub fn indent_for(&self, language: Option<&str>) -> &IndentOptions {
        if !self.override_language_options {
            return &self.indent;
        }
        language
            .and_then(|name| self.language_overrides.get(name))
            .unwrap_or(&self.indent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = FormatOptions::default();
        assert_eq!(options.right_margin, 120);
        assert_eq!(options.indent.tab_size, 4);
        assert_eq!(options.indent.indent_size, 4);
        assert_eq!(options.indent.continuation_indent_size, 8);
        assert_eq!(options.indent.keep_blank_lines_max, 2);
        assert!(!options.indent.use_tab_character);
    }

    #[test]
    fn test_override_only_when_enabled() {
        let mut options =
            FormatOptions::default().override_language("Json", IndentOptions::with_indent_size(2));
        assert_eq!(options.indent_for(Some("Json")).indent_size, 2);
        assert_eq!(options.indent_for(Some("Rust")).indent_size, 4);
        assert_eq!(options.indent_for(None).indent_size, 4);

        options.override_language_options = false;
        assert_eq!(options.indent_for(Some("Json")).indent_size, 4);
    }
}
