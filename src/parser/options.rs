//! Parsing options and configuration.

/// Options for parsing AbiWord documents.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Error handling mode for malformed XML
    pub error_mode: ErrorMode,

    /// Whether to emit embedded images as binary objects
    pub extract_resources: bool,

    /// Whether to report `<metadata>` entries to the sink
    pub include_metadata: bool,

    /// Whether to emit header and footer sections
    pub include_headers_footers: bool,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (stop quietly at malformed XML).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Enable strict mode (fail on malformed XML).
    pub fn strict(mut self) -> Self {
        self.error_mode = ErrorMode::Strict;
        self
    }

    /// Enable or disable binary object emission for images.
    pub fn with_resources(mut self, extract: bool) -> Self {
        self.extract_resources = extract;
        self
    }

    /// Enable or disable metadata reporting.
    pub fn with_metadata(mut self, include: bool) -> Self {
        self.include_metadata = include;
        self
    }

    /// Enable or disable header and footer emission.
    pub fn with_headers_footers(mut self, include: bool) -> Self {
        self.include_headers_footers = include;
        self
    }

    /// Text-only preset: no images, no headers or footers.
    pub fn text_only(mut self) -> Self {
        self.extract_resources = false;
        self.include_headers_footers = false;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Lenient,
            extract_resources: true,
            include_metadata: true,
            include_headers_footers: true,
        }
    }
}

/// Error handling mode during parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail with an error at malformed XML
    Strict,
    /// Stop the pass at malformed XML, keeping what was emitted
    #[default]
    Lenient,
}
