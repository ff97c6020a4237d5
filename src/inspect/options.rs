//! Per-call presentation options

use crate::memory::AddressPath;

/// Locale tag for embedded text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Language {
    #[default]
    En,
    De,
    Fr,
    Ja,
}

impl Language {
    pub fn decimal_separator(self) -> char {
        match self {
            Language::De | Language::Fr => ',',
            Language::En | Language::Ja => '.',
        }
    }

    pub fn bool_word(self, value: bool) -> &'static str {
        match (self, value) {
            (Language::En, true) => "true",
            (Language::En, false) => "false",
            (Language::De, true) => "wahr",
            (Language::De, false) => "falsch",
            (Language::Fr, true) => "vrai",
            (Language::Fr, false) => "faux",
            (Language::Ja, true) => "真",
            (Language::Ja, false) => "偽",
        }
    }
}

/// How leaf values are turned into text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RenderMode {
    /// Unstyled text, strings shown verbatim with escapes
    Raw,
    /// Themed spans
    #[default]
    Rich,
}

/// Options for one render call.
///
/// Passed by value into every recursion level; a child's changes never
/// reach its parent.
#[derive(Debug, Clone, PartialEq)]
pub struct PresentationOptions {
    /// Path prefix the rendered tree hangs from. `None` starts at the root.
    pub address_path: Option<AddressPath>,
    /// Initial open state of the root node when nothing is persisted for it
    pub default_open: bool,
    /// Label of the root node; the type name is used when absent
    pub title: Option<String>,
    pub language: Language,
    pub render_mode: RenderMode,
    /// Open pointer branches without waiting for the user
    pub expand_pointers: bool,
}

impl Default for PresentationOptions {
    fn default() -> Self {
        PresentationOptions {
            address_path: None,
            default_open: true,
            title: None,
            language: Language::default(),
            render_mode: RenderMode::default(),
            expand_pointers: false,
        }
    }
}

impl PresentationOptions {
    pub fn with_address_path(mut self, path: AddressPath) -> Self {
        self.address_path = Some(path);
        self
    }

    pub fn with_default_open(mut self, open: bool) -> Self {
        self.default_open = open;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn with_render_mode(mut self, mode: RenderMode) -> Self {
        self.render_mode = mode;
        self
    }

    pub fn with_expand_pointers(mut self, expand: bool) -> Self {
        self.expand_pointers = expand;
        self
    }

    /// Options for anything below the root node
    pub(crate) fn nested(&self) -> Self {
        PresentationOptions {
            default_open: false,
            title: None,
            ..self.clone()
        }
    }
}
