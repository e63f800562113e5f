//! Resolver configuration.

use css::{ColorScheme, MediaEnvironment, MediaType};

/// Environment the resolver computes styles for.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleConfig {
    /// Font size of `medium` and of the root when nothing sets it, in px.
    pub default_font_size: f64,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub media_type: MediaType,
    pub color_scheme: ColorScheme,
    /// Forces quirks-mode matching regardless of the document's mode.
    pub quirks_mode: bool,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            default_font_size: 16.0,
            viewport_width: 1280.0,
            viewport_height: 800.0,
            media_type: MediaType::Screen,
            color_scheme: ColorScheme::Light,
            quirks_mode: false,
        }
    }
}

impl StyleConfig {
    pub fn with_default_font_size(mut self, px: f64) -> Self {
        self.default_font_size = px;
        self
    }

    pub fn with_viewport(mut self, width: f64, height: f64) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    pub fn with_media_type(mut self, media_type: MediaType) -> Self {
        self.media_type = media_type;
        self
    }

    pub fn with_color_scheme(mut self, scheme: ColorScheme) -> Self {
        self.color_scheme = scheme;
        self
    }

    pub fn with_quirks_mode(mut self, quirks: bool) -> Self {
        self.quirks_mode = quirks;
        self
    }

    /// The environment `@media` queries are evaluated against.
    pub fn media_environment(&self) -> MediaEnvironment {
        MediaEnvironment {
            media_type: self.media_type.clone(),
            width: self.viewport_width,
            height: self.viewport_height,
            color_scheme: self.color_scheme,
            font_size: self.default_font_size,
        }
    }
}
