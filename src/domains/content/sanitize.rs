//! HTML body cleaning for posts stored as HTML

/// Allow-list HTML cleaner: unknown elements and attributes are dropped,
/// script and style content is removed and only safe URL schemes survive.
#[derive(Debug, Clone, Default)]
pub struct HtmlSanitizer;

impl HtmlSanitizer {
    pub fn new() -> Self {
        Self
    }

    pub fn sanitize(&self, html: &str) -> String {
        ammonia::Builder::default().clean(html).to_string()
    }
}
