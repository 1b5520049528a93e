//! Color palette for the text renderer
//!
//! Colors wrap individual tokens only, so disabling them leaves glyphs and
//! spacing untouched.

use nu_ansi_term::{Color, Style};

use crate::models::ResourceKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn paint(&self, style: Style, text: &str) -> String {
        if self.enabled {
            style.paint(text).to_string()
        } else {
            text.to_string()
        }
    }

    pub fn kind(&self, kind: ResourceKind, text: &str) -> String {
        self.paint(kind_style(kind), text)
    }

    pub fn heading(&self, text: &str) -> String {
        self.paint(Style::new().bold(), text)
    }

    pub fn ok(&self, text: &str) -> String {
        self.paint(Color::Green.normal(), text)
    }

    pub fn warn(&self, text: &str) -> String {
        self.paint(Color::Yellow.normal(), text)
    }

    pub fn error(&self, text: &str) -> String {
        self.paint(Color::Red.normal(), text)
    }

    pub fn info(&self, text: &str) -> String {
        self.paint(Color::Cyan.normal(), text)
    }

    pub fn dim(&self, text: &str) -> String {
        self.paint(Style::new().dimmed(), text)
    }
}

/// Style used for a resource kind's `Kind/name` token
fn kind_style(kind: ResourceKind) -> Style {
    match kind {
        ResourceKind::Namespace => Color::Cyan.normal(),
        ResourceKind::Pod => Color::Green.normal(),
        ResourceKind::Service | ResourceKind::Endpoints => Color::Blue.normal(),
        ResourceKind::Ingress => Color::Purple.normal(),
        ResourceKind::IngressClass => Color::Purple.bold(),
        ResourceKind::ConfigMap => Color::Yellow.normal(),
        ResourceKind::Deployment => Color::Blue.bold(),
        ResourceKind::HorizontalPodAutoscaler => Color::Green.bold(),
        ResourceKind::Secret => Color::Red.bold(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_palette_returns_plain_text() {
        let palette = Palette::new(false);
        assert_eq!(palette.kind(ResourceKind::Secret, "Secret/tls"), "Secret/tls");
        assert_eq!(palette.heading("Map"), "Map");
    }

    #[test]
    fn test_enabled_palette_wraps_token() {
        let palette = Palette::new(true);
        let painted = palette.kind(ResourceKind::Pod, "Pod/web-1");
        assert!(painted.starts_with("\u{1b}["));
        assert!(painted.contains("Pod/web-1"));
        assert!(painted.ends_with("\u{1b}[0m"));
    }
}
