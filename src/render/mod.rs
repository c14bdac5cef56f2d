//! Map renderers.
//!
//! Both strategies consume the same campus + impact zone and are pure
//! functions of their inputs.

mod glyphs;
mod interactive;
mod static_map;

pub use interactive::{CircleLayer, InteractiveRenderer, LeafletMap, MarkerLayer};
pub use static_map::StaticRenderer;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{Campus, ImpactZone};

/// Which renderer produced (or should produce) a map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    /// Leaflet tile map (HTML)
    Interactive,
    /// Raster figure (PNG)
    Static,
}

impl std::fmt::Display for RendererKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RendererKind::Interactive => write!(f, "interactive"),
            RendererKind::Static => write!(f, "static"),
        }
    }
}

/// Serialized renderer output
#[derive(Debug, Clone, PartialEq)]
pub enum RenderedMap {
    Html(String),
    Png(Vec<u8>),
}

impl RenderedMap {
    pub fn mime(&self) -> &'static str {
        match self {
            RenderedMap::Html(_) => "text/html",
            RenderedMap::Png(_) => "image/png",
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            RenderedMap::Html(html) => html.into_bytes(),
            RenderedMap::Png(bytes) => bytes,
        }
    }
}

/// A map rendering strategy
pub trait Renderer {
    fn kind(&self) -> RendererKind;

    fn render(&self, campus: &Campus, zone: &ImpactZone) -> Result<RenderedMap>;
}

/// Escape text for HTML element and attribute content
pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"St. Mary's <K-8> & "Annex""#),
            "St. Mary&#39;s &lt;K-8&gt; &amp; &quot;Annex&quot;"
        );
    }

    #[test]
    fn test_rendered_map_mime() {
        assert_eq!(RenderedMap::Html(String::new()).mime(), "text/html");
        assert_eq!(RenderedMap::Png(vec![]).mime(), "image/png");
    }
}
