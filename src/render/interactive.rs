//! Leaflet tile map rendering.

use serde::Serialize;

use super::{escape_html, RenderedMap, Renderer, RendererKind};
use crate::config::InteractiveConfig;
use crate::error::Result;
use crate::models::{Campus, ImpactZone};

const LEAFLET_CSS: &str = "https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.4/leaflet.css";
const LEAFLET_JS: &str = "https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.4/leaflet.js";
const FONT_AWESOME_CSS: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.5.1/css/all.min.css";
const AWESOME_MARKERS_CSS: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/Leaflet.awesome-markers/2.0.2/leaflet.awesome-markers.css";
const AWESOME_MARKERS_JS: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/Leaflet.awesome-markers/2.0.2/leaflet.awesome-markers.js";

/// Filled circle overlay (radius in meters)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CircleLayer {
    #[serde(skip)]
    pub center: [f64; 2],
    pub radius: f64,
    pub color: String,
    pub fill: bool,
    pub fill_color: String,
    pub fill_opacity: f64,
}

/// Point marker with a Font Awesome icon and tooltip
#[derive(Debug, Clone)]
pub struct MarkerLayer {
    pub position: [f64; 2],
    pub tooltip: String,
    pub icon: String,
    pub marker_color: String,
}

/// Renderable Leaflet map: center, zoom, base tiles and overlays
#[derive(Debug, Clone)]
pub struct LeafletMap {
    pub title: String,
    /// [lat, lon]
    pub center: [f64; 2],
    pub zoom: u8,
    pub tile_url: String,
    pub attribution: String,
    pub circle: CircleLayer,
    pub marker: MarkerLayer,
}

impl LeafletMap {
    /// Serialize to a standalone HTML document
    pub fn to_html(&self) -> String {
        let circle_options =
            serde_json::to_string(&self.circle).unwrap_or_else(|_| "{}".to_string());

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{title}</title>
  <link rel="stylesheet" href="{leaflet_css}" />
  <link rel="stylesheet" href="{fa_css}" />
  <link rel="stylesheet" href="{am_css}" />
  <script src="{leaflet_js}"></script>
  <script src="{am_js}"></script>
  <style>
    html, body {{ width: 100%; height: 100%; margin: 0; padding: 0; }}
    #map {{ position: absolute; top: 0; bottom: 0; right: 0; left: 0; }}
  </style>
</head>
<body>
  <div id="map"></div>
  <script>
    var map = L.map("map", {{ center: {center}, zoom: {zoom} }});
    L.tileLayer({tile_url}, {{
      attribution: {attribution},
      subdomains: "abcd",
      maxZoom: 20
    }}).addTo(map);
    L.circle({circle_center}, {circle_options}).addTo(map);
    var icon = L.AwesomeMarkers.icon({{
      icon: {icon},
      prefix: "fa",
      markerColor: {marker_color},
      iconColor: "white"
    }});
    L.marker({marker_position}, {{ icon: icon }})
      .bindTooltip({tooltip}, {{ sticky: true }})
      .addTo(map);
  </script>
</body>
</html>
"#,
            title = escape_html(&self.title),
            leaflet_css = LEAFLET_CSS,
            leaflet_js = LEAFLET_JS,
            fa_css = FONT_AWESOME_CSS,
            am_css = AWESOME_MARKERS_CSS,
            am_js = AWESOME_MARKERS_JS,
            center = js_coord(self.center),
            zoom = self.zoom,
            tile_url = js_string(&self.tile_url),
            attribution = js_string(&self.attribution),
            circle_center = js_coord(self.circle.center),
            circle_options = script_safe(circle_options),
            icon = js_string(&self.marker.icon),
            marker_color = js_string(&self.marker.marker_color),
            marker_position = js_coord(self.marker.position),
            tooltip = js_string(&self.marker.tooltip),
        )
    }
}

/// JSON string literal that cannot close the surrounding <script> element
fn js_string(value: &str) -> String {
    script_safe(serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string()))
}

fn script_safe(json: String) -> String {
    json.replace("</", "<\\/")
}

fn js_coord(c: [f64; 2]) -> String {
    format!("[{}, {}]", c[0], c[1])
}

/// Renders the impact zone as a red circle on CARTO Positron tiles
#[derive(Debug, Clone, Default)]
pub struct InteractiveRenderer {
    config: InteractiveConfig,
}

impl InteractiveRenderer {
    pub fn new(config: InteractiveConfig) -> Self {
        Self { config }
    }

    /// Build the map object for a campus
    pub fn build_map(&self, campus: &Campus, zone: &ImpactZone) -> LeafletMap {
        let center = [zone.center.y(), zone.center.x()];

        LeafletMap {
            title: format!("{} - Construction Impact Map", campus.label),
            center,
            zoom: self.config.zoom,
            tile_url: self.config.tile_url.clone(),
            attribution: self.config.attribution.clone(),
            circle: CircleLayer {
                center,
                radius: zone.radius.meters(),
                color: "darkred".to_string(),
                fill: true,
                fill_color: "red".to_string(),
                fill_opacity: 0.4,
            },
            marker: MarkerLayer {
                position: center,
                tooltip: "Entrance".to_string(),
                icon: "star".to_string(),
                marker_color: "red".to_string(),
            },
        }
    }
}

impl Renderer for InteractiveRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Interactive
    }

    fn render(&self, campus: &Campus, zone: &ImpactZone) -> Result<RenderedMap> {
        Ok(RenderedMap::Html(self.build_map(campus, zone).to_html()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GeometryBuilder;

    fn render(label: &str) -> (LeafletMap, String) {
        let campus = Campus::new(label, -118.25, 34.05);
        let zone = GeometryBuilder::default().build(campus.lon, campus.lat, 300.0).unwrap();
        let renderer = InteractiveRenderer::default();
        let map = renderer.build_map(&campus, &zone);
        let html = match renderer.render(&campus, &zone).unwrap() {
            RenderedMap::Html(html) => html,
            other => panic!("expected HTML, got {:?}", other),
        };
        (map, html)
    }

    #[test]
    fn test_map_object() {
        let (map, _) = render("Lincoln High School");
        assert_eq!(map.center, [34.05, -118.25]);
        assert_eq!(map.zoom, 16);
        assert_eq!(map.circle.radius, 300.0);
        assert_eq!(map.circle.fill_opacity, 0.4);
        assert_eq!(map.marker.tooltip, "Entrance");
    }

    #[test]
    fn test_html_contents() {
        let (_, html) = render("Lincoln High School");
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Lincoln High School - Construction Impact Map</title>"));
        assert!(html.contains("leaflet.js"));
        assert!(html.contains("L.circle([34.05, -118.25]"));
        assert!(html.contains(r#""radius":300.0"#));
        assert!(html.contains(r#""fillColor":"red""#));
        assert!(html.contains(r#""color":"darkred""#));
        assert!(html.contains(r#"bindTooltip("Entrance""#));
        assert!(html.contains("light_all"));
    }

    #[test]
    fn test_label_is_escaped() {
        let (_, html) = render("<script>alert(1)</script>");
        assert!(!html.contains("<script>alert(1)"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    }

    #[test]
    fn test_js_string_cannot_close_script() {
        assert_eq!(js_string("a</script>b"), r#""a<\/script>b""#);
        assert_eq!(js_string("say \"hi\""), r#""say \"hi\"""#);
    }
}
