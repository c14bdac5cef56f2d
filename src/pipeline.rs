//! Single map pipeline: resolve, buffer, render, export.

use tracing::info;

use crate::error::Result;
use crate::export::Artifact;
use crate::geometry::GeometryBuilder;
use crate::models::{Campus, CampusTable, ImpactZone, Radius};
use crate::render::Renderer;
use crate::resolve::resolve_one;

/// Campus and zone ready for rendering
#[derive(Debug, Clone)]
pub struct PreparedZone<'a> {
    pub campus: &'a Campus,
    pub zone: ImpactZone,
}

/// Everything produced for one map request
#[derive(Debug, Clone)]
pub struct MapOutput {
    pub campus: Campus,
    pub zone: ImpactZone,
    pub artifact: Artifact,
}

/// Runs selections against an injected, read-only campus table
pub struct ImpactMapPipeline<'a> {
    table: &'a CampusTable,
    builder: GeometryBuilder,
}

impl<'a> ImpactMapPipeline<'a> {
    pub fn new(table: &'a CampusTable, builder: GeometryBuilder) -> Self {
        Self { table, builder }
    }

    /// Resolve the label and buffer its entrance
    pub fn prepare(&self, label: &str, radius: Radius) -> Result<PreparedZone<'a>> {
        let campus = resolve_one(self.table, label)?;
        let zone = self.builder.build_for(campus, radius)?;
        Ok(PreparedZone { campus, zone })
    }

    /// Full pipeline for one renderer
    pub fn run(&self, renderer: &dyn Renderer, label: &str, radius: Radius) -> Result<MapOutput> {
        let PreparedZone { campus, zone } = self.prepare(label, radius)?;
        let rendered = renderer.render(campus, &zone)?;
        let artifact = Artifact::from_rendered(&campus.label, renderer.kind(), rendered);

        info!(
            "Rendered {} map for '{}' ({}): {}",
            renderer.kind(),
            campus.label,
            radius,
            artifact.file_name
        );

        Ok(MapOutput {
            campus: campus.clone(),
            zone,
            artifact,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MapError;
    use crate::export::{export_optional_png, HeadlessBrowser, OptionalExport};
    use crate::render::{InteractiveRenderer, StaticRenderer};

    fn table() -> CampusTable {
        vec![
            Campus::new("X", -118.25, 34.05),
            Campus::new("Lincoln High School", -118.2082, 34.0795),
        ]
        .into_iter()
        .collect()
    }

    fn radius(m: f64) -> Radius {
        Radius::new(m).unwrap()
    }

    #[test]
    fn test_prepare() {
        let t = table();
        let pipeline = ImpactMapPipeline::new(&t, GeometryBuilder::default());
        let prepared = pipeline.prepare("X", radius(300.0)).unwrap();
        assert_eq!(prepared.campus.label, "X");
        assert!(prepared.zone.contains_center());
    }

    #[test]
    fn test_interactive_run() {
        let t = table();
        let pipeline = ImpactMapPipeline::new(&t, GeometryBuilder::default());
        let output = pipeline
            .run(&InteractiveRenderer::default(), "Lincoln High School", radius(300.0))
            .unwrap();
        assert_eq!(output.artifact.file_name, "Lincoln_High_School.html");
        assert_eq!(output.artifact.mime, "text/html");
        assert_eq!(output.campus.lon, -118.2082);
    }

    #[test]
    fn test_static_run() {
        let t = table();
        let pipeline = ImpactMapPipeline::new(&t, GeometryBuilder::default());
        let output = pipeline
            .run(&StaticRenderer::default(), "Lincoln High School", radius(500.0))
            .unwrap();
        assert_eq!(output.artifact.file_name, "Lincoln_High_School_impact_map.png");
        assert_eq!(output.artifact.mime, "image/png");
        assert!(output.artifact.bytes.starts_with(b"\x89PNG"));
    }

    #[test]
    fn test_unknown_label() {
        let t = table();
        let pipeline = ImpactMapPipeline::new(&t, GeometryBuilder::default());
        let err = pipeline
            .run(&InteractiveRenderer::default(), "Y", radius(300.0))
            .unwrap_err();
        assert!(matches!(err, MapError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_missing_browser_keeps_primary_export() {
        let t = table();
        let pipeline = ImpactMapPipeline::new(&t, GeometryBuilder::default());
        let output = pipeline
            .run(&InteractiveRenderer::default(), "X", radius(300.0))
            .unwrap();
        let html = String::from_utf8(output.artifact.bytes.clone()).unwrap();

        let browser = HeadlessBrowser::new(Some("/nonexistent/chromium".into()));
        let optional = export_optional_png(&browser, &output.campus.label, &html).await;
        assert!(matches!(optional, OptionalExport::Skipped(_)));

        let dir = tempfile::tempdir().unwrap();
        let path = output.artifact.write_to(dir.path()).unwrap();
        assert!(path.ends_with("X.html"));
    }
}
