//! End-to-end rendering with the built-in validator and engines.

use tracery::{
    DisplaySurface, EngineError, RenderPipeline, RenderReport, ViewportHandle,
    config::{AppConfig, FailurePolicy, RenderConfig},
    geometry::Size,
    source::{DiagramFormat, DiagramSource},
};

fn surface() -> DisplaySurface {
    DisplaySurface::new("main", Size::new(640.0, 480.0))
}

async fn render(pipeline: &RenderPipeline, text: &str, surface: &DisplaySurface) -> ViewportHandle {
    let source = DiagramSource::detect(text).unwrap();
    match pipeline.render_diagram(&source, surface).await.unwrap() {
        RenderReport::Rendered(viewport) => viewport,
        other => panic!("expected a rendered diagram, got {other:?}"),
    }
}

#[tokio::test]
async fn test_minimal_digraph() {
    let pipeline = RenderPipeline::new(AppConfig::default()).unwrap();
    let surface = surface();
    let viewport = render(&pipeline, "digraph { A -> B }", &surface).await;

    let markup = viewport.markup();
    assert_eq!(markup.matches("data-node=").count(), 2);
    assert!(markup.contains("data-node=\"A\""));
    assert!(markup.contains("data-node=\"B\""));
    assert_eq!(markup.matches("data-edge=").count(), 1);
    assert_eq!(markup.matches("<ellipse").count(), 2);
    assert_eq!(markup.matches("marker-end=").count(), 1);
    assert!(viewport.state().is_fit());
}

#[tokio::test]
async fn test_rerender_resets_viewport() {
    let pipeline = RenderPipeline::new(AppConfig::default()).unwrap();
    let surface = surface();

    let first = render(&pipeline, "flowchart LR\n  a --> b", &surface).await;
    first.zoom_in();
    first.zoom_in();
    first.pan_by(30.0, 10.0);
    assert!(!first.state().is_fit());

    let second = render(&pipeline, "flowchart LR\n  a --> b --> c", &surface).await;
    assert!(second.state().is_fit());
    assert!(!first.is_active());
    assert!(second.is_active());
    assert!(surface.markup().unwrap().contains("data-node=\"c\""));
}

#[tokio::test]
async fn test_flowchart_max_width_is_stripped() {
    let pipeline = RenderPipeline::new(AppConfig::default()).unwrap();
    let surface = surface();
    let source = DiagramSource::new("flowchart TD\n  a --> b", DiagramFormat::Flowchart).unwrap();

    let attempt = pipeline.request(&source, "chart-1").await.unwrap();
    assert!(attempt.markup().unwrap().contains("max-width"));

    let viewport = render(&pipeline, "flowchart TD\n  a --> b", &surface).await;
    assert!(!viewport.markup().contains("max-width"));
    assert!(viewport.markup().contains("id=\"tracery-main-"));
}

#[tokio::test]
async fn test_invalid_source_is_rejected() {
    let pipeline = RenderPipeline::new(AppConfig::default()).unwrap();
    let surface = surface();
    let source = DiagramSource::new("digraph { A -> }", DiagramFormat::DirectedGraph).unwrap();

    let report = pipeline.render_diagram(&source, &surface).await.unwrap();
    assert!(matches!(report, RenderReport::Rejected));
    assert!(surface.viewport().is_none());
    assert_eq!(pipeline.live_engine(DiagramFormat::DirectedGraph), None);
}

#[tokio::test]
async fn test_placeholder_policy() {
    let config = AppConfig::default().with_render(RenderConfig::new(
        1,
        10,
        FailurePolicy::Placeholder,
    ));
    let pipeline = RenderPipeline::new(config).unwrap();
    let surface = surface();
    let source = DiagramSource::detect("digraph { A -> B }").unwrap();

    let report = pipeline.render_diagram(&source, &surface).await.unwrap();
    assert!(matches!(
        report,
        RenderReport::Failed(EngineError::TooLarge { what: "nodes", .. })
    ));
    let markup = surface.markup().unwrap();
    assert!(markup.contains("data-placeholder=\"true\""));
    assert!(markup.contains("Unable to render diagram"));
    assert_eq!(pipeline.live_engine(DiagramFormat::DirectedGraph), None);
}

#[tokio::test]
async fn test_silent_policy_leaves_surface_empty() {
    let config =
        AppConfig::default().with_render(RenderConfig::new(1, 10, FailurePolicy::Silent));
    let pipeline = RenderPipeline::new(config).unwrap();
    let surface = surface();
    let source = DiagramSource::detect("digraph { A -> B }").unwrap();

    let report = pipeline.render_diagram(&source, &surface).await.unwrap();
    assert!(matches!(report, RenderReport::Failed(_)));
    assert!(surface.markup().is_none());
}
