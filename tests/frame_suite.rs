use std::path::Path;

use moviegraph::config::Config;
use moviegraph::dataset::GraphData;
use moviegraph::graph::GraphNode;
use moviegraph::label::resolve_labels;
use moviegraph::physics::Simulation;
use moviegraph::pipeline::FramePipeline;
use moviegraph::render::render_svg;
use moviegraph::text_metrics::CharTableMeasurer;
use moviegraph::theme::Theme;

fn fixture_path() -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("movies.json")
}

fn node(id: &str, title: &str, x: f32, y: f32, size: f32) -> GraphNode {
    GraphNode {
        id: id.to_string(),
        title: title.to_string(),
        year: None,
        popularity: 0.0,
        size,
        color: None,
        degree: 0,
        x,
        y,
        vx: 0.0,
        vy: 0.0,
    }
}

#[test]
fn fixture_dataset_loads_with_degrees() {
    let data = GraphData::load(&fixture_path()).expect("fixture load failed");
    assert_eq!(data.nodes.len(), 5);
    assert_eq!(data.links.len(), 4);
    let nodes = data.into_graph_nodes();
    let heat = nodes.iter().find(|n| n.id == "m1").unwrap();
    assert_eq!(heat.degree, 2);
    let ronin = nodes.iter().find(|n| n.id == "m2").unwrap();
    assert_eq!(ronin.degree, 1);
}

#[test]
fn zoomed_out_frame_paints_no_labels() {
    let nodes = vec![node("m1", "Heat", 0.0, 0.0, 30.0)];
    let config = Config::default();
    let mut measurer = CharTableMeasurer;
    let frame = resolve_labels(&nodes, &mut measurer, 1.0, &config);
    assert!(frame.visible_nodes.is_empty());
    assert!(frame.label_rects.is_empty());
    assert!(frame.forces.is_empty());
}

#[test]
fn crowded_pair_hides_both_labels_and_repels() {
    // Radius 10 each: size 40 at size_scale 0.5. Centers 5 apart, so
    // the labels below the circles overlap almost entirely.
    let mut config = Config::default();
    config.node.size_scale = 0.5;
    let nodes = vec![
        node("a", "Alpha", 0.0, 0.0, 40.0),
        node("b", "Beta", 5.0, 0.0, 40.0),
    ];
    let mut measurer = CharTableMeasurer;
    let frame = resolve_labels(&nodes, &mut measurer, 2.0, &config);
    assert!(frame.visible_nodes.is_empty());
    assert!(frame.label_collisions >= 2);
    let (fx_a, _) = frame.forces.impulse("a").expect("impulse on a");
    let (fx_b, _) = frame.forces.impulse("b").expect("impulse on b");
    assert!(fx_a < 0.0, "left node pushed left, got {fx_a}");
    assert!(fx_b > 0.0, "right node pushed right, got {fx_b}");
}

#[test]
fn well_separated_labels_all_stay_visible() {
    let nodes = vec![
        node("a", "Alpha", 0.0, 0.0, 20.0),
        node("b", "Beta", 500.0, 0.0, 20.0),
        node("c", "Gamma", 0.0, 500.0, 20.0),
    ];
    let config = Config::default();
    let mut measurer = CharTableMeasurer;
    let frame = resolve_labels(&nodes, &mut measurer, 2.0, &config);
    assert_eq!(frame.visible_nodes.len(), 3);
    assert_eq!(frame.node_collisions, 0);
    assert_eq!(frame.label_collisions, 0);
    assert!(frame.forces.is_empty());
}

#[test]
fn resolution_is_deterministic() {
    let nodes = vec![
        node("a", "The Quick Brown Fox", 0.0, 0.0, 30.0),
        node("b", "Jumps Over", 15.0, 5.0, 25.0),
        node("c", "The Lazy Dog", 400.0, 400.0, 20.0),
    ];
    let config = Config::default();
    let mut measurer = CharTableMeasurer;
    let first = resolve_labels(&nodes, &mut measurer, 2.0, &config);
    let second = resolve_labels(&nodes, &mut measurer, 2.0, &config);
    assert_eq!(first.visible_nodes, second.visible_nodes);
    assert_eq!(first.label_collisions, second.label_collisions);
    assert_eq!(first.node_collisions, second.node_collisions);
}

#[test]
fn repulsion_settles_a_crowded_cluster() {
    // Start everything stacked near the origin; after enough frames of
    // label repulsion plus physics the cluster spreads out and at
    // least one label becomes paintable.
    let data = GraphData::load(&fixture_path()).expect("fixture load failed");
    let links = data.links.clone();
    let nodes = data.into_graph_nodes();
    let config = Config::default();
    let mut pipeline = FramePipeline::inline(config.clone());
    let mut sim = Simulation::new(nodes, &links, config.physics.clone());

    for _ in 0..200 {
        let forces = pipeline
            .on_frame(&sim.nodes, 2.0, 1200.0, 800.0)
            .forces
            .clone();
        sim.step(&forces);
    }
    let frame = pipeline.on_frame(&sim.nodes, 2.0, 1200.0, 800.0);
    assert!(
        !frame.visible_nodes.is_empty(),
        "no label settled into a clear spot"
    );
}

#[test]
fn worker_pipeline_matches_inline_after_settle() {
    let data = GraphData::load(&fixture_path()).expect("fixture load failed");
    let nodes = data.into_graph_nodes();
    let config = Config::default();

    let mut inline = FramePipeline::inline(config.clone());
    let inline_frame = inline.on_frame(&nodes, 2.0, 1200.0, 800.0).clone();

    let mut worker = FramePipeline::with_worker(config);
    worker.on_frame(&nodes, 2.0, 1200.0, 800.0);
    let worker_frame = worker.settle().clone();

    assert_eq!(inline_frame.visible_nodes, worker_frame.visible_nodes);
    assert_eq!(inline_frame.label_rects.len(), worker_frame.label_rects.len());
    assert_eq!(inline_frame.node_collisions, worker_frame.node_collisions);
    assert_eq!(inline_frame.label_collisions, worker_frame.label_collisions);
}

#[test]
fn end_to_end_svg_render() {
    let data = GraphData::load(&fixture_path()).expect("fixture load failed");
    let links = data.links.clone();
    let nodes = data.into_graph_nodes();
    let config = Config::default();
    let theme = Theme::dark();
    let mut pipeline = FramePipeline::inline(config.clone());
    let mut sim = Simulation::new(nodes, &links, config.physics.clone());

    for _ in 0..100 {
        let forces = pipeline
            .on_frame(&sim.nodes, 2.0, 1200.0, 800.0)
            .forces
            .clone();
        sim.step(&forces);
    }
    let frame = pipeline.on_frame(&sim.nodes, 2.0, 1200.0, 800.0).clone();
    let svg = render_svg(&sim.nodes, &sim.link_endpoints(), &frame, 2.0, &theme, &config, false);
    assert!(svg.contains("<svg"));
    assert!(svg.contains("</svg>"));
    assert_eq!(svg.matches("<circle").count(), 5);
    assert_eq!(svg.matches("<line").count(), 4);
}
