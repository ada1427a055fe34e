use defi_canvas::graph::WorkflowGraph;
use defi_canvas::model::{Difficulty, WorkflowTemplate};
use serde_json::json;
use defi_canvas::registry::NodeTypeRegistry;
use defi_canvas::{list_nodes, schema, templates, validate, visualize};

// ── Presets ─────────────────────────────────────────────────────────

#[test]
fn test_every_preset_validates_and_loads() {
    let presets = templates::presets();
    assert_eq!(presets.len(), 4);
    for preset in presets {
        validate::validate(&preset).unwrap_or_else(|e| panic!("{} invalid: {e:?}", preset.name));
        let graph = WorkflowGraph::from_template(&preset).unwrap();
        assert_eq!(graph.nodes().len(), preset.nodes.len());
        assert_eq!(graph.edges().len(), preset.edges.len());
        assert!(!graph.has_cycle(), "{} has a cycle", preset.name);
        assert!(validate::unknown_types(&preset, &NodeTypeRegistry::builtin()).is_empty());
    }
}

#[test]
fn test_preset_json_round_trip() {
    for preset in templates::presets() {
        let json = serde_json::to_string_pretty(&preset).unwrap();
        let parsed = WorkflowTemplate::from_json(&json).unwrap();
        assert_eq!(parsed, preset);
    }
}

#[test]
fn test_difficulty_labels_are_lenient() {
    let read = |label: serde_json::Value| {
        let template = json!({"name": "t", "difficulty": label, "nodes": [], "edges": []});
        serde_json::from_value::<WorkflowTemplate>(template).unwrap().difficulty
    };
    assert_eq!(read(json!("Beginner")), Difficulty::Beginner);
    assert_eq!(read(json!("medium")), Difficulty::Intermediate);
    assert_eq!(read(json!("expert")), Difficulty::Advanced);
    assert_eq!(read(json!(" HARD ")), Difficulty::Advanced);
    assert_eq!(read(json!("legendary")), Difficulty::Beginner);
    assert_eq!(read(json!(null)), Difficulty::Beginner);

    let out = serde_json::to_value(Difficulty::Advanced).unwrap();
    assert_eq!(out, "advanced");
}

#[test]
fn test_find_is_case_insensitive() {
    let t = templates::find("BUY THE DIP").unwrap();
    assert_eq!(t.name, "Buy the Dip");
    assert!(templates::find("no such thing").is_none());
}

#[test]
fn test_ai_trading_shape() {
    let t = templates::find("AI Trading Pipeline").unwrap();
    assert_eq!(t.nodes.len(), 7);
    assert_eq!(t.edges.len(), 6);
    assert_eq!(t.category, "trading");
}

// ── Rendering ───────────────────────────────────────────────────────

#[test]
fn test_ascii_layers_follow_edges() {
    let t = templates::find("Price Alert").unwrap();
    let out = visualize::render_ascii(&t);
    assert!(out.contains("Workflow: Price Alert"));
    assert!(out.contains("Layer 0: [price:"));
    assert!(out.contains("Layer 2: [alert:"));
    assert!(out.contains("price.price"));
    assert!(out.contains("3 nodes, 2 edges"));
    assert!(!out.contains("Cycle:"));
}

#[test]
fn test_ascii_reports_cycles() {
    let mut t = templates::find("Price Alert").unwrap();
    // alert has no outputs, so loop the condition back onto itself.
    let mut back = t.edges[0].clone();
    back.id = "loop".into();
    back.source = "above".into();
    back.source_handle = "false".into();
    back.target = "above".into();
    t.edges.push(back);

    let out = visualize::render_ascii(&t);
    assert!(out.contains("Cycle:"));
    assert!(out.contains("[above:"));
}

#[test]
fn test_dot_output() {
    let t = templates::find("Yield Rebalancer").unwrap();
    let dot = visualize::render_dot(&t);
    assert!(dot.starts_with("digraph workflow {"));
    assert!(dot.contains("\"optimizer\""));
    assert!(dot.contains("\"price\" -> \"calm\""));
    assert!(dot.trim_end().ends_with('}'));
}

// ── Schema & listing ────────────────────────────────────────────────

#[test]
fn test_schema_describes_template() {
    let json: serde_json::Value = serde_json::from_str(&schema::get_schema_json()).unwrap();
    let props = &json["properties"];
    assert!(props.get("nodes").is_some());
    assert!(props.get("edges").is_some());
    assert!(props.get("name").is_some());
}

#[test]
fn test_listing_names_every_type() {
    let registry = NodeTypeRegistry::builtin();
    let text = list_nodes::listing(&registry);
    for d in registry.descriptors() {
        assert!(text.contains(&d.node_type), "missing {}", d.node_type);
    }
    assert!(text.contains("price: number"));
}
