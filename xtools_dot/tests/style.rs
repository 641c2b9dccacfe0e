use std::fs;
use xtools_dot::*;

const GRAPH: &str = r#"digraph fsm {
    node [shape=circle];
    s0 [label="idle", initial=true];
    s1 [label="busy"];
    s0 -> s1 [label="req"];
    s1 -> s0 [label="ack", lost="1"];
}"#;

const STYLE: &str = r#"{
    "layout": { "object": "graph", "updates": { "rankdir": "LR" } },
    "initial": { "object": "node", "condition": { "initial": "t" }, "updates": { "shape": "doublecircle" } },
    "names": { "object": "node", "updates": { "xlabel": "%label% (%id%)" } },
    "lost": { "object": "edge", "condition": { "lost": "1" }, "updates": { "style": "dashed" } }
}"#;

#[test]
fn style_file_then_command_line() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("style.json");
    fs::write(&path, STYLE)?;

    let mut graph = parse(GRAPH)?;
    graph.apply_stylesheet(&Stylesheet::load(&path)?);

    let s0 = graph.node("s0").unwrap();
    assert_eq!(s0.attrs.get("shape"), Some(&Id::new("doublecircle")));
    assert_eq!(s0.attrs.get("xlabel"), Some(&Id::new("idle ()")));
    assert_eq!(graph.node("s1").unwrap().attrs.get("shape"), None);

    // command-line passes see the style file's results
    let args: Vec<String> = ["shape=doublecircle", "color=green"]
        .into_iter()
        .map(String::from)
        .collect();
    graph.rewrite_nodes(&[Rule::from_args(&args)?]);
    let args: Vec<String> = ["style=dashed&&label='a.*'", "color=gray"]
        .into_iter()
        .map(String::from)
        .collect();
    graph.rewrite_edges(&[Rule::from_args(&args)?]);

    let output = graph.to_string();
    assert!(output.contains("\tgraph [rankdir=LR];\n"));
    assert!(output.contains(
        "\ts0 [label=idle, initial=true, shape=doublecircle, xlabel=\"idle ()\", color=green];\n"
    ));
    assert!(output.contains("\ts1 [label=busy, xlabel=\"busy ()\"];\n"));
    assert!(output.contains("\ts0 -> s1 [label=req];\n"));
    assert!(output.contains("\ts1 -> s0 [label=ack, lost=1, style=dashed, color=gray];\n"));

    let again = parse(&output)?;
    assert_eq!(again.nodes, graph.nodes);
    assert_eq!(again.edges, graph.edges);
    Ok(())
}

#[test]
fn missing_style_file() {
    assert!(matches!(
        Stylesheet::load(std::path::Path::new("/nonexistent/style.json")),
        Err(RuleError::Json(_))
    ));
}

#[test]
fn style_file_sees_node_defaults() -> Result<(), Box<dyn std::error::Error>> {
    let specs = serde_json::from_str(
        r#"{ "round": { "object": "node", "condition": { "shape": "circ" }, "updates": { "tooltip": "%label% is a %shape%" } } }"#,
    )?;
    let mut graph = parse(GRAPH)?;
    graph.apply_stylesheet(&Stylesheet::from_specs(specs)?);

    let s1 = graph.node("s1").unwrap();
    assert_eq!(s1.attrs.get("tooltip"), Some(&Id::new("busy is a circle")));
    assert_eq!(s1.attrs.get("shape"), None);
    assert!(graph.to_string().contains("\tnode [shape=circle];\n"));
    Ok(())
}
