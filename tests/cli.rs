use clap::Parser;
use std::fs;
use xtools::*;

#[test]
fn dot2dot_rule_groups() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let graph = dir.path().join("lts.dot");
    let output = dir.path().join("out.dot");
    fs::write(
        &graph,
        "digraph lts { s0 [label=init]; s1; s0 -> s1 [label=a]; s1 -> s1 [label=tau] }",
    )?;

    let cli = DotCli::try_parse_from([
        "dot2dot",
        graph.to_str().unwrap(),
        "-g",
        "rankdir=LR",
        "-n",
        "label=init",
        "shape=box",
        "xlabel=%label%!",
        "-n",
        "''",
        "color=gray",
        "-e",
        "label='tau'",
        "style=dotted",
        "-o",
        output.to_str().unwrap(),
    ])?;
    assert_eq!(cli.graph_rules, vec![vec!["rankdir=LR".to_owned()]]);
    assert_eq!(cli.nodes.len(), 2);
    cli.run()?;

    assert_eq!(
        fs::read_to_string(&output)?,
        "digraph lts {
\tgraph [rankdir=LR];
\ts0 [label=init, shape=box, xlabel=\"init!\", color=gray];
\ts1 [color=gray];
\ts0 -> s1 [label=a];
\ts1 -> s1 [label=tau, style=dotted];
}
"
    );
    Ok(())
}

#[test]
fn dot2dot_rejects_spaces() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let graph = dir.path().join("g.dot");
    fs::write(&graph, "graph { a }")?;
    let cli = DotCli::try_parse_from([
        "dot2dot",
        graph.to_str().unwrap(),
        "-n",
        "label=a b",
        "color=red",
    ])?;
    let err = cli.run().unwrap_err();
    assert!(format!("{err:#}").contains("space outside quotes"));
    Ok(())
}

#[test]
fn make_table_merges_results() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let first = dir.path().join("first.json");
    let second = dir.path().join("second.json");
    let table = dir.path().join("table.json");
    let output = dir.path().join("table.csv");
    fs::write(
        &first,
        r#"{"name": "first", "stats": {"m 1": {"p": {"status": "success", "N": "1500"}}}}"#,
    )?;
    fs::write(
        &second,
        r#"{"name": "second", "stats": {"m 1": {"q": {"status": "timeout"}}, "m 2": {"p": {"status": "success"}}}}"#,
    )?;
    fs::write(
        &table,
        r#"{"columns": {"p": {"n": {"readable": {"value": {"name": "N", "type": "int"}}}}, "q": {"n": {"value": {"name": "N"}}}}}"#,
    )?;

    let cli = TableCli::try_parse_from([
        "make_table",
        first.to_str().unwrap(),
        second.to_str().unwrap(),
        "-t",
        table.to_str().unwrap(),
        "-i",
        "--format",
        "csv",
        "-o",
        output.to_str().unwrap(),
    ])?;
    assert_eq!(cli.format, Format::Csv);
    cli.run()?;
    assert_eq!(
        fs::read_to_string(&output)?,
        "Models,p/n,q/n\nm 1,1.5 k,timeout\nm 2,--,missing\n"
    );

    // the same file twice holds the same runs twice
    let cli = TableCli::try_parse_from([
        "make_table",
        first.to_str().unwrap(),
        first.to_str().unwrap(),
        "-t",
        table.to_str().unwrap(),
    ])?;
    assert!(cli.run().is_err());
    Ok(())
}

#[test]
fn make_table_requires_results() {
    assert!(TableCli::try_parse_from(["make_table", "-t", "table.json"]).is_err());
}

#[cfg(unix)]
#[test]
fn run_benchmarks_to_file() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let spec = dir.path().join("bench.json");
    let output = dir.path().join("results.json");
    fs::write(
        &spec,
        r#"{
            "name": "echo",
            "timeout": 5,
            "models": { "m": { "cmd": "echo", "args": ["model"], "matrix": [["1", "2"]] } },
            "programs": { "count": { "cmd": "sh", "args": ["-c", "echo SIZE $(wc -c)"], "stats": ["SIZE"] } }
        }"#,
    )?;
    let cli = BenchCli::try_parse_from([
        "run_benchmarks",
        spec.to_str().unwrap(),
        "--quiet",
        "--pretty",
        "-o",
        output.to_str().unwrap(),
    ])?;
    cli.run()?;

    let results: serde_json::Value = serde_json::from_str(&fs::read_to_string(&output)?)?;
    assert_eq!(results["name"], "echo");
    assert_eq!(results["stats"]["m 1"]["count"]["status"], "success");
    assert_eq!(results["stats"]["m 2"]["count"]["SIZE"], "8");
    Ok(())
}
