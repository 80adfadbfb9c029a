use std::fs;
use std::io::Write;
use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use flate2::write::GzEncoder;
use flate2::Compression;
use predicates::prelude::*;
use tempfile::{tempdir, TempDir};

const NODES: &str = r#"[
    {"id": "A", "x": 0.0, "y": 0.0, "peligrosidad": 0.2},
    {"id": "B", "x": 1.0, "y": 0.0},
    {"id": "C", "x": 2.0, "y": 0.0},
    {"id": "D", "x": 3.0, "y": 1.0}
]"#;

const EDGES: &str = r#"[
    {"origen": "A", "destino": "B", "costo_total": 5, "tiempo": 2, "distancia": 100},
    {"origen": "B", "destino": "C", "costo_total": 5, "tiempo": 2, "distancia": 100},
    {"origen": "A", "destino": "C", "costo_total": 20, "tiempo": 1, "distancia": 150}
]"#;

fn gzip(text: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(text.as_bytes()).expect("compress fixture");
    encoder.finish().expect("finish gzip stream")
}

fn write_fixture(dir: &Path, nodes: &str, edges: &str) {
    fs::write(dir.join("nodos.json.gz"), gzip(nodes)).expect("write nodes fixture");
    fs::write(dir.join("aristas.json.gz"), gzip(edges)).expect("write edges fixture");
}

fn prepare_command() -> (Command, TempDir) {
    let temp_dir = tempdir().expect("create temp dir");
    write_fixture(temp_dir.path(), NODES, EDGES);

    let mut cmd = cargo_bin_cmd!("dryroutes");
    cmd.env("RUST_LOG", "error")
        .env("NO_COLOR", "1")
        .env_remove("DRYROUTES_NODES_SOURCE")
        .env_remove("DRYROUTES_EDGES_SOURCE")
        .arg("--nodes")
        .arg(temp_dir.path().join("nodos.json.gz"))
        .arg("--edges")
        .arg(temp_dir.path().join("aristas.json.gz"));
    (cmd, temp_dir)
}

#[test]
fn default_criterion_prefers_cheap_route() {
    let (mut cmd, _temp) = prepare_command();
    cmd.args(["route", "--from", "A", "--to", "C"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("2 hops, criterion: costo_total"))
        .stdout(predicate::str::contains("Total distance: 200.0 m"))
        .stdout(predicate::str::contains("Estimated time: 4.0 min"));
}

#[test]
fn tiempo_criterion_prefers_fast_route() {
    let (mut cmd, _temp) = prepare_command();
    cmd.args(["route", "--from", "A", "--to", "C", "--criterion", "tiempo"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("1 hop, criterion: tiempo"))
        .stdout(predicate::str::contains("Total distance: 150.0 m"));
}

#[test]
fn json_format_lists_path() {
    let (mut cmd, _temp) = prepare_command();
    cmd.args(["--format", "json", "route", "--from", "A", "--to", "C"]);

    let output = cmd.assert().success().get_output().stdout.clone();
    let value: serde_json::Value = serde_json::from_slice(&output).expect("valid json");

    assert_eq!(value["status"], "found");
    let ids: Vec<&str> = value["steps"]
        .as_array()
        .expect("steps array")
        .iter()
        .map(|step| step["id"].as_str().expect("string id"))
        .collect();
    assert_eq!(ids, ["A", "B", "C"]);
    assert_eq!(value["total_weight"], 10.0);
}

#[test]
fn unreachable_target_is_not_an_error() {
    let (mut cmd, _temp) = prepare_command();
    cmd.args(["--format", "basic", "route", "--from", "A", "--to", "D"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("No route from A to D"))
        .stdout(predicate::str::contains("Destination D at (1, 3)"));
}

#[test]
fn unknown_node_fails() {
    let (mut cmd, _temp) = prepare_command();
    cmd.args(["route", "--from", "A", "--to", "Z"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unknown target node: Z"));
}

#[test]
fn unsupported_criterion_fails() {
    let (mut cmd, _temp) = prepare_command();
    cmd.args(["route", "--from", "A", "--to", "C"])
        .args(["--criterion", "distancia"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unsupported route criterion"))
        .stderr(predicate::str::contains("'distancia'"));
}

#[test]
fn info_reports_graph_size() {
    let (mut cmd, _temp) = prepare_command();
    cmd.arg("info");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("4 nodes and 3 edges."))
        .stdout(predicate::str::starts_with("Graph loaded with"));
}

#[test]
fn nodes_are_listed_in_id_order() {
    let (mut cmd, _temp) = prepare_command();
    cmd.args(["nodes", "--limit", "2"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with(
            "A (0, 0) peligrosidad=0.2\nB (0, 1)\n",
        ))
        .stdout(predicate::str::contains("... 2 more"));
}

#[test]
fn dangling_edge_aborts_load() {
    let temp_dir = tempdir().expect("create temp dir");
    write_fixture(
        temp_dir.path(),
        r#"[{"id": 1, "x": 0, "y": 0}]"#,
        r#"[{"origen": 1, "destino": 2, "costo_total": 1, "tiempo": 1, "distancia": 1}]"#,
    );

    let mut cmd = cargo_bin_cmd!("dryroutes");
    cmd.env("RUST_LOG", "error")
        .arg("--nodes")
        .arg(temp_dir.path().join("nodos.json.gz"))
        .arg("--edges")
        .arg(temp_dir.path().join("aristas.json.gz"))
        .arg("info");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("failed to load road graph"))
        .stderr(predicate::str::contains("references unknown node 2"));
}

#[test]
fn sources_can_come_from_environment() {
    let temp_dir = tempdir().expect("create temp dir");
    write_fixture(temp_dir.path(), NODES, EDGES);

    let nodes = temp_dir.path().join("nodos.json.gz");
    let edges = temp_dir.path().join("aristas.json.gz");

    let mut cmd = cargo_bin_cmd!("dryroutes");
    cmd.env("RUST_LOG", "error")
        .env("DRYROUTES_NODES_SOURCE", &nodes)
        .env("DRYROUTES_EDGES_SOURCE", &edges)
        .arg("info");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("4 nodes"));
}
