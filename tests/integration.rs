use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn clh_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("clh");
    path
}

const APA: &str = "\
ASSET PURCHASE AGREEMENT

This Agreement is dated as of March 5, 2019 between Acme Holdings, LLC (the \"Seller\")
and Big Buyer Inc. (the \"Buyer\").

1. DEFINITIONS. \"Closing\" means the consummation of the sale.
\"Material Adverse Effect\" means any event that harms the Business.
2. PURCHASE PRICE. The price is ten dollars.
2.1 Adjustment Amount
Any true-up is paid at Closing.
3. GOVERNING LAW. This Agreement shall be governed by the laws of the State of Delaware.
";

const WPC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<TEI xmlns="http://www.tei-c.org/ns/1.0">
  <text><body>
    <p ana="title-page">WHOLESALE POWER CONTRACT</p>
    <p xml:id="H_rate" toc_number="4.1" base="rate">Rate</p>
    <p>The Seller shall charge the rate set by the Board for electric power.</p>
  </body></text>
</TEI>"#;

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let files_dir = root.join("files");
    fs::create_dir_all(&files_dir).unwrap();
    fs::write(files_dir.join("apa.txt"), APA).unwrap();
    fs::write(files_dir.join("wpc.xml"), WPC).unwrap();
    fs::write(files_dir.join("notes.docx"), "not an agreement").unwrap();

    let config_content = format!(
        r#"[db]
path = "{root}/data/clh.sqlite"

[output]
dir = "{root}/processed"

[corpus]
root = "{root}/files"
"#,
        root = root.display()
    );

    let config_path = config_dir.join("clh.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_clh(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = clh_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run clh binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

fn file(tmp: &TempDir, name: &str) -> String {
    tmp.path()
        .join("files")
        .join(name)
        .to_string_lossy()
        .to_string()
}

#[test]
fn test_ingest_saves_documents() {
    let (tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_clh(
        &config_path,
        &["ingest", &file(&tmp, "apa.txt"), &file(&tmp, "wpc.xml"), "--stats"],
    );
    assert!(success, "ingest failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("documents: 2"));
    assert!(stdout.contains("\"total_documents\": 2"));

    let saved = tmp.path().join("processed/apa.json");
    let doc: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(saved).unwrap()).unwrap();
    assert_eq!(doc["metadata"]["jurisdiction"], "US-DE");
    assert_eq!(doc["sections"].as_array().unwrap().len(), 4);
    assert!(tmp.path().join("processed/wpc.json").exists());
}

#[test]
fn test_ingest_skips_bad_files() {
    let (tmp, config_path) = setup_test_env();

    let missing = tmp.path().join("files/missing.pdf");
    let (stdout, stderr, success) = run_clh(
        &config_path,
        &[
            "ingest",
            &file(&tmp, "notes.docx"),
            missing.to_str().unwrap(),
            &file(&tmp, "apa.txt"),
        ],
    );
    assert!(success, "ingest aborted: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("documents: 1"));
    assert!(stdout.contains("failed: 2"));
    assert!(stderr.contains("notes.docx"));
    assert!(stderr.contains("missing.pdf"));
}

#[test]
fn test_chunk_emits_jsonl() {
    let (tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_clh(&config_path, &["chunk", &file(&tmp, "apa.txt")]);
    assert!(success, "chunk failed: stdout={}, stderr={}", stdout, stderr);

    let chunks: Vec<serde_json::Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(chunks.len(), 6);
    assert_eq!(chunks[0]["metadata"]["chunk_id"], "apa_1_0");
    assert_eq!(chunks[0]["metadata"]["chunk_type"], "clause");
    assert_eq!(chunks[5]["metadata"]["chunk_type"], "definition");
    assert_eq!(chunks[5]["metadata"]["section_id"], "1");
}

#[test]
fn test_chunk_to_file() {
    let (tmp, config_path) = setup_test_env();
    let out = tmp.path().join("chunks.jsonl");

    let (_, stderr, success) = run_clh(
        &config_path,
        &["chunk", &file(&tmp, "wpc.xml"), "--output", out.to_str().unwrap()],
    );
    assert!(success, "chunk failed: {}", stderr);
    let content = fs::read_to_string(out).unwrap();
    assert_eq!(content.lines().count(), 1);
    assert!(content.contains("\"section_id\":\"4.1\""));
}

#[test]
fn test_init_idempotent() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success1) = run_clh(&config_path, &["init"]);
    assert!(success1, "First init failed");
    assert!(stdout.contains("initialized"));

    let (_, _, success2) = run_clh(&config_path, &["init"]);
    assert!(success2, "Second init failed (not idempotent)");
}

#[test]
fn test_index_twice_no_duplicates() {
    let (tmp, config_path) = setup_test_env();
    run_clh(&config_path, &["init"]);

    let (stdout1, stderr1, success1) = run_clh(&config_path, &["index", &file(&tmp, "apa.txt")]);
    assert!(success1, "index failed: {}", stderr1);
    assert!(stdout1.contains("chunks inserted: 6"));
    assert!(stdout1.contains("totals: 1 documents, 6 chunks"));

    let (stdout2, _, _) = run_clh(&config_path, &["index", &file(&tmp, "apa.txt")]);
    assert!(stdout2.contains("chunks inserted: 0"));
    assert!(stdout2.contains("chunks updated: 6"));
    assert!(stdout2.contains("totals: 1 documents, 6 chunks"));
}

#[test]
fn test_analyze_writes_report() {
    let (tmp, config_path) = setup_test_env();
    let report = tmp.path().join("reports/analysis.json");

    let (stdout, stderr, success) = run_clh(
        &config_path,
        &["analyze", "--output", report.to_str().unwrap()],
    );
    assert!(success, "analyze failed: stdout={}, stderr={}", stdout, stderr);

    let v: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(report).unwrap()).unwrap();
    assert_eq!(v["corpus_stats"]["total_documents"], 2);
    assert_eq!(v["num_chunks"], 7);
    assert!(v["generated_at"].is_string());

    let tags = v["tag_counts"].as_array().unwrap();
    let counts: Vec<u64> = tags.iter().map(|t| t["count"].as_u64().unwrap()).collect();
    let mut sorted = counts.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(counts, sorted);
}

#[test]
fn test_missing_explicit_config_fails() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("nope.toml");
    let (_, _, success) = run_clh(&missing, &["init"]);
    assert!(!success);
}
