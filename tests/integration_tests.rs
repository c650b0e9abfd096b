//! Integration tests for json-salt
//!
//! These run whole pipelines against files in a temporary directory.

use json_salt::config::SaltConfig;
use json_salt::digest::{salted_digest, CacheMode};
use json_salt::document::{KeyPath, OutputStyle};
use json_salt::error::{ConfigError, SaltError};
use json_salt::pipeline::{RunCoordinator, RunResult};
use json_salt::transform::ValueTransform;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn config(dir: &Path, input: &str, key: &str) -> SaltConfig {
    let in_path = dir.join("in.json");
    fs::write(&in_path, input).unwrap();

    let mut config = SaltConfig::new(in_path, KeyPath::parse(key, ".").unwrap(), "pepper");
    config.output = Some(dir.join("out.json"));
    config
}

fn run(config: SaltConfig) -> (RunResult, String) {
    let out_path = config.output.clone().unwrap();
    let result = RunCoordinator::new(config).unwrap().run().unwrap();
    (result, fs::read_to_string(out_path).unwrap())
}

fn parse_all(output: &str) -> Vec<Value> {
    serde_json::Deserializer::from_str(output)
        .into_iter::<Value>()
        .collect::<Result<_, _>>()
        .unwrap()
}

#[test]
fn test_hash_nested_email_with_normalization() {
    let dir = tempdir().unwrap();
    let mut config = config(
        dir.path(),
        r#"{"user":{"email":"Foo@Bar.com ","id":1}}"#,
        "user.email",
    );
    config.transform = ValueTransform {
        trim: true,
        lowercase: true,
        uppercase: false,
    };

    let (result, output) = run(config);

    assert!(result.completed);
    assert_eq!(result.hashed, 1);
    let expected = salted_digest(b"pepper", "foo@bar.com");
    assert_eq!(output, format!("{{\"user\":{{\"email\":\"{}\",\"id\":1}}}}\n", expected));
}

#[test]
fn test_equal_values_get_equal_digests() {
    let dir = tempdir().unwrap();
    let input = r#"{"k":"alpha"} {"k":"beta"} {"k":"alpha"}"#;
    let (_, output) = run(config(dir.path(), input, "k"));

    let docs = parse_all(&output);
    assert_eq!(docs.len(), 3);
    assert_eq!(docs[0]["k"], docs[2]["k"]);
    assert_ne!(docs[0]["k"], docs[1]["k"]);
    assert_eq!(docs[1]["k"], json!(salted_digest(b"pepper", "beta")));
}

#[test]
fn test_missing_path_passes_document_through() {
    let dir = tempdir().unwrap();
    let (result, output) = run(config(dir.path(), r#"{"a":{"b":1}}"#, "a.c"));

    assert_eq!(result.path_errors, 1);
    assert_eq!(result.hashed, 0);
    assert_eq!(output, "{\"a\":{\"b\":1}}\n");
}

#[test]
fn test_custom_delimiter() {
    let dir = tempdir().unwrap();
    let mut config = config(dir.path(), r#"{"a.b":{"c":"x"}}"#, "unused");
    config.key_path = KeyPath::parse("a.b/c", "/").unwrap();

    let (result, output) = run(config);

    assert_eq!(result.hashed, 1);
    assert_eq!(parse_all(&output)[0]["a.b"]["c"], json!(salted_digest(b"pepper", "x")));
}

#[test]
fn test_output_independent_of_worker_count() {
    let input: String = (0..500)
        .map(|i| format!("{{\"id\":{},\"user\":{{\"email\":\"user{}@example.com\"}}}}\n", i, i % 37))
        .collect();

    let mut outputs = Vec::new();
    for workers in [1, 4] {
        let dir = tempdir().unwrap();
        let mut config = config(dir.path(), &input, "user.email");
        config.worker_count = workers;
        config.queue_size = 16;

        let (result, output) = run(config);
        assert_eq!(result.written, 500);

        let mut lines: Vec<String> = output.lines().map(str::to_string).collect();
        lines.sort();
        outputs.push(lines);
    }

    assert_eq!(outputs[0], outputs[1]);
}

#[test]
fn test_single_worker_preserves_order() {
    let dir = tempdir().unwrap();
    let input: String = (0..50).map(|i| format!("{{\"n\":{},\"k\":\"v\"}}", i)).collect();

    let (_, output) = run(config(dir.path(), &input, "k"));

    let ids: Vec<u64> = parse_all(&output).iter().map(|d| d["n"].as_u64().unwrap()).collect();
    assert_eq!(ids, (0..50).collect::<Vec<u64>>());
}

#[test]
fn test_cache_computes_each_value_once() {
    let input: String = (0..100).map(|i| format!("{{\"k\":\"v{}\"}}", i % 5)).collect();

    let dir = tempdir().unwrap();
    let (result, _) = run(config(dir.path(), &input, "k"));
    assert_eq!(result.digests_computed, 5);
    assert_eq!(result.cache_hits, 95);

    // Racing workers may both compute a missing digest, never skip one
    let dir = tempdir().unwrap();
    let mut cached = config(dir.path(), &input, "k");
    cached.worker_count = 4;
    let (result, _) = run(cached);
    assert!(result.digests_computed >= 5);
    assert_eq!(result.digests_computed + result.cache_hits, 100);

    let dir = tempdir().unwrap();
    let mut brute = config(dir.path(), &input, "k");
    brute.worker_count = 4;
    brute.cache_mode = CacheMode::BruteForce;
    let (result, _) = run(brute);
    assert_eq!(result.digests_computed, 100);
    assert_eq!(result.cache_hits, 0);
}

#[test]
fn test_decode_error_keeps_earlier_documents() {
    let dir = tempdir().unwrap();
    let input = r#"{"k":"a"} {"k":"b"} {"k": } {"k":"c"}"#;

    let (result, output) = run(config(dir.path(), input, "k"));

    assert!(!result.completed);
    assert!(result.decode_error.is_some());
    assert_eq!(result.decoded, 2);
    assert_eq!(parse_all(&output).len(), 2);
}

#[test]
fn test_deeply_nested_document_does_not_end_run() {
    let dir = tempdir().unwrap();
    let deep = format!("{}{{}}{}", "{\"d\":".repeat(299), "}".repeat(299));
    let input = format!(
        "{{\"k\":\"a\"}}\n{{\"k\":\"b\",\"deep\":{}}}\n{{\"k\":\"c\"}}\n",
        deep
    );
    let mut config = config(dir.path(), &input, "k");
    config.worker_count = 2;

    let (result, output) = run(config);

    assert!(result.completed, "stopped early: {:?}", result.decode_error);
    assert_eq!(result.written, 3);
    assert_eq!(result.hashed, 3);

    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 3);
    let deep_line = lines
        .iter()
        .find(|l| l.contains("deep"))
        .expect("nested document written");
    assert!(deep_line.contains(&salted_digest(b"pepper", "b")));
    assert_eq!(deep_line.matches('{').count(), 301);
}

#[test]
fn test_too_deep_document_stops_input() {
    let dir = tempdir().unwrap();
    let levels = json_salt::document::MAX_DEPTH;
    let too_deep = format!("{}{{}}{}", "{\"d\":".repeat(levels), "}".repeat(levels));
    let input = format!("{{\"k\":\"a\"}} {} {{\"k\":\"c\"}}", too_deep);

    let (result, output) = run(config(dir.path(), &input, "k"));

    assert!(!result.completed);
    assert_eq!(result.written, 1);
    assert_eq!(output.lines().count(), 1);
}

#[test]
fn test_case_folding_is_per_code_point() {
    let dir = tempdir().unwrap();
    let mut upper = config(dir.path(), r#"{"k":"straße"} {"k":"ΟΔΟΣ"}"#, "k");
    upper.transform.uppercase = true;

    let (_, output) = run(upper);
    let docs = parse_all(&output);
    assert_eq!(docs[0]["k"], json!(salted_digest(b"pepper", "STRAßE")));
    assert_eq!(docs[1]["k"], json!(salted_digest(b"pepper", "ΟΔΟΣ")));

    let dir = tempdir().unwrap();
    let mut lower = config(dir.path(), r#"{"k":"ΟΔΟΣ"}"#, "k");
    lower.transform.lowercase = true;

    let (_, output) = run(lower);
    assert_eq!(parse_all(&output)[0]["k"], json!(salted_digest(b"pepper", "οδοσ")));
}

#[test]
fn test_pretty_output() {
    let dir = tempdir().unwrap();
    let mut config = config(dir.path(), r#"{"k":"","n":[1]}"#, "k");
    config.output_style = OutputStyle::Pretty;

    let (result, output) = run(config);

    assert_eq!(result.passed_through, 1);
    assert_eq!(output, "{\n    \"k\": \"\",\n    \"n\": [\n        1\n    ]\n}\n");
}

#[test]
fn test_unreadable_input_is_fatal() {
    let dir = tempdir().unwrap();
    let mut config = config(dir.path(), "", "k");
    config.input = dir.path().join("missing.json");

    let err = RunCoordinator::new(config).unwrap().run().unwrap_err();

    assert!(matches!(err, SaltError::Config(ConfigError::InputUnreadable { .. })));
    assert!(!dir.path().join("out.json").exists());
}

#[test]
fn test_uncreatable_output_is_fatal() {
    let dir = tempdir().unwrap();
    let mut config = config(dir.path(), "{}", "k");
    config.output = Some(dir.path().join("no-such-dir").join("out.json"));

    let err = RunCoordinator::new(config).unwrap().run().unwrap_err();

    assert!(matches!(err, SaltError::Config(ConfigError::OutputUncreatable { .. })));
}
