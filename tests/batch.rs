//! End-to-end batches through the JSON envelope

use serde_json::{json, Value};
use xprobe::batch::{BatchOptions, Diagnostic, Document, Extractor};
use xprobe::envelope::{process, write_matrix};
use xprobe::error::{BatchEnvelopeError, DocumentError};

const PAGE: &str = r#"<html><body><p>Hello World</p><a href="/link">Click</a></body></html>"#;

fn extractor(parallel: bool) -> Extractor {
    Extractor::new(BatchOptions {
        parallel,
        ..BatchOptions::default()
    })
}

fn run_json(request: Value) -> Value {
    let input = serde_json::to_vec(&request).unwrap();
    let report = process(&input, &extractor(true)).unwrap();
    serde_json::to_value(&report.matrix).unwrap()
}

#[test]
fn test_mixed_batch() {
    let output = run_json(json!({
        "xpaths": ["/html/body/p", "//title", "/html/body/a/@href", "//nonexistent", "//jsLiteral"],
        "urls": {
            "http://example.com": {
                "content": "<html><head><title>Test Page</title></head><body><p>Hello World</p><a href=\"/link\">Click</a></body></html>"
            },
            "http://malformed.com": { "content": "<ht<ml>><body>Invalid" },
            "http://empty.com": { "content": "" },
            "http://customtag.com": {
                "content": "<doc><jsLiteral>some data</jsLiteral><other>stuff</other></doc>"
            }
        }
    }));

    assert_eq!(
        output,
        json!({
            "/html/body/p": { "http://example.com": "Hello World" },
            "//title": { "http://example.com": "Test Page" },
            "/html/body/a/@href": { "http://example.com": "/link" },
            "//nonexistent": {},
            "//jsLiteral": { "http://customtag.com": "some data" }
        })
    );
}

#[test]
fn test_text_extraction() {
    let output = run_json(json!({ "xpaths": ["/html/body/p"], "urls": { "u": { "content": PAGE } } }));
    assert_eq!(output, json!({ "/html/body/p": { "u": "Hello World" } }));
}

#[test]
fn test_no_match_is_omitted() {
    let output = run_json(json!({ "xpaths": ["//title"], "urls": { "u": { "content": PAGE } } }));
    assert_eq!(output, json!({ "//title": {} }));
}

#[test]
fn test_attribute_extraction() {
    let output = run_json(json!({ "xpaths": ["/html/body/a/@href"], "urls": { "u": { "content": PAGE } } }));
    assert_eq!(output, json!({ "/html/body/a/@href": { "u": "/link" } }));
}

#[test]
fn test_invalid_query_keeps_empty_row() {
    let input = serde_json::to_vec(&json!({
        "xpaths": ["[invalid-xpath", "/html/body/p"],
        "urls": { "u": { "content": PAGE } }
    }))
    .unwrap();
    let report = process(&input, &extractor(false)).unwrap();

    assert!(report.matrix.row("[invalid-xpath").unwrap().is_empty());
    assert_eq!(report.matrix.get("/html/body/p", "u"), Some("Hello World"));
    assert!(matches!(
        report.diagnostics.as_slice(),
        [Diagnostic::Compile { query, .. }] if query == "[invalid-xpath"
    ));
}

#[test]
fn test_empty_document_records_diagnostic() {
    let input = serde_json::to_vec(&json!({
        "xpaths": ["/html/body/p"],
        "urls": { "empty": { "content": "" } }
    }))
    .unwrap();
    let report = process(&input, &extractor(false)).unwrap();

    assert_eq!(report.matrix.entry_count(), 0);
    assert!(matches!(
        report.diagnostics.as_slice(),
        [Diagnostic::Document { key, error: DocumentError::Decode(_) }] if key == "empty"
    ));
}

#[test]
fn test_custom_tags() {
    let output = run_json(json!({
        "xpaths": ["//jsLiteral", "//other"],
        "urls": { "c": { "content": "<doc><jsLiteral>some data</jsLiteral><other>stuff</other></doc>" } }
    }));
    assert_eq!(
        output,
        json!({ "//jsLiteral": { "c": "some data" }, "//other": { "c": "stuff" } })
    );
}

#[test]
fn test_child_path_past_unclosed_meta() {
    let output = run_json(json!({
        "xpaths": ["/html/head/title", "/html/body/p"],
        "urls": {
            "u": {
                "content": "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><link rel=\"icon\" href=\"/f.ico\"><title>Real Page</title></head><body><p>text</p></body></html>"
            }
        }
    }));
    assert_eq!(
        output,
        json!({ "/html/head/title": { "u": "Real Page" }, "/html/body/p": { "u": "text" } })
    );
}

#[test]
fn test_invalid_envelope_is_fatal() {
    let err = process(b"{invalid json", &extractor(true)).unwrap_err();
    assert!(matches!(err, BatchEnvelopeError::Json(_)));
}

#[test]
fn test_deterministic_across_strategies() {
    let documents: Vec<_> = (0..50)
        .map(|i| {
            Document::new(
                format!("https://site{i:02}.example/"),
                format!(
                    "<html><head><title>Site {i}</title><meta name=\"n\" content=\"{i}\"/></head>\
                     <body><div><p>first {i}</p></div><p>second</p></body></html>"
                ),
            )
        })
        .collect();
    let queries = ["//title", "//meta/@content", "//p", "/html/body/p", "//missing", "a//"];

    let parallel = extractor(true).run(&queries, &documents);
    let sequential = extractor(false).run(&queries, &documents);
    assert_eq!(parallel.matrix, sequential.matrix);
    assert_eq!(parallel.diagnostics, sequential.diagnostics);

    assert_eq!(parallel.matrix.get("//p", "https://site07.example/"), Some("first 7"));
    assert_eq!(parallel.matrix.get("/html/body/p", "https://site07.example/"), Some("second"));
    assert_eq!(parallel.matrix.row("//title").unwrap().len(), 50);

    let mut first = Vec::new();
    let mut second = Vec::new();
    write_matrix(&parallel.matrix, &mut first, true).unwrap();
    write_matrix(&sequential.matrix, &mut second, true).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_idempotent_runs() {
    let extractor = extractor(true);
    let documents = [Document::new("u", PAGE)];
    let queries = ["/html/body/p", "//a/@href"];
    let first = extractor.run(&queries, &documents);
    let second = extractor.run(&queries, &documents);
    assert_eq!(first.matrix, second.matrix);
}
