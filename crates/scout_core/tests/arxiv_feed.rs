use pretty_assertions::assert_eq;
use scout_core::domain::Document;
use scout_core::ingest::arxiv_atom::parse_atom_feed;

fn sample_feed() -> &'static str {
    include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../fixtures/arxiv_sample.atom"
    ))
}

#[test]
fn parses_entries_into_typed_documents() {
    let res = parse_atom_feed(sample_feed()).expect("parse");
    assert_eq!(res.documents.len(), 2);

    assert_eq!(
        res.documents[0],
        Document {
            id: "http://arxiv.org/abs/2505.01234v1".to_string(),
            title: "Measuring the Energy Footprint of Large Language Model Inference".to_string(),
            authors: vec!["Ada Lovelace".to_string(), "Grace Hopper".to_string()],
            abstract_text: "Large language models consume significant datacenter power. \
                            We measure per-token energy across GPU generations & batch sizes."
                .to_string(),
            published: "2025-05-13T17:59:59Z".to_string(),
        }
    );
}

#[test]
fn reads_cdata_and_ignores_feed_level_fields() {
    let res = parse_atom_feed(sample_feed()).expect("parse");
    let doc = &res.documents[1];
    assert_eq!(doc.id, "http://arxiv.org/abs/2404.00007v2");
    assert_eq!(doc.abstract_text, "Shifting training jobs <in time> reduces emissions.");
    assert!(res.documents.iter().all(|d| !d.title.starts_with("ArXiv Query")));
}

#[test]
fn entry_without_id_is_dropped_with_warning() {
    let res = parse_atom_feed(sample_feed()).expect("parse");
    assert_eq!(res.warnings.len(), 1);
    assert_eq!(res.warnings[0].code, "SOURCE_ENTRY_MISSING_ID");
    assert!(res.warnings[0]
        .details
        .as_deref()
        .unwrap_or_default()
        .contains("Entry Without Identifier"));
}

#[test]
fn empty_feed_yields_no_documents() {
    let xml = r#"<?xml version="1.0"?><feed xmlns="http://www.w3.org/2005/Atom"><title>empty</title></feed>"#;
    let res = parse_atom_feed(xml).expect("parse");
    assert!(res.documents.is_empty());
    assert!(res.warnings.is_empty());
}

#[test]
fn missing_summary_becomes_empty_abstract() {
    let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom">
        <entry><id>x1</id><title>T</title><published>2025-01-01</published></entry>
    </feed>"#;
    let res = parse_atom_feed(xml).expect("parse");
    assert_eq!(res.documents.len(), 1);
    assert_eq!(res.documents[0].abstract_text, "");
    assert!(res.documents[0].authors.is_empty());
}

#[test]
fn arxiv_error_entry_is_source_failure() {
    let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom">
        <entry>
          <id>http://arxiv.org/api/errors#incorrect_id_format_for_1234</id>
          <title>Error</title>
          <summary>incorrect id format for 1234</summary>
        </entry>
    </feed>"#;
    let err = parse_atom_feed(xml).unwrap_err();
    assert_eq!(err.code, "SOURCE_UNAVAILABLE");
    assert_eq!(err.details.as_deref(), Some("incorrect id format for 1234"));
}

#[test]
fn rejects_malformed_and_non_feed_payloads() {
    let err = parse_atom_feed("<feed><entry><id>x</entry></feed>").unwrap_err();
    assert_eq!(err.code, "SOURCE_UNAVAILABLE");

    let err = parse_atom_feed("<html><body>Service Unavailable</body></html>").unwrap_err();
    assert_eq!(err.code, "SOURCE_UNAVAILABLE");
}
