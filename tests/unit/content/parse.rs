use super::*;
use crate::content::model::Depth;

fn ml_request() -> ContentRequest {
    ContentRequest::new("Machine Learning", "en", Depth::Intermediate).unwrap()
}

fn assert_invariants(doc: &ContentDocument) {
    assert!(!doc.title.trim().is_empty());
    assert!(!doc.description.trim().is_empty());
    assert!(!doc.sections.is_empty());
}

#[test]
fn embedded_json_round_trips() {
    let object = serde_json::json!({
        "title": "Machine Learning 101",
        "description": "How machines learn from data.",
        "sections": [
            {"title": "Supervised", "content": "Labels guide training.", "key_points": ["labels"]},
            {"title": "Unsupervised", "content": "Structure without labels.", "key_points": []}
        ],
        "key_points": ["data", "models", "evaluation"],
        "learning_objectives": ["explain supervision"],
        "fun_facts": ["The term dates to 1959."]
    });
    let raw = format!(
        "Sure! Here is your content:\n```json\n{}\n```\nEnjoy.",
        serde_json::to_string_pretty(&object).unwrap()
    );

    let parsed = parse_response(&raw, &ml_request());
    assert_eq!(parsed.outcome(), ParseOutcome::Parsed);

    let doc = parsed.into_document();
    assert_eq!(doc.title, "Machine Learning 101");
    assert_eq!(doc.description, "How machines learn from data.");
    assert_eq!(doc.sections.len(), 2);
    assert_eq!(doc.sections[0].key_points, vec!["labels".to_string()]);
    assert_eq!(doc.sections[1].title, "Unsupervised");
    assert_eq!(doc.key_points.len(), 3);
    assert_eq!(doc.learning_objectives, vec!["explain supervision".to_string()]);
    assert_eq!(doc.fun_facts.len(), 1);
    assert_eq!(doc.topic, "Machine Learning");
    assert_eq!(doc.language, "en");
    assert_eq!(doc.depth, Depth::Intermediate);
}

#[test]
fn missing_optional_lists_default_to_empty() {
    let raw = r#"{"title": "T", "description": "D", "sections": [{"title": "S", "content": "C"}]}"#;
    let doc = parse_response(raw, &ml_request()).into_document();
    assert!(doc.key_points.is_empty());
    assert!(doc.learning_objectives.is_empty());
    assert!(doc.fun_facts.is_empty());
    assert!(doc.sections[0].key_points.is_empty());
}

#[test]
fn null_fields_decode_as_empty() {
    let raw = r#"{
        "title": "Machine Learning 101",
        "description": null,
        "sections": [
            {"title": "Supervised", "content": null, "key_points": null},
            {"title": null, "content": "Structure without labels."}
        ],
        "key_points": null,
        "learning_objectives": null,
        "fun_facts": null
    }"#;
    let parsed = parse_response(raw, &ml_request());
    assert_eq!(parsed.outcome(), ParseOutcome::Parsed);

    let doc = parsed.into_document();
    assert_invariants(&doc);
    assert_eq!(doc.title, "Machine Learning 101");
    assert_eq!(doc.sections.len(), 2);
    assert_eq!(doc.sections[0].title, "Supervised");
    assert_eq!(doc.sections[0].content, "");
    assert!(doc.sections[0].key_points.is_empty());
    assert_eq!(doc.sections[1].title, "");
    assert!(doc.key_points.is_empty());
    assert!(doc.learning_objectives.is_empty());
    assert!(doc.fun_facts.is_empty());
}

#[test]
fn null_sections_get_the_description_section() {
    let raw = r#"{"title": "T", "description": "D", "sections": null, "fun_facts": null}"#;
    let parsed = parse_response(raw, &ml_request());
    assert_eq!(parsed.outcome(), ParseOutcome::Parsed);
    let doc = parsed.into_document();
    assert_eq!(doc.sections, vec![Section::new(FALLBACK_SECTION_TITLE, "D")]);
}

#[test]
fn plain_prose_falls_back() {
    let prose = "Machine learning is a field of study that gives computers the ability to learn \
                 without being explicitly programmed. It powers recommendations and more.";
    let parsed = parse_response(prose, &ml_request());
    assert!(parsed.is_fallback());

    let doc = parsed.into_document();
    assert_eq!(doc.title, "Learning Machine Learning");
    assert_eq!(doc.sections.len(), 1);
    assert_eq!(doc.sections[0].title, FALLBACK_SECTION_TITLE);
    assert_eq!(doc.sections[0].content, prose);
    assert!(doc.sections[0].key_points.is_empty());
    assert!(doc.key_points.is_empty());
    assert!(doc.learning_objectives.is_empty());
    assert_invariants(&doc);
}

#[test]
fn fallback_description_is_first_200_chars() {
    let prose: String = "ü".repeat(450);
    let doc = parse_response(&prose, &ml_request()).into_document();
    assert_eq!(doc.description.chars().count(), FALLBACK_DESCRIPTION_CHARS);
    assert_eq!(doc.sections[0].content, prose);
}

#[test]
fn malformed_json_falls_back() {
    let raw = r#"Here you go: {"title": "Broken", "sections": [ {"title": "x", } ]"#;
    // No closing brace at the end, but one exists inside; decoding still fails.
    let parsed = parse_response(raw, &ml_request());
    assert!(parsed.is_fallback());
    assert_eq!(parsed.document().sections[0].content, raw);
}

#[test]
fn reversed_braces_fall_back() {
    let raw = "} nothing useful here {";
    let parsed = parse_response(raw, &ml_request());
    assert!(parsed.is_fallback());
    assert_invariants(parsed.document());
}

#[test]
fn wrong_field_types_fall_back() {
    let raw = r#"{"title": 42, "description": "D", "sections": "none"}"#;
    assert!(parse_response(raw, &ml_request()).is_fallback());
}

#[test]
fn empty_text_yields_valid_fallback() {
    let parsed = parse_response("", &ml_request());
    assert!(parsed.is_fallback());
    let doc = parsed.document();
    assert_invariants(doc);
    assert_eq!(doc.description, "Learning Machine Learning");
    assert_eq!(doc.sections[0].content, "");
}

#[test]
fn decoded_gaps_are_filled() {
    let parsed = parse_response("{}", &ml_request());
    assert_eq!(parsed.outcome(), ParseOutcome::Parsed);
    let doc = parsed.document();
    assert_invariants(doc);
    assert_eq!(doc.title, "Learning Machine Learning");
    assert_eq!(doc.sections[0].title, FALLBACK_SECTION_TITLE);
}

#[test]
fn parsing_is_idempotent() {
    let inputs = [
        "",
        "plain words",
        r#"{"title": "A", "description": "B", "sections": [{"title": "C", "content": "D"}]}"#,
        "{ not json }",
    ];
    for raw in inputs {
        assert_eq!(
            parse_response(raw, &ml_request()),
            parse_response(raw, &ml_request())
        );
    }
}
