use crate::content::model::ContentRequest;
use crate::foundation::config::DepthInstructions;

const RESPONSE_SCHEMA: &str = r#"{
    "title": "Topic Title",
    "description": "2-3 sentence overview",
    "sections": [
        {
            "title": "Section 1",
            "content": "Detailed explanation",
            "key_points": ["point1", "point2", "point3"]
        },
        {
            "title": "Section 2",
            "content": "Detailed explanation",
            "key_points": ["point1", "point2"]
        },
        {
            "title": "Key Takeaways",
            "content": "Summary of main learnings",
            "key_points": ["takeaway1", "takeaway2"]
        }
    ],
    "key_points": ["main_point_1", "main_point_2", "main_point_3"],
    "learning_objectives": ["objective_1", "objective_2"],
    "fun_facts": ["fact_1", "fact_2"]
}"#;

const QUALITY_CHECKLIST: &[&str] = &[
    "Accurate and factually correct",
    "Well-structured with clear sections",
    "Engaging and easy to understand",
    "Suitable for video narration",
    "Contains practical examples where applicable",
];

/// Human-readable language name for the prompt. Unknown codes pass through.
pub fn language_name(code: &str) -> &str {
    match code.to_ascii_lowercase().as_str() {
        "en" => "English",
        "es" => "Spanish",
        "fr" => "French",
        "de" => "German",
        "it" => "Italian",
        "pt" => "Portuguese",
        "ja" => "Japanese",
        "zh" => "Chinese",
        _ => code,
    }
}

/// Build the user prompt for one content request.
pub fn build_user_prompt(request: &ContentRequest, depths: &DepthInstructions) -> String {
    let mut out = String::with_capacity(RESPONSE_SCHEMA.len() + 512);
    out.push_str(&format!(
        "Create comprehensive educational content for the topic: \"{}\"\n\n",
        request.topic
    ));
    out.push_str(&format!(
        "Depth Level: {}\n",
        depths.for_depth(request.depth)
    ));
    out.push_str(&format!(
        "Language: {}\n\n",
        language_name(&request.language)
    ));
    out.push_str("Provide content in the following JSON format:\n");
    out.push_str(RESPONSE_SCHEMA);
    out.push_str("\n\nEnsure the content is:\n");
    for item in QUALITY_CHECKLIST {
        out.push_str("- ");
        out.push_str(item);
        out.push('\n');
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/content/prompt.rs"]
mod tests;
