//! Prompt construction and model-response parsing for note clustering.

use serde::Deserialize;

use crate::client::ClusterError;
use crate::reconcile::NoteSnapshot;

/// One cluster as the model reported it, before label reconciliation.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCluster {
    pub category: String,
    #[serde(default)]
    pub notes: Vec<RawClusterNote>,
}

/// One note reference inside a [`RawCluster`].
#[derive(Debug, Clone, Deserialize)]
pub struct RawClusterNote {
    pub id: i64,
    #[serde(default)]
    pub confidence: f64,
}

#[derive(Debug, Deserialize)]
struct ModelReply {
    clusters: Vec<RawCluster>,
}

/// Build the system prompt fixing the output contract.
pub fn system_prompt() -> String {
    "You are a workshop facilitation assistant. You group sticky notes into \
     the provided categories. Respond with JSON only, no prose, in exactly \
     this shape: {\"clusters\":[{\"category\":\"<category label, copied \
     verbatim>\",\"notes\":[{\"id\":<note id>,\"confidence\":<0..1>}]}]}. \
     Every note must appear in exactly one cluster. Use only the provided \
     category labels, copied verbatim."
        .to_string()
}

/// Build the user prompt listing categories, optional context, and notes.
pub fn user_prompt(notes: &[NoteSnapshot], categories: &[String], context: Option<&str>) -> String {
    let mut out = String::from("Categories:\n");
    for category in categories {
        out.push_str("- ");
        out.push_str(category);
        out.push('\n');
    }
    if let Some(context) = context.filter(|c| !c.trim().is_empty()) {
        out.push_str("\nContext: ");
        out.push_str(context.trim());
        out.push('\n');
    }
    out.push_str("\nNotes:\n");
    for note in notes {
        // One line per note; newlines inside content would corrupt the list.
        let content = note.content.replace(['\n', '\r'], " ");
        out.push_str(&format!("[{}] {}\n", note.id, content));
    }
    out
}

/// Parse the model's reply content into raw clusters.
///
/// Tolerates a Markdown code fence around the JSON (models add one despite
/// instructions) but nothing else: any other shape is [`ClusterError::Malformed`],
/// surfaced to the facilitator as "clustering failed, try again" and never
/// partially applied.
pub fn parse_reply(content: &str) -> Result<Vec<RawCluster>, ClusterError> {
    let trimmed = strip_code_fence(content.trim());
    let reply: ModelReply = serde_json::from_str(trimmed)
        .map_err(|e| ClusterError::Malformed(format!("Model reply is not valid JSON: {e}")))?;
    Ok(reply.clusters)
}

/// Strip a surrounding ``` / ```json fence, if present.
fn strip_code_fence(s: &str) -> &str {
    let Some(rest) = s.strip_prefix("```") else {
        return s;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_prefix('\n').unwrap_or(rest);
    rest.strip_suffix("```").map(str::trim_end).unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plain_json() {
        let reply = r#"{"clusters":[{"category":"Process","notes":[{"id":1,"confidence":0.9}]}]}"#;
        let clusters = parse_reply(reply).unwrap();
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].category, "Process");
        assert_eq!(clusters[0].notes[0].id, 1);
    }

    #[test]
    fn parse_fenced_json() {
        let reply = "```json\n{\"clusters\":[{\"category\":\"A\",\"notes\":[]}]}\n```";
        let clusters = parse_reply(reply).unwrap();
        assert_eq!(clusters[0].category, "A");
    }

    #[test]
    fn missing_confidence_defaults_to_zero() {
        let reply = r#"{"clusters":[{"category":"A","notes":[{"id":5}]}]}"#;
        let clusters = parse_reply(reply).unwrap();
        assert_eq!(clusters[0].notes[0].confidence, 0.0);
    }

    #[test]
    fn non_json_is_malformed() {
        assert!(matches!(
            parse_reply("Here are your clusters: ..."),
            Err(ClusterError::Malformed(_))
        ));
    }

    #[test]
    fn wrong_shape_is_malformed() {
        assert!(matches!(
            parse_reply(r#"{"groups":[]}"#),
            Err(ClusterError::Malformed(_))
        ));
    }

    #[test]
    fn user_prompt_flattens_newlines() {
        let notes = vec![NoteSnapshot {
            id: 3,
            content: "line one\nline two".into(),
        }];
        let prompt = user_prompt(&notes, &["A".into(), "B".into()], None);
        assert!(prompt.contains("[3] line one line two"));
        assert!(!prompt.contains("one\nline"));
    }
}
