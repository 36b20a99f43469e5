use serde_json::Value;

pub const FALLBACK_CATEGORY: &str = "General";
pub const EMPTY_REPLY_PLACEHOLDER: &str = "No response from model";
const DEFAULT_PRIORITY: &str = "medium";

/// One semantically related cluster of on-page text, as grouped by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct TextGroup {
    pub category: String,
    pub texts: Vec<String>,
    pub description: String,
    pub priority: String,
    pub location: String,
}

impl TextGroup {
    fn fallback(texts: Vec<String>) -> Self {
        Self {
            category: FALLBACK_CATEGORY.to_string(),
            texts,
            description: String::new(),
            priority: DEFAULT_PRIORITY.to_string(),
            location: String::new(),
        }
    }
}

/// Turns a model reply into text groups. This never fails: replies the model
/// mangles still produce a usable catch-all group so the run can finish.
pub fn parse_grouping_reply(reply: &str) -> Vec<TextGroup> {
    let reply = reply.trim();
    if reply.is_empty() {
        return vec![TextGroup::fallback(vec![
            EMPTY_REPLY_PLACEHOLDER.to_string()
        ])];
    }

    let candidate = extract_fenced_json(reply);
    let parsed: Value = match serde_json::from_str(candidate) {
        Ok(value) => value,
        Err(_) => {
            return vec![TextGroup::fallback(vec![reply.to_string()])];
        }
    };

    match parsed {
        Value::Array(elements) => elements
            .iter()
            .enumerate()
            .map(|(i, element)| group_from_value(element, i))
            .collect(),
        Value::Object(ref map) => match map.get("groups").and_then(|g| g.as_array()) {
            Some(groups) => groups
                .iter()
                .enumerate()
                .map(|(i, element)| group_from_value(element, i))
                .collect(),
            None => vec![TextGroup::fallback(vec![parsed.to_string()])],
        },
        other => vec![TextGroup::fallback(vec![other.to_string()])],
    }
}

/// Pulls the payload out of a ```json fence, falling back to a bare ``` fence
/// and then to the whole reply. An unterminated fence runs to the end.
pub(crate) fn extract_fenced_json(reply: &str) -> &str {
    for opener in ["```json", "```"] {
        if let Some(start) = reply.find(opener) {
            let body = &reply[start + opener.len()..];
            let body = match body.find("```") {
                Some(end) => &body[..end],
                None => body,
            };
            return body.trim();
        }
    }
    reply
}

fn group_from_value(element: &Value, index: usize) -> TextGroup {
    match element {
        Value::Object(map) => {
            let category = map
                .get("category")
                .and_then(|v| v.as_str())
                .unwrap_or(&format!("Group {}", index + 1))
                .to_string();
            let texts = match map.get("texts") {
                Some(Value::Array(items)) => items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect(),
                Some(Value::String(s)) => vec![s.clone()],
                _ => Vec::new(),
            };
            TextGroup {
                category,
                texts,
                description: string_field(map, "description"),
                priority: map
                    .get("priority")
                    .and_then(|v| v.as_str())
                    .unwrap_or(DEFAULT_PRIORITY)
                    .to_string(),
                location: string_field(map, "location"),
            }
        }
        Value::String(s) => TextGroup {
            category: format!("Group {}", index + 1),
            texts: vec![s.clone()],
            description: String::new(),
            priority: DEFAULT_PRIORITY.to_string(),
            location: String::new(),
        },
        other => TextGroup {
            category: format!("Group {}", index + 1),
            texts: vec![other.to_string()],
            description: String::new(),
            priority: DEFAULT_PRIORITY.to_string(),
            location: String::new(),
        },
    }
}

fn string_field(map: &serde_json::Map<String, Value>, key: &str) -> String {
    map.get(key)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}
