//! Reply extraction from the agent response envelope.
//!
//! The backend's response shape has drifted over time; the reply text may
//! live at any of several field paths. Extraction follows an explicit
//! ordered priority list and returns a typed not-found (`None`) instead of
//! falling through silently to an empty string.

use serde_json::Value;

use fliza_types::agent::AgentReply;

/// Extract the reply from a response envelope.
///
/// An array-shaped envelope delivers the reply as its first element;
/// extraction proceeds on that element. Field priority for the reply
/// text:
/// 1. `agentResponse.text`
/// 2. `text`
/// 3. `content`
/// 4. `response`
///
/// `agentResponse.thought` and `agentResponse.actions` are captured as
/// metadata when present. Returns `None` when no non-empty text is found
/// at any path.
pub fn extract_reply(envelope: &Value) -> Option<AgentReply> {
    let envelope = match envelope.as_array() {
        Some(elements) => elements.first()?,
        None => envelope,
    };

    let agent_response = envelope.get("agentResponse");

    let text = agent_response
        .and_then(|r| r.get("text"))
        .and_then(Value::as_str)
        .or_else(|| envelope.get("text").and_then(Value::as_str))
        .or_else(|| envelope.get("content").and_then(Value::as_str))
        .or_else(|| envelope.get("response").and_then(Value::as_str))
        .filter(|t| !t.is_empty())?;

    let thought = agent_response
        .and_then(|r| r.get("thought"))
        .and_then(Value::as_str)
        .map(String::from);

    let actions = agent_response
        .and_then(|r| r.get("actions"))
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    Some(AgentReply {
        text: text.to_string(),
        thought,
        actions,
    })
}
