//! Rule-based design-intent classifier.
//!
//! A message is routed to the design workflow (and never reaches the agent
//! gateway) when it contains at least one ACTION keyword and at least one
//! CONTEXT keyword. Both sets are fixed, case-insensitive substring checks.

/// Keywords expressing an intent to produce an artifact.
const ACTION_KEYWORDS: &[&str] = &[
    "design", "create", "generate", "make", "draw", "artwork", "poster", "image", "picture",
    "sketch",
];

/// Keywords referencing what the camera currently sees.
const CONTEXT_KEYWORDS: &[&str] = &[
    "this", "see", "camera", "looking", "photo", "here", "showing",
];

/// Detect a design request in an outbound message.
///
/// Returns the design prompt (the original message) when both keyword
/// classes hit, `None` otherwise.
pub fn detect_design_intent(message: &str) -> Option<String> {
    let lower = message.to_lowercase();
    let has_action = ACTION_KEYWORDS.iter().any(|kw| lower.contains(kw));
    let has_context = CONTEXT_KEYWORDS.iter().any(|kw| lower.contains(kw));

    if has_action && has_context {
        Some(message.to_string())
    } else {
        None
    }
}
