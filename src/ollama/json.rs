//! Defensive JSON extraction from model responses.
//!
//! Local models routinely wrap JSON in markdown fences or pad it with
//! conversational text. Extraction here is tolerant: strip fences, then
//! locate the first parseable object in whatever remains. A response with
//! no usable JSON yields `None`, which callers treat as "no result".

/// Pull the first JSON object out of a model response.
///
/// Returns the normalized (re-serialized) object text, or `None` when the
/// response contains nothing parseable.
pub fn extract_object(response: &str) -> Option<String> {
    let candidate = strip_fences(response);

    for start in candidate.char_indices().filter(|(_, c)| *c == '{').map(|(i, _)| i) {
        let slice = &candidate[start..];

        // Whole-tail parse first: serde tolerates nothing after the value,
        // so fall back to scanning for the balanced closing brace.
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(slice)
            && value.is_object()
            && let Ok(text) = serde_json::to_string(&value)
        {
            return Some(text);
        }

        if let Some(end) = balanced_end(slice)
            && let Ok(value) = serde_json::from_str::<serde_json::Value>(&slice[..=end])
            && value.is_object()
            && let Ok(text) = serde_json::to_string(&value)
        {
            return Some(text);
        }
    }

    None
}

/// Remove a surrounding markdown code fence, if any.
///
/// Handles ```` ```json ```` and bare ```` ``` ```` fences; anything before
/// the opening fence or after the closing fence is discarded.
fn strip_fences(text: &str) -> &str {
    let trimmed = text.trim();

    let Some(open) = trimmed.find("```") else {
        return trimmed;
    };

    let after_open = &trimmed[open + 3..];
    // Skip the language tag on the opening fence line.
    let body_start = after_open.find('\n').map(|i| i + 1).unwrap_or(0);
    let body = &after_open[body_start..];

    match body.find("```") {
        Some(close) => body[..close].trim(),
        None => body.trim(),
    }
}

/// Byte index of the brace closing the object that starts at byte 0.
///
/// Tracks string literals and escapes so braces inside values do not
/// unbalance the scan.
fn balanced_end(text: &str) -> Option<usize> {
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }

    None
}
