//! Decode LLM completions into layouts
//!
//! The model is asked for bare JSON but routinely wraps it in prose or a
//! markdown fence. Anything that does not decode into a structurally
//! usable layout is a permanent failure: retrying the same prompt is not
//! expected to fix it.

use crate::layout::schema::GeneratedLayout;
use crate::llm::provider::ProviderError;

/// Parse a completion into a layout
pub fn parse_layout(response: &str) -> Result<GeneratedLayout, ProviderError> {
    let json_str = extract_json(response)?;

    let layout: GeneratedLayout = serde_json::from_str(json_str).map_err(|e| {
        ProviderError::MalformedResponse(format!(
            "Failed to parse layout: {} - Response: {}",
            e,
            preview(response)
        ))
    })?;

    if let Some(problem) = layout.structural_problem() {
        return Err(ProviderError::MalformedResponse(problem));
    }

    Ok(layout)
}

/// Extract JSON object from LLM response (handles fences and surrounding text)
pub fn extract_json(response: &str) -> Result<&str, ProviderError> {
    let body = fenced_block(response).unwrap_or(response);

    let start = body
        .find('{')
        .ok_or_else(|| ProviderError::MalformedResponse("No JSON found in response".into()))?;
    let end = body.rfind('}').ok_or_else(|| {
        ProviderError::MalformedResponse("No closing brace found in response".into())
    })?;
    if end < start {
        return Err(ProviderError::MalformedResponse(
            "No JSON object found in response".into(),
        ));
    }
    Ok(&body[start..=end])
}

/// Contents of the first ``` fence, language tag stripped
fn fenced_block(response: &str) -> Option<&str> {
    let open = response.find("```")?;
    let after = &response[open + 3..];
    let body_start = after.find('\n')? + 1;
    let body = &after[body_start..];
    let close = body.find("```")?;
    Some(&body[..close])
}

/// Keep error messages bounded when the model rambles
fn preview(response: &str) -> &str {
    match response.char_indices().nth(200) {
        Some((idx, _)) => &response[..idx],
        None => response,
    }
}
