//! Response parsing
//!
//! Service text is untrusted: fences are stripped, blank leaves are
//! normalized away, and diagram markup must carry both vehicle groups.

use crate::error::AdapterError;
use crate::service::ExtractionResponse;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::Value;
use tcr_model::{PartialReport, Question};

/// Group ids the diagram editor relies on
pub const VEHICLE_GROUP_IDS: [&str; 2] = ["vehicle-A", "vehicle-B"];

/// Remove a surrounding Markdown code fence, if any
#[must_use]
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // drop the info string (```json, ```svg, ...)
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

/// Parse an extraction payload into a partial record and its questions
///
/// # Errors
/// - `AdapterError::EmptyResponse` for blank text
/// - `AdapterError::Malformed` if the text is not a JSON object of the expected shape
pub fn parse_extraction(text: &str) -> Result<ExtractionResponse, AdapterError> {
    let body = strip_code_fences(text);
    if body.is_empty() {
        return Err(AdapterError::EmptyResponse("extraction"));
    }

    let mut value: Value = serde_json::from_str(body)?;
    let object = value
        .as_object_mut()
        .ok_or_else(|| AdapterError::Malformed("extraction payload is not an object".into()))?;

    let questions = match object.remove("questions") {
        None | Some(Value::Null) => Vec::new(),
        Some(raw) => serde_json::from_value::<Vec<Question>>(raw)?,
    };
    let questions = questions
        .into_iter()
        .filter(|q| !q.question.trim().is_empty())
        .collect();
    let partial = serde_json::from_value::<PartialReport>(value)?.normalized();

    Ok(ExtractionResponse { partial, questions })
}

/// Parse a clarification payload
///
/// The prompt never carries the sketch or signatures, so any value for
/// them in the reply is discarded.
///
/// # Errors
/// Same as [`parse_extraction`]
pub fn parse_clarification(text: &str) -> Result<PartialReport, AdapterError> {
    let body = strip_code_fences(text);
    if body.is_empty() {
        return Err(AdapterError::EmptyResponse("clarification"));
    }

    let mut partial = serde_json::from_str::<PartialReport>(body)?.normalized();
    // the diagram is owned by synthesis and the editor; an echoed svg skips validate_svg
    partial.diagram = None;
    partial.signatures = None;
    Ok(partial)
}

/// Accept diagram markup only if it has an `<svg` root and both vehicle groups
///
/// # Errors
/// - `AdapterError::EmptyResponse` for blank text
/// - `AdapterError::Malformed` for anything else that fails the check
pub fn validate_svg(text: &str) -> Result<String, AdapterError> {
    let markup = strip_code_fences(text);
    if markup.is_empty() {
        return Err(AdapterError::EmptyResponse("diagram"));
    }
    if !markup.contains("<svg") {
        return Err(AdapterError::Malformed("diagram has no <svg> root".into()));
    }
    for id in VEHICLE_GROUP_IDS {
        let quoted = [format!("id=\"{id}\""), format!("id='{id}'")];
        if !quoted.iter().any(|q| markup.contains(q.as_str())) {
            return Err(AdapterError::Malformed(format!("diagram is missing group {id}")));
        }
    }
    Ok(markup.to_string())
}

/// Check that a sketch payload is non-empty base64
///
/// # Errors
/// - `AdapterError::EmptyResponse` for blank payloads
/// - `AdapterError::Malformed` if the payload does not decode
pub fn validate_sketch(encoded: &str) -> Result<String, AdapterError> {
    let encoded = encoded.trim();
    if encoded.is_empty() {
        return Err(AdapterError::EmptyResponse("sketch"));
    }
    let bytes = STANDARD
        .decode(encoded)
        .map_err(|e| AdapterError::Malformed(format!("sketch is not base64: {e}")))?;
    if bytes.is_empty() {
        return Err(AdapterError::EmptyResponse("sketch"));
    }
    Ok(encoded.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn strips_fences_with_and_without_info_string() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n<svg/>\n```\n"), "<svg/>");
        assert_eq!(strip_code_fences("  {\"a\":1}  "), "{\"a\":1}");
    }

    #[test]
    fn extraction_splits_questions_and_drops_blanks() {
        let text = r#"```json
{
  "accident": {"weather": "Clear", "light": ""},
  "vehicles": [{"label": "A", "plate": "AB12CDE", "make_model": ""}],
  "questions": [
    {"field": "vehicles.B.plate", "question": "What is the plate of vehicle B?"},
    {"field": "x", "question": "  "}
  ]
}
```"#;
        let response = parse_extraction(text).unwrap();

        assert_eq!(response.questions.len(), 1);
        assert_eq!(response.questions[0].field, "vehicles.B.plate");
        let accident = response.partial.accident.unwrap();
        assert_eq!(accident.weather.as_deref(), Some("Clear"));
        assert_eq!(accident.light, None);
        assert_eq!(response.partial.vehicles[0].plate.as_deref(), Some("AB12CDE"));
        assert_eq!(response.partial.vehicles[0].make_model, None);
    }

    #[test]
    fn extraction_rejects_empty_and_non_object_payloads() {
        assert_eq!(
            parse_extraction("   "),
            Err(AdapterError::EmptyResponse("extraction"))
        );
        assert!(matches!(
            parse_extraction("[1,2]"),
            Err(AdapterError::Malformed(_))
        ));
        assert!(matches!(
            parse_extraction("not json"),
            Err(AdapterError::Malformed(_))
        ));
    }

    #[test]
    fn clarification_ignores_diagram_and_signatures() {
        let partial = parse_clarification(
            r#"{"diagram":{"svg":"<svg width=\"400\"></svg>","notes":"n"},"signatures":{"A":"x"},"witnesses":[{"name":"w"}]}"#,
        )
        .unwrap();
        assert_eq!(partial.diagram, None);
        assert_eq!(partial.signatures, None);
        assert_eq!(partial.witnesses.map(|w| w.len()), Some(1));
    }

    #[test]
    fn svg_needs_both_vehicle_groups() {
        let good = r#"<svg width="400"><g id="vehicle-A"></g><g id='vehicle-B'></g></svg>"#;
        assert_eq!(validate_svg(&format!("```svg\n{good}\n```")).unwrap(), good);
        assert!(validate_svg(r#"<svg><g id="vehicle-A"></g></svg>"#).is_err());
        assert!(validate_svg("<div id=\"vehicle-A\" id=\"vehicle-B\"></div>").is_err());
        assert_eq!(validate_svg(""), Err(AdapterError::EmptyResponse("diagram")));
    }

    #[test]
    fn sketch_must_decode() {
        assert_eq!(validate_sketch(" iVBORw0KGgo= ").unwrap(), "iVBORw0KGgo=");
        assert!(matches!(validate_sketch("%%%"), Err(AdapterError::Malformed(_))));
        assert_eq!(validate_sketch(""), Err(AdapterError::EmptyResponse("sketch")));
    }
}
