//! Extract the JSON payload from accumulated model output.
//!
//! Models often wrap JSON in a markdown code fence, sometimes with prose around it.

use crate::domain::{DomainError, StrategyResult};
use tracing::warn;

const FENCE: &str = "```";

/// The fenced block's contents if the text is wrapped in a fence, else the whole trimmed text.
/// A fence only wraps the payload when it opens before the first `{`; fences inside
/// the JSON (markdown in a `content` string) are left alone. An optional `json`
/// language tag after the opening fence is dropped.
pub fn extract_json_payload(raw_text: &str) -> &str {
    let open = match (raw_text.find(FENCE), raw_text.find('{')) {
        (Some(open), Some(brace)) if open < brace => open,
        (Some(open), None) => open,
        _ => return raw_text.trim(),
    };
    let after_open = &raw_text[open + FENCE.len()..];
    let body = match after_open.get(..4) {
        Some(tag) if tag.eq_ignore_ascii_case("json") => &after_open[4..],
        _ => after_open,
    };

    match body.rfind(FENCE) {
        Some(close) => body[..close].trim(),
        None => body.trim(),
    }
}

/// Extract and parse a strategy payload. Failure is fatal for the request.
pub fn parse_strategy_payload(raw_text: &str) -> Result<StrategyResult, DomainError> {
    let payload = extract_json_payload(raw_text);
    StrategyResult::from_json(payload).inspect_err(|e| {
        warn!(
            error = %e,
            json = %payload.chars().take(200).collect::<String>(),
            "strategy JSON parse failed"
        );
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fenced_with_language_tag_and_surrounding_prose() {
        let text = "prefix ```json\n{\"a\":1}\n``` suffix";
        let payload = extract_json_payload(text);
        let value: serde_json::Value = serde_json::from_str(payload).unwrap();
        assert_eq!(value, serde_json::json!({ "a": 1 }));
    }

    #[test]
    fn fenced_without_language_tag() {
        assert_eq!(extract_json_payload("```\n{\"a\":2}\n```"), "{\"a\":2}");
    }

    #[test]
    fn unfenced_text_is_trimmed_whole() {
        assert_eq!(extract_json_payload("  {\"a\":3}\n"), "{\"a\":3}");
    }

    #[test]
    fn unterminated_fence_takes_rest() {
        assert_eq!(extract_json_payload("```JSON\n{\"a\":4}"), "{\"a\":4}");
    }

    #[test]
    fn fence_inside_unfenced_content_is_kept() {
        let text = r#"{"content": "Install:\n```bash\nnpm i\n```\nDone"}"#;
        assert_eq!(extract_json_payload(text), text);
        let result = parse_strategy_payload(text).unwrap();
        assert_eq!(
            result,
            StrategyResult::Content {
                content: "Install:\n```bash\nnpm i\n```\nDone".into()
            }
        );
    }

    #[test]
    fn fenced_payload_with_inner_fence_keeps_whole_json() {
        let text = "```json\n{\"content\": \"a ```sh x``` b\"}\n```";
        assert_eq!(
            extract_json_payload(text),
            "{\"content\": \"a ```sh x``` b\"}"
        );
    }

    #[test]
    fn parse_strategy_from_fenced_content_shape() {
        let text = "```json\n{\"content\": \"## Budget\"}\n```";
        let result = parse_strategy_payload(text).unwrap();
        assert_eq!(
            result,
            StrategyResult::Content {
                content: "## Budget".into()
            }
        );
    }

    #[test]
    fn parse_failure_is_surfaced() {
        let err = parse_strategy_payload("```json\n{\"channels\": [\n```").unwrap_err();
        assert!(matches!(err, DomainError::Parse(_)));
    }
}
