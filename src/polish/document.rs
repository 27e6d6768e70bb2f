//! The idiom document and its synthetic variants.
//!
//! Model output is passed through untyped (`serde_json::Value`) so unknown
//! keys survive. [`IdiomDocument`] is only used to build the degraded
//! documents the service emits on its own.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How many characters of a failure detail are embedded in a fallback.
pub const DETAIL_CHARS: usize = 50;

/// `idiom` sentinel: model reply was not a JSON object.
pub const PARSE_FAILED_IDIOM: &str = "解析异常";
/// `idiom` sentinel: no API key configured.
pub const NOT_CONFIGURED_IDIOM: &str = "未配置API";
/// `idiom` sentinel: the model call itself failed.
pub const UPSTREAM_FAILED_IDIOM: &str = "调用出错";
/// `tone_score` carried by every synthetic document.
pub const SENTINEL_TONE_SCORE: &str = "0";

/// Wire shape of a polish result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdiomDocument {
    pub original: String,
    pub idiom: String,
    pub alternatives: Vec<String>,
    pub explanation: String,
    pub tone_score: String,
}

impl IdiomDocument {
    /// Returned when the model reply could not be parsed.
    pub fn parse_failed(original: &str, cleaned: &str) -> Self {
        Self {
            original: original.to_string(),
            idiom: PARSE_FAILED_IDIOM.to_string(),
            alternatives: vec!["格式错误".to_string()],
            explanation: format!(
                "AI 返回了非标准 JSON，原始内容：{}...",
                truncate_chars(cleaned, DETAIL_CHARS)
            ),
            tone_score: SENTINEL_TONE_SCORE.to_string(),
        }
    }

    /// Returned when no model credential is configured.
    pub fn not_configured(original: &str) -> Self {
        Self {
            original: original.to_string(),
            idiom: NOT_CONFIGURED_IDIOM.to_string(),
            alternatives: vec!["请配置Key".to_string(), "并在.env中".to_string()],
            explanation: "后端未检测到 LLM_API_KEY，请在 .env 文件或环境变量中配置。".to_string(),
            tone_score: SENTINEL_TONE_SCORE.to_string(),
        }
    }

    /// Returned when the model call failed.
    pub fn upstream_failed(original: &str, detail: &str) -> Self {
        Self {
            original: original.to_string(),
            idiom: UPSTREAM_FAILED_IDIOM.to_string(),
            alternatives: vec!["网络繁忙".to_string(), "稍后再试".to_string()],
            explanation: format!("后端报错: {}", truncate_chars(detail, DETAIL_CHARS)),
            tone_score: SENTINEL_TONE_SCORE.to_string(),
        }
    }

    pub fn into_value(self) -> Value {
        // A struct of strings always serializes.
        serde_json::to_value(&self).unwrap_or(Value::Null)
    }
}

/// First `max` Unicode scalar values of `s`.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_counts_characters_not_bytes() {
        let s = "一二三四五";
        assert_eq!(truncate_chars(s, 3), "一二三");
        assert_eq!(truncate_chars(s, 10), s);
        assert_eq!(truncate_chars("", 5), "");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn test_parse_failed_document() {
        let long = "x".repeat(200);
        let doc = IdiomDocument::parse_failed("yyds", &long);
        assert_eq!(doc.original, "yyds");
        assert_eq!(doc.idiom, PARSE_FAILED_IDIOM);
        assert_eq!(doc.alternatives, vec!["格式错误"]);
        assert!(doc.explanation.contains(&"x".repeat(50)));
        assert!(!doc.explanation.contains(&"x".repeat(51)));
        assert_eq!(doc.tone_score, "0");
    }

    #[test]
    fn test_not_configured_document() {
        let doc = IdiomDocument::not_configured("666");
        assert_eq!(doc.original, "666");
        assert_eq!(doc.idiom, NOT_CONFIGURED_IDIOM);
        assert_eq!(doc.alternatives.len(), 2);
        assert!(doc.explanation.contains("LLM_API_KEY"));
    }

    #[test]
    fn test_upstream_failed_truncates_detail() {
        let detail = "连接超时".repeat(30);
        let doc = IdiomDocument::upstream_failed("破防了", &detail);
        assert_eq!(doc.idiom, UPSTREAM_FAILED_IDIOM);
        let embedded = doc.explanation.trim_start_matches("后端报错: ");
        assert_eq!(embedded.chars().count(), DETAIL_CHARS);
    }

    #[test]
    fn test_into_value_has_all_wire_fields() {
        let v = IdiomDocument::not_configured("a").into_value();
        for field in ["original", "idiom", "alternatives", "explanation", "tone_score"] {
            assert!(v.get(field).is_some(), "missing {field}");
        }
        assert!(v["tone_score"].is_string());
    }
}
