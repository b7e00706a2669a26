//! Best-effort repair of extended-JSON export dialects.
//!
//! Document-database export tools produce text that resembles JSON but
//! contains wrapper function calls (`ObjectId("...")`, `ISODate("...")`,
//! `NumberLong(42)`), unquoted keys, unquoted hex identifiers, and
//! single-quoted strings. [`repair`] rewrites such text into valid JSON
//! through an ordered pipeline of named stages.
//!
//! Stage order matters: key quoting must run after wrapper removal so it
//! never mangles wrapper argument text. The rewrites are pattern-anchored
//! and conservative, but the pipeline is inherently heuristic — a string
//! value containing an unescaped single quote, for example, is not
//! guaranteed to repair correctly. That is a documented limitation of the
//! dialect, not something this module tries to outsmart.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::RepairError;

/// One named rewrite stage of the repair pipeline.
///
/// Stages are exposed so each can be tested against fixture pairs in
/// isolation, independent of the full pipeline.
pub struct Stage {
    pub name: &'static str,
    rules: Vec<(Regex, &'static str)>,
}

impl Stage {
    fn new(name: &'static str, rules: Vec<(&str, &'static str)>) -> Self {
        let rules = rules
            .into_iter()
            .map(|(pattern, replacement)| {
                let re = Regex::new(pattern).expect("repair stage regex is valid");
                (re, replacement)
            })
            .collect();
        Self { name, rules }
    }

    /// Apply every rewrite rule of this stage, in order.
    pub fn apply(&self, input: &str) -> String {
        let mut out = input.to_string();
        for (re, replacement) in &self.rules {
            out = re.replace_all(&out, *replacement).into_owned();
        }
        out
    }
}

static STAGES: LazyLock<Vec<Stage>> = LazyLock::new(|| {
    vec![
        // ObjectId("abc") / ISODate('2025-01-01') → "abc" / "2025-01-01"
        Stage::new(
            "unwrap_id_wrappers",
            vec![
                (r#"ObjectId\(["']([^"')]+)["']\)"#, r#""$1""#),
                (r#"ISODate\(["']([^"')]+)["']\)"#, r#""$1""#),
            ],
        ),
        // NumberLong(42) / NumberInt(7) / NumberDecimal("1.5") → bare literal
        Stage::new(
            "unwrap_number_wrappers",
            vec![
                (r"NumberLong\(([^)]+)\)", "$1"),
                (r"NumberInt\(([^)]+)\)", "$1"),
                (r#"NumberDecimal\(["']([^"')]+)["']\)"#, "$1"),
            ],
        ),
        // {name: ...} / , count: ...} → quoted keys. Must run after the
        // wrapper stages so wrapper arguments are already plain tokens.
        Stage::new(
            "quote_keys",
            vec![(r"([{,]\s*)([A-Za-z_][A-Za-z0-9_]*)\s*:", r#"$1"$2":"#)],
        ),
        // Bare UUIDs and long hex identifiers in value position.
        Stage::new(
            "quote_hex_values",
            vec![
                (
                    r":\s*([a-fA-F0-9]{8}-[a-fA-F0-9]{4}-[a-fA-F0-9]{4}-[a-fA-F0-9]{4}-[a-fA-F0-9]{12})([,}])",
                    r#": "$1"$2"#,
                ),
                (r":\s*([a-fA-F0-9]{24,})([,}])", r#": "$1"$2"#),
            ],
        ),
        // 'single-quoted' string literals → "double-quoted".
        Stage::new("double_quote_strings", vec![(r"'([^']*?)'", r#""$1""#)]),
        // TRUE / False / NULL → canonical lowercase literals.
        Stage::new(
            "normalize_literals",
            vec![
                (r"(?i)\btrue\b", "true"),
                (r"(?i)\bfalse\b", "false"),
                (r"(?i)\bnull\b", "null"),
            ],
        ),
    ]
});

/// The ordered rewrite stages applied by [`repair`].
pub fn stages() -> &'static [Stage] {
    &STAGES
}

/// Rewrite `text` into syntactically valid JSON.
///
/// Text that already parses is returned unchanged (idempotent fast path).
/// Otherwise the rewrite stages run in order and the result is re-parsed;
/// if it still does not parse, the error for the *original* text is
/// returned so the caller can surface a meaningful parse failure. Only
/// syntactic validity is attempted — semantic fidelity of ambiguous
/// inputs is not guaranteed.
pub fn repair(text: &str) -> Result<Cow<'_, str>, RepairError> {
    if serde_json::from_str::<serde_json::Value>(text).is_ok() {
        return Ok(Cow::Borrowed(text));
    }

    let mut rewritten = text.to_string();
    for stage in stages() {
        rewritten = stage.apply(&rewritten);
    }

    match serde_json::from_str::<serde_json::Value>(&rewritten) {
        Ok(_) => Ok(Cow::Owned(rewritten)),
        Err(_) => {
            // Surface the original parse error, not the rewritten one.
            let original_err = serde_json::from_str::<serde_json::Value>(text)
                .expect_err("text failed the fast-path parse above");
            Err(RepairError(original_err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn stage(name: &str) -> &'static Stage {
        stages()
            .iter()
            .find(|s| s.name == name)
            .unwrap_or_else(|| panic!("no stage named {}", name))
    }

    #[test]
    fn test_valid_json_returned_unchanged() {
        let text = r#"{"name": "Alice", "tags": [1, 2, 3]}"#;
        let repaired = repair(text).unwrap();
        assert!(matches!(repaired, Cow::Borrowed(_)));
        assert_eq!(repaired, text);
    }

    #[test]
    fn test_mongo_export_fixture() {
        let text = r#"{name: 'Alice', id: ObjectId("abc123")}"#;
        let repaired = repair(text).unwrap();
        let value: Value = serde_json::from_str(&repaired).unwrap();
        assert_eq!(value, json!({"name": "Alice", "id": "abc123"}));
    }

    #[test]
    fn test_full_dialect() {
        let text = r#"{_id: ObjectId('65f1a2b3c4d5e6f7a8b9c0d1'),
            created: ISODate("2025-05-03T10:00:00Z"),
            count: NumberLong(42),
            score: NumberDecimal("1.5"),
            active: TRUE,
            note: NULL}"#;
        let repaired = repair(text).unwrap();
        let value: Value = serde_json::from_str(&repaired).unwrap();
        assert_eq!(value["_id"], "65f1a2b3c4d5e6f7a8b9c0d1");
        assert_eq!(value["created"], "2025-05-03T10:00:00Z");
        assert_eq!(value["count"], 42);
        assert_eq!(value["score"], 1.5);
        assert_eq!(value["active"], true);
        assert_eq!(value["note"], Value::Null);
    }

    #[test]
    fn test_unrepairable_input_surfaces_original_error() {
        let err = repair("{{{{ not json at all").unwrap_err();
        // The carried error is a JSON parse error for the original text.
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn test_stage_unwrap_id_wrappers() {
        let out = stage("unwrap_id_wrappers").apply(r#"{"id": ObjectId("abc")}"#);
        assert_eq!(out, r#"{"id": "abc"}"#);
    }

    #[test]
    fn test_stage_unwrap_number_wrappers() {
        let out = stage("unwrap_number_wrappers").apply(r#"{"n": NumberInt(7)}"#);
        assert_eq!(out, r#"{"n": 7}"#);
    }

    #[test]
    fn test_stage_quote_keys() {
        let out = stage("quote_keys").apply(r#"{name: 1, other_key: 2}"#);
        assert_eq!(out, r#"{"name": 1, "other_key": 2}"#);
    }

    #[test]
    fn test_stage_quote_keys_leaves_quoted_keys_alone() {
        let out = stage("quote_keys").apply(r#"{"name": 1}"#);
        assert_eq!(out, r#"{"name": 1}"#);
    }

    #[test]
    fn test_stage_quote_hex_values() {
        let out = stage("quote_hex_values")
            .apply(r#"{"id": 123e4567-e89b-12d3-a456-426614174000}"#);
        assert_eq!(out, r#"{"id": "123e4567-e89b-12d3-a456-426614174000"}"#);

        let out = stage("quote_hex_values").apply(r#"{"id": 65f1a2b3c4d5e6f7a8b9c0d1}"#);
        assert_eq!(out, r#"{"id": "65f1a2b3c4d5e6f7a8b9c0d1"}"#);
    }

    #[test]
    fn test_stage_double_quote_strings() {
        let out = stage("double_quote_strings").apply(r#"{"name": 'Alice'}"#);
        assert_eq!(out, r#"{"name": "Alice"}"#);
    }

    #[test]
    fn test_stage_normalize_literals() {
        let out = stage("normalize_literals").apply(r#"{"a": True, "b": FALSE, "c": Null}"#);
        assert_eq!(out, r#"{"a": true, "b": false, "c": null}"#);
    }

    #[test]
    fn test_key_quoting_runs_after_wrapper_removal() {
        // If key quoting ran first, the wrapper call argument text would
        // be corrupted and the wrapper stage would no longer match.
        let text = r#"{id: ObjectId("abc123"), name: 'Bob'}"#;
        let repaired = repair(text).unwrap();
        let value: Value = serde_json::from_str(&repaired).unwrap();
        assert_eq!(value, json!({"id": "abc123", "name": "Bob"}));
    }

    #[test]
    fn test_repair_idempotent_on_own_output() {
        let text = r#"{name: 'Alice', id: ObjectId("abc123")}"#;
        let once = repair(text).unwrap().into_owned();
        let twice = repair(&once).unwrap();
        assert_eq!(twice, once);
    }
}
