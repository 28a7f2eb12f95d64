//! BRC-20 payload classification
//!
//! Inscription content is arbitrary JSON. Only objects shaped like
//! `{"op": "mint" | "transfer", "tick": "...", "amt": "..."}` count towards a
//! ticker balance; everything else is ignored without being an error.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;

/// Operations that move a ticker balance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Mint,
    Transfer,
}

impl Operation {
    pub fn parse(op: &str) -> Option<Self> {
        match op {
            "mint" => Some(Operation::Mint),
            "transfer" => Some(Operation::Transfer),
            _ => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Mint => write!(f, "mint"),
            Operation::Transfer => write!(f, "transfer"),
        }
    }
}

/// Why a payload does not contribute to any balance
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NotAnObject,
    MissingOp,
    UnsupportedOp(String),
    MissingTick,
}

/// Outcome of inspecting one content payload
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// Counts `amount` towards the case-folded `tick`
    Qualifying {
        op: Operation,
        tick: String,
        amount: Decimal,
    },
    /// Mint or transfer whose `amt` is missing or not a number
    MalformedAmount { tick: String, raw: String },
    Skipped(SkipReason),
}

/// Classify a content payload.
pub fn classify(payload: &Value) -> Classification {
    let Some(object) = payload.as_object() else {
        return Classification::Skipped(SkipReason::NotAnObject);
    };

    let op = match object.get("op").and_then(Value::as_str) {
        Some(op) => op,
        None => return Classification::Skipped(SkipReason::MissingOp),
    };
    let Some(op) = Operation::parse(op) else {
        return Classification::Skipped(SkipReason::UnsupportedOp(op.to_string()));
    };

    let Some(tick) = ticker_of(payload) else {
        return Classification::Skipped(SkipReason::MissingTick);
    };

    let raw = object.get("amt");
    match raw.and_then(parse_amount) {
        Some(amount) => Classification::Qualifying { op, tick, amount },
        None => Classification::MalformedAmount {
            tick,
            raw: raw.map(|v| v.to_string()).unwrap_or_default(),
        },
    }
}

/// Case-folded `tick` of any payload that carries one, regardless of `op`.
pub fn ticker_of(payload: &Value) -> Option<String> {
    payload
        .get("tick")
        .and_then(Value::as_str)
        .map(str::to_lowercase)
}

/// Parse an `amt` field. BRC-20 encodes amounts as strings, but plain JSON
/// numbers are accepted too.
pub fn parse_amount(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(s) => parse_decimal(s.trim()),
        Value::Number(n) => parse_decimal(&n.to_string()),
        _ => None,
    }
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_transfer_is_case_folded() {
        let result = classify(&json!({ "p": "brc-20", "op": "transfer", "tick": "ORDI", "amt": "5.5" }));
        assert_eq!(
            result,
            Classification::Qualifying {
                op: Operation::Transfer,
                tick: "ordi".to_string(),
                amount: dec!(5.5),
            }
        );
    }

    #[test]
    fn test_mint_qualifies() {
        let result = classify(&json!({ "op": "mint", "tick": "sats", "amt": "100" }));
        assert!(matches!(
            result,
            Classification::Qualifying { op: Operation::Mint, ref tick, amount } if tick == "sats" && amount == dec!(100)
        ));
    }

    #[test]
    fn test_deploy_is_skipped() {
        let result = classify(&json!({ "op": "deploy", "tick": "ordi", "max": "21000000" }));
        assert_eq!(
            result,
            Classification::Skipped(SkipReason::UnsupportedOp("deploy".to_string()))
        );
    }

    #[test]
    fn test_missing_fields_are_skipped() {
        assert_eq!(
            classify(&json!({ "tick": "ordi", "amt": "1" })),
            Classification::Skipped(SkipReason::MissingOp)
        );
        assert_eq!(
            classify(&json!({ "op": "mint", "amt": "1" })),
            Classification::Skipped(SkipReason::MissingTick)
        );
        assert_eq!(
            classify(&json!("plain text inscription")),
            Classification::Skipped(SkipReason::NotAnObject)
        );
    }

    #[test]
    fn test_unparsable_amount_is_malformed() {
        let result = classify(&json!({ "op": "mint", "tick": "Sats", "amt": "lots" }));
        assert_eq!(
            result,
            Classification::MalformedAmount {
                tick: "sats".to_string(),
                raw: "\"lots\"".to_string(),
            }
        );

        let missing = classify(&json!({ "op": "transfer", "tick": "sats" }));
        assert!(matches!(missing, Classification::MalformedAmount { .. }));
    }

    #[test]
    fn test_parse_amount_variants() {
        assert_eq!(parse_amount(&json!(" 42 ")), Some(dec!(42)));
        assert_eq!(parse_amount(&json!(7)), Some(dec!(7)));
        assert_eq!(parse_amount(&json!(0.25)), Some(dec!(0.25)));
        assert_eq!(parse_amount(&json!("1e3")), Some(dec!(1000)));
        assert_eq!(parse_amount(&json!("")), None);
        assert_eq!(parse_amount(&json!(null)), None);
    }

    #[test]
    fn test_ticker_of_ignores_op() {
        assert_eq!(ticker_of(&json!({ "op": "deploy", "tick": "PEPE" })), Some("pepe".to_string()));
        assert_eq!(ticker_of(&json!({ "op": "mint" })), None);
    }
}
