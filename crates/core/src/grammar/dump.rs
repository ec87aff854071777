use serde::Serialize;

/// Serialize a scan result, token table or line to a pretty-printed JSON string.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\":\"{e}\"}}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::scan::scan_str;

    #[test]
    fn scan_result_serializes_tokens_and_final_response() {
        let json = to_pretty_json(&scan_str("+CFUN: 1\r\nOK\r\n"));
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v["lines"][0]["tokens"][0]["kind"], "notification");
        assert_eq!(v["lines"][0]["tokens"][1]["text"], "1");
        assert_eq!(v["final_response"]["result"], "ok");
        assert!(v["lines"][0].get("malformed_at").is_none());
    }
}
