//! JSON envelope returned by the gift code API.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `{"code": .., "msg": .., "data": ..}` plus whatever else the server adds.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct ApiResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ApiResponse {
    /// Parse a response body. Anything but a JSON object is an error.
    pub fn parse(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }

    /// True when `code` is numerically zero.
    pub fn is_success_code(&self) -> bool {
        match &self.code {
            Some(Value::Number(n)) => n.as_f64() == Some(0.0),
            _ => false,
        }
    }

    /// `msg` lowercased; empty when absent or not a string.
    pub fn message_lower(&self) -> String {
        self.msg
            .as_ref()
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_lowercase()
    }

    /// `data` when it is a JSON object.
    pub fn data_object(&self) -> Option<&Map<String, Value>> {
        self.data.as_ref().and_then(Value::as_object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_typical_success() {
        let resp = ApiResponse::parse(
            r#"{"code":0,"data":{"fid":1,"kid":245},"msg":"success","err_code":""}"#,
        )
        .unwrap();
        assert!(resp.is_success_code());
        assert_eq!(resp.message_lower(), "success");
        assert_eq!(resp.data_object().unwrap()["kid"], 245);
        assert_eq!(resp.extra["err_code"], "");
    }

    #[test]
    fn test_non_zero_and_missing_code() {
        let resp = ApiResponse::parse(r#"{"code":1,"msg":"Sign Error"}"#).unwrap();
        assert!(!resp.is_success_code());
        assert_eq!(resp.message_lower(), "sign error");

        let resp = ApiResponse::parse("{}").unwrap();
        assert!(!resp.is_success_code());
        assert_eq!(resp.message_lower(), "");
        assert!(resp.data_object().is_none());
    }

    #[test]
    fn test_string_code_is_not_success() {
        let resp = ApiResponse::parse(r#"{"code":"0"}"#).unwrap();
        assert!(!resp.is_success_code());
    }

    #[test]
    fn test_non_object_bodies_fail() {
        assert!(ApiResponse::parse("<html>blocked</html>").is_err());
        assert!(ApiResponse::parse("[1,2]").is_err());
        assert!(ApiResponse::parse("").is_err());
    }

    #[test]
    fn test_data_must_be_object() {
        let resp = ApiResponse::parse(r#"{"code":0,"data":[]}"#).unwrap();
        assert!(resp.data_object().is_none());
    }
}
