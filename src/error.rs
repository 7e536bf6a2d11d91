use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),

    #[error("server error ({status}): {detail}")]
    Server { status: u16, detail: String },

    #[error("invalid request: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("the backend can only be reached from the browser build")]
    Unavailable,
}

/// Body of a failed request, either `{"detail": "..."}` or a list of field
/// errors `{"detail": [{"loc": [...], "msg": "..."}]}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Detail,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Detail {
    Text(String),
    Fields(Vec<FieldError>),
}

#[derive(Debug, Deserialize)]
struct FieldError {
    #[serde(default)]
    loc: Vec<Value>,
    msg: String,
}

impl FieldError {
    fn render(&self) -> String {
        match self.loc.last() {
            Some(Value::String(field)) => format!("{field}: {}", self.msg),
            Some(Value::Number(index)) => format!("{index}: {}", self.msg),
            _ => self.msg.clone(),
        }
    }
}

impl ApiError {
    pub fn from_response(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorBody>(body).map(|b| b.detail) {
            Ok(Detail::Fields(fields)) => {
                ApiError::Validation(fields.iter().map(FieldError::render).collect())
            }
            Ok(Detail::Text(detail)) if status == 422 => ApiError::Validation(vec![detail]),
            Ok(Detail::Text(detail)) => ApiError::Server { status, detail },
            Err(_) => {
                let raw = body.trim();
                if status == 422 {
                    ApiError::Validation(vec![raw.to_string()])
                } else if raw.is_empty() {
                    ApiError::Server { status, detail: format!("HTTP {status}") }
                } else {
                    ApiError::Server { status, detail: raw.to_string() }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_detail_is_a_server_error() {
        let err = ApiError::from_response(500, r#"{"detail": "Failed to generate mold: boom"}"#);
        assert_eq!(
            err,
            ApiError::Server { status: 500, detail: "Failed to generate mold: boom".into() }
        );
        assert_eq!(err.to_string(), "server error (500): Failed to generate mold: boom");
    }

    #[test]
    fn field_errors_use_last_loc_segment() {
        let body = r#"{"detail": [
            {"loc": ["body", "wall_thickness"], "msg": "Input should be greater than or equal to 2", "type": "greater_than_equal"},
            {"loc": ["body", "depth_map"], "msg": "Field required", "type": "missing"},
            {"loc": [], "msg": "bad"}
        ]}"#;
        let err = ApiError::from_response(422, body);
        assert_eq!(
            err,
            ApiError::Validation(vec![
                "wall_thickness: Input should be greater than or equal to 2".into(),
                "depth_map: Field required".into(),
                "bad".into(),
            ])
        );
    }

    #[test]
    fn unparseable_bodies_keep_raw_text() {
        assert_eq!(
            ApiError::from_response(502, "  Bad Gateway \n"),
            ApiError::Server { status: 502, detail: "Bad Gateway".into() }
        );
        assert_eq!(
            ApiError::from_response(503, ""),
            ApiError::Server { status: 503, detail: "HTTP 503".into() }
        );
        assert_eq!(
            ApiError::from_response(422, "nope"),
            ApiError::Validation(vec!["nope".into()])
        );
    }
}
