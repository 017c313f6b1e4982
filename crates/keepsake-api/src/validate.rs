//! Decoding and checking of request bodies and path ids.
//!
//! Bodies are read as loose JSON first so each bad field produces its own message
//! rather than a generic deserialization error.

use keepsake_types::MessageStatus;
use keepsake_types::api::{SubmitMessageRequest, SubmitScoreRequest, UpdateStatusRequest};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};

pub const NO_DATA: &str = "No data provided";
pub const NAME_AND_TIME_REQUIRED: &str = "Name and time are required";
pub const TIME_NOT_A_NUMBER: &str = "Time must be a valid number";
pub const TIME_NEGATIVE: &str = "Time must be a positive number";
pub const NAME_AND_MESSAGE_REQUIRED: &str = "Name and message are required";
pub const NAME_AND_MESSAGE_EMPTY: &str = "Name and message cannot be empty";
pub const STATUS_REQUIRED: &str = "Status is required";
pub const STATUS_INVALID: &str = "Status must be one of [Pending, Approved, Denied]";
pub const MESSAGE_ID_REQUIRED: &str = "Message ID is required";

/// Parse a body into `T`.
///
/// Returns `Ok(None)` for bodies that carry no fields: empty, whitespace, `{}` or any JSON
/// value that is not an object.
fn parse_body<T: DeserializeOwned>(body: &[u8]) -> ApiResult<Option<T>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    let value: Value = serde_json::from_slice(body)
        .map_err(|_| ApiError::validation("Request body must be valid JSON"))?;

    match &value {
        Value::Object(map) if !map.is_empty() => {}
        _ => return Ok(None),
    }

    serde_json::from_value(value)
        .map(Some)
        .map_err(|e| ApiError::validation(format!("Malformed request body: {}", e)))
}

/// Non-blank string field, trimmed.
fn text_field(value: Option<&Value>) -> Option<&str> {
    match value {
        Some(Value::String(s)) => Some(s.trim()),
        _ => None,
    }
}

/// `POST /api/scores` body into `(name, time)`.
pub fn score_submission(body: &[u8]) -> ApiResult<(String, i64)> {
    let req: SubmitScoreRequest = parse_body(body)?.ok_or_else(|| ApiError::validation(NO_DATA))?;

    let name = text_field(req.name.as_ref()).filter(|name| !name.is_empty());
    let (Some(name), Some(time)) = (name, req.time.as_ref()) else {
        return Err(ApiError::validation(NAME_AND_TIME_REQUIRED));
    };

    let time = parse_time(time)?;
    if time < 0 {
        return Err(ApiError::validation(TIME_NEGATIVE));
    }

    Ok((name.to_string(), time))
}

/// Accepts integers, floats (truncated toward zero) and strings holding an integer.
pub fn parse_time(value: &Value) -> ApiResult<i64> {
    let invalid = || ApiError::validation(TIME_NOT_A_NUMBER);

    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            // u64 beyond i64, or a float
            let f = n.as_f64().filter(|f| f.is_finite()).ok_or_else(invalid)?;
            let truncated = f.trunc();
            if truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
                return Err(invalid());
            }
            Ok(truncated as i64)
        }
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

/// `POST /api/messages` body into trimmed `(name, message)`.
pub fn message_submission(body: &[u8]) -> ApiResult<(String, String)> {
    let req: SubmitMessageRequest =
        parse_body(body)?.ok_or_else(|| ApiError::validation(NO_DATA))?;

    let (Some(Value::String(name)), Some(Value::String(message))) =
        (req.name.as_ref(), req.message.as_ref())
    else {
        return Err(ApiError::validation(NAME_AND_MESSAGE_REQUIRED));
    };
    if name.is_empty() || message.is_empty() {
        return Err(ApiError::validation(NAME_AND_MESSAGE_REQUIRED));
    }

    let (name, message) = (name.trim(), message.trim());
    if name.is_empty() || message.is_empty() {
        return Err(ApiError::validation(NAME_AND_MESSAGE_EMPTY));
    }

    Ok((name.to_string(), message.to_string()))
}

/// Raw status literal from a `PUT .../status` body. Validity is checked by [`parse_status`].
pub fn status_update(body: &[u8]) -> ApiResult<String> {
    let req: Option<UpdateStatusRequest> = parse_body(body)?;

    match req.and_then(|r| r.status) {
        None => Err(ApiError::validation(STATUS_REQUIRED)),
        Some(Value::String(s)) if s.is_empty() => Err(ApiError::validation(STATUS_REQUIRED)),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(ApiError::validation(STATUS_INVALID)),
    }
}

pub fn parse_status(raw: &str) -> ApiResult<MessageStatus> {
    raw.parse::<MessageStatus>()
        .map_err(|_| ApiError::validation(STATUS_INVALID))
}

/// Path segment holding a message id.
pub fn message_id(segment: &str) -> ApiResult<i64> {
    segment
        .trim()
        .parse::<i64>()
        .map_err(|_| ApiError::validation(MESSAGE_ID_REQUIRED))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bytes(value: Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    fn validation_message<T: std::fmt::Debug>(result: ApiResult<T>) -> String {
        match result {
            Err(ApiError::Validation(msg)) => msg,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn empty_bodies_carry_no_data() {
        for body in [&b""[..], &b"   "[..], &b"null"[..], &b"{}"[..]] {
            assert_eq!(validation_message(score_submission(body)), NO_DATA);
            assert_eq!(validation_message(message_submission(body)), NO_DATA);
        }
    }

    #[test]
    fn non_object_bodies_carry_no_data() {
        for body in [&b"[]"[..], &b"[1, 2]"[..], &b"0"[..], &b"false"[..], &b"\"hi\""[..]] {
            assert_eq!(validation_message(score_submission(body)), NO_DATA);
            assert_eq!(validation_message(message_submission(body)), NO_DATA);
        }
        assert_eq!(validation_message(status_update(b"[]")), STATUS_REQUIRED);
    }

    #[test]
    fn invalid_json_is_a_validation_error() {
        let msg = validation_message(score_submission(b"{name: A"));
        assert_eq!(msg, "Request body must be valid JSON");
    }

    #[test]
    fn score_accepts_numeric_forms() {
        let cases = [
            (json!(95), 95),
            (json!(0), 0),
            (json!("120"), 120),
            (json!(" 7 "), 7),
            (json!(42.9), 42),
        ];
        for (time, expected) in cases {
            let (name, parsed) = score_submission(&bytes(json!({ "name": "Ana", "time": time }))).unwrap();
            assert_eq!(name, "Ana");
            assert_eq!(parsed, expected);
        }
    }

    #[test]
    fn score_requires_name_and_time() {
        for body in [
            json!({ "time": 10 }),
            json!({ "name": "", "time": 10 }),
            json!({ "name": "   ", "time": 10 }),
            json!({ "name": null, "time": 10 }),
            json!({ "name": 5, "time": 10 }),
            json!({ "name": "Ana" }),
            json!({ "name": "Ana", "time": null }),
        ] {
            assert_eq!(validation_message(score_submission(&bytes(body))), NAME_AND_TIME_REQUIRED);
        }
    }

    #[test]
    fn score_rejects_bad_times() {
        for time in [json!("fast"), json!("4.2"), json!(true), json!([1]), json!({ "s": 1 })] {
            let body = bytes(json!({ "name": "Ana", "time": time }));
            assert_eq!(validation_message(score_submission(&body)), TIME_NOT_A_NUMBER);
        }

        let body = bytes(json!({ "name": "Ana", "time": -1 }));
        assert_eq!(validation_message(score_submission(&body)), TIME_NEGATIVE);
        let body = bytes(json!({ "name": "Ana", "time": "-30" }));
        assert_eq!(validation_message(score_submission(&body)), TIME_NEGATIVE);
    }

    #[test]
    fn message_fields_are_trimmed() {
        let (name, message) =
            message_submission(&bytes(json!({ "name": "  Sam ", "message": "\thi\n" }))).unwrap();
        assert_eq!(name, "Sam");
        assert_eq!(message, "hi");
    }

    #[test]
    fn message_requires_both_fields() {
        for body in [
            json!({ "name": "Sam" }),
            json!({ "message": "hi" }),
            json!({ "name": "", "message": "hi" }),
            json!({ "name": "Sam", "message": 3 }),
        ] {
            assert_eq!(
                validation_message(message_submission(&bytes(body))),
                NAME_AND_MESSAGE_REQUIRED
            );
        }

        let body = bytes(json!({ "name": "Sam", "message": "   " }));
        assert_eq!(validation_message(message_submission(&body)), NAME_AND_MESSAGE_EMPTY);
    }

    #[test]
    fn status_body_rules() {
        assert_eq!(status_update(&bytes(json!({ "status": "Approved" }))).unwrap(), "Approved");
        assert_eq!(status_update(&bytes(json!({ "status": "Archived" }))).unwrap(), "Archived");

        assert_eq!(validation_message(status_update(b"")), STATUS_REQUIRED);
        assert_eq!(validation_message(status_update(&bytes(json!({ "status": "" })))), STATUS_REQUIRED);
        assert_eq!(validation_message(status_update(&bytes(json!({ "other": 1 })))), STATUS_REQUIRED);
        assert_eq!(validation_message(status_update(&bytes(json!({ "status": 1 })))), STATUS_INVALID);

        assert_eq!(validation_message(parse_status("Archived")), STATUS_INVALID);
        assert_eq!(parse_status("Denied").unwrap(), MessageStatus::Denied);
    }

    #[test]
    fn message_id_must_be_an_integer() {
        assert_eq!(message_id("17").unwrap(), 17);
        assert_eq!(validation_message(message_id("abc")), MESSAGE_ID_REQUIRED);
        assert_eq!(validation_message(message_id("")), MESSAGE_ID_REQUIRED);
    }
}
