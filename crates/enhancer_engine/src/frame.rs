use serde_json::Value;

use crate::{ChannelEvent, Metadata};

/// `message` value that marks the completion frame.
pub const COMPLETION_SENTINEL: &str = "Processing complete!";

/// Interprets one push-channel text frame.
///
/// Returns `Ok(None)` for well-formed JSON that is neither a completion nor a
/// status frame; those are dropped so the server can add new shapes freely.
pub fn parse_frame(text: &str) -> Result<Option<ChannelEvent>, serde_json::Error> {
    let value: Value = serde_json::from_str(text)?;
    let Some(frame) = value.as_object() else {
        return Ok(None);
    };

    if frame.get("message").and_then(Value::as_str) == Some(COMPLETION_SENTINEL) {
        let metadata: Metadata = frame
            .get("metadata")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        let enhanced_video_url = frame
            .get("enhanced_video_url")
            .and_then(Value::as_str)
            .map(ToOwned::to_owned);
        return Ok(Some(ChannelEvent::Completion {
            metadata,
            enhanced_video_url,
        }));
    }

    if let Some(status) = frame.get("status").and_then(Value::as_object) {
        let flag = |key: &str| status.get(key).and_then(Value::as_bool).unwrap_or(false);
        return Ok(Some(ChannelEvent::Progress {
            enhancement: flag("enhancement"),
            metadata: flag("metadata"),
        }));
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn recognizes_completion() {
        let frame = json!({
            "message": "Processing complete!",
            "metadata": { "fps": 30.0, "width": 640 },
            "enhanced_video_url": "/static/storage/enhanced_abc.mp4",
        })
        .to_string();

        let Some(ChannelEvent::Completion {
            metadata,
            enhanced_video_url,
        }) = parse_frame(&frame).unwrap()
        else {
            panic!("expected completion");
        };
        assert_eq!(metadata.get("width"), Some(&json!(640)));
        assert_eq!(
            enhanced_video_url.as_deref(),
            Some("/static/storage/enhanced_abc.mp4")
        );
    }

    #[test]
    fn completion_tolerates_missing_fields() {
        let event = parse_frame(r#"{"message":"Processing complete!","metadata":null}"#).unwrap();
        assert_eq!(
            event,
            Some(ChannelEvent::Completion {
                metadata: Metadata::new(),
                enhanced_video_url: None,
            })
        );
    }

    #[test]
    fn recognizes_status_with_default_flags() {
        assert_eq!(
            parse_frame(r#"{"status":{"enhancement":true,"metadata":false}}"#).unwrap(),
            Some(ChannelEvent::Progress {
                enhancement: true,
                metadata: false
            })
        );
        assert_eq!(
            parse_frame(r#"{"status":{"metadata":true},"extra":1}"#).unwrap(),
            Some(ChannelEvent::Progress {
                enhancement: false,
                metadata: true
            })
        );
    }

    #[test]
    fn completion_wins_over_status() {
        let event = parse_frame(
            r#"{"message":"Processing complete!","status":{"enhancement":true,"metadata":true}}"#,
        )
        .unwrap();
        assert!(matches!(event, Some(ChannelEvent::Completion { .. })));
    }

    #[test]
    fn ignores_other_shapes() {
        for frame in [
            r#"{"message":"Processing started"}"#,
            r#"{"status":"queued"}"#,
            r#"{}"#,
            r#"[1,2,3]"#,
            r#""hello""#,
        ] {
            assert_eq!(parse_frame(frame).unwrap(), None, "frame {frame}");
        }
    }

    #[test]
    fn reports_malformed_json() {
        assert!(parse_frame("{not json").is_err());
        assert!(parse_frame("").is_err());
    }
}
