//! Request-level checks for uploads, applied before any staging work.

use axum::http::{header::CONTENT_LENGTH, HeaderMap};
use tubely_core::AppError;

/// Strip parameters (e.g. `; codecs=...`) and lowercase a media type.
pub fn normalize_mime_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase()
}

/// Check the declared media type against the allow-list and return it normalized.
pub fn validate_content_type(content_type: &str, allowed: &[String]) -> Result<String, AppError> {
    let normalized = normalize_mime_type(content_type);
    if normalized.is_empty() {
        return Err(AppError::BadRequest(
            "Missing content type for video file".to_string(),
        ));
    }

    if !allowed.iter().any(|a| normalize_mime_type(a) == normalized) {
        return Err(AppError::BadRequest(format!(
            "Invalid file type '{}'. Allowed types: {}",
            normalized,
            allowed.join(", ")
        )));
    }

    Ok(normalized)
}

/// Reject requests whose declared length already exceeds the ceiling.
///
/// Chunked bodies carry no length; the staging loop enforces the limit for those.
pub fn check_content_length(headers: &HeaderMap, max_size: usize) -> Result<(), AppError> {
    let declared = headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());

    match declared {
        Some(len) if len > max_size as u64 => Err(AppError::BadRequest(format!(
            "Upload exceeds the maximum size of {} bytes",
            max_size
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn allowed() -> Vec<String> {
        vec!["video/mp4".to_string()]
    }

    #[test]
    fn test_normalize_mime_type() {
        assert_eq!(normalize_mime_type("video/mp4"), "video/mp4");
        assert_eq!(normalize_mime_type(" Video/MP4 ; codecs=avc1"), "video/mp4");
        assert_eq!(normalize_mime_type(""), "");
    }

    #[test]
    fn test_validate_content_type() {
        assert_eq!(
            validate_content_type("video/mp4; codecs=avc1", &allowed()).unwrap(),
            "video/mp4"
        );
        assert!(matches!(
            validate_content_type("video/quicktime", &allowed()),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            validate_content_type("", &allowed()),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_check_content_length() {
        let mut headers = HeaderMap::new();
        assert!(check_content_length(&headers, 10).is_ok());

        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("10"));
        assert!(check_content_length(&headers, 10).is_ok());

        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("11"));
        assert!(matches!(
            check_content_length(&headers, 10),
            Err(AppError::BadRequest(_))
        ));
    }
}
