//! Maps raised failures onto a fixed taxonomy the UI can act on.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Network,
    RateLimit,
    Validation,
    Server,
    Unknown,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionError {
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    pub message: &'static str,
    pub retryable: bool,
}

/// Classify a failure by its message text (case-insensitive substring cues).
///
/// Never panics; an empty message yields the unknown classification.
pub fn classify(message: &str) -> SubmissionError {
    if message.is_empty() {
        return SubmissionError {
            kind: ErrorKind::Unknown,
            message: "An unexpected error occurred",
            retryable: true,
        };
    }

    let lower = message.to_lowercase();

    if lower.contains("fetch") || lower.contains("network") || lower.contains("timeout") {
        return SubmissionError {
            kind: ErrorKind::Network,
            message: "Network connection failed. Please check your internet and try again.",
            retryable: true,
        };
    }

    if lower.contains("429") || lower.contains("rate") {
        return SubmissionError {
            kind: ErrorKind::RateLimit,
            message: "Too many requests. Please wait a few minutes before trying again.",
            retryable: true,
        };
    }

    if lower.contains("validation") || lower.contains("invalid") {
        return SubmissionError {
            kind: ErrorKind::Validation,
            message: "Please check your information and try again.",
            retryable: false,
        };
    }

    if lower.contains("500") || lower.contains("server") {
        return SubmissionError {
            kind: ErrorKind::Server,
            message: "Our server is experiencing issues. Please try again later or call us.",
            retryable: true,
        };
    }

    SubmissionError {
        kind: ErrorKind::Unknown,
        message: "Failed to send your request. Please try again or contact us directly.",
        retryable: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_cues() {
        let e = classify("Failed to fetch");
        assert_eq!(e.kind, ErrorKind::Network);
        assert!(e.retryable);
        assert_eq!(classify("request TIMEOUT exceeded").kind, ErrorKind::Network);
    }

    #[test]
    fn rate_limit_cues() {
        assert_eq!(classify("Error 429: too many").kind, ErrorKind::RateLimit);
        assert_eq!(classify("rate limited").kind, ErrorKind::RateLimit);
    }

    #[test]
    fn validation_is_not_retryable() {
        let e = classify("Invalid email format");
        assert_eq!(e.kind, ErrorKind::Validation);
        assert!(!e.retryable);
    }

    #[test]
    fn server_cues() {
        assert_eq!(classify("HTTP 500").kind, ErrorKind::Server);
        assert_eq!(classify("internal SERVER error").kind, ErrorKind::Server);
    }

    #[test]
    fn empty_is_unknown() {
        let e = classify("");
        assert_eq!(e.kind, ErrorKind::Unknown);
        assert!(e.retryable);
    }

    #[test]
    fn unmatched_is_unknown_and_retryable() {
        let e = classify("something odd happened");
        assert_eq!(e.kind, ErrorKind::Unknown);
        assert!(e.retryable);
    }

    #[test]
    fn cue_order_prefers_network_over_server() {
        // "network error from server" hits the network branch first
        assert_eq!(classify("network error from server").kind, ErrorKind::Network);
    }
}
