/// Get the current time as an RFC 3339 string.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Get the current time as a Unix timestamp (seconds).
pub fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}
