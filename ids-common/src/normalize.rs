//! Route string and airport code normalization
//!
//! Every comparison the resolution engine makes runs on the output of
//! these functions, so both must be idempotent and total (no input,
//! including the empty string, is an error).

/// Canonicalize a free-form route string: collapse whitespace runs to
/// single spaces and uppercase.
pub fn normalize_route(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Canonicalize an airport identifier: uppercase, and strip the leading
/// country prefix from exactly-4-character US/Canada ICAO codes (KDTW
/// becomes DTW, CYYZ becomes YYZ).
///
/// Codes of any other length are returned uppercased but otherwise
/// unchanged; stripping on length != 4 would corrupt 3-letter domestic
/// codes like DTW.
pub fn normalize_airport(code: &str) -> String {
    let code = code.trim().to_uppercase();
    if code.chars().count() == 4 && (code.starts_with('K') || code.starts_with('C')) {
        code.chars().skip(1).collect()
    } else {
        code
    }
}
