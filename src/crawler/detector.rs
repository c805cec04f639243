//! Anti-bot challenge detection
//!
//! Best-effort heuristic over the raw response body. A missed challenge falls
//! through to normal extraction; a false positive only costs a browser render.

/// Markers matched without regard to case (attribute and class names)
const CASE_INSENSITIVE_MARKERS: &[&str] = &["cf-browser-verification", "challenge-platform"];

/// Markers matched exactly (human-readable interstitial titles)
const EXACT_MARKERS: &[&str] = &["Attention Required", "Just a moment..."];

/// Returns true if the content looks like an automation challenge page
pub fn is_challenge(content: &str) -> bool {
    if EXACT_MARKERS.iter().any(|marker| content.contains(marker)) {
        return true;
    }

    let lowered = content.to_lowercase();
    CASE_INSENSITIVE_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
}
