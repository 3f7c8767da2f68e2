//! Session key filtering.
//!
//! Keys carrying the synthetic-session suffix belong to carpet bots and
//! other non-interactive entities. They are rejected at every entry point
//! before any timer or recorder state is touched.

/// Case-insensitive suffix marking a synthetic (bot) session key.
pub(crate) const SYNTHETIC_SUFFIX: &str = "_fake";

/// Returns `true` if `key` names a synthetic session.
///
/// The match is case-insensitive: `"Steve_fake"`, `"steve_FAKE"` and
/// `"STEVE_Fake"` are all synthetic.
pub fn is_synthetic(key: &str) -> bool {
    key.to_ascii_lowercase().ends_with(SYNTHETIC_SUFFIX)
}
