//! Sharded key generation
//!
//! Keys have the form `<s0>/<s1>/<s2>/<hash>/<basename>`: a 40-character
//! SHA-1 hash preceded by its first three hex characters as single-character
//! shard directories, followed by the sanitized display name. The hash is
//! seeded from process-local randomness, not file content — two uploads of
//! identical bytes land under different keys, so this is addressing, not
//! deduplication.

use sha1::{Digest, Sha1};
use std::sync::atomic::{AtomicU64, Ordering};

/// Maximum length of a sanitized file stem
pub const MAX_STEM_LEN: usize = 120;

/// Substitute stem for names that sanitize down to nothing
pub const EMPTY_STEM: &str = "no-file";

/// Per-process counter mixed into every hash
static SEQ: AtomicU64 = AtomicU64::new(0);

/// Generate a fresh sharded key for the given display name.
///
/// Every call produces a new hash, even for the same name. Collision
/// checking against the backend is the caller's job.
pub fn generate(basename: &str) -> String {
    let basename = sanitize(basename);

    let seq = SEQ.fetch_add(1, Ordering::Relaxed);
    let nonce: u64 = rand::random();

    let mut hasher = Sha1::new();
    hasher.update(std::process::id().to_le_bytes());
    hasher.update(seq.to_le_bytes());
    hasher.update(nonce.to_le_bytes());
    hasher.update(basename.as_bytes());
    let hash = hex::encode(hasher.finalize());

    let mut key = String::with_capacity(6 + hash.len() + 1 + basename.len());
    for c in hash[..3].chars() {
        key.push(c);
        key.push('/');
    }
    key.push_str(&hash);
    key.push('/');
    key.push_str(&basename);

    key
}

/// Sanitize a display name down to `[a-zA-Z0-9.\-_]`.
///
/// Spaces become hyphens and everything else outside the safe set is
/// dropped. The stem is capped at [`MAX_STEM_LEN`] characters and stripped
/// of leading and trailing `-`, `_` and `.`; a name with nothing left
/// becomes [`EMPTY_STEM`]. The extension survives, filtered through the
/// same character set.
///
/// ```
/// assert_eq!(stowage::key::sanitize("My Photo.JPG"), "My-Photo.JPG");
/// ```
pub fn sanitize(basename: &str) -> String {
    let (stem, extension) = split_name(basename);

    let mut stem = clean(stem);
    stem.truncate(MAX_STEM_LEN);
    let stem = stem.trim_matches(|c| matches!(c, '-' | '_' | '.'));
    let stem = if stem.is_empty() { EMPTY_STEM } else { stem };

    match extension.map(clean).filter(|e| !e.is_empty()) {
        Some(ext) => format!("{stem}.{ext}"),
        None => stem.to_string(),
    }
}

/// Split a display name into stem and extension on the last dot
fn split_name(name: &str) -> (&str, Option<&str>) {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => (stem, Some(ext)),
        _ => (name, None),
    }
}

/// Map spaces to hyphens and drop everything outside the safe set.
/// The output is pure ASCII, so byte-indexed truncation stays valid.
fn clean(part: &str) -> String {
    part.chars()
        .map(|c| if c == ' ' { '-' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect()
}
