use sha2::{Digest, Sha256};

/// Normalize a text fragment for fingerprinting.
///
/// Lowercases, drops everything except alphanumerics and whitespace, and
/// collapses runs of whitespace, so "Acme, Inc." and "ACME  Inc" agree.
pub fn normalize_for_hash(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// SHA256 of normalized text, hex encoded.
pub fn generate_content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalize_for_hash(text).as_bytes());
    hex::encode(hasher.finalize())
}

/// Fingerprint of several fields hashed together.
///
/// Each field is normalized on its own and joined with a separator that
/// normalization can never produce, so moving words between fields
/// changes the hash.
pub fn generate_fields_hash<'a, I>(fields: I) -> String
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let joined = fields
        .into_iter()
        .map(|field| field.map(normalize_for_hash).unwrap_or_default())
        .collect::<Vec<_>>()
        .join("|");

    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hex::encode(hasher.finalize())
}
