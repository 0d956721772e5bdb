//! Deletion authorization: the post's stored secret is the sole
//! credential. Comparison is plain string equality, matching the
//! behaviour this service is specified to preserve; it is not a
//! constant-time check and secrets are shared per-post tokens, not
//! account credentials.

/// True when the supplied secret matches the stored one. A post with no
/// stored secret can never be deleted this way.
pub fn authorize(stored: Option<&str>, supplied: &str) -> bool {
    match stored {
        Some(secret) => secret == supplied,
        None => false,
    }
}
