//! Alias and target-URL rules shared by the registry.

use crate::error::{AppError, Result};
use rand::Rng;

pub const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub const MAX_ALIAS_LENGTH: usize = 50;
pub const MAX_URL_LENGTH: usize = 2048;

/// Path segments owned by fixed routes; an alias with one of these names
/// could never be resolved.
pub const RESERVED: &[&str] = &["shorten", "urls", "health"];

/// Generate a random alphanumeric alias of the given length.
///
/// `thread_rng` is a CSPRNG, but the result is still only a candidate: the
/// insert decides whether it is free.
pub fn random_alias(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Normalize an optional caller-supplied alias. Blank means "generate one".
pub fn custom_alias(raw: Option<&str>) -> Result<Option<String>> {
    let alias = match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(a) => a,
        None => return Ok(None),
    };

    if alias.len() > MAX_ALIAS_LENGTH {
        return Err(AppError::Validation(format!(
            "Alias cannot exceed {MAX_ALIAS_LENGTH} characters"
        )));
    }
    if !is_valid_alias(alias) {
        return Err(AppError::Validation(
            "Alias may only contain letters, numbers, hyphens, and underscores".into(),
        ));
    }
    if RESERVED.contains(&alias) {
        return Err(AppError::Validation(format!("Alias '{alias}' is reserved")));
    }

    Ok(Some(alias.to_owned()))
}

/// `[a-zA-Z0-9_-]+`
pub fn is_valid_alias(alias: &str) -> bool {
    !alias.is_empty()
        && alias
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Check a target URL and return it trimmed.
pub fn full_url(raw: &str) -> Result<String> {
    let target = raw.trim();
    if target.is_empty() {
        return Err(AppError::Validation("URL cannot be empty".into()));
    }
    if target.len() > MAX_URL_LENGTH {
        return Err(AppError::Validation(format!(
            "URL cannot exceed {MAX_URL_LENGTH} characters"
        )));
    }
    if !target.starts_with("http://") && !target.starts_with("https://") {
        return Err(AppError::Validation(
            "URL must start with http:// or https://".into(),
        ));
    }
    if target.chars().any(char::is_control) {
        return Err(AppError::Validation("Must be a valid URL format".into()));
    }
    match url::Url::parse(target) {
        Ok(parsed) if parsed.host().is_some() => Ok(target.to_owned()),
        _ => Err(AppError::Validation("Must be a valid URL format".into())),
    }
}
