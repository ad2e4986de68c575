//! Deterministic, URL-safe slugs from bilingual titles.
//!
//! The `slug` crate transliterates Vietnamese diacritics on its own ("Tin
//! tức" becomes `tin-tuc`), so derivation is a thin wrapper. Callers provide
//! a uniqueness predicate to avoid collisions against whatever set they know
//! about (a loaded list page, a server check) while the generation logic
//! stays pure.

use slug::slugify;
use thiserror::Error;

const MAX_SUFFIX_ATTEMPTS: usize = 32;

/// Errors that can occur while generating a slug.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlugError {
    #[error("slug source text is empty")]
    EmptyInput,
    #[error("failed to derive slug from `{input}`")]
    Unrepresentable { input: String },
    #[error("exhausted attempts to find a unique slug for `{base}`")]
    Exhausted { base: String },
}

/// Derive a base slug from the provided human-readable text.
pub fn derive_slug(input: &str) -> Result<String, SlugError> {
    if input.trim().is_empty() {
        return Err(SlugError::EmptyInput);
    }

    let candidate = slugify(input);
    if candidate.is_empty() {
        return Err(SlugError::Unrepresentable {
            input: input.to_string(),
        });
    }

    Ok(candidate)
}

/// Produce a slug that does not collide according to the supplied predicate.
///
/// The `is_unique` closure must return `true` when the provided slug does not
/// already exist. Collisions retry with a monotonic suffix (`-2`, `-3`, …).
pub fn generate_unique_slug<F>(input: &str, mut is_unique: F) -> Result<String, SlugError>
where
    F: FnMut(&str) -> bool,
{
    let base = derive_slug(input)?;

    if is_unique(&base) {
        return Ok(base);
    }

    for attempt in 2..=MAX_SUFFIX_ATTEMPTS + 1 {
        let candidate = format!("{base}-{attempt}");
        if is_unique(&candidate) {
            return Ok(candidate);
        }
    }

    Err(SlugError::Exhausted { base })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_slug_transliterates_vietnamese() {
        assert_eq!(derive_slug("Tin tức").expect("slug"), "tin-tuc");
        assert_eq!(
            derive_slug("Bài viết đầu tiên").expect("slug"),
            "bai-viet-dau-tien"
        );
    }

    #[test]
    fn empty_input_is_rejected() {
        assert_eq!(derive_slug("   "), Err(SlugError::EmptyInput));
    }

    #[test]
    fn generate_unique_slug_appends_counter() {
        let mut existing = vec!["tin-tuc".to_string()];
        let slug = generate_unique_slug("Tin tức", |candidate| {
            if existing.contains(&candidate.to_string()) {
                false
            } else {
                existing.push(candidate.to_string());
                true
            }
        })
        .expect("unique slug");

        assert_eq!(slug, "tin-tuc-2");
    }

    #[test]
    fn generate_unique_slug_exhausted() {
        let result =
            generate_unique_slug("Tin tức", |_| false).expect_err("should exhaust attempts");
        assert_eq!(
            result,
            SlugError::Exhausted {
                base: "tin-tuc".to_string()
            }
        );
    }
}
