//! `${VAR}` placeholder substitution
//!
//! Manifest `proxyTarget` values may reference process environment
//! variables. Substitution is a pure string-template step resolved once
//! at load time; unset variables resolve to the empty string.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref VAR_REGEX: Regex = Regex::new(r"\$\{([^}]*)\}").unwrap();
}

/// Replace every `${VAR}` occurrence with the value of `VAR` from the
/// process environment, or the empty string when unset.
pub fn substitute_env(template: &str) -> String {
    VAR_REGEX
        .replace_all(template, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_default()
        })
        .into_owned()
}
