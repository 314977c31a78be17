//! Naming policies
//!
//! A naming policy is a pure transformation from an internal field name to
//! its externally visible wire-name. Applying the same policy to the same
//! name always yields the same wire-name; policies carry no state.

use serde::{Deserialize, Serialize};

/// Transformation from internal field name to wire-name
///
/// Field names are split into words on `_`, `-`, and lower-to-upper case
/// boundaries, then reassembled in the target convention.
///
/// # Example
///
/// ```
/// use strata_schema::NamingPolicy;
///
/// assert_eq!(NamingPolicy::CamelCase.apply("first_name"), "firstName");
/// assert_eq!(NamingPolicy::PascalCase.apply("first_name"), "FirstName");
/// assert_eq!(NamingPolicy::SnakeCase.apply("firstName"), "first_name");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NamingPolicy {
    /// Wire-name is the field name unchanged
    #[default]
    Identity,

    /// `first_name` becomes `firstName`
    CamelCase,

    /// `first_name` becomes `FirstName`
    PascalCase,

    /// `firstName` becomes `first_name`
    SnakeCase,
}

impl NamingPolicy {
    /// Apply the policy to an internal field name
    pub fn apply(&self, name: &str) -> String {
        match self {
            NamingPolicy::Identity => name.to_string(),
            NamingPolicy::CamelCase => {
                let mut out = String::with_capacity(name.len());
                for (i, word) in split_words(name).iter().enumerate() {
                    if i == 0 {
                        out.push_str(&word.to_lowercase());
                    } else {
                        push_capitalized(&mut out, word);
                    }
                }
                out
            }
            NamingPolicy::PascalCase => {
                let mut out = String::with_capacity(name.len());
                for word in split_words(name) {
                    push_capitalized(&mut out, &word);
                }
                out
            }
            NamingPolicy::SnakeCase => {
                let words = split_words(name);
                let mut out = String::with_capacity(name.len() + words.len());
                for (i, word) in words.iter().enumerate() {
                    if i > 0 {
                        out.push('_');
                    }
                    out.push_str(&word.to_lowercase());
                }
                out
            }
        }
    }
}

/// Split a field name into words on separators and case boundaries
fn split_words(name: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for ch in name.chars() {
        if ch == '_' || ch == '-' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
        } else if ch.is_uppercase() && prev_lower {
            words.push(std::mem::take(&mut current));
            current.push(ch);
            prev_lower = false;
        } else {
            prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
            current.push(ch);
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Append a word with its first character uppercased and the rest lowercased
fn push_capitalized(out: &mut String, word: &str) {
    let mut chars = word.chars();
    if let Some(first) = chars.next() {
        out.extend(first.to_uppercase());
        out.push_str(&chars.as_str().to_lowercase());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        assert_eq!(NamingPolicy::Identity.apply("first_name"), "first_name");
        assert_eq!(NamingPolicy::Identity.apply("firstName"), "firstName");
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(NamingPolicy::CamelCase.apply("first_name"), "firstName");
        assert_eq!(NamingPolicy::CamelCase.apply("age"), "age");
        assert_eq!(NamingPolicy::CamelCase.apply("inner-value"), "innerValue");
        assert_eq!(NamingPolicy::CamelCase.apply("FirstName"), "firstName");
    }

    #[test]
    fn test_pascal_case() {
        assert_eq!(NamingPolicy::PascalCase.apply("first_name"), "FirstName");
        assert_eq!(NamingPolicy::PascalCase.apply("firstName"), "FirstName");
    }

    #[test]
    fn test_snake_case() {
        assert_eq!(NamingPolicy::SnakeCase.apply("firstName"), "first_name");
        assert_eq!(NamingPolicy::SnakeCase.apply("first_name"), "first_name");
        assert_eq!(NamingPolicy::SnakeCase.apply("HTTPPort"), "httpport");
    }

    #[test]
    fn test_determinism() {
        for policy in [
            NamingPolicy::Identity,
            NamingPolicy::CamelCase,
            NamingPolicy::PascalCase,
            NamingPolicy::SnakeCase,
        ] {
            assert_eq!(policy.apply("unit_price"), policy.apply("unit_price"));
        }
    }

    #[test]
    fn test_digits_stay_in_word() {
        assert_eq!(NamingPolicy::CamelCase.apply("line_2_total"), "line2Total");
    }
}
