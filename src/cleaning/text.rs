//! Text cleaning

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    /// Characters dropped by [`TextAction::RemoveSpecial`]
    static ref SPECIAL_CHARS: Regex = Regex::new(r"[^a-zA-Z0-9\s]").unwrap();
}

/// One text-cleaning step
///
/// Steps always run in declaration order, whatever order they are requested in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextAction {
    Trim,
    Lowercase,
    Uppercase,
    Titlecase,
    RemoveSpecial,
}

impl TextAction {
    /// Apply this step to one value
    pub fn apply(&self, value: &str) -> String {
        match self {
            TextAction::Trim => value.trim().to_string(),
            TextAction::Lowercase => value.to_lowercase(),
            TextAction::Uppercase => value.to_uppercase(),
            TextAction::Titlecase => title_case(value),
            TextAction::RemoveSpecial => SPECIAL_CHARS.replace_all(value, "").into_owned(),
        }
    }
}

/// Upper-case the first letter of every word, lower-case the rest
///
/// A word starts at any letter that follows a non-letter.
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut after_letter = false;
    for c in value.chars() {
        if c.is_alphabetic() {
            if after_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            after_letter = true;
        } else {
            out.push(c);
            after_letter = false;
        }
    }
    out
}

/// Apply the requested steps in their fixed order
pub fn clean_text(value: &str, actions: &[TextAction]) -> String {
    let mut ordered = actions.to_vec();
    ordered.sort();
    ordered.dedup();

    ordered
        .iter()
        .fold(value.to_string(), |acc, action| action.apply(&acc))
}
