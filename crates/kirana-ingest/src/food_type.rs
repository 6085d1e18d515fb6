//! Veg / non-veg classification of a restaurant menu item.
//!
//! The raw column is free text ("Veg", "Non-Veg", "NV", "chicken", "Yes").
//! Matching works on whole tokens so a dish called "Eggplant Curry" is not
//! flagged non-veg for containing "egg".

use crate::coerce::AFFIRMATIVES;

const VEG_TOKENS: &[&str] = &["veg", "vegetarian", "pureveg", "v"];
const NON_VEG_TOKENS: &[&str] = &["nonveg", "nonvegetarian", "nv"];
const NEGATIVES: &[&str] = &["no", "false", "0", "n"];
const NON_VEG_WORDS: &[&str] = &[
    "non", "chicken", "mutton", "meat", "fish", "egg", "eggs", "prawn", "prawns",
];

/// Returns `true` if the item is vegetarian. Blank input is veg.
#[must_use]
pub fn is_veg(raw: &str) -> bool {
    let lower = raw.trim().to_lowercase();
    let cleaned: String = lower
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
        .collect();

    if VEG_TOKENS.contains(&cleaned.as_str()) || AFFIRMATIVES.contains(&cleaned.as_str()) {
        return true;
    }
    if NON_VEG_TOKENS.contains(&cleaned.as_str()) || NEGATIVES.contains(&cleaned.as_str()) {
        return false;
    }

    !lower
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| NON_VEG_WORDS.contains(&word))
}
