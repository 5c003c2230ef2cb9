use std::collections::HashSet;

use crate::models::{FilterCriteria, Profile};

/// Computes the profiles the list screen shows, in input order.
///
/// With no search text and no selected categories the list falls back to
/// profiles sharing a display name with `primary_categories`. Otherwise every
/// active predicate must hold. Profiles without an image never show.
pub fn compute_visible(
    profiles: &[Profile],
    primary_categories: &HashSet<String>,
    criteria: &FilterCriteria,
) -> Vec<Profile> {
    if criteria.is_empty() {
        return profiles
            .iter()
            .filter(|p| p.has_image() && shares_primary_category(p, primary_categories))
            .cloned()
            .collect();
    }

    profiles
        .iter()
        .filter(|p| {
            matches_selected_categories(p, criteria)
                && matches_search(p, &criteria.search_text)
                && p.has_image()
        })
        .cloned()
        .collect()
}

fn shares_primary_category(profile: &Profile, primary_categories: &HashSet<String>) -> bool {
    profile
        .categories
        .iter()
        .any(|c| primary_categories.contains(c.display_name()))
}

fn matches_selected_categories(profile: &Profile, criteria: &FilterCriteria) -> bool {
    criteria.selected_categories.is_empty()
        || profile
            .categories
            .iter()
            .any(|c| criteria.selected_categories.contains(c.name()))
}

fn matches_search(profile: &Profile, needle: &str) -> bool {
    needle.is_empty()
        || contains_ignore_case(&profile.first_name, needle)
        || contains_ignore_case(&profile.last_name, needle)
}

/// Substring test comparing char by char through simple upper- and
/// lowercase mappings, so `ı` and `i` both match `I`.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    let needle: Vec<char> = needle.chars().collect();
    if needle.is_empty() {
        return true;
    }
    let haystack: Vec<char> = haystack.chars().collect();
    haystack.windows(needle.len()).any(|window| {
        window
            .iter()
            .zip(&needle)
            .all(|(&a, &b)| chars_eq_ignore_case(a, b))
    })
}

fn chars_eq_ignore_case(a: char, b: char) -> bool {
    if a == b {
        return true;
    }
    let (upper_a, upper_b) = (simple_upper(a), simple_upper(b));
    upper_a == upper_b || simple_lower(upper_a) == simple_lower(upper_b)
}

// Mappings that expand to several chars (e.g. `ß` -> `SS`) leave the char as is.
fn simple_upper(c: char) -> char {
    let mut mapped = c.to_uppercase();
    match (mapped.next(), mapped.next()) {
        (Some(u), None) => u,
        _ => c,
    }
}

fn simple_lower(c: char) -> char {
    let mut mapped = c.to_lowercase();
    match (mapped.next(), mapped.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

/// Renders primary categories as `#A, #B`, normalising any marker already
/// present on the display names.
pub fn primary_categories_label<S: AsRef<str>>(primary_categories: &[S]) -> String {
    primary_categories
        .iter()
        .map(|name| format!("#{}", name.as_ref().replace('#', "").trim()))
        .collect::<Vec<_>>()
        .join(", ")
}
