//! Ordering of dotted SOP version strings.

use std::cmp::Ordering;

/// Compare two version strings.
///
/// When both sides are dot-separated unsigned integers ("1.10", "2"), they
/// compare numerically component by component, so "1.10" sorts after "1.9"
/// and "1.0" after "1". Anything else falls back to plain string order.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    match (numeric_parts(a), numeric_parts(b)) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        _ => a.cmp(b),
    }
}

fn numeric_parts(v: &str) -> Option<Vec<u64>> {
    v.split('.').map(|p| p.parse::<u64>().ok()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_components_compare_as_numbers() {
        assert_eq!(compare_versions("1.9", "1.10"), Ordering::Less);
        assert_eq!(compare_versions("2", "1.99"), Ordering::Greater);
        assert_eq!(compare_versions("1", "1.0"), Ordering::Less);
        assert_eq!(compare_versions("1.4", "1.4"), Ordering::Equal);
    }

    #[test]
    fn non_numeric_falls_back_to_lexical() {
        assert_eq!(compare_versions("1.4-draft", "1.4"), Ordering::Greater);
        assert_eq!(compare_versions("a", "b"), Ordering::Less);
        assert_eq!(compare_versions("", "1"), Ordering::Less);
    }
}
