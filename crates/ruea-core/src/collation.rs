//! Spanish-aware string ordering
//!
//! Facet values and name-ordered series are displayed in the order a Spanish
//! reader expects: accents do not move a word away from its unaccented
//! spelling, case is secondary, and `ñ` sorts after `n`.

use std::cmp::Ordering;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Decompose and drop combining marks ("Sebastián" -> "Sebastian")
pub fn strip_diacritics(input: &str) -> String {
    input.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Primary collation weight of a single character
fn primary_key(c: char) -> (char, u8) {
    let lower = c.to_lowercase().next().unwrap_or(c);
    if lower == 'ñ' {
        return ('n', 1);
    }

    let base = lower.nfd().next().unwrap_or(lower);
    (base, 0)
}

/// Compare two strings using Spanish collation rules.
///
/// Primary level ignores accents and case (with `ñ` as its own letter after
/// `n`), secondary level puts unaccented before accented, tertiary level puts
/// lowercase before uppercase. Identical strings compare equal.
pub fn spanish_cmp(a: &str, b: &str) -> Ordering {
    let primary = a.chars().map(primary_key).cmp(b.chars().map(primary_key));
    if primary != Ordering::Equal {
        return primary;
    }

    let secondary = strip_diacritics(a)
        .to_lowercase()
        .cmp(&strip_diacritics(b).to_lowercase())
        .then_with(|| accent_weight(a).cmp(&accent_weight(b)));
    if secondary != Ordering::Equal {
        return secondary;
    }

    let tertiary = a
        .chars()
        .map(char::is_uppercase)
        .cmp(b.chars().map(char::is_uppercase));

    tertiary.then_with(|| a.cmp(b))
}

fn accent_weight(s: &str) -> Vec<bool> {
    s.chars()
        .map(|c| c.nfd().any(is_combining_mark))
        .collect()
}

/// Sort strings in place using Spanish collation
pub fn sort_spanish(values: &mut [String]) {
    values.sort_by(|a, b| spanish_cmp(a, b));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_diacritics() {
        assert_eq!(strip_diacritics("San Sebastián"), "San Sebastian");
        assert_eq!(strip_diacritics("Área de Expansión"), "Area de Expansion");
        assert_eq!(strip_diacritics("pingüino"), "pinguino");
    }

    #[test]
    fn test_accents_sort_next_to_base_letters() {
        let mut values: Vec<String> = ["zona", "Ávila", "avena", "bosque", "árbol"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        sort_spanish(&mut values);
        assert_eq!(values, vec!["árbol", "avena", "Ávila", "bosque", "zona"]);
    }

    #[test]
    fn test_enye_after_n() {
        let mut values: Vec<String> = ["ñame", "oca", "nube"].iter().map(|s| s.to_string()).collect();
        sort_spanish(&mut values);
        assert_eq!(values, vec!["nube", "ñame", "oca"]);
    }

    #[test]
    fn test_secondary_and_tertiary_levels() {
        assert_eq!(spanish_cmp("peru", "perú"), Ordering::Less);
        assert_eq!(spanish_cmp("lima", "Lima"), Ordering::Less);
        assert_eq!(spanish_cmp("dos", "dos"), Ordering::Equal);
        assert_eq!(spanish_cmp("dos", "uno"), Ordering::Less);
    }
}
