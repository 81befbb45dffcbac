//! Canonical keys for noisy categorical values
//!
//! The upstream dataset spells the same place many ways: numbered prefixes
//! ("12 - "), accents, case, and category labels baked into the value
//! ("Corregimiento de ..."). Grouping on the raw text would split one place
//! into several buckets, so client-side counts go through these functions.

use once_cell::sync::Lazy;
use regex::Regex;
use ruea_core::{strip_diacritics, FilterField};

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static ORDINAL_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\s*-\s*").unwrap());
static CORREGIMIENTO_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^corregimiento(\s+de)?\s+").unwrap());
static VEREDA_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^veredas?(\s+de)?\s+").unwrap());
static EXPANSION_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^area\s+de\s+expansion\s+").unwrap());

/// Normalization family for a categorical field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Normalizer {
    #[default]
    Generic,
    Corregimiento,
    Vereda,
}

impl Normalizer {
    /// The normalizer appropriate for grouping on `field`
    pub fn for_field(field: FilterField) -> Self {
        match field {
            FilterField::Corregimiento => Normalizer::Corregimiento,
            FilterField::Vereda => Normalizer::Vereda,
            _ => Normalizer::Generic,
        }
    }

    pub fn apply(&self, value: &str) -> String {
        match self {
            Normalizer::Generic => normalize_generic(value),
            Normalizer::Corregimiento => normalize_corregimiento(value),
            Normalizer::Vereda => normalize_vereda(value),
        }
    }
}

/// Strip diacritics, lower-case, trim and collapse whitespace runs
pub fn normalize_generic(value: &str) -> String {
    let lowered = strip_diacritics(&value.to_lowercase()).to_lowercase();
    WHITESPACE.replace_all(lowered.trim(), " ").into_owned()
}

/// Generic normalization, then ordinal prefix, then "corregimiento [de]" label
pub fn normalize_corregimiento(value: &str) -> String {
    strip_to_fixpoint(value, &[&ORDINAL_PREFIX, &CORREGIMIENTO_LABEL])
}

/// Generic normalization, then ordinal prefix, then "vereda(s) [de]" and
/// "area de expansion" labels
pub fn normalize_vereda(value: &str) -> String {
    strip_to_fixpoint(value, &[&ORDINAL_PREFIX, &VEREDA_LABEL, &EXPANSION_LABEL])
}

/// Apply the generic normalization followed by each prefix pattern in order,
/// repeating until nothing changes.
///
/// A single pass is not idempotent on values like "vereda vereda x" or
/// "01 - 02 - x"; repeating makes `f(f(x)) == f(x)` hold for every input.
fn strip_to_fixpoint(value: &str, patterns: &[&Regex]) -> String {
    let mut current = normalize_generic(value);

    loop {
        let mut next = current.clone();
        for pattern in patterns {
            next = pattern.replace(&next, "").trim().to_string();
        }

        if next == current {
            return current;
        }
        current = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_generic() {
        assert_eq!(normalize_generic("  San   Sebastián \t"), "san sebastian");
        assert_eq!(normalize_generic("ÑAME"), "name");
        assert_eq!(normalize_generic(""), "");
        assert_eq!(normalize_generic("   "), "");
    }

    #[test]
    fn test_corregimiento_labels() {
        assert_eq!(
            normalize_corregimiento("12 - Corregimiento de San Sebastián"),
            "san sebastian"
        );
        assert_eq!(normalize_corregimiento("80-Corregimiento Santa Elena"), "santa elena");
        assert_eq!(normalize_corregimiento("Corregimiento"), "corregimiento");
        assert_eq!(normalize_corregimiento("Altavista"), "altavista");
    }

    #[test]
    fn test_vereda_labels() {
        assert_eq!(normalize_vereda("03 - Vereda El Plan"), "el plan");
        assert_eq!(normalize_vereda("Area de Expansion La Loma"), "la loma");
        assert_eq!(normalize_vereda("Área de Expansión  La Loma"), "la loma");
        assert_eq!(normalize_vereda("Veredas de Mazo"), "mazo");
        assert_eq!(normalize_vereda("07 - Vereda Área de Expansión Belén"), "belen");
    }

    #[test]
    fn test_normalizers_are_idempotent() {
        let inputs = [
            "12 - Corregimiento de San Sebastián",
            "03 - Vereda El Plan",
            "Area de Expansion La Loma",
            "vereda vereda x",
            "01 - 02 - corregimiento corregimiento de y",
            "  ÁRBOL\u{00A0}  Grande ",
            "İstanbul",
            "-",
            "1 -",
            "",
        ];

        for normalizer in [Normalizer::Generic, Normalizer::Corregimiento, Normalizer::Vereda] {
            for input in inputs {
                let once = normalizer.apply(input);
                assert_eq!(normalizer.apply(&once), once, "{:?} on {:?}", normalizer, input);
            }
        }
    }

    const WORDS: [&str; 10] = [
        "vereda",
        "Veredas",
        "corregimiento",
        "Corregimiento de",
        "de",
        "Área de Expansión",
        "12 -",
        "7-",
        "San Sebastián",
        "El Plan",
    ];
    const SPACES: [char; 5] = [' ', '\t', '\n', '\u{00A0}', '\u{2003}'];
    const RANGES: [(u32, u32); 3] = [(0x20, 0x7f), (0xa0, 0x180), (0x391, 0x3ca)];

    fn random_value(rng: &mut StdRng) -> String {
        let mut value = String::new();
        for _ in 0..rng.gen_range(0..8) {
            match rng.gen_range(0..5) {
                0 => value.push_str(WORDS[rng.gen_range(0..WORDS.len())]),
                1 => value.push(SPACES[rng.gen_range(0..SPACES.len())]),
                2 => value.push_str(&format!("{} - ", rng.gen_range(0u32..100))),
                3 => value.extend(char::from_u32(rng.gen_range(0x300..0x370))),
                _ => {
                    let (low, high) = RANGES[rng.gen_range(0..RANGES.len())];
                    value.extend(char::from_u32(rng.gen_range(low..high)));
                }
            }
        }
        value
    }

    #[test]
    fn test_generated_values_are_idempotent() {
        let mut rng = StdRng::seed_from_u64(0x5eed);

        for _ in 0..5_000 {
            let input = random_value(&mut rng);
            for normalizer in [Normalizer::Generic, Normalizer::Corregimiento, Normalizer::Vereda] {
                let once = normalizer.apply(&input);
                assert_eq!(normalizer.apply(&once), once, "{:?} on {:?}", normalizer, input);
            }
        }
    }

    #[test]
    fn test_for_field() {
        assert_eq!(Normalizer::for_field(FilterField::Vereda), Normalizer::Vereda);
        assert_eq!(Normalizer::for_field(FilterField::Corregimiento), Normalizer::Corregimiento);
        assert_eq!(Normalizer::for_field(FilterField::Sexo), Normalizer::Generic);
    }
}
