//! Attribute normalization and similarity heuristics.
//!
//! Age strings are mapped onto the eight canonical brackets. Weapon names and
//! clothing phases are compared with [`is_similar`], a documented heuristic:
//! there is no ground truth for "the same weapon", so it can both over-merge
//! and under-merge on edge cases. The tables it consults live in
//! [`crate::vocabulary`].

use crate::vocabulary::{
    AGE_APPROXIMATORS, AGE_KEYWORDS, AGE_UNITS, MEANINGFUL_CHARS, NUMERAL_WORDS, STOP_WORDS,
    STRIP_SUFFIXES, SYNONYM_GROUPS,
};
use lorebook_core::AgeBracket;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

static ARABIC_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9０-９]+").expect("Valid numeral regex"));

static SPELLED_AGE: Lazy<Regex> = Lazy::new(|| {
    let numeral_chars: BTreeSet<char> = NUMERAL_WORDS
        .iter()
        .flat_map(|(word, _)| word.chars())
        .collect();
    let numeral_chars: String = numeral_chars.into_iter().collect();
    let pattern = format!(
        "([{}]+)(?:{})?(?:{})",
        numeral_chars,
        AGE_APPROXIMATORS.join("|"),
        AGE_UNITS.join("|"),
    );
    Regex::new(&pattern).expect("Valid spelled age regex")
});

/// Map a free-form age string to a canonical bracket.
///
/// Resolution order, first hit wins:
/// 1. the string already is a canonical label
/// 2. the first Arabic numeral (ASCII or full-width digits), bucketed
/// 3. a spelled-out numeral from 1 to 100 followed by an age unit (`二十五岁`)
/// 4. a descriptive keyword (`中年`, `elderly`, `white hair`)
/// 5. [`AgeBracket::Unknown`]
///
/// Total and deterministic: every input yields a bracket.
///
/// # Examples
///
/// ```
/// use lorebook_consolidation::normalize_age;
/// use lorebook_core::AgeBracket;
///
/// assert_eq!(normalize_age("26-40"), AgeBracket::Adult);
/// assert_eq!(normalize_age("约7岁"), AgeBracket::Child);
/// assert_eq!(normalize_age("三十来岁"), AgeBracket::Adult);
/// assert_eq!(normalize_age("满脸皱纹"), AgeBracket::Elderly);
/// assert_eq!(normalize_age("???"), AgeBracket::Unknown);
/// ```
pub fn normalize_age(raw: &str) -> AgeBracket {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return AgeBracket::Unknown;
    }

    if let Some(bracket) = AgeBracket::from_label(trimmed) {
        return bracket;
    }

    if let Some(years) = first_arabic_number(trimmed) {
        return AgeBracket::from_years(years);
    }

    if let Some(years) = spelled_age(trimmed) {
        return AgeBracket::from_years(years);
    }

    keyword_age(trimmed).unwrap_or(AgeBracket::Unknown)
}

fn first_arabic_number(text: &str) -> Option<u32> {
    let digits = ARABIC_NUMBER.find(text)?;
    let value = digits.as_str().chars().fold(0u64, |acc, c| {
        let digit = match c {
            '0'..='9' => c as u64 - '0' as u64,
            _ => c as u64 - '０' as u64,
        };
        acc.saturating_mul(10).saturating_add(digit)
    });
    Some(u32::try_from(value).unwrap_or(u32::MAX))
}

/// Value of the longest numeral-table prefix of each numeral run that is
/// followed by an age unit.
fn spelled_age(text: &str) -> Option<u32> {
    SPELLED_AGE.captures_iter(text).find_map(|captures| {
        let run = captures.get(1)?.as_str();
        NUMERAL_WORDS
            .iter()
            .find(|(word, _)| run.starts_with(word.as_str()))
            .map(|(_, value)| *value)
    })
}

fn keyword_age(text: &str) -> Option<AgeBracket> {
    let lower = text.to_lowercase();
    AGE_KEYWORDS
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, bracket)| *bracket)
}

/// Tuning for [`is_similar`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimilarityProfile {
    /// Largest length difference (in characters) at which a substring still
    /// counts as the same item
    pub max_length_gap: usize,
}

impl SimilarityProfile {
    /// Weapon names: "剑" and "长剑" match, "剑" and "青龙宝剑" do not.
    pub const WEAPON: SimilarityProfile = SimilarityProfile { max_length_gap: 2 };
    /// Clothing phases, which are longer and wordier than weapon names.
    pub const CLOTHING: SimilarityProfile = SimilarityProfile { max_length_gap: 4 };
}

/// Whether two weapon names or clothing phases probably refer to the same thing.
///
/// Checked in order:
/// 1. equal after trimming and lower-casing
/// 2. one contains the other and the length gap is within the profile
/// 3. both belong to the same synonym group
/// 4. after stripping temporal and descriptive suffixes, they share a core
///    word of at least two characters (see [`core_words`])
///
/// This is a heuristic, not a proof of identity. An empty string is only
/// similar to another empty string.
///
/// # Examples
///
/// ```
/// use lorebook_consolidation::{SimilarityProfile, is_similar};
///
/// assert!(is_similar("Blade", "Short Blade", SimilarityProfile::WEAPON));
/// assert!(is_similar("婚礼", "大婚", SimilarityProfile::CLOTHING));
/// assert!(is_similar("战斗时期", "战斗装束", SimilarityProfile::CLOTHING));
/// assert!(!is_similar("长剑", "短剑", SimilarityProfile::WEAPON));
/// ```
pub fn is_similar(a: &str, b: &str, profile: SimilarityProfile) -> bool {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();

    if a.is_empty() || b.is_empty() {
        return false;
    }
    if a == b {
        return true;
    }

    let gap = a.chars().count().abs_diff(b.chars().count());
    if (a.contains(&b) || b.contains(&a)) && gap <= profile.max_length_gap {
        return true;
    }

    let stripped_a = strip_suffixes(&a);
    let stripped_b = strip_suffixes(&b);

    if are_synonyms(&a, &b) || are_synonyms(stripped_a, stripped_b) {
        return true;
    }

    let words_b = core_words(stripped_b);
    core_words(stripped_a)
        .iter()
        .any(|word| word.chars().count() >= 2 && words_b.contains(word))
}

fn are_synonyms(a: &str, b: &str) -> bool {
    SYNONYM_GROUPS
        .iter()
        .any(|group| group.contains(&a) && group.contains(&b))
}

/// Remove trailing temporal and descriptive particles ("时期", "装束").
///
/// Never strips a string down to nothing.
pub fn strip_suffixes(text: &str) -> &str {
    let mut current = text.trim();
    'outer: loop {
        for suffix in STRIP_SUFFIXES {
            if let Some(rest) = current.strip_suffix(suffix) {
                let rest = rest.trim_end();
                if !rest.is_empty() {
                    current = rest;
                    continue 'outer;
                }
            }
        }
        return current;
    }
}

fn is_cjk(c: char) -> bool {
    matches!(
        c,
        '\u{3400}'..='\u{4DBF}'
            | '\u{4E00}'..='\u{9FFF}'
            | '\u{F900}'..='\u{FAFF}'
            | '\u{20000}'..='\u{2A6DF}'
    )
}

/// Core words of a (lower-cased) name or phase.
///
/// Ideograph runs contribute every contiguous substring of two to four
/// characters plus any single character from
/// [`MEANINGFUL_CHARS`](crate::vocabulary::MEANINGFUL_CHARS). Other
/// alphanumeric runs are words; each word that is not a stop word
/// contributes itself.
///
/// # Examples
///
/// ```
/// use lorebook_consolidation::core_words;
///
/// let words = core_words("宝剑");
/// assert!(words.contains("宝剑"));
/// assert!(words.contains("剑"));
///
/// let words = core_words("short blade of the north");
/// assert!(words.contains("blade"));
/// assert!(!words.contains("the"));
/// ```
pub fn core_words(text: &str) -> BTreeSet<String> {
    let mut words = BTreeSet::new();
    let mut cjk_run: Vec<char> = Vec::new();
    let mut latin_word = String::new();

    let flush_cjk = |run: &mut Vec<char>, words: &mut BTreeSet<String>| {
        for len in 2..=4usize.min(run.len()) {
            for window in run.windows(len) {
                words.insert(window.iter().collect());
            }
        }
        for c in run.iter().filter(|c| MEANINGFUL_CHARS.contains(*c)) {
            words.insert(c.to_string());
        }
        run.clear();
    };
    let flush_latin = |word: &mut String, words: &mut BTreeSet<String>| {
        if !word.is_empty() && !STOP_WORDS.contains(word.as_str()) {
            words.insert(word.clone());
        }
        word.clear();
    };

    for c in text.chars() {
        if is_cjk(c) {
            flush_latin(&mut latin_word, &mut words);
            cjk_run.push(c);
        } else if c.is_alphanumeric() {
            flush_cjk(&mut cjk_run, &mut words);
            latin_word.extend(c.to_lowercase());
        } else {
            flush_cjk(&mut cjk_run, &mut words);
            flush_latin(&mut latin_word, &mut words);
        }
    }
    flush_cjk(&mut cjk_run, &mut words);
    flush_latin(&mut latin_word, &mut words);

    words
}
