//! Lookup tables behind the attribute normalizer.
//!
//! Everything here is plain data so the heuristics can be tuned without
//! touching the matching code in [`crate::normalize`]. Entries are matched
//! case-insensitively; English entries are stored lower-case.

use lorebook_core::AgeBracket;
use once_cell::sync::Lazy;
use std::collections::HashSet;

// ============================================================================
// AGE
// ============================================================================

/// Units that must follow a spelled-out numeral for it to count as an age.
pub static AGE_UNITS: &[&str] = &["周岁", "岁"];

/// Approximators allowed between a numeral and its unit ("三十来岁").
pub static AGE_APPROXIMATORS: &[&str] = &["多", "来", "余"];

const DIGITS: [&str; 10] = ["", "一", "二", "三", "四", "五", "六", "七", "八", "九"];

/// Spelled-out numerals 1 through 100 with their values.
///
/// Covers the regular forms (`一`…`十`, `十一`…`十九`, `二十`…`九十九`,
/// `一百`/`百`), `两` for two, and the literary `廿` (20s) and `卅` (30s).
/// Sorted longest first.
pub static NUMERAL_WORDS: Lazy<Vec<(String, u32)>> = Lazy::new(|| {
    let mut table: Vec<(String, u32)> = Vec::with_capacity(140);

    for value in 1..=9u32 {
        table.push((DIGITS[value as usize].to_string(), value));
    }
    table.push(("两".to_string(), 2));
    table.push(("十".to_string(), 10));
    for unit in 1..=9u32 {
        table.push((format!("十{}", DIGITS[unit as usize]), 10 + unit));
    }
    for tens in 2..=9u32 {
        table.push((format!("{}十", DIGITS[tens as usize]), tens * 10));
        for unit in 1..=9u32 {
            table.push((
                format!("{}十{}", DIGITS[tens as usize], DIGITS[unit as usize]),
                tens * 10 + unit,
            ));
        }
    }
    table.push(("廿".to_string(), 20));
    table.push(("卅".to_string(), 30));
    for unit in 1..=9u32 {
        table.push((format!("廿{}", DIGITS[unit as usize]), 20 + unit));
        table.push((format!("卅{}", DIGITS[unit as usize]), 30 + unit));
    }
    table.push(("一百".to_string(), 100));
    table.push(("百".to_string(), 100));

    table.sort_by(|a, b| b.0.chars().count().cmp(&a.0.chars().count()));
    table
});

/// Descriptive terms mapped to the bracket they connote, most specific first.
///
/// The first entry contained in the input wins, so compound terms
/// ("middle-aged", "未成年") are listed before the words they contain.
pub static AGE_KEYWORDS: &[(&str, AgeBracket)] = &[
    // Extreme old age
    ("centenarian", AgeBracket::Aged),
    ("nonagenarian", AgeBracket::Aged),
    ("octogenarian", AgeBracket::Aged),
    ("百岁", AgeBracket::Aged),
    ("耄耋", AgeBracket::Aged),
    ("鲐背", AgeBracket::Aged),
    ("期颐", AgeBracket::Aged),
    // Infancy
    ("newborn", AgeBracket::Infant),
    ("infant", AgeBracket::Infant),
    ("toddler", AgeBracket::Infant),
    ("baby", AgeBracket::Infant),
    ("襁褓", AgeBracket::Infant),
    ("婴儿", AgeBracket::Infant),
    ("婴孩", AgeBracket::Infant),
    ("幼儿", AgeBracket::Infant),
    ("奶娃", AgeBracket::Infant),
    ("宝宝", AgeBracket::Infant),
    // Middle age, before "aged" and "年"
    ("middle-aged", AgeBracket::MiddleAged),
    ("middle aged", AgeBracket::MiddleAged),
    ("中年", AgeBracket::MiddleAged),
    ("不惑", AgeBracket::MiddleAged),
    ("知天命", AgeBracket::MiddleAged),
    ("大叔", AgeBracket::MiddleAged),
    ("大婶", AgeBracket::MiddleAged),
    // Minors, before "成年"
    ("未成年", AgeBracket::Youth),
    ("teenager", AgeBracket::Youth),
    ("adolescent", AgeBracket::Youth),
    // Childhood
    ("childhood", AgeBracket::Child),
    ("child", AgeBracket::Child),
    ("kid", AgeBracket::Child),
    ("儿童", AgeBracket::Child),
    ("孩童", AgeBracket::Child),
    ("小孩", AgeBracket::Child),
    ("孩子", AgeBracket::Child),
    ("童年", AgeBracket::Child),
    ("稚童", AgeBracket::Child),
    ("垂髫", AgeBracket::Child),
    // Old age
    ("elderly", AgeBracket::Elderly),
    ("old man", AgeBracket::Elderly),
    ("old woman", AgeBracket::Elderly),
    ("senior", AgeBracket::Elderly),
    ("wrinkle", AgeBracket::Elderly),
    ("white hair", AgeBracket::Elderly),
    ("white-haired", AgeBracket::Elderly),
    ("aged", AgeBracket::Elderly),
    ("老年", AgeBracket::Elderly),
    ("老人", AgeBracket::Elderly),
    ("老者", AgeBracket::Elderly),
    ("老翁", AgeBracket::Elderly),
    ("老妪", AgeBracket::Elderly),
    ("老太", AgeBracket::Elderly),
    ("老头", AgeBracket::Elderly),
    ("花甲", AgeBracket::Elderly),
    ("古稀", AgeBracket::Elderly),
    ("年迈", AgeBracket::Elderly),
    ("苍老", AgeBracket::Elderly),
    ("白发", AgeBracket::Elderly),
    ("皱纹", AgeBracket::Elderly),
    // Adulthood
    ("adult", AgeBracket::Adult),
    ("grown", AgeBracket::Adult),
    ("而立", AgeBracket::Adult),
    ("壮年", AgeBracket::Adult),
    ("成年", AgeBracket::Adult),
    ("成人", AgeBracket::Adult),
    // Youth
    ("teen", AgeBracket::Youth),
    ("youth", AgeBracket::Youth),
    ("young", AgeBracket::Youth),
    ("少年", AgeBracket::Youth),
    ("少女", AgeBracket::Youth),
    ("青年", AgeBracket::Youth),
    ("年轻", AgeBracket::Youth),
    ("弱冠", AgeBracket::Youth),
    ("及笄", AgeBracket::Youth),
    ("豆蔻", AgeBracket::Youth),
];

// ============================================================================
// SIMILARITY
// ============================================================================

/// Groups of interchangeable names for weapons and clothing phases.
///
/// Two strings are synonyms when both appear in the same group.
pub static SYNONYM_GROUPS: &[&[&str]] = &[
    // Clothing phases
    &["wedding", "marriage ceremony", "marriage", "婚礼", "大婚", "成亲", "成婚", "出嫁"],
    &["battle", "war", "combat", "fight", "战斗", "战场", "作战", "出征", "交战"],
    &["daily", "everyday", "casual", "日常", "平时", "平日", "常服", "便装"],
    &["court", "audience", "朝堂", "上朝", "朝会", "朝见"],
    &["funeral", "mourning", "葬礼", "丧礼", "服丧", "守孝"],
    &["banquet", "feast", "宴会", "宴席", "晚宴", "赴宴"],
    &["sleep", "night", "bedtime", "就寝", "睡觉", "夜间"],
    &["travel", "journey", "旅行", "远行", "赶路", "出行"],
    &["disguise", "undercover", "伪装", "乔装", "易容"],
    &["childhood", "童年", "幼年", "小时候"],
    // Weapons
    &["sword", "longsword", "剑", "长剑", "宝剑"],
    &["saber", "sabre", "刀", "长刀", "大刀"],
    &["spear", "lance", "枪", "长枪", "矛"],
    &["bow", "longbow", "弓", "长弓"],
    &["dagger", "knife", "匕首", "短刀"],
    &["staff", "quarterstaff", "杖", "法杖", "棍", "长棍"],
    &["fan", "folding fan", "扇", "折扇"],
];

/// Temporal and descriptive particles stripped from the end of a phase or
/// weapon name before core words are extracted. Longest first.
pub static STRIP_SUFFIXES: &[&str] = &[
    "的时候", "时期", "时候", "期间", "之时", "之日", "阶段", "装束", "服饰", "打扮",
    "造型", "风格", "时", "期", "装", "服", "版", "的",
];

/// English words ignored when extracting core words.
pub static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "an", "the", "of", "and", "or", "in", "on", "at", "to", "for", "with", "his",
        "her", "their", "period", "phase", "era", "stage", "time", "outfit", "attire",
        "clothes", "clothing", "costume", "garb", "look", "style", "version",
    ]
    .into_iter()
    .collect()
});

/// Single ideographs that carry meaning on their own and are kept as
/// one-character core words.
pub static MEANINGFUL_CHARS: Lazy<HashSet<char>> = Lazy::new(|| {
    [
        '剑', '刀', '枪', '弓', '弩', '戟', '斧', '锤', '鞭', '扇', '杖', '棍', '矛', '盾',
        '匕', '箭', '针', '笛', '琴', '婚', '战', '宴', '丧', '朝', '猎', '囚', '孝', '祭',
        '夜', '春', '夏', '秋', '冬',
    ]
    .into_iter()
    .collect()
});

// ============================================================================
// ENRICHMENT
// ============================================================================

/// Terms whose presence marks a visual description as already specific.
///
/// A character whose visual memory points contain none of these is sent to
/// the enrichment pass even when the text is long.
pub static SALIENT_VISUAL_MARKERS: &[&str] = &[
    "hair", "eye", "skin", "scar", "beard", "tall", "short", "slender", "build", "face",
    "tattoo", "height", "发", "眼", "眸", "眉", "肤", "疤", "须", "胡", "身材", "身高",
    "脸", "面容", "纹身", "痣",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeral_table_covers_one_to_hundred() {
        let values: HashSet<u32> = NUMERAL_WORDS.iter().map(|(_, v)| *v).collect();
        for n in 1..=100 {
            assert!(values.contains(&n), "missing numeral for {n}");
        }
    }

    #[test]
    fn test_numeral_table_is_longest_first() {
        let lengths: Vec<usize> = NUMERAL_WORDS.iter().map(|(w, _)| w.chars().count()).collect();
        assert!(lengths.windows(2).all(|pair| pair[0] >= pair[1]));
    }

    #[test]
    fn test_compound_keywords_precede_their_parts() {
        let position = |term: &str| AGE_KEYWORDS.iter().position(|(k, _)| *k == term).unwrap();
        assert!(position("middle-aged") < position("aged"));
        assert!(position("未成年") < position("成年"));
        assert!(position("teenager") < position("teen"));
        assert!(position("childhood") < position("child"));
    }

    #[test]
    fn test_english_entries_are_lowercase() {
        for group in SYNONYM_GROUPS {
            for word in *group {
                assert_eq!(*word, word.to_lowercase());
            }
        }
    }
}
