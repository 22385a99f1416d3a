use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::LazyLock;

/// Applied in order; each removes a trailing fragment.
static NORMALIZE_RULES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // "- 12", "-12 to 48"
        r"\s*-\s*\d+.*$",
        // " 45 and up"
        r"\s+\d+.*$",
        // " (cul-de-sac)"
        r"\s+\(.*\)$",
        // " to Main Rd"
        r"(?i)\s+to\s+.*$",
        // " and Second Ave"
        r"(?i)\s+and\s+.*$",
        // " - lower end"
        r"\s*-\s*[A-Za-z].*$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("normalize pattern is valid"))
    .collect()
});

/// Suffix abbreviations and their full forms. Entries with no full form are
/// only ever stripped.
const SUFFIXES: &[(&str, &[&str])] = &[
    ("RD", &["Road"]),
    ("STR", &["Street"]),
    ("ST", &["Street"]),
    ("AVE", &["Avenue"]),
    ("CL", &["Close"]),
    ("DR", &["Drive"]),
    ("CLOSE", &[]),
    ("CRESCENT", &[]),
    ("LANE", &[]),
    ("WAY", &[]),
    ("TERRACE", &[]),
    ("ROAD", &[]),
];

struct SuffixPattern {
    re: Regex,
    expansions: &'static [&'static str],
}

static SUFFIX_PATTERNS: LazyLock<Vec<SuffixPattern>> = LazyLock::new(|| {
    SUFFIXES
        .iter()
        .map(|(abbr, expansions)| SuffixPattern {
            re: Regex::new(&format!(r"(?i)\b{}$", abbr)).expect("suffix pattern is valid"),
            expansions: *expansions,
        })
        .collect()
});

static STANDALONE_ST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bST\b").expect("saint pattern is valid"));

/// Strips house-number ranges, notes and joined names from a free-text street name.
pub fn normalize(raw: &str) -> String {
    let mut name = raw.to_string();
    for re in NORMALIZE_RULES.iter() {
        name = re.replace(&name, "").into_owned();
    }
    name.trim().to_string()
}

/// A pure transform from a normalized name to zero or more candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VariantRule {
    /// "Main Rd" -> "Main Road"
    ExpandSuffix,
    /// "Main Rd" -> "Main"
    StripSuffix,
    /// "St James Rd" -> "Saint James Rd". "ST" is ambiguous between Street and
    /// Saint, so both readings are tried.
    Saint,
}

impl VariantRule {
    pub const ALL: [VariantRule; 3] = [
        VariantRule::ExpandSuffix,
        VariantRule::StripSuffix,
        VariantRule::Saint,
    ];

    pub fn apply(&self, base: &str) -> Vec<String> {
        match self {
            VariantRule::ExpandSuffix => SUFFIX_PATTERNS
                .iter()
                .filter(|p| p.re.is_match(base))
                .flat_map(|p| {
                    p.expansions
                        .iter()
                        .map(move |full| p.re.replace(base, *full).into_owned())
                })
                .collect(),
            VariantRule::StripSuffix => SUFFIX_PATTERNS
                .iter()
                .filter(|p| p.re.is_match(base))
                .map(|p| p.re.replace(base, "").trim().to_string())
                .collect(),
            VariantRule::Saint => vec![STANDALONE_ST.replace(base, "Saint").into_owned()],
        }
    }
}

/// Normalized base name first, then each rule's output in rule order.
/// Duplicates and empty strings are dropped; first occurrence wins.
pub fn expand(raw: &str, rules: &[VariantRule]) -> Vec<String> {
    let base = normalize(raw);
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    let candidates =
        std::iter::once(base.clone()).chain(rules.iter().flat_map(|r| r.apply(&base)));
    for candidate in candidates {
        if !candidate.is_empty() && seen.insert(candidate.clone()) {
            out.push(candidate);
        }
    }
    out
}
