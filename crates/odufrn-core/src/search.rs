//! Name matching over catalogs.
//!
//! Two selection modes are available:
//!
//! - [`SearchMode::Simple`]: case-sensitive substring containment, in either
//!   direction between keyword and candidate.
//! - [`SearchMode::Fuzzy`] (default): Levenshtein distance on normalized text,
//!   compared against a threshold proportional to the keyword length.
//!
//! Both are pure functions over `(keyword, candidates)` and keep the
//! candidates' order. No match is an empty `Vec`, never an error.

use std::collections::HashSet;

use crate::config::SearchConfig;

/// How keywords are compared with catalog names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    /// Levenshtein-based matching.
    #[default]
    Fuzzy,
    /// Substring containment.
    Simple,
}

/// Runs the search selected by `mode`.
pub fn search_related(
    keyword: &str,
    candidates: &[String],
    mode: SearchMode,
    config: &SearchConfig,
) -> Vec<String> {
    match mode {
        SearchMode::Fuzzy => fuzzy_search(keyword, candidates, config),
        SearchMode::Simple => simple_search(keyword, candidates),
    }
}

/// Returns the candidates that contain the keyword or are contained by it.
///
/// A blank keyword and empty candidates never match.
///
/// # Examples
///
/// ```
/// use odufrn_core::search::simple_search;
///
/// let candidates = vec!["discentes".to_string(), "docentes".to_string()];
/// assert_eq!(simple_search("discente", &candidates), vec!["discentes"]);
/// assert_eq!(simple_search("docentes-2019", &candidates), vec!["docentes"]);
/// ```
pub fn simple_search(keyword: &str, candidates: &[String]) -> Vec<String> {
    if keyword.trim().is_empty() {
        return Vec::new();
    }

    candidates
        .iter()
        .filter(|candidate| !candidate.is_empty())
        .filter(|candidate| candidate.contains(keyword) || keyword.contains(candidate.as_str()))
        .cloned()
        .collect()
}

/// Returns the candidates whose normalized whole name is within
/// [`SearchConfig::threshold`] edits of the normalized keyword (strict `<`).
///
/// # Examples
///
/// ```
/// use odufrn_core::SearchConfig;
/// use odufrn_core::search::fuzzy_search;
///
/// let candidates = vec![
///     "discentes".to_string(),
///     "dados-complementares-de-discentes".to_string(),
///     "docentes".to_string(),
/// ];
/// let related = fuzzy_search("Discente", &candidates, &SearchConfig::default());
/// assert_eq!(related, vec!["discentes"]);
/// ```
pub fn fuzzy_search(keyword: &str, candidates: &[String], config: &SearchConfig) -> Vec<String> {
    let keyword = normalize(keyword);
    if keyword.is_empty() {
        return Vec::new();
    }
    let threshold = config.threshold(&keyword);

    candidates
        .iter()
        .filter(|candidate| levenshtein(&keyword, &normalize(candidate)) < threshold)
        .cloned()
        .collect()
}

/// Lowercases and folds Portuguese diacritics to their ASCII base letter.
pub fn normalize(text: &str) -> String {
    text.trim()
        .chars()
        .flat_map(char::to_lowercase)
        .map(fold_diacritic)
        .collect()
}

fn fold_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}

/// Levenshtein edit distance counted in characters.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != *cb);
            current[j + 1] = substitution
                .min(previous[j + 1] + 1)
                .min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

/// Appends the names from `extra` that are not already in `related`.
pub fn merge_unique(related: &mut Vec<String>, extra: impl IntoIterator<Item = String>) {
    let mut seen: HashSet<String> = related.iter().cloned().collect();
    for name in extra {
        if seen.insert(name.clone()) {
            related.push(name);
        }
    }
}
