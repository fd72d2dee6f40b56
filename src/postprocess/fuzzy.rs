//! Approximate key lookup for translation tables.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

/// Minimum normalised similarity for an approximate match.
pub const FUZZY_THRESHOLD: f64 = 0.85;

static BRACKET_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\(\[][^\)\]]*[\)\]]").expect("bracket tag pattern"));
static NON_ALNUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}]+").expect("separator pattern"));

/// Lowercase, drop bracketed tags, collapse everything non-alphanumeric to one space.
pub fn normalize(s: &str) -> String {
    let untagged = BRACKET_TAG.replace_all(s, " ");
    NON_ALNUM
        .replace_all(&untagged.to_lowercase(), " ")
        .trim()
        .to_string()
}

/// Jaro-Winkler similarity in `0.0..=1.0` (prefix scale 0.1, up to 4 chars).
pub fn jaro_winkler(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let window = (a.len().max(b.len()) / 2).saturating_sub(1);
    let mut a_matched = vec![false; a.len()];
    let mut b_matched = vec![false; b.len()];
    let mut matches = 0usize;
    for (i, ca) in a.iter().enumerate() {
        let lo = i.saturating_sub(window);
        let hi = (i + window + 1).min(b.len());
        for j in lo..hi {
            if !b_matched[j] && b[j] == *ca {
                a_matched[i] = true;
                b_matched[j] = true;
                matches += 1;
                break;
            }
        }
    }
    if matches == 0 {
        return 0.0;
    }

    let a_seq = a.iter().zip(&a_matched).filter(|(_, m)| **m).map(|(c, _)| c);
    let b_seq = b.iter().zip(&b_matched).filter(|(_, m)| **m).map(|(c, _)| c);
    let transpositions = a_seq.zip(b_seq).filter(|(x, y)| x != y).count() / 2;

    let m = matches as f64;
    let jaro = (m / a.len() as f64 + m / b.len() as f64 + (m - transpositions as f64) / m) / 3.0;
    let prefix = a
        .iter()
        .zip(&b)
        .take(4)
        .take_while(|(x, y)| x == y)
        .count();
    jaro + prefix as f64 * 0.1 * (1.0 - jaro)
}

/// Key→text table with exact, normalised and approximate lookup.
#[derive(Clone, Debug, Default)]
pub struct FuzzyCatalogue {
    entries: BTreeMap<String, String>,
    normalized: Vec<(String, String)>,
}

impl FuzzyCatalogue {
    pub fn new(entries: BTreeMap<String, String>) -> Self {
        let normalized = entries
            .keys()
            .map(|k| (normalize(k), k.clone()))
            .collect();
        Self {
            entries,
            normalized,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact key, else equal normalised keys, else the most similar normalised key at or
    /// above [`FUZZY_THRESHOLD`]. Ties resolve to the smallest key.
    pub fn lookup(&self, query: &str) -> Option<&str> {
        if let Some(v) = self.entries.get(query) {
            return Some(v);
        }
        let q = normalize(query);
        if q.is_empty() {
            return None;
        }
        if let Some((_, key)) = self.normalized.iter().find(|(n, _)| *n == q) {
            return self.entries.get(key).map(String::as_str);
        }

        let mut best: Option<(f64, &str)> = None;
        for (n, key) in &self.normalized {
            let score = jaro_winkler(&q, n);
            if score < FUZZY_THRESHOLD {
                continue;
            }
            if best.is_none_or(|(s, _)| score > s) {
                best = Some((score, key));
            }
        }
        best.and_then(|(_, key)| self.entries.get(key).map(String::as_str))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/postprocess/fuzzy.rs"]
mod tests;
