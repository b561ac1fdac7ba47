use std::collections::BTreeSet;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::core::models::Product;

/// Accept a fuzzy match at or above this similarity.
const ACCEPT_THRESHOLD: f64 = 0.65;

/// Floor applied when one normalized/transliterated form contains the other.
const SUBSTRING_FLOOR: f64 = 0.85;

lazy_static! {
    static ref NON_ALNUM: Regex = Regex::new(r"[^0-9a-zа-яё]+").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Lowercase, keep Latin/Cyrillic letters and digits, collapse the rest to
/// single spaces.
pub fn norm_text(s: &str) -> String {
    let lowered = s.to_lowercase();
    let stripped = NON_ALNUM.replace_all(&lowered, " ");
    WHITESPACE.replace_all(&stripped, " ").trim().to_string()
}

fn translit_char(ch: char) -> Option<&'static str> {
    let mapped = match ch {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' | 'ё' => "e",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "y",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "shch",
        'ъ' | 'ь' => "",
        'ы' => "y",
        'э' => "e",
        'ю' => "yu",
        'я' => "ya",
        _ => return None,
    };
    Some(mapped)
}

/// Cyrillic-to-Latin transliteration of the normalized form; soft and hard
/// signs are dropped.
pub fn ru_to_lat(s: &str) -> String {
    let mut out = String::new();
    for ch in norm_text(s).chars() {
        match translit_char(ch) {
            Some(mapped) => out.push_str(mapped),
            None => out.push(ch),
        }
    }
    out
}

/// Longest common block (start in `a`, start in `b`, length).
fn longest_match(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut row = vec![0usize; b.len() + 1];

    for i in 0..a.len() {
        let mut prev = 0;
        for j in 0..b.len() {
            let above = row[j + 1];
            if a[i] == b[j] {
                let len = prev + 1;
                row[j + 1] = len;
                if len > best.2 {
                    best = (i + 1 - len, j + 1 - len, len);
                }
            } else {
                row[j + 1] = 0;
            }
            prev = above;
        }
    }

    best
}

fn match_total(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let (i, j, len) = longest_match(a, b);
    if len == 0 {
        return 0;
    }
    len + match_total(&a[..i], &b[..j]) + match_total(&a[i + len..], &b[j + len..])
}

/// Sequence similarity in [0, 1]: twice the total length of the recursively
/// found longest common blocks over the combined length.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * match_total(&a, &b) as f64 / total as f64
}

fn pair_score(candidate_norm: &str, candidate_lat: &str, known_norm: &str, known_lat: &str) -> f64 {
    let mut score = ratio(candidate_norm, known_norm)
        .max(ratio(candidate_norm, known_lat))
        .max(ratio(candidate_lat, known_norm))
        .max(ratio(candidate_lat, known_lat));

    if known_norm.contains(candidate_norm) || known_lat.contains(candidate_lat) {
        score = score.max(SUBSTRING_FLOOR);
    }

    score
}

/// Map a possibly misspelled, transliterated or differently-cased category
/// string to the closest category actually present in the backend. Returns
/// the candidate unchanged when nothing scores above the acceptance
/// threshold.
pub fn resolve_category(candidate: &str, known: &[String]) -> String {
    let candidate_norm = norm_text(candidate);
    let candidate_lat = ru_to_lat(candidate);

    if candidate_norm.is_empty() || known.is_empty() {
        return candidate.to_string();
    }

    let mut best: Option<&str> = None;
    let mut best_score = 0.0;

    for category in known {
        let known_norm = norm_text(category);
        let known_lat = ru_to_lat(category);
        let score = pair_score(&candidate_norm, &candidate_lat, &known_norm, &known_lat);

        if score > best_score {
            best_score = score;
            best = Some(category);
        }
    }

    match best {
        Some(category) if best_score >= ACCEPT_THRESHOLD => {
            debug!(
                "category '{}' resolved to '{}' (score {:.2})",
                candidate, category, best_score
            );
            category.to_string()
        }
        _ => candidate.to_string(),
    }
}

/// Sorted, deduplicated set of non-empty category names present in a product
/// list. Sorting keeps resolution deterministic.
pub fn known_categories(products: &[Product]) -> Vec<String> {
    products
        .iter()
        .map(|p| p.category.trim())
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Filter a product list by a requested category: resolve the request
/// against the categories present, then compare normalized forms.
pub fn filter_by_category(products: &[Product], candidate: &str) -> (Vec<Product>, String) {
    let known = known_categories(products);
    let resolved = resolve_category(candidate, &known);
    let resolved_norm = norm_text(&resolved);

    let filtered = products
        .iter()
        .filter(|p| norm_text(&p.category) == resolved_norm)
        .cloned()
        .collect();

    (filtered, resolved)
}
