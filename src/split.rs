//! Dot-delimited path splitting.
//!
//! `fields`, `omit` and `expand` all arrive as flat lists of dot-delimited
//! paths; each resolution level peels off the first segment and forwards the
//! remainder one level deeper.

use std::collections::{HashMap, HashSet};

/// Split a delimited query-parameter value into a list.
///
/// Tolerates commas, whitespace and mixed/empty input; never yields empty
/// strings.
pub fn split_list(param: &str) -> Vec<String> {
    param
        .split([',', ' ', '\t', '\n', '\r'])
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Split dot-delimited paths into current-level names and next-level suffixes.
///
/// `["a", "a.b", "a.d", "c"]` becomes current `{"a", "c"}` and next
/// `{"a": ["b", "d"]}`. A name appears in the next-level map iff at least one
/// input path had a `.` under it; suffix order within a key is append order.
/// Empty input yields empty outputs.
pub fn split_levels(paths: &[String]) -> (HashSet<String>, HashMap<String, Vec<String>>) {
    let mut current = HashSet::new();
    let mut next: HashMap<String, Vec<String>> = HashMap::new();

    for path in paths {
        match path.split_once('.') {
            Some((first, rest)) => {
                current.insert(first.to_string());
                next.entry(first.to_string())
                    .or_default()
                    .push(rest.to_string());
            }
            None => {
                current.insert(path.clone());
            }
        }
    }

    (current, next)
}
