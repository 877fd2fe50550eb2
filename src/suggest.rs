//! Fuzzy suggestions for mistyped item names

/// Default number of suggestions per unknown item
pub const DEFAULT_LIMIT: usize = 5;

/// Default minimum similarity (0.0 - 1.0)
pub const DEFAULT_CUTOFF: f64 = 0.5;

/// Rank `candidates` by similarity to `name`, best first
pub fn suggest<'a, I>(name: &str, candidates: I, limit: usize, cutoff: f64) -> Vec<String>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut scored: Vec<(f64, &String)> = candidates
        .into_iter()
        .map(|candidate| (strsim::normalized_levenshtein(name, candidate), candidate))
        .filter(|(score, _)| *score >= cutoff)
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));

    scored
        .into_iter()
        .take(limit)
        .map(|(_, candidate)| candidate.clone())
        .collect()
}
