//! Fuzzy scoring for tab completion.

pub const SCORE_EXACT: u32 = 1000;
pub const SCORE_PREFIX: u32 = 500;
pub const SCORE_SUBSTRING: u32 = 200;

/// Rank `candidate` against `query`, case-insensitively.
///
/// Exact match scores 1000, prefix 500, substring 200. A scattered match
/// (every query character appears in order) scores between 1 and 199,
/// higher when the query covers more of the candidate and its characters sit
/// closer together. No match scores 0.
pub fn fuzzy_score(candidate: &str, query: &str) -> u32 {
    let candidate = candidate.to_lowercase();
    let query = query.to_lowercase();
    if query.is_empty() {
        return 0;
    }
    if candidate == query {
        return SCORE_EXACT;
    }
    if candidate.starts_with(&query) {
        return SCORE_PREFIX;
    }
    if candidate.contains(&query) {
        return SCORE_SUBSTRING;
    }

    let cand: Vec<char> = candidate.chars().collect();
    let mut positions = Vec::new();
    let mut from = 0;
    for q in query.chars() {
        let Some(offset) = cand[from..].iter().position(|&c| c == q) else {
            return 0;
        };
        positions.push(from + offset);
        from += offset + 1;
    }

    // A scattered match has fewer query chars than candidate chars, and a
    // span at least as long as the query, so each term stays below 99.
    let q = positions.len() as u64;
    let c = cand.len() as u64;
    let span = match (positions.first(), positions.last()) {
        (Some(first), Some(last)) => (last - first + 1) as u64,
        _ => return 0,
    };
    let coverage = 99 * q / c;
    let density = 99 * q / (span + 1);
    1 + (coverage + density) as u32
}

/// Candidates matching `partial`, best first.
///
/// An empty `partial` returns every name sorted. Ties are broken by name.
/// Duplicates are dropped.
pub fn get_completions<S: AsRef<str>>(partial: &str, names: &[S]) -> Vec<String> {
    let mut unique: Vec<&str> = names.iter().map(AsRef::as_ref).collect();
    unique.sort_unstable();
    unique.dedup();

    if partial.is_empty() {
        return unique.into_iter().map(str::to_string).collect();
    }

    let mut scored: Vec<(u32, &str)> = unique
        .into_iter()
        .map(|n| (fuzzy_score(n, partial), n))
        .filter(|(score, _)| *score > 0)
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    scored.into_iter().map(|(_, n)| n.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_tiers() {
        assert_eq!(fuzzy_score("help", "help"), 1000);
        assert_eq!(fuzzy_score("history", "his"), 500);
        assert_eq!(fuzzy_score("unalias", "alias"), 200);
        assert_eq!(fuzzy_score("crypto", "xyz"), 0);
    }

    #[test]
    fn scoring_is_case_insensitive() {
        assert_eq!(fuzzy_score("HELP", "help"), 1000);
        assert_eq!(fuzzy_score("Matrix", "MAT"), 500);
    }

    #[test]
    fn scattered_match_is_strictly_between_zero_and_substring() {
        for (cand, query) in [("matrix", "mx"), ("spinner", "sr"), ("ab", "b"), ("a-b-c-d-e", "ae")] {
            let score = fuzzy_score(cand, query);
            if cand.contains(query) {
                continue;
            }
            assert!(score > 0 && score < 200, "{cand}/{query} scored {score}");
        }
    }

    #[test]
    fn out_of_order_chars_do_not_match() {
        assert_eq!(fuzzy_score("matrix", "xm"), 0);
    }

    #[test]
    fn tighter_scattered_match_scores_higher() {
        assert!(fuzzy_score("abxc", "abc") > fuzzy_score("axxxbxxxc", "abc"));
    }

    #[test]
    fn empty_partial_returns_all_sorted() {
        assert_eq!(
            get_completions("", &["help", "clear", "crypto"]),
            vec!["clear", "crypto", "help"]
        );
    }

    #[test]
    fn completions_rank_by_score() {
        let names = ["cat", "clear", "cls", "echo", "crt", "cd"];
        let got = get_completions("c", &names);
        assert_eq!(got[..5], ["cat", "cd", "clear", "cls", "crt"]);
        assert_eq!(got[5], "echo");

        let got = get_completions("cl", &names);
        assert_eq!(got, vec!["clear", "cls"]);
    }

    #[test]
    fn non_matches_are_excluded() {
        assert!(get_completions("zz", &["help", "ls"]).is_empty());
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn score_is_always_a_known_tier_or_scattered(cand in "[a-e]{1,10}", query in "[a-e]{1,4}") {
                let score = fuzzy_score(&cand, &query);
                prop_assert!(
                    matches!(score, 0 | 200 | 500 | 1000) || (1..200).contains(&score)
                );
                if cand.contains(&query) {
                    prop_assert!(score >= 200);
                }
            }
        }
    }
}
