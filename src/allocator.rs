//! Allocation of identifiers for newly created states.

use std::collections::BTreeSet;

/// Returns the smallest positive integer, as a string, that is not already used as a state id.
///
/// Freed slots are reused before the range is extended: `{1, 2, 4}` yields `3` and
/// `{1, 2, 3}` yields `4`. Identifiers that are not positive integers are ignored.
pub fn next_state_id<'a, I>(ids: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let taken: BTreeSet<u64> = ids
        .into_iter()
        .filter_map(|id| id.parse::<u64>().ok())
        .collect();

    let mut candidate = 1;
    for id in taken {
        if id < candidate {
            continue;
        }
        if id != candidate {
            break;
        }
        candidate += 1;
    }

    candidate.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fills_first_gap() {
        assert_eq!(next_state_id(["1", "2", "4"]), "3");
    }

    #[test]
    fn test_extends_when_dense() {
        assert_eq!(next_state_id(["1", "2", "3"]), "4");
    }

    #[test]
    fn test_empty_set() {
        assert_eq!(next_state_id(Vec::<&str>::new()), "1");
    }

    #[test]
    fn test_sorts_numerically_not_lexically() {
        assert_eq!(next_state_id(["10", "2", "1", "3"]), "4");
        assert_eq!(next_state_id(["9", "10", "11"]), "1");
    }

    #[test]
    fn test_ignores_duplicates_and_junk() {
        assert_eq!(next_state_id(["1", "1", "q0", "0", "2"]), "3");
    }
}
