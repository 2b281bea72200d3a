//! Ranking Engine
//!
//! Pure, synchronous ranking over an arbitrary candidate set. Used directly by
//! the in-memory store; the SQLite store expresses the same ordering in SQL.

use std::cmp::{Ordering, Reverse};

use crate::models::City;

// == Match Class ==
/// How a city name matched the query. Variants are declared in rank order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchClass {
    /// Name starts with the query
    Prefix,
    /// Name contains the query somewhere after its first character
    Substring,
}

impl MatchClass {
    /// Classifies an already lower-cased name against a lower-cased query.
    ///
    /// The empty query is a prefix of every name.
    pub fn classify(name_lower: &str, query_lower: &str) -> Option<Self> {
        if name_lower.starts_with(query_lower) {
            Some(MatchClass::Prefix)
        } else if name_lower.contains(query_lower) {
            Some(MatchClass::Substring)
        } else {
            None
        }
    }
}

// == Rank ==
/// Returns at most `limit` cities matching `query`, best first.
///
/// Ordering: [`MatchClass`], then descending popularity, then ascending name,
/// then ascending geonameid so that the output is fully deterministic.
///
/// # Arguments
/// * `query` - Raw query text; lower-cased here
/// * `limit` - Maximum number of results; `0` yields an empty list
/// * `candidates` - Cities to consider
/// * `popularity` - Search count for a geonameid, `0` when unknown
pub fn rank<'a, I, P>(query: &str, limit: usize, candidates: I, popularity: P) -> Vec<City>
where
    I: IntoIterator<Item = &'a City>,
    P: Fn(&str) -> u64,
{
    if limit == 0 {
        return Vec::new();
    }

    let query_lower = query.to_lowercase();

    let mut matches: Vec<(MatchClass, u64, &City)> = candidates
        .into_iter()
        .filter_map(|city| {
            MatchClass::classify(&city.name.to_lowercase(), &query_lower)
                .map(|class| (class, popularity(&city.geonameid), city))
        })
        .collect();

    matches.sort_by(compare);

    matches
        .into_iter()
        .take(limit)
        .map(|(_, _, city)| city.clone())
        .collect()
}

fn compare(a: &(MatchClass, u64, &City), b: &(MatchClass, u64, &City)) -> Ordering {
    (a.0, Reverse(a.1), &a.2.name, &a.2.geonameid).cmp(&(
        b.0,
        Reverse(b.1),
        &b.2.name,
        &b.2.geonameid,
    ))
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn city(name: &str, id: &str) -> City {
        City::new(name, "Somewhere", "", id)
    }

    fn names(cities: &[City]) -> Vec<&str> {
        cities.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_classify() {
        assert_eq!(MatchClass::classify("berlin", "ber"), Some(MatchClass::Prefix));
        assert_eq!(
            MatchClass::classify("oberlin", "ber"),
            Some(MatchClass::Substring)
        );
        assert_eq!(MatchClass::classify("paris", "ber"), None);
        assert_eq!(MatchClass::classify("paris", ""), Some(MatchClass::Prefix));
    }

    #[test]
    fn test_prefix_before_substring_regardless_of_popularity() {
        let cities = vec![city("Berlin", "1"), city("Bern", "2"), city("Oberlin", "3")];
        let counts: HashMap<&str, u64> = [("1", 5), ("2", 2), ("3", 10)].into_iter().collect();

        let ranked = rank("ber", 10, &cities, |id| counts.get(id).copied().unwrap_or(0));

        assert_eq!(names(&ranked), vec!["Berlin", "Bern", "Oberlin"]);
    }

    #[test]
    fn test_query_is_case_insensitive() {
        let cities = vec![city("Berlin", "1"), city("Oberlin", "2")];

        let ranked = rank("BER", 10, &cities, |_| 0);

        assert_eq!(names(&ranked), vec!["Berlin", "Oberlin"]);
    }

    #[test]
    fn test_ties_broken_by_name() {
        let cities = vec![city("Bergen", "1"), city("Bergamo", "2"), city("Berlin", "3")];

        let ranked = rank("berg", 10, &cities, |_| 0);

        assert_eq!(names(&ranked), vec!["Bergamo", "Bergen"]);
    }

    #[test]
    fn test_duplicate_names_ordered_by_id() {
        let cities = vec![city("Springfield", "b"), city("Springfield", "a")];

        let ranked = rank("spring", 10, &cities, |_| 0);

        assert_eq!(ranked[0].geonameid, "a");
        assert_eq!(ranked[1].geonameid, "b");
    }

    #[test]
    fn test_limit_truncates_after_ordering() {
        let cities: Vec<City> = ["Ba", "Bb", "Bc", "Bd", "Be"]
            .iter()
            .enumerate()
            .map(|(i, n)| city(n, &i.to_string()))
            .collect();

        let ranked = rank("b", 3, &cities, |id| if id == "4" { 9 } else { 0 });

        assert_eq!(names(&ranked), vec!["Be", "Ba", "Bb"]);
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let cities = vec![city("Zurich", "1"), city("Amsterdam", "2")];

        let ranked = rank("", 10, &cities, |_| 0);

        assert_eq!(names(&ranked), vec!["Amsterdam", "Zurich"]);
    }

    #[test]
    fn test_no_match_returns_empty() {
        let cities = vec![city("Paris", "1")];
        assert!(rank("xyz", 10, &cities, |_| 0).is_empty());
    }

    #[test]
    fn test_zero_limit_returns_empty() {
        let cities = vec![city("Paris", "1")];
        assert!(rank("par", 0, &cities, |_| 0).is_empty());
    }
}
