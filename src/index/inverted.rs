use std::cmp::Ordering;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::ops::Bound;

use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde_json::value::RawValue;

/// In-memory inverted index: word → location → ordered positions, plus a
/// per-location word count used as the scoring denominator.
///
/// Both maps are ordered by key ascending and that order is observable
/// through the read views and the serialized output. The two maps move in
/// lockstep: every position recorded for a location raises that location's
/// count to at least the position, and every counted location owns at least
/// one posting.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InvertedIndex {
    index: BTreeMap<String, BTreeMap<String, BTreeSet<u64>>>,
    counts: BTreeMap<String, u64>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one occurrence. Returns true if the position was new for the
    /// `(word, location)` pair; re-adding the same triple is a no-op.
    pub fn add(&mut self, word: &str, location: &str, position: u64) -> bool {
        let positions = self
            .index
            .entry(word.to_string())
            .or_default()
            .entry(location.to_string())
            .or_default();

        if !positions.insert(position) {
            return false;
        }

        let count = self.counts.entry(location.to_string()).or_insert(0);
        if position > *count {
            *count = position;
        }
        true
    }

    /// Bulk-unions another index into this one. Words absent here are
    /// spliced in wholesale; otherwise position sets merge per location.
    /// Counts take the pointwise maximum.
    pub fn merge(&mut self, other: InvertedIndex) {
        for (word, locations) in other.index {
            match self.index.entry(word) {
                Entry::Vacant(slot) => {
                    slot.insert(locations);
                }
                Entry::Occupied(mut slot) => {
                    let ours = slot.get_mut();
                    for (location, positions) in locations {
                        ours.entry(location).or_default().extend(positions);
                    }
                }
            }
        }

        for (location, theirs) in other.counts {
            let count = self.counts.entry(location).or_insert(0);
            if theirs > *count {
                *count = theirs;
            }
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }

    pub fn contains_location(&self, word: &str, location: &str) -> bool {
        self.index
            .get(word)
            .map(|locations| locations.contains_key(location))
            .unwrap_or(false)
    }

    pub fn contains_position(&self, word: &str, location: &str, position: u64) -> bool {
        self.index
            .get(word)
            .and_then(|locations| locations.get(location))
            .map(|positions| positions.contains(&position))
            .unwrap_or(false)
    }

    /// Indexed words in ascending order.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }

    /// Locations of a word in ascending order; empty if the word is absent.
    pub fn locations<'a>(&'a self, word: &str) -> impl Iterator<Item = &'a str> {
        self.index
            .get(word)
            .into_iter()
            .flat_map(|locations| locations.keys())
            .map(String::as_str)
    }

    /// Positions of a word at a location, ascending.
    pub fn positions<'a>(&'a self, word: &str, location: &str) -> impl Iterator<Item = u64> + 'a {
        self.index
            .get(word)
            .and_then(|locations| locations.get(location))
            .into_iter()
            .flatten()
            .copied()
    }

    /// Per-location word counts, keyed ascending.
    pub fn counts(&self) -> &BTreeMap<String, u64> {
        &self.counts
    }

    /// Number of distinct indexed words.
    pub fn num_words(&self) -> usize {
        self.index.len()
    }

    /// Number of locations a word appears in.
    pub fn num_locations(&self, word: &str) -> usize {
        self.index.get(word).map(BTreeMap::len).unwrap_or(0)
    }

    /// Number of recorded positions for a word at a location.
    pub fn num_positions(&self, word: &str, location: &str) -> usize {
        self.index
            .get(word)
            .and_then(|locations| locations.get(location))
            .map(BTreeSet::len)
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Ranked search over a sorted set of query stems.
    ///
    /// Exact mode considers each stem itself; prefix mode walks the ordered
    /// key space from the first key ≥ the stem while keys keep the stem as
    /// prefix. A word reached through two different stems is tallied once.
    pub fn search(&self, stems: &BTreeSet<String>, exact: bool) -> Vec<SearchResult> {
        let mut visited: BTreeSet<&str> = BTreeSet::new();
        let mut slots: HashMap<&str, usize> = HashMap::new();
        let mut results: Vec<SearchResult> = Vec::new();

        for stem in stems {
            if exact {
                if let Some((word, locations)) = self.index.get_key_value(stem.as_str()) {
                    self.tally(word, locations, &mut visited, &mut slots, &mut results);
                }
            } else {
                let from = (Bound::Included(stem.as_str()), Bound::Unbounded);
                for (word, locations) in self.index.range::<str, _>(from) {
                    if !word.starts_with(stem.as_str()) {
                        break;
                    }
                    self.tally(word, locations, &mut visited, &mut slots, &mut results);
                }
            }
        }

        results.sort();
        results
    }

    /// Folds one candidate word into the running results, one result per
    /// location across the whole query.
    fn tally<'a>(
        &'a self,
        word: &'a str,
        locations: &'a BTreeMap<String, BTreeSet<u64>>,
        visited: &mut BTreeSet<&'a str>,
        slots: &mut HashMap<&'a str, usize>,
        results: &mut Vec<SearchResult>,
    ) {
        if !visited.insert(word) {
            return;
        }

        for (location, positions) in locations {
            let occurrences = positions.len() as u64;
            let total = self.counts[location.as_str()];
            match slots.get(location.as_str()) {
                Some(&slot) => {
                    let result = &mut results[slot];
                    result.count += occurrences;
                    result.score = result.count as f64 / total as f64;
                }
                None => {
                    slots.insert(location.as_str(), results.len());
                    results.push(SearchResult {
                        location: location.clone(),
                        count: occurrences,
                        score: occurrences as f64 / total as f64,
                    });
                }
            }
        }
    }
}

/// The index serializes as its word → location → positions map.
impl Serialize for InvertedIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.index.serialize(serializer)
    }
}

/// One ranked match: a location, the summed occurrence count of all matched
/// words there, and `count / total word count` as the score.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub location: String,
    pub count: u64,
    pub score: f64,
}

impl SearchResult {
    /// Score descending, then count descending, then location ascending
    /// (case-insensitive first, case-sensitive to break remaining ties).
    fn ranking(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| other.count.cmp(&self.count))
            .then_with(|| {
                let ours = self.location.chars().flat_map(char::to_lowercase);
                let theirs = other.location.chars().flat_map(char::to_lowercase);
                ours.cmp(theirs)
            })
            .then_with(|| self.location.cmp(&other.location))
    }
}

impl PartialEq for SearchResult {
    fn eq(&self, other: &Self) -> bool {
        self.ranking(other) == Ordering::Equal
    }
}

impl Eq for SearchResult {}

impl PartialOrd for SearchResult {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.ranking(other))
    }
}

impl Ord for SearchResult {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ranking(other)
    }
}

impl Serialize for SearchResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::Error;

        let score = RawValue::from_string(format!("{:.8}", self.score)).map_err(S::Error::custom)?;
        let mut state = serializer.serialize_struct("SearchResult", 3)?;
        state.serialize_field("where", &self.location)?;
        state.serialize_field("count", &self.count)?;
        state.serialize_field("score", &*score)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stems(words: &[&str]) -> BTreeSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    /// The E1 corpus: A = "apple apple banana", B = "banana cherry".
    fn fruit_index() -> InvertedIndex {
        let mut index = InvertedIndex::new();
        index.add("apple", "A", 1);
        index.add("apple", "A", 2);
        index.add("banana", "A", 3);
        index.add("banana", "B", 1);
        index.add("cherry", "B", 2);
        index
    }

    #[test]
    fn add_tracks_positions_and_counts() {
        let index = fruit_index();

        assert_eq!(
            index.positions("apple", "A").collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert_eq!(index.counts().get("A"), Some(&3));
        assert_eq!(index.counts().get("B"), Some(&2));
    }

    #[test]
    fn add_is_idempotent() {
        let mut once = InvertedIndex::new();
        once.add("apple", "A", 1);

        let mut twice = InvertedIndex::new();
        assert!(twice.add("apple", "A", 1));
        assert!(!twice.add("apple", "A", 1));

        assert_eq!(once, twice);
    }

    #[test]
    fn counts_equal_max_position_everywhere() {
        let index = fruit_index();
        for (location, &count) in index.counts() {
            let max = index
                .words()
                .map(|w| w.to_string())
                .filter_map(|w| index.positions(&w, location).max())
                .max()
                .unwrap();
            assert_eq!(count, max);
        }
    }

    #[test]
    fn contains_views() {
        let index = fruit_index();

        assert!(index.contains("banana"));
        assert!(!index.contains("durian"));
        assert!(index.contains_location("banana", "B"));
        assert!(!index.contains_location("cherry", "A"));
        assert!(index.contains_position("cherry", "B", 2));
        assert!(!index.contains_position("cherry", "B", 1));
    }

    #[test]
    fn views_enumerate_in_ascending_order() {
        let index = fruit_index();
        assert_eq!(
            index.words().collect::<Vec<_>>(),
            vec!["apple", "banana", "cherry"]
        );
        assert_eq!(index.locations("banana").collect::<Vec<_>>(), vec!["A", "B"]);
    }

    #[test]
    fn merge_is_commutative() {
        let mut left = InvertedIndex::new();
        left.add("apple", "A", 1);
        left.add("apple", "A", 2);
        left.add("banana", "A", 3);

        let mut right = InvertedIndex::new();
        right.add("banana", "B", 1);
        right.add("cherry", "B", 2);
        right.add("apple", "A", 2);

        let mut ab = left.clone();
        ab.merge(right.clone());
        let mut ba = right;
        ba.merge(left);

        assert_eq!(ab, ba);
        assert_eq!(ab, fruit_index());
    }

    #[test]
    fn merge_is_associative() {
        let mut a = InvertedIndex::new();
        a.add("apple", "A", 1);
        let mut b = InvertedIndex::new();
        b.add("apple", "A", 2);
        b.add("banana", "B", 1);
        let mut c = InvertedIndex::new();
        c.add("banana", "A", 3);
        c.add("cherry", "B", 2);

        // (a ∪ b) ∪ c
        let mut left = a.clone();
        left.merge(b.clone());
        left.merge(c.clone());

        // a ∪ (b ∪ c)
        let mut bc = b;
        bc.merge(c);
        let mut right = a;
        right.merge(bc);

        assert_eq!(left, right);
    }

    #[test]
    fn size_views_count_words_locations_positions() {
        let index = fruit_index();

        assert_eq!(index.num_words(), 3);
        assert_eq!(index.num_locations("banana"), 2);
        assert_eq!(index.num_locations("durian"), 0);
        assert_eq!(index.num_positions("apple", "A"), 2);
        assert_eq!(index.num_positions("apple", "B"), 0);
        assert!(!index.is_empty());
        assert!(InvertedIndex::new().is_empty());
    }

    #[test]
    fn exact_search_ranks_by_score() {
        let index = fruit_index();
        let results = index.search(&stems(&["banana"]), true);

        // B scores 1/2, A scores 1/3.
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].location, "B");
        assert_eq!(results[0].count, 1);
        assert!((results[0].score - 0.5).abs() < 1e-12);
        assert_eq!(results[1].location, "A");
        assert!((results[1].score - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn prefix_search_spans_the_key_range() {
        let mut index = InvertedIndex::new();
        index.add("car", "X", 1);
        index.add("cart", "X", 2);
        index.add("carpet", "X", 3);

        let results = index.search(&stems(&["car"]), false);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].count, 3);
        assert!((results[0].score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn prefix_search_stops_at_the_first_non_match() {
        let mut index = InvertedIndex::new();
        index.add("car", "X", 1);
        index.add("cat", "X", 2);

        let results = index.search(&stems(&["car"]), false);
        assert_eq!(results[0].count, 1);
    }

    #[test]
    fn overlapping_stems_do_not_double_count() {
        let mut index = InvertedIndex::new();
        index.add("carpet", "X", 1);

        // Both stems prefix-match "carpet"; it must be tallied once.
        let results = index.search(&stems(&["car", "carp"]), false);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].count, 1);
    }

    #[test]
    fn each_location_appears_at_most_once() {
        let index = fruit_index();
        let results = index.search(&stems(&["apple", "banana", "cherry"]), true);

        let mut seen: Vec<&str> = results.iter().map(|r| r.location.as_str()).collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), results.len());
    }

    #[test]
    fn multi_stem_counts_accumulate_per_location() {
        let index = fruit_index();
        let results = index.search(&stems(&["apple", "banana"]), true);

        // A matched apple twice and banana once: count 3 of 3 words.
        assert_eq!(results[0].location, "A");
        assert_eq!(results[0].count, 3);
        assert!((results[0].score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn missing_stem_yields_no_results() {
        let index = fruit_index();
        assert!(index.search(&stems(&["zebra"]), true).is_empty());
        assert!(index.search(&stems(&["zebra"]), false).is_empty());
    }

    #[test]
    fn ties_break_case_insensitively_then_case_sensitively() {
        let a = SearchResult {
            location: "Path/B".to_string(),
            count: 1,
            score: 0.1,
        };
        let b = SearchResult {
            location: "path/a".to_string(),
            count: 1,
            score: 0.1,
        };
        assert_eq!(a.cmp(&b), Ordering::Greater, "path/a sorts first");

        let upper = SearchResult {
            location: "PATH".to_string(),
            count: 1,
            score: 0.1,
        };
        let lower = SearchResult {
            location: "path".to_string(),
            count: 1,
            score: 0.1,
        };
        assert_eq!(upper.cmp(&lower), Ordering::Less, "case-sensitive fallback");
    }

    #[test]
    fn higher_count_wins_on_equal_score() {
        let few = SearchResult {
            location: "a".to_string(),
            count: 1,
            score: 0.5,
        };
        let many = SearchResult {
            location: "b".to_string(),
            count: 4,
            score: 0.5,
        };
        assert!(many < few);
    }
}
