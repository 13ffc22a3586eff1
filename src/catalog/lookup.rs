//! Name resolution over the subtag catalog: an exact case-insensitive map
//! plus a fuzzy ranked index for "did you mean" suggestions.

use std::collections::HashMap;

use liblevenshtein::prelude::{Algorithm, DynamicDawg, Transducer};
use tracing::debug;

use crate::catalog::SubtagDefinition;

/// Widest edit distance find() will explore. Beyond this, suggestions stop
/// being useful. Short queries are capped further so a two-character name
/// cannot match the entire catalog.
const MAX_FIND_DISTANCE: usize = 2;

/// Built once per fetched catalog; queried by diagnostics, hover, and
/// completion.
pub struct SubtagLookup {
    definitions: Vec<SubtagDefinition>,
    /// folded name/alias -> definition index; first registration wins
    exact: HashMap<String, usize>,
    /// folded term -> definition indices in catalog order
    terms: HashMap<String, Vec<usize>>,
    dawg: DynamicDawg<()>,
}

impl SubtagLookup {
    pub fn new(catalog: Vec<SubtagDefinition>) -> SubtagLookup {
        let mut exact = HashMap::new();
        let mut terms: HashMap<String, Vec<usize>> = HashMap::new();
        let mut dawg: DynamicDawg<()> = DynamicDawg::new();

        for (index, definition) in catalog.iter().enumerate() {
            let name = definition.name.to_lowercase();
            let aliases = definition.aliases.iter().map(|alias| alias.to_lowercase());

            for term in std::iter::once(name).chain(aliases) {
                exact.entry(term.clone()).or_insert(index);
                dawg.insert(&term);
                let indices = terms.entry(term).or_default();
                if !indices.contains(&index) {
                    indices.push(index);
                }
            }
        }

        debug!("indexed {} subtag definitions", catalog.len());

        SubtagLookup {
            definitions: catalog,
            exact,
            terms,
            dawg,
        }
    }

    pub fn definitions(&self) -> &[SubtagDefinition] {
        &self.definitions
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Case-insensitive exact lookup by name or alias.
    pub fn get(&self, name: &str) -> Option<&SubtagDefinition> {
        self.exact
            .get(&name.to_lowercase())
            .map(|&index| &self.definitions[index])
    }

    /// Ranked fuzzy search: `(matched term, definition)` pairs, best
    /// first. A perfect case-insensitive match is always yielded first,
    /// and a transposed pair of characters counts as one edit. The
    /// sequence is lazy per distance band, so abandoning it early skips
    /// the work of the wider bands entirely.
    pub fn find<'a>(
        &'a self,
        name: &str,
    ) -> impl Iterator<Item = (String, &'a SubtagDefinition)> + 'a {
        let query = name.trim().to_lowercase();
        // never explore distances that could rewrite the whole query
        let widest = MAX_FIND_DISTANCE.min(
            query
                .chars()
                .count()
                .saturating_sub(1),
        );
        (0..=widest).flat_map(move |distance| self.band(&query, distance))
    }

    /// All hits at exactly the given edit distance, in catalog order.
    fn band(&self, query: &str, distance: usize) -> Vec<(String, &SubtagDefinition)> {
        let transducer = Transducer::new(self.dawg.clone(), Algorithm::Transposition);

        let mut hits: Vec<(usize, String)> = Vec::new();
        for candidate in transducer.query_with_distance(query, distance) {
            // narrower bands have already been yielded
            if candidate.distance != distance {
                continue;
            }
            if let Some(indices) = self.terms.get(&candidate.term) {
                for &index in indices {
                    hits.push((index, candidate.term.clone()));
                }
            }
        }

        hits.sort();
        hits.dedup();
        hits.into_iter()
            .map(|(index, term)| (term, &self.definitions[index]))
            .collect()
    }
}

#[cfg(test)]
mod check {
    use super::*;
    use crate::catalog::SubtagCategory;

    fn catalog() -> Vec<SubtagDefinition> {
        vec![
            SubtagDefinition::new("if", SubtagCategory::Misc),
            SubtagDefinition::new("math", SubtagCategory::Math),
            SubtagDefinition::new("comment", SubtagCategory::Comment).with_aliases(["//"]),
            SubtagDefinition::new("user", SubtagCategory::User).with_aliases(["username"]),
        ]
    }

    #[test]
    fn exact_lookup_is_case_insensitive() {
        let lookup = SubtagLookup::new(catalog());

        let a = lookup.get("IF").unwrap();
        let b = lookup.get("if").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.name, "if");
    }

    #[test]
    fn aliases_resolve_to_their_definition() {
        let lookup = SubtagLookup::new(catalog());
        assert_eq!(lookup.get("//").unwrap().name, "comment");
        assert_eq!(lookup.get("USERNAME").unwrap().name, "user");
    }

    #[test]
    fn unknown_names_miss() {
        let lookup = SubtagLookup::new(catalog());
        assert!(lookup.get("nope").is_none());
    }

    #[test]
    fn first_registration_wins_for_duplicate_keys() {
        let lookup = SubtagLookup::new(vec![
            SubtagDefinition::new("dup", SubtagCategory::Simple),
            SubtagDefinition::new("dup", SubtagCategory::Math),
            SubtagDefinition::new("other", SubtagCategory::Misc).with_aliases(["dup"]),
        ]);

        assert_eq!(lookup.get("dup").unwrap().category, SubtagCategory::Simple);
        assert_eq!(lookup.len(), 3);
    }

    #[test]
    fn perfect_match_comes_first() {
        let lookup = SubtagLookup::new(catalog());

        let (term, definition) = lookup.find("If").next().unwrap();
        assert_eq!(term, "if");
        assert_eq!(definition.name, "if");
    }

    #[test]
    fn fuzzy_ranks_close_names_above_unrelated() {
        let lookup = SubtagLookup::new(catalog());

        let results: Vec<_> = lookup.find("fi").collect();
        assert!(!results.is_empty());
        assert_eq!(results[0].1.name, "if");
        assert!(results
            .iter()
            .all(|(_, definition)| definition.name != "comment"));
    }

    #[test]
    fn transposed_query_outranks_earlier_unrelated_names() {
        // "xx" registers first; only the one-edit transposition may match
        let lookup = SubtagLookup::new(vec![
            SubtagDefinition::new("xx", SubtagCategory::Simple),
            SubtagDefinition::new("if", SubtagCategory::Misc),
        ]);

        let results: Vec<_> = lookup.find("fi").collect();
        assert_eq!(results[0].1.name, "if");
        assert!(results
            .iter()
            .all(|(_, definition)| definition.name != "xx"));
    }

    #[test]
    fn short_queries_stay_narrow() {
        let lookup = SubtagLookup::new(catalog());

        // a one-character query only ever matches exactly
        assert_eq!(lookup.find("i").count(), 0);
        assert_eq!(lookup.find("").count(), 0);
    }

    #[test]
    fn ties_break_by_catalog_order() {
        let lookup = SubtagLookup::new(vec![
            SubtagDefinition::new("aa", SubtagCategory::Simple),
            SubtagDefinition::new("ab", SubtagCategory::Simple),
        ]);

        // both are distance 1 from "ac"
        let results: Vec<_> = lookup.find("ac").collect();
        assert_eq!(results[0].1.name, "aa");
        assert_eq!(results[1].1.name, "ab");
    }

    #[test]
    fn sequence_may_be_abandoned_early() {
        let lookup = SubtagLookup::new(catalog());
        let first = lookup.find("user").take(1).count();
        assert_eq!(first, 1);
    }

    #[test]
    fn no_suggestions_is_an_empty_sequence_not_an_error() {
        let lookup = SubtagLookup::new(catalog());
        assert_eq!(lookup.find("zzzzzzzzzz").count(), 0);
    }

    #[test]
    fn empty_catalog_behaves() {
        let lookup = SubtagLookup::new(Vec::new());
        assert!(lookup.is_empty());
        assert!(lookup.get("if").is_none());
        assert_eq!(lookup.find("if").count(), 0);
    }
}
