use knowledge::Symptom;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// A disease sharing at least one symptom with the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiseaseMatch {
    pub name: String,
    pub match_count: usize,
    pub matched_symptoms: Vec<Symptom>,
}

/// Count overlapping symptoms per disease. Diseases with no overlap are dropped.
/// Output order follows the input iteration order; use [`rank`] to order it.
pub fn score<'a, I>(symptoms: &BTreeSet<Symptom>, diseases: I) -> Vec<DiseaseMatch>
where
    I: IntoIterator<Item = (&'a str, &'a BTreeSet<Symptom>)>,
{
    if symptoms.is_empty() {
        return Vec::new();
    }

    diseases
        .into_iter()
        .filter_map(|(name, disease_symptoms)| {
            let matched_symptoms: Vec<Symptom> =
                symptoms.intersection(disease_symptoms).cloned().collect();
            (!matched_symptoms.is_empty()).then(|| DiseaseMatch {
                name: name.to_string(),
                match_count: matched_symptoms.len(),
                matched_symptoms,
            })
        })
        .collect()
}

/// Sort by match count descending, then name ascending.
pub fn rank(mut scored: Vec<DiseaseMatch>) -> Vec<DiseaseMatch> {
    scored.sort_by(ranking_order);
    scored
}

pub fn ranking_order(a: &DiseaseMatch, b: &DiseaseMatch) -> Ordering {
    b.match_count
        .cmp(&a.match_count)
        .then_with(|| a.name.cmp(&b.name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use knowledge::KnowledgeStore;

    fn symptoms(ids: &[&str]) -> BTreeSet<Symptom> {
        ids.iter().filter_map(|s| Symptom::parse(s)).collect()
    }

    fn store() -> KnowledgeStore {
        KnowledgeStore::builder()
            .disease("Common Cold", ["fever", "cough", "headache"])
            .disease("Pneumonia", ["fever", "cough", "chest_pain"])
            .disease("Migraine", ["headache", "nausea"])
            .disease("Flu", ["fever", "cough", "fatigue"])
            .disease("Acne", ["skin_rash"])
            .build()
    }

    #[test]
    fn test_score_counts_intersection() {
        let store = store();
        let scored = score(&symptoms(&["fever", "cough", "headache"]), store.diseases());

        let cold = scored.iter().find(|m| m.name == "Common Cold").unwrap();
        assert_eq!(cold.match_count, 3);
        assert!(scored.iter().all(|m| m.name != "Acne"));
    }

    #[test]
    fn test_rank_order_and_tie_break() {
        let store = store();
        let ranked = rank(score(&symptoms(&["fever", "cough", "headache"]), store.diseases()));

        let names: Vec<(&str, usize)> = ranked.iter().map(|m| (m.name.as_str(), m.match_count)).collect();
        assert_eq!(
            names,
            vec![("Common Cold", 3), ("Flu", 2), ("Pneumonia", 2), ("Migraine", 1)]
        );

        for pair in ranked.windows(2) {
            assert_ne!(ranking_order(&pair[0], &pair[1]), Ordering::Greater);
        }
    }

    #[test]
    fn test_rank_independent_of_input_order() {
        let store = store();
        let input = symptoms(&["fever", "cough"]);

        let mut forward = score(&input, store.diseases());
        let mut reversed = forward.clone();
        reversed.reverse();
        forward = rank(forward);

        assert_eq!(forward, rank(reversed));
    }

    #[test]
    fn test_no_symptoms_no_matches() {
        let store = store();
        assert!(score(&BTreeSet::new(), store.diseases()).is_empty());
        assert!(score(&symptoms(&["itching"]), store.diseases()).is_empty());
    }

    #[test]
    fn test_matched_symptoms_sorted() {
        let store = store();
        let scored = score(&symptoms(&["headache", "nausea"]), store.diseases());
        let migraine = scored.iter().find(|m| m.name == "Migraine").unwrap();

        let ids: Vec<&str> = migraine.matched_symptoms.iter().map(|s| s.as_str()).collect();
        assert_eq!(ids, vec!["headache", "nausea"]);
    }
}
