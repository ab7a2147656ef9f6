//! Candidate disambiguation policies.
//!
//! Two policies exist side by side and callers choose per call site:
//! [`auto_pick`] selects the earliest-registered provider entry with no
//! interaction, while [`user_pick`] delegates the choice to a
//! [`CandidatePicker`] implementation (a list view, a stdin prompt, a test
//! stub).

use crate::provider::Candidate;

/// Select the candidate with the numerically lowest provider id.
///
/// Deterministic and independent of the input order.
pub fn auto_pick(candidates: &[Candidate]) -> Option<&Candidate> {
    candidates.iter().min_by_key(|candidate| candidate.id)
}

/// Chooses one candidate out of a provider result set.
pub trait CandidatePicker {
    /// Return the index of the chosen candidate, or `None` to abort.
    ///
    /// The slice is already sorted ascending by provider id.
    fn pick(&self, candidates: &[Candidate]) -> Option<usize>;
}

/// Present `candidates` sorted ascending by id and return the picked one.
///
/// Returns `None` when the list is empty, the picker declines, or the picker
/// answers with an out-of-range index; the caller must then abort the fetch
/// without mutating the collection.
pub fn user_pick(
    mut candidates: Vec<Candidate>,
    picker: &dyn CandidatePicker,
) -> Option<Candidate> {
    if candidates.is_empty() {
        return None;
    }
    candidates.sort_by_key(|candidate| candidate.id);
    let index = picker.pick(&candidates)?;
    if index < candidates.len() {
        Some(candidates.swap_remove(index))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: u64, name: &str) -> Candidate {
        Candidate {
            id,
            name: name.to_string(),
            ..Candidate::default()
        }
    }

    struct FixedPicker(Option<usize>);

    impl CandidatePicker for FixedPicker {
        fn pick(&self, _candidates: &[Candidate]) -> Option<usize> {
            self.0
        }
    }

    #[test]
    fn auto_pick_selects_minimum_id_regardless_of_order() {
        let forward = vec![
            candidate(42, "Remake"),
            candidate(7, "Original"),
            candidate(100, "Remaster"),
        ];
        let mut backward = forward.clone();
        backward.reverse();

        assert_eq!(auto_pick(&forward).map(|c| c.id), Some(7));
        assert_eq!(auto_pick(&backward).map(|c| c.id), Some(7));
        assert!(auto_pick(&[]).is_none());
    }

    #[test]
    fn user_pick_presents_candidates_sorted_by_id() {
        struct AssertSorted;
        impl CandidatePicker for AssertSorted {
            fn pick(&self, candidates: &[Candidate]) -> Option<usize> {
                let ids: Vec<u64> = candidates.iter().map(|c| c.id).collect();
                assert_eq!(ids, vec![7, 42, 100]);
                Some(1)
            }
        }

        let candidates = vec![
            candidate(100, "Remaster"),
            candidate(7, "Original"),
            candidate(42, "Remake"),
        ];
        let chosen = user_pick(candidates, &AssertSorted).expect("a candidate was picked");
        assert_eq!(chosen.id, 42);
    }

    #[test]
    fn declining_the_pick_aborts() {
        let candidates = vec![candidate(1, "Only")];
        assert!(user_pick(candidates, &FixedPicker(None)).is_none());
    }

    #[test]
    fn out_of_range_pick_aborts() {
        let candidates = vec![candidate(1, "Only")];
        assert!(user_pick(candidates, &FixedPicker(Some(5))).is_none());
    }
}
