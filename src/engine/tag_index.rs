use std::collections::BTreeSet;

use crate::corpus::Question;

/// Every tag referenced by the corpus, deduplicated and sorted.
pub fn build_tag_index(questions: &[Question]) -> Vec<String> {
    tag_universe(questions).into_iter().collect()
}

pub fn tag_universe(questions: &[Question]) -> BTreeSet<String> {
    questions
        .iter()
        .flat_map(|q| q.tags.iter().cloned())
        .collect()
}
