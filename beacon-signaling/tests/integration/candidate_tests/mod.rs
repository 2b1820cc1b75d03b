pub mod test_candidate_rejected;
pub mod test_early_candidates;
