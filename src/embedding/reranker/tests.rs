use super::*;

#[test]
fn test_stub_loads_without_model() {
    let reranker = Reranker::stub().expect("stub should load");
    assert!(!reranker.is_model_loaded());
    assert_eq!(reranker.config().batch_size, DEFAULT_BATCH_SIZE);
}

#[test]
fn test_invalid_batch_size_rejected() {
    let err = Reranker::load(RerankerConfig::stub().with_batch_size(0)).unwrap_err();
    assert!(matches!(err, RerankerError::InvalidConfig { .. }));
}

#[test]
fn test_missing_model_files_rejected() {
    let dir = tempfile::TempDir::new().unwrap();
    let err = Reranker::load(RerankerConfig::new(dir.path())).unwrap_err();
    match err {
        RerankerError::ModelLoadFailed { reason } => assert!(reason.contains("config.json")),
        other => panic!("Expected ModelLoadFailed, got {other:?}"),
    }
}

#[test]
fn test_stub_scores_preserve_order() {
    let reranker = Reranker::stub().unwrap();
    let query = "Cholera outbreak after the floods in Chad";
    let scores = reranker
        .score_pairs(&[
            (query, "Epidemic"),
            (query, "Flood"),
            (query, "Chad"),
            (query, "Earthquake"),
        ])
        .unwrap();

    assert_eq!(scores.len(), 4);
    assert_eq!(scores[0], 0.0);
    assert!(scores[2] > 0.0);
    assert_eq!(scores[3], 0.0);
}

#[test]
fn test_stub_scores_are_deterministic() {
    let reranker = Reranker::stub().unwrap();
    let pairs = [("food security in Yemen", "Food and Nutrition")];
    assert_eq!(
        reranker.score_pairs(&pairs).unwrap(),
        reranker.score_pairs(&pairs).unwrap()
    );
}

#[test]
fn test_lexical_score_full_match_beats_partial() {
    let full = lexical_score("health clinics", "Health");
    let partial = lexical_score("health clinics", "Health and Education");
    let none = lexical_score("health clinics", "Shelter");

    assert!(full > partial);
    assert!(partial > none);
    assert_eq!(none, 0.0);
}

#[test]
fn test_lexical_score_ignores_stop_words() {
    assert_eq!(lexical_score("the and of", "The Gambia"), 0.0);
}
