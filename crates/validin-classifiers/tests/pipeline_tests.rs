//! Detection pipeline integration tests
//!
//! Exercises the full preprocessing path against stub classifiers.


use mock_classifiers::{FailingClassifier, IdEchoClassifier, MockClassifier};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use validin_classifiers::{DecisionPolicy, HoaxDetector, Preprocessor, SharedDetector, VocabularyIndex};
use validin_core::{Error, Label, SequenceClassifier};

fn vocabulary() -> Arc<VocabularyIndex> {
    let map: HashMap<String, u32> = [
        ("pemerintah", 1),
        ("mengumumkan", 2),
        ("kebijakan", 3),
        ("vaksin", 4),
        ("chip", 5),
        ("berita", 6),
        ("hoaks", 8),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();

    Arc::new(VocabularyIndex::new(map, None).unwrap())
}

fn detector(classifier: Arc<dyn SequenceClassifier>) -> HoaxDetector {
    let preprocessor = Preprocessor::new(vocabulary()).unwrap();
    HoaxDetector::new(preprocessor, classifier, DecisionPolicy::default()).unwrap()
}

#[tokio::test]
async fn test_empty_input_skips_classifier() {
    let mock = Arc::new(MockClassifier::new("mock").with_score(0.9));
    let detector = detector(mock.clone());

    for text in ["", "   ", "\n\t"] {
        let err = detector.detect(text).await.unwrap_err();
        assert!(matches!(err, Error::EmptyInput), "{:?} gave {:?}", text, err);
        assert!(err.is_rejection());
    }

    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_stopwords_and_noise_are_unprocessable() {
    let mock = Arc::new(MockClassifier::new("mock").with_score(0.9));
    let detector = detector(mock.clone());

    let err = detector
        .detect("yang dan di @user http://x.com")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::UnprocessableText));
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_unknown_words_only_are_unprocessable() {
    let mock = Arc::new(MockClassifier::new("mock"));
    let detector = detector(mock.clone());

    let err = detector.detect("Gempa bumi mengguncang Sulawesi").await.unwrap_err();
    assert!(matches!(err, Error::UnprocessableText));
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_high_hoax_probability_is_hoax() {
    let mock = Arc::new(MockClassifier::new("mock").with_score(0.95));
    let detector = detector(mock.clone());

    let detection = detector
        .detect("Pemerintah mengumumkan kebijakan baru hari ini")
        .await
        .unwrap();

    assert_eq!(detection.verdict.label, Label::Hoax);
    assert_eq!(format!("{:.2}", detection.verdict.confidence), "95.00");
    assert_eq!(detection.verdict.to_string(), "HOAX (95.00%)");
    assert_eq!(detection.token_count, 3);
    assert_eq!(detection.known_token_count, 3);
    assert_eq!(mock.call_count(), 1);
}

#[tokio::test]
async fn test_low_hoax_probability_is_valid() {
    let mock = Arc::new(MockClassifier::new("mock").with_score(0.10));
    let detector = detector(mock);

    let detection = detector
        .detect("Pemerintah mengumumkan kebijakan baru hari ini")
        .await
        .unwrap();

    assert_eq!(detection.verdict.label, Label::Valid);
    assert_eq!(format!("{:.2}", detection.verdict.confidence), "90.00");
}

#[tokio::test]
async fn test_threshold_value_itself_is_valid() {
    let detector = detector(Arc::new(MockClassifier::new("mock").with_score(0.6)));

    let detection = detector.detect("berita vaksin").await.unwrap();
    assert_eq!(detection.verdict.label, Label::Valid);
    assert_eq!(format!("{:.2}", detection.verdict.confidence), "40.00");
}

#[tokio::test]
async fn test_custom_threshold() {
    let preprocessor = Preprocessor::new(vocabulary()).unwrap();
    let detector = HoaxDetector::new(
        preprocessor,
        Arc::new(MockClassifier::new("mock").with_score(0.55)),
        DecisionPolicy::new(0.5).unwrap(),
    )
    .unwrap();

    let detection = detector.detect("berita vaksin").await.unwrap();
    assert!(detection.verdict.is_hoax());
}

#[tokio::test]
async fn test_classifier_failure_is_not_a_rejection() {
    let detector = detector(Arc::new(FailingClassifier::new("failing")));

    let err = detector.detect("berita vaksin").await.unwrap_err();
    assert!(matches!(err, Error::Classifier(_)));
    assert!(!err.is_rejection());
}

#[tokio::test]
async fn test_batch_preserves_input_order() {
    let detector = detector(Arc::new(IdEchoClassifier));

    let results = detector
        .detect_batch(&["berita hoaks", "", "pemerintah kebijakan", "yang dan", "vaksin chip"])
        .await
        .unwrap();

    assert_eq!(results.len(), 5);

    let first = results[0].as_ref().unwrap();
    assert_eq!(first.verdict.label, Label::Hoax);
    assert!((first.prediction.hoax - 0.8).abs() < 1e-9);

    assert!(matches!(results[1], Err(Error::EmptyInput)));

    let third = results[2].as_ref().unwrap();
    assert!((third.prediction.hoax - 0.3).abs() < 1e-9);

    assert!(matches!(results[3], Err(Error::UnprocessableText)));

    let fifth = results[4].as_ref().unwrap();
    assert!((fifth.prediction.hoax - 0.5).abs() < 1e-9);
    assert_eq!(fifth.verdict.label, Label::Valid);
}

#[tokio::test]
async fn test_batch_uses_one_classifier_call() {
    let mock = Arc::new(MockClassifier::new("mock").with_score(0.7));
    let detector = detector(mock.clone());

    let texts = vec!["berita vaksin", "chip", "", "pemerintah"];
    let results = detector.detect_batch(&texts).await.unwrap();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 3);
    assert_eq!(mock.call_count(), 1);
    assert_eq!(mock.batch_sizes(), vec![3]);
}

#[tokio::test]
async fn test_batch_of_rejections_skips_classifier() {
    let mock = Arc::new(MockClassifier::new("mock"));
    let detector = detector(mock.clone());

    let results = detector.detect_batch(&["", "yang"]).await.unwrap();
    assert!(results.iter().all(|r| r.is_err()));
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_batch_classifier_failure_fails_batch() {
    let detector = detector(Arc::new(FailingClassifier::new("failing")));
    assert!(detector.detect_batch(&["berita", "vaksin"]).await.is_err());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_shared_detector_loads_once() {
    let shared = Arc::new(SharedDetector::new());
    let loads = Arc::new(AtomicU32::new(0));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let shared = shared.clone();
        let loads = loads.clone();
        handles.push(tokio::spawn(async move {
            shared
                .get_or_try_init_with(|| async move {
                    loads.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    Ok(detector(Arc::new(MockClassifier::new("shared"))))
                })
                .await
                .unwrap()
        }));
    }

    let detectors = futures::future::join_all(handles).await;
    let first = detectors[0].as_ref().unwrap().clone();

    for detector in &detectors {
        assert!(Arc::ptr_eq(&first, detector.as_ref().unwrap()));
    }
    assert_eq!(loads.load(Ordering::SeqCst), 1);
    assert!(shared.get().is_some());
}
