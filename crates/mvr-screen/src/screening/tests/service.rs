use std::sync::Arc;

use super::common::*;
use crate::screening::domain::{Decision, FactRecord, ScreeningId, ViolationFlag};
use crate::screening::extraction::{ExtractionError, JsonFactExtractor, SourceDocument};
use crate::screening::repository::{RepositoryError, ScreeningRepository};
use crate::screening::{ScreeningService, ScreeningServiceError};

#[test]
fn screen_records_rejections_as_successful_outcomes() {
    let (service, repository) = build_service();

    let record = service
        .screen(json_document("driver-12.json", &worst_record()))
        .expect("rejections are not errors");

    assert_eq!(record.document_name, "driver-12.json");
    assert_eq!(record.outcome.result.decision, Decision::Reject);
    assert!(record.id.0.starts_with("mvr-"));

    let stored = repository
        .fetch(&record.id)
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(stored, record);
}

#[test]
fn screen_treats_empty_documents_as_unreadable() {
    let (service, _) = build_service();

    let record = service
        .screen(SourceDocument::new("empty.pdf", Vec::new()))
        .expect("empty upload decides");

    assert!(record.facts.unreadable);
    assert_eq!(record.outcome.result.decision, Decision::Reject);
    assert!(record
        .outcome
        .result
        .flags
        .contains(&ViolationFlag::InsufficientData));
}

#[test]
fn screen_propagates_malformed_payloads() {
    let (service, repository) = build_service();

    match service.screen(SourceDocument::new("garbled.json", "not json at all")) {
        Err(ScreeningServiceError::Extraction(ExtractionError::Malformed { .. })) => {}
        other => panic!("expected malformed extraction error, got {other:?}"),
    }
    assert!(repository
        .records
        .lock()
        .expect("repository mutex poisoned")
        .is_empty());
}

#[test]
fn extractor_outage_is_not_a_decision() {
    let service = ScreeningService::new(
        Arc::new(OfflineExtractor),
        Arc::new(MemoryRepository::default()),
        policy_engine(),
    );

    match service.screen(json_document("driver.json", &clean_record())) {
        Err(ScreeningServiceError::Extraction(ExtractionError::Unavailable(_))) => {}
        other => panic!("expected extractor outage, got {other:?}"),
    }
}

#[test]
fn repository_failures_surface_as_errors() {
    let service = ScreeningService::new(
        Arc::new(JsonFactExtractor),
        Arc::new(UnavailableRepository),
        policy_engine(),
    );

    match service.screen(json_document("driver.json", &clean_record())) {
        Err(ScreeningServiceError::Repository(RepositoryError::Unavailable(_))) => {}
        other => panic!("expected repository failure, got {other:?}"),
    }
}

#[test]
fn get_propagates_not_found() {
    let (service, _) = build_service();

    match service.get(&ScreeningId("mvr-missing".to_string())) {
        Err(ScreeningServiceError::Repository(RepositoryError::NotFound)) => {}
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn decide_does_not_store_anything() {
    let (service, repository) = build_service();
    let facts = FactRecord {
        accident_count: 3,
        ..FactRecord::default()
    };

    let result = service.decide(&facts);

    assert_eq!(result.decision, Decision::Reject);
    assert!(service.recent(10).expect("recent succeeds").is_empty());
    assert!(repository
        .records
        .lock()
        .expect("repository mutex poisoned")
        .is_empty());
}

#[test]
fn recent_returns_stored_screenings() {
    let (service, _) = build_service();
    service
        .screen(json_document("a.json", &clean_record()))
        .expect("screen a");
    service
        .screen(json_document("b.json", &worst_record()))
        .expect("screen b");

    let recent = service.recent(1).expect("recent succeeds");

    assert_eq!(recent.len(), 1);
}
