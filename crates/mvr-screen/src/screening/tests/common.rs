use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::screening::domain::{FactRecord, MajorIndicators, ScreeningId, ViolationEntry};
use crate::screening::evaluation::{PolicyEngine, PolicyThresholds};
use crate::screening::extraction::{
    ExtractionError, FactExtractor, JsonFactExtractor, SourceDocument,
};
use crate::screening::repository::{RepositoryError, ScreeningRecord, ScreeningRepository};
use crate::screening::{screening_router, ScreeningService};

pub(super) fn thresholds() -> PolicyThresholds {
    PolicyThresholds {
        accident_threshold: 2,
        uninspected_vehicle_threshold: 2,
    }
}

pub(super) fn policy_engine() -> PolicyEngine {
    PolicyEngine::standard(&thresholds()).expect("standard policy is valid")
}

pub(super) fn clean_record() -> FactRecord {
    FactRecord {
        unreadable: false,
        license_status: Some("VALID".to_string()),
        cdl_class: Some("A".to_string()),
        missing_endorsements: false,
        medical_cert_expired: false,
        accident_count: 0,
        violations: vec![ViolationEntry {
            incident_date: Some("2023-06-14".to_string()),
            conviction_date: Some("2023-08-01".to_string()),
            description: "Failure to signal lane change".to_string(),
        }],
        major_indicators: MajorIndicators::default(),
    }
}

pub(super) fn uninspected(description: &str) -> ViolationEntry {
    ViolationEntry {
        incident_date: Some("2024-02-10".to_string()),
        conviction_date: None,
        description: description.to_string(),
    }
}

/// Record that trips every rule in the standard table.
pub(super) fn worst_record() -> FactRecord {
    let mut indicators = MajorIndicators::default();
    for indicator in crate::screening::MajorIndicator::ALL {
        indicators.set(indicator, true);
    }
    FactRecord {
        unreadable: false,
        license_status: Some("SUSPENDED".to_string()),
        cdl_class: Some("A".to_string()),
        missing_endorsements: true,
        medical_cert_expired: true,
        accident_count: 4,
        violations: vec![
            uninspected("Operate Uninspected Vehicle"),
            uninspected("UNINSPECTED VEHICLE - CDL"),
        ],
        major_indicators: indicators,
    }
}

pub(super) fn json_document(name: &str, facts: &FactRecord) -> SourceDocument {
    SourceDocument::new(name, serde_json::to_vec(facts).expect("facts serialize"))
}

pub(super) fn build_service() -> (
    ScreeningService<JsonFactExtractor, MemoryRepository>,
    Arc<MemoryRepository>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let service = ScreeningService::new(
        Arc::new(JsonFactExtractor),
        repository.clone(),
        policy_engine(),
    );
    (service, repository)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<ScreeningId, ScreeningRecord>>>,
}

impl ScreeningRepository for MemoryRepository {
    fn insert(&self, record: ScreeningRecord) -> Result<ScreeningRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &ScreeningId) -> Result<Option<ScreeningRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn recent(&self, limit: usize) -> Result<Vec<ScreeningRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut records: Vec<ScreeningRecord> = guard.values().cloned().collect();
        records.sort_by(|a, b| b.received_at.cmp(&a.received_at));
        records.truncate(limit);
        Ok(records)
    }
}

pub(super) struct UnavailableRepository;

impl ScreeningRepository for UnavailableRepository {
    fn insert(&self, _record: ScreeningRecord) -> Result<ScreeningRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ScreeningId) -> Result<Option<ScreeningRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn recent(&self, _limit: usize) -> Result<Vec<ScreeningRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Extractor standing in for an unreachable upstream service.
pub(super) struct OfflineExtractor;

impl FactExtractor for OfflineExtractor {
    fn extract(&self, _document: &SourceDocument) -> Result<FactRecord, ExtractionError> {
        Err(ExtractionError::Unavailable("extraction service timed out".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn router_with_service(
    service: ScreeningService<JsonFactExtractor, MemoryRepository>,
) -> axum::Router {
    screening_router(Arc::new(service))
}
