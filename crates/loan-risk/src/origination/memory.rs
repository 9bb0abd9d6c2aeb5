use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::repository::{
    AssessmentId, AssessmentRecord, AssessmentRepository, AuditError, AuditEvent, AuditPublisher,
    RepositoryError,
};
use crate::assessment::ApplicationId;

type RecordMap = HashMap<AssessmentId, AssessmentRecord>;

/// Process-local repository used by the CLI and tests.
#[derive(Debug, Default, Clone)]
pub struct InMemoryAssessmentRepository {
    records: Arc<Mutex<RecordMap>>,
}

impl InMemoryAssessmentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, RecordMap>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
    }
}

impl AssessmentRepository for InMemoryAssessmentRepository {
    fn insert(&self, record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError> {
        let mut guard = self.lock()?;
        if guard.contains_key(&record.assessment_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.assessment_id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: AssessmentRecord) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        match guard.get_mut(&record.assessment_id) {
            Some(existing) => {
                *existing = record;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: &AssessmentId) -> Result<Option<AssessmentRecord>, RepositoryError> {
        Ok(self.lock()?.get(id).cloned())
    }

    fn by_application(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        let guard = self.lock()?;
        let mut records: Vec<AssessmentRecord> = guard
            .values()
            .filter(|record| &record.result.application_id == application_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.assessment_id.cmp(&b.assessment_id));
        Ok(records)
    }
}

/// Audit publisher that keeps every event in memory.
#[derive(Debug, Default, Clone)]
pub struct InMemoryAuditPublisher {
    events: Arc<Mutex<Vec<AuditEvent>>>,
}

impl InMemoryAuditPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.events
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl AuditPublisher for InMemoryAuditPublisher {
    fn publish(&self, event: AuditEvent) -> Result<(), AuditError> {
        let mut guard = self
            .events
            .lock()
            .map_err(|_| AuditError::Transport("audit mutex poisoned".to_string()))?;
        guard.push(event);
        Ok(())
    }
}
