use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::assessment::{ApplicationId, AssessmentResult, Recommendation};

/// Identifier assigned to each persisted assessment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssessmentId(pub String);

impl fmt::Display for AssessmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Human decision layered on top of an engine result. The result itself is never edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewOverride {
    pub reviewer: String,
    pub recommendation: Recommendation,
    pub reason: String,
    pub recorded_at: DateTime<Utc>,
}

/// Repository record pairing the immutable engine output with review annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub assessment_id: AssessmentId,
    pub result: AssessmentResult,
    pub overrides: Vec<ReviewOverride>,
}

impl AssessmentRecord {
    /// Latest reviewer decision, falling back to the engine's recommendation.
    pub fn effective_recommendation(&self) -> Recommendation {
        self.overrides
            .last()
            .map(|entry| entry.recommendation)
            .unwrap_or(self.result.recommendation)
    }

    pub fn status_view(&self) -> AssessmentStatusView {
        AssessmentStatusView {
            assessment_id: self.assessment_id.clone(),
            application_id: self.result.application_id.clone(),
            risk_score: self.result.risk_score,
            risk_category: self.result.risk_category.label(),
            recommendation: self.effective_recommendation().label(),
            overridden: !self.overrides.is_empty(),
            summary: self.result.summary(),
        }
    }
}

/// Storage abstraction so the service can be exercised in isolation.
pub trait AssessmentRepository: Send + Sync {
    fn insert(&self, record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError>;
    fn update(&self, record: AssessmentRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &AssessmentId) -> Result<Option<AssessmentRecord>, RepositoryError>;
    fn by_application(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Vec<AssessmentRecord>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound audit hook (ledger, message bus, or e-mail adapters).
pub trait AuditPublisher: Send + Sync {
    fn publish(&self, event: AuditEvent) -> Result<(), AuditError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub action: String,
    pub subject: String,
    pub details: BTreeMap<String, String>,
}

impl AuditEvent {
    pub fn new(action: &str, subject: impl Into<String>) -> Self {
        Self {
            action: action.to_string(),
            subject: subject.into(),
            details: BTreeMap::new(),
        }
    }

    pub fn with_detail(mut self, key: &str, value: impl ToString) -> Self {
        self.details.insert(key.to_string(), value.to_string());
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("audit transport unavailable: {0}")]
    Transport(String),
}

/// Sanitized view of a persisted assessment for reports and listings.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentStatusView {
    pub assessment_id: AssessmentId,
    pub application_id: ApplicationId,
    pub risk_score: f64,
    pub risk_category: &'static str,
    pub recommendation: &'static str,
    pub overridden: bool,
    pub summary: String,
}
