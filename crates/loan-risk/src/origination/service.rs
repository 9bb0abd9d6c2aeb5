use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::task::JoinSet;
use tracing::{info, warn};

use super::registry::{ConfigurationRegistry, RegistryError};
use super::repository::{
    AssessmentId, AssessmentRecord, AssessmentRepository, AuditError, AuditEvent, AuditPublisher,
    RepositoryError, ReviewOverride,
};
use crate::assessment::{
    ApplicantSnapshot, ApplicationId, AssessmentError, ConfigVersion, ConfigurationDraft,
    RiskAssessmentEngine, RiskConfiguration,
};

/// Service composing the configuration registry, the engine, and the persistence seams.
pub struct RiskAssessmentService<R, A> {
    registry: Arc<ConfigurationRegistry>,
    repository: Arc<R>,
    audit: Arc<A>,
    engine: Arc<RiskAssessmentEngine>,
}

static ASSESSMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_assessment_id() -> AssessmentId {
    let id = ASSESSMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    AssessmentId(format!("asm-{id:06}"))
}

impl<R, A> RiskAssessmentService<R, A>
where
    R: AssessmentRepository + 'static,
    A: AuditPublisher + 'static,
{
    pub fn new(registry: Arc<ConfigurationRegistry>, repository: Arc<R>, audit: Arc<A>) -> Self {
        Self {
            registry,
            repository,
            audit,
            engine: Arc::new(RiskAssessmentEngine::new()),
        }
    }

    pub fn registry(&self) -> &ConfigurationRegistry {
        &self.registry
    }

    /// Store a new inactive configuration and audit its creation.
    pub fn create_configuration(
        &self,
        draft: ConfigurationDraft,
    ) -> Result<RiskConfiguration, AssessmentServiceError> {
        let configuration = self.registry.create(draft)?;
        self.audit.publish(AuditEvent::new(
            "configuration_created",
            configuration.version().0.clone(),
        ))?;
        Ok(configuration)
    }

    pub fn activate_configuration(
        &self,
        version: &ConfigVersion,
    ) -> Result<(), AssessmentServiceError> {
        let previous = self.registry.activate(version)?;
        let mut event = AuditEvent::new("configuration_activated", version.0.clone());
        if let Some(previous) = previous {
            event = event.with_detail("previous_version", previous);
        }
        self.audit.publish(event)?;
        Ok(())
    }

    /// Assess against the active configuration and persist the result.
    pub fn assess(
        &self,
        snapshot: &ApplicantSnapshot,
        assessed_at: DateTime<Utc>,
    ) -> Result<AssessmentRecord, AssessmentServiceError> {
        let configuration = self.resolve_active()?;
        self.assess_with(snapshot, &configuration, assessed_at)
    }

    /// Assess against a named version, active or not. Used for what-if comparisons.
    pub fn assess_with_version(
        &self,
        snapshot: &ApplicantSnapshot,
        version: &ConfigVersion,
        assessed_at: DateTime<Utc>,
    ) -> Result<AssessmentRecord, AssessmentServiceError> {
        let configuration = self.registry.get(version)?;
        self.assess_with(snapshot, &configuration, assessed_at)
    }

    /// Assess independent applications concurrently, returning outcomes in input order.
    ///
    /// The active configuration is resolved once, so every application in the batch is scored
    /// against the same version even if another version is activated meanwhile. At most
    /// `concurrency` assessments run at a time.
    pub async fn assess_batch(
        self: Arc<Self>,
        snapshots: Vec<ApplicantSnapshot>,
        assessed_at: DateTime<Utc>,
        concurrency: usize,
    ) -> Result<Vec<Result<AssessmentRecord, AssessmentServiceError>>, AssessmentServiceError>
    {
        let configuration = Arc::new(self.resolve_active()?);
        let limit = concurrency.max(1);
        let total = snapshots.len();
        info!(
            applications = total,
            concurrency = limit,
            config_version = %configuration.version(),
            "batch assessment started"
        );

        let mut pending = snapshots.into_iter().enumerate();
        let mut slots: Vec<Option<Result<AssessmentRecord, AssessmentServiceError>>> =
            (0..total).map(|_| None).collect();
        let mut workers = JoinSet::new();

        loop {
            while workers.len() < limit {
                let Some((index, snapshot)) = pending.next() else {
                    break;
                };
                let service = Arc::clone(&self);
                let configuration = Arc::clone(&configuration);
                workers.spawn_blocking(move || {
                    let outcome = service.assess_with(&snapshot, &configuration, assessed_at);
                    (index, outcome)
                });
            }

            let Some(joined) = workers.join_next().await else {
                break;
            };
            let (index, outcome) =
                joined.map_err(|err| AssessmentServiceError::Worker(err.to_string()))?;
            if let Err(err) = &outcome {
                warn!(index, error = %err, "batch assessment entry failed");
            }
            slots[index] = Some(outcome);
        }

        Ok(slots.into_iter().flatten().collect())
    }

    /// Append a reviewer decision. The engine's result stays exactly as produced.
    pub fn record_override(
        &self,
        assessment_id: &AssessmentId,
        review: ReviewOverride,
    ) -> Result<AssessmentRecord, AssessmentServiceError> {
        let mut record = self
            .repository
            .fetch(assessment_id)?
            .ok_or(RepositoryError::NotFound)?;

        let event = AuditEvent::new("assessment_overridden", assessment_id.0.clone())
            .with_detail("reviewer", &review.reviewer)
            .with_detail("engine_recommendation", record.result.recommendation.label())
            .with_detail("override_recommendation", review.recommendation.label())
            .with_detail("reason", &review.reason);

        record.overrides.push(review);
        self.repository.update(record.clone())?;
        self.audit.publish(event)?;
        Ok(record)
    }

    pub fn get(
        &self,
        assessment_id: &AssessmentId,
    ) -> Result<AssessmentRecord, AssessmentServiceError> {
        let record = self
            .repository
            .fetch(assessment_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    pub fn history(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Vec<AssessmentRecord>, AssessmentServiceError> {
        Ok(self.repository.by_application(application_id)?)
    }

    fn resolve_active(&self) -> Result<RiskConfiguration, AssessmentServiceError> {
        self.registry.active().map_err(|err| match err {
            RegistryError::NoActive(missing) => AssessmentServiceError::Assessment(missing.into()),
            other => other.into(),
        })
    }

    fn assess_with(
        &self,
        snapshot: &ApplicantSnapshot,
        configuration: &RiskConfiguration,
        assessed_at: DateTime<Utc>,
    ) -> Result<AssessmentRecord, AssessmentServiceError> {
        let result = self.engine.assess(snapshot, configuration, assessed_at)?;
        let record = AssessmentRecord {
            assessment_id: next_assessment_id(),
            result,
            overrides: Vec::new(),
        };
        let stored = self.repository.insert(record)?;

        self.audit.publish(
            AuditEvent::new("assessment_completed", stored.assessment_id.0.clone())
                .with_detail("application_id", &stored.result.application_id.0)
                .with_detail("config_version", &stored.result.config_version)
                .with_detail("recommendation", stored.result.recommendation.label())
                .with_detail("risk_score", format!("{:.2}", stored.result.risk_score)),
        )?;
        Ok(stored)
    }
}

/// Error raised by the assessment service.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentServiceError {
    #[error(transparent)]
    Assessment(#[from] AssessmentError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Audit(#[from] AuditError),
    #[error("assessment worker failed: {0}")]
    Worker(String),
}
