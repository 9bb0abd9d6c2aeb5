//! Loan-origination plumbing around the engine: versioned configurations, persisted
//! assessments with reviewer overrides, and the audit trail.

mod memory;
mod registry;
mod repository;
mod service;

pub use memory::{InMemoryAssessmentRepository, InMemoryAuditPublisher};
pub use registry::{ConfigurationEntry, ConfigurationRegistry, RegistryError};
pub use repository::{
    AssessmentId, AssessmentRecord, AssessmentRepository, AssessmentStatusView, AuditError,
    AuditEvent, AuditPublisher, RepositoryError, ReviewOverride,
};
pub use service::{AssessmentServiceError, RiskAssessmentService};
