use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Mapping,
    Screening,
}

/// Failure raised by an external service client.
///
/// `transient` separates conditions worth retrying (connection refused,
/// timeouts, 429/5xx) from contract violations that must abort the batch.
#[derive(Debug, Clone)]
pub struct ServiceError {
    pub service: Service,
    pub stage: &'static str,
    pub detail: String,
    pub transient: bool,
}

impl ServiceError {
    pub fn transient(service: Service, stage: &'static str, detail: impl Into<String>) -> Self {
        Self {
            service,
            stage,
            detail: detail.into(),
            transient: true,
        }
    }

    pub fn permanent(service: Service, stage: &'static str, detail: impl Into<String>) -> Self {
        Self {
            service,
            stage,
            detail: detail.into(),
            transient: false,
        }
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "service error (service={:?}, stage={}, transient={}): {}",
            self.service, self.stage, self.transient, self.detail
        )
    }
}

impl std::error::Error for ServiceError {}

/// True when any error in the chain is a transient [`ServiceError`].
pub fn is_transient(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<ServiceError>())
        .any(|e| e.transient)
}
