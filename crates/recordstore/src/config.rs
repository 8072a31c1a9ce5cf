//! Engine configuration.

use recordstore_core::Record;

/// Caller-supplied engine configuration.
///
/// The configuration is immutable once the engine is built; to change
/// it, build a new engine with [`Engine::with_config`](crate::Engine::with_config).
///
/// `stage` selects the physical table name from the schema's per-stage
/// maps. `service`, `call`, and `user_data` are audit-log context and
/// default to the `"UNKNOWN"` sentinel / an empty map when absent.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub stage: String,
    pub service: Option<String>,
    pub call: Option<String>,
    pub user_data: Option<Record>,
}

impl EngineConfig {
    /// Creates a configuration for the given deployment stage.
    pub fn new(stage: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            service: None,
            call: None,
            user_data: None,
        }
    }

    /// Sets the service name recorded in audit entries.
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    /// Sets the calling operation name recorded in audit entries.
    pub fn with_call(mut self, call: impl Into<String>) -> Self {
        self.call = Some(call.into());
        self
    }

    /// Sets arbitrary caller context recorded in audit entries.
    pub fn with_user_data(mut self, user_data: Record) -> Self {
        self.user_data = Some(user_data);
        self
    }
}
