use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Correlation ID type for tracking a request across service boundaries
///
/// Uses UUID v4 for guaranteed uniqueness across distributed systems
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    /// Generate a new correlation ID using UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for CorrelationId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl From<&str> for CorrelationId {
    fn from(id: &str) -> Self {
        Uuid::try_parse(id).map_or_else(|_| Self(Uuid::new_v4()), Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_uuid_and_regenerates_on_garbage() {
        let id = CorrelationId::from("4f2c5dbb-2c30-4a4c-9e3b-7a3a64c7f1aa");
        assert_eq!(id.to_string(), "4f2c5dbb-2c30-4a4c-9e3b-7a3a64c7f1aa");

        let regenerated = CorrelationId::from("not-a-uuid");
        assert_ne!(regenerated.to_string(), "not-a-uuid");
    }
}
