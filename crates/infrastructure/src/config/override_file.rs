use autoptr6_application::ports::OverrideSource;
use autoptr6_domain::DomainError;

/// Reads override files from the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileOverrideSource;

impl FileOverrideSource {
    pub fn new() -> Self {
        Self
    }
}

impl OverrideSource for FileOverrideSource {
    fn read(&self, location: &str) -> Result<String, DomainError> {
        std::fs::read_to_string(location).map_err(|e| {
            DomainError::IoError(format!("Failed to read overrides file '{}': {}", location, e))
        })
    }
}
