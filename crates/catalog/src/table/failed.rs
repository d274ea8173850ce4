use {crate::error::LoadError, std::sync::Arc};

#[derive(Debug, Clone)]
pub struct FailedTable {
    error: Arc<LoadError>,
}

impl FailedTable {
    pub(crate) fn new(error: Arc<LoadError>) -> Self {
        Self { error }
    }

    pub fn error(&self) -> &Arc<LoadError> {
        &self.error
    }
}
