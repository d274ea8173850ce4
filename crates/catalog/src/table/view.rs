use def::RawDescriptor;

/// A stored query. Views have no physical layout; everything about them is in
/// the metastore descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    original_text: Option<String>,
    expanded_text: Option<String>,
}

impl View {
    pub(crate) fn new(descriptor: &RawDescriptor) -> Self {
        Self {
            original_text: descriptor.view_original_text.clone(),
            expanded_text: descriptor.view_expanded_text.clone(),
        }
    }

    pub fn original_text(&self) -> Option<&str> {
        self.original_text.as_deref()
    }

    /// The fully qualified query, falling back to the text as written.
    pub fn query_text(&self) -> Option<&str> {
        self.expanded_text.as_deref().or(self.original_text())
    }
}
