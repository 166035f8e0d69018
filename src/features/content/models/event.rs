use crate::features::content::models::SectionKind;
use crate::shared::constants::CONTENT_STORAGE_KEY;

/// Change notification. Carries no document: listeners re-read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentEvent {
    /// The stored document changed
    StorageChanged,
    /// One section changed
    SectionUpdated { section: SectionKind },
}

impl ContentEvent {
    /// SSE event name
    pub fn name(&self) -> &'static str {
        match self {
            ContentEvent::StorageChanged => "storage",
            ContentEvent::SectionUpdated { .. } => "content-updated",
        }
    }

    /// SSE event data
    pub fn data(&self) -> &'static str {
        match self {
            ContentEvent::StorageChanged => CONTENT_STORAGE_KEY,
            ContentEvent::SectionUpdated { section } => section.as_str(),
        }
    }
}
