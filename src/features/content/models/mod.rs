mod event;
mod section;

pub use event::ContentEvent;
pub use section::{default_content, normalize_hero, SectionKind, SyncPolicy};
