use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info, warn};

use crate::features::content::backends::{ContentBackend, Document};
use crate::features::content::clients::HeroRemote;
use crate::features::content::models::{
    default_content, normalize_hero, ContentEvent, SectionKind, SyncPolicy,
};
use crate::shared::constants::{CONTENT_EVENT_CAPACITY, CONTENT_STORAGE_KEY};

/// Site content document with per-section defaults and change notifications.
///
/// Reads never fail: a missing or unreadable section resolves to its default.
/// Only the hero remote is bounded by a timeout.
pub struct ContentStore {
    backend: Arc<dyn ContentBackend>,
    hero_remote: Option<Arc<dyn HeroRemote>>,
    remote_timeout: Duration,
    events: broadcast::Sender<ContentEvent>,
    // Serializes read-modify-write cycles on the local document
    write_lock: Mutex<()>,
}

impl ContentStore {
    pub fn new(
        backend: Arc<dyn ContentBackend>,
        hero_remote: Option<Arc<dyn HeroRemote>>,
        remote_timeout: Duration,
    ) -> Self {
        let (events, _) = broadcast::channel(CONTENT_EVENT_CAPACITY);
        Self {
            backend,
            hero_remote,
            remote_timeout,
            events,
            write_lock: Mutex::new(()),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ContentEvent> {
        self.events.subscribe()
    }

    /// Current content of one section
    pub async fn get_section(&self, section: SectionKind) -> Value {
        if let Some(remote) = self.remote_for(section) {
            match tokio::time::timeout(self.remote_timeout, remote.fetch()).await {
                Ok(Ok(data)) => return data,
                Ok(Err(e)) => warn!("Hero remote fetch failed, using local copy: {}", e),
                Err(_) => warn!(
                    "Hero remote fetch timed out after {:?}, using local copy",
                    self.remote_timeout
                ),
            }
        }

        self.read_local(section).await
    }

    /// Every section, defaults filled in
    pub async fn get_all(&self) -> Document {
        let mut all = Document::new();
        for section in SectionKind::ALL {
            all.insert(section.as_str().to_string(), self.get_section(section).await);
        }
        all
    }

    /// Replace a section. Returns false only when the local write fails.
    pub async fn update_section(&self, section: SectionKind, data: Value) -> bool {
        let data = match section {
            SectionKind::Hero => normalize_hero(data),
            _ => data,
        };

        if let Some(remote) = self.remote_for(section) {
            match tokio::time::timeout(self.remote_timeout, remote.push(&data)).await {
                Ok(Ok(())) => {
                    info!("Content section updated remotely: {}", section);
                    self.notify(section);
                    return true;
                }
                Ok(Err(e)) => warn!("Hero remote update failed, saving locally: {}", e),
                Err(_) => warn!(
                    "Hero remote update timed out after {:?}, saving locally",
                    self.remote_timeout
                ),
            }
        }

        let _guard = self.write_lock.lock().await;

        let mut document = match self.backend.load(CONTENT_STORAGE_KEY).await {
            Ok(Some(document)) => document,
            Ok(None) => default_content(),
            Err(e) => {
                warn!("Could not read stored content, starting from defaults: {}", e);
                default_content()
            }
        };
        document.insert(section.as_str().to_string(), data);

        if let Err(e) = self.backend.save(CONTENT_STORAGE_KEY, &document).await {
            error!("Failed to save content section {}: {}", section, e);
            return false;
        }

        info!("Content section updated: {}", section);
        self.notify(section);
        true
    }

    /// Overwrite the local document with the defaults
    pub async fn reset(&self) -> bool {
        let _guard = self.write_lock.lock().await;

        if let Err(e) = self.backend.save(CONTENT_STORAGE_KEY, &default_content()).await {
            error!("Failed to reset content: {}", e);
            return false;
        }

        info!("Content reset to defaults");
        self.send(ContentEvent::StorageChanged);
        for section in SectionKind::ALL {
            self.send(ContentEvent::SectionUpdated { section });
        }
        true
    }

    fn remote_for(&self, section: SectionKind) -> Option<&Arc<dyn HeroRemote>> {
        match section.sync_policy() {
            SyncPolicy::RemoteFirst => self.hero_remote.as_ref(),
            SyncPolicy::LocalOnly => None,
        }
    }

    async fn read_local(&self, section: SectionKind) -> Value {
        let key = section.as_str();

        match self.backend.load(CONTENT_STORAGE_KEY).await {
            Ok(Some(document)) => {
                if let Some(value) = document.get(key) {
                    return value.clone();
                }
            }
            Ok(None) => {}
            Err(e) => {
                warn!("Could not read stored content, using default for {}: {}", key, e);
                return section.default_document();
            }
        }

        let default = section.default_document();
        self.seed(section, &default).await;
        default
    }

    /// Write a section's default into the local document if it is still absent
    async fn seed(&self, section: SectionKind, default: &Value) {
        let _guard = self.write_lock.lock().await;

        let mut document = match self.backend.load(CONTENT_STORAGE_KEY).await {
            Ok(document) => document.unwrap_or_default(),
            Err(_) => return,
        };
        if document.contains_key(section.as_str()) {
            return;
        }
        document.insert(section.as_str().to_string(), default.clone());

        match self.backend.save(CONTENT_STORAGE_KEY, &document).await {
            Ok(()) => debug!("Seeded default content for {}", section),
            Err(e) => warn!("Could not seed default content for {}: {}", section, e),
        }
    }

    fn notify(&self, section: SectionKind) {
        self.send(ContentEvent::StorageChanged);
        self.send(ContentEvent::SectionUpdated { section });
    }

    fn send(&self, event: ContentEvent) {
        if self.events.send(event).is_err() {
            debug!("No content listeners for {:?}", event);
        }
    }
}
