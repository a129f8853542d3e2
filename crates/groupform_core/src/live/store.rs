//! Registration store wrapper that republishes collections after writes.

use super::{Broadcaster, LiveEvent, Subscription};
use crate::model::registration::{Group, RecordId, RecordKind, SoloEntry};
use crate::repo::registration_repo::{RegistrationStore, StoreResult};
use crate::validation::{ValidGroup, ValidSoloEntry};
use log::warn;

/// Live view over a `RegistrationStore`.
///
/// Every successful create/delete is followed by a full re-read of the
/// affected collection, published to its subscribers.
pub struct LiveRegistrationStore<S: RegistrationStore> {
    store: S,
    groups: Broadcaster<Group>,
    solo: Broadcaster<SoloEntry>,
}

impl<S: RegistrationStore> LiveRegistrationStore<S> {
    /// Wraps `store` and publishes its initial contents.
    pub fn new(store: S) -> Self {
        let live = Self {
            store,
            groups: Broadcaster::new(),
            solo: Broadcaster::new(),
        };
        live.refresh_groups();
        live.refresh_solo();
        live
    }

    /// Subscribes to the groups collection.
    pub fn watch_groups(&self) -> Subscription<Group> {
        self.groups.subscribe()
    }

    /// Subscribes to the solo collection.
    pub fn watch_solo(&self) -> Subscription<SoloEntry> {
        self.solo.subscribe()
    }

    /// Re-reads groups and publishes the result.
    pub fn refresh_groups(&self) {
        let event = match self.store.read_all_groups() {
            Ok(groups) => LiveEvent::Snapshot(groups),
            Err(err) => {
                warn!(
                    "event=live_refresh module=live status=error collection=groups error_code={} error={err}",
                    err.code()
                );
                LiveEvent::Failed("Failed to fetch groups.".to_string())
            }
        };
        self.groups.publish(event);
    }

    /// Re-reads solo entries and publishes the result.
    pub fn refresh_solo(&self) {
        let event = match self.store.read_all_solo() {
            Ok(entries) => LiveEvent::Snapshot(entries),
            Err(err) => {
                warn!(
                    "event=live_refresh module=live status=error collection=solo error_code={} error={err}",
                    err.code()
                );
                LiveEvent::Failed("Failed to fetch solo students.".to_string())
            }
        };
        self.solo.publish(event);
    }

    fn refresh(&self, kind: RecordKind) {
        match kind {
            RecordKind::Group => self.refresh_groups(),
            RecordKind::Solo => self.refresh_solo(),
        }
    }
}

impl<S: RegistrationStore> RegistrationStore for LiveRegistrationStore<S> {
    fn read_all_groups(&self) -> StoreResult<Vec<Group>> {
        self.store.read_all_groups()
    }

    fn read_all_solo(&self) -> StoreResult<Vec<SoloEntry>> {
        self.store.read_all_solo()
    }

    fn create_group(&self, group: &ValidGroup, creator_id: Option<&str>) -> StoreResult<RecordId> {
        let id = self.store.create_group(group, creator_id)?;
        self.refresh(RecordKind::Group);
        Ok(id)
    }

    fn create_solo(
        &self,
        entry: &ValidSoloEntry,
        creator_id: Option<&str>,
    ) -> StoreResult<RecordId> {
        let id = self.store.create_solo(entry, creator_id)?;
        self.refresh(RecordKind::Solo);
        Ok(id)
    }

    fn delete_record(&self, kind: RecordKind, id: RecordId) -> StoreResult<()> {
        self.store.delete_record(kind, id)?;
        self.refresh(kind);
        Ok(())
    }
}
