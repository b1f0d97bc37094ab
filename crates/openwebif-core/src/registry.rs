// ── Channel registry ──
//
// Ordered list of configured channels plus the user's persisted rename
// map. Identifiers handed to the accessory host are positions in this
// list, assigned at load time and stable for the process lifetime.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::config::ChannelDef;
use crate::error::CoreError;
use crate::persist::{PersistError, PersistenceStore};

/// Store key for the rename map document.
pub(crate) const RENAME_MAP_KEY: &str = "names";

/// One channel as presented to the accessory host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelEntry {
    /// Device-native service reference; unique within a device.
    pub reference: String,
    /// Name from configuration.
    pub default_name: String,
    /// Name shown to the user; a persisted rename wins over the default.
    pub display_name: String,
    /// Position in the configured order.
    pub index: usize,
}

/// Ordered channel list with rename persistence.
pub struct ChannelRegistry {
    entries: Vec<ChannelEntry>,
    names: BTreeMap<String, String>,
}

impl ChannelRegistry {
    /// Build the registry from the configured channel list, applying any
    /// previously persisted renames.
    ///
    /// A missing or corrupt rename document is not fatal: the registry
    /// falls back to the configured defaults. An empty channel list gets
    /// one placeholder entry so the accessory always has an input to
    /// show.
    pub fn load(channels: &[ChannelDef], store: &dyn PersistenceStore) -> Self {
        let names = match store.get(RENAME_MAP_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<BTreeMap<String, String>>(&raw) {
                Ok(map) => map,
                Err(e) => {
                    warn!(error = %e, "rename map unreadable, using configured names");
                    BTreeMap::new()
                }
            },
            Ok(None) => {
                debug!("no rename map persisted yet");
                BTreeMap::new()
            }
            Err(e) => {
                warn!(error = %e, "could not read rename map, using configured names");
                BTreeMap::new()
            }
        };

        let defs: Vec<ChannelDef> = if channels.is_empty() {
            vec![ChannelDef {
                name: "No channels configured".into(),
                reference: "No references configured".into(),
            }]
        } else {
            channels.to_vec()
        };

        let entries = defs
            .into_iter()
            .enumerate()
            .map(|(index, def)| {
                let display_name = names.get(&def.reference).cloned().unwrap_or_else(|| def.name.clone());
                ChannelEntry {
                    reference: def.reference,
                    default_name: def.name,
                    display_name,
                    index,
                }
            })
            .collect();

        Self { entries, names }
    }

    /// All channels, in presentation order.
    pub fn entries(&self) -> &[ChannelEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Identifier for a device-reported reference.
    ///
    /// Unknown references map to 0 so the accessory host always gets a
    /// valid input index.
    pub fn identifier_for(&self, reference: &str) -> usize {
        self.entries
            .iter()
            .position(|e| e.reference == reference)
            .unwrap_or(0)
    }

    /// The channel at `identifier`.
    ///
    /// Out-of-range identifiers are rejected: the host only ever sees
    /// identifiers this registry produced, so anything else is a caller
    /// bug.
    pub fn entry(&self, identifier: usize) -> Result<&ChannelEntry, CoreError> {
        self.entries
            .get(identifier)
            .ok_or(CoreError::ChannelOutOfRange {
                identifier,
                count: self.entries.len(),
            })
    }

    /// Record a user rename and write the whole map back to the store.
    pub fn rename(
        &mut self,
        reference: &str,
        name: &str,
        store: &dyn PersistenceStore,
    ) -> Result<(), PersistError> {
        self.names.insert(reference.to_owned(), name.to_owned());
        if let Some(entry) = self.entries.iter_mut().find(|e| e.reference == reference) {
            entry.display_name = name.to_owned();
        }

        let raw = serde_json::to_string_pretty(&self.names)?;
        store.set(RENAME_MAP_KEY, &raw)?;
        store.flush()
    }
}
