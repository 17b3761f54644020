//! Reference tables loaded once at startup.
//!
//! [`ReferenceData`] is built before the log watcher is armed and is shared
//! read-only (behind an `Arc`) with the event handlers afterwards. Nothing
//! mutates it after [`ReferenceData::load`] returns.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::info;
use url::Url;

use crate::api::client::ApiClient;
use crate::api::models::{CharacterInfo, CustomizationItem};
use crate::api::{check_http_response, endpoint, ApiError};

/// Records that carry their own id, so array-shaped tables can be keyed.
trait Keyed {
    fn key(&self) -> &str;
    fn set_key(&mut self, key: &str);
}

impl Keyed for CharacterInfo {
    fn key(&self) -> &str {
        &self.id
    }

    fn set_key(&mut self, key: &str) {
        key.clone_into(&mut self.id);
    }
}

impl Keyed for CustomizationItem {
    fn key(&self) -> &str {
        &self.id
    }

    fn set_key(&mut self, key: &str) {
        key.clone_into(&mut self.id);
    }
}

/// A table as served: either an object keyed by id or an array of records.
#[derive(Deserialize)]
#[serde(untagged)]
enum Table<T> {
    Map(HashMap<String, T>),
    List(Vec<T>),
}

impl<T: Keyed> Table<T> {
    fn into_map(self) -> HashMap<String, T> {
        match self {
            Self::Map(map) => map
                .into_iter()
                .map(|(key, mut record)| {
                    if record.key().is_empty() {
                        record.set_key(&key);
                    }
                    (key, record)
                })
                .collect(),
            Self::List(records) => records
                .into_iter()
                .map(|record| (record.key().to_owned(), record))
                .collect(),
        }
    }
}

/// Immutable snapshot of the character and customization tables.
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    characters: HashMap<String, CharacterInfo>,
    items: HashMap<String, CustomizationItem>,
}

impl ReferenceData {
    /// Build a snapshot from already-loaded tables.
    pub fn new(
        characters: HashMap<String, CharacterInfo>,
        items: HashMap<String, CustomizationItem>,
    ) -> Self {
        Self { characters, items }
    }

    /// Fetch both tables from the metadata host, characters first.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::HttpStatus` if either fetch is not a success, and
    /// `ApiError::Parse` if either body is not an id-keyed table.
    pub async fn load(client: &ApiClient, metadata_base: &Url) -> Result<Self, ApiError> {
        let characters: HashMap<String, CharacterInfo> =
            fetch_table(client, metadata_base, "characters").await?;
        let items: HashMap<String, CustomizationItem> =
            fetch_table(client, metadata_base, "customizationitems").await?;

        info!(
            characters = characters.len(),
            items = items.len(),
            "reference data loaded"
        );

        Ok(Self { characters, items })
    }

    /// Look up a character by id.
    pub fn character(&self, id: &str) -> Option<&CharacterInfo> {
        self.characters.get(id)
    }

    /// Look up a customization item by outfit/item id.
    pub fn item(&self, id: &str) -> Option<&CustomizationItem> {
        self.items.get(id)
    }

    /// Resolve an outfit id to its item and owning character.
    pub fn outfit(&self, outfit: &str) -> Option<(&CustomizationItem, &CharacterInfo)> {
        let item = self.item(outfit)?;
        let character = self.character(&item.associated_character)?;
        Some((item, character))
    }

    /// Number of characters in the snapshot.
    pub fn character_count(&self) -> usize {
        self.characters.len()
    }

    /// Number of customization items in the snapshot.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}

async fn fetch_table<T>(
    client: &ApiClient,
    base: &Url,
    table: &str,
) -> Result<HashMap<String, T>, ApiError>
where
    T: DeserializeOwned + Keyed,
{
    let url = endpoint(base, &["api", table])?;
    let response = client.get(url).await?;
    let body = check_http_response(response).await?;
    let parsed: Table<T> =
        serde_json::from_str(&body).map_err(|e| ApiError::Parse(format!("{table}: {e}")))?;
    Ok(parsed.into_map())
}
