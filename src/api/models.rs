//! Wire records returned by the metadata and session hosts.
//!
//! Field names follow the remote JSON (camelCase). Identifier fields accept
//! either JSON strings or JSON numbers because the two hosts disagree on how
//! they encode ids.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Reference data
// ---------------------------------------------------------------------------

/// Player role reported by the character table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CharacterRole {
    /// The killer side.
    #[serde(rename = "EPlayerRole::VE_Slasher")]
    Killer,
    /// The survivor side.
    #[serde(rename = "EPlayerRole::VE_Camper")]
    Survivor,
    /// Any role this client does not know about.
    #[serde(other)]
    Other,
}

/// Metadata for a playable character, keyed by character id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterInfo {
    /// Character id. Filled from the map key when the table is an object.
    #[serde(default, deserialize_with = "de_id")]
    pub id: String,
    /// Human-readable character name.
    #[serde(default)]
    pub display_name: String,
    /// Killer or survivor.
    pub role: CharacterRole,
}

impl CharacterInfo {
    /// Whether this character plays on the killer side.
    pub fn is_killer(&self) -> bool {
        self.role == CharacterRole::Killer
    }
}

/// Slot a customization item occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CustomizationCategory {
    /// Killer head / mask.
    #[serde(rename = "ECustomizationCategory::KillerHead")]
    KillerHead,
    /// Killer body.
    #[serde(rename = "ECustomizationCategory::KillerBody")]
    KillerBody,
    /// Killer weapon.
    #[serde(rename = "ECustomizationCategory::KillerWeapon")]
    KillerWeapon,
    /// Survivor head.
    #[serde(rename = "ECustomizationCategory::SurvivorHead")]
    SurvivorHead,
    /// Survivor torso.
    #[serde(rename = "ECustomizationCategory::SurvivorTorso")]
    SurvivorTorso,
    /// Survivor legs.
    #[serde(rename = "ECustomizationCategory::SurvivorLegs")]
    SurvivorLegs,
    /// Charms, badges, banners and anything newer.
    #[serde(other)]
    Other,
}

/// Metadata for a cosmetic item, keyed by outfit/item id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomizationItem {
    /// Item id. Filled from the map key when the table is an object.
    #[serde(default, deserialize_with = "de_id")]
    pub id: String,
    /// Id of the character this item belongs to.
    #[serde(deserialize_with = "de_id")]
    pub associated_character: String,
    /// Slot the item occupies.
    pub category: CustomizationCategory,
    /// Human-readable item name, when the host provides one.
    #[serde(default)]
    pub display_name: Option<String>,
}

// ---------------------------------------------------------------------------
// Session data
// ---------------------------------------------------------------------------

/// Match details from `GET /api/v1/match/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchInfo {
    /// Match identifier.
    #[serde(deserialize_with = "de_id")]
    pub match_id: String,
    /// Rank of the match.
    #[serde(default)]
    pub rank: i32,
    /// Participant ids on side A (the killer side).
    #[serde(default, deserialize_with = "de_ids")]
    pub side_a: Vec<String>,
    /// Participant ids on side B.
    #[serde(default, deserialize_with = "de_ids")]
    pub side_b: Vec<String>,
}

impl MatchInfo {
    /// First participant on the killer side, if any.
    pub fn killer_id(&self) -> Option<&str> {
        self.side_a.first().map(String::as_str)
    }
}

/// Relationship state of a friend-list entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendStatus {
    /// Mutual, accepted connection.
    Confirmed,
    /// Request sent or received but not accepted.
    Pending,
    /// Blocked by one side.
    Blocked,
    /// Anything else.
    #[serde(other)]
    Other,
}

/// Display names keyed by platform provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendPlayerName {
    /// Provider (`steam`, `xbox`, ...) to display name.
    #[serde(default)]
    pub provider_player_names: BTreeMap<String, String>,
}

/// One entry of `GET /api/v1/players/{id}/friends`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRecord {
    /// Cloud user id of the friend.
    #[serde(deserialize_with = "de_id")]
    pub user_id: String,
    /// Relationship state.
    pub status: FriendStatus,
    /// Platform account ids keyed by provider.
    #[serde(default)]
    pub platform_ids: BTreeMap<String, String>,
    /// Per-platform display names. Only populated when the entry is viewed
    /// through a mutual friend.
    #[serde(default)]
    pub friend_player_name: Option<FriendPlayerName>,
}

impl FriendRecord {
    /// Whether this entry is a confirmed, mutual friendship.
    pub fn is_confirmed(&self) -> bool {
        self.status == FriendStatus::Confirmed
    }

    /// Display name on the given platform.
    pub fn display_name(&self, platform: &str) -> Option<&str> {
        self.friend_player_name
            .as_ref()?
            .provider_player_names
            .get(platform)
            .map(String::as_str)
    }

    /// Steam display name.
    pub fn steam_name(&self) -> Option<&str> {
        self.display_name("steam")
    }

    /// Steam account id.
    pub fn steam_id(&self) -> Option<&str> {
        self.platform_ids.get("steam").map(String::as_str)
    }
}

// ---------------------------------------------------------------------------
// Id decoding
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Signed(i64),
    Unsigned(u64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(text) => text,
            RawId::Signed(n) => n.to_string(),
            RawId::Unsigned(n) => n.to_string(),
        }
    }
}

fn de_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    RawId::deserialize(deserializer).map(String::from)
}

fn de_ids<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let raw = Option::<Vec<RawId>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(String::from)
        .collect())
}
