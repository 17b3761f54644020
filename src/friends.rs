//! Two-hop identity resolution through a confirmed friend.
//!
//! The session host only returns display names for users reachable through a
//! confirmed mutual friend. To describe an arbitrary user we read their friend
//! list, pick the first confirmed friend, read *that* friend's list and find
//! the original user in it.

use tracing::debug;

use crate::api::models::FriendRecord;
use crate::api::SessionApi;

/// Resolve `target_id` to the friend record seen from a mutual friend.
///
/// Returns `None` when the target has no friends (or the list cannot be
/// fetched), when none of them is confirmed, or when the confirmed friend's
/// own list does not contain the target. Failures are logged at debug level
/// and never propagated.
pub async fn resolve_identity<S>(api: &S, target_id: &str) -> Option<FriendRecord>
where
    S: SessionApi + ?Sized,
{
    if target_id.is_empty() {
        return None;
    }

    let friends = match api.fetch_friends(target_id).await {
        Ok(friends) => friends,
        Err(e) => {
            debug!(target = target_id, error = %e, "friend list unavailable");
            return None;
        }
    };

    let Some(mutual) = friends.iter().find(|friend| friend.is_confirmed()) else {
        debug!(target = target_id, count = friends.len(), "no confirmed friend");
        return None;
    };

    let second_hop = match api.fetch_friends(&mutual.user_id).await {
        Ok(friends) => friends,
        Err(e) => {
            debug!(via = %mutual.user_id, error = %e, "second-hop friend list unavailable");
            return None;
        }
    };

    let found = second_hop
        .into_iter()
        .find(|friend| friend.user_id == target_id);
    if found.is_none() {
        debug!(target = target_id, via = %mutual.user_id, "target not in mutual friend's list");
    }
    found
}
