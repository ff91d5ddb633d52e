use std::collections::{HashMap, HashSet};
use tracing::info;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::{Channel, ParseResult, RefreshResult};

/// Merge a freshly parsed playlist into the stored channel list.
///
/// The parsed channels replace the stored ones, but a channel whose id
/// survives keeps its favourite flag, hidden flag and position. A parse
/// without channels is refused so a broken upstream cannot wipe a list.
pub fn merge_refresh(
    existing: &[Channel],
    parsed: ParseResult,
) -> AppResult<(Vec<Channel>, RefreshResult)> {
    if parsed.channels.is_empty() {
        return Err(AppError::NoChannels);
    }

    let previous: HashMap<Uuid, &Channel> = existing.iter().map(|c| (c.id, c)).collect();
    let incoming: HashSet<Uuid> = parsed.channels.iter().map(|c| c.id).collect();

    let added = parsed
        .channels
        .iter()
        .filter(|c| !previous.contains_key(&c.id))
        .count();
    let removed = previous.keys().filter(|id| !incoming.contains(id)).count();

    let merged: Vec<Channel> = parsed
        .channels
        .into_iter()
        .map(|mut channel| {
            if let Some(old) = previous.get(&channel.id) {
                channel.is_favorite = old.is_favorite;
                channel.is_hidden = old.is_hidden;
                channel.order = old.order;
            }
            channel
        })
        .collect();

    let result = RefreshResult {
        added,
        removed,
        total: merged.len(),
        errors: parsed.errors,
    };

    info!(
        "Refreshed playlist: {} channels ({} added, {} removed, {} errors)",
        result.total,
        result.added,
        result.removed,
        result.errors.len()
    );

    Ok((merged, result))
}
