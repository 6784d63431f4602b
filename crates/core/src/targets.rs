//! Goal lookup for the decision policy: nearest live threat, nearest recovery item, exit.
//! Nearest means smallest Euclidean distance; ties go to the lower `(y, x)` cell and then
//! to iteration order.

use crate::state::{Entity, Exit, Hostile, Level, RecoveryItem};
use crate::types::Pos;

pub fn nearest<'a, E, I>(from: Pos, candidates: I) -> Option<&'a E>
where
    E: Entity + 'a,
    I: IntoIterator<Item = &'a E>,
{
    candidates.into_iter().filter(|entity| entity.is_active()).fold(None, |best, entity| {
        match best {
            Some(current) if rank(from, current) <= rank(from, entity) => Some(current),
            _ => Some(entity),
        }
    })
}

fn rank<E: Entity>(from: Pos, entity: &E) -> (i64, Pos) {
    (from.distance_sq(entity.pos()), entity.pos())
}

pub fn nearest_threat(level: &Level, from: Pos) -> Option<&Hostile> {
    nearest(from, level.hostiles.values())
}

pub fn nearest_recovery(level: &Level, from: Pos) -> Option<&RecoveryItem> {
    nearest(from, level.recovery.values())
}

/// The level's designated exit: the first one listed.
pub fn exit_target(level: &Level) -> Option<&Exit> {
    level.exits.first()
}
