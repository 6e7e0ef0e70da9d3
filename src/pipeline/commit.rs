//! Commit Phase - Apply a completed pass to the host in one sweep.
//!
//! # Algorithm
//!
//! 1. Validate every fiber of the new tree before touching the host, so an
//!    invariant violation never leaves a half-applied commit
//! 2. Remove the host node of every fiber on the deletion list (descending
//!    through node-less fibers such as components)
//! 3. Walk the new tree in pre-order:
//!    - `Create` with a host node: append it to the nearest host ancestor
//!    - `Update` with a host node: apply the prop delta against the
//!      previous generation
//!
//! Promoting the tree to "current" is the scheduler's job; this module only
//! performs host mutations.

use tracing::{debug, error};

use crate::engine::{FiberArena, FiberId};
use crate::error::{EngineError, Result};
use crate::primitives::Props;
use crate::renderer::{apply_props, Host};
use crate::types::EffectTag;

/// Summary of one commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitStats {
    /// Host nodes inserted.
    pub created: usize,
    /// Host-bearing fibers diffed against their previous generation.
    pub updated: usize,
    /// Updates whose prop delta was non-empty.
    pub changed: usize,
    /// Entries on the deletion list.
    pub deleted: usize,
    /// Stale fibers freed from the arena afterwards.
    pub swept: usize,
}

/// Apply all queued effects under `root` plus the deletion list.
pub fn commit_root<H: Host>(
    host: &mut H,
    arena: &FiberArena<H::Node>,
    root: FiberId,
    deletions: &[FiberId],
) -> Result<CommitStats> {
    let tree = arena.descendants(root);
    if let Err(err) = validate(arena, &tree, deletions) {
        error!(%err, "commit aborted: reconciler invariant violated");
        return Err(err);
    }

    let mut stats = CommitStats::default();

    for &id in deletions {
        commit_deletion(host, arena, id)?;
        stats.deleted += 1;
    }

    for &id in &tree {
        commit_work(host, arena, id, &mut stats)?;
    }

    debug!(
        created = stats.created,
        updated = stats.updated,
        changed = stats.changed,
        deleted = stats.deleted,
        "commit applied"
    );
    Ok(stats)
}

fn validate<N: Clone>(arena: &FiberArena<N>, tree: &[FiberId], deletions: &[FiberId]) -> Result<()> {
    for &id in tree {
        let fiber = arena.get(id).ok_or(EngineError::MissingFiber { fiber: id })?;
        match fiber.effect {
            EffectTag::Create => {
                if fiber.host_node.is_some() && arena.host_parent(id).is_none() {
                    return Err(EngineError::MissingHostParent { fiber: id });
                }
            }
            EffectTag::Update => {}
            EffectTag::Delete => return Err(EngineError::DeletedFiberInTree { fiber: id }),
            effect @ EffectTag::None => {
                return Err(EngineError::UntaggedFiberInTree { fiber: id, effect });
            }
        }
    }

    for &id in deletions {
        if !arena.contains(id) {
            return Err(EngineError::MissingFiber { fiber: id });
        }
        if arena.host_parent(id).is_none() {
            return Err(EngineError::MissingHostParent { fiber: id });
        }
    }

    Ok(())
}

fn commit_deletion<H: Host>(host: &mut H, arena: &FiberArena<H::Node>, id: FiberId) -> Result<()> {
    let parent = arena
        .host_parent_node(id)
        .ok_or(EngineError::MissingHostParent { fiber: id })?;

    // Components own no host node: descend to the first fiber that does.
    let mut cursor = Some(id);
    while let Some(current) = cursor {
        let fiber = arena
            .get(current)
            .ok_or(EngineError::MissingFiber { fiber: current })?;
        if let Some(node) = &fiber.host_node {
            host.remove_child(&parent, node);
            return Ok(());
        }
        cursor = fiber.child;
    }
    Ok(())
}

/// Apply one fiber's effect.
///
/// `Create` appends to the end of the host parent. A node created in front of
/// surviving siblings therefore lands after them in the host.
fn commit_work<H: Host>(
    host: &mut H,
    arena: &FiberArena<H::Node>,
    id: FiberId,
    stats: &mut CommitStats,
) -> Result<()> {
    let fiber = arena.get(id).ok_or(EngineError::MissingFiber { fiber: id })?;
    let Some(node) = &fiber.host_node else {
        return Ok(());
    };

    match fiber.effect {
        EffectTag::Create => {
            let parent = arena
                .host_parent_node(id)
                .ok_or(EngineError::MissingHostParent { fiber: id })?;
            host.append_child(&parent, node);
            stats.created += 1;
        }
        EffectTag::Update => {
            let empty = Props::new();
            let previous = arena.previous_of(id).map_or(&empty, |prev| &prev.props);
            let delta = apply_props(host, node, previous, &fiber.props);
            stats.updated += 1;
            if !delta.is_empty() {
                stats.changed += 1;
            }
        }
        EffectTag::Delete => return Err(EngineError::DeletedFiberInTree { fiber: id }),
        effect @ EffectTag::None => {
            return Err(EngineError::UntaggedFiberInTree { fiber: id, effect });
        }
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
