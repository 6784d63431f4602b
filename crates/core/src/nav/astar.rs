use std::cmp::Ordering;
use std::collections::BTreeSet;

use tracing::debug;

use super::{EdgeCost, Heuristic, NodeArray, Path};
use crate::types::{Direction, Pos};

/// Open-set entry ordered by `(f, h, y, x)` ascending.
#[derive(Clone, Copy, Debug)]
struct OpenNode {
    f: f32,
    h: f32,
    y: i32,
    x: i32,
    idx: usize,
}

impl OpenNode {
    fn of(nodes: &NodeArray, idx: usize) -> Self {
        let node = nodes.node(idx);
        Self { f: node.f, h: node.h, y: node.pos.y, x: node.pos.x, idx }
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.f
            .total_cmp(&other.f)
            .then_with(|| self.h.total_cmp(&other.h))
            .then_with(|| self.y.cmp(&other.y))
            .then_with(|| self.x.cmp(&other.x))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenNode {}

/// A* from `start` to `goal` over a freshly reset node array.
///
/// `weight` scales the heuristic (1.0 is plain A*). Returns an empty path when the goal
/// is out of bounds, unreachable, or equal to `start`.
pub fn find_path<C, H>(
    nodes: &mut NodeArray,
    start: Pos,
    goal: Pos,
    cost: &C,
    heuristic: &H,
    weight: f32,
) -> Path
where
    C: EdgeCost + ?Sized,
    H: Heuristic + ?Sized,
{
    let (Some(start_idx), Some(goal_idx)) = (nodes.index(start), nodes.index(goal)) else {
        return Path::empty();
    };

    let mut open_set = BTreeSet::new();
    {
        let node = nodes.node_mut(start_idx);
        node.g = 0.0;
        node.h = weight * heuristic.estimate(start, goal);
        node.f = node.h;
        node.open = true;
    }
    open_set.insert(OpenNode::of(nodes, start_idx));

    let mut expanded = 0usize;
    while let Some(current) = open_set.pop_first() {
        let idx = current.idx;
        let (pos, g) = {
            let node = nodes.node_mut(idx);
            node.closed = true;
            (node.pos, node.g)
        };
        expanded += 1;

        if idx == goal_idx {
            let path = reconstruct_path(nodes, start_idx, goal_idx);
            debug!(?start, ?goal, expanded, len = path.len(), "path found");
            return path;
        }

        for dir in Direction::ALL {
            let next = pos.step(dir);
            let Some(next_idx) = nodes.index(next) else {
                continue;
            };
            let neighbor = *nodes.node(next_idx);
            if neighbor.closed {
                continue;
            }
            let step = cost.cost(pos, next, neighbor.value);
            if !step.is_finite() {
                continue;
            }
            let tentative = g + step;
            if neighbor.open && tentative >= neighbor.g {
                continue;
            }
            if neighbor.open {
                open_set.remove(&OpenNode::of(nodes, next_idx));
            }
            let node = nodes.node_mut(next_idx);
            node.g = tentative;
            node.h = weight * heuristic.estimate(next, goal);
            node.f = node.g + node.h;
            node.prev = Some(idx);
            node.open = true;
            open_set.insert(OpenNode::of(nodes, next_idx));
        }
    }

    debug!(?start, ?goal, expanded, "goal unreachable");
    Path::empty()
}

fn reconstruct_path(nodes: &NodeArray, start_idx: usize, goal_idx: usize) -> Path {
    let mut steps = Vec::new();
    let mut cursor = goal_idx;
    while cursor != start_idx {
        let node = nodes.node(cursor);
        let Some(prev) = node.prev else {
            break;
        };
        if let Some(dir) = Direction::between(nodes.node(prev).pos, node.pos) {
            steps.push(dir);
        }
        cursor = prev;
    }
    steps.reverse();
    Path::from(steps)
}
