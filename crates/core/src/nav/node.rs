use crate::state::Grid;
use crate::types::Pos;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SearchNode {
    pub pos: Pos,
    pub value: f32,
    pub g: f32,
    pub h: f32,
    pub f: f32,
    /// Set once the node has been given a tentative `g` and pushed to the open set.
    pub open: bool,
    pub closed: bool,
    /// Index of the predecessor on the best known route.
    pub prev: Option<usize>,
}

impl SearchNode {
    fn fresh(pos: Pos, value: f32) -> Self {
        Self { pos, value, g: 0.0, h: 0.0, f: 0.0, open: false, closed: false, prev: None }
    }
}

/// One node per grid cell, addressed by `y * cols + x`.
#[derive(Clone, Debug, Default)]
pub struct NodeArray {
    cols: usize,
    rows: usize,
    nodes: Vec<SearchNode>,
}

impl NodeArray {
    pub fn from_grid(grid: &Grid) -> Self {
        let mut nodes = Self::default();
        nodes.reset(grid);
        nodes
    }

    /// Rebuilds every node from the grid with cleared search state.
    pub fn reset(&mut self, grid: &Grid) {
        self.cols = grid.cols();
        self.rows = grid.rows();
        self.nodes.clear();
        self.nodes.extend(
            grid.values().iter().enumerate().map(|(idx, value)| {
                SearchNode::fresh(grid.pos_of(idx), *value)
            }),
        );
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn index(&self, pos: Pos) -> Option<usize> {
        let in_bounds = pos.x >= 0
            && pos.y >= 0
            && (pos.x as usize) < self.cols
            && (pos.y as usize) < self.rows;
        in_bounds.then(|| (pos.y as usize) * self.cols + (pos.x as usize))
    }

    pub fn get(&self, pos: Pos) -> Option<&SearchNode> {
        self.index(pos).map(|idx| &self.nodes[idx])
    }

    pub fn nodes(&self) -> &[SearchNode] {
        &self.nodes
    }

    pub(super) fn node(&self, idx: usize) -> &SearchNode {
        &self.nodes[idx]
    }

    pub(super) fn node_mut(&mut self, idx: usize) -> &mut SearchNode {
        &mut self.nodes[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_clears_search_state_and_tracks_grid_size() {
        let grid = Grid::open(4, 3).expect("grid");
        let mut nodes = NodeArray::from_grid(&grid);
        assert_eq!(nodes.len(), 12);

        let idx = nodes.index(Pos::new(2, 1)).expect("in bounds");
        assert_eq!(idx, 6);
        {
            let node = nodes.node_mut(idx);
            node.g = 3.0;
            node.f = 4.0;
            node.closed = true;
            node.prev = Some(1);
        }

        let bigger = Grid::open(5, 5).expect("grid");
        nodes.reset(&bigger);
        assert_eq!(nodes.len(), 25);
        assert_eq!(nodes.cols(), 5);
        assert!(nodes.nodes().iter().all(|node| {
            node.g == 0.0 && node.f == 0.0 && !node.open && !node.closed && node.prev.is_none()
        }));
        assert_eq!(nodes.get(Pos::new(4, 4)).map(|node| node.pos), Some(Pos::new(4, 4)));
    }
}
