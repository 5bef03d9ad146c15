//! Spatial queries the engine needs from the map.
//!
//! The engine never owns the map. Movement legality, terrain cost and line of
//! sight all go through a [`Board`] supplied by the host. [`OpenBoard`] is a
//! square grid with 8-way adjacency, optional bounds, walls and per-tile
//! terrain cost, enough for tests and simple arenas.
//!
//! Positions are world coordinates (`Vec2`). `OpenBoard` maps them to tiles by
//! rounding `position / tile_size`.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec2;

/// Map capability used by movement, targeting and enemy AI.
pub trait Board {
    /// Returns `true` if `to` is one step from `from`.
    fn is_adjacent(&self, from: Vec2, to: Vec2) -> bool;

    /// Positions one step from `position` that are inside the map and not
    /// blocked. Occupancy by units is not considered.
    fn neighbors(&self, position: Vec2) -> Vec<Vec2>;

    /// Extra AP needed to enter `position`.
    fn movement_cost(&self, _position: Vec2) -> u32 {
        0
    }

    /// Returns `true` if `position` can never be entered.
    fn is_blocked(&self, _position: Vec2) -> bool {
        false
    }

    /// Returns `true` if nothing obstructs a straight line between the points.
    fn has_line_of_sight(&self, _from: Vec2, _to: Vec2) -> bool {
        true
    }
}

type Tile = (i32, i32);

const STEPS: [Tile; 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Unobstructed square grid with 8-way movement.
#[derive(Debug, Clone)]
pub struct OpenBoard {
    tile_size: f32,
    bounds: Option<(Tile, Tile)>,
    walls: BTreeSet<Tile>,
    terrain: BTreeMap<Tile, u32>,
}

impl OpenBoard {
    /// Unbounded grid with unit-sized tiles.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tile_size: 1.0,
            bounds: None,
            walls: BTreeSet::new(),
            terrain: BTreeMap::new(),
        }
    }

    /// Sets the world size of one tile. Non-positive sizes are ignored.
    #[must_use]
    pub fn with_tile_size(mut self, tile_size: f32) -> Self {
        if tile_size > 0.0 {
            self.tile_size = tile_size;
        }
        self
    }

    /// Restricts the grid to tiles `(0, 0)..(width, height)`.
    #[must_use]
    pub fn with_bounds(mut self, width: i32, height: i32) -> Self {
        self.bounds = Some(((0, 0), (width, height)));
        self
    }

    /// Marks a tile as impassable.
    #[must_use]
    pub fn with_wall(mut self, x: i32, y: i32) -> Self {
        self.walls.insert((x, y));
        self
    }

    /// Sets the extra AP needed to enter a tile.
    #[must_use]
    pub fn with_terrain(mut self, x: i32, y: i32, cost: u32) -> Self {
        self.terrain.insert((x, y), cost);
        self
    }

    /// World position of a tile's centre.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn tile_center(&self, x: i32, y: i32) -> Vec2 {
        Vec2::new(x as f32, y as f32) * self.tile_size
    }

    #[allow(clippy::cast_possible_truncation)]
    fn tile_of(&self, position: Vec2) -> Tile {
        let t = (position / self.tile_size).round();
        (t.x as i32, t.y as i32)
    }

    fn in_bounds(&self, (x, y): Tile) -> bool {
        self.bounds
            .map_or(true, |((x0, y0), (x1, y1))| x >= x0 && y >= y0 && x < x1 && y < y1)
    }

    fn passable(&self, tile: Tile) -> bool {
        self.in_bounds(tile) && !self.walls.contains(&tile)
    }
}

impl Default for OpenBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl Board for OpenBoard {
    fn is_adjacent(&self, from: Vec2, to: Vec2) -> bool {
        let (fx, fy) = self.tile_of(from);
        let (tx, ty) = self.tile_of(to);
        let (dx, dy) = ((tx - fx).abs(), (ty - fy).abs());
        dx.max(dy) == 1
    }

    fn neighbors(&self, position: Vec2) -> Vec<Vec2> {
        let (x, y) = self.tile_of(position);
        STEPS
            .iter()
            .map(|(dx, dy)| (x + dx, y + dy))
            .filter(|tile| self.passable(*tile))
            .map(|(nx, ny)| self.tile_center(nx, ny))
            .collect()
    }

    fn movement_cost(&self, position: Vec2) -> u32 {
        self.terrain
            .get(&self.tile_of(position))
            .copied()
            .unwrap_or(0)
    }

    fn is_blocked(&self, position: Vec2) -> bool {
        !self.passable(self.tile_of(position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eight_way_adjacency() {
        let board = OpenBoard::new();
        let origin = Vec2::ZERO;
        assert!(board.is_adjacent(origin, Vec2::new(1.0, 0.0)));
        assert!(board.is_adjacent(origin, Vec2::new(1.0, 1.0)));
        assert!(!board.is_adjacent(origin, Vec2::new(2.0, 0.0)));
        assert!(!board.is_adjacent(origin, origin));
    }

    #[test]
    fn neighbors_respect_bounds_and_walls() {
        let board = OpenBoard::new().with_bounds(3, 3).with_wall(1, 0);
        let around_corner = board.neighbors(Vec2::ZERO);
        assert_eq!(around_corner, vec![Vec2::new(0.0, 1.0), Vec2::new(1.0, 1.0)]);
        assert_eq!(board.neighbors(Vec2::new(1.0, 1.0)).len(), 7);
    }

    #[test]
    fn terrain_and_walls() {
        let board = OpenBoard::new().with_terrain(2, 2, 3).with_wall(4, 4);
        assert_eq!(board.movement_cost(Vec2::new(2.0, 2.0)), 3);
        assert_eq!(board.movement_cost(Vec2::new(2.0, 3.0)), 0);
        assert!(board.is_blocked(Vec2::new(4.0, 4.0)));
        assert!(!board.is_blocked(Vec2::new(4.0, 3.0)));
        assert!(board.has_line_of_sight(Vec2::ZERO, Vec2::new(9.0, 9.0)));
    }

    #[test]
    fn scaled_tiles() {
        let board = OpenBoard::new().with_tile_size(32.0);
        assert_eq!(board.tile_center(2, 1), Vec2::new(64.0, 32.0));
        assert!(board.is_adjacent(Vec2::new(64.0, 32.0), Vec2::new(96.0, 32.0)));
        assert!(!board.is_adjacent(Vec2::new(64.0, 32.0), Vec2::new(70.0, 32.0)));
    }
}
