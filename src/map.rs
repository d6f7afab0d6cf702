//! Toroidal hexagonal grid topology.
//!
//! Positions are packed indices into a dense grid whose column and row counts
//! are powers of two, so wrap-around arithmetic reduces to mask operations.
//! The grid carries no tile data; per-position attributes live in the
//! generator's tile store.

use crate::rng::GameRandom;

/// A packed position on the hex grid: `(row << col_exp) | col`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MapPos(pub u32);

impl MapPos {
    /// Index into a dense per-position array.
    pub fn idx(self) -> usize {
        self.0 as usize
    }
}

/// The six hex directions, in the fixed enumeration order used by every
/// neighbor scan. Changing this order changes generated maps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Right,
    DownRight,
    Down,
    Left,
    UpLeft,
    Up,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::Right,
        Direction::DownRight,
        Direction::Down,
        Direction::Left,
        Direction::UpLeft,
        Direction::Up,
    ];

    /// Column/row offset of one step in this direction.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::Right => (1, 0),
            Direction::DownRight => (1, 1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::UpLeft => (-1, -1),
            Direction::Up => (0, -1),
        }
    }
}

/// One of the two triangular sub-tiles meeting at a position's hex corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Triangle {
    Up,
    Down,
}

/// Toroidal hex grid with power-of-two dimensions.
#[derive(Clone, Debug)]
pub struct HexMap {
    col_exp: u32,
    cols: u32,
    rows: u32,
    col_mask: u32,
    row_mask: u32,
}

impl HexMap {
    /// Create a grid of `1 << col_exp` columns by `1 << row_exp` rows.
    /// Exponents below 2 produce grids too small for the generator's
    /// lattice passes and are a caller contract violation.
    pub fn new(col_exp: u32, row_exp: u32) -> Self {
        debug_assert!(col_exp >= 2 && row_exp >= 2);
        let cols = 1u32 << col_exp;
        let rows = 1u32 << row_exp;
        Self {
            col_exp,
            cols,
            rows,
            col_mask: cols - 1,
            row_mask: rows - 1,
        }
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn tile_count(&self) -> u32 {
        self.cols * self.rows
    }

    /// Pack a (col, row) pair, wrapping both coordinates.
    pub fn pos(&self, col: u32, row: u32) -> MapPos {
        MapPos(((row & self.row_mask) << self.col_exp) | (col & self.col_mask))
    }

    pub fn pos_col(&self, pos: MapPos) -> u32 {
        pos.0 & self.col_mask
    }

    pub fn pos_row(&self, pos: MapPos) -> u32 {
        (pos.0 >> self.col_exp) & self.row_mask
    }

    /// Offset a position by a signed (col, row) delta with toroidal wrap.
    pub fn pos_add(&self, pos: MapPos, dc: i32, dr: i32) -> MapPos {
        let col = self.pos_col(pos).wrapping_add(dc as u32);
        let row = self.pos_row(pos).wrapping_add(dr as u32);
        self.pos(col, row)
    }

    /// One step in a hex direction.
    pub fn move_pos(&self, pos: MapPos, dir: Direction) -> MapPos {
        let (dc, dr) = dir.offset();
        self.pos_add(pos, dc, dr)
    }

    pub fn move_right(&self, pos: MapPos) -> MapPos {
        self.move_pos(pos, Direction::Right)
    }

    pub fn move_down_right(&self, pos: MapPos) -> MapPos {
        self.move_pos(pos, Direction::DownRight)
    }

    pub fn move_down(&self, pos: MapPos) -> MapPos {
        self.move_pos(pos, Direction::Down)
    }

    pub fn move_left(&self, pos: MapPos) -> MapPos {
        self.move_pos(pos, Direction::Left)
    }

    pub fn move_up_left(&self, pos: MapPos) -> MapPos {
        self.move_pos(pos, Direction::UpLeft)
    }

    pub fn move_up(&self, pos: MapPos) -> MapPos {
        self.move_pos(pos, Direction::Up)
    }

    /// Row-major enumeration of every position.
    pub fn positions(&self) -> impl Iterator<Item = MapPos> {
        (0..self.tile_count()).map(MapPos)
    }

    /// Hex distance between two positions, taking the shortest wrapped route.
    pub fn dist(&self, a: MapPos, b: MapPos) -> u32 {
        let dc = self.wrapped_delta(self.pos_col(a), self.pos_col(b), self.cols);
        let dr = self.wrapped_delta(self.pos_row(a), self.pos_row(b), self.rows);
        hex_offset_dist(dc, dr)
    }

    fn wrapped_delta(&self, from: u32, to: u32, span: u32) -> i32 {
        let d = (to + span - from) & (span - 1);
        if d > span / 2 {
            d as i32 - span as i32
        } else {
            d as i32
        }
    }

    /// The six triangles meeting at the hex corner of `pos`, in fixed order.
    pub fn vertex_triangles(&self, pos: MapPos) -> [(MapPos, Triangle); 6] {
        [
            (pos, Triangle::Up),
            (pos, Triangle::Down),
            (self.move_left(pos), Triangle::Up),
            (self.move_up_left(pos), Triangle::Up),
            (self.move_up_left(pos), Triangle::Down),
            (self.move_up(pos), Triangle::Down),
        ]
    }

    /// Draw a uniformly random position from the generation RNG stream.
    /// Two 16-bit draws: column first, then row.
    pub fn random_pos(&self, rng: &mut GameRandom) -> MapPos {
        let col = u32::from(rng.random_int()) & self.col_mask;
        let row = u32::from(rng.random_int()) & self.row_mask;
        self.pos(col, row)
    }
}

/// Hex distance of a signed (col, row) offset in this grid's axial basis.
/// Steps along the shared diagonal (+1,+1)/(-1,-1) cost one.
pub fn hex_offset_dist(dc: i32, dr: i32) -> u32 {
    if (dc >= 0) == (dr >= 0) {
        dc.abs().max(dr.abs()) as u32
    } else {
        (dc.abs() + dr.abs()) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_unpack_roundtrip() {
        let map = HexMap::new(5, 4);
        for row in 0..map.rows() {
            for col in 0..map.cols() {
                let pos = map.pos(col, row);
                assert_eq!(map.pos_col(pos), col);
                assert_eq!(map.pos_row(pos), row);
            }
        }
    }

    #[test]
    fn test_moves_are_invertible() {
        let map = HexMap::new(4, 4);
        for pos in map.positions() {
            assert_eq!(map.move_left(map.move_right(pos)), pos);
            assert_eq!(map.move_up(map.move_down(pos)), pos);
            assert_eq!(map.move_up_left(map.move_down_right(pos)), pos);
        }
    }

    #[test]
    fn test_wrap_around() {
        let map = HexMap::new(3, 3);
        let edge = map.pos(map.cols() - 1, map.rows() - 1);
        assert_eq!(map.move_right(edge), map.pos(0, map.rows() - 1));
        assert_eq!(map.move_down(edge), map.pos(map.cols() - 1, 0));
        assert_eq!(map.pos_add(map.pos(0, 0), -1, -1), edge);
    }

    #[test]
    fn test_position_enumeration_is_dense() {
        let map = HexMap::new(3, 4);
        let positions: Vec<_> = map.positions().collect();
        assert_eq!(positions.len(), map.tile_count() as usize);
        for (i, pos) in positions.iter().enumerate() {
            assert_eq!(pos.idx(), i);
        }
    }

    #[test]
    fn test_neighbors_at_distance_one() {
        let map = HexMap::new(4, 4);
        let pos = map.pos(5, 5);
        for dir in Direction::ALL {
            assert_eq!(map.dist(pos, map.move_pos(pos, dir)), 1);
        }
    }

    #[test]
    fn test_dist_wraps_shortest_route() {
        let map = HexMap::new(4, 4);
        let a = map.pos(0, 3);
        let b = map.pos(15, 3);
        assert_eq!(map.dist(a, b), 1);
        assert_eq!(map.dist(b, a), 1);
    }

    #[test]
    fn test_hex_offset_dist() {
        assert_eq!(hex_offset_dist(0, 0), 0);
        assert_eq!(hex_offset_dist(1, 1), 1);
        assert_eq!(hex_offset_dist(3, 3), 3);
        assert_eq!(hex_offset_dist(2, -1), 3);
        assert_eq!(hex_offset_dist(-2, 3), 5);
        assert_eq!(hex_offset_dist(0, 4), 4);
    }

    #[test]
    fn test_vertex_triangles_include_own_tile() {
        let map = HexMap::new(4, 4);
        let pos = map.pos(2, 2);
        let tris = map.vertex_triangles(pos);
        assert!(tris.contains(&(pos, Triangle::Up)));
        assert!(tris.contains(&(pos, Triangle::Down)));
        assert_eq!(tris.len(), 6);
    }
}
