use serde::{Deserialize, Serialize};
use std::fmt;

/// An integer cell coordinate in the voxel grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct BlockPosition {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPosition {
    pub const ORIGIN: BlockPosition = BlockPosition { x: 0, y: 0, z: 0 };

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        BlockPosition { x, y, z }
    }

    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        BlockPosition {
            x: self.x + dx,
            y: self.y + dy,
            z: self.z + dz,
        }
    }

    pub fn below(self) -> Self {
        self.offset(0, -1, 0)
    }

    pub fn above(self) -> Self {
        self.offset(0, 1, 0)
    }

    /// Center of the cell in continuous space.
    pub fn center(self) -> (f64, f64, f64) {
        (
            self.x as f64 + 0.5,
            self.y as f64 + 0.5,
            self.z as f64 + 0.5,
        )
    }
}

impl From<(i32, i32, i32)> for BlockPosition {
    fn from((x, y, z): (i32, i32, i32)) -> Self {
        BlockPosition { x, y, z }
    }
}

impl From<BlockPosition> for (i32, i32, i32) {
    fn from(pos: BlockPosition) -> Self {
        (pos.x, pos.y, pos.z)
    }
}

impl fmt::Display for BlockPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_offset_and_below() {
        let pos = BlockPosition::new(1, 64, -3);
        assert_eq!(pos.offset(2, -4, 3), BlockPosition::new(3, 60, 0));
        assert_eq!(pos.below(), BlockPosition::new(1, 63, -3));
        assert_eq!(pos.above().below(), pos);
    }

    #[test]
    fn test_hash_by_coordinate() {
        let mut set = HashSet::new();
        set.insert(BlockPosition::new(1, 2, 3));
        set.insert(BlockPosition::from((1, 2, 3)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_display() {
        assert_eq!(BlockPosition::new(-1, 64, 7).to_string(), "-1, 64, 7");
    }
}
