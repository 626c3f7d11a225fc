use crate::block_position::BlockPosition;
use serde::{Deserialize, Serialize};

/// An inclusive integer cuboid. `min` is component-wise less than or equal to `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: BlockPosition,
    pub max: BlockPosition,
}

fn radius_to_i32(radius: u32) -> i32 {
    i32::try_from(radius).unwrap_or(i32::MAX)
}

impl BoundingBox {
    /// Creates a box spanning both corners, normalizing them per axis.
    pub fn new(a: impl Into<BlockPosition>, b: impl Into<BlockPosition>) -> Self {
        let a = a.into();
        let b = b.into();
        BoundingBox {
            min: BlockPosition::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: BlockPosition::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// The single cell at `pos`.
    pub fn from_position(pos: impl Into<BlockPosition>) -> Self {
        let pos = pos.into();
        BoundingBox { min: pos, max: pos }
    }

    /// `center ± radius` on every axis.
    pub fn around(center: impl Into<BlockPosition>, radius: u32) -> Self {
        Self::from_position(center).inflated_by(radius)
    }

    pub fn inflated_by(self, radius: u32) -> Self {
        let r = radius_to_i32(radius);
        BoundingBox {
            min: BlockPosition::new(
                self.min.x.saturating_sub(r),
                self.min.y.saturating_sub(r),
                self.min.z.saturating_sub(r),
            ),
            max: BlockPosition::new(
                self.max.x.saturating_add(r),
                self.max.y.saturating_add(r),
                self.max.z.saturating_add(r),
            ),
        }
    }

    pub fn contains(&self, pos: BlockPosition) -> bool {
        pos.x >= self.min.x
            && pos.x <= self.max.x
            && pos.y >= self.min.y
            && pos.y <= self.max.y
            && pos.z >= self.min.z
            && pos.z <= self.max.z
    }

    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    pub fn get_dimensions(&self) -> (u64, u64, u64) {
        (
            (self.max.x as i64 - self.min.x as i64 + 1) as u64,
            (self.max.y as i64 - self.min.y as i64 + 1) as u64,
            (self.max.z as i64 - self.min.z as i64 + 1) as u64,
        )
    }

    /// Number of cells in the box.
    pub fn volume(&self) -> u64 {
        let (w, h, d) = self.get_dimensions();
        w * h * d
    }

    /// The cell one row under the box, at the horizontal midpoint rounded up
    /// (`min + (max - min + 1) / 2` on x and z).
    pub fn below_center(&self) -> BlockPosition {
        // Midpoint lies in min..=max, so the narrowing cast cannot truncate.
        let mid = |min: i32, max: i32| (min as i64 + (max as i64 - min as i64 + 1) / 2) as i32;
        BlockPosition::new(
            mid(self.min.x, self.max.x),
            self.min.y.wrapping_sub(1),
            mid(self.min.z, self.max.z),
        )
    }

    /// Iterates every cell with x outermost and z innermost.
    pub fn positions(&self) -> BoxPositions {
        BoxPositions {
            bounds: *self,
            next: Some(self.min),
        }
    }

    pub fn for_each_position<F>(&self, mut f: F)
    where
        F: FnMut(BlockPosition),
    {
        for x in self.min.x..=self.max.x {
            for y in self.min.y..=self.max.y {
                for z in self.min.z..=self.max.z {
                    f(BlockPosition::new(x, y, z));
                }
            }
        }
    }

    /// Continuous extents of the box, treating each cell as a unit cube.
    pub fn to_aabb(&self) -> Aabb {
        Aabb {
            min: (self.min.x as f64, self.min.y as f64, self.min.z as f64),
            max: (
                self.max.x as f64 + 1.0,
                self.max.y as f64 + 1.0,
                self.max.z as f64 + 1.0,
            ),
        }
    }
}

/// Iterator returned by [`BoundingBox::positions`].
#[derive(Debug, Clone)]
pub struct BoxPositions {
    bounds: BoundingBox,
    next: Option<BlockPosition>,
}

impl Iterator for BoxPositions {
    type Item = BlockPosition;

    fn next(&mut self) -> Option<BlockPosition> {
        let current = self.next?;
        let BoundingBox { min, max } = self.bounds;
        self.next = if current.z < max.z {
            Some(BlockPosition::new(current.x, current.y, current.z + 1))
        } else if current.y < max.y {
            Some(BlockPosition::new(current.x, current.y + 1, min.z))
        } else if current.x < max.x {
            Some(BlockPosition::new(current.x + 1, min.y, min.z))
        } else {
            None
        };
        Some(current)
    }
}

/// Real-valued axis-aligned box used for entity containment tests.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: (f64, f64, f64),
    pub max: (f64, f64, f64),
}

impl Aabb {
    pub fn new(a: (f64, f64, f64), b: (f64, f64, f64)) -> Self {
        Aabb {
            min: (a.0.min(b.0), a.1.min(b.1), a.2.min(b.2)),
            max: (a.0.max(b.0), a.1.max(b.1), a.2.max(b.2)),
        }
    }

    /// Inclusive on both faces.
    pub fn contains(&self, point: (f64, f64, f64)) -> bool {
        point.0 >= self.min.0
            && point.0 <= self.max.0
            && point.1 >= self.min.1
            && point.1 <= self.max.1
            && point.2 >= self.min.2
            && point.2 <= self.max.2
    }

    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.0 <= other.max.0
            && self.max.0 >= other.min.0
            && self.min.1 <= other.max.1
            && self.max.1 >= other.min.1
            && self.min.2 <= other.max.2
            && self.max.2 >= other.min.2
    }
}
