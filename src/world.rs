//! The seam between the query core and whatever owns the voxel world.
//!
//! The core only ever reads through [`WorldAccessor`]. Structure lookups and
//! placement go through [`StructureHost`], and randomness comes from an explicit
//! [`RandomSource`] so sampling stays reproducible under a fixed seed.

use crate::block_position::BlockPosition;
use crate::block_state::BlockState;
use crate::bounding_box::Aabb;
use crate::entity::Entity;
use crate::resource_location::ResourceLocation;
use std::borrow::Cow;
use std::collections::BTreeSet;

pub trait WorldAccessor {
    fn block_at(&self, pos: BlockPosition) -> Cow<'_, BlockState>;

    /// Entities that may overlap `bounds`. Implementations are free to return a
    /// superset; callers filter precisely.
    fn entities_in_bounds(&self, bounds: &Aabb) -> Vec<Entity>;

    fn min_build_height(&self) -> i32;

    fn max_build_height(&self) -> i32;
}

pub trait StructureHost {
    /// Stamps the named template at `location`. Returns `false` without touching
    /// the world when the template cannot be resolved.
    fn place_structure(&mut self, template: &ResourceLocation, location: BlockPosition) -> bool;

    fn is_structure_registered(&self, id: &ResourceLocation) -> bool;

    fn structures_at(&self, pos: BlockPosition) -> BTreeSet<ResourceLocation>;
}

/// Uniform integer source. `next_int_between` is inclusive on both ends.
pub trait RandomSource {
    fn next_int_between(&mut self, min: i32, max: i32) -> i32;
}

impl<R: rand::Rng + ?Sized> RandomSource for R {
    fn next_int_between(&mut self, min: i32, max: i32) -> i32 {
        if min >= max {
            return min;
        }
        self.gen_range(min..=max)
    }
}

impl<W: WorldAccessor + ?Sized> WorldAccessor for &W {
    fn block_at(&self, pos: BlockPosition) -> Cow<'_, BlockState> {
        (**self).block_at(pos)
    }

    fn entities_in_bounds(&self, bounds: &Aabb) -> Vec<Entity> {
        (**self).entities_in_bounds(bounds)
    }

    fn min_build_height(&self) -> i32 {
        (**self).min_build_height()
    }

    fn max_build_height(&self) -> i32 {
        (**self).max_build_height()
    }
}

impl<W: WorldAccessor + ?Sized> WorldAccessor for &mut W {
    fn block_at(&self, pos: BlockPosition) -> Cow<'_, BlockState> {
        (**self).block_at(pos)
    }

    fn entities_in_bounds(&self, bounds: &Aabb) -> Vec<Entity> {
        (**self).entities_in_bounds(bounds)
    }

    fn min_build_height(&self) -> i32 {
        (**self).min_build_height()
    }

    fn max_build_height(&self) -> i32 {
        (**self).max_build_height()
    }
}

impl<H: StructureHost + ?Sized> StructureHost for &mut H {
    fn place_structure(&mut self, template: &ResourceLocation, location: BlockPosition) -> bool {
        (**self).place_structure(template, location)
    }

    fn is_structure_registered(&self, id: &ResourceLocation) -> bool {
        (**self).is_structure_registered(id)
    }

    fn structures_at(&self, pos: BlockPosition) -> BTreeSet<ResourceLocation> {
        (**self).structures_at(pos)
    }
}
