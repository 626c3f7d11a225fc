//! Spatial queries over a voxel world.
//!
//! [`LevelQuery`] wraps one world and answers the questions scripts ask of it:
//! which entities are nearby, where a block occurs, where a random spot away
//! from the player is, and whether a region matches a block pattern. Nothing
//! here fails for "not found"; absence is an empty result.

use crate::block_position::BlockPosition;
use crate::block_state::{BlockState, MatchMode};
use crate::bounding_box::BoundingBox;
use crate::config::QueryConfig;
use crate::entity::Entity;
use crate::resource_location::ResourceLocation;
use crate::world::{RandomSource, StructureHost, WorldAccessor};
use serde::Serialize;
use std::collections::BTreeSet;
use std::convert::Infallible;

/// Outcome of [`LevelQuery::sample_random_position_detailed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PositionSample {
    pub position: BlockPosition,
    /// Draws made, including the accepted one.
    pub attempts: u32,
    /// Every draw landed in the exclusion box and `position` is the origin offset by
    /// the last raw draw.
    pub fell_back: bool,
}

/// Per-world query facade.
#[derive(Debug, Clone)]
pub struct LevelQuery<W> {
    world: W,
    config: QueryConfig,
}

impl<W> LevelQuery<W> {
    pub fn new(world: W) -> Self {
        Self::with_config(world, QueryConfig::default())
    }

    pub fn with_config(world: W, config: QueryConfig) -> Self {
        LevelQuery { world, config }
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: QueryConfig) {
        self.config = config;
    }

    pub fn into_inner(self) -> W {
        self.world
    }

    /// Returns every position of `center ± radius` if all of them pass `validator`
    /// and, when given, the cell below the box center passes `below_validator`.
    /// Otherwise returns an empty list; a partial match is never reported.
    pub fn seek_collection_of_blocks<F>(
        &self,
        center: BlockPosition,
        radius: u32,
        mut validator: F,
        below_validator: Option<&mut dyn FnMut(BlockPosition) -> bool>,
    ) -> Vec<BlockPosition>
    where
        F: FnMut(BlockPosition) -> bool,
    {
        let mut below = below_validator
            .map(|below| move |pos: BlockPosition| Ok::<bool, Infallible>(below(pos)));
        let below = below
            .as_mut()
            .map(|f| f as &mut dyn FnMut(BlockPosition) -> Result<bool, Infallible>);

        let result = self.try_seek_collection_of_blocks(
            center,
            radius,
            |pos| Ok::<bool, Infallible>(validator(pos)),
            below,
        );
        match result {
            Ok(positions) => positions,
            Err(never) => match never {},
        }
    }

    /// Fallible form of [`Self::seek_collection_of_blocks`]. The first predicate
    /// error aborts the scan and is returned.
    pub fn try_seek_collection_of_blocks<F, E>(
        &self,
        center: BlockPosition,
        radius: u32,
        mut validator: F,
        below_validator: Option<&mut dyn FnMut(BlockPosition) -> Result<bool, E>>,
    ) -> Result<Vec<BlockPosition>, E>
    where
        F: FnMut(BlockPosition) -> Result<bool, E>,
    {
        let bounds = BoundingBox::around(center, radius);
        let positions: Vec<BlockPosition> = bounds.positions().collect();

        for &pos in &positions {
            if !validator(pos)? {
                log::trace!("pattern around {} rejected at {}", center, pos);
                return Ok(Vec::new());
            }
        }

        if let Some(below) = below_validator {
            let base = bounds.below_center();
            if !below(base)? {
                log::trace!("pattern around {} rejected below center at {}", center, base);
                return Ok(Vec::new());
            }
        }

        Ok(positions)
    }
}

impl<W: WorldAccessor> LevelQuery<W> {
    /// Entities of type `entity_id` whose position lies in the continuous extents
    /// of `center ± radius`.
    pub fn find_entities_within_radius(
        &self,
        entity_id: &ResourceLocation,
        center: BlockPosition,
        radius: u32,
    ) -> Vec<Entity> {
        let bounds = BoundingBox::around(center, radius).to_aabb();
        let living_only = self.config.living_only;

        let found: Vec<Entity> = self
            .world
            .entities_in_bounds(&bounds)
            .into_iter()
            .filter(|e| !living_only || e.living)
            .filter(|e| e.is_type(entity_id) && bounds.contains(e.position))
            .collect();

        log::trace!(
            "found {} {} entities within {} of {}",
            found.len(),
            entity_id,
            radius,
            center
        );
        found
    }

    /// Every position in `center ± radius` holding `target`, in scan order
    /// (x outermost, z innermost).
    pub fn find_block_within_radius(
        &self,
        target: &BlockState,
        center: BlockPosition,
        radius: u32,
        mode: MatchMode,
    ) -> Vec<BlockPosition> {
        let bounds = BoundingBox::around(center, radius);
        let matches: Vec<BlockPosition> = bounds
            .positions()
            .filter(|&pos| self.world.block_at(pos).matches(target, mode))
            .collect();

        log::trace!(
            "scanned {} cells around {} for {}: {} matches",
            bounds.volume(),
            center,
            target,
            matches.len()
        );
        matches
    }

    /// First position in scan order holding `target`. Stops at the first hit.
    pub fn find_first_block_within_radius(
        &self,
        target: &BlockState,
        center: BlockPosition,
        radius: u32,
        mode: MatchMode,
    ) -> Option<BlockPosition> {
        BoundingBox::around(center, radius)
            .positions()
            .find(|&pos| self.world.block_at(pos).matches(target, mode))
    }

    /// A position inside `origin ± max_radius` but outside `origin ± min_radius`,
    /// with y clamped to the build height.
    ///
    /// After `max_sample_attempts` rejected draws the origin offset by the last
    /// raw draw is returned. That position can be far outside the outer box, and
    /// unless `clamp_fallback_height` is set its y may be outside the build height.
    pub fn sample_random_position<R>(
        &self,
        origin: BlockPosition,
        min_radius: u32,
        max_radius: u32,
        rng: &mut R,
    ) -> BlockPosition
    where
        R: RandomSource + ?Sized,
    {
        self.sample_random_position_detailed(origin, min_radius, max_radius, rng)
            .position
    }

    pub fn sample_random_position_detailed<R>(
        &self,
        origin: BlockPosition,
        min_radius: u32,
        max_radius: u32,
        rng: &mut R,
    ) -> PositionSample
    where
        R: RandomSource + ?Sized,
    {
        let inner = BoundingBox::around(origin, min_radius);
        let outer = BoundingBox::around(origin, max_radius);
        let (floor, ceiling) = {
            let (a, b) = (self.world.min_build_height(), self.world.max_build_height());
            (a.min(b), a.max(b))
        };
        let max_attempts = self.config.max_sample_attempts.max(1);

        let mut last_draw = origin;
        for attempt in 1..=max_attempts {
            let x = rng.next_int_between(outer.min.x, outer.max.x);
            let y = rng.next_int_between(outer.min.y, outer.max.y);
            let z = rng.next_int_between(outer.min.z, outer.max.z);
            last_draw = BlockPosition::new(x, y, z);

            let candidate = BlockPosition::new(x, y.clamp(floor, ceiling), z);
            if !inner.contains(candidate) {
                return PositionSample {
                    position: candidate,
                    attempts: attempt,
                    fell_back: false,
                };
            }
        }

        // The raw draw, not its delta, is applied as an offset. Wraps on overflow.
        let mut position = BlockPosition::new(
            origin.x.wrapping_add(last_draw.x),
            origin.y.wrapping_add(last_draw.y),
            origin.z.wrapping_add(last_draw.z),
        );
        if self.config.clamp_fallback_height {
            position.y = position.y.clamp(floor, ceiling);
        }
        log::debug!(
            "random location around {} ({}..{}) fell back to {} after {} draws",
            origin,
            min_radius,
            max_radius,
            position,
            max_attempts
        );

        PositionSample {
            position,
            attempts: max_attempts,
            fell_back: true,
        }
    }
}

impl<W: StructureHost> LevelQuery<W> {
    /// Places the template named `structure` at `location`. An unknown template
    /// leaves the world untouched and returns `false`.
    pub fn spawn_structure(&mut self, structure: &ResourceLocation, location: BlockPosition) -> bool {
        let placed = self.world.place_structure(structure, location);
        if placed {
            log::debug!("placed structure {} at {}", structure, location);
        } else {
            log::debug!("structure template {} not found; nothing placed", structure);
        }
        placed
    }

    pub fn is_structure_at_location(&self, pos: BlockPosition, structure: &ResourceLocation) -> bool {
        if !self.world.is_structure_registered(structure) {
            return false;
        }
        self.world.structures_at(pos).contains(structure)
    }

    pub fn get_structures_at_location(&self, pos: BlockPosition) -> BTreeSet<ResourceLocation> {
        self.world.structures_at(pos)
    }
}
