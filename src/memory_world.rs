use crate::block_position::BlockPosition;
use crate::block_state::BlockState;
use crate::bounding_box::{Aabb, BoundingBox};
use crate::entity::{Entity, EntityHandle};
use crate::resource_location::ResourceLocation;
use crate::world::{StructureHost, WorldAccessor};
use rustc_hash::{FxHashMap, FxHashSet};
use std::borrow::Cow;
use std::collections::BTreeSet;

pub const DEFAULT_MIN_BUILD_HEIGHT: i32 = -64;
pub const DEFAULT_MAX_BUILD_HEIGHT: i32 = 320;

/// A prefabricated set of blocks, stored as offsets from the placement origin.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructureTemplate {
    blocks: Vec<(BlockPosition, BlockState)>,
}

impl StructureTemplate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_block(mut self, offset: impl Into<BlockPosition>, block: BlockState) -> Self {
        self.blocks.push((offset.into(), block));
        self
    }

    /// Every cell of `bounds` (relative to the origin) filled with `block`.
    pub fn filled(bounds: BoundingBox, block: BlockState) -> Self {
        let mut blocks = Vec::with_capacity(bounds.volume() as usize);
        bounds.for_each_position(|offset| blocks.push((offset, block.clone())));
        Self { blocks }
    }

    pub fn blocks(&self) -> &[(BlockPosition, BlockState)] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Sparse in-memory voxel world. Unset cells read as air.
#[derive(Debug, Clone)]
pub struct MemoryWorld {
    blocks: FxHashMap<BlockPosition, BlockState>,
    entities: Vec<Entity>,
    next_handle: u64,
    min_build_height: i32,
    max_build_height: i32,
    templates: FxHashMap<ResourceLocation, StructureTemplate>,
    registered_structures: FxHashSet<ResourceLocation>,
    structure_bounds: Vec<(ResourceLocation, BoundingBox)>,
}

impl Default for MemoryWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryWorld {
    pub fn new() -> Self {
        Self::with_build_height(DEFAULT_MIN_BUILD_HEIGHT, DEFAULT_MAX_BUILD_HEIGHT)
    }

    pub fn with_build_height(min_y: i32, max_y: i32) -> Self {
        MemoryWorld {
            blocks: FxHashMap::default(),
            entities: Vec::new(),
            next_handle: 1,
            min_build_height: min_y.min(max_y),
            max_build_height: min_y.max(max_y),
            templates: FxHashMap::default(),
            registered_structures: FxHashSet::default(),
            structure_bounds: Vec::new(),
        }
    }

    // -- Blocks --

    pub fn set_block(&mut self, pos: impl Into<BlockPosition>, block: BlockState) {
        let pos = pos.into();
        if block.is_air() {
            self.blocks.remove(&pos);
        } else {
            self.blocks.insert(pos, block);
        }
    }

    pub fn get_block(&self, pos: impl Into<BlockPosition>) -> Option<&BlockState> {
        self.blocks.get(&pos.into())
    }

    pub fn fill(&mut self, bounds: BoundingBox, block: &BlockState) {
        bounds.for_each_position(|pos| self.set_block(pos, block.clone()));
    }

    /// Number of non-air blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    // -- Entities --

    pub fn spawn_entity(&mut self, id: ResourceLocation, position: (f64, f64, f64)) -> EntityHandle {
        self.insert_entity(id, position, true)
    }

    pub fn spawn_non_living(
        &mut self,
        id: ResourceLocation,
        position: (f64, f64, f64),
    ) -> EntityHandle {
        self.insert_entity(id, position, false)
    }

    fn insert_entity(
        &mut self,
        id: ResourceLocation,
        position: (f64, f64, f64),
        living: bool,
    ) -> EntityHandle {
        let handle = EntityHandle(self.next_handle);
        self.next_handle += 1;
        let mut entity = Entity::new(handle, id, position);
        entity.living = living;
        self.entities.push(entity);
        handle
    }

    pub fn entity(&self, handle: EntityHandle) -> Option<&Entity> {
        self.entities.iter().find(|e| e.handle == handle)
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn remove_entity(&mut self, handle: EntityHandle) -> Option<Entity> {
        let index = self.entities.iter().position(|e| e.handle == handle)?;
        Some(self.entities.remove(index))
    }

    pub fn move_entity(&mut self, handle: EntityHandle, position: (f64, f64, f64)) -> bool {
        match self.entities.iter_mut().find(|e| e.handle == handle) {
            Some(entity) => {
                entity.position = position;
                true
            }
            None => false,
        }
    }

    // -- Structures --

    pub fn register_template(&mut self, id: ResourceLocation, template: StructureTemplate) {
        self.templates.insert(id, template);
    }

    /// Makes `id` a known structure type without placing any instance of it.
    pub fn register_structure(&mut self, id: ResourceLocation) {
        self.registered_structures.insert(id);
    }

    /// Records a generated structure of type `id` covering `bounds`.
    pub fn add_structure(&mut self, id: ResourceLocation, bounds: BoundingBox) {
        self.registered_structures.insert(id.clone());
        self.structure_bounds.push((id, bounds));
    }
}

impl WorldAccessor for MemoryWorld {
    fn block_at(&self, pos: BlockPosition) -> Cow<'_, BlockState> {
        match self.blocks.get(&pos) {
            Some(block) => Cow::Borrowed(block),
            None => Cow::Owned(BlockState::air()),
        }
    }

    fn entities_in_bounds(&self, bounds: &Aabb) -> Vec<Entity> {
        self.entities
            .iter()
            .filter(|e| bounds.contains(e.position))
            .cloned()
            .collect()
    }

    fn min_build_height(&self) -> i32 {
        self.min_build_height
    }

    fn max_build_height(&self) -> i32 {
        self.max_build_height
    }
}

impl StructureHost for MemoryWorld {
    fn place_structure(&mut self, template: &ResourceLocation, location: BlockPosition) -> bool {
        let Some(template) = self.templates.get(template) else {
            return false;
        };
        let placed: Vec<_> = template
            .blocks()
            .iter()
            .map(|(offset, block)| {
                (
                    location.offset(offset.x, offset.y, offset.z),
                    block.clone(),
                )
            })
            .collect();
        for (pos, block) in placed {
            self.set_block(pos, block);
        }
        true
    }

    fn is_structure_registered(&self, id: &ResourceLocation) -> bool {
        self.registered_structures.contains(id)
    }

    fn structures_at(&self, pos: BlockPosition) -> BTreeSet<ResourceLocation> {
        self.structure_bounds
            .iter()
            .filter(|(_, bounds)| bounds.contains(pos))
            .map(|(id, _)| id.clone())
            .collect()
    }
}
