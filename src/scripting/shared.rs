use crate::block_state::MatchMode;
use crate::bounding_box::BoundingBox;
use crate::config::QueryConfig;
use crate::error::QueryError;
use crate::memory_world::{MemoryWorld, StructureTemplate};
use crate::query::LevelQuery;
use crate::{BlockPosition, BlockState, ResourceLocation};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// An entity as handed to scripts.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptEntity {
    pub handle: u64,
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Shared scripting level wrapper. All query logic lives here; the Lua and JS
/// engines are thin adapters that delegate to these methods.
#[derive(Debug, Clone)]
pub struct ScriptingLevel {
    pub query: LevelQuery<MemoryWorld>,
    rng: StdRng,
    seed: u64,
}

fn radius(value: i32) -> Result<u32, String> {
    u32::try_from(value).map_err(|_| QueryError::NegativeRadius(value.into()).to_string())
}

fn location(id: &str) -> Result<ResourceLocation, String> {
    ResourceLocation::parse(id).map_err(|e| e.to_string())
}

fn block(state: &str) -> Result<BlockState, String> {
    BlockState::parse(state).map_err(|e| e.to_string())
}

impl ScriptingLevel {
    // -- Lifecycle --

    pub fn new(seed: Option<u64>) -> Self {
        Self::from_world(MemoryWorld::new(), seed)
    }

    pub fn with_build_height(seed: Option<u64>, min_y: i32, max_y: i32) -> Self {
        Self::from_world(MemoryWorld::with_build_height(min_y, max_y), seed)
    }

    pub fn from_world(world: MemoryWorld, seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or(0);
        Self {
            query: LevelQuery::new(world),
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    pub fn configure(&mut self, settings: &str) -> Result<(), String> {
        let config = QueryConfig::from_json(settings).map_err(|e| e.to_string())?;
        self.query.set_config(config);
        Ok(())
    }

    pub fn get_seed(&self) -> u64 {
        self.seed
    }

    pub fn world(&self) -> &MemoryWorld {
        self.query.world()
    }

    pub fn world_mut(&mut self) -> &mut MemoryWorld {
        self.query.world_mut()
    }

    // -- Blocks --

    pub fn set_block(&mut self, x: i32, y: i32, z: i32, name: &str) -> Result<(), String> {
        let state = block(name)?;
        self.world_mut().set_block((x, y, z), state);
        Ok(())
    }

    pub fn get_block(&self, x: i32, y: i32, z: i32) -> String {
        self.world()
            .get_block((x, y, z))
            .map(|b| b.to_string())
            .unwrap_or_else(|| crate::block_state::AIR.to_string())
    }

    pub fn fill(
        &mut self,
        min: (i32, i32, i32),
        max: (i32, i32, i32),
        name: &str,
    ) -> Result<(), String> {
        let state = block(name)?;
        self.world_mut().fill(BoundingBox::new(min, max), &state);
        Ok(())
    }

    // -- Entities --

    pub fn spawn_entity(
        &mut self,
        id: &str,
        x: f64,
        y: f64,
        z: f64,
        living: bool,
    ) -> Result<u64, String> {
        let id = location(id)?;
        let handle = if living {
            self.world_mut().spawn_entity(id, (x, y, z))
        } else {
            self.world_mut().spawn_non_living(id, (x, y, z))
        };
        Ok(handle.0)
    }

    pub fn find_entities_within_radius(
        &self,
        entity_id: &str,
        x: i32,
        y: i32,
        z: i32,
        range: i32,
    ) -> Result<Vec<ScriptEntity>, String> {
        let id = location(entity_id)?;
        let found = self.query.find_entities_within_radius(
            &id,
            BlockPosition::new(x, y, z),
            radius(range)?,
        );
        Ok(found
            .into_iter()
            .map(|e| ScriptEntity {
                handle: e.handle.0,
                id: e.id.to_string(),
                x: e.position.0,
                y: e.position.1,
                z: e.position.2,
            })
            .collect())
    }

    // -- Block search --

    pub fn find_block_within_radius(
        &self,
        state: &str,
        x: i32,
        y: i32,
        z: i32,
        range: i32,
        absolute: bool,
    ) -> Result<Vec<(i32, i32, i32)>, String> {
        let target = block(state)?;
        let found = self.query.find_block_within_radius(
            &target,
            BlockPosition::new(x, y, z),
            radius(range)?,
            MatchMode::from_absolute(absolute),
        );
        Ok(found.into_iter().map(Into::into).collect())
    }

    pub fn get_random_location(
        &mut self,
        x: i32,
        y: i32,
        z: i32,
        min: i32,
        max: i32,
    ) -> Result<(i32, i32, i32), String> {
        let (min, max) = (radius(min)?, radius(max)?);
        let pos = self.query.sample_random_position(
            BlockPosition::new(x, y, z),
            min,
            max,
            &mut self.rng,
        );
        Ok(pos.into())
    }

    /// Predicates receive `(x, y, z)` and may fail with a script error message.
    pub fn seek_collection_of_blocks<F>(
        &self,
        x: i32,
        y: i32,
        z: i32,
        range: i32,
        mut validator: F,
        below_validator: Option<&mut dyn FnMut(i32, i32, i32) -> Result<bool, String>>,
    ) -> Result<Vec<(i32, i32, i32)>, String>
    where
        F: FnMut(i32, i32, i32) -> Result<bool, String>,
    {
        let range = radius(range)?;
        let mut below = below_validator
            .map(|below| move |pos: BlockPosition| below(pos.x, pos.y, pos.z));
        let below = below
            .as_mut()
            .map(|f| f as &mut dyn FnMut(BlockPosition) -> Result<bool, String>);

        let found = self.query.try_seek_collection_of_blocks(
            BlockPosition::new(x, y, z),
            range,
            |pos| validator(pos.x, pos.y, pos.z),
            below,
        )?;
        Ok(found.into_iter().map(Into::into).collect())
    }

    // -- Structures --

    pub fn register_template(
        &mut self,
        id: &str,
        blocks: Vec<(i32, i32, i32, String)>,
    ) -> Result<(), String> {
        let id = location(id)?;
        let mut template = StructureTemplate::new();
        for (dx, dy, dz, name) in blocks {
            template = template.with_block((dx, dy, dz), block(&name)?);
        }
        self.world_mut().register_template(id, template);
        Ok(())
    }

    pub fn add_structure(
        &mut self,
        id: &str,
        min: (i32, i32, i32),
        max: (i32, i32, i32),
    ) -> Result<(), String> {
        let id = location(id)?;
        self.world_mut().add_structure(id, BoundingBox::new(min, max));
        Ok(())
    }

    pub fn spawn_structure(&mut self, structure_file: &str, x: i32, y: i32, z: i32) -> Result<bool, String> {
        let id = location(structure_file)?;
        Ok(self.query.spawn_structure(&id, BlockPosition::new(x, y, z)))
    }

    pub fn is_structure_at_location(
        &self,
        x: i32,
        y: i32,
        z: i32,
        structure_id: &str,
    ) -> Result<bool, String> {
        let id = location(structure_id)?;
        Ok(self
            .query
            .is_structure_at_location(BlockPosition::new(x, y, z), &id))
    }

    pub fn get_structures_at_location(&self, x: i32, y: i32, z: i32) -> Vec<String> {
        self.query
            .get_structures_at_location(BlockPosition::new(x, y, z))
            .into_iter()
            .map(|id| id.to_string())
            .collect()
    }
}
