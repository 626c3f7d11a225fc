use crate::resource_location::ResourceLocation;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle the host world uses to refer to an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityHandle(pub u64);

impl fmt::Display for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A snapshot of an entity as reported by the world.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub handle: EntityHandle,
    pub id: ResourceLocation,
    pub position: (f64, f64, f64),
    /// Mobs and players are living; items, arrows and minecarts are not.
    pub living: bool,
}

impl Entity {
    pub fn new(handle: EntityHandle, id: ResourceLocation, position: (f64, f64, f64)) -> Self {
        Entity {
            handle,
            id,
            position,
            living: true,
        }
    }

    pub fn non_living(mut self) -> Self {
        self.living = false;
        self
    }

    pub fn is_type(&self, id: &ResourceLocation) -> bool {
        self.id == *id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entity() {
        let id = ResourceLocation::parse("minecraft:creeper").unwrap();
        let entity = Entity::new(EntityHandle(7), id.clone(), (1.0, 2.0, 3.0));
        assert_eq!(entity.handle, EntityHandle(7));
        assert_eq!(entity.position, (1.0, 2.0, 3.0));
        assert!(entity.living);
        assert!(entity.is_type(&id));
    }

    #[test]
    fn test_non_living() {
        let id = ResourceLocation::parse("minecraft:item").unwrap();
        let entity = Entity::new(EntityHandle(1), id, (0.0, 0.0, 0.0)).non_living();
        assert!(!entity.living);
    }

    #[test]
    fn test_entity_json() {
        let id = ResourceLocation::parse("minecraft:pig").unwrap();
        let entity = Entity::new(EntityHandle(3), id, (10.5, 64.0, -2.25));
        let json = serde_json::to_string(&entity).unwrap();
        assert!(json.contains("\"minecraft:pig\""));
        let back: Entity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entity);
    }
}
