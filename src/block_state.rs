use crate::error::QueryError;
use crate::resource_location::ResourceLocation;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

pub const AIR: &str = "minecraft:air";

/// How a block search compares a world block against its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchMode {
    /// Same block type, properties ignored.
    BlockOnly,
    /// Same block type and the same set of properties.
    ExactState,
}

impl MatchMode {
    /// `absolute = true` selects an exact state comparison.
    pub fn from_absolute(absolute: bool) -> Self {
        if absolute {
            MatchMode::ExactState
        } else {
            MatchMode::BlockOnly
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockState {
    pub name: SmolStr,
    pub properties: Vec<(SmolStr, SmolStr)>,
}

impl fmt::Display for BlockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.properties.is_empty() {
            write!(f, "[")?;
            for (i, (key, value)) in self.properties.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{}={}", key, value)?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}

impl Hash for BlockState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        for (k, v) in &self.properties {
            k.hash(state);
            v.hash(state);
        }
    }
}

impl BlockState {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        BlockState {
            name: name.into(),
            properties: Vec::new(),
        }
    }

    pub fn air() -> Self {
        BlockState::new(AIR)
    }

    pub fn is_air(&self) -> bool {
        matches!(
            self.name.as_str(),
            "minecraft:air" | "minecraft:cave_air" | "minecraft:void_air"
        )
    }

    pub fn get_name(&self) -> &str {
        self.name.as_str()
    }

    pub fn with_property(mut self, key: impl Into<SmolStr>, value: impl Into<SmolStr>) -> Self {
        self.set_property(key, value);
        self
    }

    pub fn with_properties(mut self, properties: Vec<(SmolStr, SmolStr)>) -> Self {
        self.properties = properties;
        self
    }

    pub fn set_property(&mut self, key: impl Into<SmolStr>, value: impl Into<SmolStr>) {
        let key = key.into();
        let value = value.into();
        for (k, v) in &mut self.properties {
            if *k == key {
                *v = value;
                return;
            }
        }
        self.properties.push((key, value));
    }

    pub fn remove_property(&mut self, key: &str) {
        self.properties.retain(|(k, _)| k != key);
    }

    pub fn get_property(&self, key: &str) -> Option<&SmolStr> {
        for (k, v) in &self.properties {
            if k == key {
                return Some(v);
            }
        }
        None
    }

    pub fn same_block(&self, other: &BlockState) -> bool {
        self.name == other.name
    }

    /// Same block and the same properties, in any order.
    pub fn matches_exactly(&self, other: &BlockState) -> bool {
        self.name == other.name
            && self.properties.len() == other.properties.len()
            && self
                .properties
                .iter()
                .all(|(k, v)| other.get_property(k) == Some(v))
    }

    pub fn matches(&self, other: &BlockState, mode: MatchMode) -> bool {
        match mode {
            MatchMode::BlockOnly => self.same_block(other),
            MatchMode::ExactState => self.matches_exactly(other),
        }
    }

    /// Parses `namespace:name[key=value,...]`. The namespace defaults to `minecraft`.
    pub fn parse(s: &str) -> Result<Self, QueryError> {
        let s = s.trim();
        let (name, props) = match s.find('[') {
            Some(open) => {
                let body = s[open + 1..].strip_suffix(']').ok_or_else(|| {
                    QueryError::InvalidBlockState(s.to_string(), "unterminated property list")
                })?;
                (&s[..open], Some(body))
            }
            None => (s, None),
        };

        let location = ResourceLocation::parse(name)
            .map_err(|_| QueryError::InvalidBlockState(s.to_string(), "invalid block name"))?;
        let mut state = BlockState::new(location.to_string());

        if let Some(body) = props {
            for pair in body.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                let (key, value) = pair.split_once('=').ok_or_else(|| {
                    QueryError::InvalidBlockState(s.to_string(), "property without '='")
                })?;
                let (key, value) = (key.trim(), value.trim());
                if key.is_empty() || value.is_empty() {
                    return Err(QueryError::InvalidBlockState(
                        s.to_string(),
                        "empty property key or value",
                    ));
                }
                state.set_property(key, value);
            }
        }

        Ok(state)
    }
}

impl FromStr for BlockState {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlockState::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_state_creation() {
        let block = BlockState::new("minecraft:stone").with_property("variant", "granite");

        assert_eq!(block.name, "minecraft:stone");
        assert_eq!(
            block.get_property("variant").map(|s| s.as_str()),
            Some("granite")
        );
    }

    #[test]
    fn test_parse_with_properties() {
        let block: BlockState = "oak_log[axis=y, waterlogged=false]".parse().unwrap();
        assert_eq!(block.name, "minecraft:oak_log");
        assert_eq!(block.get_property("axis").map(|s| s.as_str()), Some("y"));
        assert_eq!(block.to_string(), "minecraft:oak_log[axis=y,waterlogged=false]");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(BlockState::parse("minecraft:oak_log[axis=y").is_err());
        assert!(BlockState::parse("minecraft:oak_log[axis]").is_err());
        assert!(BlockState::parse("Oak Log").is_err());
    }

    #[test]
    fn test_match_modes() {
        let a = BlockState::new("minecraft:furnace")
            .with_property("facing", "north")
            .with_property("lit", "false");
        let b = BlockState::new("minecraft:furnace")
            .with_property("lit", "false")
            .with_property("facing", "north");
        let c = BlockState::new("minecraft:furnace").with_property("facing", "south");

        assert!(a.matches(&b, MatchMode::ExactState));
        assert!(!a.matches(&c, MatchMode::ExactState));
        assert!(a.matches(&c, MatchMode::BlockOnly));
        assert!(!a.matches(&BlockState::air(), MatchMode::BlockOnly));
    }

    #[test]
    fn test_air_variants() {
        assert!(BlockState::air().is_air());
        assert!(BlockState::new("minecraft:cave_air").is_air());
        assert!(!BlockState::new("minecraft:stone").is_air());
    }
}
