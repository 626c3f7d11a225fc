use crate::error::QueryError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smol_str::SmolStr;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_NAMESPACE: &str = "minecraft";

/// A namespaced identifier such as `minecraft:zombie` or `mymod:towers/keep`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceLocation {
    namespace: SmolStr,
    path: SmolStr,
}

fn is_namespace_char(c: char) -> bool {
    matches!(c, 'a'..='z' | '0'..='9' | '_' | '-' | '.')
}

fn is_path_char(c: char) -> bool {
    is_namespace_char(c) || c == '/'
}

impl ResourceLocation {
    pub fn new(namespace: &str, path: &str) -> Result<Self, QueryError> {
        let full = || format!("{}:{}", namespace, path);
        if namespace.is_empty() {
            return Err(QueryError::InvalidResourceLocation(full(), "empty namespace"));
        }
        if path.is_empty() {
            return Err(QueryError::InvalidResourceLocation(full(), "empty path"));
        }
        if !namespace.chars().all(is_namespace_char) {
            return Err(QueryError::InvalidResourceLocation(
                full(),
                "namespace must match [a-z0-9_.-]",
            ));
        }
        if !path.chars().all(is_path_char) {
            return Err(QueryError::InvalidResourceLocation(
                full(),
                "path must match [a-z0-9_.-/]",
            ));
        }
        Ok(ResourceLocation {
            namespace: namespace.into(),
            path: path.into(),
        })
    }

    /// Parses `namespace:path`, defaulting the namespace to `minecraft`.
    pub fn parse(s: &str) -> Result<Self, QueryError> {
        match s.split_once(':') {
            Some((namespace, path)) => Self::new(namespace, path),
            None => Self::new(DEFAULT_NAMESPACE, s),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl FromStr for ResourceLocation {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ResourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

impl Serialize for ResourceLocation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ResourceLocation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_namespaced() {
        let id = ResourceLocation::parse("mymod:towers/keep").unwrap();
        assert_eq!(id.namespace(), "mymod");
        assert_eq!(id.path(), "towers/keep");
        assert_eq!(id.to_string(), "mymod:towers/keep");
    }

    #[test]
    fn test_default_namespace() {
        let id: ResourceLocation = "zombie".parse().unwrap();
        assert_eq!(id, ResourceLocation::parse("minecraft:zombie").unwrap());
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(ResourceLocation::parse("Minecraft:zombie").is_err());
        assert!(ResourceLocation::parse("minecraft:").is_err());
        assert!(ResourceLocation::parse(":zombie").is_err());
        assert!(ResourceLocation::parse("minecraft:zom bie").is_err());
        assert!(ResourceLocation::parse("a:b:c").is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let id = ResourceLocation::parse("minecraft:village").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"minecraft:village\"");
        let back: ResourceLocation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
