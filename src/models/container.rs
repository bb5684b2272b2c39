// Container identity as reported by the engine

use std::fmt;

/// A running container seen during one tick. Only held for the duration of that tick.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerRef {
    pub id: String,
    pub name: String,
}

impl ContainerRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Build from the engine's name list: first name, leading '/' stripped, falling back to the id.
    pub fn from_engine(id: String, names: Option<&[String]>) -> Self {
        let name = names
            .and_then(|n| n.first())
            .map(|n| n.trim_start_matches('/').to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| id.clone());
        Self { id, name }
    }
}

impl fmt::Display for ContainerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
