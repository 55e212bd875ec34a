use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Borrow;
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub String);

impl EntityId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Lets id-keyed maps be queried with a plain `&str`.
impl Borrow<str> for EntityId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Organization,
    Person,
    Vessel,
    Location,
    Event,
    Unknown,
}

impl Default for EntityKind {
    fn default() -> Self {
        Self::Unknown
    }
}

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Organization,
        EntityKind::Person,
        EntityKind::Vessel,
        EntityKind::Location,
        EntityKind::Event,
        EntityKind::Unknown,
    ];

    pub fn parse(input: &str) -> Self {
        match input.trim().to_ascii_lowercase().as_str() {
            "organization" => Self::Organization,
            "person" => Self::Person,
            "vessel" => Self::Vessel,
            "location" => Self::Location,
            "event" => Self::Event,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Organization => "organization",
            Self::Person => "person",
            Self::Vessel => "vessel",
            Self::Location => "location",
            Self::Event => "event",
            Self::Unknown => "unknown",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Organization => "Organization",
            Self::Person => "Person",
            Self::Vessel => "Vessel",
            Self::Location => "Location",
            Self::Event => "Event",
            Self::Unknown => "Unknown",
        }
    }

    /// Dense slot used by per-kind tables.
    pub fn slot(self) -> usize {
        match self {
            Self::Organization => 0,
            Self::Person => 1,
            Self::Vessel => 2,
            Self::Location => 3,
            Self::Event => 4,
            Self::Unknown => 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub country: Option<String>,
    pub attributes: Map<String, Value>,
}

// ---------------- Raw documents ----------------

#[derive(Debug, Clone, Deserialize)]
pub struct GraphDoc {
    #[serde(default)]
    pub nodes: Option<Vec<RawEntity>>,
    #[serde(default)]
    pub links: Option<Vec<RawRelationship>>,
    #[serde(default)]
    pub edges: Option<Vec<RawRelationship>>,
    #[serde(default)]
    pub directed: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawEntity {
    pub id: RawId,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Text(String),
    Number(serde_json::Number),
}

impl RawId {
    pub fn into_id(self) -> EntityId {
        match self {
            Self::Text(s) => EntityId(s),
            Self::Number(n) => EntityId(n.to_string()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawRelationship {
    #[serde(default)]
    pub source: Endpoint,
    #[serde(default)]
    pub target: Endpoint,
    #[serde(default, alias = "value", deserialize_with = "lenient_weight")]
    pub weight: Option<f64>,
}

// Numbers and numeric strings are kept; anything else reads as absent.
fn lenient_weight<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

/// Relationship endpoint as written in a document: an identifier or a position
/// in the entity list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Endpoint {
    Id(String),
    Index(u64),
    Other(Value),
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::Other(Value::Null)
    }
}

impl From<&str> for Endpoint {
    fn from(s: &str) -> Self {
        Self::Id(s.to_string())
    }
}
