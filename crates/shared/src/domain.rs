use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Short code naming one structure record. Compared byte-for-byte; case is
/// kept exactly as the service returned it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(pub String);

impl Identifier {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identifier {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    Keyword,
    Name,
    Organism,
    Id,
    Resolution,
    Advanced,
}

impl SearchMode {
    pub const ALL: [SearchMode; 6] = [
        SearchMode::Keyword,
        SearchMode::Name,
        SearchMode::Organism,
        SearchMode::Id,
        SearchMode::Resolution,
        SearchMode::Advanced,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SearchMode::Keyword => "keyword",
            SearchMode::Name => "name",
            SearchMode::Organism => "organism",
            SearchMode::Id => "id",
            SearchMode::Resolution => "resolution",
            SearchMode::Advanced => "advanced",
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolution as reported by the service: a value in Ångström, or a
/// placeholder such as `"N/A"` for entries without one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Resolution {
    Angstrom(f64),
    Unavailable(String),
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Angstrom(value) => write!(f, "{value}"),
            Resolution::Unavailable(text) => f.write_str(text),
        }
    }
}

/// Placeholder the service uses for fields it has no value for.
pub const UNAVAILABLE: &str = "N/A";

fn unavailable() -> String {
    UNAVAILABLE.to_string()
}

fn unavailable_resolution() -> Resolution {
    Resolution::Unavailable(unavailable())
}

/// The service forwards upstream nulls as-is; read them as the placeholder.
fn text_or_unavailable<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(unavailable))
}

fn resolution_or_unavailable<'de, D>(deserializer: D) -> Result<Resolution, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Resolution>::deserialize(deserializer)?.unwrap_or_else(unavailable_resolution))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureRecord {
    #[serde(rename = "PDB_ID")]
    pub identifier: Identifier,
    #[serde(
        rename = "Title",
        default = "unavailable",
        deserialize_with = "text_or_unavailable"
    )]
    pub title: String,
    #[serde(
        rename = "Resolution",
        default = "unavailable_resolution",
        deserialize_with = "resolution_or_unavailable"
    )]
    pub resolution: Resolution,
    #[serde(
        rename = "Experimental_Method",
        default = "unavailable",
        deserialize_with = "text_or_unavailable"
    )]
    pub experimental_method: String,
    #[serde(
        rename = "Release_Date",
        default = "unavailable",
        deserialize_with = "text_or_unavailable"
    )]
    pub release_date: String,
    #[serde(
        rename = "Organism",
        default = "unavailable",
        deserialize_with = "text_or_unavailable"
    )]
    pub organism: String,
}
