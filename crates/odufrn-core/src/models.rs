//! Portal entities as returned by the CKAN `action` and `rest` endpoints.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;

/// Kind of catalog entry the portal publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// A dataset with downloadable resources.
    Package,
    /// A named collection of package names.
    Group,
    /// A keyword attached to packages.
    Tag,
}

impl EntityKind {
    /// Action used to list every name of this kind (`api/action/{action}`).
    pub fn list_action(&self) -> &'static str {
        match self {
            Self::Package => "package_list",
            Self::Group => "group_list",
            Self::Tag => "tag_list",
        }
    }

    /// REST collection holding entities of this kind (`api/rest/{path}/{name}`).
    pub fn rest_path(&self) -> &'static str {
        match self {
            Self::Package => "dataset",
            Self::Group => "group",
            Self::Tag => "tag",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Package => write!(f, "package"),
            Self::Group => write!(f, "group"),
            Self::Tag => write!(f, "tag"),
        }
    }
}

impl FromStr for EntityKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().trim_end_matches('s') {
            "package" | "dataset" => Ok(Self::Package),
            "group" => Ok(Self::Group),
            "tag" => Ok(Self::Tag),
            _ => Err(AppError::ConfigError(format!(
                "Unknown catalog kind: '{}'. Valid options: packages, groups, tags",
                s
            ))),
        }
    }
}

/// One downloadable file belonging to a dataset.
///
/// # Examples
///
/// ```
/// use odufrn_core::Resource;
///
/// let json = r#"{
///     "name": "Discentes 2019",
///     "format": "CSV",
///     "url": "http://dados.ufrn.br/dataset/discentes-2019.csv",
///     "size": 1024
/// }"#;
///
/// let resource: Resource = serde_json::from_str(json).unwrap();
/// assert_eq!(resource.file_name(), "Discentes 2019.csv");
/// ```
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub name: String,
    pub format: String,
    pub url: String,
}

impl Resource {
    /// Local file name: `{name}.{format lowercased}`.
    ///
    /// Path separators in the name are replaced with `_` so the file always
    /// lands inside its dataset directory.
    pub fn file_name(&self) -> String {
        let name: String = self
            .name
            .chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect();
        format!("{}.{}", name, self.format.to_lowercase())
    }
}

/// Metadata returned by `api/rest/dataset/{name}`.
#[derive(Deserialize, Debug, Clone)]
pub struct PackageMetadata {
    pub resources: Vec<Resource>,
    /// All other fields returned by the portal (title, tags, notes...).
    #[serde(flatten)]
    pub extras: serde_json::Map<String, Value>,
}

/// Metadata returned by `api/rest/group/{name}`.
#[derive(Deserialize, Debug, Clone)]
pub struct GroupMetadata {
    /// Names of the member packages, in portal order.
    pub packages: Vec<String>,
    #[serde(flatten)]
    pub extras: serde_json::Map<String, Value>,
}
