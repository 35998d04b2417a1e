use serde::{Deserialize, Serialize};

/// 1-based position of a region within a scene.
///
/// Region ids and collection indices share one space: region `n` is the
/// `n`-th item of the scene.
pub type RegionId = u64;

/// Opaque scene identifier as handed out by the scene provider.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SceneId(pub String);

impl SceneId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SceneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
