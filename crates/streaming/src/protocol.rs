//! Wire types for the region endpoints.
//!
//! - `GET /scenes/{scene}/regions?id_range={start}:{end}&fields=(id,bounds)`
//!   returns a [`RegionsPage`] of [`MinimalRecord`]s.
//! - `GET /scenes/{scene}/regions/{id}` returns one [`FullRecord`].
//!
//! The scene itself ([`SceneInfo`]) is supplied by the scene provider.

use foundation::bounds::Rect;
use foundation::ids::{RegionId, SceneId};
use serde::{Deserialize, Serialize};

use crate::window::RangeKey;

/// Just enough of a region to lay it out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinimalRecord {
    pub id: RegionId,
    pub bounds: Rect,
}

/// A region with all of its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullRecord {
    pub id: RegionId,
    pub bounds: Rect,
    /// Opaque to the navigation core; rendered by the host.
    #[serde(default)]
    pub data: serde_json::Value,
}

impl FullRecord {
    pub fn minimal(&self) -> MinimalRecord {
        MinimalRecord {
            id: self.id,
            bounds: self.bounds,
        }
    }
}

/// Body of a range query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionsPage {
    #[serde(default)]
    pub items: Vec<MinimalRecord>,
}

/// Scene as reported by the scene provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneInfo {
    pub id: SceneId,
    #[serde(default)]
    pub file_count: u64,
    #[serde(default)]
    pub loading: bool,
}

impl SceneInfo {
    pub fn new(id: impl Into<String>, file_count: u64) -> Self {
        Self {
            id: SceneId::new(id),
            file_count,
            loading: false,
        }
    }

    pub fn loading(id: impl Into<String>) -> Self {
        Self {
            id: SceneId::new(id),
            file_count: 0,
            loading: true,
        }
    }

    /// Item count, unknown while the scene is still loading.
    pub fn count(&self) -> Option<u64> {
        if self.loading { None } else { Some(self.file_count) }
    }
}

pub fn range_path(scene: &SceneId, range: RangeKey) -> String {
    format!(
        "/scenes/{scene}/regions?id_range={}:{}&fields=(id,bounds)",
        range.start, range.end
    )
}

pub fn region_path(scene: &SceneId, id: RegionId) -> String {
    format!("/scenes/{scene}/regions/{id}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn range_path_matches_endpoint() {
        let scene = SceneId::new("abc");
        assert_eq!(
            range_path(&scene, RangeKey::new(101, 200)),
            "/scenes/abc/regions?id_range=101:200&fields=(id,bounds)"
        );
        assert_eq!(region_path(&scene, 42), "/scenes/abc/regions/42");
    }

    #[test]
    fn decodes_range_page() {
        let body = r#"{"items":[{"id":1,"bounds":{"x":0,"y":0,"w":10,"h":5}}]}"#;
        let page: RegionsPage = serde_json::from_str(body).unwrap();
        assert_eq!(
            page.items,
            vec![MinimalRecord {
                id: 1,
                bounds: Rect::new(0.0, 0.0, 10.0, 5.0),
            }]
        );

        let empty: RegionsPage = serde_json::from_str("{}").unwrap();
        assert!(empty.items.is_empty());
    }

    #[test]
    fn full_record_keeps_data_and_reduces_to_minimal() {
        let body = r#"{"id":7,"bounds":{"x":1,"y":2,"w":3,"h":4},"data":{"filename":"a.jpg"}}"#;
        let full: FullRecord = serde_json::from_str(body).unwrap();
        assert_eq!(full.data["filename"], "a.jpg");
        assert_eq!(full.minimal().id, 7);
        assert_eq!(full.minimal().bounds, full.bounds);
    }

    #[test]
    fn loading_scene_has_unknown_count() {
        let scene: SceneInfo =
            serde_json::from_str(r#"{"id":"s","file_count":12,"loading":true}"#).unwrap();
        assert_eq!(scene.count(), None);
        assert_eq!(SceneInfo::new("s", 12).count(), Some(12));
        assert_eq!(SceneInfo::loading("s").count(), None);
    }
}
