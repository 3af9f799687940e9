use std::collections::BTreeMap;

use crate::{
    foundation::core::{ElementId, Vec2},
    foundation::error::{OverlayError, OverlayResult},
    host::document::{Document, ElementSpec},
    host::style::Visibility,
    host::{DocumentMetrics, HostQuirks},
    overlay::synchronizer::SyncSettings,
};

/// Name under which scenes refer to the document body.
pub const BODY_NAME: &str = "body";

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// A serialized layout: host quirks, sync settings, a document tree and the tracked target.
///
/// Scenes are the JSON input of the `overlay-sync` binary and a convenient way to build test
/// fixtures.
pub struct Scene {
    /// Host measurement quirks.
    #[serde(default)]
    pub quirks: HostQuirks,
    /// Overlay synchronization settings.
    #[serde(default)]
    pub settings: SyncSettings,
    /// Document tree.
    pub document: SceneDocument,
    /// Name of the tracked element.
    pub target: String,
    /// Visibility reported for the target.
    #[serde(default)]
    pub visibility: Visibility,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// Document section of a [`Scene`].
pub struct SceneDocument {
    /// Document scroll offset.
    #[serde(default)]
    pub scroll: Vec2,
    /// Document client-edge offset.
    #[serde(default)]
    pub client_edge: Vec2,
    /// Elements in document order; parents must precede their children.
    pub elements: Vec<SceneElement>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// One named element of a [`SceneDocument`].
pub struct SceneElement {
    /// Unique name.
    pub name: String,
    /// Parent name; the body when absent.
    #[serde(default)]
    pub parent: Option<String>,
    /// Layout facts.
    #[serde(flatten)]
    pub spec: ElementSpec,
}

#[derive(Clone, Debug)]
/// A [`Scene`] materialized into a [`Document`].
pub struct BuiltScene {
    /// The document.
    pub document: Document,
    /// The tracked element.
    pub target: ElementId,
    /// Element ids by scene name (including [`BODY_NAME`]).
    pub names: BTreeMap<String, ElementId>,
}

impl Scene {
    /// Parse a scene from JSON text.
    pub fn from_json(json: &str) -> OverlayResult<Self> {
        serde_json::from_str(json).map_err(|e| OverlayError::serde(e.to_string()))
    }

    /// Serialize to pretty JSON.
    pub fn to_json_pretty(&self) -> OverlayResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| OverlayError::serde(e.to_string()))
    }

    /// Validate and build the document.
    ///
    /// Names must be unique, parents must be declared before their children (which keeps the tree
    /// acyclic), and the target must name a declared element.
    pub fn build(&self) -> OverlayResult<BuiltScene> {
        let mut document = Document::new();
        document.set_metrics(DocumentMetrics {
            scroll: self.document.scroll,
            client_edge: self.document.client_edge,
        });

        let mut names = BTreeMap::new();
        names.insert(BODY_NAME.to_string(), document.body());

        for el in &self.document.elements {
            if el.name.is_empty() {
                return Err(OverlayError::validation("element name must be non-empty"));
            }
            if names.contains_key(&el.name) {
                return Err(OverlayError::validation(format!(
                    "duplicate element name '{}'",
                    el.name
                )));
            }
            let parent_name = el.parent.as_deref().unwrap_or(BODY_NAME);
            let parent = *names.get(parent_name).ok_or_else(|| {
                OverlayError::validation(format!(
                    "element '{}' references undeclared parent '{parent_name}'",
                    el.name
                ))
            })?;
            let id = document.add_element(parent, el.spec.clone())?;
            names.insert(el.name.clone(), id);
        }

        if self.target == BODY_NAME {
            return Err(OverlayError::validation("target cannot be the document body"));
        }
        let target = *names.get(&self.target).ok_or_else(|| {
            OverlayError::validation(format!("unknown target element '{}'", self.target))
        })?;

        Ok(BuiltScene {
            document,
            target,
            names,
        })
    }
}

impl BuiltScene {
    /// Element id for a scene name.
    pub fn id(&self, name: &str) -> OverlayResult<ElementId> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| OverlayError::validation(format!("unknown element '{name}'")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/scene.rs"]
mod tests;
