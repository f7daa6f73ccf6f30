//! An in-process draw host backed by a map of GeoJSON features.
//!
//! Native hosts can use this directly; it also records every request a mode
//! makes (selection, renders, panning, mode changes) so sessions can be
//! inspected after the fact.

use std::collections::BTreeMap;

use geojson::{Feature, Geometry};

use super::{DrawContext, FeatureId, ModeError};
use crate::geometry::feature_id;

/// In-memory implementation of [`DrawContext`].
#[derive(Debug, Clone)]
pub struct InMemoryDraw {
    features: BTreeMap<FeatureId, Feature>,
    selected: Vec<FeatureId>,
    render_requests: Vec<FeatureId>,
    drag_pan: bool,
    mode_changes: Vec<(String, Vec<FeatureId>)>,
}

impl Default for InMemoryDraw {
    fn default() -> Self {
        Self {
            features: BTreeMap::new(),
            selected: Vec::new(),
            render_requests: Vec::new(),
            // Maps start with drag-to-pan enabled
            drag_pan: true,
            mode_changes: Vec::new(),
        }
    }
}

impl InMemoryDraw {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a host holding `features`, keyed by their ids.
    ///
    /// Features without an id are skipped.
    pub fn with_features(features: impl IntoIterator<Item = Feature>) -> Self {
        let mut draw = Self::new();
        for feature in features {
            draw.insert(feature);
        }
        draw
    }

    /// Store a feature, replacing any feature with the same id.
    ///
    /// Returns `false` if the feature has no id.
    pub fn insert(&mut self, feature: Feature) -> bool {
        match feature_id(&feature) {
            Some(id) => {
                self.features.insert(id, feature);
                true
            }
            None => false,
        }
    }

    pub fn feature(&self, id: &str) -> Option<&Feature> {
        self.features.get(id)
    }

    /// All stored features, in id order.
    pub fn features(&self) -> impl Iterator<Item = &Feature> {
        self.features.values()
    }

    pub fn selected(&self) -> &[FeatureId] {
        &self.selected
    }

    /// Ids passed to `do_render`, oldest first.
    pub fn render_requests(&self) -> &[FeatureId] {
        &self.render_requests
    }

    pub fn drag_pan_enabled(&self) -> bool {
        self.drag_pan
    }

    /// Requested mode transitions, oldest first.
    pub fn mode_changes(&self) -> &[(String, Vec<FeatureId>)] {
        &self.mode_changes
    }

    pub fn clear_render_requests(&mut self) {
        self.render_requests.clear();
    }
}

impl DrawContext for InMemoryDraw {
    fn get_feature(&self, id: &str) -> Option<Feature> {
        self.features.get(id).cloned()
    }

    fn set_selected(&mut self, ids: &[FeatureId]) {
        self.selected = ids.to_vec();
    }

    fn new_feature(&mut self, feature: Feature) -> Result<Feature, ModeError> {
        if feature_id(&feature).is_none() {
            return Err(ModeError::Host("features need an id".to_string()));
        }
        Ok(feature)
    }

    fn add_feature(&mut self, feature: Feature) -> Result<(), ModeError> {
        if self.insert(feature) {
            Ok(())
        } else {
            Err(ModeError::Host("features need an id".to_string()))
        }
    }

    fn delete_feature(&mut self, id: &str) {
        self.features.remove(id);
        self.selected.retain(|selected| selected != id);
    }

    fn set_feature_geometry(&mut self, id: &str, geometry: Geometry) -> Result<(), ModeError> {
        let feature = self
            .features
            .get_mut(id)
            .ok_or_else(|| ModeError::FeatureNotFound(id.to_string()))?;
        feature.geometry = Some(geometry);
        Ok(())
    }

    fn do_render(&mut self, id: &str) {
        self.render_requests.push(id.to_string());
    }

    fn set_drag_pan(&mut self, enabled: bool) {
        self.drag_pan = enabled;
    }

    fn change_mode(&mut self, mode: &str, feature_ids: &[FeatureId]) {
        self.mode_changes.push((mode.to_string(), feature_ids.to_vec()));
    }
}
