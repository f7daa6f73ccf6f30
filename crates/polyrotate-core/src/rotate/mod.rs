//! Interactive rotation of selected polygons around their combined center of mass.
//!
//! # Lifecycle
//!
//! ```text
//! setup ──> Idle ──mouse down──> Dragging ──drag──> Dragging
//!            ^                       │
//!            └───────mouse up────────┘
//! stop (from any state) ──> Exited
//! ```
//!
//! - **Setup** resolves the requested features, rejects anything that is not
//!   a single-ring polygon, computes the pivot once from the union of the
//!   polygons, and selects the features in the host.
//! - **Mouse down** disables map panning, records the rhumb bearing from the
//!   pointer to the pivot, and registers a preview feature: all selected
//!   polygons combined into one multi-polygon under a reserved id.
//! - **Drag** rotates the preview in place by the change in bearing since
//!   the previous event, so each step only applies its own increment.
//! - **Mouse up** re-enables panning and, depending on [`CommitPolicy`],
//!   writes the rotated polygons back onto the source features.
//!
//! While the mode is active, render filtering hides the selected features and
//! draws the preview in their place, so a multi-feature rotation draws one
//! shape instead of one per feature.

use geo::{MultiPolygon, Point, Polygon};
use geojson::{Feature, Geometry};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::geometry::{
    center_of_mass, combine, feature_id, feature_with_geometry, multi_polygon_value,
    normalize_delta, polygon_from_feature, polygon_value, rhumb_bearing, rotate_around,
    set_active,
};
use crate::mode::{DrawContext, DrawMode, FeatureId, Hook, KeyEvent, ModeError, PointerEvent};

/// Reserved feature id of the rotation preview.
pub const PREVIEW_FEATURE_ID: &str = "rotate-placeholder";

/// Mode the rotation mode hands control back to when the user leaves it.
pub const EXIT_MODE: &str = "simple_select";

/// When the rotated preview is written back onto the selected features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CommitPolicy {
    /// Commit at the end of every drag.
    #[default]
    OnRelease,
    /// Only ever update the preview. Pressing Enter still commits.
    Never,
}

/// Options passed by the host when entering the mode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RotateOptions {
    /// Features to rotate, in order.
    pub feature_ids: Vec<FeatureId>,
    #[serde(default)]
    pub commit: CommitPolicy,
}

impl RotateOptions {
    pub fn new(feature_ids: impl IntoIterator<Item = impl Into<FeatureId>>) -> Self {
        Self {
            feature_ids: feature_ids.into_iter().map(Into::into).collect(),
            commit: CommitPolicy::default(),
        }
    }

    pub fn with_commit(mut self, commit: CommitPolicy) -> Self {
        self.commit = commit;
        self
    }
}

/// The transient preview feature and its typed geometry.
///
/// Kept together so one can never exist without the other.
#[derive(Debug, Clone)]
struct Preview {
    feature: Feature,
    geometry: MultiPolygon<f64>,
}

impl Preview {
    /// Copy the typed geometry into the GeoJSON payload the host renders.
    fn sync(&mut self) {
        self.feature.geometry = Some(Geometry::new(multi_polygon_value(&self.geometry)));
    }
}

/// Session state of one rotation.
#[derive(Debug, Clone)]
pub struct RotationState {
    feature_ids: Vec<FeatureId>,
    features: Vec<Polygon<f64>>,
    commit: CommitPolicy,
    drag_active: bool,
    reference_bearing: Option<f64>,
    pivot: Point<f64>,
    preview: Option<Preview>,
    total_rotation: f64,
}

impl RotationState {
    /// Ids of the features being rotated.
    pub fn feature_ids(&self) -> &[FeatureId] {
        &self.feature_ids
    }

    /// Polygons of the selected features as last resolved from the host.
    pub fn features(&self) -> &[Polygon<f64>] {
        &self.features
    }

    pub fn commit_policy(&self) -> CommitPolicy {
        self.commit
    }

    /// Rotation center, fixed for the whole session.
    pub fn pivot(&self) -> Point<f64> {
        self.pivot
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_active
    }

    /// Bearing from the pointer to the pivot at the last pointer event.
    pub fn reference_bearing(&self) -> Option<f64> {
        self.reference_bearing
    }

    pub fn preview_feature(&self) -> Option<&Feature> {
        self.preview.as_ref().map(|preview| &preview.feature)
    }

    pub fn preview_geometry(&self) -> Option<&MultiPolygon<f64>> {
        self.preview.as_ref().map(|preview| &preview.geometry)
    }

    /// Rotation applied during this session, in `(-180, 180]` degrees.
    pub fn total_rotation(&self) -> f64 {
        self.total_rotation
    }
}

/// The rotation draw mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct RotateMode;

impl RotateMode {
    /// Resolve `ids` to validated polygons, failing on the first bad feature.
    fn resolve(ctx: &dyn DrawContext, ids: &[FeatureId]) -> Result<Vec<Polygon<f64>>, ModeError> {
        ids.iter()
            .map(|id| {
                let feature = ctx
                    .get_feature(id)
                    .ok_or_else(|| ModeError::FeatureNotFound(id.clone()))?;
                polygon_from_feature(id, &feature)
            })
            .collect()
    }

    fn start_drag(
        &self,
        state: &mut RotationState,
        ctx: &mut dyn DrawContext,
        event: &PointerEvent,
    ) -> Result<(), ModeError> {
        if state.drag_active {
            warn!("drag start while a drag is already active, ignoring");
            return Ok(());
        }

        ctx.set_drag_pan(false);
        state.reference_bearing = Some(rhumb_bearing(event.position(), state.pivot));

        // Features may have been edited since setup
        state.features = Self::resolve(ctx, &state.feature_ids)?;
        let geometry = combine(&state.features);

        if state.preview.take().is_some() {
            ctx.delete_feature(PREVIEW_FEATURE_ID);
        }
        let mut preview_feature = feature_with_geometry(
            PREVIEW_FEATURE_ID,
            multi_polygon_value(&geometry),
        );
        set_active(&mut preview_feature, true);
        let feature = ctx.new_feature(preview_feature)?;
        ctx.add_feature(feature.clone())?;

        state.preview = Some(Preview { feature, geometry });
        state.drag_active = true;
        debug!(
            bearing = state.reference_bearing,
            features = state.feature_ids.len(),
            "rotation drag started"
        );
        Ok(())
    }

    fn step_drag(
        &self,
        state: &mut RotationState,
        ctx: &mut dyn DrawContext,
        event: &mut PointerEvent,
    ) -> Result<(), ModeError> {
        let (true, Some(reference), Some(preview)) = (
            state.drag_active,
            state.reference_bearing,
            state.preview.as_mut(),
        ) else {
            warn!("drag step without an active drag, ignoring");
            return Ok(());
        };

        event.stop_propagation();

        let bearing = rhumb_bearing(event.position(), state.pivot);
        let delta = normalize_delta(bearing - reference);
        rotate_around(&mut preview.geometry, delta, state.pivot);
        preview.sync();
        ctx.do_render(PREVIEW_FEATURE_ID);

        state.reference_bearing = Some(bearing);
        state.total_rotation = normalize_delta(state.total_rotation + delta);
        Ok(())
    }

    fn end_drag(&self, state: &mut RotationState, ctx: &mut dyn DrawContext) -> Result<(), ModeError> {
        if !state.drag_active {
            debug!("drag end without an active drag, ignoring");
            return Ok(());
        }

        state.drag_active = false;
        ctx.set_drag_pan(true);
        debug!(rotation = state.total_rotation, "rotation drag ended");

        match state.commit {
            CommitPolicy::OnRelease => self.commit(state, ctx),
            CommitPolicy::Never => Ok(()),
        }
    }

    /// Write each rotated preview polygon back onto its source feature.
    fn commit(&self, state: &mut RotationState, ctx: &mut dyn DrawContext) -> Result<(), ModeError> {
        let Some(preview) = &state.preview else {
            return Ok(());
        };

        // Every target must still exist before any of them is written
        let originals = state
            .feature_ids
            .iter()
            .map(|id| {
                ctx.get_feature(id)
                    .and_then(|feature| feature.geometry)
                    .ok_or_else(|| ModeError::FeatureNotFound(id.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let targets = state.feature_ids.iter().zip(preview.geometry.0.iter());
        for (written, (id, polygon)) in targets.enumerate() {
            if let Err(err) = ctx.set_feature_geometry(id, Geometry::new(polygon_value(polygon))) {
                warn!(feature = %id, error = %err, "commit failed, restoring written features");
                for (id, original) in state.feature_ids.iter().zip(&originals).take(written) {
                    if let Err(restore) = ctx.set_feature_geometry(id, original.clone()) {
                        warn!(feature = %id, error = %restore, "could not restore feature");
                    }
                }
                return Err(err);
            }
        }
        for id in &state.feature_ids {
            ctx.do_render(id);
        }
        state.features = preview.geometry.0.clone();
        debug!(features = state.feature_ids.len(), "rotation committed");
        Ok(())
    }

    fn leave(&self, state: &mut RotationState, ctx: &mut dyn DrawContext) {
        if state.drag_active {
            state.drag_active = false;
            ctx.set_drag_pan(true);
        }
        ctx.change_mode(EXIT_MODE, &state.feature_ids);
    }
}

impl DrawMode for RotateMode {
    type Options = RotateOptions;
    type State = RotationState;

    const NAME: &'static str = "rotate";

    const HOOKS: &'static [Hook] = &[
        Hook::MouseDown,
        Hook::Drag,
        Hook::MouseUp,
        Hook::TouchStart,
        Hook::TouchMove,
        Hook::TouchEnd,
        Hook::KeyUp,
        Hook::Stop,
    ];

    fn on_setup(
        &self,
        ctx: &mut dyn DrawContext,
        options: RotateOptions,
    ) -> Result<RotationState, ModeError> {
        if options.feature_ids.is_empty() {
            return Err(ModeError::EmptySelection);
        }

        let features = Self::resolve(ctx, &options.feature_ids)?;
        let pivot = center_of_mass(&features)?;

        ctx.set_selected(&options.feature_ids);
        debug!(
            features = options.feature_ids.len(),
            pivot_lng = pivot.x(),
            pivot_lat = pivot.y(),
            "rotation session ready"
        );

        Ok(RotationState {
            feature_ids: options.feature_ids,
            features,
            commit: options.commit,
            drag_active: false,
            reference_bearing: None,
            pivot,
            preview: None,
            total_rotation: 0.0,
        })
    }

    fn to_display_features(
        &self,
        state: &RotationState,
        feature: &mut Feature,
        display: &mut dyn FnMut(Feature),
    ) {
        let Some(id) = feature_id(feature) else {
            set_active(feature, false);
            display(feature.clone());
            return;
        };

        if state.feature_ids.contains(&id) {
            // The preview stands in for selected features
            set_active(feature, true);
        } else if id == PREVIEW_FEATURE_ID {
            if let Some(preview) = &state.preview {
                display(preview.feature.clone());
            }
        } else {
            set_active(feature, false);
            display(feature.clone());
        }
    }

    fn on_mouse_down(
        &self,
        state: &mut RotationState,
        ctx: &mut dyn DrawContext,
        event: &mut PointerEvent,
    ) -> Result<(), ModeError> {
        self.start_drag(state, ctx, event)
    }

    fn on_drag(
        &self,
        state: &mut RotationState,
        ctx: &mut dyn DrawContext,
        event: &mut PointerEvent,
    ) -> Result<(), ModeError> {
        self.step_drag(state, ctx, event)
    }

    fn on_mouse_up(
        &self,
        state: &mut RotationState,
        ctx: &mut dyn DrawContext,
        _event: &mut PointerEvent,
    ) -> Result<(), ModeError> {
        self.end_drag(state, ctx)
    }

    fn on_touch_start(
        &self,
        state: &mut RotationState,
        ctx: &mut dyn DrawContext,
        event: &mut PointerEvent,
    ) -> Result<(), ModeError> {
        self.start_drag(state, ctx, event)
    }

    fn on_touch_move(
        &self,
        state: &mut RotationState,
        ctx: &mut dyn DrawContext,
        event: &mut PointerEvent,
    ) -> Result<(), ModeError> {
        self.step_drag(state, ctx, event)
    }

    fn on_touch_end(
        &self,
        state: &mut RotationState,
        ctx: &mut dyn DrawContext,
        _event: &mut PointerEvent,
    ) -> Result<(), ModeError> {
        self.end_drag(state, ctx)
    }

    fn on_key_up(
        &self,
        state: &mut RotationState,
        ctx: &mut dyn DrawContext,
        event: &KeyEvent,
    ) -> Result<(), ModeError> {
        if event.is_escape() {
            self.leave(state, ctx);
        } else if event.is_enter() {
            self.commit(state, ctx)?;
            self.leave(state, ctx);
        }
        Ok(())
    }

    fn on_stop(&self, state: &mut RotationState, ctx: &mut dyn DrawContext) {
        state.drag_active = false;
        ctx.set_drag_pan(true);
        if state.preview.take().is_some() {
            ctx.delete_feature(PREVIEW_FEATURE_ID);
        }
        debug!(rotation = state.total_rotation, "rotation session closed");
    }
}
