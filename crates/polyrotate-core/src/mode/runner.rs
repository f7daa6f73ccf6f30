//! Drives one mode session on behalf of a host.

use geojson::Feature;
use tracing::{debug, warn};

use super::{DrawContext, DrawMode, Hook, KeyEvent, ModeError, PointerEvent};

/// Owns a mode instance and its session state for the lifetime of one session.
///
/// A runner only exists for a successfully set up session: if
/// [`DrawMode::on_setup`] fails, [`ModeRunner::start`] returns the error and
/// nothing is kept. [`ModeRunner::stop`] consumes the runner, so a stopped
/// session cannot receive further events.
///
/// If any hook fails, the runner re-enables map panning before returning the
/// error so a broken drag can never leave the map stuck.
pub struct ModeRunner<M: DrawMode> {
    mode: M,
    state: M::State,
}

impl<M: DrawMode> ModeRunner<M> {
    /// Enter the mode.
    pub fn start(mode: M, ctx: &mut dyn DrawContext, options: M::Options) -> Result<Self, ModeError> {
        let state = match mode.on_setup(ctx, options) {
            Ok(state) => state,
            Err(err) => {
                warn!(mode = M::NAME, error = %err, "mode setup failed");
                return Err(err);
            }
        };
        debug!(mode = M::NAME, "entered mode");
        Ok(Self { mode, state })
    }

    pub fn mode(&self) -> &M {
        &self.mode
    }

    pub fn state(&self) -> &M::State {
        &self.state
    }

    /// Whether the host should dispatch `hook` to this mode.
    pub fn handles(&self, hook: Hook) -> bool {
        M::has_hook(hook)
    }

    /// Dispatch a pointer hook. Undeclared hooks are a no-op.
    pub fn pointer(
        &mut self,
        hook: Hook,
        ctx: &mut dyn DrawContext,
        event: &mut PointerEvent,
    ) -> Result<(), ModeError> {
        if !M::has_hook(hook) {
            return Ok(());
        }

        let state = &mut self.state;
        let result = match hook {
            Hook::MouseDown => self.mode.on_mouse_down(state, ctx, event),
            Hook::MouseMove => self.mode.on_mouse_move(state, ctx, event),
            Hook::Drag => self.mode.on_drag(state, ctx, event),
            Hook::MouseUp => self.mode.on_mouse_up(state, ctx, event),
            Hook::MouseOut => self.mode.on_mouse_out(state, ctx, event),
            Hook::Click => self.mode.on_click(state, ctx, event),
            Hook::TouchStart => self.mode.on_touch_start(state, ctx, event),
            Hook::TouchMove => self.mode.on_touch_move(state, ctx, event),
            Hook::TouchEnd => self.mode.on_touch_end(state, ctx, event),
            Hook::Tap => self.mode.on_tap(state, ctx, event),
            other => {
                warn!(hook = other.name(), "not a pointer hook, ignoring");
                Ok(())
            }
        };
        Self::recover(hook, ctx, result)
    }

    /// Dispatch a keyboard hook. Undeclared hooks are a no-op.
    pub fn key(
        &mut self,
        hook: Hook,
        ctx: &mut dyn DrawContext,
        event: &KeyEvent,
    ) -> Result<(), ModeError> {
        if !M::has_hook(hook) {
            return Ok(());
        }

        let result = match hook {
            Hook::KeyUp => self.mode.on_key_up(&mut self.state, ctx, event),
            Hook::KeyDown => self.mode.on_key_down(&mut self.state, ctx, event),
            other => {
                warn!(hook = other.name(), "not a keyboard hook, ignoring");
                Ok(())
            }
        };
        Self::recover(hook, ctx, result)
    }

    /// Dispatch an action hook (trash, combine, uncombine). Undeclared hooks are a no-op.
    pub fn action(&mut self, hook: Hook, ctx: &mut dyn DrawContext) -> Result<(), ModeError> {
        if !M::has_hook(hook) {
            return Ok(());
        }

        let result = match hook {
            Hook::Trash => self.mode.on_trash(&mut self.state, ctx),
            Hook::CombineFeatures => self.mode.on_combine_features(&mut self.state, ctx),
            Hook::UncombineFeatures => self.mode.on_uncombine_features(&mut self.state, ctx),
            other => {
                warn!(hook = other.name(), "not an action hook, ignoring");
                Ok(())
            }
        };
        Self::recover(hook, ctx, result)
    }

    /// Run render filtering for one candidate feature.
    ///
    /// Takes `&self`: a render pass never mutates the session.
    pub fn display(&self, feature: &mut Feature, display: &mut dyn FnMut(Feature)) {
        self.mode.to_display_features(&self.state, feature, display);
    }

    /// Leave the mode, discarding the session.
    pub fn stop(mut self, ctx: &mut dyn DrawContext) {
        if M::has_hook(Hook::Stop) {
            self.mode.on_stop(&mut self.state, ctx);
        }
        debug!(mode = M::NAME, "left mode");
    }

    fn recover(
        hook: Hook,
        ctx: &mut dyn DrawContext,
        result: Result<(), ModeError>,
    ) -> Result<(), ModeError> {
        if let Err(err) = &result {
            warn!(mode = M::NAME, hook = hook.name(), error = %err, "hook failed, restoring map panning");
            ctx.set_drag_pan(true);
        }
        result
    }
}
