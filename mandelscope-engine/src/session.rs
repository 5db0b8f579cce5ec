//! The engine operation surface a front-end drives.

use std::path::Path;

use tracing::{debug, info, warn};

use mandelscope_core::{
    pan_bounds, zoom_bounds, ColorTheme, Command, CommandHistory, CoreError, EscapeParams,
    GestureMode, PixelPoint, ViewportModel,
};

use crate::codec;
use crate::compute::compute;
use crate::consumer::{Frame, GridConsumer};
use crate::error::PersistenceError;
use crate::grid::EscapeGrid;

/// Side of the square pixel grid sessions are computed at.
pub const RESOLUTION: u32 = 1000;

/// What `reset_to_defaults` returns to.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SessionDefaults {
    pub params: EscapeParams,
    pub color_theme: ColorTheme,
}

/// One exploration session: viewport, its grid, the overlay flag, and the
/// undo/redo log.
///
/// Every mutating operation recomputes the grid before returning, so the
/// grid always matches the viewport. New state is computed aside and only
/// committed once it is complete.
#[derive(Debug, Clone)]
pub struct Session {
    resolution: u32,
    defaults: SessionDefaults,
    viewport: ViewportModel,
    grid: EscapeGrid,
    history: CommandHistory,
    overlay_visible: bool,
}

impl Session {
    /// Start a session at the standard resolution.
    pub fn new(defaults: SessionDefaults) -> crate::Result<Self> {
        Self::with_resolution(RESOLUTION, defaults)
    }

    pub fn with_resolution(resolution: u32, defaults: SessionDefaults) -> crate::Result<Self> {
        let viewport = ViewportModel::new(defaults.params, defaults.color_theme);
        let grid = compute_for(resolution, &viewport)?;
        info!(resolution, "Session started");
        Ok(Self {
            resolution,
            defaults,
            viewport,
            grid,
            history: CommandHistory::new(),
            overlay_visible: false,
        })
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    pub fn current_grid(&self) -> &EscapeGrid {
        &self.grid
    }

    pub fn current_viewport(&self) -> &ViewportModel {
        &self.viewport
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn overlay_visible(&self) -> bool {
        self.overlay_visible
    }

    pub fn frame(&self) -> Frame<'_> {
        Frame {
            grid: &self.grid,
            viewport: &self.viewport,
            overlay_visible: self.overlay_visible,
        }
    }

    /// Hand the current frame to a renderer.
    pub fn present(&self, consumer: &mut impl GridConsumer) -> crate::Result<()> {
        consumer.present(&self.frame())
    }

    /// Back to the initial view with the configured defaults; history is
    /// cleared and the overlay hidden.
    pub fn reset_to_defaults(&mut self) -> crate::Result<()> {
        let viewport = ViewportModel::new(self.defaults.params, self.defaults.color_theme);
        self.grid = compute_for(self.resolution, &viewport)?;
        self.viewport = viewport;
        self.overlay_visible = false;
        self.history.reset();
        info!("Session reset to defaults");
        Ok(())
    }

    /// Drag the view by the pointer delta. Returns `false` if nothing moved.
    pub fn pan_by(&mut self, press: PixelPoint, release: PixelPoint) -> crate::Result<bool> {
        let old = self.viewport.bounds();
        let Some(new) = pan_bounds(&old, press, release, self.resolution) else {
            return Ok(false);
        };
        self.commit(Command::Pan { old, new })?;
        Ok(true)
    }

    /// Zoom into the square selected from `press` to `release`. Returns
    /// `false` if the selection was empty.
    pub fn zoom_to(&mut self, press: PixelPoint, release: PixelPoint) -> crate::Result<bool> {
        let old = self.viewport.bounds();
        let Some(new) = zoom_bounds(&old, press, release, self.resolution) else {
            return Ok(false);
        };
        self.commit(Command::Zoom { old, new })?;
        Ok(true)
    }

    pub fn apply_gesture(
        &mut self,
        mode: GestureMode,
        press: PixelPoint,
        release: PixelPoint,
    ) -> crate::Result<bool> {
        match mode {
            GestureMode::Pan => self.pan_by(press, release),
            GestureMode::Zoom => self.zoom_to(press, release),
        }
    }

    /// Switch theme. Choosing the current theme is a no-op.
    pub fn set_color_theme(&mut self, theme: ColorTheme) -> crate::Result<bool> {
        let old = self.viewport.color_theme();
        if old == theme {
            return Ok(false);
        }
        self.commit(Command::ColorChange { old, new: theme })?;
        Ok(true)
    }

    /// Advance to the next theme in cycling order.
    pub fn cycle_color_theme(&mut self) -> crate::Result<ColorTheme> {
        let next = self.viewport.color_theme().next();
        self.set_color_theme(next)?;
        Ok(next)
    }

    /// Change the iteration cap. Zero is rejected without touching the
    /// session; the current value is a no-op.
    pub fn set_max_iterations(&mut self, max_iterations: u32) -> crate::Result<bool> {
        if max_iterations == 0 {
            warn!("Rejected max iterations of 0");
            return Err(CoreError::InvalidMaxIterations(max_iterations).into());
        }
        let old = self.viewport.max_iterations();
        if old == max_iterations {
            return Ok(false);
        }
        self.commit(Command::IterationChange {
            old,
            new: max_iterations,
        })?;
        Ok(true)
    }

    /// Show or hide the magnification overlay. Returns the new state.
    pub fn toggle_overlay(&mut self) -> crate::Result<bool> {
        self.commit(Command::ToggleOverlay)?;
        Ok(self.overlay_visible)
    }

    /// Reverse the newest command. `Ok(None)` when there is nothing to undo.
    pub fn undo(&mut self) -> crate::Result<Option<Command>> {
        let Self {
            resolution,
            viewport,
            grid,
            history,
            overlay_visible,
            ..
        } = self;
        history
            .undo(|c| apply(c, *resolution, viewport, grid, overlay_visible))
            .transpose()
    }

    /// Reapply the newest undone command. `Ok(None)` when there is nothing
    /// to redo.
    pub fn redo(&mut self) -> crate::Result<Option<Command>> {
        let Self {
            resolution,
            viewport,
            grid,
            history,
            overlay_visible,
            ..
        } = self;
        history
            .redo(|c| apply(c, *resolution, viewport, grid, overlay_visible))
            .transpose()
    }

    pub fn save_to(&self, path: &Path) -> Result<(), PersistenceError> {
        codec::save(path, &self.viewport, &self.grid)
    }

    /// Replace the session with the file's contents. On any error the
    /// session is left exactly as it was.
    pub fn load_from(&mut self, path: &Path) -> Result<(), PersistenceError> {
        let snapshot = codec::load(path, self.resolution)?;
        self.viewport = snapshot.viewport;
        self.grid = snapshot.grid;
        self.history.reset();
        info!(
            path = %path.display(),
            max_iter = self.viewport.max_iterations(),
            theme = %self.viewport.color_theme(),
            "Session loaded"
        );
        Ok(())
    }

    /// Apply a fresh user command and log it.
    fn commit(&mut self, command: Command) -> crate::Result<()> {
        apply(
            command,
            self.resolution,
            &mut self.viewport,
            &mut self.grid,
            &mut self.overlay_visible,
        )?;
        self.history.record(command);
        Ok(())
    }
}

fn compute_for(resolution: u32, viewport: &ViewportModel) -> crate::Result<EscapeGrid> {
    compute(
        resolution,
        resolution,
        &viewport.bounds(),
        &viewport.params(),
    )
}

/// Move the session to the forward side of `command`.
///
/// The next viewport and grid are built first and written back together,
/// so a failure leaves all three outputs untouched.
fn apply(
    command: Command,
    resolution: u32,
    viewport: &mut ViewportModel,
    grid: &mut EscapeGrid,
    overlay_visible: &mut bool,
) -> crate::Result<()> {
    let mut next = *viewport;
    match command {
        Command::Pan { new, .. } | Command::Zoom { new, .. } => next.set_bounds(new)?,
        Command::ColorChange { new, .. } => next.set_color_theme(new),
        Command::IterationChange { new, .. } => next.set_max_iterations(new)?,
        Command::ToggleOverlay => {
            *overlay_visible = !*overlay_visible;
            debug!(visible = *overlay_visible, "Overlay toggled");
            return Ok(());
        }
    }
    if command.affects_grid() {
        *grid = compute_for(resolution, &next)?;
    }
    *viewport = next;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const RES: u32 = 64;

    fn session() -> Session {
        Session::with_resolution(RES, SessionDefaults::default()).unwrap()
    }

    fn p(x: f64, y: f64) -> PixelPoint {
        PixelPoint::new(x, y)
    }

    #[test]
    fn starts_at_initial_view() {
        let s = session();
        assert_eq!(s.current_viewport(), &ViewportModel::default());
        assert_eq!(s.current_grid().width(), RES);
        assert!(!s.overlay_visible());
        assert!(!s.history().can_undo());
    }

    #[test]
    fn zoom_recomputes_grid() {
        let mut s = session();
        let before = s.current_grid().clone();
        assert!(s.zoom_to(p(10.0, 10.0), p(30.0, 30.0)).unwrap());
        assert_ne!(s.current_grid(), &before);
        assert!(s.current_viewport().magnification() > 1.0);
        assert_eq!(s.history().undo_depth(), 1);
    }

    #[test]
    fn empty_gestures_do_nothing() {
        let mut s = session();
        assert!(!s.pan_by(p(5.0, 5.0), p(5.0, 5.0)).unwrap());
        assert!(!s.zoom_to(p(5.0, 5.0), p(5.0, 5.0)).unwrap());
        assert!(!s.history().can_undo());
    }

    #[test]
    fn gesture_mode_dispatches() {
        let mut s = session();
        s.apply_gesture(GestureMode::Pan, p(0.0, 0.0), p(8.0, 0.0))
            .unwrap();
        assert!(matches!(
            s.history().peek_undo(),
            Some(Command::Pan { .. })
        ));
        s.apply_gesture(GestureMode::Zoom, p(0.0, 0.0), p(8.0, 8.0))
            .unwrap();
        assert!(matches!(
            s.history().peek_undo(),
            Some(Command::Zoom { .. })
        ));
    }

    #[test]
    fn theme_change_keeps_grid() {
        let mut s = session();
        let grid = s.current_grid().clone();
        assert!(s.set_color_theme(ColorTheme::Blue).unwrap());
        assert!(!s.set_color_theme(ColorTheme::Blue).unwrap());
        assert_eq!(s.current_grid(), &grid);
        assert_eq!(s.history().undo_depth(), 1);
    }

    #[test]
    fn cycling_records_each_step() {
        let mut s = session();
        assert_eq!(s.cycle_color_theme().unwrap(), ColorTheme::Red);
        assert_eq!(s.cycle_color_theme().unwrap(), ColorTheme::Green);
        assert_eq!(s.history().undo_depth(), 2);
    }

    #[test]
    fn zero_iterations_rejected_without_history() {
        let mut s = session();
        assert!(s.set_max_iterations(0).is_err());
        assert!(!s.set_max_iterations(100).unwrap());
        assert!(!s.history().can_undo());
        assert_eq!(s.current_viewport().max_iterations(), 100);
    }

    #[test]
    fn iteration_change_undo_restores_grid() {
        let mut s = session();
        let original = s.current_grid().clone();
        s.set_max_iterations(20).unwrap();
        assert_eq!(s.current_grid().max_iterations(), 20);

        let undone = s.undo().unwrap();
        assert_eq!(undone, Some(Command::IterationChange { old: 100, new: 20 }));
        assert_eq!(s.current_grid(), &original);
        assert_eq!(s.current_viewport().max_iterations(), 100);
    }

    #[test]
    fn overlay_toggle_is_undoable() {
        let mut s = session();
        assert!(s.toggle_overlay().unwrap());
        s.undo().unwrap();
        assert!(!s.overlay_visible());
        s.redo().unwrap();
        assert!(s.overlay_visible());
    }

    #[test]
    fn reset_clears_history_and_overlay() {
        let mut s = session();
        s.zoom_to(p(0.0, 0.0), p(20.0, 20.0)).unwrap();
        s.toggle_overlay().unwrap();
        s.set_color_theme(ColorTheme::Cyan).unwrap();
        s.reset_to_defaults().unwrap();
        assert_eq!(s.current_viewport(), &ViewportModel::default());
        assert!(!s.overlay_visible());
        assert!(!s.history().can_undo());
        assert!(s.undo().unwrap().is_none());
    }

    #[test]
    fn custom_defaults_apply_on_reset() {
        let defaults = SessionDefaults {
            params: EscapeParams::new(40, 9.0).unwrap(),
            color_theme: ColorTheme::Yellow,
        };
        let mut s = Session::with_resolution(RES, defaults).unwrap();
        s.set_max_iterations(80).unwrap();
        s.reset_to_defaults().unwrap();
        assert_eq!(s.current_viewport().max_iterations(), 40);
        assert_eq!(s.current_viewport().radius_squared(), 9.0);
        assert_eq!(s.current_viewport().color_theme(), ColorTheme::Yellow);
    }
}
