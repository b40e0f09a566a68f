use std::time::Duration;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::Rgba;
use crate::event::{EventBus, StudioEvent};
use crate::frame::{Frame, FrameSequence, SequenceError};
use crate::history::History;
use crate::onion::OnionSkin;
use crate::playback::PlaybackScheduler;
use crate::store::{FrameRecord, ProjectStore, StoreError};
use crate::surface::{RasterSurface, SurfaceError};
use crate::tools::{MAX_BRUSH_SIZE, MIN_BRUSH_SIZE, ShapeLimits, Tool, ToolEngine, ToolKind};
use crate::util;

/// Session-wide configuration: canvas geometry plus the product defaults for
/// shape clamps and history depth.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StudioConfig {
    pub width: u32,
    pub height: u32,
    pub background: Rgba,
    pub thumbnail_width: u32,
    pub thumbnail_height: u32,
    pub shape_limits: ShapeLimits,
    /// Undo depth cap; `None` keeps history unbounded.
    pub history_depth: Option<usize>,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            background: Rgba::WHITE,
            thumbnail_width: 100,
            thumbnail_height: 75,
            shape_limits: ShapeLimits::default(),
            history_depth: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum StudioError {
    #[error(transparent)]
    Surface(#[from] SurfaceError),
    #[error(transparent)]
    Sequence(#[from] SequenceError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("export serialization failed: {0}")]
    Export(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct ExportedAnimation<'a> {
    frames: Vec<&'a [u8]>,
    fps: u32,
}

/// One editing session over one project: the live surface, the active tool,
/// undo history, the frame sequence, onion-skin settings and the playback
/// scheduler, glued to a project store.
///
/// All calls run on one cooperative control flow; the session is the single
/// owner of its surface and playback state.
pub struct Studio<S: ProjectStore> {
    project_id: String,
    config: StudioConfig,
    store: S,
    surface: RasterSurface,
    engine: ToolEngine,
    tool: Tool,
    history: History,
    frames: FrameSequence,
    onion: OnionSkin,
    playback: PlaybackScheduler,
    events: EventBus,
}

impl<S: ProjectStore> Studio<S> {
    /// Open a session, loading the project's frames from the store. A project
    /// with no stored frames starts with a single blank frame. The load is
    /// the one store call the session cannot shrug off; saves later are
    /// fire-and-forget.
    pub fn new(
        project_id: impl Into<String>,
        store: S,
        fps: u32,
        config: StudioConfig,
    ) -> Result<Self, StudioError> {
        let project_id = project_id.into();
        let records = store.load_frames(&project_id)?;
        let mut frames: Vec<Frame> = records
            .into_iter()
            .map(|record| Frame::new(record.frame_index, record.raster, record.thumbnail))
            .collect();
        if frames.is_empty() {
            let blank = RasterSurface::new(config.width, config.height, config.background);
            frames.push(Frame::new(
                0,
                blank.encode()?,
                blank.thumbnail(config.thumbnail_width, config.thumbnail_height)?,
            ));
        }
        let frames = FrameSequence::from_frames(frames);
        let surface = RasterSurface::decode(&frames.current().raster)?;
        let history = match config.history_depth {
            Some(depth) => History::with_max_depth(depth),
            None => History::new(),
        };
        info!("opened project {project_id} with {} frames", frames.len());
        Ok(Self {
            project_id,
            config,
            store,
            surface,
            engine: ToolEngine::new(),
            tool: Tool::default(),
            history,
            frames,
            onion: OnionSkin::default(),
            playback: PlaybackScheduler::new(fps),
            events: EventBus::new(),
        })
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    /// The bus hosts subscribe to for commit, selection, playback and
    /// save-failure notifications.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    // ---- tool selection ------------------------------------------------

    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Switch tools, cancelling any gesture in flight.
    pub fn set_tool(&mut self, kind: ToolKind) {
        self.engine.cancel(&mut self.surface);
        if self.tool.kind != kind {
            self.tool.kind = kind;
            self.events.emit(StudioEvent::ToolChanged { kind });
        }
    }

    pub fn set_brush_size(&mut self, size: u32) {
        self.tool.size = size.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE);
    }

    pub fn set_color(&mut self, color: Rgba) {
        self.tool.color = color;
    }

    /// Set the tool color from a `#rrggbb` string; unparseable input falls
    /// back to black.
    pub fn set_color_hex(&mut self, hex: &str) {
        self.tool.color = Rgba::from_hex(hex).unwrap_or(Rgba::BLACK);
    }

    // ---- pointer gestures ----------------------------------------------

    pub fn pointer_begin(&mut self, x: f32, y: f32) {
        self.engine.begin(&mut self.surface, self.tool, x, y);
    }

    pub fn pointer_update(&mut self, x: f32, y: f32) {
        self.engine.update(&mut self.surface, self.tool, self.config.shape_limits, x, y);
    }

    /// Commit the gesture: push the pre-gesture snapshot to history, write
    /// the surface back into the current frame, and save.
    pub fn pointer_commit(&mut self, x: f32, y: f32) -> Result<(), StudioError> {
        let Some(before) = self.engine.commit(&mut self.surface, self.tool, self.config.shape_limits, x, y)
        else {
            return Ok(());
        };
        self.history.push(before);
        self.commit_surface()
    }

    // ---- undo / redo ---------------------------------------------------

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Restore the previous snapshot. With nothing to undo this is a quiet
    /// no-op; hosts gray the button out via `can_undo`.
    pub fn undo(&mut self) -> Result<(), StudioError> {
        let Ok(prior) = self.history.undo(self.surface.snapshot()) else {
            return Ok(());
        };
        self.surface.restore(&prior);
        self.commit_surface()
    }

    pub fn redo(&mut self) -> Result<(), StudioError> {
        let Ok(next) = self.history.redo(self.surface.snapshot()) else {
            return Ok(());
        };
        self.surface.restore(&next);
        self.commit_surface()
    }

    // ---- frames --------------------------------------------------------

    pub fn frames(&self) -> &FrameSequence {
        &self.frames
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn current_index(&self) -> usize {
        self.frames.current_index()
    }

    /// Insert a blank frame after the current one and switch to it.
    pub fn insert_frame(&mut self) -> Result<usize, StudioError> {
        let blank = RasterSurface::new(self.config.width, self.config.height, self.config.background);
        let raster = blank.encode()?;
        let thumbnail = blank.thumbnail(self.config.thumbnail_width, self.config.thumbnail_height)?;
        let index = self.frames.insert_after(self.frames.current_index(), raster, thumbnail)?;
        self.load_current()?;
        Ok(index)
    }

    /// Duplicate the current frame and switch to the copy.
    pub fn duplicate_frame(&mut self) -> Result<usize, StudioError> {
        let index = self.frames.duplicate(self.frames.current_index())?;
        self.load_current()?;
        Ok(index)
    }

    /// Delete the current frame. Rejected when it is the only one.
    pub fn delete_frame(&mut self) -> Result<(), StudioError> {
        self.frames.delete(self.frames.current_index())?;
        self.load_current()?;
        Ok(())
    }

    /// Jump to a frame by index. Legal whether or not playback is running.
    pub fn select_frame(&mut self, index: usize) -> Result<(), StudioError> {
        self.frames.set_current(index)?;
        self.load_current()?;
        Ok(())
    }

    // ---- playback ------------------------------------------------------

    pub fn is_playing(&self) -> bool {
        self.playback.is_running()
    }

    pub fn fps(&self) -> u32 {
        self.playback.fps()
    }

    pub fn set_fps(&mut self, fps: u32) {
        self.playback.set_fps(fps);
    }

    pub fn play(&mut self) {
        if !self.playback.is_running() {
            self.playback.start();
            self.events.emit(StudioEvent::PlaybackStarted);
        }
    }

    pub fn pause(&mut self) {
        if self.playback.is_running() {
            self.playback.stop();
            self.events.emit(StudioEvent::PlaybackStopped);
        }
    }

    /// Drive playback with a monotonic timestamp. When a frame interval has
    /// elapsed the session advances to the next frame (wrapping) and loads it
    /// into the live surface. Returns whether it advanced.
    pub fn tick(&mut self, now: Duration) -> Result<bool, StudioError> {
        if !self.playback.tick(now) {
            return Ok(false);
        }
        let next = (self.frames.current_index() + 1) % self.frames.len();
        self.frames.set_current(next)?;
        self.load_current()?;
        Ok(true)
    }

    /// `tick` against the process-monotonic clock.
    pub fn tick_now(&mut self) -> Result<bool, StudioError> {
        self.tick(util::time::now())
    }

    // ---- onion skin ----------------------------------------------------

    pub fn onion(&self) -> &OnionSkin {
        &self.onion
    }

    pub fn set_onion_enabled(&mut self, enabled: bool) {
        self.onion.enabled = enabled;
    }

    pub fn set_onion_opacity(&mut self, opacity: f32) {
        self.onion.set_opacity(opacity);
    }

    // ---- rendering & export --------------------------------------------

    /// The raw live surface.
    pub fn surface(&self) -> &RasterSurface {
        &self.surface
    }

    /// The live surface with the onion ghost blended over it, ready for the
    /// host to present.
    pub fn composited(&self) -> Result<RasterSurface, StudioError> {
        let mut view = self.surface.clone();
        if let Some(overlay) = self.onion.compose(&self.frames)? {
            view.blend_over(&overlay, 1.0);
        }
        Ok(view)
    }

    /// The whole animation as JSON `{ frames, fps }` for download-style
    /// export.
    pub fn export_animation(&self) -> Result<String, StudioError> {
        let doc = ExportedAnimation {
            frames: self.frames.frames().iter().map(|frame| frame.raster.as_slice()).collect(),
            fps: self.playback.fps(),
        };
        Ok(serde_json::to_string(&doc)?)
    }

    // ---- internals -----------------------------------------------------

    /// Write the surface back into the current frame and save it, without
    /// ever letting a failed save touch in-memory state.
    fn commit_surface(&mut self) -> Result<(), StudioError> {
        let index = self.frames.current_index();
        let raster = self.surface.encode()?;
        let thumbnail = self.surface.thumbnail(self.config.thumbnail_width, self.config.thumbnail_height)?;
        self.frames.update_raster(index, raster.clone(), thumbnail.clone())?;
        self.events.emit(StudioEvent::FrameCommitted { index });
        let record = FrameRecord { frame_index: index, raster, thumbnail };
        if let Err(err) = self.store.save_frame(&self.project_id, record) {
            warn!("saving frame {index} of {} failed: {err}", self.project_id);
            self.events.emit(StudioEvent::SaveFailed { index, reason: err.to_string() });
        }
        Ok(())
    }

    /// Load the current frame into the live surface after any switch:
    /// cancels a stale gesture, resets per-frame history, announces the
    /// selection.
    fn load_current(&mut self) -> Result<(), StudioError> {
        self.engine.cancel(&mut self.surface);
        self.surface = RasterSurface::decode(&self.frames.current().raster)?;
        self.history.clear();
        let index = self.frames.current_index();
        debug!("frame {index} loaded into the live surface");
        self.events.emit(StudioEvent::FrameSelected { index });
        Ok(())
    }
}
