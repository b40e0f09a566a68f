use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Expected, recoverable sequence conditions, surfaced to hosts as rejected
/// operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SequenceError {
    #[error("a project keeps at least one frame")]
    LastFrame,
    #[error("frame index {index} is out of range for {count} frames")]
    IndexOutOfRange { index: usize, count: usize },
}

/// One animation frame: a stable identity plus encoded raster payloads.
///
/// `id` survives reordering; `index` is dense position and is rewritten on
/// every structural change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub id: Uuid,
    pub index: usize,
    /// Encoded full-resolution raster (see `RasterSurface::encode`).
    pub raster: Vec<u8>,
    /// Encoded reduced-resolution preview.
    pub thumbnail: Vec<u8>,
}

impl Frame {
    pub fn new(index: usize, raster: Vec<u8>, thumbnail: Vec<u8>) -> Self {
        Self { id: Uuid::new_v4(), index, raster, thumbnail }
    }
}

/// The ordered frames of a project, with a current-frame cursor.
///
/// Invariants: at least one frame at all times; indices are exactly
/// `0..len()` in order; the cursor is always in range and is clamped by any
/// operation that shrinks the sequence.
#[derive(Debug, Clone)]
pub struct FrameSequence {
    frames: Vec<Frame>,
    current: usize,
}

impl FrameSequence {
    /// Build a sequence from already-loaded frames, renumbering them densely.
    /// Callers seed new projects with a blank frame first; an empty sequence
    /// is a construction bug.
    pub fn from_frames(mut frames: Vec<Frame>) -> Self {
        assert!(!frames.is_empty(), "a sequence starts with at least one frame");
        frames.sort_by_key(|frame| frame.index);
        let mut sequence = Self { frames, current: 0 };
        sequence.renumber();
        sequence
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        // The at-least-one-frame invariant makes this always false.
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> &Frame {
        &self.frames[self.current]
    }

    pub fn get(&self, index: usize) -> Result<&Frame, SequenceError> {
        self.check(index)?;
        Ok(&self.frames[index])
    }

    pub fn set_current(&mut self, index: usize) -> Result<(), SequenceError> {
        self.check(index)?;
        self.current = index;
        Ok(())
    }

    /// Insert a new frame with the given payloads immediately after `index`;
    /// it becomes the current frame. Returns its index.
    pub fn insert_after(
        &mut self,
        index: usize,
        raster: Vec<u8>,
        thumbnail: Vec<u8>,
    ) -> Result<usize, SequenceError> {
        self.check(index)?;
        self.frames.insert(index + 1, Frame::new(index + 1, raster, thumbnail));
        self.renumber();
        self.current = index + 1;
        debug!("inserted frame at {} ({} total)", self.current, self.frames.len());
        Ok(self.current)
    }

    /// Copy the frame at `index` (fresh id, same payloads) in right after it;
    /// the copy becomes the current frame. Returns its index.
    pub fn duplicate(&mut self, index: usize) -> Result<usize, SequenceError> {
        let source = self.get(index)?;
        let (raster, thumbnail) = (source.raster.clone(), source.thumbnail.clone());
        self.insert_after(index, raster, thumbnail)
    }

    /// Remove the frame at `index`, renumbering the rest and clamping the
    /// cursor. Removing the only frame is rejected.
    pub fn delete(&mut self, index: usize) -> Result<(), SequenceError> {
        self.check(index)?;
        if self.frames.len() == 1 {
            return Err(SequenceError::LastFrame);
        }
        self.frames.remove(index);
        self.renumber();
        if self.current >= self.frames.len() {
            self.current = self.frames.len() - 1;
        }
        debug!("deleted frame {} ({} remain)", index, self.frames.len());
        Ok(())
    }

    /// Replace the payloads of the frame at `index` after a committed edit.
    pub fn update_raster(
        &mut self,
        index: usize,
        raster: Vec<u8>,
        thumbnail: Vec<u8>,
    ) -> Result<(), SequenceError> {
        self.check(index)?;
        let frame = &mut self.frames[index];
        frame.raster = raster;
        frame.thumbnail = thumbnail;
        Ok(())
    }

    fn check(&self, index: usize) -> Result<(), SequenceError> {
        if index < self.frames.len() {
            Ok(())
        } else {
            Err(SequenceError::IndexOutOfRange { index, count: self.frames.len() })
        }
    }

    fn renumber(&mut self) {
        for (index, frame) in self.frames.iter_mut().enumerate() {
            frame.index = index;
        }
    }
}
