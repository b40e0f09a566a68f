#![warn(clippy::all, rust_2018_idioms)]

pub mod color;
pub mod event;
pub mod fill;
pub mod frame;
pub mod history;
pub mod onion;
pub mod playback;
pub mod store;
pub mod studio;
pub mod surface;
pub mod tools;
pub mod util;

pub use color::Rgba;
pub use event::{EventBus, EventHandler, StudioEvent};
pub use fill::flood_fill;
pub use frame::{Frame, FrameSequence, SequenceError};
pub use history::{History, HistoryError};
pub use onion::OnionSkin;
pub use playback::{PlaybackScheduler, PlaybackState};
pub use store::{FrameRecord, MemoryStore, ProjectStore, StoreError};
pub use studio::{Studio, StudioConfig, StudioError};
pub use surface::{RasterSurface, Snapshot, SurfaceError};
pub use tools::{ShapeLimits, Tool, ToolEngine, ToolKind};
