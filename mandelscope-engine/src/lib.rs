pub mod buffer;
pub mod codec;
pub mod compute;
pub mod consumer;
pub mod error;
pub mod export;
pub mod grid;
pub mod palette;
pub mod session;
pub mod worker;

pub use buffer::RgbBuffer;
pub use codec::{SessionSnapshot, PARAMETER_LINES};
pub use compute::{compute, compute_cancellable, ComputeCancel};
pub use consumer::{Frame, GridConsumer};
pub use error::{EngineError, PersistenceError, PersistenceErrorKind};
pub use export::{export_png, ExportMetadata, PngExporter};
pub use grid::EscapeGrid;
pub use palette::ColorMapper;
pub use session::{Session, SessionDefaults, RESOLUTION};
pub use worker::RecomputeWorker;

/// Convenience result type for the engine crate.
pub type Result<T> = std::result::Result<T, EngineError>;
