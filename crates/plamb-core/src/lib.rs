//! Plamb Level Editor Core
//!
//! Grid addressing, footprint math, placement validation and layer
//! visibility for the Plamb level editor, plus the level file format and an
//! editor session that wires them together.

pub mod catalog;
pub mod footprint;
pub mod grid;
pub mod ids;
pub mod level;
pub mod placeable;
pub mod placement;
pub mod registry;
pub mod session;
pub mod settings;
pub mod storage;
pub mod visibility;

pub use catalog::{CatalogEntry, CatalogError, EntryKind, ObjectCatalog};
pub use footprint::{Footprint, Rotation, footprint};
pub use grid::{CellCoord, CursorTarget, GridKind, GridMapper, GridPosition};
pub use ids::{ConnectionId, ParseError, PlatformId, SubgridId};
pub use level::{LevelError, LevelFile, LevelMetadata, PlatformEntry, PropEntry};
pub use placeable::{LevelObject, ObjectError, ObjectInfo, Placeable, Platform, Prop, PropKind};
pub use placement::PlacementValidator;
pub use registry::{PlacementRegistry, RegistryError};
pub use session::{
    CommandOutcome, EditorCommand, EditorSession, FrameInput, FrameReport, PlacementMode,
    SessionError,
};
pub use settings::{EditorSettings, GridOffset, SettingsError};
pub use storage::{FileStorage, LevelFolder, LevelStorage, MemoryStorage, SaveMode, StorageError};
pub use visibility::{
    LayerVisibilityOption, MaterialDirective, ObjectRef, ObjectVisibility, TintTier,
    material_directive,
};
