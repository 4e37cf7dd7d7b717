//! Map data, collision and the manager that switches between maps.

pub mod descriptor;
pub mod direction;
pub mod grid;
pub mod manager;
pub mod record;
pub mod source;

pub use descriptor::MapDescriptor;
pub use grid::{CollisionMap, TileGrid};
pub use manager::{MapManager, SpriteCollection, SwitchContext};
pub use record::{MapKind, MapRecord};
pub use source::{DirectoryMaps, EmbeddedMaps, MapSource, MemoryMaps};
