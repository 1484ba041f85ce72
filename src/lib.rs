pub mod block;
pub mod datatypes;
pub mod editor;
pub mod guid;
pub mod header;
pub mod id_alloc;
pub mod io;
pub mod scene;
pub mod utils;

// 重新导出主要结构
pub use block::{Block, Reference, ValueFormat};
pub use editor::{EditResult, EditorConfig, SceneEditor};
pub use guid::{GuidCache, GuidResolver};
pub use header::BlockHeader;
pub use id_alloc::IdAllocator;
pub use scene::SceneDocument;
pub use utils::{ErrorKind, SceneError};

// 常量定义
pub const SUPPORTED_EXTENSIONS: &[&str] = &["unity", "prefab", "asset"];
