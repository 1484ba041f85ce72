/// IO 抽象层模块
///
/// 该模块提供场景文件读写的抽象接口，编辑器通过 trait 使用它们，
/// 测试可以替换为内存实现。
///
/// # 架构设计
///
/// - **traits**: 定义 SceneReader/SceneWriter trait 接口
/// - **scene_io**: 基于文件系统的默认实现（原子写入）
///
/// # 使用示例
///
/// ```rust,ignore
/// use unity_scene_editor::io::{DefaultSceneReader, SceneReader};
///
/// let text = DefaultSceneReader.read(Path::new("Assets/Main.unity"))?;
/// ```
pub mod traits;
pub mod scene_io;

// === 导出 trait 定义 ===
pub use traits::{SceneReader, SceneText, SceneWriter};

// === 导出默认实现 ===
pub use scene_io::{AtomicSceneWriter, DefaultSceneReader};
