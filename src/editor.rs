/// 编辑器层模块
///
/// 该模块在单对象编辑原语之上实现层级相关的操作。每个操作读取整个文件，
/// 在内存中完成一次逻辑修改，再原子地写回一次。
///
/// # 架构设计
///
/// - **scene_editor**: 编辑器本体、配置、目标解析与属性读写
/// - **hierarchy**: 创建/删除/复制/改变父节点
/// - **components**: 添加/删除/复制组件
/// - **prefab**: 创建变体、展开预制体实例
/// - **templates**: 新对象的文本模板
/// - **result**: 操作结果记录
///
/// # 使用示例
///
/// ```rust,ignore
/// use unity_scene_editor::SceneEditor;
///
/// let editor = SceneEditor::new("Assets/Scenes/Main.unity");
/// let created = editor.create_game_object("Enemy", None);
/// assert!(created.success);
///
/// let moved = editor.reparent_game_object("Enemy", Some("Spawner"));
/// println!("{}", moved.message);
/// ```
pub mod components;
pub mod hierarchy;
pub mod prefab;
pub mod result;
pub mod scene_editor;
pub mod templates;

// === 导出公共接口 ===
pub use prefab::{PrefabInstanceData, PropertyOverride};
pub use result::EditResult;
pub use scene_editor::{EditorConfig, SceneEditor};
pub use templates::BuiltinComponent;
