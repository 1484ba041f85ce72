/// 场景编辑器
///
/// 每个操作都是一次完整的 读取 → 内存修改 → 原子写回，操作之间不保留状态。
/// 公开方法从不返回 `Err` 也不 panic，所有失败都体现在 `EditResult` 中。
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::result::EditResult;
use crate::block::Block;
use crate::datatypes::{self, GAME_OBJECT};
use crate::guid::{find_project_root, GuidResolver};
use crate::id_alloc::IdAllocator;
use crate::io::{AtomicSceneWriter, DefaultSceneReader, SceneReader, SceneText, SceneWriter};
use crate::scene::SceneDocument;
use crate::utils::SceneError;

/// 编辑器配置
#[derive(Debug, Clone, Default)]
pub struct EditorConfig {
    /// 项目根目录；为空时从文件位置向上查找
    pub project_root: Option<PathBuf>,
    /// 随机 id 种子（用于可复现的输出）
    pub id_seed: Option<u64>,
    /// 写新文件时自动创建目录
    pub create_parent_dirs: bool,
}

/// 读入内存的文件及其换行风格
pub(crate) struct Loaded {
    pub doc: SceneDocument,
    pub crlf: bool,
}

/// 场景编辑器
///
/// # 使用示例
///
/// ```rust,ignore
/// use unity_scene_editor::{GuidCache, SceneEditor};
///
/// let editor = SceneEditor::new("Assets/Scenes/Main.unity")
///     .with_guid_resolver(GuidCache::load_json(Path::new("guid_cache.json"))?);
///
/// let result = editor.create_game_object("Spawner", Some("Level"));
/// println!("{}", serde_json::to_string_pretty(&result)?);
/// ```
pub struct SceneEditor {
    path: PathBuf,
    config: EditorConfig,
    reader: Box<dyn SceneReader>,
    writer: Option<Box<dyn SceneWriter>>,
    guids: Option<Box<dyn GuidResolver>>,
}

impl SceneEditor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: EditorConfig::default(),
            reader: Box::new(DefaultSceneReader),
            writer: None,
            guids: None,
        }
    }

    pub fn with_config(mut self, config: EditorConfig) -> Self {
        self.config = config;
        self
    }

    /// 替换读取实现
    pub fn with_reader(mut self, reader: impl SceneReader + 'static) -> Self {
        self.reader = Box::new(reader);
        self
    }

    /// 替换写入实现（默认为按配置构造的原子写入器）
    pub fn with_writer(mut self, writer: impl SceneWriter + 'static) -> Self {
        self.writer = Some(Box::new(writer));
        self
    }

    /// 设置 GUID 查询（添加脚本组件与展开预制体时使用）
    pub fn with_guid_resolver(mut self, resolver: impl GuidResolver + 'static) -> Self {
        self.guids = Some(Box::new(resolver));
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// 写入属性值
    ///
    /// `target` 为 GameObject 名称或任意对象的 fileID；给出 `component` 时
    /// 在该 GameObject 的组件中按类型名查找。
    pub fn set_property(
        &self,
        target: &str,
        component: Option<&str>,
        path: &str,
        value: &str,
        object_reference: Option<&str>,
    ) -> EditResult {
        self.finish(
            "set_property",
            self.try_set_property(target, component, path, value, object_reference),
        )
    }

    /// 读取属性值（不写文件）
    pub fn get_property(&self, target: &str, component: Option<&str>, path: &str) -> EditResult {
        self.finish("get_property", self.try_get_property(target, component, path))
    }

    fn try_set_property(
        &self,
        target: &str,
        component: Option<&str>,
        path: &str,
        value: &str,
        object_reference: Option<&str>,
    ) -> Result<EditResult, SceneError> {
        let mut loaded = self.load()?;
        let id = resolve_block(&loaded.doc, target, component)?;
        let block = loaded
            .doc
            .get_mut(&id)
            .ok_or_else(|| SceneError::not_found(format!("object {}", id)))?;
        if !block.set(path, value, object_reference) {
            return Err(SceneError::not_found(format!("property '{}' on object {}", path, id)));
        }

        let bytes = self.commit(&loaded)?;
        Ok(EditResult::ok(self.file_label(), format!("set {} on object {}", path, id))
            .with_bytes(bytes)
            .with_component(id))
    }

    fn try_get_property(
        &self,
        target: &str,
        component: Option<&str>,
        path: &str,
    ) -> Result<EditResult, SceneError> {
        let loaded = self.load()?;
        let id = resolve_block(&loaded.doc, target, component)?;
        let value = loaded
            .doc
            .get(&id)
            .and_then(|b| b.get(path))
            .ok_or_else(|| SceneError::not_found(format!("property '{}' on object {}", path, id)))?;
        Ok(EditResult::ok(self.file_label(), format!("read {} on object {}", path, id))
            .with_component(id)
            .with_value(value))
    }

    pub(crate) fn file_label(&self) -> String {
        self.path.display().to_string()
    }

    pub(crate) fn load(&self) -> Result<Loaded, SceneError> {
        self.load_from(&self.path)
    }

    pub(crate) fn load_from(&self, path: &Path) -> Result<Loaded, SceneError> {
        let text = self.reader.read(path)?;
        let doc = SceneDocument::parse(&text.content)?;
        debug!(path = %path.display(), objects = doc.len(), "scene loaded");
        Ok(Loaded {
            doc,
            crlf: text.crlf,
        })
    }

    /// 把整份文档写回编辑的文件
    pub(crate) fn commit(&self, loaded: &Loaded) -> Result<usize, SceneError> {
        self.write_to(&self.path, &loaded.doc, loaded.crlf)
    }

    pub(crate) fn write_to(&self, path: &Path, doc: &SceneDocument, crlf: bool) -> Result<usize, SceneError> {
        let text = SceneText {
            content: doc.to_text(),
            crlf,
        };
        match &self.writer {
            Some(writer) => writer.write(&text, path),
            None => AtomicSceneWriter::new(self.config.create_parent_dirs).write(&text, path),
        }
    }

    pub(crate) fn allocator(&self, doc: &SceneDocument) -> IdAllocator {
        IdAllocator::new(doc.used_ids(), self.config.id_seed)
    }

    pub(crate) fn guids(&self) -> Option<&dyn GuidResolver> {
        self.guids.as_deref()
    }

    /// 项目根目录：配置 → GUID 查询 → 从文件位置向上查找
    pub(crate) fn project_root(&self) -> Option<PathBuf> {
        self.config
            .project_root
            .clone()
            .or_else(|| self.guids().and_then(|g| g.project_root()).map(Path::to_path_buf))
            .or_else(|| find_project_root(&self.path))
    }

    /// 把内部结果转换为结果记录
    pub(crate) fn finish(&self, operation: &str, result: Result<EditResult, SceneError>) -> EditResult {
        match result {
            Ok(result) => {
                debug!(operation, file = %self.path.display(), "operation succeeded");
                result
            }
            Err(err) => {
                warn!(operation, file = %self.path.display(), error = %err, "operation failed");
                EditResult::failed(self.file_label(), &err)
            }
        }
    }
}

/// 解析 GameObject：fileID 或名称
pub(crate) fn resolve_game_object(doc: &SceneDocument, target: &str) -> Result<String, SceneError> {
    let target = target.trim();
    if let Some(block) = doc.get(target) {
        if block.class_id() == GAME_OBJECT {
            return Ok(target.to_string());
        }
    }
    doc.find_game_object(target)
        .map(|b| b.file_id().to_string())
        .ok_or_else(|| SceneError::not_found(format!("game object '{}'", target)))
}

/// 解析 Transform：Transform 的 fileID、GameObject 的 fileID 或名称
pub(crate) fn resolve_transform(doc: &SceneDocument, target: &str) -> Result<String, SceneError> {
    let target = target.trim();
    if let Some(block) = doc.get(target) {
        if datatypes::is_transform(block.class_id()) {
            return Ok(target.to_string());
        }
    }
    let game_object = resolve_game_object(doc, target)?;
    doc.transform_of(&game_object)
        .ok_or_else(|| SceneError::not_found(format!("transform of game object {}", game_object)))
}

/// 解析属性读写的目标对象
fn resolve_block(doc: &SceneDocument, target: &str, component: Option<&str>) -> Result<String, SceneError> {
    let Some(component) = component.map(str::trim).filter(|c| !c.is_empty()) else {
        if doc.contains(target.trim()) {
            return Ok(target.trim().to_string());
        }
        return resolve_game_object(doc, target);
    };

    let game_object = resolve_game_object(doc, target)?;
    doc.component_ids(&game_object)
        .into_iter()
        .find(|id| {
            doc.get(id)
                .is_some_and(|b: &Block| b.type_name().eq_ignore_ascii_case(component))
        })
        .ok_or_else(|| {
            SceneError::not_found(format!("component {} on game object {}", component, game_object))
        })
}
