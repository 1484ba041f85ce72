mod array;
mod path;
pub mod references;

#[cfg(test)]
mod tests;

use std::borrow::Cow;
use std::cell::RefCell;
use std::collections::HashMap;

use tracing::debug;

use crate::header::BlockHeader;
use crate::utils::SceneError;

use path::{Node, Resolver};
pub use references::{
    external_reference, is_null_reference, local_reference, parse_reference, Reference,
    NULL_REFERENCE,
};

/// 值的结构写法
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueFormat {
    /// 路径不存在
    Absent,
    /// 单行标量（或折行字符串）
    Scalar,
    /// 行内映射 `{x: 1, y: 2}`
    Inline,
    /// 块映射（子行缩进更深）
    Block,
    /// 数组（`[]` 或 `- value` 多行）
    Sequence,
}

/// 序列化对象（文件中由头部分隔的一个单元）
///
/// # 核心特性
/// - 持有对象的完整原始文本（含头部），所有修改按字节区间替换
/// - 头部字段与文本头部始终一致
/// - 只有成功的修改才会设置 `dirty`
/// - 结构写法缓存只属于当前实例，克隆不共享
#[derive(Debug)]
pub struct Block {
    header: BlockHeader,
    raw: String,
    dirty: bool,
    format_cache: RefCell<HashMap<String, ValueFormat>>,
}

impl Block {
    /// 从原始文本解析对象，首行必须是合法头部
    pub fn parse(raw: impl Into<String>) -> Result<Self, SceneError> {
        let raw = raw.into();
        let header = BlockHeader::parse(raw.lines().next().unwrap_or(""))?;
        Ok(Block {
            header,
            raw,
            dirty: false,
            format_cache: RefCell::new(HashMap::new()),
        })
    }

    pub fn header(&self) -> &BlockHeader {
        &self.header
    }

    pub fn file_id(&self) -> &str {
        &self.header.file_id
    }

    pub fn class_id(&self) -> u32 {
        self.header.class_id
    }

    pub fn is_stripped(&self) -> bool {
        self.header.stripped
    }

    pub fn type_name(&self) -> Cow<'static, str> {
        self.header.type_name()
    }

    /// 完整原始文本
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// 读取属性值，路径不存在返回 `None`
    pub fn get(&self, path: &str) -> Option<String> {
        let node = self.resolve(path)?;
        let span = node.span();
        Some(self.raw[span.start..span.end].to_string())
    }

    /// 检查属性是否存在
    pub fn has(&self, path: &str) -> bool {
        self.resolve(path).is_some()
    }

    /// 写入属性值
    ///
    /// `object_reference` 非空且不是空引用时原样写入它而不是 `value`（对象引用字段）。
    /// 路径不存在返回 `false`，文本与 `dirty` 保持不变。
    pub fn set(&mut self, path: &str, value: &str, object_reference: Option<&str>) -> bool {
        let value = match object_reference {
            Some(reference) if !reference.trim().is_empty() && !is_null_reference(reference) => {
                reference
            }
            _ => value,
        };

        let Some(node) = self.resolve(path) else {
            debug!(file_id = %self.header.file_id, path, "property not found");
            return false;
        };
        let span = node.span();

        let mut out = String::with_capacity(self.raw.len() + value.len());
        out.push_str(&self.raw[..span.start]);
        if span.start == span.end && !value.is_empty() && self.raw[..span.start].ends_with(':') {
            out.push(' ');
        }
        out.push_str(value);
        out.push_str(&self.raw[span.end..]);

        self.apply(out);
        true
    }

    /// 检测路径对应值的结构写法（按实例缓存）
    pub fn detect_format(&self, path: &str) -> ValueFormat {
        if let Some(format) = self.format_cache.borrow().get(path) {
            return *format;
        }
        let format = match self.resolve(path) {
            None => ValueFormat::Absent,
            Some(Node::Scalar(_)) => ValueFormat::Scalar,
            Some(Node::Inline(_)) => ValueFormat::Inline,
            Some(Node::Block { .. }) | Some(Node::ItemMap { .. }) => ValueFormat::Block,
            Some(Node::Sequence(_)) => ValueFormat::Sequence,
        };
        self.format_cache.borrow_mut().insert(path.to_string(), format);
        format
    }

    /// 数组长度；路径不是数组返回 `None`
    pub fn array_length(&self, path: &str) -> Option<usize> {
        match self.resolve(path)? {
            Node::Sequence(seq) => Some(array::length(&seq)),
            _ => None,
        }
    }

    /// 数组元素文本
    pub fn array_elements(&self, path: &str) -> Vec<String> {
        match self.resolve(path) {
            Some(Node::Sequence(seq)) => array::elements(&self.raw, &seq),
            _ => Vec::new(),
        }
    }

    /// 插入数组元素，`index == -1` 追加
    pub fn insert_array_element(&mut self, path: &str, index: isize, value: &str) -> bool {
        let Some(Node::Sequence(seq)) = self.resolve(path) else {
            return false;
        };
        match array::insert(&self.raw, &seq, index, value) {
            Some(out) => {
                self.apply(out);
                true
            }
            None => false,
        }
    }

    /// 删除数组元素；负数或越界下标失败
    pub fn remove_array_element(&mut self, path: &str, index: isize) -> bool {
        let Some(Node::Sequence(seq)) = self.resolve(path) else {
            return false;
        };
        match array::remove(&self.raw, &seq, index) {
            Some(out) => {
                self.apply(out);
                true
            }
            None => false,
        }
    }

    /// 正文中所有非空引用（不含头部自身 id）
    ///
    /// 包含带 guid 的外部资源引用；只关心文件内对象图的调用方用
    /// [`Block::local_references`] 或按 [`Reference::is_local`] 过滤。
    pub fn extract_references(&self) -> Vec<Reference> {
        references::all_references(self.body())
    }

    /// 正文中所有非空的文件内引用 id
    pub fn local_references(&self) -> Vec<String> {
        self.extract_references()
            .into_iter()
            .filter(Reference::is_local)
            .map(|r| r.file_id)
            .collect()
    }

    /// 读取引用字段指向的 id（空引用返回 `None`）
    pub fn reference(&self, path: &str) -> Option<String> {
        let reference = parse_reference(&self.get(path)?)?;
        (!reference.is_null()).then_some(reference.file_id)
    }

    /// 把 `old` 重写为 `new`：头部与正文中的每处文件内引用
    pub fn remap_id(&mut self, old: &str, new: &str) -> bool {
        let mut map = HashMap::new();
        map.insert(old.to_string(), new.to_string());
        self.remap_ids(&map)
    }

    /// 按映射表一次性重写头部与正文引用；没有命中时不产生修改
    pub fn remap_ids(&mut self, map: &HashMap<String, String>) -> bool {
        if map.is_empty() {
            return false;
        }
        let (body, body_changed) = references::remap_local(self.body(), map);
        let new_id = map.get(&self.header.file_id).cloned();
        if !body_changed && new_id.is_none() {
            return false;
        }

        let mut header = self.header.clone();
        if let Some(id) = new_id {
            header.file_id = id;
        }
        let out = format!("{}{}", header.render(), body);
        self.header = header;
        self.apply(out);
        true
    }

    /// 用新文本整体替换对象，新头部不合法时失败且不修改
    pub fn replace_raw(&mut self, text: impl Into<String>) -> Result<(), SceneError> {
        let text = text.into();
        let header = BlockHeader::parse(text.lines().next().unwrap_or(""))?;
        self.header = header;
        self.apply(text);
        Ok(())
    }

    /// 保证文本以换行结尾（追加新对象前使用）
    pub(crate) fn ensure_trailing_newline(&mut self) {
        if !self.raw.ends_with('\n') {
            let mut out = self.raw.clone();
            out.push('\n');
            self.apply(out);
        }
    }

    /// 头部行之后的全部文本（以头部行的换行符开头）
    fn body(&self) -> &str {
        match self.raw.find('\n') {
            Some(pos) if self.raw[..pos].ends_with('\r') => &self.raw[pos - 1..],
            Some(pos) => &self.raw[pos..],
            None => "",
        }
    }

    fn resolve(&self, path: &str) -> Option<Node> {
        let segments = path::parse_path(path)?;
        Resolver::new(&self.raw).resolve(&segments)
    }

    fn apply(&mut self, raw: String) {
        self.raw = raw;
        self.dirty = true;
        self.format_cache.borrow_mut().clear();
    }
}

impl Clone for Block {
    /// 独立副本：新的文本缓冲，`dirty` 为 false，缓存为空
    fn clone(&self) -> Self {
        Block {
            header: self.header.clone(),
            raw: self.raw.clone(),
            dirty: false,
            format_cache: RefCell::new(HashMap::new()),
        }
    }
}
