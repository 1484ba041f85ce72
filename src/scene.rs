/// 场景文档
///
/// 一个场景/预制体文件 = 序言 + 按出现顺序排列的对象。
/// 对象之间的关系全部通过 fileID 引用表达，这里提供按引用遍历层级的查询。
use std::collections::{HashMap, HashSet, VecDeque};

use crate::block::{local_reference, parse_reference, Block};
use crate::datatypes::{self, GAME_OBJECT};
use crate::utils::{unquote_scalar, SceneError};

/// 新文件使用的序言
pub const DEFAULT_PROLOGUE: &str = "%YAML 1.1\n%TAG !u! tag:unity3d.com,2011:\n";

const HEADER_PREFIX: &str = "--- !u!";

#[derive(Debug, Clone)]
pub struct SceneDocument {
    prologue: String,
    blocks: Vec<Block>,
}

impl Default for SceneDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneDocument {
    /// 只含默认序言的空文档
    pub fn new() -> Self {
        Self {
            prologue: DEFAULT_PROLOGUE.to_string(),
            blocks: Vec::new(),
        }
    }

    /// 解析文件文本
    ///
    /// 以 `--- !u!` 开头的行开始一个新对象，之前的内容原样保留为序言。
    pub fn parse(text: &str) -> Result<Self, SceneError> {
        let mut starts = Vec::new();
        let mut offset = 0;
        for line in text.split_inclusive('\n') {
            if line.starts_with(HEADER_PREFIX) {
                starts.push(offset);
            }
            offset += line.len();
        }

        let prologue_end = starts.first().copied().unwrap_or(text.len());
        let mut blocks = Vec::with_capacity(starts.len());
        for (n, &start) in starts.iter().enumerate() {
            let end = starts.get(n + 1).copied().unwrap_or(text.len());
            blocks.push(Block::parse(&text[start..end])?);
        }

        Ok(Self {
            prologue: text[..prologue_end].to_string(),
            blocks,
        })
    }

    /// 生成文件文本；未修改时与输入逐字节一致
    pub fn to_text(&self) -> String {
        let len = self.prologue.len() + self.blocks.iter().map(|b| b.raw().len()).sum::<usize>();
        let mut out = String::with_capacity(len);
        out.push_str(&self.prologue);
        for block in &self.blocks {
            out.push_str(block.raw());
        }
        out
    }

    pub fn prologue(&self) -> &str {
        &self.prologue
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn blocks_mut(&mut self) -> &mut [Block] {
        &mut self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// 是否有对象被修改
    pub fn is_dirty(&self) -> bool {
        self.blocks.iter().any(Block::is_dirty)
    }

    pub fn get(&self, id: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.file_id() == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Block> {
        self.blocks.iter_mut().find(|b| b.file_id() == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.blocks.iter().position(|b| b.file_id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// 追加对象到文件末尾
    pub fn push(&mut self, block: Block) {
        self.seal_before(self.blocks.len());
        self.blocks.push(block);
    }

    /// 在指定位置插入对象
    pub fn insert(&mut self, index: usize, mut block: Block) {
        let index = index.min(self.blocks.len());
        self.seal_before(index);
        if index < self.blocks.len() {
            block.ensure_trailing_newline();
        }
        self.blocks.insert(index, block);
    }

    /// 按 id 删除对象
    pub fn remove(&mut self, id: &str) -> Option<Block> {
        let pos = self.position(id)?;
        Some(self.blocks.remove(pos))
    }

    /// 原位替换同 id 的对象，返回旧对象
    pub fn replace(&mut self, mut block: Block) -> Option<Block> {
        let pos = self.position(block.file_id())?;
        if pos + 1 < self.blocks.len() {
            block.ensure_trailing_newline();
        }
        Some(std::mem::replace(&mut self.blocks[pos], block))
    }

    /// 批量删除，返回实际删除的 id（文件顺序）
    pub fn remove_all(&mut self, ids: &HashSet<String>) -> Vec<String> {
        let mut removed = Vec::new();
        self.blocks.retain(|b| {
            if ids.contains(b.file_id()) {
                removed.push(b.file_id().to_string());
                false
            } else {
                true
            }
        });
        removed
    }

    /// 把仍指向 `ids` 的文件内引用改写为空引用，返回被修改的对象 id
    ///
    /// 在删除对象之后调用，保证剩余对象不引用已不存在的 id。
    pub fn clear_references(&mut self, ids: &HashSet<String>) -> Vec<String> {
        let map: HashMap<String, String> = ids.iter().map(|id| (id.clone(), "0".to_string())).collect();
        let mut changed = Vec::new();
        for block in self.blocks.iter_mut().filter(|b| !ids.contains(b.file_id())) {
            if block.remap_ids(&map) {
                changed.push(block.file_id().to_string());
            }
        }
        changed
    }

    /// 保证插入位置之前的文本以换行结束
    fn seal_before(&mut self, index: usize) {
        if index == 0 {
            if !self.prologue.is_empty() && !self.prologue.ends_with('\n') {
                self.prologue.push('\n');
            }
        } else if let Some(prev) = self.blocks.get_mut(index - 1) {
            prev.ensure_trailing_newline();
        }
    }

    /// 第一个指定类型的对象
    pub fn first_of_class(&self, class_id: u32) -> Option<&Block> {
        self.blocks.iter().find(|b| b.class_id() == class_id)
    }

    /// 指定类型的所有对象
    pub fn blocks_of_class(&self, class_id: u32) -> impl Iterator<Item = &Block> {
        self.blocks.iter().filter(move |b| b.class_id() == class_id)
    }

    /// 名称匹配的第一个 GameObject（忽略占位对象）
    pub fn find_game_object(&self, name: &str) -> Option<&Block> {
        self.blocks_of_class(GAME_OBJECT).find(|b| {
            !b.is_stripped() && b.get("m_Name").is_some_and(|n| unquote_scalar(&n) == name)
        })
    }

    /// GameObject 的名称
    pub fn name_of(&self, game_object_id: &str) -> Option<String> {
        self.get(game_object_id)?.get("m_Name").map(|n| unquote_scalar(&n))
    }

    /// GameObject 组件列表中的 id
    pub fn component_ids(&self, game_object_id: &str) -> Vec<String> {
        let Some(go) = self.get(game_object_id) else {
            return Vec::new();
        };
        go.array_elements("m_Component")
            .iter()
            .filter_map(|e| parse_reference(e))
            .filter(|r| r.is_local() && !r.is_null())
            .map(|r| r.file_id)
            .collect()
    }

    /// GameObject 的 Transform（或 RectTransform）
    pub fn transform_of(&self, game_object_id: &str) -> Option<String> {
        let listed = self.component_ids(game_object_id).into_iter().find(|id| {
            self.get(id)
                .is_some_and(|b| datatypes::is_transform(b.class_id()))
        });
        listed.or_else(|| {
            self.blocks
                .iter()
                .find(|b| {
                    datatypes::is_transform(b.class_id())
                        && b.reference("m_GameObject").as_deref() == Some(game_object_id)
                })
                .map(|b| b.file_id().to_string())
        })
    }

    /// 组件所属的 GameObject
    pub fn owner_of(&self, component_id: &str) -> Option<String> {
        self.get(component_id)?.reference("m_GameObject")
    }

    /// Transform 的父节点（根节点返回 `None`）
    pub fn parent_of(&self, transform_id: &str) -> Option<String> {
        self.get(transform_id)?.reference("m_Father")
    }

    /// Transform 的子节点
    ///
    /// 占位 Transform 没有 `m_Children`，改为查找 `m_Father` 指向它的节点。
    pub fn children_of(&self, transform_id: &str) -> Vec<String> {
        let Some(block) = self.get(transform_id) else {
            return Vec::new();
        };
        if block.is_stripped() {
            return self
                .blocks
                .iter()
                .filter(|b| {
                    datatypes::is_transform(b.class_id())
                        && b.reference("m_Father").as_deref() == Some(transform_id)
                })
                .map(|b| b.file_id().to_string())
                .collect();
        }
        block
            .array_elements("m_Children")
            .iter()
            .filter_map(|e| parse_reference(e))
            .filter(|r| r.is_local() && !r.is_null())
            .map(|r| r.file_id)
            .collect()
    }

    /// 所有后代 Transform（广度优先，不含自身，遇到环时停止）
    pub fn descendants(&self, transform_id: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        seen.insert(transform_id.to_string());
        let mut out = Vec::new();
        let mut queue: VecDeque<String> = self.children_of(transform_id).into();
        while let Some(id) = queue.pop_front() {
            if !seen.insert(id.clone()) {
                continue;
            }
            queue.extend(self.children_of(&id));
            out.push(id);
        }
        out
    }

    /// `m_GameObject` 指向该对象的非占位组件（含 Transform）
    pub fn attached_to(&self, game_object_id: &str) -> Vec<String> {
        self.blocks
            .iter()
            .filter(|b| !b.is_stripped() && b.reference("m_GameObject").as_deref() == Some(game_object_id))
            .map(|b| b.file_id().to_string())
            .collect()
    }

    /// 预制体实例的占位对象
    pub fn instance_members(&self, instance_id: &str) -> Vec<String> {
        self.blocks
            .iter()
            .filter(|b| b.is_stripped() && b.reference("m_PrefabInstance").as_deref() == Some(instance_id))
            .map(|b| b.file_id().to_string())
            .collect()
    }

    /// 文件中已占用的 id：对象 id 与所有被引用的 id
    pub fn used_ids(&self) -> HashSet<String> {
        let mut used = HashSet::new();
        for block in &self.blocks {
            used.insert(block.file_id().to_string());
            used.extend(block.local_references());
        }
        used
    }

    /// 在 `parent` 的 `m_Children` 中插入子节点引用
    pub(crate) fn attach_child(&mut self, parent: &str, child: &str, index: isize) -> Result<(), SceneError> {
        let block = self
            .get_mut(parent)
            .ok_or_else(|| SceneError::not_found(format!("transform {}", parent)))?;
        if !block.insert_array_element("m_Children", index, &local_reference(child)) {
            return Err(SceneError::invalid(format!("transform {} has no m_Children array", parent)));
        }
        Ok(())
    }

    /// 从 `parent` 的 `m_Children` 中移除子节点引用，返回原下标
    pub(crate) fn detach_child(&mut self, parent: &str, child: &str) -> Option<usize> {
        let block = self.get_mut(parent)?;
        let index = reference_index(&block.array_elements("m_Children"), child)?;
        block.remove_array_element("m_Children", index as isize).then_some(index)
    }

    /// 在 GameObject 的组件列表末尾追加组件
    pub(crate) fn attach_component(&mut self, game_object: &str, component: &str) -> Result<(), SceneError> {
        let block = self
            .get_mut(game_object)
            .ok_or_else(|| SceneError::not_found(format!("game object {}", game_object)))?;
        let entry = format!("component: {}", local_reference(component));
        if !block.insert_array_element("m_Component", -1, &entry) {
            return Err(SceneError::invalid(format!(
                "game object {} has no m_Component array",
                game_object
            )));
        }
        Ok(())
    }

    /// 从 GameObject 的组件列表中移除组件
    pub(crate) fn detach_component(&mut self, game_object: &str, component: &str) -> bool {
        let Some(block) = self.get_mut(game_object) else {
            return false;
        };
        match reference_index(&block.array_elements("m_Component"), component) {
            Some(index) => block.remove_array_element("m_Component", index as isize),
            None => false,
        }
    }
}

/// 数组元素中引用 `id` 的下标
pub(crate) fn reference_index(elements: &[String], id: &str) -> Option<usize> {
    elements.iter().position(|e| {
        parse_reference(e).is_some_and(|r| r.is_local() && r.file_id == id)
    })
}
