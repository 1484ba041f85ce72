/// 层级操作：创建、删除、复制、改变父节点
use std::collections::{HashMap, HashSet, VecDeque};

use tracing::debug;

use super::result::EditResult;
use super::scene_editor::{resolve_game_object, resolve_transform, SceneEditor};
use super::templates;
use crate::block::{local_reference, Block};
use crate::datatypes;
use crate::scene::{reference_index, SceneDocument};
use crate::utils::{quote_scalar, SceneError};

impl SceneEditor {
    /// 创建 GameObject（含 Transform）
    ///
    /// `parent` 可以是 GameObject 名称、GameObject 或 Transform 的 fileID；`None` 为根节点。
    pub fn create_game_object(&self, name: &str, parent: Option<&str>) -> EditResult {
        self.finish("create_game_object", self.try_create_game_object(name, parent))
    }

    /// 删除 GameObject 及其全部后代与组件
    pub fn delete_game_object(&self, target: &str) -> EditResult {
        self.finish("delete_game_object", self.try_delete_game_object(target))
    }

    /// 复制 GameObject 及其子树；`new_name` 为空时使用 `<原名> (1)`
    pub fn duplicate_game_object(&self, target: &str, new_name: Option<&str>) -> EditResult {
        self.finish("duplicate_game_object", self.try_duplicate_game_object(target, new_name))
    }

    /// 改变父节点；`new_parent` 为 `None` 时移到根
    pub fn reparent_game_object(&self, target: &str, new_parent: Option<&str>) -> EditResult {
        self.finish("reparent_game_object", self.try_reparent_game_object(target, new_parent))
    }

    fn try_create_game_object(&self, name: &str, parent: Option<&str>) -> Result<EditResult, SceneError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SceneError::invalid("game object name must not be empty"));
        }

        let mut loaded = self.load()?;
        let doc = &mut loaded.doc;
        let parent = parent.map(|p| resolve_transform(doc, p)).transpose()?;

        let mut alloc = self.allocator(doc);
        let game_object = alloc.allocate();
        let transform = alloc.allocate();

        doc.push(Block::parse(templates::game_object(&game_object, name, &transform))?);
        doc.push(Block::parse(templates::transform(&transform, &game_object, parent.as_deref()))?);
        if let Some(parent) = &parent {
            doc.attach_child(parent, &transform, -1)?;
        }

        let bytes = self.commit(&loaded)?;
        Ok(EditResult::ok(self.file_label(), format!("created game object '{}'", name))
            .with_bytes(bytes)
            .with_game_object(game_object.clone())
            .with_transform(transform.clone())
            .with_created(vec![game_object, transform]))
    }

    fn try_delete_game_object(&self, target: &str) -> Result<EditResult, SceneError> {
        let mut loaded = self.load()?;
        let doc = &mut loaded.doc;
        let game_object = resolve_game_object(doc, target)?;
        let transform = doc
            .transform_of(&game_object)
            .ok_or_else(|| SceneError::invalid(format!("game object {} has no transform", game_object)))?;

        let doomed: HashSet<String> = subtree_ids(doc, &game_object, &transform).into_iter().collect();
        if let Some(parent) = doc.parent_of(&transform) {
            if !doomed.contains(&parent) {
                doc.detach_child(&parent, &transform);
            }
        }
        let removed = doc.remove_all(&doomed);
        let cleared = doc.clear_references(&doomed);
        debug!(
            game_object = %game_object,
            removed = removed.len(),
            cleared = cleared.len(),
            "subtree removed"
        );

        let bytes = self.commit(&loaded)?;
        Ok(EditResult::ok(
            self.file_label(),
            format!("deleted game object {} ({} objects)", game_object, removed.len()),
        )
        .with_bytes(bytes)
        .with_game_object(game_object)
        .with_removed(removed))
    }

    fn try_duplicate_game_object(
        &self,
        target: &str,
        new_name: Option<&str>,
    ) -> Result<EditResult, SceneError> {
        let mut loaded = self.load()?;
        let doc = &mut loaded.doc;
        let game_object = resolve_game_object(doc, target)?;
        let transform = doc
            .transform_of(&game_object)
            .ok_or_else(|| SceneError::invalid(format!("game object {} has no transform", game_object)))?;

        let ids = subtree_ids(doc, &game_object, &transform);
        let mut alloc = self.allocator(doc);
        let mut map = HashMap::with_capacity(ids.len());
        for id in &ids {
            map.insert(id.clone(), alloc.allocate());
        }
        let new_game_object = mapped(&map, &game_object)?;
        let new_transform = mapped(&map, &transform)?;

        let name = match new_name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => name.to_string(),
            None => format!("{} (1)", doc.name_of(&game_object).unwrap_or_default()),
        };

        // 克隆并把子树内部引用重写为新 id，指向子树外的引用保持不变
        let mut clones = Vec::with_capacity(ids.len());
        let mut last = 0;
        for (index, block) in doc.blocks().iter().enumerate() {
            if map.contains_key(block.file_id()) {
                let mut copy = block.clone();
                copy.remap_ids(&map);
                clones.push(copy);
                last = index;
            }
        }
        for copy in clones.iter_mut() {
            if copy.file_id() == new_game_object && !copy.set("m_Name", &quote_scalar(&name), None) {
                return Err(SceneError::invalid(format!("game object {} has no m_Name", game_object)));
            }
        }
        let created: Vec<String> = clones.iter().map(|b| b.file_id().to_string()).collect();
        for (offset, copy) in clones.into_iter().enumerate() {
            doc.insert(last + 1 + offset, copy);
        }

        if let Some(parent) = doc.parent_of(&transform) {
            let slot = doc
                .get(&parent)
                .filter(|p| !p.is_stripped())
                .map(|p| reference_index(&p.array_elements("m_Children"), &transform));
            if let Some(slot) = slot {
                let index = slot.map(|i| i as isize + 1).unwrap_or(-1);
                doc.attach_child(&parent, &new_transform, index)?;
            }
        }

        let bytes = self.commit(&loaded)?;
        Ok(EditResult::ok(
            self.file_label(),
            format!("duplicated game object {} as '{}'", game_object, name),
        )
        .with_bytes(bytes)
        .with_game_object(new_game_object)
        .with_transform(new_transform)
        .with_created(created))
    }

    fn try_reparent_game_object(
        &self,
        target: &str,
        new_parent: Option<&str>,
    ) -> Result<EditResult, SceneError> {
        let mut loaded = self.load()?;
        let doc = &mut loaded.doc;
        let game_object = resolve_game_object(doc, target)?;
        let transform = doc
            .transform_of(&game_object)
            .ok_or_else(|| SceneError::invalid(format!("game object {} has no transform", game_object)))?;
        let new_parent = new_parent.map(|p| resolve_transform(doc, p)).transpose()?;

        if let Some(parent) = &new_parent {
            if *parent == transform {
                return Err(SceneError::conflict(format!(
                    "cannot make game object {} its own parent",
                    game_object
                )));
            }
            if doc.descendants(&transform).contains(parent) {
                return Err(SceneError::conflict(format!(
                    "transform {} is a descendant of {}; reparenting would create a cycle",
                    parent, transform
                )));
            }
            if doc.get(parent).is_some_and(Block::is_stripped) {
                return Err(SceneError::conflict(format!(
                    "transform {} is a prefab instance placeholder",
                    parent
                )));
            }
        }

        if let Some(old) = doc.parent_of(&transform) {
            doc.detach_child(&old, &transform);
        }
        let father = local_reference(new_parent.as_deref().unwrap_or("0"));
        let block = doc
            .get_mut(&transform)
            .ok_or_else(|| SceneError::not_found(format!("transform {}", transform)))?;
        if !block.set("m_Father", &father, None) {
            return Err(SceneError::invalid(format!("transform {} has no m_Father", transform)));
        }
        if let Some(parent) = &new_parent {
            doc.attach_child(parent, &transform, -1)?;
        }

        let bytes = self.commit(&loaded)?;
        let destination = new_parent.as_deref().unwrap_or("root");
        Ok(EditResult::ok(
            self.file_label(),
            format!("moved game object {} under {}", game_object, destination),
        )
        .with_bytes(bytes)
        .with_game_object(game_object)
        .with_transform(transform))
    }
}

fn mapped(map: &HashMap<String, String>, id: &str) -> Result<String, SceneError> {
    map.get(id)
        .cloned()
        .ok_or_else(|| SceneError::invalid(format!("object {} missing from subtree", id)))
}

/// 子树包含的全部对象 id
///
/// 从根 Transform 沿子节点展开：普通节点带上所属 GameObject 及其组件；
/// 预制体实例的占位 Transform 带上实例对象、全部占位对象，以及场景中
/// 挂在占位 GameObject 上的组件。
pub(crate) fn subtree_ids(doc: &SceneDocument, game_object: &str, transform: &str) -> Vec<String> {
    let mut ids = Vec::new();
    let mut seen = HashSet::new();
    let mut add = |id: String, ids: &mut Vec<String>| {
        if seen.insert(id.clone()) {
            ids.push(id);
        }
    };

    let mut visited = HashSet::new();
    let mut queue = VecDeque::from([transform.to_string()]);
    while let Some(current) = queue.pop_front() {
        if !visited.insert(current.clone()) {
            continue;
        }
        queue.extend(doc.children_of(&current));
        let Some(block) = doc.get(&current) else {
            continue;
        };

        if block.is_stripped() {
            if let Some(instance) = block.reference("m_PrefabInstance") {
                add(instance.clone(), &mut ids);
                for member in doc.instance_members(&instance) {
                    let member_is_transform = doc
                        .get(&member)
                        .is_some_and(|b| datatypes::is_transform(b.class_id()));
                    if member_is_transform {
                        queue.push_back(member.clone());
                    } else {
                        for attached in doc.attached_to(&member) {
                            add(attached, &mut ids);
                        }
                    }
                    add(member, &mut ids);
                }
            }
            add(current, &mut ids);
            continue;
        }

        let owner = if current == transform {
            Some(game_object.to_string())
        } else {
            block.reference("m_GameObject")
        };
        if let Some(owner) = owner {
            add(owner.clone(), &mut ids);
            for component in doc.component_ids(&owner) {
                add(component, &mut ids);
            }
        }
        add(current, &mut ids);
    }
    ids
}
