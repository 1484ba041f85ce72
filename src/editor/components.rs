/// 组件操作：添加、删除、复制
use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, warn};

use super::result::EditResult;
use super::scene_editor::{resolve_game_object, SceneEditor};
use super::templates::{self, BuiltinComponent};
use crate::block::{local_reference, Block};
use crate::datatypes::{self, GAME_OBJECT, PREFAB_INSTANCE};
use crate::guid::read_meta_guid;
use crate::utils::{is_guid, SceneError};

impl SceneEditor {
    /// 添加组件
    ///
    /// `component` 为内置类型名（如 `BoxCollider`），否则按脚本解析：
    /// 32 位 GUID → 带 `.meta` 的脚本路径 → 缓存中的脚本名。
    pub fn add_component(&self, target: &str, component: &str) -> EditResult {
        self.finish("add_component", self.try_add_component(target, component))
    }

    /// 按 fileID 删除组件
    pub fn remove_component(&self, component_id: &str) -> EditResult {
        self.finish("remove_component", self.try_remove_component(component_id))
    }

    /// 把组件复制到另一个 GameObject
    pub fn copy_component(&self, component_id: &str, target: &str) -> EditResult {
        self.finish("copy_component", self.try_copy_component(component_id, target))
    }

    fn try_add_component(&self, target: &str, component: &str) -> Result<EditResult, SceneError> {
        let component = component.trim();
        if component.is_empty() {
            return Err(SceneError::invalid("component type must not be empty"));
        }
        if let Some(class_id) = datatypes::class_id_for_name(component) {
            if datatypes::is_transform(class_id) || class_id == GAME_OBJECT || class_id == PREFAB_INSTANCE {
                return Err(SceneError::conflict(format!(
                    "{} cannot be added as a component",
                    datatypes::type_name(class_id)
                )));
            }
        }

        let mut loaded = self.load()?;
        let doc = &mut loaded.doc;
        let game_object = resolve_game_object(doc, target)?;
        if doc.get(&game_object).is_some_and(Block::is_stripped) {
            return Err(SceneError::conflict(format!(
                "game object {} is a prefab instance placeholder",
                game_object
            )));
        }

        // 脚本解析在分配 id 之前完成，失败时不产生任何修改
        let builtin = BuiltinComponent::from_name(component);
        let script_guid = match builtin {
            Some(_) => None,
            None => Some(self.resolve_script(component)?),
        };

        let mut alloc = self.allocator(doc);
        let id = alloc.allocate();
        let text = match (builtin, &script_guid) {
            (Some(builtin), _) => builtin.render(&id, &game_object),
            (None, Some(guid)) => templates::script_component(&id, &game_object, guid),
            (None, None) => return Err(SceneError::not_found(format!("script '{}'", component))),
        };
        doc.push(Block::parse(text)?);
        doc.attach_component(&game_object, &id)?;

        let bytes = self.commit(&loaded)?;
        Ok(EditResult::ok(
            self.file_label(),
            format!("added {} to game object {}", component, game_object),
        )
        .with_bytes(bytes)
        .with_game_object(game_object)
        .with_component(id.clone())
        .with_created(vec![id]))
    }

    fn try_remove_component(&self, component_id: &str) -> Result<EditResult, SceneError> {
        let component_id = component_id.trim();
        let mut loaded = self.load()?;
        let doc = &mut loaded.doc;
        let block = doc
            .get(component_id)
            .ok_or_else(|| SceneError::not_found(format!("component {}", component_id)))?;
        check_component(block)?;

        let owner = block.reference("m_GameObject");
        doc.remove(component_id);
        if let Some(owner) = &owner {
            if !doc.detach_component(owner, component_id) {
                warn!(component = component_id, owner = %owner, "component not listed on its owner");
            }
        }
        let cleared = doc.clear_references(&HashSet::from([component_id.to_string()]));
        if !cleared.is_empty() {
            debug!(component = component_id, objects = ?cleared, "references to removed component cleared");
        }

        let bytes = self.commit(&loaded)?;
        let mut result = EditResult::ok(self.file_label(), format!("removed component {}", component_id))
            .with_bytes(bytes)
            .with_component(component_id)
            .with_removed(vec![component_id.to_string()]);
        if let Some(owner) = owner {
            result = result.with_game_object(owner);
        }
        Ok(result)
    }

    fn try_copy_component(&self, component_id: &str, target: &str) -> Result<EditResult, SceneError> {
        let component_id = component_id.trim();
        let mut loaded = self.load()?;
        let doc = &mut loaded.doc;
        let source = doc
            .get(component_id)
            .ok_or_else(|| SceneError::not_found(format!("component {}", component_id)))?;
        check_component(source)?;
        let mut copy = source.clone();

        let game_object = resolve_game_object(doc, target)?;
        if doc.get(&game_object).is_some_and(Block::is_stripped) {
            return Err(SceneError::conflict(format!(
                "game object {} is a prefab instance placeholder",
                game_object
            )));
        }

        let mut alloc = self.allocator(doc);
        let id = alloc.allocate();
        copy.remap_id(component_id, &id);
        if !copy.set("m_GameObject", &local_reference(&game_object), None) {
            return Err(SceneError::invalid(format!("component {} has no m_GameObject", component_id)));
        }
        doc.push(copy);
        doc.attach_component(&game_object, &id)?;

        let bytes = self.commit(&loaded)?;
        Ok(EditResult::ok(
            self.file_label(),
            format!("copied component {} to game object {}", component_id, game_object),
        )
        .with_bytes(bytes)
        .with_game_object(game_object)
        .with_component(id.clone())
        .with_created(vec![id]))
    }

    /// 解析脚本 GUID
    pub(crate) fn resolve_script(&self, script: &str) -> Result<String, SceneError> {
        if is_guid(script) {
            return Ok(script.to_lowercase());
        }

        let path = Path::new(script);
        let looks_like_path = script.contains('/') || script.contains('\\') || path.extension().is_some();
        if looks_like_path {
            let mut candidates = vec![path.to_path_buf()];
            if path.is_relative() {
                if let Some(root) = self.project_root() {
                    candidates.push(root.join(path));
                }
            }
            for candidate in &candidates {
                if let Some(guid) = read_meta_guid(candidate) {
                    debug!(script, guid = %guid, "script resolved from meta file");
                    return Ok(guid);
                }
            }
            if let Some(guid) = self.guids().and_then(|g| g.guid_for_path(path)) {
                return Ok(guid);
            }
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| script.to_string());
        self.guids()
            .and_then(|g| g.guid_for_script(&name))
            .ok_or_else(|| {
                SceneError::not_found(format!(
                    "script '{}' (not a guid, no .meta file, no cache entry)",
                    script
                ))
            })
    }
}

/// 只有普通组件可以单独删除或复制
fn check_component(block: &Block) -> Result<(), SceneError> {
    let class_id = block.class_id();
    if datatypes::is_transform(class_id) {
        return Err(SceneError::conflict(format!(
            "{} {} can only be removed with its game object",
            block.type_name(),
            block.file_id()
        )));
    }
    if class_id == GAME_OBJECT || class_id == PREFAB_INSTANCE || block.is_stripped() {
        return Err(SceneError::conflict(format!(
            "object {} ({}) is not a component",
            block.file_id(),
            block.type_name()
        )));
    }
    Ok(())
}
