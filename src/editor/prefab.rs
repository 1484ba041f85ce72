/// 预制体操作：创建变体、展开实例
///
/// 展开是一个纯函数：(源预制体文档, 实例覆盖列表) → 新的独立对象集合。
/// 覆盖全部应用到内存中的副本之后才会修改场景，失败时场景保持原样。
use std::collections::{HashMap, HashSet};
use std::path::Path;

use tracing::{debug, warn};

use super::result::EditResult;
use super::scene_editor::SceneEditor;
use super::templates::{self, OverrideEntry};
use crate::block::{local_reference, parse_reference, Block, Reference, NULL_REFERENCE};
use crate::datatypes::{self, GAME_OBJECT, PREFAB_INSTANCE, TRANSFORM};
use crate::guid::read_meta_guid;
use crate::id_alloc::IdAllocator;
use crate::scene::{reference_index, SceneDocument};
use crate::utils::{unquote_scalar, SceneError};

/// 实例上的一条属性覆盖
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyOverride {
    /// 源资源中的目标对象
    pub target: Reference,
    pub property_path: String,
    pub value: String,
    pub object_reference: String,
}

/// 从实例对象读出的数据
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefabInstanceData {
    pub id: String,
    pub transform_parent: Option<String>,
    pub source_guid: String,
    pub modifications: Vec<PropertyOverride>,
    pub removed_components: Vec<Reference>,
}

impl PrefabInstanceData {
    pub fn from_block(block: &Block) -> Result<Self, SceneError> {
        if block.class_id() != PREFAB_INSTANCE {
            return Err(SceneError::invalid(format!(
                "object {} is a {}, not a PrefabInstance",
                block.file_id(),
                block.type_name()
            )));
        }
        let source_guid = block
            .get("m_SourcePrefab")
            .and_then(|v| parse_reference(&v))
            .and_then(|r| r.guid)
            .ok_or_else(|| {
                SceneError::invalid(format!("prefab instance {} has no source guid", block.file_id()))
            })?;

        let count = block.array_length("m_Modification.m_Modifications").unwrap_or(0);
        let mut modifications = Vec::with_capacity(count);
        for i in 0..count {
            let field = |name: &str| block.get(&format!("m_Modification.m_Modifications[{}].{}", i, name));
            let Some(target) = field("target").and_then(|v| parse_reference(&v)) else {
                warn!(instance = block.file_id(), index = i, "modification without target");
                continue;
            };
            modifications.push(PropertyOverride {
                target,
                property_path: field("propertyPath").unwrap_or_default(),
                value: field("value").unwrap_or_default(),
                object_reference: field("objectReference").unwrap_or_else(|| NULL_REFERENCE.to_string()),
            });
        }

        let removed_components = block
            .array_elements("m_Modification.m_RemovedComponents")
            .iter()
            .filter_map(|e| parse_reference(e))
            .collect();

        Ok(Self {
            id: block.file_id().to_string(),
            transform_parent: block.reference("m_Modification.m_TransformParent"),
            source_guid,
            modifications,
            removed_components,
        })
    }

    /// 显示名称：`m_Name` 覆盖的值
    pub fn display_name(&self) -> Option<String> {
        self.modifications
            .iter()
            .find(|m| m.property_path == "m_Name")
            .map(|m| unquote_scalar(&m.value))
    }
}

/// 预制体的根对象 (GameObject, Transform)
pub fn source_root(doc: &SceneDocument) -> Result<(String, String), SceneError> {
    doc.blocks()
        .iter()
        .filter(|b| !b.is_stripped() && datatypes::is_transform(b.class_id()))
        .find(|b| b.reference("m_Father").is_none())
        .and_then(|b| Some((b.reference("m_GameObject")?, b.file_id().to_string())))
        .ok_or_else(|| SceneError::invalid("prefab has no root transform"))
}

/// 把覆盖中的对象引用映射到展开后的本地 id
///
/// 指向源资源内部的引用改写为新 id；指向场景对象或其他资源的引用保持原样。
pub fn localize_reference(reference: &str, source_guid: &str, id_map: &HashMap<String, String>) -> String {
    match parse_reference(reference) {
        Some(r) if r.guid.as_deref() == Some(source_guid) => match id_map.get(&r.file_id) {
            Some(id) => local_reference(id),
            None => reference.to_string(),
        },
        _ => reference.to_string(),
    }
}

/// 覆盖路径转换为对象路径：`m_Materials.Array.data[0]` → `m_Materials[0]`
pub fn normalize_property_path(path: &str) -> String {
    path.replace(".Array.data[", "[")
}

/// 新建的变体文档
#[derive(Debug)]
pub struct Variant {
    pub doc: SceneDocument,
    pub instance: String,
    pub game_object: String,
    pub transform: String,
}

/// 生成变体：实例对象（带一条名称覆盖）加根 GameObject/Transform 的占位对象
pub fn build_variant(
    source: &SceneDocument,
    source_guid: &str,
    name: &str,
    alloc: &mut IdAllocator,
) -> Result<Variant, SceneError> {
    let (root_go, root_tr) = source_root(source)?;
    let transform_class = source.get(&root_tr).map(|b| b.class_id()).unwrap_or(TRANSFORM);

    let instance = alloc.allocate();
    let game_object = alloc.allocate();
    let transform = alloc.allocate();

    let mut doc = SceneDocument::new();
    doc.push(Block::parse(templates::prefab_instance(
        &instance,
        None,
        source_guid,
        &[OverrideEntry {
            target: &root_go,
            property_path: "m_Name",
            value: name,
        }],
    ))?);
    doc.push(Block::parse(templates::stripped(GAME_OBJECT, &game_object, &root_go, source_guid, &instance))?);
    doc.push(Block::parse(templates::stripped(transform_class, &transform, &root_tr, source_guid, &instance))?);

    Ok(Variant {
        doc,
        instance,
        game_object,
        transform,
    })
}

/// 展开结果
#[derive(Debug)]
pub struct Materialized {
    /// 新对象（源文件顺序）
    pub blocks: Vec<Block>,
    /// 源 fileID → 新 fileID
    pub id_map: HashMap<String, String>,
    pub root_game_object: String,
    pub root_transform: String,
    /// 未能应用的覆盖数
    pub skipped: usize,
}

/// 把源预制体复制为独立对象并应用实例覆盖
pub fn materialize_instance(
    source: &SceneDocument,
    data: &PrefabInstanceData,
    alloc: &mut IdAllocator,
) -> Result<Materialized, SceneError> {
    let (root_go, root_tr) = source_root(source)?;

    let removed: HashSet<&str> = data
        .removed_components
        .iter()
        .filter(|r| r.guid.as_deref().map_or(true, |g| g == data.source_guid))
        .map(|r| r.file_id.as_str())
        .collect();

    let kept: Vec<&Block> = source
        .blocks()
        .iter()
        .filter(|b| !removed.contains(b.file_id()))
        .collect();
    let mut id_map = HashMap::with_capacity(kept.len());
    for block in &kept {
        id_map.insert(block.file_id().to_string(), alloc.allocate());
    }

    let mut blocks: Vec<Block> = kept
        .iter()
        .map(|b| {
            let mut copy = (*b).clone();
            copy.remap_ids(&id_map);
            copy
        })
        .collect();

    for removed_id in &removed {
        for block in blocks.iter_mut().filter(|b| b.class_id() == GAME_OBJECT) {
            if let Some(index) = reference_index(&block.array_elements("m_Component"), removed_id) {
                block.remove_array_element("m_Component", index as isize);
            }
        }
    }
    // 其余对象中指向被移除组件的引用置空
    let nulled: HashMap<String, String> = removed.iter().map(|id| (id.to_string(), "0".to_string())).collect();
    for block in blocks.iter_mut() {
        block.remap_ids(&nulled);
    }

    let mut skipped = 0;
    for m in &data.modifications {
        let target = match (&m.target.guid, id_map.get(&m.target.file_id)) {
            (Some(guid), Some(id)) if *guid == data.source_guid => id,
            _ => {
                warn!(target = %m.target.file_id, path = %m.property_path, "override target not in source prefab");
                skipped += 1;
                continue;
            }
        };
        let reference = localize_reference(&m.object_reference, &data.source_guid, &id_map);
        let applied = blocks
            .iter_mut()
            .find(|b| b.file_id() == target.as_str())
            .is_some_and(|b| b.set(&normalize_property_path(&m.property_path), &m.value, Some(&reference)));
        if !applied {
            warn!(target = %target, path = %m.property_path, "override could not be applied");
            skipped += 1;
        }
    }

    let root_game_object = id_map
        .get(&root_go)
        .cloned()
        .ok_or_else(|| SceneError::invalid("prefab root game object was removed"))?;
    let root_transform = id_map
        .get(&root_tr)
        .cloned()
        .ok_or_else(|| SceneError::invalid("prefab root transform was removed"))?;

    let father = local_reference(data.transform_parent.as_deref().unwrap_or("0"));
    if let Some(root) = blocks.iter_mut().find(|b| b.file_id() == root_transform) {
        root.set("m_Father", &father, None);
    }

    Ok(Materialized {
        blocks,
        id_map,
        root_game_object,
        root_transform,
        skipped,
    })
}

impl SceneEditor {
    /// 以编辑的预制体为源，在 `output` 创建变体
    ///
    /// `name` 为空时使用输出文件名。输出文件已存在时失败。
    pub fn create_variant(&self, output: &Path, name: Option<&str>) -> EditResult {
        self.finish("create_variant", self.try_create_variant(output, name))
    }

    /// 展开预制体实例（按实例 fileID 或显示名称）
    pub fn unpack_prefab_instance(&self, target: &str) -> EditResult {
        self.finish("unpack_prefab_instance", self.try_unpack_prefab_instance(target))
    }

    fn try_create_variant(&self, output: &Path, name: Option<&str>) -> Result<EditResult, SceneError> {
        if output.exists() {
            return Err(SceneError::conflict(format!("{} already exists", output.display())));
        }
        let loaded = self.load()?;
        let source_guid = self.asset_guid(self.path())?;

        let name = match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => name.to_string(),
            None => output
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .ok_or_else(|| SceneError::invalid(format!("no file name in {}", output.display())))?,
        };

        let mut alloc = self.allocator(&loaded.doc);
        let variant = build_variant(&loaded.doc, &source_guid, &name, &mut alloc)?;
        let bytes = self.write_to(output, &variant.doc, loaded.crlf)?;

        Ok(EditResult::ok(
            output.display().to_string(),
            format!("created variant '{}' of {}", name, self.file_label()),
        )
        .with_bytes(bytes)
        .with_prefab_instance(variant.instance.clone())
        .with_game_object(variant.game_object.clone())
        .with_transform(variant.transform.clone())
        .with_created(vec![variant.instance, variant.game_object, variant.transform]))
    }

    fn try_unpack_prefab_instance(&self, target: &str) -> Result<EditResult, SceneError> {
        let mut loaded = self.load()?;
        let doc = &mut loaded.doc;
        let instance_id = find_instance(doc, target)?;
        let data = doc
            .get(&instance_id)
            .ok_or_else(|| SceneError::not_found(format!("prefab instance {}", instance_id)))
            .and_then(PrefabInstanceData::from_block)?;

        let guids = self
            .guids()
            .ok_or_else(|| SceneError::not_found("guid cache (needed to locate the source prefab)"))?;
        let source_path = guids.path_for_guid(&data.source_guid).ok_or_else(|| {
            SceneError::not_found(format!("source prefab for guid {}", data.source_guid))
        })?;
        let source_path = match self.project_root() {
            Some(root) if source_path.is_relative() => root.join(source_path),
            _ => source_path,
        };
        let source = self.load_from(&source_path)?.doc;
        debug!(source = %source_path.display(), objects = source.len(), "source prefab loaded");

        let mut alloc = self.allocator(doc);
        let mut unpacked = materialize_instance(&source, &data, &mut alloc)?;

        // 占位对象 → 展开后的对象
        let members = doc.instance_members(&instance_id);
        let mut retarget = HashMap::new();
        for member in &members {
            let corresponding = doc
                .get(member)
                .and_then(|b| b.get("m_CorrespondingSourceObject"))
                .and_then(|v| parse_reference(&v))
                .filter(|r| r.guid.as_deref() == Some(data.source_guid.as_str()));
            match corresponding.and_then(|r| unpacked.id_map.get(&r.file_id).cloned()) {
                Some(id) => {
                    retarget.insert(member.clone(), id);
                }
                None => warn!(placeholder = %member, "placeholder has no counterpart in the source prefab"),
            }
        }

        // 场景中挂在占位对象上的组件与子节点
        let mut added_components = Vec::new();
        let mut added_children = Vec::new();
        for block in doc.blocks() {
            if block.is_stripped() || block.file_id() == instance_id {
                continue;
            }
            if datatypes::is_transform(block.class_id()) {
                if let Some(parent) = block.reference("m_Father").and_then(|f| retarget.get(&f)) {
                    added_children.push((parent.clone(), block.file_id().to_string()));
                }
            } else if let Some(owner) = block.reference("m_GameObject").and_then(|o| retarget.get(&o)) {
                added_components.push((owner.clone(), block.file_id().to_string()));
            }
        }

        let mut doomed: HashSet<String> = members.into_iter().collect();
        doomed.insert(instance_id.clone());
        let anchor = doc
            .position(&instance_id)
            .map(|pos| doc.blocks()[..pos].iter().filter(|b| !doomed.contains(b.file_id())).count())
            .unwrap_or(0);

        for block in doc.blocks_mut() {
            if !doomed.contains(block.file_id()) {
                block.remap_ids(&retarget);
            }
        }
        for block in unpacked.blocks.iter_mut() {
            block.remap_ids(&retarget);
        }
        let removed = doc.remove_all(&doomed);
        let cleared = doc.clear_references(&doomed);
        if !cleared.is_empty() {
            warn!(objects = ?cleared, "references to unmatched placeholders cleared");
        }

        let created: Vec<String> = unpacked.blocks.iter().map(|b| b.file_id().to_string()).collect();
        for (offset, block) in unpacked.blocks.into_iter().enumerate() {
            doc.insert(anchor + offset, block);
        }
        for (owner, component) in &added_components {
            doc.attach_component(owner, component)?;
        }
        for (parent, child) in &added_children {
            doc.attach_child(parent, child, -1)?;
        }

        let bytes = self.commit(&loaded)?;
        Ok(EditResult::ok(
            self.file_label(),
            format!(
                "unpacked prefab instance {} into {} objects",
                instance_id,
                created.len()
            ),
        )
        .with_bytes(bytes)
        .with_prefab_instance(instance_id)
        .with_game_object(unpacked.root_game_object)
        .with_transform(unpacked.root_transform)
        .with_created(created)
        .with_removed(removed)
        .with_skipped(unpacked.skipped))
    }

    /// 资源 GUID：伴随 `.meta` 文件优先，其次查询缓存
    fn asset_guid(&self, asset: &Path) -> Result<String, SceneError> {
        read_meta_guid(asset)
            .or_else(|| self.guids().and_then(|g| g.guid_for_path(asset)))
            .ok_or_else(|| SceneError::not_found(format!("guid for {}", asset.display())))
    }
}

/// 按 fileID 或显示名称查找预制体实例
fn find_instance(doc: &SceneDocument, target: &str) -> Result<String, SceneError> {
    let target = target.trim();
    if let Some(block) = doc.get(target) {
        if block.class_id() == PREFAB_INSTANCE {
            return Ok(target.to_string());
        }
    }
    doc.blocks_of_class(PREFAB_INSTANCE)
        .find(|b| {
            PrefabInstanceData::from_block(b)
                .ok()
                .and_then(|d| d.display_name())
                .is_some_and(|name| name == target)
        })
        .map(|b| b.file_id().to_string())
        .ok_or_else(|| SceneError::not_found(format!("prefab instance '{}'", target)))
}
