use super::*;

const TRANSFORM: &str = r#"--- !u!4 &200
Transform:
  m_ObjectHideFlags: 0
  m_CorrespondingSourceObject: {fileID: 0}
  m_PrefabInstance: {fileID: 0}
  m_PrefabAsset: {fileID: 0}
  m_GameObject: {fileID: 100}
  serializedVersion: 2
  m_LocalRotation: {x: 0, y: 0, z: 0, w: 1}
  m_LocalPosition: {x: 1, y: 2, z: 3}
  m_LocalScale: {x: 1, y: 1, z: 1}
  m_ConstrainProportionsScale: 0
  m_Children:
  - {fileID: 300}
  - {fileID: 400}
  m_Father: {fileID: 0}
  m_LocalEulerAnglesHint: {x: 0, y: 0, z: 0}
"#;

const GAME_OBJECT: &str = r#"--- !u!1 &100
GameObject:
  m_ObjectHideFlags: 0
  serializedVersion: 6
  m_Component:
  - component: {fileID: 200}
  - component: {fileID: 250}
  m_Layer: 0
  m_Name: Player
  m_TagString: Untagged
  m_Icon: {fileID: 0}
  m_IsActive: 1
"#;

const LIGHT: &str = r#"--- !u!108 &250
Light:
  m_ObjectHideFlags: 0
  m_GameObject: {fileID: 100}
  m_Enabled: 1
  serializedVersion: 10
  m_Type: 2
  m_Color: {r: 1, g: 0.95686275, b: 0.8392157, a: 1}
  m_Intensity: 1
  m_Shadows:
    m_Type: 0
    m_Resolution: -1
    m_Strength: 1
    m_NearPlane: 0.2
  m_Cookie: {fileID: 0}
  m_EditorClassIdentifier:
"#;

const EMPTY_CHILDREN: &str = r#"--- !u!4 &500
Transform:
  m_GameObject: {fileID: 400}
  m_Children: []
  m_Father: {fileID: 200}
"#;

const PREFAB_INSTANCE: &str = r#"--- !u!1001 &700000
PrefabInstance:
  m_ObjectHideFlags: 0
  serializedVersion: 2
  m_Modification:
    serializedVersion: 3
    m_TransformParent: {fileID: 200}
    m_Modifications:
    - target: {fileID: 100000, guid: a1b2c3d4e5f6789012345678abcdef12, type: 3}
      propertyPath: m_Name
      value: MyEnemy
      objectReference: {fileID: 0}
    - target: {fileID: 400000, guid: a1b2c3d4e5f6789012345678abcdef12, type: 3}
      propertyPath: m_LocalPosition.x
      value: 5
      objectReference: {fileID: 0}
    m_RemovedComponents: []
  m_SourcePrefab: {fileID: 100100000, guid: a1b2c3d4e5f6789012345678abcdef12, type: 3}
"#;

fn block(text: &str) -> Block {
    Block::parse(text).unwrap()
}

#[test]
fn test_parse_block() {
    let b = block(TRANSFORM);
    assert_eq!(b.file_id(), "200");
    assert_eq!(b.class_id(), 4);
    assert_eq!(b.type_name(), "Transform");
    assert!(!b.is_stripped());
    assert!(!b.is_dirty());
    assert_eq!(b.raw(), TRANSFORM);
}

#[test]
fn test_parse_rejects_prologue() {
    assert!(Block::parse("%YAML 1.1\n%TAG !u! tag:unity3d.com,2011:\n").is_err());
}

#[test]
fn test_parse_stripped_block() {
    let b = block("--- !u!1 &900 stripped\nGameObject:\n  m_CorrespondingSourceObject: {fileID: 100000, guid: a1b2c3d4e5f6789012345678abcdef12, type: 3}\n  m_PrefabInstance: {fileID: 700000}\n");
    assert!(b.is_stripped());
    assert_eq!(b.reference("m_PrefabInstance").as_deref(), Some("700000"));
}

#[test]
fn test_get_scalar_and_inline() {
    let b = block(TRANSFORM);
    assert_eq!(b.get("serializedVersion").as_deref(), Some("2"));
    assert_eq!(b.get("m_LocalPosition").as_deref(), Some("{x: 1, y: 2, z: 3}"));
    assert_eq!(b.get("m_LocalPosition.y").as_deref(), Some("2"));
    assert_eq!(b.get("m_LocalRotation.w").as_deref(), Some("1"));
    assert_eq!(b.get("m_GameObject.fileID").as_deref(), Some("100"));
}

#[test]
fn test_get_missing_paths() {
    let b = block(TRANSFORM);
    assert_eq!(b.get("m_Missing"), None);
    assert_eq!(b.get("m_LocalPosition.w"), None);
    assert_eq!(b.get("serializedVersion.x"), None);
    assert_eq!(b.get("m_Children[2]"), None);
    assert_eq!(b.get("m_Children[x]"), None);
    assert!(!b.has("m_LocalPosition.q"));
    assert!(b.has("m_LocalScale.z"));
}

#[test]
fn test_get_block_map_leaf() {
    let b = block(LIGHT);
    assert_eq!(b.get("m_Shadows.m_Strength").as_deref(), Some("1"));
    assert_eq!(b.get("m_Shadows.m_Resolution").as_deref(), Some("-1"));
    assert_eq!(b.get("m_Color.g").as_deref(), Some("0.95686275"));
    // m_Type 在根作用域与 m_Shadows 中各有一个
    assert_eq!(b.get("m_Type").as_deref(), Some("2"));
    assert_eq!(b.get("m_Shadows.m_Type").as_deref(), Some("0"));
}

#[test]
fn test_get_array_elements() {
    let b = block(TRANSFORM);
    assert_eq!(b.get("m_Children[0]").as_deref(), Some("{fileID: 300}"));
    assert_eq!(b.get("m_Children[1].fileID").as_deref(), Some("400"));

    let go = block(GAME_OBJECT);
    assert_eq!(go.get("m_Component[1].component").as_deref(), Some("{fileID: 250}"));
    assert_eq!(go.array_elements("m_Component"), vec![
        "component: {fileID: 200}".to_string(),
        "component: {fileID: 250}".to_string(),
    ]);
}

#[test]
fn test_get_item_map_fields() {
    let b = block(PREFAB_INSTANCE);
    assert_eq!(
        b.get("m_Modification.m_Modifications[1].propertyPath").as_deref(),
        Some("m_LocalPosition.x")
    );
    assert_eq!(b.get("m_Modification.m_Modifications[0].value").as_deref(), Some("MyEnemy"));
    assert_eq!(
        b.get("m_Modification.m_Modifications[0].target.fileID").as_deref(),
        Some("100000")
    );
    assert_eq!(b.array_length("m_Modification.m_Modifications"), Some(2));
    assert_eq!(b.array_length("m_Modification.m_RemovedComponents"), Some(0));
    assert_eq!(b.reference("m_Modification.m_TransformParent").as_deref(), Some("200"));
}

#[test]
fn test_set_inline_leaf_preserves_siblings() {
    let mut b = block(TRANSFORM);
    assert!(b.set("m_LocalPosition.y", "5", None));
    assert!(b.is_dirty());
    assert_eq!(
        b.raw(),
        TRANSFORM.replace("m_LocalPosition: {x: 1, y: 2, z: 3}", "m_LocalPosition: {x: 1, y: 5, z: 3}")
    );
    assert_eq!(b.detect_format("m_LocalPosition"), ValueFormat::Inline);
}

#[test]
fn test_set_block_leaf_preserves_block_encoding() {
    let mut b = block(LIGHT);
    assert!(b.set("m_Shadows.m_Strength", "0.5", None));
    assert_eq!(b.raw(), LIGHT.replace("    m_Strength: 1\n", "    m_Strength: 0.5\n"));
    assert_eq!(b.detect_format("m_Shadows"), ValueFormat::Block);
}

#[test]
fn test_set_missing_path_is_noop() {
    let mut b = block(TRANSFORM);
    assert!(!b.set("m_Nope", "1", None));
    assert!(!b.set("m_LocalPosition.w", "1", None));
    assert!(!b.set("m_Children[9]", "{fileID: 1}", None));
    assert!(!b.is_dirty());
    assert_eq!(b.raw(), TRANSFORM);
}

#[test]
fn test_set_get_is_identity() {
    let paths = [
        "m_ObjectHideFlags",
        "m_LocalPosition",
        "m_LocalPosition.x",
        "m_LocalRotation.w",
        "m_Children",
        "m_Children[1]",
        "m_Father",
    ];
    for path in paths {
        let mut b = block(TRANSFORM);
        let value = b.get(path).unwrap();
        assert!(b.set(path, &value, None), "set failed for {}", path);
        assert_eq!(b.raw(), TRANSFORM, "text changed for {}", path);
    }

    for path in ["m_Shadows", "m_Shadows.m_NearPlane", "m_EditorClassIdentifier"] {
        let mut b = block(LIGHT);
        let value = b.get(path).unwrap();
        assert!(b.set(path, &value, None));
        assert_eq!(b.raw(), LIGHT, "text changed for {}", path);
    }

    let mut b = block(PREFAB_INSTANCE);
    let path = "m_Modification.m_Modifications[1].value";
    let value = b.get(path).unwrap();
    assert!(b.set(path, &value, None));
    assert_eq!(b.raw(), PREFAB_INSTANCE);
}

#[test]
fn test_set_with_object_reference() {
    let mut b = block(TRANSFORM);
    assert!(b.set("m_Father", "ignored", Some("{fileID: 9}")));
    assert_eq!(b.get("m_Father").as_deref(), Some("{fileID: 9}"));

    // 空引用不作为覆盖
    let mut b = block(LIGHT);
    assert!(b.set("m_Intensity", "2", Some("{fileID: 0}")));
    assert_eq!(b.get("m_Intensity").as_deref(), Some("2"));
}

#[test]
fn test_set_empty_scalar() {
    let mut b = block(LIGHT);
    assert_eq!(b.get("m_EditorClassIdentifier").as_deref(), Some(""));
    assert!(b.set("m_EditorClassIdentifier", "Game.Lamp", None));
    assert!(b.raw().contains("  m_EditorClassIdentifier: Game.Lamp\n"));

    let mut b = block("--- !u!1 &1\nGameObject:\n  m_Name:\n  m_IsActive: 1\n");
    assert!(b.set("m_Name", "Hero", None));
    assert_eq!(b.raw(), "--- !u!1 &1\nGameObject:\n  m_Name: Hero\n  m_IsActive: 1\n");
}

#[test]
fn test_scalar_without_deeper_followers_is_not_parent() {
    let b = block(GAME_OBJECT);
    assert_eq!(b.detect_format("m_Name"), ValueFormat::Scalar);
    assert_eq!(b.get("m_Name").as_deref(), Some("Player"));
    assert_eq!(b.get("m_Name.m_TagString"), None);
}

#[test]
fn test_detect_format() {
    let b = block(LIGHT);
    assert_eq!(b.detect_format("m_Color"), ValueFormat::Inline);
    assert_eq!(b.detect_format("m_Shadows"), ValueFormat::Block);
    assert_eq!(b.detect_format("m_Intensity"), ValueFormat::Scalar);
    assert_eq!(b.detect_format("m_Missing"), ValueFormat::Absent);
    let t = block(TRANSFORM);
    assert_eq!(t.detect_format("m_Children"), ValueFormat::Sequence);
    assert_eq!(block(EMPTY_CHILDREN).detect_format("m_Children"), ValueFormat::Sequence);
}

#[test]
fn test_format_cache_invalidated_on_mutation() {
    let mut b = block(GAME_OBJECT);
    assert_eq!(b.detect_format("m_Layer"), ValueFormat::Scalar);
    assert!(b.set("m_Layer", "{value: 3}", None));
    assert_eq!(b.detect_format("m_Layer"), ValueFormat::Inline);
}

#[test]
fn test_array_length() {
    assert_eq!(block(TRANSFORM).array_length("m_Children"), Some(2));
    assert_eq!(block(EMPTY_CHILDREN).array_length("m_Children"), Some(0));
    assert_eq!(block(TRANSFORM).array_length("m_LocalPosition"), None);
    assert_eq!(block(TRANSFORM).array_length("m_Missing"), None);
}

#[test]
fn test_insert_into_empty_array() {
    let mut b = block(EMPTY_CHILDREN);
    assert!(b.insert_array_element("m_Children", -1, "{fileID: 600}"));
    assert_eq!(
        b.raw(),
        "--- !u!4 &500\nTransform:\n  m_GameObject: {fileID: 400}\n  m_Children:\n  - {fileID: 600}\n  m_Father: {fileID: 200}\n"
    );
    assert_eq!(b.array_length("m_Children"), Some(1));
    assert_eq!(b.get("m_Father").as_deref(), Some("{fileID: 200}"));
}

#[test]
fn test_remove_last_element_restores_empty_literal() {
    let mut b = block(EMPTY_CHILDREN);
    assert!(b.insert_array_element("m_Children", -1, "{fileID: 600}"));
    assert!(b.remove_array_element("m_Children", 0));
    assert_eq!(b.raw(), EMPTY_CHILDREN);
}

#[test]
fn test_insert_then_remove_restores_multiline_array() {
    let mut b = block(TRANSFORM);
    assert!(b.insert_array_element("m_Children", -1, "{fileID: 999}"));
    assert_eq!(b.array_length("m_Children"), Some(3));
    assert_eq!(b.get("m_Children[2]").as_deref(), Some("{fileID: 999}"));
    assert!(b.remove_array_element("m_Children", 2));
    assert_eq!(b.raw(), TRANSFORM);
}

#[test]
fn test_insert_at_index() {
    let mut b = block(TRANSFORM);
    assert!(b.insert_array_element("m_Children", 0, "{fileID: 111}"));
    assert_eq!(b.get("m_Children[0]").as_deref(), Some("{fileID: 111}"));
    assert_eq!(b.get("m_Children[1]").as_deref(), Some("{fileID: 300}"));
    assert!(b.insert_array_element("m_Children", 2, "{fileID: 222}"));
    assert_eq!(b.array_elements("m_Children"), vec![
        "{fileID: 111}".to_string(),
        "{fileID: 300}".to_string(),
        "{fileID: 222}".to_string(),
        "{fileID: 400}".to_string(),
    ]);
}

#[test]
fn test_array_index_errors() {
    let mut b = block(TRANSFORM);
    assert!(!b.insert_array_element("m_Children", 5, "{fileID: 1}"));
    assert!(!b.insert_array_element("m_Children", -2, "{fileID: 1}"));
    assert!(!b.remove_array_element("m_Children", -1));
    assert!(!b.remove_array_element("m_Children", 2));
    assert!(!b.remove_array_element("m_LocalPosition", 0));
    assert!(!b.is_dirty());
    assert_eq!(b.raw(), TRANSFORM);

    let mut empty = block(EMPTY_CHILDREN);
    assert!(!empty.remove_array_element("m_Children", 0));
    assert!(!empty.is_dirty());
}

#[test]
fn test_remove_middle_element() {
    let mut b = block(TRANSFORM);
    assert!(b.remove_array_element("m_Children", 0));
    assert!(b.raw().contains("  m_Children:\n  - {fileID: 400}\n  m_Father: {fileID: 0}\n"));
}

#[test]
fn test_remove_element_at_end_of_text_without_newline() {
    let text = "--- !u!4 &1\nTransform:\n  m_Children:\n  - {fileID: 2}\n  - {fileID: 3}";
    let mut b = block(text);
    assert!(b.remove_array_element("m_Children", 1));
    assert_eq!(b.raw(), "--- !u!4 &1\nTransform:\n  m_Children:\n  - {fileID: 2}");
}

#[test]
fn test_insert_multiline_item() {
    let mut b = block(PREFAB_INSTANCE);
    let entry = "target: {fileID: 400000, guid: a1b2c3d4e5f6789012345678abcdef12, type: 3}\npropertyPath: m_LocalPosition.y\nvalue: 7\nobjectReference: {fileID: 0}";
    assert!(b.insert_array_element("m_Modification.m_Modifications", -1, entry));
    assert_eq!(b.array_length("m_Modification.m_Modifications"), Some(3));
    assert_eq!(b.get("m_Modification.m_Modifications[2].value").as_deref(), Some("7"));
    assert!(b.raw().contains(
        "    - target: {fileID: 400000, guid: a1b2c3d4e5f6789012345678abcdef12, type: 3}\n      propertyPath: m_LocalPosition.y\n      value: 7\n"
    ));
    assert!(b.remove_array_element("m_Modification.m_Modifications", 2));
    assert_eq!(b.raw(), PREFAB_INSTANCE);
}

#[test]
fn test_extract_references() {
    let refs = block(TRANSFORM).extract_references();
    let ids: Vec<&str> = refs.iter().map(|r| r.file_id.as_str()).collect();
    assert_eq!(ids, vec!["100", "300", "400"]);
    assert!(refs.iter().all(Reference::is_local));
    assert_eq!(block(TRANSFORM).local_references(), vec!["100", "300", "400"]);
}

#[test]
fn test_extract_references_includes_external() {
    let refs = block(PREFAB_INSTANCE).extract_references();
    let ids: Vec<&str> = refs.iter().map(|r| r.file_id.as_str()).collect();
    assert_eq!(ids, vec!["200", "100000", "400000", "100100000"]);
    assert_eq!(refs[3].guid.as_deref(), Some("a1b2c3d4e5f6789012345678abcdef12"));
    assert_eq!(refs[3].asset_type, Some(3));

    // 文件内对象图只看不带 guid 的引用
    assert_eq!(block(PREFAB_INSTANCE).local_references(), vec!["200"]);

    let script = block("--- !u!114 &1\nMonoBehaviour:\n  m_GameObject: {fileID: 5}\n  m_Script: {fileID: 11500000, guid: 0123456789abcdef0123456789abcdef, type: 3}\n");
    let ids: Vec<String> = script.extract_references().into_iter().map(|r| r.file_id).collect();
    assert_eq!(ids, vec!["5", "11500000"]);
}

#[test]
fn test_remap_id_rewrites_header_and_body() {
    let mut b = block(TRANSFORM);
    assert!(b.remap_id("200", "201"));
    assert_eq!(b.file_id(), "201");
    assert!(b.raw().starts_with("--- !u!4 &201\n"));

    let mut b = block(TRANSFORM);
    assert!(b.remap_id("300", "301"));
    assert_eq!(b.get("m_Children[0]").as_deref(), Some("{fileID: 301}"));
    assert_eq!(b.file_id(), "200");
}

#[test]
fn test_remap_id_absent_is_noop() {
    let mut b = block(TRANSFORM);
    assert!(!b.remap_id("12345", "1"));
    assert!(!b.is_dirty());
    assert_eq!(b.raw(), TRANSFORM);

    assert!(!b.remap_id("0", "7"));
    assert_eq!(b.get("m_Father").as_deref(), Some("{fileID: 0}"));
}

#[test]
fn test_remap_ignores_external_references() {
    let mut b = block(PREFAB_INSTANCE);
    assert!(!b.remap_id("100000", "5"));
    assert_eq!(b.raw(), PREFAB_INSTANCE);
}

#[test]
fn test_clone_is_independent() {
    let mut source = block(TRANSFORM);
    assert!(source.set("m_LocalPosition.x", "10", None));
    assert!(source.is_dirty());

    let mut copy = source.clone();
    assert!(!copy.is_dirty());
    assert!(copy.set("m_LocalPosition.x", "20", None));
    assert_eq!(source.get("m_LocalPosition.x").as_deref(), Some("10"));
    assert_eq!(copy.get("m_LocalPosition.x").as_deref(), Some("20"));
}

#[test]
fn test_replace_raw() {
    let mut b = block(TRANSFORM);
    assert!(b.replace_raw("not a header\nTransform:\n").is_err());
    assert_eq!(b.raw(), TRANSFORM);
    assert!(!b.is_dirty());

    b.replace_raw(EMPTY_CHILDREN).unwrap();
    assert_eq!(b.file_id(), "500");
    assert_eq!(b.array_length("m_Children"), Some(0));
    assert!(b.is_dirty());
}

#[test]
fn test_mixed_line_endings_keep_carriage_returns() {
    let text = "--- !u!4 &1\r\nTransform:\r\n  m_LocalPosition: {x: 0, y: 0, z: 0}\r\n  m_Children:\n  - {fileID: 2}\r\n  - {fileID: 3}\r\n  m_Father: {fileID: 0}\n";
    let mut b = block(text);
    assert_eq!(b.get("m_LocalPosition.y").as_deref(), Some("0"));
    assert_eq!(b.get("m_Children[1]").as_deref(), Some("{fileID: 3}"));

    assert!(b.set("m_LocalPosition.y", "4", None));
    assert!(b.remove_array_element("m_Children", 0));
    assert_eq!(
        b.raw(),
        "--- !u!4 &1\r\nTransform:\r\n  m_LocalPosition: {x: 0, y: 4, z: 0}\r\n  m_Children:\n  - {fileID: 3}\r\n  m_Father: {fileID: 0}\n"
    );

    assert!(b.remap_id("1", "9"));
    assert!(b.raw().starts_with("--- !u!4 &9\r\nTransform:\r\n"));
}
