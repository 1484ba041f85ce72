/// 新对象的文本模板
///
/// 只为常用对象提供模板，其余属性交给按路径写入。
use crate::block::{external_reference, local_reference};
use crate::datatypes::{self, GAME_OBJECT, MONO_BEHAVIOUR, PREFAB_INSTANCE};
use crate::utils::quote_scalar;

/// 预制体资源中根对象的固定 fileID
pub const PREFAB_ASSET_ROOT: &str = "100100000";
/// 脚本资源中 MonoScript 的固定 fileID
pub const SCRIPT_FILE_ID: &str = "11500000";
/// 引用另一个资源时的 type 字段
pub const ASSET_REFERENCE_TYPE: u32 = 3;

/// 组件公共头部（含 m_GameObject 反向引用）
fn component_head(class_id: u32, id: &str, game_object: &str) -> String {
    format!(
        "--- !u!{class} &{id}\n{name}:\n  m_ObjectHideFlags: 0\n  m_CorrespondingSourceObject: {{fileID: 0}}\n  m_PrefabInstance: {{fileID: 0}}\n  m_PrefabAsset: {{fileID: 0}}\n  m_GameObject: {go}\n",
        class = class_id,
        id = id,
        name = datatypes::type_name(class_id),
        go = local_reference(game_object),
    )
}

pub fn game_object(id: &str, name: &str, transform: &str) -> String {
    format!(
        "--- !u!{class} &{id}\nGameObject:\n  m_ObjectHideFlags: 0\n  m_CorrespondingSourceObject: {{fileID: 0}}\n  m_PrefabInstance: {{fileID: 0}}\n  m_PrefabAsset: {{fileID: 0}}\n  serializedVersion: 6\n  m_Component:\n  - component: {transform}\n  m_Layer: 0\n  m_Name: {name}\n  m_TagString: Untagged\n  m_Icon: {{fileID: 0}}\n  m_NavMeshLayer: 0\n  m_StaticEditorFlags: 0\n  m_IsActive: 1\n",
        class = GAME_OBJECT,
        id = id,
        transform = local_reference(transform),
        name = quote_scalar(name),
    )
}

/// `father` 为 `None` 时是根节点
pub fn transform(id: &str, game_object: &str, father: Option<&str>) -> String {
    let mut out = component_head(datatypes::TRANSFORM, id, game_object);
    out.push_str("  serializedVersion: 2\n");
    out.push_str("  m_LocalRotation: {x: 0, y: 0, z: 0, w: 1}\n");
    out.push_str("  m_LocalPosition: {x: 0, y: 0, z: 0}\n");
    out.push_str("  m_LocalScale: {x: 1, y: 1, z: 1}\n");
    out.push_str("  m_ConstrainProportionsScale: 0\n");
    out.push_str("  m_Children: []\n");
    out.push_str(&format!("  m_Father: {}\n", local_reference(father.unwrap_or("0"))));
    out.push_str("  m_LocalEulerAnglesHint: {x: 0, y: 0, z: 0}\n");
    out
}

/// 可直接生成的内置组件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinComponent {
    BoxCollider,
    SphereCollider,
    CapsuleCollider,
    MeshCollider,
    Rigidbody,
    MeshFilter,
    MeshRenderer,
    Camera,
    Light,
    AudioSource,
    AudioListener,
    Animator,
}

impl BuiltinComponent {
    const ALL: [BuiltinComponent; 12] = [
        BuiltinComponent::BoxCollider,
        BuiltinComponent::SphereCollider,
        BuiltinComponent::CapsuleCollider,
        BuiltinComponent::MeshCollider,
        BuiltinComponent::Rigidbody,
        BuiltinComponent::MeshFilter,
        BuiltinComponent::MeshRenderer,
        BuiltinComponent::Camera,
        BuiltinComponent::Light,
        BuiltinComponent::AudioSource,
        BuiltinComponent::AudioListener,
        BuiltinComponent::Animator,
    ];

    /// 按类型名查找（不区分大小写）
    pub fn from_name(name: &str) -> Option<Self> {
        let class_id = datatypes::class_id_for_name(name.trim())?;
        Self::ALL.into_iter().find(|c| c.class_id() == class_id)
    }

    pub fn class_id(self) -> u32 {
        match self {
            BuiltinComponent::Camera => 20,
            BuiltinComponent::MeshRenderer => 23,
            BuiltinComponent::MeshFilter => 33,
            BuiltinComponent::Rigidbody => 54,
            BuiltinComponent::MeshCollider => 64,
            BuiltinComponent::BoxCollider => 65,
            BuiltinComponent::AudioListener => 81,
            BuiltinComponent::AudioSource => 82,
            BuiltinComponent::Animator => 95,
            BuiltinComponent::Light => 108,
            BuiltinComponent::SphereCollider => 135,
            BuiltinComponent::CapsuleCollider => 136,
        }
    }

    /// m_GameObject 之后的属性行
    fn body(self) -> &'static str {
        match self {
            BuiltinComponent::BoxCollider => concat!(
                "  m_Material: {fileID: 0}\n",
                "  m_IsTrigger: 0\n",
                "  m_Enabled: 1\n",
                "  serializedVersion: 3\n",
                "  m_Size: {x: 1, y: 1, z: 1}\n",
                "  m_Center: {x: 0, y: 0, z: 0}\n",
            ),
            BuiltinComponent::SphereCollider => concat!(
                "  m_Material: {fileID: 0}\n",
                "  m_IsTrigger: 0\n",
                "  m_Enabled: 1\n",
                "  serializedVersion: 3\n",
                "  m_Radius: 0.5\n",
                "  m_Center: {x: 0, y: 0, z: 0}\n",
            ),
            BuiltinComponent::CapsuleCollider => concat!(
                "  m_Material: {fileID: 0}\n",
                "  m_IsTrigger: 0\n",
                "  m_Enabled: 1\n",
                "  serializedVersion: 2\n",
                "  m_Radius: 0.5\n",
                "  m_Height: 2\n",
                "  m_Direction: 1\n",
                "  m_Center: {x: 0, y: 0, z: 0}\n",
            ),
            BuiltinComponent::MeshCollider => concat!(
                "  m_Material: {fileID: 0}\n",
                "  m_IsTrigger: 0\n",
                "  m_Enabled: 1\n",
                "  serializedVersion: 5\n",
                "  m_Convex: 0\n",
                "  m_CookingOptions: 30\n",
                "  m_Mesh: {fileID: 0}\n",
            ),
            BuiltinComponent::Rigidbody => concat!(
                "  serializedVersion: 4\n",
                "  m_Mass: 1\n",
                "  m_Drag: 0\n",
                "  m_AngularDrag: 0.05\n",
                "  m_UseGravity: 1\n",
                "  m_IsKinematic: 0\n",
                "  m_Interpolate: 0\n",
                "  m_Constraints: 0\n",
                "  m_CollisionDetection: 0\n",
            ),
            BuiltinComponent::MeshFilter => "  m_Mesh: {fileID: 0}\n",
            BuiltinComponent::MeshRenderer => concat!(
                "  m_Enabled: 1\n",
                "  m_CastShadows: 1\n",
                "  m_ReceiveShadows: 1\n",
                "  m_DynamicOccludee: 1\n",
                "  m_MotionVectors: 1\n",
                "  m_LightProbeUsage: 1\n",
                "  m_ReflectionProbeUsage: 1\n",
                "  m_Materials:\n",
                "  - {fileID: 10303, guid: 0000000000000000f000000000000000, type: 0}\n",
                "  m_SortingLayerID: 0\n",
                "  m_SortingOrder: 0\n",
            ),
            BuiltinComponent::Camera => concat!(
                "  m_Enabled: 1\n",
                "  serializedVersion: 2\n",
                "  m_ClearFlags: 1\n",
                "  m_BackGroundColor: {r: 0.19215687, g: 0.3019608, b: 0.4745098, a: 0}\n",
                "  m_projectionMatrixMode: 1\n",
                "  m_NormalizedViewPortRect:\n",
                "    serializedVersion: 2\n",
                "    x: 0\n",
                "    y: 0\n",
                "    width: 1\n",
                "    height: 1\n",
                "  near clip plane: 0.3\n",
                "  far clip plane: 1000\n",
                "  field of view: 60\n",
                "  orthographic: 0\n",
                "  orthographic size: 5\n",
                "  m_Depth: 0\n",
                "  m_CullingMask:\n",
                "    serializedVersion: 2\n",
                "    m_Bits: 4294967295\n",
                "  m_TargetTexture: {fileID: 0}\n",
                "  m_HDR: 1\n",
                "  m_AllowMSAA: 1\n",
            ),
            BuiltinComponent::Light => concat!(
                "  m_Enabled: 1\n",
                "  serializedVersion: 10\n",
                "  m_Type: 2\n",
                "  m_Shape: 0\n",
                "  m_Color: {r: 1, g: 1, b: 1, a: 1}\n",
                "  m_Intensity: 1\n",
                "  m_Range: 10\n",
                "  m_SpotAngle: 30\n",
                "  m_Shadows:\n",
                "    m_Type: 0\n",
                "    m_Resolution: -1\n",
                "    m_Strength: 1\n",
                "    m_Bias: 0.05\n",
                "    m_NormalBias: 0.4\n",
                "    m_NearPlane: 0.2\n",
                "  m_Cookie: {fileID: 0}\n",
                "  m_DrawHalo: 0\n",
                "  m_Flare: {fileID: 0}\n",
                "  m_RenderMode: 0\n",
                "  m_CullingMask:\n",
                "    serializedVersion: 2\n",
                "    m_Bits: 4294967295\n",
            ),
            BuiltinComponent::AudioSource => concat!(
                "  m_Enabled: 1\n",
                "  serializedVersion: 4\n",
                "  OutputAudioMixerGroup: {fileID: 0}\n",
                "  m_audioClip: {fileID: 0}\n",
                "  m_PlayOnAwake: 1\n",
                "  m_Volume: 1\n",
                "  m_Pitch: 1\n",
                "  Loop: 0\n",
                "  Mute: 0\n",
                "  Spatialize: 0\n",
                "  Priority: 128\n",
                "  MinDistance: 1\n",
                "  MaxDistance: 500\n",
            ),
            BuiltinComponent::AudioListener => "  m_Enabled: 1\n",
            BuiltinComponent::Animator => concat!(
                "  serializedVersion: 5\n",
                "  m_Enabled: 1\n",
                "  m_Avatar: {fileID: 0}\n",
                "  m_Controller: {fileID: 0}\n",
                "  m_CullingMode: 0\n",
                "  m_UpdateMode: 0\n",
                "  m_ApplyRootMotion: 0\n",
                "  m_LinearVelocityBlending: 0\n",
                "  m_HasTransformHierarchy: 1\n",
                "  m_AllowConstantClipSamplingOptimization: 1\n",
                "  m_KeepAnimatorStateOnDisable: 0\n",
            ),
        }
    }

    pub fn render(self, id: &str, game_object: &str) -> String {
        let mut out = component_head(self.class_id(), id, game_object);
        out.push_str(self.body());
        out
    }
}

/// 脚本组件
pub fn script_component(id: &str, game_object: &str, script_guid: &str) -> String {
    let mut out = component_head(MONO_BEHAVIOUR, id, game_object);
    out.push_str("  m_Enabled: 1\n");
    out.push_str("  m_EditorHideFlags: 0\n");
    out.push_str(&format!(
        "  m_Script: {}\n",
        external_reference(SCRIPT_FILE_ID, script_guid, ASSET_REFERENCE_TYPE)
    ));
    out.push_str("  m_Name: \n");
    out.push_str("  m_EditorClassIdentifier: \n");
    out
}

/// 预制体实例上的一条属性覆盖
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideEntry<'a> {
    /// 源资源中的目标 fileID
    pub target: &'a str,
    pub property_path: &'a str,
    pub value: &'a str,
}

/// 预制体实例对象
pub fn prefab_instance(
    id: &str,
    transform_parent: Option<&str>,
    source_guid: &str,
    overrides: &[OverrideEntry<'_>],
) -> String {
    let mut out = format!(
        "--- !u!{} &{}\nPrefabInstance:\n  m_ObjectHideFlags: 0\n  serializedVersion: 2\n  m_Modification:\n    serializedVersion: 3\n    m_TransformParent: {}\n",
        PREFAB_INSTANCE,
        id,
        local_reference(transform_parent.unwrap_or("0")),
    );
    if overrides.is_empty() {
        out.push_str("    m_Modifications: []\n");
    } else {
        out.push_str("    m_Modifications:\n");
        for entry in overrides {
            out.push_str(&format!(
                "    - target: {}\n      propertyPath: {}\n      value: {}\n      objectReference: {{fileID: 0}}\n",
                external_reference(entry.target, source_guid, ASSET_REFERENCE_TYPE),
                entry.property_path,
                quote_scalar(entry.value),
            ));
        }
    }
    out.push_str("    m_RemovedComponents: []\n");
    out.push_str("    m_RemovedGameObjects: []\n");
    out.push_str("    m_AddedGameObjects: []\n");
    out.push_str("    m_AddedComponents: []\n");
    out.push_str(&format!(
        "  m_SourcePrefab: {}\n",
        external_reference(PREFAB_ASSET_ROOT, source_guid, ASSET_REFERENCE_TYPE)
    ));
    out
}

/// 预制体实例的占位对象（GameObject 或 Transform）
pub fn stripped(class_id: u32, id: &str, source_id: &str, source_guid: &str, instance: &str) -> String {
    format!(
        "--- !u!{class} &{id} stripped\n{name}:\n  m_CorrespondingSourceObject: {source}\n  m_PrefabInstance: {instance}\n  m_PrefabAsset: {{fileID: 0}}\n",
        class = class_id,
        id = id,
        name = datatypes::type_name(class_id),
        source = external_reference(source_id, source_guid, ASSET_REFERENCE_TYPE),
        instance = local_reference(instance),
    )
}
