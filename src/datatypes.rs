use std::borrow::Cow;

// 常用类型标签（classID）
pub const GAME_OBJECT: u32 = 1;
pub const TRANSFORM: u32 = 4;
pub const MONO_BEHAVIOUR: u32 = 114;
pub const RECT_TRANSFORM: u32 = 224;
pub const PREFAB_INSTANCE: u32 = 1001;

/// 类型标签 -> 类型名称（封闭表，只增不改）
const CLASS_NAMES: &[(u32, &str)] = &[
    (1, "GameObject"),
    (4, "Transform"),
    (20, "Camera"),
    (23, "MeshRenderer"),
    (25, "Renderer"),
    (33, "MeshFilter"),
    (54, "Rigidbody"),
    (56, "Collider"),
    (64, "MeshCollider"),
    (65, "BoxCollider"),
    (81, "AudioListener"),
    (82, "AudioSource"),
    (95, "Animator"),
    (96, "TrailRenderer"),
    (102, "TextMesh"),
    (104, "RenderSettings"),
    (108, "Light"),
    (111, "Animation"),
    (114, "MonoBehaviour"),
    (120, "LineRenderer"),
    (135, "SphereCollider"),
    (136, "CapsuleCollider"),
    (137, "SkinnedMeshRenderer"),
    (157, "LightmapSettings"),
    (195, "NavMeshAgent"),
    (196, "NavMeshSettings"),
    (198, "ParticleSystem"),
    (199, "ParticleSystemRenderer"),
    (212, "SpriteRenderer"),
    (222, "CanvasRenderer"),
    (223, "Canvas"),
    (224, "RectTransform"),
    (225, "CanvasGroup"),
    (1001, "PrefabInstance"),
];

/// 获取类型名称，未知标签返回 `Unknown_<tag>`
pub fn type_name(class_id: u32) -> Cow<'static, str> {
    CLASS_NAMES
        .iter()
        .find(|(id, _)| *id == class_id)
        .map(|(_, name)| Cow::Borrowed(*name))
        .unwrap_or_else(|| Cow::Owned(format!("Unknown_{}", class_id)))
}

/// 按名称反查类型标签（不区分大小写）
pub fn class_id_for_name(name: &str) -> Option<u32> {
    CLASS_NAMES
        .iter()
        .find(|(_, n)| n.eq_ignore_ascii_case(name))
        .map(|(id, _)| *id)
}

/// 是否提供层级信息（Transform / RectTransform）
pub fn is_transform(class_id: u32) -> bool {
    matches!(class_id, TRANSFORM | RECT_TRANSFORM)
}

/// 是否为脚本容器（MonoBehaviour）
pub fn is_script_container(class_id: u32) -> bool {
    class_id == MONO_BEHAVIOUR
}
