/// 资源 GUID 解析
///
/// 资源的 GUID 保存在同名的 `.meta` 伴随文件中。项目级的 GUID 缓存由外部工具
/// 遍历目录生成（JSON：`{ "<guid>": "<相对路径>" }`），这里只负责加载与查询。
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::utils::{is_guid, SceneError};

static META_GUID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^guid:\s*([a-f0-9]{32})").expect("Invalid regex"));

/// GUID 查询接口
pub trait GuidResolver {
    /// GUID 对应的资源路径（已知项目根目录时为绝对路径）
    fn path_for_guid(&self, guid: &str) -> Option<PathBuf>;

    /// 按脚本名（文件名，不区分大小写，可带 `.cs`）查找脚本 GUID
    fn guid_for_script(&self, name: &str) -> Option<String>;

    /// 资源路径对应的 GUID
    fn guid_for_path(&self, path: &Path) -> Option<String>;

    /// 项目根目录（含 `Assets/` 的目录）
    fn project_root(&self) -> Option<&Path>;
}

/// 内存中的 GUID 缓存
#[derive(Debug, Clone, Default)]
pub struct GuidCache {
    entries: HashMap<String, String>,
    root: Option<PathBuf>,
}

impl GuidCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置项目根目录
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// 添加一条记录，GUID 统一为小写
    pub fn insert(&mut self, guid: impl AsRef<str>, relative_path: impl Into<String>) {
        self.entries
            .insert(guid.as_ref().to_lowercase(), normalize(&relative_path.into()));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 从 JSON 文本构造
    pub fn from_json_str(json: &str) -> Result<Self, SceneError> {
        let map: HashMap<String, String> = serde_json::from_str(json)?;
        let mut cache = GuidCache::new();
        for (guid, path) in map {
            cache.insert(guid, path);
        }
        Ok(cache)
    }

    /// 加载缓存文件
    pub fn load_json(path: &Path) -> Result<Self, SceneError> {
        let json = fs::read_to_string(path)?;
        let cache = Self::from_json_str(&json)?;
        debug!(path = %path.display(), entries = cache.len(), "guid cache loaded");
        Ok(cache)
    }

    fn relative(&self, path: &Path) -> String {
        let path = match &self.root {
            Some(root) => path.strip_prefix(root).unwrap_or(path),
            None => path,
        };
        normalize(&path.to_string_lossy())
    }
}

impl GuidResolver for GuidCache {
    fn path_for_guid(&self, guid: &str) -> Option<PathBuf> {
        let relative = self.entries.get(&guid.to_lowercase())?;
        Some(match &self.root {
            Some(root) => root.join(relative),
            None => PathBuf::from(relative),
        })
    }

    fn guid_for_script(&self, name: &str) -> Option<String> {
        let stem = strip_cs_suffix(name);
        // 同名脚本可能有多个，取路径最小者保证结果稳定
        self.entries
            .iter()
            .filter(|(_, path)| {
                let file = Path::new(path.as_str());
                let is_script = file
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("cs"));
                is_script
                    && file
                        .file_stem()
                        .is_some_and(|s| s.to_string_lossy().eq_ignore_ascii_case(stem))
            })
            .min_by(|a, b| a.1.cmp(b.1))
            .map(|(guid, _)| guid.clone())
    }

    fn guid_for_path(&self, path: &Path) -> Option<String> {
        let wanted = self.relative(path);
        self.entries
            .iter()
            .find(|(_, p)| **p == wanted)
            .map(|(guid, _)| guid.clone())
    }

    fn project_root(&self) -> Option<&Path> {
        self.root.as_deref()
    }
}

fn normalize(path: &str) -> String {
    path.replace('\\', "/")
}

fn strip_cs_suffix(name: &str) -> &str {
    let len = name.len();
    if len > 3 && name.is_char_boundary(len - 3) && name[len - 3..].eq_ignore_ascii_case(".cs") {
        &name[..len - 3]
    } else {
        name
    }
}

/// `<asset>.meta`
pub fn meta_path(asset: &Path) -> PathBuf {
    let mut name = asset.as_os_str().to_owned();
    name.push(".meta");
    PathBuf::from(name)
}

/// 从 `.meta` 文本中提取 GUID
pub fn parse_meta_guid(content: &str) -> Option<String> {
    META_GUID_RE.captures(content).map(|caps| caps[1].to_string())
}

/// 读取资源伴随 `.meta` 文件中的 GUID
///
/// 文件不存在或内容没有 GUID 行时返回 `None`
pub fn read_meta_guid(asset: &Path) -> Option<String> {
    let meta = meta_path(asset);
    let content = fs::read_to_string(&meta).ok()?;
    let guid = parse_meta_guid(&content.replace("\r\n", "\n"));
    debug!(meta = %meta.display(), found = guid.is_some(), "read meta guid");
    guid.filter(|g| is_guid(g))
}

/// 从文件所在目录向上查找项目根目录（第一个包含 `Assets/` 子目录的目录）
pub fn find_project_root(file: &Path) -> Option<PathBuf> {
    let mut current = file.parent()?;
    loop {
        if current.join("Assets").is_dir() {
            return Some(current.to_path_buf());
        }
        match current.parent() {
            Some(parent) if parent != current => current = parent,
            _ => return None,
        }
    }
}
