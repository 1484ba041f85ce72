/// 对象引用 `{fileID: N[, guid: G, type: T]}` 的提取与重映射
use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// 空引用
pub const NULL_REFERENCE: &str = "{fileID: 0}";

static REFERENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{fileID:\s*(-?\d+)([^{}]*)\}").expect("Invalid regex")
});

static GUID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"guid:\s*([0-9a-fA-F]{32})").expect("Invalid regex"));

static TYPE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"type:\s*(\d+)").expect("Invalid regex"));

/// 解析后的引用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub file_id: String,
    /// 指向其他资源时存在
    pub guid: Option<String>,
    /// 资源类型（`type: 3` 等），只出现在外部引用中
    pub asset_type: Option<u32>,
}

impl Reference {
    pub fn is_null(&self) -> bool {
        self.file_id == "0" && self.guid.is_none()
    }

    /// 文件内引用（不带 guid）
    pub fn is_local(&self) -> bool {
        self.guid.is_none()
    }
}

/// 解析值文本中的第一个引用
pub fn parse_reference(value: &str) -> Option<Reference> {
    REFERENCE_RE.captures(value).map(|caps| from_captures(&caps))
}

fn from_captures(caps: &Captures) -> Reference {
    Reference {
        file_id: caps[1].to_string(),
        guid: GUID_RE.captures(&caps[2]).map(|g| g[1].to_lowercase()),
        asset_type: TYPE_RE.captures(&caps[2]).and_then(|t| t[1].parse().ok()),
    }
}

/// 生成文件内引用文本
pub fn local_reference(file_id: &str) -> String {
    format!("{{fileID: {}}}", file_id)
}

/// 生成外部资源引用文本
pub fn external_reference(file_id: &str, guid: &str, asset_type: u32) -> String {
    format!("{{fileID: {}, guid: {}, type: {}}}", file_id, guid, asset_type)
}

/// 是否为空引用（含 `{fileID: 0}` 的各种写法）
pub fn is_null_reference(value: &str) -> bool {
    parse_reference(value).is_some_and(|r| r.is_null())
}

/// 提取文本中所有非空引用（含外部资源引用；去重，保持出现顺序）
///
/// `fileID` 为 0 的引用视为空引用，不论是否带 guid。
pub(crate) fn all_references(text: &str) -> Vec<Reference> {
    let mut out: Vec<Reference> = Vec::new();
    for caps in REFERENCE_RE.captures_iter(text) {
        if &caps[1] == "0" {
            continue;
        }
        let reference = from_captures(&caps);
        if !out.contains(&reference) {
            out.push(reference);
        }
    }
    out
}

/// 按映射表重写文本内引用，返回 (新文本, 是否有改动)
///
/// 只改写数字部分，其余空白与字段原样保留；带 guid 的外部引用与 `0` 不动。
pub(crate) fn remap_local(text: &str, map: &HashMap<String, String>) -> (String, bool) {
    let mut changed = false;
    let out = REFERENCE_RE.replace_all(text, |caps: &Captures| {
        let whole = &caps[0];
        let id = &caps[1];
        if id == "0" || caps[2].contains("guid:") {
            return whole.to_string();
        }
        match (map.get(id), whole.find(id)) {
            // `{fileID:` 中没有数字，首次出现即为 id 本身
            (Some(new_id), Some(start)) => {
                changed = true;
                format!("{}{}{}", &whole[..start], new_id, &whole[start + id.len()..])
            }
            _ => whole.to_string(),
        }
    });
    (out.into_owned(), changed)
}
