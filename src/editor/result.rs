/// 编辑操作的结果记录
///
/// 每个公开操作都返回它而不是 `Result`：成功时带写入字节数与新分配的 id，
/// 失败时带错误分类与可读信息。
use serde::Serialize;

use crate::utils::{ErrorKind, SceneError};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditResult {
    pub success: bool,
    pub file: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes_written: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_object_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefab_instance_id: Option<String>,
    /// 本次分配的全部新 id
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub created_ids: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub removed_ids: Vec<String>,
    /// 展开预制体时未能应用的覆盖数
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped_overrides: Option<usize>,
    /// 读取属性的结果
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl EditResult {
    pub fn ok(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: true,
            file: file.into(),
            message: message.into(),
            error_kind: None,
            bytes_written: None,
            game_object_id: None,
            transform_id: None,
            component_id: None,
            prefab_instance_id: None,
            created_ids: Vec::new(),
            removed_ids: Vec::new(),
            skipped_overrides: None,
            value: None,
        }
    }

    pub fn failed(file: impl Into<String>, error: &SceneError) -> Self {
        Self {
            success: false,
            error_kind: Some(error.kind()),
            ..Self::ok(file, error.to_string())
        }
    }

    pub fn with_bytes(mut self, bytes: usize) -> Self {
        self.bytes_written = Some(bytes);
        self
    }

    pub fn with_game_object(mut self, id: impl Into<String>) -> Self {
        self.game_object_id = Some(id.into());
        self
    }

    pub fn with_transform(mut self, id: impl Into<String>) -> Self {
        self.transform_id = Some(id.into());
        self
    }

    pub fn with_component(mut self, id: impl Into<String>) -> Self {
        self.component_id = Some(id.into());
        self
    }

    pub fn with_prefab_instance(mut self, id: impl Into<String>) -> Self {
        self.prefab_instance_id = Some(id.into());
        self
    }

    pub fn with_created(mut self, ids: Vec<String>) -> Self {
        self.created_ids = ids;
        self
    }

    pub fn with_removed(mut self, ids: Vec<String>) -> Self {
        self.removed_ids = ids;
        self
    }

    pub fn with_skipped(mut self, count: usize) -> Self {
        self.skipped_overrides = Some(count);
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_result_serialization() {
        let err = SceneError::not_found("game object 'Ghost'");
        let result = EditResult::failed("a.unity", &err);
        assert!(!result.success);
        assert_eq!(result.error_kind, Some(ErrorKind::NotFound));

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["error_kind"], "not_found");
        assert!(json.get("bytes_written").is_none());
        assert!(json.get("created_ids").is_none());
    }

    #[test]
    fn test_ok_result_serialization() {
        let result = EditResult::ok("a.unity", "created")
            .with_bytes(120)
            .with_game_object("1")
            .with_created(vec!["1".into(), "2".into()]);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["bytes_written"], 120);
        assert_eq!(json["created_ids"][1], "2");
        assert!(json.get("error_kind").is_none());
    }
}
