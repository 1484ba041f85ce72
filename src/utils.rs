use serde::Serialize;
use thiserror::Error;

/// 自定义错误类型
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("IO error: {original}; restoring the backup also failed: {restore}")]
    RestoreFailed {
        original: std::io::Error,
        restore: std::io::Error,
    },

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// 错误分类（写入结果记录）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    InvalidFormat,
    Conflict,
    Io,
}

impl SceneError {
    /// 获取错误分类
    pub fn kind(&self) -> ErrorKind {
        match self {
            SceneError::NotFound(_) => ErrorKind::NotFound,
            SceneError::InvalidFormat(_) | SceneError::JsonError(_) => ErrorKind::InvalidFormat,
            SceneError::Conflict(_) => ErrorKind::Conflict,
            SceneError::IoError(_) | SceneError::RestoreFailed { .. } => ErrorKind::Io,
        }
    }

    pub(crate) fn not_found(what: impl std::fmt::Display) -> Self {
        SceneError::NotFound(what.to_string())
    }

    pub(crate) fn invalid(what: impl std::fmt::Display) -> Self {
        SceneError::InvalidFormat(what.to_string())
    }

    pub(crate) fn conflict(what: impl std::fmt::Display) -> Self {
        SceneError::Conflict(what.to_string())
    }
}

/// 检查是否为 32 位十六进制 GUID
pub fn is_guid(text: &str) -> bool {
    text.len() == 32 && text.chars().all(|c| c.is_ascii_hexdigit())
}

/// 将标量写成 YAML 安全的形式
///
/// 普通名称原样输出；包含 `: `、`#`、首尾空白或以特殊字符开头的名称使用单引号。
pub fn quote_scalar(text: &str) -> String {
    if needs_quotes(text) {
        format!("'{}'", text.replace('\'', "''"))
    } else {
        text.to_string()
    }
}

/// 去掉标量两侧的引号（`quote_scalar` 的逆操作）
pub fn unquote_scalar(text: &str) -> String {
    let text = text.trim();
    if text.len() >= 2 && text.starts_with('\'') && text.ends_with('\'') {
        return text[1..text.len() - 1].replace("''", "'");
    }
    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        return text[1..text.len() - 1].replace("\\\"", "\"");
    }
    text.to_string()
}

fn needs_quotes(text: &str) -> bool {
    if text.is_empty() {
        return false;
    }
    if text.trim() != text {
        return true;
    }
    let first = text.chars().next().unwrap_or(' ');
    if matches!(
        first,
        '\'' | '"' | '{' | '[' | '!' | '&' | '*' | '#' | '|' | '>' | '%' | '@' | '`' | '-' | '?'
    ) {
        return true;
    }
    text.contains(": ") || text.contains(" #") || text.ends_with(':')
}
