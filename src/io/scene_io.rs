/// 场景文件 IO 实现
///
/// 写入遵循 临时文件 → 备份原文件 → 重命名 → 删除备份 的顺序，
/// 备份之后的任何一步失败都会先尝试把备份还原回原路径。
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::traits::{SceneReader, SceneText, SceneWriter};
use crate::utils::SceneError;

/// 默认的场景文件读取器（基于 std::fs）
#[derive(Debug, Clone, Default)]
pub struct DefaultSceneReader;

impl SceneReader for DefaultSceneReader {
    fn read(&self, path: &Path) -> Result<SceneText, SceneError> {
        match fs::read_to_string(path) {
            Ok(text) => Ok(SceneText::from_disk(text)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(SceneError::not_found(format!("file {}", path.display())))
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// 原子写入器
#[derive(Debug, Clone, Default)]
pub struct AtomicSceneWriter {
    /// 目标目录不存在时是否自动创建
    pub create_parent_dirs: bool,
}

impl AtomicSceneWriter {
    pub fn new(create_parent_dirs: bool) -> Self {
        Self { create_parent_dirs }
    }
}

/// `<path>.<suffix>`
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

/// 作用域结束时删除残留的临时文件
struct TempGuard {
    path: PathBuf,
    armed: bool,
}

impl TempGuard {
    fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for TempGuard {
    fn drop(&mut self) {
        if self.armed && self.path.exists() {
            if let Err(err) = fs::remove_file(&self.path) {
                warn!(path = %self.path.display(), error = %err, "failed to remove temp file");
            }
        }
    }
}

impl SceneWriter for AtomicSceneWriter {
    fn write(&self, text: &SceneText, path: &Path) -> Result<usize, SceneError> {
        if self.create_parent_dirs {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
        }

        let data = text.to_disk();
        let tmp = sibling(path, "tmp");
        let bak = sibling(path, "bak");

        let mut guard = TempGuard::new(tmp.clone());
        fs::write(&tmp, data.as_bytes())?;

        let had_original = path.exists();
        if had_original {
            fs::rename(path, &bak)?;
            debug!(backup = %bak.display(), "original moved to backup");
        }

        if let Err(original) = fs::rename(&tmp, path) {
            if had_original {
                if let Err(restore) = fs::rename(&bak, path) {
                    return Err(SceneError::RestoreFailed { original, restore });
                }
            }
            return Err(original.into());
        }
        guard.disarm();

        if had_original {
            if let Err(err) = fs::remove_file(&bak) {
                warn!(backup = %bak.display(), error = %err, "failed to remove backup");
            }
        }

        info!(path = %path.display(), bytes = data.len(), "scene written");
        Ok(data.len())
    }
}
