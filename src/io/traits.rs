/// IO 抽象层 - trait 定义
///
/// 场景文件的读写接口，编辑器只依赖这里的 trait，测试可以注入内存实现。
use std::borrow::Cow;
use std::path::Path;

use crate::utils::SceneError;

/// 读入内存的场景文本
///
/// 全部换行都是 `\r\n` 时内存中统一使用 `\n`，`crlf` 记录这一点，写回时还原。
/// 混合换行的文件原样保留，未修改的字节写回时不变。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneText {
    pub content: String,
    pub crlf: bool,
}

impl SceneText {
    /// 从磁盘文本构造（只规范化纯 CRLF 文件）
    pub fn from_disk(text: String) -> Self {
        if is_pure_crlf(&text) {
            SceneText {
                content: text.replace("\r\n", "\n"),
                crlf: true,
            }
        } else {
            SceneText {
                content: text,
                crlf: false,
            }
        }
    }

    /// 按原换行风格生成磁盘文本
    pub fn to_disk(&self) -> Cow<'_, str> {
        if self.crlf {
            Cow::Owned(self.content.replace('\n', "\r\n"))
        } else {
            Cow::Borrowed(&self.content)
        }
    }
}

/// 至少有一个换行，且每个 `\n` 前都是 `\r`
fn is_pure_crlf(text: &str) -> bool {
    let lf = text.matches('\n').count();
    lf > 0 && text.matches("\r\n").count() == lf
}

/// 场景文件读取 trait
///
/// # 职责
/// - 读取文件并规范化换行
/// - 不负责解析，仅负责 IO
pub trait SceneReader {
    /// 读取场景文件
    ///
    /// 文件不存在时返回 `NotFound`
    fn read(&self, path: &Path) -> Result<SceneText, SceneError>;
}

/// 场景文件写入 trait
///
/// # 职责
/// - 把整份文本一次性替换到磁盘
/// - 返回写入的字节数
pub trait SceneWriter {
    fn write(&self, text: &SceneText, path: &Path) -> Result<usize, SceneError>;
}
