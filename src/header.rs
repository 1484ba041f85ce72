use std::borrow::Cow;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::datatypes;
use crate::utils::SceneError;

static HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^--- !u!(\d+) &(-?\d+)( stripped)?[ \t]*$").expect("Invalid regex")
});

/// 对象头部：`--- !u!<classID> &<fileID> [stripped]`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlockHeader {
    /// 文件内唯一标识（十进制字符串）
    pub file_id: String,
    /// 类型标签
    pub class_id: u32,
    /// 是否为预制体实例的占位对象
    pub stripped: bool,
}

impl BlockHeader {
    pub fn new(file_id: impl Into<String>, class_id: u32, stripped: bool) -> Self {
        Self {
            file_id: file_id.into(),
            class_id,
            stripped,
        }
    }

    /// 解析头部行
    ///
    /// 只接受完整的 `--- !u!<tag> &<id>` 形式，YAML 序言等其他文本返回 `InvalidFormat`。
    pub fn parse(line: &str) -> Result<Self, SceneError> {
        let line = line.trim_end_matches(['\n', '\r']);
        let caps = HEADER_RE
            .captures(line)
            .ok_or_else(|| SceneError::invalid(format!("invalid object header: {:?}", line)))?;

        let class_id = caps[1]
            .parse::<u32>()
            .map_err(|_| SceneError::invalid(format!("class id out of range: {}", &caps[1])))?;

        Ok(BlockHeader {
            file_id: caps[2].to_string(),
            class_id,
            stripped: caps.get(3).is_some(),
        })
    }

    /// 生成头部行（不含换行）
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// 类型名称（由类型表计算，不存储）
    pub fn type_name(&self) -> Cow<'static, str> {
        datatypes::type_name(self.class_id)
    }
}

impl fmt::Display for BlockHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "--- !u!{} &{}", self.class_id, self.file_id)?;
        if self.stripped {
            write!(f, " stripped")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header() {
        let header = BlockHeader::parse("--- !u!1 &1234567890").unwrap();
        assert_eq!(header.file_id, "1234567890");
        assert_eq!(header.class_id, 1);
        assert!(!header.stripped);
        assert_eq!(header.type_name(), "GameObject");
    }

    #[test]
    fn test_parse_stripped_header() {
        let header = BlockHeader::parse("--- !u!4 &-5531786521437516480 stripped\n").unwrap();
        assert_eq!(header.file_id, "-5531786521437516480");
        assert_eq!(header.class_id, 4);
        assert!(header.stripped);
    }

    #[test]
    fn test_reject_invalid_headers() {
        assert!(BlockHeader::parse("%YAML 1.1").is_err());
        assert!(BlockHeader::parse("%TAG !u! tag:unity3d.com,2011:").is_err());
        assert!(BlockHeader::parse("--- !u!1 &abc").is_err());
        assert!(BlockHeader::parse("--- !u!1").is_err());
        assert!(BlockHeader::parse("--- !u!1 &100 extra").is_err());
        assert!(BlockHeader::parse("GameObject:").is_err());
    }

    #[test]
    fn test_header_roundtrip() {
        for header in [
            BlockHeader::new("100", 1, false),
            BlockHeader::new("-42", 224, true),
            BlockHeader::new("700000", 1001, false),
        ] {
            assert_eq!(BlockHeader::parse(&header.render()).unwrap(), header);
        }
    }

    #[test]
    fn test_unknown_type_name() {
        let header = BlockHeader::new("1", 9999, false);
        assert_eq!(header.type_name(), "Unknown_9999");
    }
}
