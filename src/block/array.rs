/// 数组编辑
///
/// 两种物理写法对应同一个逻辑数组：空字面量 `key: []` 与多行 `- value`。
/// 插入第一个元素时展开为多行，删除最后一个元素时收回为 `[]`，
/// 因此"末尾插入再删除末尾"会还原出完全相同的文本。
use super::path::{Seq, SeqForm};

/// 元素数量（空字面量为 0）
pub(crate) fn length(seq: &Seq) -> usize {
    seq.len()
}

/// 元素值文本（`- ` 之后的部分，多行元素包含续行）
pub(crate) fn elements(text: &str, seq: &Seq) -> Vec<String> {
    match &seq.form {
        SeqForm::Empty(_) => Vec::new(),
        SeqForm::Items { items, .. } => items
            .iter()
            .map(|item| text[item.value_start.min(item.end)..item.end].to_string())
            .collect(),
    }
}

/// 插入元素，`index == -1` 表示追加；返回新文本
///
/// 多行值的续行会按元素缩进 + 2 对齐。
pub(crate) fn insert(text: &str, seq: &Seq, index: isize, value: &str) -> Option<String> {
    let len = seq.len() as isize;
    let append = index == -1 || index == len;
    if !append && !(0..len).contains(&index) {
        return None;
    }

    let mut out = String::with_capacity(text.len() + value.len() + 8);
    match &seq.form {
        SeqForm::Empty(literal) => {
            out.push_str(&text[..seq.after_colon]);
            out.push('\n');
            out.push_str(&render_item(seq.key_col, value));
            out.push_str(&text[literal.end..]);
        }
        SeqForm::Items { indent, items } => {
            if append {
                let last = items.last()?;
                out.push_str(&text[..last.end]);
                out.push('\n');
                out.push_str(&render_item(*indent, value));
                out.push_str(&text[last.end..]);
            } else {
                let item = &items[index as usize];
                out.push_str(&text[..item.start]);
                out.push_str(&render_item(*indent, value));
                out.push('\n');
                out.push_str(&text[item.start..]);
            }
        }
    }
    Some(out)
}

/// 删除元素；负数或越界下标返回 `None`
pub(crate) fn remove(text: &str, seq: &Seq, index: isize) -> Option<String> {
    let SeqForm::Items { items, .. } = &seq.form else {
        return None;
    };
    if index < 0 || index as usize >= items.len() {
        return None;
    }
    let item = &items[index as usize];

    if items.len() == 1 {
        let mut out = String::with_capacity(text.len());
        out.push_str(&text[..seq.after_colon]);
        out.push_str(" []");
        out.push_str(&text[item.end..]);
        return Some(out);
    }

    let rest = &text[item.end..];
    let (start, end) = if rest.starts_with("\r\n") {
        (item.start, item.end + 2)
    } else if rest.starts_with('\n') {
        (item.start, item.end + 1)
    } else {
        // 文件末尾没有换行：连同前一个换行一起删除
        (item.start.saturating_sub(1), item.end)
    };

    let mut out = String::with_capacity(text.len());
    out.push_str(&text[..start]);
    out.push_str(&text[end..]);
    Some(out)
}

fn render_item(indent: usize, value: &str) -> String {
    let pad = " ".repeat(indent);
    let continuation = " ".repeat(indent + 2);
    let mut lines = value.lines();
    let mut out = format!("{}- {}", pad, lines.next().unwrap_or(""));
    for line in lines {
        out.push('\n');
        out.push_str(&continuation);
        out.push_str(line);
    }
    out
}
