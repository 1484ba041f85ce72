/// 属性路径解析
///
/// 在对象文本中定位点分路径（`a.b.c`、`a.b[2]`）对应的值区间。
/// 同一个键可能有两种结构写法：
///
/// - 行内映射：`m_LocalPosition: {x: 0, y: 0, z: 0}`
/// - 块映射：`m_Shadows:` 后跟缩进更深的子行
///
/// 数组是 `key: []` 或每项一行的 `- value`（与键同缩进或更深）。
/// 解析只返回字节区间，修改由调用方按区间替换，不重排周围文本。

/// 路径片段
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment {
    Key(String),
    Index(usize),
}

/// 解析点分路径，格式错误返回 `None`
///
/// 引擎覆盖记录中的 `X.Array.data[i]` 会被折叠为 `X[i]`。
pub(crate) fn parse_path(path: &str) -> Option<Vec<Segment>> {
    if path.is_empty() {
        return None;
    }

    let mut segments = Vec::new();
    for piece in path.split('.') {
        let (name, mut rest) = match piece.find('[') {
            Some(pos) => (&piece[..pos], &piece[pos..]),
            None => (piece, ""),
        };

        if name.is_empty() && (rest.is_empty() || segments.is_empty()) {
            return None;
        }
        if !name.is_empty() {
            segments.push(Segment::Key(name.to_string()));
        }

        while !rest.is_empty() {
            let close = rest.find(']')?;
            if !rest.starts_with('[') {
                return None;
            }
            let digits = &rest[1..close];
            if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            segments.push(Segment::Index(digits.parse().ok()?));
            rest = &rest[close + 1..];
        }
    }

    Some(collapse_array_data(segments))
}

fn collapse_array_data(segments: Vec<Segment>) -> Vec<Segment> {
    let mut out: Vec<Segment> = Vec::with_capacity(segments.len());
    let mut i = 0;
    while i < segments.len() {
        let is_array_data = matches!(&segments[i], Segment::Key(k) if k == "Array")
            && matches!(segments.get(i + 1), Some(Segment::Key(k)) if k == "data")
            && matches!(segments.get(i + 2), Some(Segment::Index(_)));
        if is_array_data && !out.is_empty() {
            out.push(segments[i + 2].clone());
            i += 3;
        } else {
            out.push(segments[i].clone());
            i += 1;
        }
    }
    out
}

/// 字节区间 `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// 数组中的一项：从 `-` 所在行首到最后一行行尾（不含换行）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Item {
    pub start: usize,
    pub end: usize,
    /// `- ` 之后的值起点
    pub value_start: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SeqForm {
    /// `key: []`，区间覆盖 `[]`
    Empty(Span),
    /// 多行形式
    Items { indent: usize, items: Vec<Item> },
}

/// 数组节点
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Seq {
    /// 键所在列，空数组展开时使用
    pub key_col: usize,
    /// 冒号之后的位置
    pub after_colon: usize,
    pub form: SeqForm,
}

impl Seq {
    pub fn len(&self) -> usize {
        match &self.form {
            SeqForm::Empty(_) => 0,
            SeqForm::Items { items, .. } => items.len(),
        }
    }
}

/// 路径解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Node {
    Scalar(Span),
    Inline(Span),
    Block { span: Span, first: usize, last: usize },
    /// 数组项本身是映射：`- target: {...}` 加续行
    ItemMap { span: Span, line: usize, col: usize, last: usize },
    Sequence(Seq),
}

impl Node {
    /// 值的文本区间（get/set 使用）
    pub fn span(&self) -> Span {
        match self {
            Node::Scalar(span) | Node::Inline(span) => *span,
            Node::Block { span, .. } | Node::ItemMap { span, .. } => *span,
            Node::Sequence(seq) => match &seq.form {
                SeqForm::Empty(span) => *span,
                SeqForm::Items { items, .. } => {
                    let first = items.first().map(|i| i.start).unwrap_or(seq.after_colon);
                    let last = items.last().map(|i| i.end).unwrap_or(seq.after_colon);
                    Span::new(first, last)
                }
            },
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Line {
    start: usize,
    end: usize,
    indent: usize,
    blank: bool,
}

/// 一个可查找键的作用域：每个键行及其键所在列
struct Scope {
    keys: Vec<(usize, usize)>,
}

pub(crate) struct Resolver<'a> {
    text: &'a str,
    lines: Vec<Line>,
}

impl<'a> Resolver<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut lines = Vec::new();
        let mut start = 0;
        for piece in text.split_inclusive('\n') {
            // 混合换行文件中的 `\r` 不属于行内容
            let body = piece.strip_suffix('\n').unwrap_or(piece);
            let body = body.strip_suffix('\r').unwrap_or(body);
            let end = start + body.len();
            let indent = body.len() - body.trim_start_matches(' ').len();
            lines.push(Line {
                start,
                end,
                indent,
                blank: body.trim().is_empty(),
            });
            start += piece.len();
        }
        Self { text, lines }
    }

    /// 解析整条路径
    pub fn resolve(&self, segments: &[Segment]) -> Option<Node> {
        let (first, rest) = segments.split_first()?;
        let Segment::Key(key) = first else {
            return None;
        };

        let scope = self.root_scope()?;
        let mut node = self.lookup(&scope, key)?;

        for segment in rest {
            node = match (segment, &node) {
                (Segment::Key(key), Node::Inline(span)) => self.inline_entry(*span, key)?,
                (Segment::Key(key), Node::Block { first, last, .. }) => {
                    let scope = self.block_scope(*first, *last)?;
                    self.lookup(&scope, key)?
                }
                (Segment::Key(key), Node::ItemMap { line, col, last, .. }) => {
                    let scope = self.item_scope(*line, *col, *last);
                    self.lookup(&scope, key)?
                }
                (Segment::Index(index), Node::Sequence(seq)) => self.item(seq, *index)?,
                _ => return None,
            };
        }

        Some(node)
    }

    fn content(&self, line: &Line) -> &'a str {
        &self.text[line.start + line.indent..line.end]
    }

    /// 根作用域：类型行（如 `GameObject:`）之下的所有属性
    fn root_scope(&self) -> Option<Scope> {
        // 第 0 行是头部
        let root = (1..self.lines.len())
            .find(|&i| !self.lines[i].blank && self.lines[i].indent == 0)?;
        let mut last = None;
        for i in root + 1..self.lines.len() {
            let line = &self.lines[i];
            if line.blank {
                continue;
            }
            if line.indent == 0 {
                break;
            }
            last = Some(i);
        }
        self.block_scope(root + 1, last?)
    }

    fn block_scope(&self, first: usize, last: usize) -> Option<Scope> {
        let indent = (first..=last)
            .filter(|&i| !self.lines[i].blank)
            .map(|i| self.lines[i].indent)
            .min()?;
        let keys = (first..=last)
            .filter(|&i| {
                let line = &self.lines[i];
                !line.blank && line.indent == indent && !self.content(line).starts_with('-')
            })
            .map(|i| (i, indent))
            .collect();
        Some(Scope { keys })
    }

    fn item_scope(&self, line: usize, col: usize, last: usize) -> Scope {
        let mut keys = vec![(line, col)];
        for i in line + 1..=last {
            let l = &self.lines[i];
            if !l.blank && l.indent == col && !self.content(l).starts_with('-') {
                keys.push((i, col));
            }
        }
        Scope { keys }
    }

    fn lookup(&self, scope: &Scope, key: &str) -> Option<Node> {
        scope
            .keys
            .iter()
            .find(|&&(line, col)| self.key_matches(line, col, key))
            .map(|&(line, col)| self.value_of(line, col, key.len()))
    }

    fn key_matches(&self, line: usize, col: usize, key: &str) -> bool {
        let l = &self.lines[line];
        let text = &self.text[l.start + col..l.end];
        match text.strip_prefix(key) {
            Some(after) => after == ":" || after.starts_with(": ") || after.starts_with(":\t"),
            None => false,
        }
    }

    /// 对键行的值做结构分类
    fn value_of(&self, line: usize, col: usize, key_len: usize) -> Node {
        let l = self.lines[line];
        let after_colon = l.start + col + key_len + 1;
        let rest = &self.text[after_colon..l.end];
        let value_start = after_colon + (rest.len() - rest.trim_start().len());
        let value_end = l.start + self.text[l.start..l.end].trim_end().len();
        let value_end = value_end.max(value_start);
        let value = &self.text[value_start..value_end];

        let followers = self.followers(line, col, value.is_empty());

        if value.is_empty() {
            return match followers {
                Some((first, last)) => {
                    if self.content(&self.lines[first]).starts_with('-') {
                        Node::Sequence(self.sequence(col, after_colon, first, last))
                    } else {
                        Node::Block {
                            span: Span::new(self.lines[first].start, self.lines[last].end),
                            first,
                            last,
                        }
                    }
                }
                None => Node::Scalar(Span::new(value_start, value_start)),
            };
        }

        if value == "[]" {
            return Node::Sequence(Seq {
                key_col: col,
                after_colon,
                form: SeqForm::Empty(Span::new(value_start, value_end)),
            });
        }

        if value.starts_with('{') {
            if let Some(close) = matching_brace(value) {
                if value[close + 1..].trim().is_empty() {
                    return Node::Inline(Span::new(value_start, value_start + close + 1));
                }
            }
        }

        match followers {
            // 行尾带内容但后面跟着更深的键行：仍视为块映射
            Some((first, last)) if self.looks_like_key(&self.lines[first]) => Node::Block {
                span: Span::new(self.lines[first].start, self.lines[last].end),
                first,
                last,
            },
            // 折行的长字符串
            Some((_, last)) => Node::Scalar(Span::new(value_start, self.lines[last].end)),
            None => Node::Scalar(Span::new(value_start, value_end)),
        }
    }

    /// 键行之后属于该键的行区间（首个非空行，最后一个非空行）
    fn followers(&self, line: usize, col: usize, allow_same_indent_dash: bool) -> Option<(usize, usize)> {
        let mut first = None;
        let mut last = None;
        for i in line + 1..self.lines.len() {
            let l = &self.lines[i];
            if l.blank {
                continue;
            }
            let same_indent_item = allow_same_indent_dash
                && l.indent == col
                && (self.content(l).starts_with("- ") || self.content(l) == "-");
            if l.indent > col || same_indent_item {
                first.get_or_insert(i);
                last = Some(i);
            } else {
                break;
            }
        }
        Some((first?, last?))
    }

    fn looks_like_key(&self, line: &Line) -> bool {
        let content = self.content(line);
        if content.starts_with('-') {
            return true;
        }
        match content.find(':') {
            Some(pos) => {
                let key = &content[..pos];
                !key.is_empty()
                    && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ' ')
                    && (content[pos + 1..].is_empty() || content[pos + 1..].starts_with(' '))
            }
            None => false,
        }
    }

    fn sequence(&self, key_col: usize, after_colon: usize, first: usize, last: usize) -> Seq {
        let indent = self.lines[first].indent;
        let starts: Vec<usize> = (first..=last)
            .filter(|&i| {
                let l = &self.lines[i];
                !l.blank && l.indent == indent && self.content(l).starts_with('-')
            })
            .collect();

        let items = starts
            .iter()
            .enumerate()
            .map(|(n, &start_line)| {
                let end_line = match starts.get(n + 1) {
                    Some(&next) => (start_line..next)
                        .rev()
                        .find(|&i| !self.lines[i].blank)
                        .unwrap_or(start_line),
                    None => last,
                };
                let l = &self.lines[start_line];
                let after_dash = &self.text[l.start + indent + 1..l.end];
                let value_start =
                    l.start + indent + 1 + (after_dash.len() - after_dash.trim_start().len());
                Item {
                    start: l.start,
                    end: self.lines[end_line].end,
                    value_start,
                }
            })
            .collect();

        Seq {
            key_col,
            after_colon,
            form: SeqForm::Items { indent, items },
        }
    }

    fn item(&self, seq: &Seq, index: usize) -> Option<Node> {
        let SeqForm::Items { items, .. } = &seq.form else {
            return None;
        };
        let item = items.get(index)?;
        let line = self.lines.iter().position(|l| l.start == item.start)?;
        let last = self.lines.iter().position(|l| l.end == item.end && l.start >= item.start)?;
        let l = &self.lines[line];
        let value = self.text[item.value_start..l.end].trim_end();
        let value_end = item.value_start + value.len();

        if value.starts_with('{') {
            if let Some(close) = matching_brace(value) {
                if value[close + 1..].trim().is_empty() && last == line {
                    return Some(Node::Inline(Span::new(item.value_start, item.value_start + close + 1)));
                }
            }
        }

        let col = item.value_start - l.start;
        let probe = Line {
            start: item.value_start,
            end: l.end,
            indent: 0,
            blank: false,
        };
        if !value.starts_with('-') && self.looks_like_key(&probe) {
            return Some(Node::ItemMap {
                span: Span::new(item.value_start, item.end),
                line,
                col,
                last,
            });
        }

        if last > line {
            return Some(Node::Scalar(Span::new(item.value_start, item.end)));
        }
        Some(Node::Scalar(Span::new(item.value_start, value_end)))
    }

    /// 在行内映射 `{k: v, ...}` 中查找键
    fn inline_entry(&self, span: Span, key: &str) -> Option<Node> {
        let inner_start = span.start + 1;
        let inner_end = span.end - 1;
        let inner = &self.text[inner_start..inner_end];

        for (entry_start, entry) in split_top_level(inner) {
            let trimmed_offset = entry.len() - entry.trim_start().len();
            let entry_trimmed = entry.trim_start();
            let Some(colon) = entry_trimmed.find(':') else {
                continue;
            };
            if entry_trimmed[..colon].trim_end() != key {
                continue;
            }
            let after = &entry_trimmed[colon + 1..];
            let value_offset = after.len() - after.trim_start().len();
            let value = after.trim();
            let start = inner_start + entry_start + trimmed_offset + colon + 1 + value_offset;
            let end = start + value.len();

            if value.starts_with('{') && matching_brace(value) == Some(value.len() - 1) {
                return Some(Node::Inline(Span::new(start, end)));
            }
            return Some(Node::Scalar(Span::new(start, end)));
        }
        None
    }
}

/// 找到与开头 `{` 匹配的 `}` 位置
fn matching_brace(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (i, c) in text.char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '{' | '[' => depth += 1,
            '}' | ']' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// 按顶层逗号切分行内映射内容，返回 (起始偏移, 片段)
fn split_top_level(inner: &str) -> Vec<(usize, &str)> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '{' | '[' => depth += 1,
            '}' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push((start, &inner[start..i]));
                start = i + 1;
            }
            _ => {}
        }
    }
    if start < inner.len() {
        parts.push((start, &inner[start..]));
    }
    parts
}
