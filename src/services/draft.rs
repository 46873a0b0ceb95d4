//! 提问草稿

/// 用户正在编辑的问题与标签
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionDraft {
    /// 问题文本
    pub question: String,
    /// 逗号分隔的原始标签文本
    pub tags: String,
}

impl QuestionDraft {
    pub fn new(question: impl Into<String>, tags: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            tags: tags.into(),
        }
    }

    /// 去除首尾空白后问题是否为空
    pub fn is_blank(&self) -> bool {
        self.question.trim().is_empty()
    }

    pub fn tag_list(&self) -> Vec<String> {
        tokenize_tags(&self.tags)
    }

    pub fn clear(&mut self) {
        self.question.clear();
        self.tags.clear();
    }
}

/// 拆分标签文本
///
/// 按逗号切分、去除空白、丢弃空项；保持原顺序，不去重。
pub fn tokenize_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}
