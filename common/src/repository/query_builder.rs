use mongodb::bson::{doc, Bson, Document};

#[derive(Debug, Default, Clone)]
pub struct QueryBuilder {
    current: Document,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: &str, value: impl Into<Bson>) -> Self {
        self.current.insert(field, value.into());
        self
    }

    /// 大小写不敏感的子串匹配，输入按字面量处理
    pub fn contains_ignore_case(mut self, field: &str, text: &str) -> Self {
        self.current.insert(field, doc! { "$regex": regex::escape(text), "$options": "i" });
        self
    }

    /// 文本为空时不追加条件
    pub fn contains_ignore_case_opt(self, field: &str, text: &str) -> Self {
        if text.is_empty() { self } else { self.contains_ignore_case(field, text) }
    }

    pub fn build(self) -> Document {
        self.current
    }
}
