//! Search index settings for subjects that support free-text listing

/// Fields of a subject searched by the list route's `search` term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchIndex {
    fields: Vec<String>,
}

impl SearchIndex {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}
