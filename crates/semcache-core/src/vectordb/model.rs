//! Wire-independent types shared by every `VectorIndex` backend.

/// A point to insert: an opaque id bound to its embedding.
#[derive(Debug, Clone)]
pub struct VectorPoint {
    pub id: String,
    pub values: Vec<f32>,
}

impl VectorPoint {
    pub fn new(id: impl Into<String>, values: Vec<f32>) -> Self {
        Self {
            id: id.into(),
            values,
        }
    }
}

/// One neighbor returned by a query, per §4.3: "ordered by descending score".
#[derive(Debug, Clone)]
pub struct SearchMatch {
    pub id: String,
    pub score: f32,
}

/// The result of `VectorIndex::query`.
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    pub count: usize,
    pub matches: Vec<SearchMatch>,
}

impl QueryResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn top(&self) -> Option<&SearchMatch> {
        self.matches.first()
    }
}
