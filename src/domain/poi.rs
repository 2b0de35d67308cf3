/// One flattened category-search result: ordered `(column, value)` pairs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoiRecord {
    fields: Vec<(&'static str, String)>,
}

impl PoiRecord {
    pub fn new(fields: Vec<(&'static str, String)>) -> Self {
        Self { fields }
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|(k, _)| *k)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
