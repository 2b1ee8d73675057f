use vellum_types::{Fields, Ref};

/// A write with all of its options spelled out.
///
/// [`Vellum::write`](crate::Vellum::write) covers the common case; use this
/// to link to a specific previous version or to skip unchanged payloads.
#[derive(Debug)]
pub struct WriteRequest<R> {
    pub id: String,
    pub reader: R,
    pub fields: Fields,
    /// Version the new one replaces. When `None`, the latest indexed
    /// version of `id` is used, if any.
    pub previous_content: Option<Ref>,
    /// Return the previous version instead of writing a new one when the
    /// payload is unchanged.
    pub ignore_duplicate_blob: bool,
}

impl<R> WriteRequest<R> {
    pub fn new(id: impl Into<String>, reader: R) -> Self {
        Self {
            id: id.into(),
            reader,
            fields: Fields::new(),
            previous_content: None,
            ignore_duplicate_blob: false,
        }
    }

    pub fn with_fields(mut self, fields: Fields) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_field(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(field, value);
        self
    }

    pub fn with_previous(mut self, previous: Ref) -> Self {
        self.previous_content = Some(previous);
        self
    }

    pub fn ignore_duplicate_blob(mut self) -> Self {
        self.ignore_duplicate_blob = true;
        self
    }
}
