//! Schema: an ordered, fixed-arity sequence of (Type, optional name).

use std::fmt;

use crate::field::Type;

#[derive(Clone, Debug)]
pub struct FieldDesc {
    pub field_type: Type,
    pub name: Option<String>,
}

/// A tuple's schema. Equality is by type sequence only — names are
/// metadata for display/lookup, never structural.
#[derive(Clone, Debug)]
pub struct TupleDesc {
    fields: Vec<FieldDesc>,
}

impl TupleDesc {
    pub fn new<I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (Type, Option<String>)>,
    {
        TupleDesc {
            fields: fields
                .into_iter()
                .map(|(field_type, name)| FieldDesc { field_type, name })
                .collect(),
        }
    }

    /// Schema with every field unnamed; handy for tests and internal
    /// aggregate output descriptors.
    pub fn unnamed(types: Vec<Type>) -> Self {
        TupleDesc::new(types.into_iter().map(|t| (t, None)))
    }

    pub fn num_fields(&self) -> usize {
        self.fields.len()
    }

    pub fn field_type(&self, i: usize) -> Type {
        self.fields[i].field_type
    }

    pub fn field_name(&self, i: usize) -> Option<&str> {
        self.fields[i].name.as_deref()
    }

    /// Index of the first field with the given name, if any.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|f| f.name.as_deref() == Some(name))
    }

    /// Total serialized byte width of one tuple under this schema.
    pub fn size_bytes(&self) -> usize {
        self.fields.iter().map(|f| f.field_type.len_bytes()).sum()
    }

    pub fn merge(left: &TupleDesc, right: &TupleDesc) -> TupleDesc {
        let mut fields = left.fields.clone();
        fields.extend(right.fields.clone());
        TupleDesc { fields }
    }

    pub fn iter_types(&self) -> impl Iterator<Item = Type> + '_ {
        self.fields.iter().map(|f| f.field_type)
    }
}

impl PartialEq for TupleDesc {
    fn eq(&self, other: &Self) -> bool {
        self.fields.len() == other.fields.len()
            && self
                .fields
                .iter()
                .zip(other.fields.iter())
                .all(|(a, b)| a.field_type == b.field_type)
    }
}
impl Eq for TupleDesc {}

impl fmt::Display for TupleDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|field| match &field.name {
                Some(name) => format!("{}({})", name, field.field_type),
                None => field.field_type.to_string(),
            })
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_names() {
        let a = TupleDesc::new([(Type::Int32, Some("x".to_string()))]);
        let b = TupleDesc::new([(Type::Int32, Some("y".to_string()))]);
        assert_eq!(a, b);
    }

    #[test]
    fn size_bytes_sums_fields() {
        let td = TupleDesc::unnamed(vec![Type::Int32, Type::String { max_len: 8 }]);
        assert_eq!(td.size_bytes(), 4 + (4 + 8));
    }

    #[test]
    fn merge_concatenates_fields() {
        let a = TupleDesc::unnamed(vec![Type::Int32]);
        let b = TupleDesc::unnamed(vec![Type::Double]);
        let merged = TupleDesc::merge(&a, &b);
        assert_eq!(merged.num_fields(), 2);
        assert_eq!(merged.field_type(1), Type::Double);
    }
}
