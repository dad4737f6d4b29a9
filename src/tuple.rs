//! Row values: [`RecordId`] (a tuple's on-disk address) and [`Tuple`]
//! itself.

use std::fmt;
use std::sync::Arc;

use crate::field::Field;
use crate::page_id::PageId;
use crate::tuple_desc::TupleDesc;

/// Where a tuple lives: which page, and which slot within it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct RecordId {
    pub page_id: PageId,
    pub slot: usize,
}

impl RecordId {
    pub fn new(page_id: PageId, slot: usize) -> Self {
        RecordId { page_id, slot }
    }
}

/// A fixed-arity row. Field types always match `scheme`; `record_id` is
/// `None` until the tuple is placed in a page slot.
#[derive(Clone, Debug)]
pub struct Tuple {
    scheme: Arc<TupleDesc>,
    fields: Vec<Field>,
    record_id: Option<RecordId>,
}

impl Tuple {
    pub fn new(scheme: Arc<TupleDesc>, fields: Vec<Field>) -> Self {
        assert_eq!(
            fields.len(),
            scheme.num_fields(),
            "tuple has {} fields but its schema declares {}",
            fields.len(),
            scheme.num_fields()
        );
        for (i, field) in fields.iter().enumerate() {
            let expected = scheme.field_type(i);
            assert!(
                fields_match_type(field, expected),
                "field {} is {:?} but schema expects {}",
                i,
                field,
                expected
            );
        }
        Tuple {
            scheme,
            fields,
            record_id: None,
        }
    }

    /// Parses one tuple's worth of bytes (as laid out by [`crate::field::Field::serialize`]
    /// per field) according to `scheme`.
    pub fn deserialize(scheme: Arc<TupleDesc>, bytes: &[u8]) -> Self {
        let mut fields = Vec::with_capacity(scheme.num_fields());
        let mut offset = 0;
        for i in 0..scheme.num_fields() {
            let ty = scheme.field_type(i);
            let width = ty.len_bytes();
            fields.push(Field::deserialize(ty, &bytes[offset..offset + width]));
            offset += width;
        }
        Tuple {
            scheme,
            fields,
            record_id: None,
        }
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.scheme.size_bytes());
        for (i, field) in self.fields.iter().enumerate() {
            let ty = self.scheme.field_type(i);
            let max_len = match ty {
                crate::field::Type::String { max_len } => max_len,
                _ => 0,
            };
            out.extend(field.serialize(max_len));
        }
        out
    }

    pub fn scheme(&self) -> &TupleDesc {
        &self.scheme
    }

    pub fn field(&self, i: usize) -> &Field {
        &self.fields[i]
    }

    pub fn set_field(&mut self, i: usize, value: Field) {
        self.fields[i] = value;
    }

    pub fn record_id(&self) -> Option<RecordId> {
        self.record_id
    }

    pub fn set_record_id(&mut self, rid: RecordId) {
        self.record_id = Some(rid);
    }
}

fn fields_match_type(field: &Field, expected: crate::field::Type) -> bool {
    use crate::field::Type;
    matches!(
        (field, expected),
        (Field::Int(_), Type::Int32)
            | (Field::Str(_), Type::String { .. })
            | (Field::Double(_), Type::Double)
    )
}

impl PartialEq for Tuple {
    fn eq(&self, other: &Self) -> bool {
        self.scheme == other.scheme && self.fields == other.fields
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.fields.iter().map(|v| v.to_string()).collect();
        write!(f, "({})", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Type;

    fn int_pair_scheme() -> Arc<TupleDesc> {
        Arc::new(TupleDesc::unnamed(vec![Type::Int32, Type::Int32]))
    }

    #[test]
    fn serialize_round_trip() {
        let scheme = int_pair_scheme();
        let t = Tuple::new(scheme.clone(), vec![Field::Int(1), Field::Int(2)]);
        let bytes = t.serialize();
        let back = Tuple::deserialize(scheme, &bytes);
        assert_eq!(t, back);
    }

    #[test]
    #[should_panic]
    fn constructing_with_wrong_arity_panics() {
        let scheme = int_pair_scheme();
        Tuple::new(scheme, vec![Field::Int(1)]);
    }

    #[test]
    fn record_id_starts_unset() {
        let scheme = int_pair_scheme();
        let t = Tuple::new(scheme, vec![Field::Int(1), Field::Int(2)]);
        assert!(t.record_id().is_none());
    }
}
