//! Arrow schema for the policy-clause index.

use std::sync::Arc;

use arrow::datatypes::{DataType, Field, Schema};

/// Name of the table holding embedded policy clauses.
pub const CLAUSE_TABLE: &str = "policy_clauses";

/// Schema for the `policy_clauses` table.
///
/// `dim` is the embedding dimensionality of the model that produced the
/// vectors (384 for MiniLM).
pub fn policy_clause_schema(dim: i32) -> Schema {
    Schema::new(vec![
        Field::new("clause_id", DataType::Utf8, false),
        Field::new("source", DataType::Utf8, false),
        Field::new("seq", DataType::UInt32, false),
        Field::new("text", DataType::Utf8, false),
        Field::new(
            "embedding",
            DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), dim),
            false,
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clause_schema_has_expected_fields() {
        let schema = policy_clause_schema(384);
        assert_eq!(schema.fields().len(), 5);
        assert!(schema.field_with_name("clause_id").is_ok());
        assert!(schema.field_with_name("embedding").is_ok());
    }

    #[test]
    fn embedding_dimension_is_carried_in_the_type() {
        let schema = policy_clause_schema(384);
        let field = schema.field_with_name("embedding").unwrap();
        match field.data_type() {
            DataType::FixedSizeList(_, dim) => assert_eq!(*dim, 384),
            other => panic!("unexpected embedding type {other:?}"),
        }
    }
}
