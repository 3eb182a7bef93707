//! Type checking of query parts against an entity definition.

use rowql_proto::{CompareOp, Predicate, SortKey, Value};

use crate::catalog::{EntityDef, FieldDef, ScalarType};
use crate::error::Error;

fn mismatch(entity: &EntityDef, field: &FieldDef, expected: impl ToString, found: &str) -> Error {
    Error::TypeMismatch {
        entity: entity.name.clone(),
        field: field.name.clone(),
        expected: expected.to_string(),
        found: found.to_string(),
    }
}

/// Check an operand for `=` or a comparison against a field.
///
/// Null operands are rejected; `IsNull` covers that case.
pub(crate) fn check_operand(
    entity: &EntityDef,
    field: &FieldDef,
    op: Option<CompareOp>,
    value: &Value,
) -> Result<(), Error> {
    if value.is_null() || !field.field_type.accepts(value) {
        return Err(mismatch(entity, field, &field.field_type, value.kind()));
    }
    if op.is_some_and(CompareOp::is_ordering) && !field.field_type.is_orderable() {
        return Err(mismatch(
            entity,
            field,
            "orderable type",
            &field.field_type.to_string(),
        ));
    }
    Ok(())
}

/// Check that a field can be matched with `like`.
pub(crate) fn check_like(entity: &EntityDef, field: &FieldDef) -> Result<(), Error> {
    match field.field_type.scalar_type() {
        Some(ScalarType::String) => Ok(()),
        _ => Err(mismatch(
            entity,
            field,
            ScalarType::String,
            &field.field_type.to_string(),
        )),
    }
}

/// Check every atom of a predicate against `entity`.
pub fn validate_predicate(entity: &EntityDef, predicate: &Predicate) -> Result<(), Error> {
    for atom in predicate.atoms() {
        match atom {
            Predicate::Eq { field, value } => {
                check_operand(entity, entity.field(field)?, None, value)?
            }
            Predicate::Compare { field, op, value } => {
                check_operand(entity, entity.field(field)?, Some(*op), value)?
            }
            Predicate::IsNull { field } | Predicate::IsNotNull { field } => {
                entity.field(field)?;
            }
            Predicate::Like { field, .. } => check_like(entity, entity.field(field)?)?,
            Predicate::And(..) => {}
        }
    }
    Ok(())
}

/// Check that every sort key names a declared field.
pub fn validate_sort(entity: &EntityDef, keys: &[SortKey]) -> Result<(), Error> {
    for key in keys {
        entity.field(&key.field)?;
    }
    Ok(())
}

/// Check that every projected field is declared.
pub fn validate_projection(entity: &EntityDef, fields: &[String]) -> Result<(), Error> {
    for field in fields {
        entity.field(field)?;
    }
    Ok(())
}
