//! Field handles used to build predicates and sort keys.
//!
//! [`Path`] carries the field's Rust type, so operand types and the
//! availability of ordering operators are checked by the compiler.
//! [`EntityPath`] is the dynamic counterpart, checked against the catalog
//! when it is built.

use std::fmt;
use std::marker::PhantomData;

use rowql_proto::{CompareOp, Predicate, RecordId, SortKey, Value};

use super::validate::{check_like, check_operand};
use crate::catalog::{EntityDef, FieldDef};
use crate::error::Error;

/// Rust types a [`Path`] may be declared with.
///
/// `Option<T>` declares a nullable field whose operands are still `T`.
pub trait FieldKind {
    /// Type of the operands accepted by comparisons.
    type Operand: Into<Value>;
}

/// Operand types supporting `<`, `<=`, `>`, `>=`.
pub trait Orderable {}

macro_rules! field_kinds {
    ($($ty:ty),* $(,)?) => {
        $(impl FieldKind for $ty {
            type Operand = $ty;
        })*
    };
}

field_kinds!(bool, i32, i64, f64, String, RecordId);

impl Orderable for i32 {}
impl Orderable for i64 {}
impl Orderable for f64 {}
impl Orderable for String {}

impl<T: FieldKind> FieldKind for Option<T> {
    type Operand = T::Operand;
}

/// A typed handle on one field of an entity.
///
/// ```
/// use rowql_core::query::Path;
///
/// const AGE: Path<i32> = Path::new("age");
/// const USERNAME: Path<Option<String>> = Path::new("username");
///
/// let search = USERNAME.eq("member1").and(AGE.ge(10));
/// assert_eq!(search.to_string(), "(username = \"member1\" and age >= 10)");
/// ```
pub struct Path<T> {
    name: &'static str,
    _kind: PhantomData<fn() -> T>,
}

impl<T> Path<T> {
    /// Create a handle on the field `name`.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _kind: PhantomData,
        }
    }

    /// Field name.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Field is null or absent.
    pub fn is_null(&self) -> Predicate {
        Predicate::is_null(self.name)
    }

    /// Field is present and not null.
    pub fn is_not_null(&self) -> Predicate {
        Predicate::is_not_null(self.name)
    }

    /// Ascending sort key on this field.
    pub fn asc(&self) -> SortKey {
        SortKey::asc(self.name)
    }

    /// Descending sort key on this field.
    pub fn desc(&self) -> SortKey {
        SortKey::desc(self.name)
    }
}

impl<T: FieldKind> Path<T> {
    /// Field equals `value`.
    pub fn eq(&self, value: impl Into<T::Operand>) -> Predicate {
        let value: T::Operand = value.into();
        Predicate::eq(self.name, value)
    }

    /// Field is present and differs from `value`.
    pub fn ne(&self, value: impl Into<T::Operand>) -> Predicate {
        self.compare(CompareOp::Ne, value.into())
    }

    fn compare(&self, op: CompareOp, value: T::Operand) -> Predicate {
        Predicate::compare(self.name, op, value)
    }
}

impl<T: FieldKind> Path<T>
where
    T::Operand: Orderable,
{
    /// Field is less than `value`.
    pub fn lt(&self, value: impl Into<T::Operand>) -> Predicate {
        self.compare(CompareOp::Lt, value.into())
    }

    /// Field is less than or equal to `value`.
    pub fn le(&self, value: impl Into<T::Operand>) -> Predicate {
        self.compare(CompareOp::Le, value.into())
    }

    /// Field is greater than `value`.
    pub fn gt(&self, value: impl Into<T::Operand>) -> Predicate {
        self.compare(CompareOp::Gt, value.into())
    }

    /// Field is greater than or equal to `value`.
    pub fn ge(&self, value: impl Into<T::Operand>) -> Predicate {
        self.compare(CompareOp::Ge, value.into())
    }

    /// Field lies in `low..=high`.
    pub fn between(
        &self,
        low: impl Into<T::Operand>,
        high: impl Into<T::Operand>,
    ) -> Predicate {
        self.ge(low).and(self.le(high))
    }
}

impl<T: FieldKind<Operand = String>> Path<T> {
    /// Field matches a LIKE pattern.
    pub fn like(&self, pattern: impl Into<String>) -> Predicate {
        Predicate::like(self.name, pattern)
    }

    /// Field starts with `prefix`, taken literally.
    pub fn starts_with(&self, prefix: &str) -> Predicate {
        Predicate::like(self.name, format!("{}%", escape_like(prefix)))
    }

    /// Field contains `needle`, taken literally.
    pub fn contains(&self, needle: &str) -> Predicate {
        Predicate::like(self.name, format!("%{}%", escape_like(needle)))
    }
}

fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

impl<T> Clone for Path<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Path<T> {}

impl<T> fmt::Debug for Path<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Path").field(&self.name).finish()
    }
}

/// A field of a catalog entity, resolved at runtime.
///
/// Predicates built from it are checked against the field's declared type
/// and fail with `TypeMismatch` instead of being deferred to execution.
#[derive(Debug, Clone, Copy)]
pub struct EntityPath<'a> {
    entity: &'a EntityDef,
    field: &'a FieldDef,
}

impl<'a> EntityPath<'a> {
    /// Resolve `field` on `entity`.
    pub fn new(entity: &'a EntityDef, field: &str) -> Result<Self, Error> {
        Ok(Self {
            entity,
            field: entity.field(field)?,
        })
    }

    /// The resolved field definition.
    pub fn field(&self) -> &'a FieldDef {
        self.field
    }

    /// Field equals `value`.
    pub fn eq(&self, value: impl Into<Value>) -> Result<Predicate, Error> {
        let value = value.into();
        check_operand(self.entity, self.field, None, &value)?;
        Ok(Predicate::eq(self.field.name.clone(), value))
    }

    /// Field compared to `value` with `op`.
    pub fn compare(&self, op: CompareOp, value: impl Into<Value>) -> Result<Predicate, Error> {
        let value = value.into();
        check_operand(self.entity, self.field, Some(op), &value)?;
        Ok(Predicate::compare(self.field.name.clone(), op, value))
    }

    /// Field matches a LIKE pattern.
    pub fn like(&self, pattern: impl Into<String>) -> Result<Predicate, Error> {
        check_like(self.entity, self.field)?;
        Ok(Predicate::like(self.field.name.clone(), pattern))
    }

    /// Field is null or absent.
    pub fn is_null(&self) -> Predicate {
        Predicate::is_null(self.field.name.clone())
    }

    /// Field is present and not null.
    pub fn is_not_null(&self) -> Predicate {
        Predicate::is_not_null(self.field.name.clone())
    }

    /// Ascending sort key on this field.
    pub fn asc(&self) -> SortKey {
        SortKey::asc(self.field.name.clone())
    }

    /// Descending sort key on this field.
    pub fn desc(&self) -> SortKey {
        SortKey::desc(self.field.name.clone())
    }
}

impl EntityDef {
    /// Resolve a field for building checked predicates.
    pub fn path(&self, field: &str) -> Result<EntityPath<'_>, Error> {
        EntityPath::new(self, field)
    }
}
