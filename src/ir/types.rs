//! Type and struct-layout definitions

use std::fmt;

/// An IR type: a base name plus a pointer indirection count
///
/// `int**` is `Type { base_type: "int", indirection: 2 }`. Two types are
/// equal iff base name and indirection match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Type {
    /// Base type name (a struct name, `int`, or a synthesized function type)
    pub base_type: String,
    /// Number of pointer levels
    pub indirection: usize,
}

impl Type {
    /// Creates a type from its base name and indirection count
    pub fn new(base_type: impl Into<String>, indirection: usize) -> Self {
        Type {
            base_type: base_type.into(),
            indirection,
        }
    }

    /// True for any pointer-typed value
    pub fn is_pointer(&self) -> bool {
        self.indirection > 0
    }

    /// The type pointed to, if this is a pointer
    pub fn pointee(&self) -> Option<Type> {
        if self.indirection == 0 {
            return None;
        }
        Some(Type::new(self.base_type.clone(), self.indirection - 1))
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base_type)?;
        for _ in 0..self.indirection {
            write!(f, "*")?;
        }
        Ok(())
    }
}

/// A named, typed field of a struct
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructField {
    /// The field name
    pub name: String,
    /// The field type
    pub ty: Type,
}

impl StructField {
    /// Creates a struct field
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        StructField {
            name: name.into(),
            ty,
        }
    }
}

/// A struct layout: an ordered field list
///
/// Field order matches the textual declaration and is never re-sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Struct {
    /// The struct name
    pub name: String,
    /// The fields, in declaration order
    pub fields: Vec<StructField>,
}

impl Struct {
    /// Creates a struct from its ordered fields
    pub fn new(name: impl Into<String>, fields: Vec<StructField>) -> Self {
        Struct {
            name: name.into(),
            fields,
        }
    }

    /// Looks up a field by name
    pub fn field(&self, name: &str) -> Option<&StructField> {
        self.fields.iter().find(|f| f.name == name)
    }
}
