//! Free constructors for every node, plus the two string entry points.
//!
//! These mirror the node constructors in [`crate::ast`] but hand back ready
//! to share handles, which is what callers assembling trees by hand want.

use crate::ast::*;
use crate::error::InvalidTypeName;
use crate::parser::Parser;
use std::str::FromStr;
use std::sync::Arc;

/// # Panics
///
/// Panics if `rank` is zero or `element` is a by-ref type.
pub fn array_type(element: impl Into<Type>, rank: usize) -> Type {
    ArrayType::new(element, rank).into()
}

/// # Panics
///
/// Panics if `element` is already a by-ref type.
pub fn by_ref_type(element: impl Into<Type>) -> Type {
    ByRefType::new(element).into()
}

/// # Panics
///
/// Panics if `type_arguments` is empty.
pub fn generic_type(
    definition: Arc<NamedType>,
    type_arguments: impl IntoIterator<Item = Type>,
) -> Type {
    GenericType::new(definition, type_arguments.into_iter().collect()).into()
}

pub fn named_type(name: impl Into<String>, assembly: Option<Arc<Assembly>>) -> Arc<NamedType> {
    Arc::new(NamedType::new(name, assembly))
}

pub fn nested_type(declaring_type: Arc<NamedType>, name: impl Into<String>) -> Arc<NamedType> {
    Arc::new(NamedType::nested(declaring_type, name))
}

/// # Panics
///
/// Panics if `element` is a by-ref type.
pub fn pointer_type(element: impl Into<Type>) -> Type {
    PointerType::new(element).into()
}

/// # Panics
///
/// Panics if `element` is a by-ref type.
pub fn sz_array_type(element: impl Into<Type>) -> Type {
    SzArrayType::new(element).into()
}

pub fn assembly(
    name: impl Into<String>,
    qualifications: impl IntoIterator<Item = Arc<Qualification>>,
) -> Arc<Assembly> {
    Arc::new(Assembly::new(name, qualifications.into_iter().collect()))
}

pub fn qualification(name: impl Into<String>, value: impl Into<String>) -> Arc<Qualification> {
    Arc::new(Qualification::new(name, value))
}

pub fn parse_type_name(text: &str) -> Result<Type, InvalidTypeName> {
    Parser::new(text).parse_type()
}

pub fn parse_assembly_name(text: &str) -> Result<Arc<Assembly>, InvalidTypeName> {
    Parser::new(text).parse_assembly().map(Arc::new)
}

impl FromStr for Type {
    type Err = InvalidTypeName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_type_name(s)
    }
}

impl FromStr for Assembly {
    type Err = InvalidTypeName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Parser::new(s).parse_assembly()
    }
}
