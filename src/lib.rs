//! Parsing, formatting and rewriting of assembly-qualified managed type names
//! such as ``Foo.Bar`1[[Baz, BazLib]][], FooLib, Version=1.0.0.0, Culture=neutral``.
//!
//! ```
//! use clr_typename::{parse_type_name, TypeKind};
//!
//! let ty = parse_type_name("Foo.Bar+Nested[], FooLib, Culture=neutral").unwrap();
//! assert_eq!(ty.kind(), TypeKind::SzArray);
//! assert_eq!(ty.assembly().unwrap().culture(), Some("neutral"));
//! assert_eq!(ty.to_string(), "Foo.Bar+Nested[], FooLib, Culture=neutral");
//! ```

pub mod ast;
pub mod codec;
pub mod error;
pub mod factory;
pub mod formatter;
pub mod parser;
pub mod qualifications;
pub mod rewriter;
pub mod serialization;

pub use ast::{
    ArrayType, Assembly, ByRefType, GenericType, NamedScope, NamedType, PointerType, Qualification,
    SzArrayType, Type, TypeKind, TypeVisitor,
};
pub use error::{Error, InvalidTypeName, QualificationError};
pub use factory::{parse_assembly_name, parse_type_name};
pub use formatter::{format_assembly, format_type, write_assembly, write_type};
pub use qualifications::{Blob, ProcessorArchitecture, Version};
pub use rewriter::Rewriter;
pub use serialization::TypeTree;
