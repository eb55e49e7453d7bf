use crate::ast::*;
use serde::Serialize;
use std::sync::Arc;

/// A plain, serializable mirror of a [`Type`], tagged by node kind.
///
/// Unlike the formatted text, the tree makes every node explicit, which is
/// what tooling and test failure output want to look at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeTree {
    Named {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        declaring_type: Option<Box<TypeTree>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        assembly: Option<AssemblyTree>,
    },
    Generic {
        definition: Box<TypeTree>,
        type_arguments: Vec<TypeTree>,
    },
    Array {
        rank: usize,
        element: Box<TypeTree>,
    },
    SzArray {
        element: Box<TypeTree>,
    },
    Pointer {
        element: Box<TypeTree>,
    },
    ByRef {
        element: Box<TypeTree>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssemblyTree {
    pub name: String,
    pub qualifications: Vec<QualificationTree>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QualificationTree {
    pub name: String,
    pub value: String,
}

impl TypeTree {
    /// Serializes the tree into a pretty-printed JSON string.
    ///
    /// # Errors
    /// Returns a `serde_json::Error` if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Serializes the tree into a YAML string.
    ///
    /// # Errors
    /// Returns a `serde_yaml::Error` if serialization fails.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

impl From<&Type> for TypeTree {
    fn from(ty: &Type) -> Self {
        ty.accept(&mut TreeBuilder, &mut ())
    }
}

impl From<&Assembly> for AssemblyTree {
    fn from(assembly: &Assembly) -> Self {
        AssemblyTree {
            name: assembly.name.clone(),
            qualifications: assembly
                .qualifications
                .iter()
                .map(|q| QualificationTree {
                    name: q.name.clone(),
                    value: q.value.clone(),
                })
                .collect(),
        }
    }
}

struct TreeBuilder;

impl TreeBuilder {
    fn element(&mut self, element: &Type) -> Box<TypeTree> {
        Box::new(element.accept(self, &mut ()))
    }
}

impl TypeVisitor<()> for TreeBuilder {
    type Output = TypeTree;

    fn visit_array(&mut self, ty: &Arc<ArrayType>, _: &mut ()) -> TypeTree {
        TypeTree::Array {
            rank: ty.rank(),
            element: self.element(ty.element()),
        }
    }

    fn visit_by_ref(&mut self, ty: &Arc<ByRefType>, _: &mut ()) -> TypeTree {
        TypeTree::ByRef {
            element: self.element(ty.element()),
        }
    }

    fn visit_generic(&mut self, ty: &Arc<GenericType>, cx: &mut ()) -> TypeTree {
        TypeTree::Generic {
            definition: Box::new(self.visit_named(ty.definition(), &mut ())),
            type_arguments: ty
                .type_arguments()
                .iter()
                .map(|argument| argument.accept(self, cx))
                .collect(),
        }
    }

    fn visit_named(&mut self, ty: &Arc<NamedType>, _: &mut ()) -> TypeTree {
        TypeTree::Named {
            name: ty.name().to_string(),
            declaring_type: ty
                .declaring_type()
                .map(|declaring| Box::new(self.visit_named(declaring, &mut ()))),
            assembly: ty.assembly().map(|assembly| AssemblyTree::from(assembly.as_ref())),
        }
    }

    fn visit_pointer(&mut self, ty: &Arc<PointerType>, _: &mut ()) -> TypeTree {
        TypeTree::Pointer {
            element: self.element(ty.element()),
        }
    }

    fn visit_sz_array(&mut self, ty: &Arc<SzArrayType>, _: &mut ()) -> TypeTree {
        TypeTree::SzArray {
            element: self.element(ty.element()),
        }
    }
}
