use std::sync::Arc;

/// Discriminates the six shapes a [`Type`] can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Array,
    ByRef,
    Generic,
    Named,
    Pointer,
    SzArray,
}

/// A single `Name=Value` pair inside an assembly clause.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Qualification {
    pub name: String,
    pub value: String,
}

impl Qualification {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// An assembly identity: a simple name followed by ordered qualifications.
///
/// Order is kept exactly as written so that a parsed assembly formats back to
/// the same text; lookups by name return the first match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Assembly {
    pub name: String,
    pub qualifications: Vec<Arc<Qualification>>,
}

impl Assembly {
    pub fn new(name: impl Into<String>, qualifications: Vec<Arc<Qualification>>) -> Self {
        Self {
            name: name.into(),
            qualifications,
        }
    }

    /// Returns the value of the first qualification called `name`.
    #[must_use]
    pub fn qualification(&self, name: &str) -> Option<&str> {
        self.qualifications
            .iter()
            .find(|q| q.name == name)
            .map(|q| q.value.as_str())
    }
}

/// Where a named type hangs: nowhere, off an assembly, or inside another type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NamedScope {
    Unqualified,
    Assembly(Arc<Assembly>),
    DeclaringType(Arc<NamedType>),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamedType {
    name: String,
    scope: NamedScope,
}

impl NamedType {
    pub fn new(name: impl Into<String>, assembly: Option<Arc<Assembly>>) -> Self {
        Self {
            name: name.into(),
            scope: match assembly {
                Some(assembly) => NamedScope::Assembly(assembly),
                None => NamedScope::Unqualified,
            },
        }
    }

    /// A type declared inside `declaring_type`. Nested types never carry an
    /// assembly of their own; it lives on the root of the chain.
    pub fn nested(declaring_type: Arc<NamedType>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scope: NamedScope::DeclaringType(declaring_type),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn scope(&self) -> &NamedScope {
        &self.scope
    }

    #[must_use]
    pub fn assembly(&self) -> Option<&Arc<Assembly>> {
        match &self.scope {
            NamedScope::Assembly(assembly) => Some(assembly),
            _ => None,
        }
    }

    #[must_use]
    pub fn declaring_type(&self) -> Option<&Arc<NamedType>> {
        match &self.scope {
            NamedScope::DeclaringType(declaring) => Some(declaring),
            _ => None,
        }
    }

    /// The outermost type of the declaring-type chain (`self` when not nested).
    #[must_use]
    pub fn root(&self) -> &NamedType {
        let mut current = self;
        while let Some(declaring) = current.declaring_type() {
            current = declaring;
        }
        current
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GenericType {
    definition: Arc<NamedType>,
    type_arguments: Vec<Type>,
}

impl GenericType {
    /// # Panics
    ///
    /// Panics if `type_arguments` is empty; a definition without arguments is
    /// a plain [`NamedType`].
    pub fn new(definition: Arc<NamedType>, type_arguments: Vec<Type>) -> Self {
        assert!(
            !type_arguments.is_empty(),
            "a generic type needs at least one type argument"
        );
        Self {
            definition,
            type_arguments,
        }
    }

    #[must_use]
    pub fn definition(&self) -> &Arc<NamedType> {
        &self.definition
    }

    #[must_use]
    pub fn type_arguments(&self) -> &[Type] {
        &self.type_arguments
    }
}

/// A multi-dimensional array, written `T[*]` for rank one and `T[,]`,
/// `T[,,]`, ... above that.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArrayType {
    element: Type,
    rank: usize,
}

impl ArrayType {
    /// # Panics
    ///
    /// Panics if `rank` is zero or `element` is a by-ref type.
    pub fn new(element: impl Into<Type>, rank: usize) -> Self {
        assert!(rank >= 1, "array rank must be at least 1");
        Self {
            element: checked_element(element.into()),
            rank,
        }
    }

    #[must_use]
    pub fn element(&self) -> &Type {
        &self.element
    }

    #[must_use]
    pub fn rank(&self) -> usize {
        self.rank
    }
}

/// A single-dimensional, zero-based array: `T[]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SzArrayType {
    element: Type,
}

impl SzArrayType {
    /// # Panics
    ///
    /// Panics if `element` is a by-ref type.
    pub fn new(element: impl Into<Type>) -> Self {
        Self {
            element: checked_element(element.into()),
        }
    }

    #[must_use]
    pub fn element(&self) -> &Type {
        &self.element
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PointerType {
    element: Type,
}

impl PointerType {
    /// # Panics
    ///
    /// Panics if `element` is a by-ref type.
    pub fn new(element: impl Into<Type>) -> Self {
        Self {
            element: checked_element(element.into()),
        }
    }

    #[must_use]
    pub fn element(&self) -> &Type {
        &self.element
    }
}

/// A managed reference, `T&`. Only ever the outermost shape of a type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ByRefType {
    element: Type,
}

impl ByRefType {
    /// # Panics
    ///
    /// Panics if `element` is itself a by-ref type.
    pub fn new(element: impl Into<Type>) -> Self {
        Self {
            element: checked_element(element.into()),
        }
    }

    #[must_use]
    pub fn element(&self) -> &Type {
        &self.element
    }
}

fn checked_element(element: Type) -> Type {
    assert!(
        element.kind() != TypeKind::ByRef,
        "a by-ref type can only appear as the outermost shape"
    );
    element
}

/// Shared handle to any type node.
///
/// Cloning a `Type` clones the handle, not the tree. `==` compares structure;
/// [`Type::ptr_eq`] compares identity, which is what the rewriter uses to
/// decide whether anything changed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Array(Arc<ArrayType>),
    ByRef(Arc<ByRefType>),
    Generic(Arc<GenericType>),
    Named(Arc<NamedType>),
    Pointer(Arc<PointerType>),
    SzArray(Arc<SzArrayType>),
}

impl Type {
    #[must_use]
    pub fn kind(&self) -> TypeKind {
        match self {
            Type::Array(_) => TypeKind::Array,
            Type::ByRef(_) => TypeKind::ByRef,
            Type::Generic(_) => TypeKind::Generic,
            Type::Named(_) => TypeKind::Named,
            Type::Pointer(_) => TypeKind::Pointer,
            Type::SzArray(_) => TypeKind::SzArray,
        }
    }

    /// True when both handles point at the same node.
    #[must_use]
    pub fn ptr_eq(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Array(a), Type::Array(b)) => Arc::ptr_eq(a, b),
            (Type::ByRef(a), Type::ByRef(b)) => Arc::ptr_eq(a, b),
            (Type::Generic(a), Type::Generic(b)) => Arc::ptr_eq(a, b),
            (Type::Named(a), Type::Named(b)) => Arc::ptr_eq(a, b),
            (Type::Pointer(a), Type::Pointer(b)) => Arc::ptr_eq(a, b),
            (Type::SzArray(a), Type::SzArray(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// The wrapped element for arrays, pointers and by-refs.
    #[must_use]
    pub fn element_type(&self) -> Option<&Type> {
        match self {
            Type::Array(t) => Some(t.element()),
            Type::SzArray(t) => Some(t.element()),
            Type::Pointer(t) => Some(t.element()),
            Type::ByRef(t) => Some(t.element()),
            Type::Generic(_) | Type::Named(_) => None,
        }
    }

    #[must_use]
    pub fn as_named(&self) -> Option<&Arc<NamedType>> {
        match self {
            Type::Named(named) => Some(named),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_generic(&self) -> Option<&Arc<GenericType>> {
        match self {
            Type::Generic(generic) => Some(generic),
            _ => None,
        }
    }

    /// Dispatches to the `visit_*` method matching this node's variant.
    pub fn accept<C, V>(&self, visitor: &mut V, cx: &mut C) -> V::Output
    where
        C: ?Sized,
        V: TypeVisitor<C> + ?Sized,
    {
        match self {
            Type::Array(t) => visitor.visit_array(t, cx),
            Type::ByRef(t) => visitor.visit_by_ref(t, cx),
            Type::Generic(t) => visitor.visit_generic(t, cx),
            Type::Named(t) => visitor.visit_named(t, cx),
            Type::Pointer(t) => visitor.visit_pointer(t, cx),
            Type::SzArray(t) => visitor.visit_sz_array(t, cx),
        }
    }
}

macro_rules! type_from {
    ($($node:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<Arc<$node>> for Type {
                fn from(node: Arc<$node>) -> Self {
                    Type::$variant(node)
                }
            }

            impl From<$node> for Type {
                fn from(node: $node) -> Self {
                    Type::$variant(Arc::new(node))
                }
            }
        )*
    };
}

type_from! {
    ArrayType => Array,
    ByRefType => ByRef,
    GenericType => Generic,
    NamedType => Named,
    PointerType => Pointer,
    SzArrayType => SzArray,
}

/// One method per node variant, each receiving a caller-chosen context.
///
/// The formatter, the assembly locator and the tree serializer are all
/// visitors; [`Type::accept`] does the dispatch.
pub trait TypeVisitor<C: ?Sized> {
    type Output;

    fn visit_array(&mut self, ty: &Arc<ArrayType>, cx: &mut C) -> Self::Output;
    fn visit_by_ref(&mut self, ty: &Arc<ByRefType>, cx: &mut C) -> Self::Output;
    fn visit_generic(&mut self, ty: &Arc<GenericType>, cx: &mut C) -> Self::Output;
    fn visit_named(&mut self, ty: &Arc<NamedType>, cx: &mut C) -> Self::Output;
    fn visit_pointer(&mut self, ty: &Arc<PointerType>, cx: &mut C) -> Self::Output;
    fn visit_sz_array(&mut self, ty: &Arc<SzArrayType>, cx: &mut C) -> Self::Output;
}
