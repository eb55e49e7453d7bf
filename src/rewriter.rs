//! Identity-preserving structural rewrites.
//!
//! Every default method rebuilds its node only when at least one child came
//! back as a different node (by `Arc` identity). An untouched subtree is
//! returned as the very same handle, so a rewrite that changes nothing costs
//! no allocation and callers can detect "no change" with [`Type::ptr_eq`].
//!
//! Implementors override the hooks they care about and call back into the
//! free `walk_*` functions (or the default behaviour of other hooks) for the
//! rest.

use crate::ast::*;
use std::borrow::Cow;
use std::sync::Arc;

pub trait Rewriter<C: ?Sized> {
    fn rewrite_type(&mut self, ty: &Type, cx: &mut C) -> Type {
        match ty {
            Type::Array(t) => self.rewrite_array(t, cx),
            Type::ByRef(t) => self.rewrite_by_ref(t, cx),
            Type::Generic(t) => self.rewrite_generic(t, cx),
            Type::Named(t) => Type::Named(self.rewrite_named(t, cx)),
            Type::Pointer(t) => self.rewrite_pointer(t, cx),
            Type::SzArray(t) => self.rewrite_sz_array(t, cx),
        }
    }

    fn rewrite_array(&mut self, ty: &Arc<ArrayType>, cx: &mut C) -> Type {
        walk_array(self, ty, cx)
    }

    fn rewrite_by_ref(&mut self, ty: &Arc<ByRefType>, cx: &mut C) -> Type {
        walk_by_ref(self, ty, cx)
    }

    fn rewrite_generic(&mut self, ty: &Arc<GenericType>, cx: &mut C) -> Type {
        walk_generic(self, ty, cx)
    }

    /// Named types stay named so they can keep serving as generic
    /// definitions and declaring types.
    fn rewrite_named(&mut self, ty: &Arc<NamedType>, cx: &mut C) -> Arc<NamedType> {
        walk_named(self, ty, cx)
    }

    fn rewrite_pointer(&mut self, ty: &Arc<PointerType>, cx: &mut C) -> Type {
        walk_pointer(self, ty, cx)
    }

    fn rewrite_sz_array(&mut self, ty: &Arc<SzArrayType>, cx: &mut C) -> Type {
        walk_sz_array(self, ty, cx)
    }

    /// `Cow::Borrowed` means every argument kept its identity.
    fn rewrite_type_arguments<'t>(&mut self, arguments: &'t [Type], cx: &mut C) -> Cow<'t, [Type]> {
        rewrite_sequence(arguments, Type::ptr_eq, |argument| {
            self.rewrite_type(argument, cx)
        })
    }

    fn rewrite_assembly(&mut self, assembly: &Arc<Assembly>, cx: &mut C) -> Arc<Assembly> {
        walk_assembly(self, assembly, cx)
    }

    fn rewrite_qualifications<'q>(
        &mut self,
        qualifications: &'q [Arc<Qualification>],
        cx: &mut C,
    ) -> Cow<'q, [Arc<Qualification>]> {
        rewrite_sequence(qualifications, Arc::ptr_eq, |qualification| {
            self.rewrite_qualification(qualification, cx)
        })
    }

    fn rewrite_qualification(
        &mut self,
        qualification: &Arc<Qualification>,
        _cx: &mut C,
    ) -> Arc<Qualification> {
        Arc::clone(qualification)
    }
}

pub fn walk_array<C, R>(rewriter: &mut R, ty: &Arc<ArrayType>, cx: &mut C) -> Type
where
    C: ?Sized,
    R: Rewriter<C> + ?Sized,
{
    let element = rewriter.rewrite_type(ty.element(), cx);

    if element.ptr_eq(ty.element()) {
        return Type::Array(Arc::clone(ty));
    }

    ArrayType::new(element, ty.rank()).into()
}

pub fn walk_by_ref<C, R>(rewriter: &mut R, ty: &Arc<ByRefType>, cx: &mut C) -> Type
where
    C: ?Sized,
    R: Rewriter<C> + ?Sized,
{
    let element = rewriter.rewrite_type(ty.element(), cx);

    if element.ptr_eq(ty.element()) {
        return Type::ByRef(Arc::clone(ty));
    }

    ByRefType::new(element).into()
}

pub fn walk_generic<C, R>(rewriter: &mut R, ty: &Arc<GenericType>, cx: &mut C) -> Type
where
    C: ?Sized,
    R: Rewriter<C> + ?Sized,
{
    let definition = rewriter.rewrite_named(ty.definition(), cx);
    let type_arguments = rewriter.rewrite_type_arguments(ty.type_arguments(), cx);

    if Arc::ptr_eq(&definition, ty.definition()) && matches!(type_arguments, Cow::Borrowed(_)) {
        return Type::Generic(Arc::clone(ty));
    }

    GenericType::new(definition, type_arguments.into_owned()).into()
}

/// Rebuilds a named type when its declaring type or its assembly changed.
pub fn walk_named<C, R>(rewriter: &mut R, ty: &Arc<NamedType>, cx: &mut C) -> Arc<NamedType>
where
    C: ?Sized,
    R: Rewriter<C> + ?Sized,
{
    match ty.scope() {
        NamedScope::DeclaringType(declaring) => {
            let rewritten = rewriter.rewrite_named(declaring, cx);

            if Arc::ptr_eq(&rewritten, declaring) {
                return Arc::clone(ty);
            }

            Arc::new(NamedType::nested(rewritten, ty.name()))
        }
        NamedScope::Assembly(assembly) => {
            let rewritten = rewriter.rewrite_assembly(assembly, cx);

            if Arc::ptr_eq(&rewritten, assembly) {
                return Arc::clone(ty);
            }

            Arc::new(NamedType::new(ty.name(), Some(rewritten)))
        }
        NamedScope::Unqualified => Arc::clone(ty),
    }
}

pub fn walk_pointer<C, R>(rewriter: &mut R, ty: &Arc<PointerType>, cx: &mut C) -> Type
where
    C: ?Sized,
    R: Rewriter<C> + ?Sized,
{
    let element = rewriter.rewrite_type(ty.element(), cx);

    if element.ptr_eq(ty.element()) {
        return Type::Pointer(Arc::clone(ty));
    }

    PointerType::new(element).into()
}

pub fn walk_sz_array<C, R>(rewriter: &mut R, ty: &Arc<SzArrayType>, cx: &mut C) -> Type
where
    C: ?Sized,
    R: Rewriter<C> + ?Sized,
{
    let element = rewriter.rewrite_type(ty.element(), cx);

    if element.ptr_eq(ty.element()) {
        return Type::SzArray(Arc::clone(ty));
    }

    SzArrayType::new(element).into()
}

pub fn walk_assembly<C, R>(rewriter: &mut R, assembly: &Arc<Assembly>, cx: &mut C) -> Arc<Assembly>
where
    C: ?Sized,
    R: Rewriter<C> + ?Sized,
{
    match rewriter.rewrite_qualifications(&assembly.qualifications, cx) {
        Cow::Borrowed(_) => Arc::clone(assembly),
        Cow::Owned(qualifications) => {
            Arc::new(Assembly::new(assembly.name.clone(), qualifications))
        }
    }
}

/// Maps `items`, copying into a new vector only from the first element that
/// `same` says was replaced.
fn rewrite_sequence<'s, T, F>(
    items: &'s [T],
    same: fn(&T, &T) -> bool,
    mut rewrite: F,
) -> Cow<'s, [T]>
where
    T: Clone,
    F: FnMut(&T) -> T,
{
    let mut rebuilt: Option<Vec<T>> = None;

    for (index, item) in items.iter().enumerate() {
        let result = rewrite(item);

        match &mut rebuilt {
            Some(rebuilt) => rebuilt.push(result),
            None if !same(&result, item) => {
                let mut fresh = Vec::with_capacity(items.len());
                fresh.extend_from_slice(&items[..index]);
                fresh.push(result);
                rebuilt = Some(fresh);
            }
            None => {}
        }
    }

    match rebuilt {
        Some(rebuilt) => Cow::Owned(rebuilt),
        None => Cow::Borrowed(items),
    }
}
