use crate::ast::*;
use crate::codec;
use std::borrow::Cow;
use std::fmt::{self, Display};
use std::sync::Arc;

/// Writes `ty` in canonical form, followed by its assembly clause if the root
/// named type carries one.
pub fn write_type<W>(out: &mut W, ty: &Type) -> fmt::Result
where
    W: fmt::Write + ?Sized,
{
    write_complex_type(out, ty)
}

/// Writes the assembly name and each qualification as `, Name=Value`.
pub fn write_assembly<W>(out: &mut W, assembly: &Assembly) -> fmt::Result
where
    W: fmt::Write + ?Sized,
{
    codec::write_identifier(out, &assembly.name)?;

    for qualification in &assembly.qualifications {
        out.write_str(", ")?;
        write_qualification(out, qualification)?;
    }

    Ok(())
}

#[must_use]
pub fn format_type(ty: &Type) -> String {
    ty.to_string()
}

/// Formats an assembly name, borrowing the name itself when there is nothing
/// to escape or append.
#[must_use]
pub fn format_assembly(assembly: &Assembly) -> Cow<'_, str> {
    if assembly.qualifications.is_empty() && !codec::contains_delimiter(&assembly.name) {
        return Cow::Borrowed(&assembly.name);
    }

    Cow::Owned(assembly.to_string())
}

impl Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_type(f, self)
    }
}

impl Display for Assembly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_assembly(f, self)
    }
}

impl Display for Qualification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_qualification(f, self)
    }
}

impl Type {
    /// The assembly that applies to this type as a whole: the one on the root
    /// of the named type reached through elements and generic definitions.
    #[must_use]
    pub fn assembly(&self) -> Option<Arc<Assembly>> {
        self.accept(&mut AssemblyLocator, &mut ())
    }
}

fn write_qualification<W>(out: &mut W, qualification: &Qualification) -> fmt::Result
where
    W: fmt::Write + ?Sized,
{
    codec::write_identifier(out, &qualification.name)?;
    out.write_char('=')?;
    codec::write_value(out, &qualification.value)
}

/// Shape, then the single trailing assembly clause.
fn write_complex_type<W>(out: &mut W, ty: &Type) -> fmt::Result
where
    W: fmt::Write + ?Sized,
{
    ty.accept(&mut Writer, out)?;

    if let Some(assembly) = ty.assembly() {
        out.write_str(", ")?;
        write_assembly(out, &assembly)?;
    }

    Ok(())
}

/// Emits the shape of a type without any assembly clause.
struct Writer;

impl<W> TypeVisitor<W> for Writer
where
    W: fmt::Write + ?Sized,
{
    type Output = fmt::Result;

    fn visit_array(&mut self, ty: &Arc<ArrayType>, out: &mut W) -> fmt::Result {
        ty.element().accept(self, out)?;
        out.write_char('[')?;

        if ty.rank() == 1 {
            out.write_char('*')?;
        } else {
            for _ in 1..ty.rank() {
                out.write_char(',')?;
            }
        }

        out.write_char(']')
    }

    fn visit_by_ref(&mut self, ty: &Arc<ByRefType>, out: &mut W) -> fmt::Result {
        ty.element().accept(self, out)?;
        out.write_char('&')
    }

    fn visit_generic(&mut self, ty: &Arc<GenericType>, out: &mut W) -> fmt::Result {
        self.visit_named(ty.definition(), out)?;

        let Some((first, rest)) = ty.type_arguments().split_first() else {
            return Ok(());
        };

        out.write_str("[[")?;
        write_complex_type(out, first)?;

        for argument in rest {
            out.write_str("],[")?;
            write_complex_type(out, argument)?;
        }

        out.write_str("]]")
    }

    fn visit_named(&mut self, ty: &Arc<NamedType>, out: &mut W) -> fmt::Result {
        if let Some(declaring) = ty.declaring_type() {
            self.visit_named(declaring, out)?;
            out.write_char('+')?;
        }

        codec::write_identifier(out, ty.name())
    }

    fn visit_pointer(&mut self, ty: &Arc<PointerType>, out: &mut W) -> fmt::Result {
        ty.element().accept(self, out)?;
        out.write_char('*')
    }

    fn visit_sz_array(&mut self, ty: &Arc<SzArrayType>, out: &mut W) -> fmt::Result {
        ty.element().accept(self, out)?;
        out.write_str("[]")
    }
}

/// Walks elements and generic definitions down to a named type, then up its
/// declaring chain to the root, which is where a parsed assembly lives.
struct AssemblyLocator;

impl TypeVisitor<()> for AssemblyLocator {
    type Output = Option<Arc<Assembly>>;

    fn visit_array(&mut self, ty: &Arc<ArrayType>, cx: &mut ()) -> Self::Output {
        ty.element().accept(self, cx)
    }

    fn visit_by_ref(&mut self, ty: &Arc<ByRefType>, cx: &mut ()) -> Self::Output {
        ty.element().accept(self, cx)
    }

    fn visit_generic(&mut self, ty: &Arc<GenericType>, _: &mut ()) -> Self::Output {
        ty.definition().root().assembly().cloned()
    }

    fn visit_named(&mut self, ty: &Arc<NamedType>, _: &mut ()) -> Self::Output {
        ty.root().assembly().cloned()
    }

    fn visit_pointer(&mut self, ty: &Arc<PointerType>, cx: &mut ()) -> Self::Output {
        ty.element().accept(self, cx)
    }

    fn visit_sz_array(&mut self, ty: &Arc<SzArrayType>, cx: &mut ()) -> Self::Output {
        ty.element().accept(self, cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar() -> Arc<Assembly> {
        Arc::new(Assembly::new("Bar", vec![]))
    }

    fn foo(assembly: Option<Arc<Assembly>>) -> Arc<NamedType> {
        Arc::new(NamedType::new("Foo", assembly))
    }

    #[test]
    fn test_array_ranks() {
        assert_eq!(format_type(&ArrayType::new(foo(None), 1).into()), "Foo[*]");
        assert_eq!(format_type(&ArrayType::new(foo(None), 3).into()), "Foo[,,]");
        assert_eq!(format_type(&SzArrayType::new(foo(None)).into()), "Foo[]");
    }

    #[test]
    fn test_assembly_follows_whole_shape() {
        let ty: Type = ByRefType::new(PointerType::new(SzArrayType::new(foo(Some(bar()))))).into();
        assert_eq!(format_type(&ty), "Foo[]*&, Bar");
    }

    #[test]
    fn test_nested_assembly_comes_from_root() {
        let nested = NamedType::nested(foo(Some(bar())), "Baz");
        assert_eq!(format_type(&nested.into()), "Foo+Baz, Bar");
    }

    #[test]
    fn test_format_assembly_borrows_simple_names() {
        let assembly = Assembly::new("Foo", vec![]);
        match format_assembly(&assembly) {
            Cow::Borrowed(name) => assert!(std::ptr::eq(name, assembly.name.as_str())),
            Cow::Owned(_) => panic!("simple assembly name should not allocate"),
        }
    }

    #[test]
    fn test_format_assembly_escapes_when_needed() {
        let assembly = Assembly::new("Foo,Bar", vec![]);
        assert_eq!(format_assembly(&assembly), "Foo\\,Bar");
    }

    #[test]
    fn test_located_assembly_is_shared() {
        let assembly = bar();
        let ty: Type = PointerType::new(foo(Some(assembly.clone()))).into();
        assert!(Arc::ptr_eq(&ty.assembly().unwrap(), &assembly));
    }
}
