use clr_typename::factory::*;
use clr_typename::{parse_type_name, Assembly, NamedType, Rewriter, Type};
use proptest::prelude::*;
use std::sync::Arc;

// Identifiers include every delimiter and some non-ASCII text. Whitespace is
// left out because it is skipped after the commas of an assembly clause.
fn identifier() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_.`\\\\\\[\\],+&*=\"äλ]{1,8}"
}

fn value() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_.\\\\\\[\\],+&*=\" ]{0,8}"
}

fn assembly_name() -> impl Strategy<Value = Arc<Assembly>> {
    (identifier(), prop::collection::vec((identifier(), value()), 0..3)).prop_map(
        |(name, qualifications)| {
            assembly(
                name,
                qualifications
                    .into_iter()
                    .map(|(name, value)| qualification(name, value)),
            )
        },
    )
}

/// A possibly nested named type whose root may carry an assembly.
fn named() -> impl Strategy<Value = Arc<NamedType>> {
    let root = (identifier(), prop::option::of(assembly_name()))
        .prop_map(|(name, assembly)| named_type(name, assembly));

    (root, prop::collection::vec(identifier(), 0..3)).prop_map(|(root, nested)| {
        nested.into_iter().fold(root, nested_type)
    })
}

fn maybe_by_ref(ty: impl Strategy<Value = Type>) -> impl Strategy<Value = Type> {
    (ty, any::<bool>()).prop_map(|(ty, by_ref)| if by_ref { by_ref_type(ty) } else { ty })
}

/// A type with no by-ref anywhere on its element chain.
fn shape() -> BoxedStrategy<Type> {
    let leaf = named().prop_map(Type::from);

    leaf.prop_recursive(4, 24, 3, |inner| {
        prop_oneof![
            (named(), prop::collection::vec(maybe_by_ref(inner.clone()), 1..3))
                .prop_map(|(definition, arguments)| generic_type(definition, arguments)),
            (inner.clone(), 1usize..4).prop_map(|(element, rank)| array_type(element, rank)),
            inner.clone().prop_map(sz_array_type),
            inner.prop_map(pointer_type),
        ]
    })
    .boxed()
}

fn any_type() -> impl Strategy<Value = Type> {
    maybe_by_ref(shape())
}

struct Identity;

impl Rewriter<()> for Identity {}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    #[test]
    fn parse_of_format_is_identity(ty in any_type()) {
        let text = ty.to_string();
        let parsed = parse_type_name(&text);
        prop_assert!(parsed.is_ok(), "{text:?} failed to parse: {:?}", parsed.err());
        prop_assert_eq!(parsed.unwrap(), ty, "text was {:?}", text);
    }

    #[test]
    fn format_of_parse_is_identity(ty in any_type()) {
        let canonical = ty.to_string();
        let reparsed = parse_type_name(&canonical).unwrap();
        prop_assert_eq!(reparsed.to_string(), canonical);
    }

    #[test]
    fn identity_rewrite_returns_same_node(ty in any_type()) {
        let result = Identity.rewrite_type(&ty, &mut ());
        prop_assert!(result.ptr_eq(&ty));
    }

    #[test]
    fn parser_never_panics(s in ".*") {
        let _ = parse_type_name(&s);
    }

    #[test]
    fn parser_never_panics_on_grammar_soup(s in "[A-Za-z`\\\\\\[\\],+&*=\" ]{0,24}") {
        if let Err(err) = parse_type_name(&s) {
            if let Some(position) = err.position() {
                prop_assert!(position <= s.len());
            }
        }
    }
}
