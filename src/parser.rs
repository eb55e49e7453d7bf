use crate::ast::*;
use crate::codec::Delimiters;
use crate::error::InvalidTypeName;
use log::{debug, trace};
use miette::NamedSource;
use std::sync::Arc;

/// A recursive descent parser for assembly-qualified type names.
///
/// ```text
/// QualifiedType   ::= Type [ "," Assembly ]
/// Type            ::= Identifier { "+" Identifier } [ TypeArguments ] { "*" | ArrayShape } [ "&" ]
/// TypeArguments   ::= "[" TypeArgument { "," TypeArgument } "]"
/// TypeArgument    ::= "[" QualifiedType "]" | Type
/// ArrayShape      ::= "[" "]" | "[" [ "*" ] { "," [ "*" ] } "]"
/// Assembly        ::= Identifier { "," Qualification }
/// Qualification   ::= Quotable "=" Quotable
/// Quotable        ::= Identifier | '"' QuotedIdentifier '"'
/// ```
///
/// The comma is overloaded (assembly separator, qualification separator and
/// type-argument separator), so before descending into a qualified type the
/// parser scans ahead for a comma at bracket depth zero outside quotes.
/// How many type-argument lists may enclose one another.
pub const MAX_NESTING_DEPTH: usize = 128;

#[derive(Debug)]
pub struct Parser<'a> {
    source_name: String,
    text: &'a str,
    bytes: &'a [u8],
    position: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(text: &'a str) -> Self {
        Self::new_with_name(text, "type name".to_string())
    }

    /// `name` labels the source in rendered diagnostics.
    pub fn new_with_name(text: &'a str, name: String) -> Self {
        Self {
            source_name: name,
            text,
            bytes: text.as_bytes(),
            position: 0,
            depth: 0,
        }
    }

    // === Entry Points ===

    /// Parses the whole input as a (possibly assembly-qualified) type name.
    pub fn parse_type(&mut self) -> Result<Type, InvalidTypeName> {
        let result = self.parse_qualified()?;
        self.expect_end()?;
        Ok(result)
    }

    /// Parses the whole input as an assembly name with its qualifications.
    pub fn parse_assembly(&mut self) -> Result<Assembly, InvalidTypeName> {
        let result = self.parse_assembly_clause()?;
        self.expect_end()?;
        Ok(result)
    }

    // === Grammar Rules ===

    /// QualifiedType ::= Type [ "," Assembly ]
    ///
    /// The assembly is parsed first so it can be attached to the root named
    /// type while the shape is being built.
    fn parse_qualified(&mut self) -> Result<Type, InvalidTypeName> {
        let start = self.position;

        let Some(assembly_start) = locate_assembly_start(self.bytes, start) else {
            trace!("no assembly clause after position {start}");
            return self.parse_unqualified(None);
        };
        trace!("assembly clause starts at position {assembly_start}");

        self.position = assembly_start + 1;
        self.skip_whitespace();
        let assembly = self.parse_assembly_clause()?;
        let assembly_end = self.position;

        self.position = start;
        let result = self.parse_unqualified(Some(Arc::new(assembly)))?;

        if self.position != assembly_start {
            return Err(self.unexpected_char(self.position));
        }

        self.position = assembly_end;
        Ok(result)
    }

    /// Type ::= Identifier { "+" Identifier } [ TypeArguments ] { "*" | ArrayShape } [ "&" ]
    fn parse_unqualified(
        &mut self,
        assembly: Option<Arc<Assembly>>,
    ) -> Result<Type, InvalidTypeName> {
        let name = self.parse_identifier()?;
        let mut head = Arc::new(NamedType::new(name, assembly));

        while self.match_char(b'+') {
            let name = self.parse_identifier()?;
            head = Arc::new(NamedType::nested(head, name));
        }

        let mut result = if self.at_type_arguments() {
            let type_arguments = self.parse_type_arguments()?;
            Type::from(GenericType::new(head, type_arguments))
        } else {
            Type::Named(head)
        };

        while let Some(&c) = self.bytes.get(self.position) {
            match c {
                b'*' => {
                    self.position += 1;
                    result = PointerType::new(result).into();
                }
                b'[' => result = self.parse_array_shape(result)?,
                _ => break,
            }
        }

        if self.match_char(b'&') {
            result = ByRefType::new(result).into();
        }

        Ok(result)
    }

    /// A `[` opens type arguments unless it is immediately followed by one of
    /// the characters that can start an array shape.
    fn at_type_arguments(&self) -> bool {
        matches!(
            self.bytes.get(self.position..self.position + 2),
            Some(&[b'[', next]) if !matches!(next, b']' | b',' | b'*')
        )
    }

    /// ArrayShape ::= "[" "]" | "[" [ "*" ] { "," [ "*" ] } "]"
    fn parse_array_shape(&mut self, element: Type) -> Result<Type, InvalidTypeName> {
        self.expect_char(b'[')?;

        if self.match_char(b']') {
            return Ok(SzArrayType::new(element).into());
        }

        let mut rank = 1;
        self.match_char(b'*');

        while self.match_char(b',') {
            rank += 1;
            self.match_char(b'*');
        }

        self.expect_char(b']')?;
        Ok(ArrayType::new(element, rank).into())
    }

    /// TypeArguments ::= "[" TypeArgument { "," TypeArgument } "]"
    fn parse_type_arguments(&mut self) -> Result<Vec<Type>, InvalidTypeName> {
        if self.depth == MAX_NESTING_DEPTH {
            return Err(self.too_deep(self.position));
        }

        self.expect_char(b'[')?;
        self.depth += 1;
        let mut type_arguments = Vec::new();

        loop {
            type_arguments.push(self.parse_type_argument()?);

            if !self.match_char(b',') {
                break;
            }
        }

        self.expect_char(b']')?;
        self.depth -= 1;
        Ok(type_arguments)
    }

    /// TypeArgument ::= "[" QualifiedType "]" | Type
    fn parse_type_argument(&mut self) -> Result<Type, InvalidTypeName> {
        if self.match_char(b'[') {
            let result = self.parse_qualified()?;
            self.expect_char(b']')?;
            Ok(result)
        } else {
            self.parse_unqualified(None)
        }
    }

    /// Assembly ::= Identifier { "," Qualification }
    fn parse_assembly_clause(&mut self) -> Result<Assembly, InvalidTypeName> {
        self.assert_not_eof(self.position)?;
        let name = self.parse_identifier()?;
        let mut qualifications = Vec::new();

        while self.match_char(b',') {
            self.skip_whitespace();
            qualifications.push(Arc::new(self.parse_qualification()?));
        }

        Ok(Assembly::new(name, qualifications))
    }

    /// Qualification ::= Quotable "=" Quotable
    fn parse_qualification(&mut self) -> Result<Qualification, InvalidTypeName> {
        self.assert_not_eof(self.position)?;
        let name = self.parse_quotable_identifier()?;
        self.expect_char(b'=')?;
        let value = self.parse_quotable_identifier()?;
        Ok(Qualification::new(name, value))
    }

    fn parse_quotable_identifier(&mut self) -> Result<String, InvalidTypeName> {
        if self.match_char(b'"') {
            let result = self.parse_identifier_core(Delimiters::Quoted)?;
            self.expect_char(b'"')?;
            return Ok(result);
        }

        self.parse_identifier()
    }

    fn parse_identifier(&mut self) -> Result<String, InvalidTypeName> {
        self.parse_identifier_core(Delimiters::All)
    }

    /// Reads up to the next unescaped delimiter, which is left unconsumed.
    ///
    /// Without escapes the identifier is a direct slice of the input; each
    /// backslash flushes the pending slice into a buffer and takes the next
    /// character verbatim.
    fn parse_identifier_core(&mut self, delimiters: Delimiters) -> Result<String, InvalidTypeName> {
        self.assert_not_eof(self.position)?;

        let mut start = self.position;
        let mut index = self.position;
        let mut unescaped: Option<String> = None;

        loop {
            let Some(offset) = delimiters.find(&self.bytes[index..]) else {
                index = self.bytes.len();
                break;
            };

            index += offset;

            if self.bytes[index] != b'\\' {
                break;
            }

            unescaped
                .get_or_insert_with(String::new)
                .push_str(&self.text[start..index]);
            start = index + 1;

            self.assert_not_eof(start)?;
            // The escaped character is kept as part of the next slice.
            index = start + 1;
        }

        self.position = index;
        let section = &self.text[start..index];

        Ok(match unescaped {
            Some(mut buffer) => {
                buffer.push_str(section);
                buffer
            }
            None => section.to_string(),
        })
    }

    // === Character Helpers ===

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.text[self.position..].chars().next() {
            if !c.is_whitespace() {
                break;
            }
            self.position += c.len_utf8();
        }
    }

    fn match_char(&mut self, c: u8) -> bool {
        if self.bytes.get(self.position) == Some(&c) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    fn expect_char(&mut self, c: u8) -> Result<(), InvalidTypeName> {
        self.assert_not_eof(self.position)?;

        if self.bytes[self.position] != c {
            return Err(self.unexpected_char(self.position));
        }

        self.position += 1;
        Ok(())
    }

    fn expect_end(&self) -> Result<(), InvalidTypeName> {
        if self.position == self.bytes.len() {
            return Ok(());
        }

        debug!(
            "{} has trailing characters at position {}",
            self.source_name, self.position
        );
        Err(InvalidTypeName::TrailingCharacters {
            src: self.named_source(),
            span: (self.position, self.bytes.len() - self.position).into(),
            position: self.position,
        })
    }

    fn assert_not_eof(&self, index: usize) -> Result<(), InvalidTypeName> {
        if index < self.bytes.len() {
            return Ok(());
        }

        debug!("{} ended unexpectedly", self.source_name);
        Err(InvalidTypeName::UnexpectedEnd {
            src: self.named_source(),
            span: (self.bytes.len(), 0).into(),
        })
    }

    fn unexpected_char(&self, index: usize) -> InvalidTypeName {
        debug!(
            "{} has an unexpected character at position {}",
            self.source_name, index
        );
        let width = self.text[index..].chars().next().map_or(0, char::len_utf8);
        InvalidTypeName::UnexpectedChar {
            src: self.named_source(),
            span: (index, width).into(),
            position: index,
        }
    }

    fn too_deep(&self, index: usize) -> InvalidTypeName {
        debug!(
            "{} nests type arguments too deeply at position {}",
            self.source_name, index
        );
        InvalidTypeName::NestingTooDeep {
            src: self.named_source(),
            span: (index, 1).into(),
            position: index,
            limit: MAX_NESTING_DEPTH,
        }
    }

    // Only built on the error path.
    fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(self.source_name.clone(), self.text.to_string())
    }
}

/// Finds the comma that separates a type from its assembly clause.
///
/// Scans from `index`, skipping escaped characters, ignoring everything inside
/// `"..."`, and tracking bracket depth. Returns `None` when the input ends
/// first or when a `]` closes a bracket opened before `index` (the enclosing
/// type-argument list owns it).
pub(crate) fn locate_assembly_start(bytes: &[u8], mut index: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quoted = false;

    while index < bytes.len() {
        match bytes[index] {
            b'\\' => {
                index += 2;
                continue;
            }
            b'"' => quoted = !quoted,
            _ if quoted => {}
            b'[' => depth += 1,
            b']' => {
                if depth == 0 {
                    return None;
                }
                depth -= 1;
            }
            b',' if depth == 0 => return Some(index),
            _ => {}
        }

        index += 1;
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use miette::Report;

    fn parse_ok(text: &str) -> Type {
        match Parser::new(text).parse_type() {
            Ok(result) => result,
            Err(err) => {
                let report = Report::from(err);
                panic!("{:?}", report);
            }
        }
    }

    fn named(ty: &Type) -> &NamedType {
        ty.as_named().expect("expected a named type")
    }

    #[test]
    fn test_locator_skips_generic_arguments() {
        let text = b"Foo`1[[Bar, BarLib]], FooLib";
        assert_eq!(locate_assembly_start(text, 0), Some(20));
    }

    #[test]
    fn test_locator_respects_quotes_and_escapes() {
        assert_eq!(locate_assembly_start(b"Foo\\, Bar", 0), None);
        assert_eq!(locate_assembly_start(br#"Foo"," , X"#, 0), Some(7));
    }

    #[test]
    fn test_locator_stops_at_unbalanced_bracket() {
        assert_eq!(locate_assembly_start(b"Bar], Baz", 0), None);
    }

    #[test]
    fn test_simple_name() {
        let ty = parse_ok("Foo.Bar");
        assert_eq!(named(&ty).name(), "Foo.Bar");
        assert!(named(&ty).assembly().is_none());
    }

    #[test]
    fn test_escaped_identifier() {
        let ty = parse_ok("Foo\\+Bar\\\\Baz");
        assert_eq!(named(&ty).name(), "Foo+Bar\\Baz");
    }

    #[test]
    fn test_nested_chain_carries_assembly_on_root() {
        let ty = parse_ok("A+B+C, Lib");
        let c = named(&ty);
        let b = c.declaring_type().unwrap();
        let a = b.declaring_type().unwrap();
        assert_eq!((a.name(), b.name(), c.name()), ("A", "B", "C"));
        assert!(c.assembly().is_none());
        assert!(b.assembly().is_none());
        assert_eq!(a.assembly().unwrap().name, "Lib");
    }

    #[test]
    fn test_bare_type_arguments() {
        let ty = parse_ok("Foo`2[Bar,Baz[]]");
        let generic = ty.as_generic().unwrap();
        assert_eq!(generic.type_arguments().len(), 2);
        assert_eq!(generic.type_arguments()[1].kind(), TypeKind::SzArray);
    }

    #[test]
    fn test_pointer_array_by_ref_order() {
        let ty = parse_ok("Foo*[,][]&");
        let Type::ByRef(by_ref) = &ty else { panic!() };
        let Type::SzArray(vector) = by_ref.element() else { panic!() };
        let Type::Array(array) = vector.element() else { panic!() };
        assert_eq!(array.rank(), 2);
        assert_eq!(array.element().kind(), TypeKind::Pointer);
    }

    #[test]
    fn test_star_ranks() {
        let Type::Array(array) = parse_ok("Foo[*,*,*]") else { panic!() };
        assert_eq!(array.rank(), 3);
    }

    #[test]
    fn test_whitespace_after_commas_in_assembly_clause() {
        let assembly = Parser::new("Foo,   Culture=neutral,\tVersion=1.0")
            .parse_assembly()
            .unwrap();
        assert_eq!(assembly.name, "Foo");
        assert_eq!(assembly.qualification("Culture"), Some("neutral"));
        assert_eq!(assembly.qualification("Version"), Some("1.0"));
    }

    #[test]
    fn test_empty_unquoted_value() {
        let assembly = Parser::new("Foo, X=,Y=1").parse_assembly().unwrap();
        assert_eq!(assembly.qualification("X"), Some(""));
        assert_eq!(assembly.qualification("Y"), Some("1"));
    }

    #[test]
    fn test_by_ref_must_be_last() {
        let err = Parser::new("Foo&*").parse_type().unwrap_err();
        assert!(matches!(
            err,
            InvalidTypeName::TrailingCharacters { position: 4, .. }
        ));
    }

    #[test]
    fn test_unterminated_quote() {
        let err = Parser::new("Foo, A=\"abc").parse_assembly().unwrap_err();
        assert!(matches!(err, InvalidTypeName::UnexpectedEnd { .. }));
    }

    #[test]
    fn test_dangling_escape() {
        let err = Parser::new("Foo\\").parse_type().unwrap_err();
        assert!(matches!(err, InvalidTypeName::UnexpectedEnd { .. }));
    }

    #[test]
    fn test_shape_must_end_at_assembly_comma() {
        // The stray `]` hides the comma from the locator.
        let err = Parser::new("Foo]x, Bar").parse_type().unwrap_err();
        assert_eq!(err.position(), Some(3));
    }

    #[test]
    fn test_error_renders_with_source() {
        let err = Parser::new("Foo[,").parse_type().unwrap_err();
        let rendered = format!("{:?}", Report::from(err));
        assert!(rendered.contains("Unexpected end of format."));
    }
}
