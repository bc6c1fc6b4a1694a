//! IEC 61131 data type declarations
//!
//! Parses the subset of `TYPE ... END_TYPE` blocks used to describe PLC
//! variables:
//!
//! ```text
//! TYPE
//!     Point : STRUCT
//!         X : INT;
//!         Y : INT;
//!     END_STRUCT
//!     Track : ARRAY[1..10] OF Point;
//!     Speed : LREAL;            // alias of an elementary type
//! END_TYPE
//! ```
//!
//! `//` and `#` comment out the rest of a line, `/* */` and `(* *)` may
//! span lines.
//! Keywords are case-insensitive; type names are case-sensitive.

use rsc_core::{Result, RscError, RscType};

/// Largest element count an array declaration may have
///
/// Array lengths travel as a signed 32-bit integer.
pub const MAX_ARRAY_SIZE: usize = i32::MAX as usize;

/// A parsed data type
#[derive(Debug, Clone, PartialEq)]
pub struct DataType {
    /// Type name; empty for an anonymous inline type
    pub name: String,
    /// Shape of the type
    pub kind: DataTypeKind,
}

/// Shape of a parsed data type
#[derive(Debug, Clone, PartialEq)]
pub enum DataTypeKind {
    /// Elementary IEC type
    Elementary(RscType),
    /// `ARRAY[lower..upper] OF element`
    Array {
        /// Lower bound, inclusive
        lower: i64,
        /// Upper bound, inclusive
        upper: i64,
        /// Element type
        element: Box<DataType>,
    },
    /// `STRUCT ... END_STRUCT`
    Struct {
        /// Fields in declared order
        fields: Vec<Field>,
    },
}

/// Named member of a struct type
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Field name
    pub name: String,
    /// Field type
    pub ty: DataType,
}

impl DataType {
    /// Wire type of values of this type
    pub fn rsc_type(&self) -> RscType {
        match &self.kind {
            DataTypeKind::Elementary(t) => *t,
            DataTypeKind::Array { .. } => RscType::Array,
            DataTypeKind::Struct { .. } => RscType::Struct,
        }
    }

    /// Element count of an array type
    pub fn array_size(&self) -> Option<usize> {
        match &self.kind {
            DataTypeKind::Array { lower, upper, .. } => bounds_size(*lower, *upper),
            _ => None,
        }
    }

    /// Declared lower bound of an array type
    pub fn lower_bound(&self) -> Option<i64> {
        match &self.kind {
            DataTypeKind::Array { lower, .. } => Some(*lower),
            _ => None,
        }
    }

    /// Position in the element list of an IEC array index
    ///
    /// `None` for non-array types and for indices outside the bounds.
    pub fn element_position(&self, index: i64) -> Option<usize> {
        match &self.kind {
            DataTypeKind::Array { lower, upper, .. } if (*lower..=*upper).contains(&index) => {
                usize::try_from(index.checked_sub(*lower)?).ok()
            }
            _ => None,
        }
    }
}

/// Element count of `[lower..upper]`, `None` on overflow
fn bounds_size(lower: i64, upper: i64) -> Option<usize> {
    let span = upper.checked_sub(lower)?.checked_add(1)?;
    usize::try_from(span).ok()
}

/// Map an elementary IEC type name to its wire type
pub fn elementary_type(name: &str) -> Option<RscType> {
    let t = match name.to_ascii_uppercase().as_str() {
        "BOOL" => RscType::Bool,
        "SINT" => RscType::Int8,
        "INT" => RscType::Int16,
        "DINT" => RscType::Int32,
        "LINT" => RscType::Int64,
        "USINT" | "BYTE" => RscType::Uint8,
        "UINT" | "WORD" => RscType::Uint16,
        "UDINT" | "DWORD" => RscType::Uint32,
        "ULINT" | "LWORD" => RscType::Uint64,
        "REAL" => RscType::Real32,
        "LREAL" => RscType::Real64,
        "STRING" => RscType::Utf8String,
        "TIME" => RscType::IecTime,
        "LTIME" => RscType::IecTime64,
        "LDATE" => RscType::IecDate64,
        "LDT" => RscType::IecDateTime64,
        "LTOD" => RscType::IecTimeOfDay64,
        _ => return None,
    };
    Some(t)
}

fn schema_error(msg: impl Into<String>) -> RscError {
    RscError::Schema(msg.into())
}

/// Remove `//`, `#`, `/* */` and `(* *)` comments
fn strip_comments(text: &str) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    // closing character of the open block comment
    let mut block: Option<char> = None;
    while let Some(c) = chars.next() {
        let next = chars.peek().copied();
        if let Some(close) = block {
            if c == '*' && next == Some(close) {
                chars.next();
                block = None;
                out.push(' ');
            }
            continue;
        }
        match (c, next) {
            ('/', Some('*')) => {
                chars.next();
                block = Some('/');
            }
            ('(', Some('*')) => {
                chars.next();
                block = Some(')');
            }
            ('*', Some('/')) => return Err(schema_error("'*/' without matching '/*'")),
            ('*', Some(')')) => return Err(schema_error("'*)' without matching '(*'")),
            ('/', Some('/')) | ('#', _) => {
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            _ => out.push(c),
        }
    }
    if block.is_some() {
        return Err(schema_error("unterminated block comment"));
    }
    Ok(out)
}

fn is_symbol(c: char) -> bool {
    matches!(c, ';' | ':' | '[' | ']' | '=' | ',')
}

/// Split into identifiers, numbers and symbols, dropping TYPE labels
fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if is_symbol(c) {
            tokens.push(c.to_string());
            chars.next();
        } else if c == '.' {
            chars.next();
            if chars.peek() == Some(&'.') {
                chars.next();
                tokens.push("..".to_string());
            } else {
                tokens.push(".".to_string());
            }
        } else {
            let mut word = String::new();
            while let Some(&w) = chars.peek() {
                if w.is_whitespace() || is_symbol(w) || w == '.' {
                    break;
                }
                word.push(w);
                chars.next();
            }
            tokens.push(word);
        }
    }
    tokens.retain(|t| !t.eq_ignore_ascii_case("TYPE") && !t.eq_ignore_ascii_case("END_TYPE"));
    tokens
}

struct Cursor<'t> {
    tokens: &'t [String],
    pos: usize,
}

impl<'t> Cursor<'t> {
    fn peek(&self) -> Option<&'t str> {
        self.tokens.get(self.pos).map(String::as_str)
    }

    fn peek_at(&self, offset: usize) -> Option<&'t str> {
        self.tokens.get(self.pos + offset).map(String::as_str)
    }

    fn take(&mut self) -> Result<&'t str> {
        let token = self
            .peek()
            .ok_or_else(|| schema_error("unexpected end of declarations"))?;
        self.pos += 1;
        Ok(token)
    }

    fn expect(&mut self, keyword: &str) -> Result<()> {
        let token = self.take()?;
        if token.eq_ignore_ascii_case(keyword) {
            Ok(())
        } else {
            Err(schema_error(format!("expected '{}', found '{}'", keyword, token)))
        }
    }

    fn skip_optional(&mut self, keyword: &str) {
        if self.peek().is_some_and(|t| t.eq_ignore_ascii_case(keyword)) {
            self.pos += 1;
        }
    }

    fn is_done(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn integer(&mut self) -> Result<i64> {
        let token = self.take()?;
        token
            .parse::<i64>()
            .map_err(|_| schema_error(format!("expected an array bound, found '{}'", token)))
    }
}

/// Resolves type names against declarations seen so far
pub(crate) trait TypeLookup {
    fn lookup(&self, name: &str) -> Option<&DataType>;
}

/// Parse one `Name : <type> [;]` member as a name and its type
fn parse_member<L: TypeLookup>(cursor: &mut Cursor<'_>, known: &L) -> Result<Field> {
    let name = cursor.take()?.to_string();
    cursor.expect(":")?;
    let ty = parse_type(&name, cursor, known)?;
    cursor.skip_optional(";");
    Ok(Field { name, ty })
}

/// Parse one top-level declaration; an alias takes the declared name
fn parse_declaration<L: TypeLookup>(cursor: &mut Cursor<'_>, known: &L) -> Result<DataType> {
    let Field { name, mut ty } = parse_member(cursor, known)?;
    ty.name = name;
    Ok(ty)
}

/// Parse a type expression
///
/// Inline ARRAY and STRUCT types are named `name`; a reference to a
/// declared type keeps the declared type's name.
fn parse_type<L: TypeLookup>(name: &str, cursor: &mut Cursor<'_>, known: &L) -> Result<DataType> {
    let family = cursor.take()?;
    let kind = if family.eq_ignore_ascii_case("ARRAY") {
        cursor.expect("[")?;
        let lower = cursor.integer()?;
        cursor.expect("..")?;
        let upper = cursor.integer()?;
        cursor.expect("]")?;
        cursor.expect("OF")?;
        if upper < lower {
            return Err(schema_error(format!(
                "array {} has empty bounds [{}..{}]",
                name, lower, upper
            )));
        }
        match bounds_size(lower, upper) {
            Some(size) if size <= MAX_ARRAY_SIZE => {}
            _ => {
                return Err(schema_error(format!(
                    "array {} bounds [{}..{}] exceed {} elements",
                    name, lower, upper, MAX_ARRAY_SIZE
                )))
            }
        }
        let element = parse_type("", cursor, known)?;
        DataTypeKind::Array {
            lower,
            upper,
            element: Box::new(element),
        }
    } else if family.eq_ignore_ascii_case("STRUCT") {
        let mut fields = Vec::new();
        while !cursor
            .peek()
            .is_some_and(|t| t.eq_ignore_ascii_case("END_STRUCT"))
        {
            if cursor.is_done() {
                return Err(schema_error(format!("struct {} misses END_STRUCT", name)));
            }
            fields.push(parse_member(cursor, known)?);
        }
        cursor.expect("END_STRUCT")?;
        DataTypeKind::Struct { fields }
    } else if let Some(t) = elementary_type(family) {
        DataTypeKind::Elementary(t)
    } else if let Some(declared) = known.lookup(family) {
        return Ok(declared.clone());
    } else {
        return Err(schema_error(format!("unknown type '{}'", family)));
    };
    Ok(DataType {
        name: name.to_string(),
        kind,
    })
}

/// Parse all top-level declarations, in order
///
/// Later declarations may refer to earlier ones by name.
pub fn parse_declarations(text: &str) -> Result<Vec<DataType>> {
    struct Declared(Vec<DataType>);

    impl TypeLookup for Declared {
        fn lookup(&self, name: &str) -> Option<&DataType> {
            self.0.iter().rev().find(|t| t.name == name)
        }
    }

    let tokens = tokenize(&strip_comments(text)?);
    let mut cursor = Cursor {
        tokens: &tokens,
        pos: 0,
    };
    let mut declared = Declared(Vec::new());
    while !cursor.is_done() {
        if cursor.peek_at(1) != Some(":") {
            return Err(schema_error(format!(
                "expected a declaration, found '{}'",
                cursor.peek().unwrap_or_default()
            )));
        }
        let ty = parse_declaration(&mut cursor, &declared)?;
        declared.0.push(ty);
    }
    Ok(declared.0)
}
