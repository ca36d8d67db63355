//! Object identifiers.
//!
//! Warehouse objects live in a containment hierarchy: account, database,
//! schema. An identifier names an object at one of those levels:
//!
//! | Type | Parts | Example |
//! |---|---|---|
//! | [`AccountObjectIdentifier`] | name | `"WH1"` |
//! | [`DatabaseObjectIdentifier`] | database, name | `"DB"."SC"` |
//! | [`SchemaObjectIdentifier`] | database, schema, name | `"DB"."SC"."T"` |
//! | [`SchemaObjectIdentifierWithArguments`] | database, schema, name, argument types | `"DB"."SC"."F"(NUMBER)` |
//!
//! Identifiers store their parts unquoted. The fully-qualified form always
//! double-quotes each part and doubles embedded quotes, so it can be parsed
//! back into an equal identifier.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Errors raised while building or parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    /// The input string is empty.
    #[error("identifier is empty")]
    Empty,

    /// One of the dot-separated parts is empty.
    #[error("part {index} of identifier `{input}` is empty")]
    EmptyPart {
        /// The input being parsed.
        input: String,
        /// Zero-based position of the empty part.
        index: usize,
    },

    /// A quoted part is never closed.
    #[error("unbalanced quotes in identifier `{0}`")]
    UnbalancedQuotes(String),

    /// The input has the wrong number of parts for the target type.
    #[error("expected {expected} identifier parts, found {found} in `{input}`")]
    PartCount {
        /// The input being parsed.
        input: String,
        /// Number of parts the target type needs.
        expected: usize,
        /// Number of parts found.
        found: usize,
    },

    /// The input is not a well-formed identifier.
    #[error("malformed identifier `{input}`: {reason}")]
    Malformed {
        /// The input being parsed.
        input: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// An options field holds an empty or partial identifier.
    #[error("{structure} field `{field}` does not hold a valid identifier")]
    InvalidField {
        /// Name of the options struct.
        structure: &'static str,
        /// Name of the offending field.
        field: &'static str,
    },
}

/// Quotes one identifier part, doubling embedded double quotes.
#[must_use]
pub fn quote_part(part: &str) -> String {
    format!("\"{}\"", part.replace('"', "\"\""))
}

/// Splits a dotted identifier into unquoted parts.
///
/// Quoted parts may contain dots and doubled quotes. Unquoted parts are taken
/// verbatim.
///
/// # Errors
///
/// Returns an error if the input or any part is empty, or if quoting is
/// unbalanced.
pub fn parse_parts(input: &str) -> Result<Vec<String>, IdentifierError> {
    if input.is_empty() {
        return Err(IdentifierError::Empty);
    }

    let mut parts = Vec::new();
    let mut chars = input.chars().peekable();
    loop {
        let mut part = String::new();
        if chars.peek() == Some(&'"') {
            chars.next();
            loop {
                match chars.next() {
                    None => return Err(IdentifierError::UnbalancedQuotes(input.to_string())),
                    Some('"') if chars.peek() == Some(&'"') => {
                        chars.next();
                        part.push('"');
                    }
                    Some('"') => break,
                    Some(c) => part.push(c),
                }
            }
            if !matches!(chars.peek(), None | Some('.')) {
                return Err(IdentifierError::Malformed {
                    input: input.to_string(),
                    reason: "unexpected character after closing quote",
                });
            }
        } else {
            while let Some(&c) = chars.peek() {
                match c {
                    '.' => break,
                    '"' => return Err(IdentifierError::UnbalancedQuotes(input.to_string())),
                    _ => {
                        part.push(c);
                        chars.next();
                    }
                }
            }
        }

        if part.is_empty() {
            return Err(IdentifierError::EmptyPart {
                input: input.to_string(),
                index: parts.len(),
            });
        }
        parts.push(part);

        // Only '.' or end of input can follow a part.
        if chars.next().is_none() {
            break;
        }
    }
    Ok(parts)
}

fn parse_exact<const N: usize>(input: &str) -> Result<[String; N], IdentifierError> {
    let parts = parse_parts(input)?;
    let found = parts.len();
    parts.try_into().map_err(|_| IdentifierError::PartCount {
        input: input.to_string(),
        expected: N,
        found,
    })
}

/// Splits a comma-separated list at nesting depth zero.
///
/// `NUMBER(38, 0), VARCHAR` yields `["NUMBER(38, 0)", "VARCHAR"]`.
#[must_use]
pub fn split_top_level(list: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut depth = 0_usize;
    let mut current = String::new();
    for c in list.chars() {
        match c {
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => {
                items.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    if !current.trim().is_empty() || !items.is_empty() {
        items.push(current.trim().to_string());
    }
    items
}

/// An ancestor of an identifier in the containment hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Ancestor {
    /// The schema containing a schema-level object.
    Schema(DatabaseObjectIdentifier),
    /// The database containing a database- or schema-level object.
    Database(AccountObjectIdentifier),
}

/// Capability shared by every identifier type.
pub trait ObjectIdentifier: fmt::Display + fmt::Debug + Clone + PartialEq + Send + Sync {
    /// Returns the unquoted leaf name.
    fn name(&self) -> &str;

    /// Returns the quoted, dot-joined form.
    fn fully_qualified_name(&self) -> String;

    /// Returns whether every part is non-empty.
    fn is_valid(&self) -> bool;

    /// Returns the containing objects, innermost first (schema, then database).
    fn ancestors(&self) -> Vec<Ancestor>;
}

/// Identifier of an account-level object (warehouse, database, role, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountObjectIdentifier {
    name: String,
}

impl AccountObjectIdentifier {
    /// Creates an identifier from its unquoted name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl ObjectIdentifier for AccountObjectIdentifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn fully_qualified_name(&self) -> String {
        quote_part(&self.name)
    }

    fn is_valid(&self) -> bool {
        !self.name.is_empty()
    }

    fn ancestors(&self) -> Vec<Ancestor> {
        Vec::new()
    }
}

impl FromStr for AccountObjectIdentifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [name] = parse_exact::<1>(s)?;
        Ok(Self { name })
    }
}

/// Identifier of an object inside a database (a schema, a database role).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DatabaseObjectIdentifier {
    database_name: String,
    name: String,
}

impl DatabaseObjectIdentifier {
    /// Creates an identifier from its unquoted parts.
    pub fn new(database_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            database_name: database_name.into(),
            name: name.into(),
        }
    }

    /// Returns the unquoted database name.
    #[must_use]
    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    /// Returns the containing database.
    #[must_use]
    pub fn database_id(&self) -> AccountObjectIdentifier {
        AccountObjectIdentifier::new(self.database_name.clone())
    }

    /// Returns the identifier one level up.
    #[must_use]
    pub fn parent(&self) -> AccountObjectIdentifier {
        self.database_id()
    }
}

impl ObjectIdentifier for DatabaseObjectIdentifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn fully_qualified_name(&self) -> String {
        format!("{}.{}", quote_part(&self.database_name), quote_part(&self.name))
    }

    fn is_valid(&self) -> bool {
        !self.database_name.is_empty() && !self.name.is_empty()
    }

    fn ancestors(&self) -> Vec<Ancestor> {
        vec![Ancestor::Database(self.database_id())]
    }
}

impl FromStr for DatabaseObjectIdentifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [database_name, name] = parse_exact::<2>(s)?;
        Ok(Self {
            database_name,
            name,
        })
    }
}

/// Identifier of an object inside a schema (table, alert, stage, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaObjectIdentifier {
    database_name: String,
    schema_name: String,
    name: String,
}

impl SchemaObjectIdentifier {
    /// Creates an identifier from its unquoted parts.
    pub fn new(
        database_name: impl Into<String>,
        schema_name: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            database_name: database_name.into(),
            schema_name: schema_name.into(),
            name: name.into(),
        }
    }

    /// Returns the unquoted database name.
    #[must_use]
    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    /// Returns the unquoted schema name.
    #[must_use]
    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    /// Returns the containing database.
    #[must_use]
    pub fn database_id(&self) -> AccountObjectIdentifier {
        AccountObjectIdentifier::new(self.database_name.clone())
    }

    /// Returns the containing schema.
    #[must_use]
    pub fn schema_id(&self) -> DatabaseObjectIdentifier {
        DatabaseObjectIdentifier::new(self.database_name.clone(), self.schema_name.clone())
    }

    /// Returns the identifier one level up.
    #[must_use]
    pub fn parent(&self) -> DatabaseObjectIdentifier {
        self.schema_id()
    }

    /// Attaches argument types, producing an overload-aware identifier.
    #[must_use]
    pub fn with_arguments(
        self,
        argument_data_types: Vec<String>,
    ) -> SchemaObjectIdentifierWithArguments {
        SchemaObjectIdentifierWithArguments {
            inner: self,
            argument_data_types,
        }
    }
}

impl ObjectIdentifier for SchemaObjectIdentifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn fully_qualified_name(&self) -> String {
        format!(
            "{}.{}.{}",
            quote_part(&self.database_name),
            quote_part(&self.schema_name),
            quote_part(&self.name)
        )
    }

    fn is_valid(&self) -> bool {
        !self.database_name.is_empty() && !self.schema_name.is_empty() && !self.name.is_empty()
    }

    fn ancestors(&self) -> Vec<Ancestor> {
        vec![
            Ancestor::Schema(self.schema_id()),
            Ancestor::Database(self.database_id()),
        ]
    }
}

impl FromStr for SchemaObjectIdentifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [database_name, schema_name, name] = parse_exact::<3>(s)?;
        Ok(Self {
            database_name,
            schema_name,
            name,
        })
    }
}

/// Identifier of an overloadable schema object (function, procedure).
///
/// Two overloads share database, schema and name and differ only in their
/// argument types.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaObjectIdentifierWithArguments {
    inner: SchemaObjectIdentifier,
    argument_data_types: Vec<String>,
}

impl SchemaObjectIdentifierWithArguments {
    /// Creates an identifier from its unquoted parts and argument types.
    pub fn new(
        database_name: impl Into<String>,
        schema_name: impl Into<String>,
        name: impl Into<String>,
        argument_data_types: Vec<String>,
    ) -> Self {
        SchemaObjectIdentifier::new(database_name, schema_name, name)
            .with_arguments(argument_data_types)
    }

    /// Returns the unquoted database name.
    #[must_use]
    pub fn database_name(&self) -> &str {
        self.inner.database_name()
    }

    /// Returns the unquoted schema name.
    #[must_use]
    pub fn schema_name(&self) -> &str {
        self.inner.schema_name()
    }

    /// Returns the argument types in declaration order.
    #[must_use]
    pub fn argument_data_types(&self) -> &[String] {
        &self.argument_data_types
    }

    /// Returns the identifier without its argument list.
    #[must_use]
    pub fn schema_object_id(&self) -> SchemaObjectIdentifier {
        self.inner.clone()
    }

    /// Returns the containing database.
    #[must_use]
    pub fn database_id(&self) -> AccountObjectIdentifier {
        self.inner.database_id()
    }

    /// Returns the containing schema.
    #[must_use]
    pub fn schema_id(&self) -> DatabaseObjectIdentifier {
        self.inner.schema_id()
    }

    /// Returns the containing schema.
    #[must_use]
    pub fn parent(&self) -> DatabaseObjectIdentifier {
        self.inner.schema_id()
    }
}

impl ObjectIdentifier for SchemaObjectIdentifierWithArguments {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn fully_qualified_name(&self) -> String {
        format!(
            "{}({})",
            self.inner.fully_qualified_name(),
            self.argument_data_types.join(", ")
        )
    }

    fn is_valid(&self) -> bool {
        self.inner.is_valid() && self.argument_data_types.iter().all(|t| is_argument_type(t))
    }

    fn ancestors(&self) -> Vec<Ancestor> {
        self.inner.ancestors()
    }
}

/// An argument type must read back as itself: non-empty, no surrounding
/// whitespace, no comma outside parentheses.
fn is_argument_type(argument: &str) -> bool {
    !argument.is_empty()
        && argument.trim() == argument
        && split_top_level(argument).len() == 1
}

impl FromStr for SchemaObjectIdentifierWithArguments {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = |reason| IdentifierError::Malformed {
            input: s.to_string(),
            reason,
        };

        // The argument list starts at the first '(' outside quotes.
        let mut in_quotes = false;
        let mut open = None;
        for (index, c) in s.char_indices() {
            match c {
                '"' => in_quotes = !in_quotes,
                '(' if !in_quotes => {
                    open = Some(index);
                    break;
                }
                _ => {}
            }
        }
        let open = open.ok_or_else(|| malformed("missing argument list"))?;
        let arguments = s[open + 1..]
            .strip_suffix(')')
            .ok_or_else(|| malformed("argument list is not closed"))?;

        let inner = s[..open].parse::<SchemaObjectIdentifier>()?;
        let argument_data_types = split_top_level(arguments);
        if argument_data_types.iter().any(String::is_empty) {
            return Err(malformed("empty argument type"));
        }
        Ok(inner.with_arguments(argument_data_types))
    }
}

macro_rules! impl_display_fqn {
    ($($ty:ty),+) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.fully_qualified_name())
                }
            }
        )+
    };
}

impl_display_fqn!(
    AccountObjectIdentifier,
    DatabaseObjectIdentifier,
    SchemaObjectIdentifier,
    SchemaObjectIdentifierWithArguments
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fully_qualified_name_quotes_every_part() {
        let id = SchemaObjectIdentifier::new("db", "sc", "with \"q\"");
        assert_eq!(id.fully_qualified_name(), r#""db"."sc"."with ""q""""#);
    }

    #[test]
    fn test_parse_unquoted_parts() {
        let id: SchemaObjectIdentifier = "db.sc.leaf".parse().unwrap();
        assert_eq!(id, SchemaObjectIdentifier::new("db", "sc", "leaf"));
    }

    #[test]
    fn test_parse_quoted_part_with_dot() {
        let id: DatabaseObjectIdentifier = r#""my.db"."sc""#.parse().unwrap();
        assert_eq!(id.database_name(), "my.db");
        assert_eq!(id.name(), "sc");
    }

    #[test]
    fn test_parse_rejects_unbalanced_quotes() {
        let err = r#""db"."sc"#.parse::<DatabaseObjectIdentifier>().unwrap_err();
        assert!(matches!(err, IdentifierError::UnbalancedQuotes(_)));
    }

    #[test]
    fn test_parse_rejects_empty_parts() {
        assert_eq!(
            "".parse::<AccountObjectIdentifier>().unwrap_err(),
            IdentifierError::Empty
        );
        assert!(matches!(
            "db.".parse::<DatabaseObjectIdentifier>().unwrap_err(),
            IdentifierError::EmptyPart { index: 1, .. }
        ));
        assert!(matches!(
            r#""""#.parse::<AccountObjectIdentifier>().unwrap_err(),
            IdentifierError::EmptyPart { index: 0, .. }
        ));
    }

    #[test]
    fn test_parse_rejects_wrong_part_count() {
        let err = "a.b".parse::<SchemaObjectIdentifier>().unwrap_err();
        assert!(matches!(
            err,
            IdentifierError::PartCount {
                expected: 3,
                found: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_rejects_text_after_closing_quote() {
        let err = r#""a"b"#.parse::<AccountObjectIdentifier>().unwrap_err();
        assert!(matches!(err, IdentifierError::Malformed { .. }));
    }

    #[test]
    fn test_round_trip_every_variant() {
        let account = AccountObjectIdentifier::new("W\"H.1");
        assert_eq!(account.to_string().parse::<AccountObjectIdentifier>().unwrap(), account);

        let database = DatabaseObjectIdentifier::new("d b", "s.c");
        assert_eq!(database.to_string().parse::<DatabaseObjectIdentifier>().unwrap(), database);

        let schema = SchemaObjectIdentifier::new("db", "\"sc\"", "name");
        assert_eq!(schema.to_string().parse::<SchemaObjectIdentifier>().unwrap(), schema);

        let function = SchemaObjectIdentifierWithArguments::new(
            "db",
            "sc(x)",
            "fn",
            vec!["NUMBER(38, 0)".into(), "VARCHAR".into()],
        );
        assert_eq!(
            function
                .to_string()
                .parse::<SchemaObjectIdentifierWithArguments>()
                .unwrap(),
            function
        );
    }

    #[test]
    fn test_argument_types_that_do_not_read_back_are_invalid() {
        let with = |argument: &str| {
            SchemaObjectIdentifierWithArguments::new("db", "sc", "f", vec![argument.to_string()])
        };
        assert!(with("NUMBER(38, 0)").is_valid());
        assert!(!with(" VARCHAR").is_valid());
        assert!(!with("VARCHAR ").is_valid());
        assert!(!with("a,b").is_valid());
        assert!(!with("").is_valid());
    }

    #[test]
    fn test_with_arguments_formatting() {
        let id = SchemaObjectIdentifierWithArguments::new("db", "sc", "f", vec![]);
        assert_eq!(id.fully_qualified_name(), r#""db"."sc"."f"()"#);
        let parsed: SchemaObjectIdentifierWithArguments = r#""db"."sc"."f"()"#.parse().unwrap();
        assert!(parsed.argument_data_types().is_empty());
    }

    #[test]
    fn test_parent_projections() {
        let id = SchemaObjectIdentifier::new("db", "sc", "t");
        assert_eq!(id.parent(), DatabaseObjectIdentifier::new("db", "sc"));
        assert_eq!(id.parent().parent(), AccountObjectIdentifier::new("db"));
        assert_eq!(
            id.ancestors(),
            vec![
                Ancestor::Schema(DatabaseObjectIdentifier::new("db", "sc")),
                Ancestor::Database(AccountObjectIdentifier::new("db")),
            ]
        );
        assert!(AccountObjectIdentifier::new("wh").ancestors().is_empty());
    }

    #[test]
    fn test_equality_is_case_sensitive() {
        assert_ne!(
            AccountObjectIdentifier::new("wh"),
            AccountObjectIdentifier::new("WH")
        );
        assert_eq!(
            r#""WH""#.parse::<AccountObjectIdentifier>().unwrap(),
            AccountObjectIdentifier::new("WH")
        );
    }

    #[test]
    fn test_default_identifier_is_invalid() {
        assert!(!SchemaObjectIdentifier::default().is_valid());
        assert!(!DatabaseObjectIdentifier::new("db", "").is_valid());
        assert!(AccountObjectIdentifier::new("wh").is_valid());
    }

    #[test]
    fn test_split_top_level() {
        assert_eq!(
            split_top_level("NUMBER(38, 0), VARCHAR"),
            vec!["NUMBER(38, 0)", "VARCHAR"]
        );
        assert!(split_top_level("").is_empty());
        assert!(split_top_level("   ").is_empty());
    }
}
