//! Field values and the "is set" decision.

use super::{EmissionError, Quotes};
use crate::ident::{
    AccountObjectIdentifier, DatabaseObjectIdentifier, ObjectIdentifier, SchemaObjectIdentifier,
    SchemaObjectIdentifierWithArguments,
};

/// A field value reduced to what the emitter needs to know about it.
#[derive(Debug, Clone, PartialEq)]
pub enum DdlValue {
    /// Nothing to emit (`None`, empty string, empty identifier, marker
    /// field, nested struct with no set field).
    Unset,
    /// Boolean; a flag for keywords, `TRUE`/`FALSE` for parameters.
    Bool(bool),
    /// Integer, rendered verbatim.
    Int(i64),
    /// Float, rendered verbatim.
    Float(f64),
    /// Text, rendered according to the field's quoting.
    Text(String),
    /// Already-formatted fully-qualified identifier.
    Identifier(String),
    /// Tokens of a nested options struct.
    Clause(Vec<String>),
    /// Sequence of values.
    List(Vec<DdlValue>),
}

impl DdlValue {
    /// Returns whether this value contributes tokens.
    #[must_use]
    pub fn is_set(&self) -> bool {
        match self {
            Self::Unset => false,
            Self::Text(s) => !s.is_empty(),
            Self::Clause(tokens) => !tokens.is_empty(),
            Self::List(items) => !items.is_empty(),
            _ => true,
        }
    }

    /// Renders a scalar value. Returns `None` for non-scalar values.
    #[must_use]
    pub fn render_scalar(&self, quotes: Quotes) -> Option<String> {
        match self {
            Self::Bool(true) => Some(String::from("TRUE")),
            Self::Bool(false) => Some(String::from("FALSE")),
            Self::Int(n) => Some(n.to_string()),
            Self::Float(f) => Some(f.to_string()),
            Self::Text(s) => Some(match quotes {
                Quotes::None => s.clone(),
                Quotes::Single => quote_single(s),
                Quotes::Double => quote_double(s),
            }),
            Self::Identifier(fqn) => Some(fqn.clone()),
            Self::Unset | Self::Clause(_) | Self::List(_) => None,
        }
    }
}

/// Wraps text in single quotes, doubling embedded single quotes.
#[must_use]
pub fn quote_single(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Wraps text in double quotes, doubling embedded double quotes.
#[must_use]
pub fn quote_double(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Trait for types that can appear as options fields.
pub trait ToDdlValue {
    /// Converts the value for emission.
    ///
    /// # Errors
    ///
    /// Nested options structs propagate their own emission errors.
    fn to_ddl_value(&self) -> Result<DdlValue, EmissionError>;
}

/// Trait implementing the "is set" decision used by validation.
///
/// `None`, empty collections, empty strings, empty identifiers and structs
/// with no set field are unset.
pub trait ValueSet {
    /// Returns whether the value is set.
    fn is_value_set(&self) -> bool;
}

impl ToDdlValue for () {
    fn to_ddl_value(&self) -> Result<DdlValue, EmissionError> {
        Ok(DdlValue::Unset)
    }
}

impl ValueSet for () {
    fn is_value_set(&self) -> bool {
        false
    }
}

impl ToDdlValue for bool {
    fn to_ddl_value(&self) -> Result<DdlValue, EmissionError> {
        Ok(DdlValue::Bool(*self))
    }
}

impl ValueSet for bool {
    fn is_value_set(&self) -> bool {
        *self
    }
}

macro_rules! impl_int {
    ($($ty:ty),+) => {
        $(
            impl ToDdlValue for $ty {
                fn to_ddl_value(&self) -> Result<DdlValue, EmissionError> {
                    Ok(DdlValue::Int(i64::from(*self)))
                }
            }

            impl ValueSet for $ty {
                fn is_value_set(&self) -> bool {
                    true
                }
            }
        )+
    };
}

impl_int!(i8, i16, i32, i64, u8, u16, u32);

impl ToDdlValue for f64 {
    fn to_ddl_value(&self) -> Result<DdlValue, EmissionError> {
        Ok(DdlValue::Float(*self))
    }
}

impl ValueSet for f64 {
    fn is_value_set(&self) -> bool {
        true
    }
}

impl ToDdlValue for f32 {
    fn to_ddl_value(&self) -> Result<DdlValue, EmissionError> {
        Ok(DdlValue::Float(f64::from(*self)))
    }
}

impl ValueSet for f32 {
    fn is_value_set(&self) -> bool {
        true
    }
}

impl ToDdlValue for String {
    fn to_ddl_value(&self) -> Result<DdlValue, EmissionError> {
        self.as_str().to_ddl_value()
    }
}

impl ValueSet for String {
    fn is_value_set(&self) -> bool {
        !self.is_empty()
    }
}

impl ToDdlValue for str {
    fn to_ddl_value(&self) -> Result<DdlValue, EmissionError> {
        if self.is_empty() {
            Ok(DdlValue::Unset)
        } else {
            Ok(DdlValue::Text(self.to_string()))
        }
    }
}

impl ValueSet for str {
    fn is_value_set(&self) -> bool {
        !self.is_empty()
    }
}

impl<T: ToDdlValue + ?Sized> ToDdlValue for &T {
    fn to_ddl_value(&self) -> Result<DdlValue, EmissionError> {
        (**self).to_ddl_value()
    }
}

impl<T: ValueSet + ?Sized> ValueSet for &T {
    fn is_value_set(&self) -> bool {
        (**self).is_value_set()
    }
}

impl<T: ToDdlValue> ToDdlValue for Option<T> {
    fn to_ddl_value(&self) -> Result<DdlValue, EmissionError> {
        match self {
            Some(value) => value.to_ddl_value(),
            None => Ok(DdlValue::Unset),
        }
    }
}

impl<T> ValueSet for Option<T> {
    fn is_value_set(&self) -> bool {
        self.is_some()
    }
}

impl<T: ToDdlValue> ToDdlValue for Vec<T> {
    fn to_ddl_value(&self) -> Result<DdlValue, EmissionError> {
        let items = self
            .iter()
            .map(ToDdlValue::to_ddl_value)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(DdlValue::List(items))
    }
}

impl<T> ValueSet for Vec<T> {
    fn is_value_set(&self) -> bool {
        !self.is_empty()
    }
}

macro_rules! impl_identifier {
    ($($ty:ty),+) => {
        $(
            impl ToDdlValue for $ty {
                fn to_ddl_value(&self) -> Result<DdlValue, EmissionError> {
                    if self.is_valid() {
                        Ok(DdlValue::Identifier(self.fully_qualified_name()))
                    } else {
                        Ok(DdlValue::Unset)
                    }
                }
            }

            impl ValueSet for $ty {
                fn is_value_set(&self) -> bool {
                    self.is_valid()
                }
            }
        )+
    };
}

impl_identifier!(
    AccountObjectIdentifier,
    DatabaseObjectIdentifier,
    SchemaObjectIdentifier,
    SchemaObjectIdentifierWithArguments
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_bool_uppercase() {
        assert_eq!(
            DdlValue::Bool(true).render_scalar(Quotes::None).as_deref(),
            Some("TRUE")
        );
        assert_eq!(
            DdlValue::Bool(false).render_scalar(Quotes::Single).as_deref(),
            Some("FALSE")
        );
    }

    #[test]
    fn test_render_text_escaping() {
        let value = DdlValue::Text(String::from("it's"));
        assert_eq!(value.render_scalar(Quotes::Single).as_deref(), Some("'it''s'"));
        assert_eq!(value.render_scalar(Quotes::None).as_deref(), Some("it's"));

        let value = DdlValue::Text(String::from("say \"hi\""));
        assert_eq!(
            value.render_scalar(Quotes::Double).as_deref(),
            Some("\"say \"\"hi\"\"\"")
        );
    }

    #[test]
    fn test_sql_injection_is_quoted() {
        let value = DdlValue::Text(String::from("'; DROP WAREHOUSE w; --"));
        assert_eq!(
            value.render_scalar(Quotes::Single).as_deref(),
            Some("'''; DROP WAREHOUSE w; --'")
        );
    }

    #[test]
    fn test_render_numbers_verbatim() {
        assert_eq!(DdlValue::Int(-5).render_scalar(Quotes::Single).as_deref(), Some("-5"));
        assert_eq!(DdlValue::Float(2.5).render_scalar(Quotes::None).as_deref(), Some("2.5"));
    }

    #[test]
    fn test_non_scalars_do_not_render() {
        assert!(DdlValue::Unset.render_scalar(Quotes::None).is_none());
        assert!(DdlValue::List(vec![]).render_scalar(Quotes::None).is_none());
    }

    #[test]
    fn test_is_set() {
        assert!(!DdlValue::Unset.is_set());
        assert!(!DdlValue::Clause(vec![]).is_set());
        assert!(!DdlValue::List(vec![]).is_set());
        assert!(DdlValue::Bool(false).is_set());
        assert!(!DdlValue::Text(String::new()).is_set());
        assert!(DdlValue::Text(String::from("x")).is_set());
    }

    #[test]
    fn test_value_set_for_std_types() {
        assert!(!None::<i32>.is_value_set());
        assert!(Some(false).is_value_set());
        assert!(!Vec::<i32>::new().is_value_set());
        assert!(vec![1].is_value_set());
        assert!(!String::new().is_value_set());
        assert!(!().is_value_set());
        assert!(!false.is_value_set());
    }

    #[test]
    fn test_identifier_values() {
        let id = AccountObjectIdentifier::new("WH");
        assert_eq!(
            id.to_ddl_value().unwrap(),
            DdlValue::Identifier(String::from("\"WH\""))
        );
        assert_eq!(
            AccountObjectIdentifier::default().to_ddl_value().unwrap(),
            DdlValue::Unset
        );
        assert!(!SchemaObjectIdentifier::default().is_value_set());
    }

    #[test]
    fn test_option_and_vec_values() {
        assert_eq!(None::<String>.to_ddl_value().unwrap(), DdlValue::Unset);
        assert_eq!(String::new().to_ddl_value().unwrap(), DdlValue::Unset);
        assert_eq!(Some("").to_ddl_value().unwrap(), DdlValue::Unset);
        assert_eq!(
            vec![1_i64, 2].to_ddl_value().unwrap(),
            DdlValue::List(vec![DdlValue::Int(1), DdlValue::Int(2)])
        );
    }
}
