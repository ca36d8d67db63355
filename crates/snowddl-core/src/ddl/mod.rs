//! Declarative DDL emission.
//!
//! An options struct describes a statement as a sequence of fields, each
//! carrying a [`FieldSpec`]: a [`FieldKind`], an optional SQL literal and a set
//! of [`Modifiers`]. Emitting walks the fields in declaration order and asks a
//! [`DdlBuilder`] to turn each field value into tokens:
//!
//! | Kind | Emission |
//! |---|---|
//! | `static` | Always emits the literal; the value is ignored. |
//! | `keyword` | When set: the literal, then the value (flag, nested clause, scalar or list). |
//! | `identifier` | When set: the fully-qualified name, optionally `LITERAL [=]` first. |
//! | `parameter` | When set: `LITERAL = value` (or `LITERAL value` with `no_equals`). |
//! | `list` | When non-empty: the elements joined by `, ` (or spaces), optionally in `( )`. |
//!
//! The `#[derive(Ddl)]` macro in `snowddl-derive` generates the [`Ddl`],
//! [`ToDdlValue`] and [`ValueSet`] impls from `#[ddl(...)]` attributes.
//! Field metadata is checked when emitted, so a hand-written [`Ddl`] impl gets
//! the same guarantees as a derived one.

mod builder;
mod value;

use thiserror::Error;

pub use builder::DdlBuilder;
pub use value::{quote_double, quote_single, DdlValue, ToDdlValue, ValueSet};

/// How a field contributes to the statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Fixed literal, always emitted.
    Static,
    /// Literal emitted when the value is set, followed by the value itself.
    Keyword,
    /// Fully-qualified identifier.
    Identifier,
    /// `NAME = value` pair.
    Parameter,
    /// Sequence of elements.
    List,
}

/// Quoting applied to rendered text values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Quotes {
    /// Text is emitted verbatim.
    #[default]
    None,
    /// Text is wrapped in `'...'` with `'` doubled.
    Single,
    /// Text is wrapped in `"..."` with `"` doubled.
    Double,
}

/// Modifiers attached to a field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[allow(clippy::struct_excessive_bools)]
pub struct Modifiers {
    /// Emit `LITERAL = <identifier>` for identifier fields.
    pub equals: bool,
    /// Emit `LITERAL value` instead of `LITERAL = value` for parameters.
    pub no_equals: bool,
    /// Quoting applied to text values.
    pub quotes: Quotes,
    /// Wrap the value in parentheses.
    pub parentheses: bool,
    /// Wrap the value in parentheses and emit `()` even when empty.
    pub must_parentheses: bool,
    /// Never wrap the value in parentheses.
    pub no_parentheses: bool,
    /// Separate list elements with spaces instead of `, `.
    pub no_comma: bool,
    /// The field must be set; only meaningful for identifier slots.
    pub required: bool,
}

/// Metadata of one options field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldSpec {
    /// Rust field name, used in error messages.
    pub name: &'static str,
    /// How the field is emitted.
    pub kind: FieldKind,
    /// SQL token or parameter name.
    pub literal: Option<&'static str>,
    /// Emission modifiers.
    pub modifiers: Modifiers,
}

impl FieldSpec {
    /// Creates a spec with no literal and default modifiers.
    #[must_use]
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            literal: None,
            modifiers: Modifiers {
                equals: false,
                no_equals: false,
                quotes: Quotes::None,
                parentheses: false,
                must_parentheses: false,
                no_parentheses: false,
                no_comma: false,
                required: false,
            },
        }
    }

    /// Sets the SQL literal.
    #[must_use]
    pub const fn literal(mut self, literal: &'static str) -> Self {
        self.literal = Some(literal);
        self
    }

    /// Replaces the modifiers.
    #[must_use]
    pub const fn modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Checks that the metadata is internally consistent.
    ///
    /// # Errors
    ///
    /// Returns [`EmissionError::MissingLiteral`] when a `static` or
    /// `parameter` field has no literal and
    /// [`EmissionError::InconsistentMetadata`] for contradictory modifiers.
    pub fn check(&self) -> Result<(), EmissionError> {
        let m = &self.modifiers;
        let inconsistent = |reason| EmissionError::InconsistentMetadata {
            field: self.name,
            reason,
        };

        if matches!(self.kind, FieldKind::Static | FieldKind::Parameter) && self.literal.is_none() {
            return Err(EmissionError::MissingLiteral {
                field: self.name,
                kind: self.kind,
            });
        }
        if m.equals && m.no_equals {
            return Err(inconsistent("`equals` and `no_equals` are both set"));
        }
        if m.no_parentheses && (m.parentheses || m.must_parentheses) {
            return Err(inconsistent("`no_parentheses` conflicts with `parentheses`"));
        }
        if m.equals && (self.kind != FieldKind::Identifier || self.literal.is_none()) {
            return Err(inconsistent("`equals` needs an identifier field with a literal"));
        }
        if m.must_parentheses && !matches!(self.kind, FieldKind::Parameter | FieldKind::List) {
            return Err(inconsistent("`must_parentheses` only applies to parameters and lists"));
        }
        if m.required && self.kind != FieldKind::Identifier {
            return Err(inconsistent("`required` only applies to identifier fields"));
        }
        Ok(())
    }

    pub(crate) fn require_literal(&self) -> Result<&'static str, EmissionError> {
        self.literal.ok_or(EmissionError::MissingLiteral {
            field: self.name,
            kind: self.kind,
        })
    }

    pub(crate) const fn wraps(&self) -> bool {
        let m = &self.modifiers;
        (m.parentheses || m.must_parentheses) && !m.no_parentheses
    }
}

/// Errors raised while emitting a statement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmissionError {
    /// A field that needs a literal has none.
    #[error("field `{field}` of kind {kind:?} has no SQL literal")]
    MissingLiteral {
        /// Rust field name.
        field: &'static str,
        /// Kind of the field.
        kind: FieldKind,
    },

    /// A required identifier slot is empty.
    #[error("required identifier field `{field}` is not set")]
    MissingIdentifier {
        /// Rust field name.
        field: &'static str,
    },

    /// A value cannot be emitted for the field's kind.
    #[error("field `{field}` cannot be emitted as {kind:?}: {reason}")]
    NotEmittable {
        /// Rust field name.
        field: &'static str,
        /// Kind of the field.
        kind: FieldKind,
        /// What is wrong with the value.
        reason: &'static str,
    },

    /// The field's modifiers contradict each other or its kind.
    #[error("field `{field}` has inconsistent metadata: {reason}")]
    InconsistentMetadata {
        /// Rust field name.
        field: &'static str,
        /// What is inconsistent.
        reason: &'static str,
    },
}

/// A value that can be emitted as one SQL statement or clause.
pub trait Ddl {
    /// Appends this value's tokens to `out`, fields in declaration order.
    ///
    /// # Errors
    ///
    /// Returns an [`EmissionError`] when a field's metadata is inconsistent,
    /// a required identifier is unset, or a value cannot be emitted.
    fn write_ddl(&self, out: &mut DdlBuilder) -> Result<(), EmissionError>;

    /// Emits this value as a single statement.
    ///
    /// # Errors
    ///
    /// See [`Ddl::write_ddl`].
    fn to_ddl(&self) -> Result<String, EmissionError> {
        let mut out = DdlBuilder::new();
        self.write_ddl(&mut out)?;
        Ok(out.finish())
    }
}

/// Error returned when parsing an unknown enum constant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {type_name} value `{value}`")]
pub struct UnknownVariant {
    /// Name of the enum type.
    pub type_name: &'static str,
    /// The rejected input.
    pub value: String,
}

/// Normalizes an enum constant for lenient comparison (`X-Small` == `XSMALL`).
#[doc(hidden)]
#[must_use]
pub fn normalize_constant(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Declares an enum of SQL constants.
///
/// Each variant maps to the string emitted in DDL; extra aliases are accepted
/// when parsing values read back from the warehouse.
///
/// ```rust
/// snowddl_core::ddl_enum! {
///     /// Warehouse scaling policy.
///     pub enum ScalingPolicy {
///         Standard => "STANDARD",
///         Economy => "ECONOMY",
///     }
/// }
///
/// assert_eq!(ScalingPolicy::Economy.as_str(), "ECONOMY");
/// assert_eq!("economy".parse::<ScalingPolicy>().unwrap(), ScalingPolicy::Economy);
/// ```
#[macro_export]
macro_rules! ddl_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $sql:literal $(| $alias:literal)*
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant,
            )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Returns the SQL constant.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $sql,)+
                }
            }

            fn accepts(self, normalized: &str) -> bool {
                match self {
                    $(
                        Self::$variant => {
                            $crate::ddl::normalize_constant($sql) == normalized
                                $(|| $crate::ddl::normalize_constant($alias) == normalized)*
                        }
                    )+
                }
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::ddl::UnknownVariant;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                let normalized = $crate::ddl::normalize_constant(s.trim());
                Self::ALL
                    .iter()
                    .copied()
                    .find(|variant| variant.accepts(&normalized))
                    .ok_or_else(|| $crate::ddl::UnknownVariant {
                        type_name: stringify!($name),
                        value: s.to_string(),
                    })
            }
        }

        impl $crate::ddl::ToDdlValue for $name {
            fn to_ddl_value(
                &self,
            ) -> ::core::result::Result<$crate::ddl::DdlValue, $crate::ddl::EmissionError> {
                Ok($crate::ddl::DdlValue::Text(self.as_str().to_string()))
            }
        }

        impl $crate::ddl::ValueSet for $name {
            fn is_value_set(&self) -> bool {
                true
            }
        }
    };
}
