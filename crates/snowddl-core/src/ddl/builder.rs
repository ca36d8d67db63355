//! Token accumulation for one statement.

use super::{DdlValue, EmissionError, FieldKind, FieldSpec, ToDdlValue};

/// Collects the tokens of a statement and joins them with single spaces.
///
/// Options structs feed it one field at a time through [`DdlBuilder::field`];
/// the builder applies the field's metadata to decide what, if anything, the
/// value contributes.
#[derive(Debug, Clone, Default)]
pub struct DdlBuilder {
    tokens: Vec<String>,
}

impl DdlBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub const fn new() -> Self {
        Self { tokens: Vec::new() }
    }

    /// Appends a raw token. Blank tokens are dropped.
    pub fn push(&mut self, token: impl AsRef<str>) {
        let token = token.as_ref().trim();
        if !token.is_empty() {
            self.tokens.push(token.to_string());
        }
    }

    /// Returns the tokens collected so far.
    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Consumes the builder, returning its tokens.
    #[must_use]
    pub fn into_tokens(self) -> Vec<String> {
        self.tokens
    }

    /// Joins the tokens into the final statement.
    #[must_use]
    pub fn finish(self) -> String {
        self.tokens.join(" ")
    }

    /// Emits one field according to its metadata.
    ///
    /// # Errors
    ///
    /// Returns an [`EmissionError`] if the metadata is inconsistent, a
    /// required identifier is unset, or the value does not fit the kind.
    pub fn field(&mut self, spec: &FieldSpec, value: &dyn ToDdlValue) -> Result<(), EmissionError> {
        spec.check()?;
        if spec.kind == FieldKind::Static {
            // The declaration is the signal; the value is never inspected.
            let literal = spec.require_literal()?;
            self.push(literal);
            return Ok(());
        }

        let value = value.to_ddl_value()?;
        match spec.kind {
            FieldKind::Keyword => self.keyword(spec, value),
            FieldKind::Identifier => self.identifier(spec, value),
            FieldKind::Parameter => self.parameter(spec, value),
            FieldKind::List => self.list(spec, value),
            FieldKind::Static => Ok(()),
        }
    }

    fn keyword(&mut self, spec: &FieldSpec, value: DdlValue) -> Result<(), EmissionError> {
        if !value.is_set() {
            return Ok(());
        }
        if let DdlValue::Bool(flag) = value {
            let literal = spec.require_literal()?;
            if flag {
                self.push(literal);
            }
            return Ok(());
        }

        let rendered = match value {
            DdlValue::Clause(tokens) => wrap(spec, tokens.join(" ")),
            DdlValue::List(items) => wrap(spec, render_list(spec, &items)?),
            scalar => wrap(spec, render_scalar(spec, &scalar)?),
        };
        if let Some(literal) = spec.literal {
            self.push(literal);
        }
        self.push(rendered);
        Ok(())
    }

    fn identifier(&mut self, spec: &FieldSpec, value: DdlValue) -> Result<(), EmissionError> {
        let rendered = match value {
            DdlValue::Unset if spec.modifiers.required => {
                return Err(EmissionError::MissingIdentifier { field: spec.name });
            }
            DdlValue::Unset => return Ok(()),
            DdlValue::Identifier(fqn) => fqn,
            DdlValue::List(items) if items.is_empty() => return Ok(()),
            DdlValue::List(items) => {
                if items.iter().any(|item| !matches!(item, DdlValue::Identifier(_))) {
                    return Err(not_emittable(spec, "identifier lists hold only identifiers"));
                }
                wrap(spec, render_list(spec, &items)?)
            }
            _ => return Err(not_emittable(spec, "identifier slots hold only identifiers")),
        };

        if let Some(literal) = spec.literal {
            self.push(literal);
            if spec.modifiers.equals {
                self.push("=");
            }
        }
        self.push(rendered);
        Ok(())
    }

    fn parameter(&mut self, spec: &FieldSpec, value: DdlValue) -> Result<(), EmissionError> {
        let literal = spec.require_literal()?;
        let must = spec.modifiers.must_parentheses;
        let rendered = match value {
            DdlValue::Unset => return Ok(()),
            DdlValue::List(items) if items.is_empty() && !must => return Ok(()),
            DdlValue::Clause(tokens) if tokens.is_empty() && !must => return Ok(()),
            DdlValue::List(items) => wrap(spec, render_list(spec, &items)?),
            DdlValue::Clause(tokens) => wrap(spec, tokens.join(" ")),
            scalar if !scalar.is_set() => return Ok(()),
            scalar => wrap(spec, render_scalar(spec, &scalar)?),
        };

        self.push(literal);
        if !spec.modifiers.no_equals {
            self.push("=");
        }
        self.push(rendered);
        Ok(())
    }

    fn list(&mut self, spec: &FieldSpec, value: DdlValue) -> Result<(), EmissionError> {
        let items = match value {
            DdlValue::Unset => Vec::new(),
            DdlValue::List(items) => items,
            _ => return Err(not_emittable(spec, "list fields hold sequences")),
        };
        if items.is_empty() && !spec.modifiers.must_parentheses {
            return Ok(());
        }

        if let Some(literal) = spec.literal {
            self.push(literal);
        }
        let rendered = wrap(spec, render_list(spec, &items)?);
        self.push(rendered);
        Ok(())
    }
}

fn not_emittable(spec: &FieldSpec, reason: &'static str) -> EmissionError {
    EmissionError::NotEmittable {
        field: spec.name,
        kind: spec.kind,
        reason,
    }
}

fn wrap(spec: &FieldSpec, body: String) -> String {
    if spec.wraps() {
        format!("({body})")
    } else {
        body
    }
}

fn render_scalar(spec: &FieldSpec, value: &DdlValue) -> Result<String, EmissionError> {
    value
        .render_scalar(spec.modifiers.quotes)
        .ok_or_else(|| not_emittable(spec, "value is not a scalar"))
}

fn render_list(spec: &FieldSpec, items: &[DdlValue]) -> Result<String, EmissionError> {
    let separator = if spec.modifiers.no_comma { " " } else { ", " };
    let mut rendered = Vec::with_capacity(items.len());
    for item in items {
        match item {
            DdlValue::Unset => return Err(not_emittable(spec, "list element is unset")),
            DdlValue::List(_) => return Err(not_emittable(spec, "nested lists cannot be emitted")),
            DdlValue::Clause(tokens) if tokens.is_empty() => {}
            DdlValue::Clause(tokens) => rendered.push(tokens.join(" ")),
            scalar => rendered.push(render_scalar(spec, scalar)?),
        }
    }
    Ok(rendered.join(separator))
}
