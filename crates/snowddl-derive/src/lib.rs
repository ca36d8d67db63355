//! Derive macros for DDL options structs and result row structs.
//!
//! `#[derive(Ddl)]` compiles per-field `#[ddl(...)]` attributes into an
//! emitter, and `#[derive(ScanRow)]` decodes a result row into a struct by
//! column name.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    parse_macro_input, Attribute, Data, DeriveInput, Expr, Field, Fields, Ident, Lit, LitStr,
    Meta, Token, Type,
};

/// Derives `Ddl`, `ToDdlValue` and `ValueSet` for an options struct.
///
/// Fields are emitted in declaration order. Fields without a `#[ddl]`
/// attribute are ignored. Nested inside another struct, a value with no set
/// non-static field emits nothing, static literals included.
///
/// # Field Attributes
///
/// - `#[ddl(static = "CREATE")]` - Fixed literal, always emitted
/// - `#[ddl(keyword = "OR REPLACE")]` - Literal emitted when the value is
///   set; booleans act as flags, other values follow the literal
/// - `#[ddl(keyword)]` - The value alone, emitted when set
/// - `#[ddl(identifier)]` / `#[ddl(identifier = "WAREHOUSE")]` - Fully
///   qualified identifier, required unless the field is an `Option`
/// - `#[ddl(parameter = "COMMENT")]` - `COMMENT = value`
/// - `#[ddl(list = "ALLOWED_IP_LIST")]` - Sequence of elements
///
/// # Modifiers
///
/// `equals`, `no_equals`, `single_quotes`, `double_quotes`, `no_quotes`,
/// `parentheses`, `must_parentheses`, `no_parentheses`, `no_comma`.
#[proc_macro_derive(Ddl, attributes(ddl))]
pub fn derive_ddl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_ddl_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Derives `ScanRow` for a result row struct.
///
/// # Field Attributes
///
/// - `#[column(name = "created_on")]` - Column to read (optional, defaults
///   to the field name)
#[proc_macro_derive(ScanRow, attributes(column))]
pub fn derive_scan_row(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_scan_row_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn named_fields<'a>(
    input: &'a DeriveInput,
    derive: &str,
) -> syn::Result<impl Iterator<Item = &'a Field>> {
    match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => Ok(fields.named.iter()),
            _ => Err(syn::Error::new_spanned(
                input,
                format!("{derive} derive only supports structs with named fields"),
            )),
        },
        _ => Err(syn::Error::new_spanned(
            input,
            format!("{derive} derive only supports structs"),
        )),
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Kind {
    Static,
    Keyword,
    Identifier,
    Parameter,
    List,
}

#[derive(Default)]
#[allow(clippy::struct_excessive_bools)]
struct DdlAttrs {
    kind: Option<Kind>,
    literal: Option<String>,
    equals: bool,
    no_equals: bool,
    quotes: Option<&'static str>,
    parentheses: bool,
    must_parentheses: bool,
    no_parentheses: bool,
    no_comma: bool,
}

struct DdlField {
    ident: Ident,
    attrs: DdlAttrs,
    required: bool,
}

fn derive_ddl_impl(input: DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let mut ddl_fields = Vec::new();
    for field in named_fields(&input, "Ddl")? {
        let Some(attrs) = parse_ddl_attrs(&field.attrs)? else {
            continue;
        };
        let Some(ident) = field.ident.clone() else {
            continue;
        };
        let required = attrs.kind == Some(Kind::Identifier) && !is_option(&field.ty);
        ddl_fields.push(DdlField {
            ident,
            attrs,
            required,
        });
    }

    let emit_fields: Vec<TokenStream2> = ddl_fields
        .iter()
        .map(|field| {
            let ident = &field.ident;
            let spec = field_spec(field);
            quote! {
                out.field(&#spec, &self.#ident)?;
            }
        })
        .collect();

    // Static literals alone never make a clause "set".
    let value_fields: Vec<&Ident> = ddl_fields
        .iter()
        .filter(|f| f.attrs.kind != Some(Kind::Static))
        .map(|f| &f.ident)
        .collect();
    let is_value_set = if value_fields.is_empty() {
        quote! { true }
    } else {
        quote! {
            false #(|| ::snowddl_core::ddl::ValueSet::is_value_set(&self.#value_fields))*
        }
    };

    let expanded = quote! {
        impl #impl_generics ::snowddl_core::ddl::Ddl for #struct_name #ty_generics #where_clause {
            fn write_ddl(
                &self,
                out: &mut ::snowddl_core::ddl::DdlBuilder,
            ) -> ::core::result::Result<(), ::snowddl_core::ddl::EmissionError> {
                #(#emit_fields)*
                Ok(())
            }
        }

        impl #impl_generics ::snowddl_core::ddl::ToDdlValue for #struct_name #ty_generics #where_clause {
            fn to_ddl_value(
                &self,
            ) -> ::core::result::Result<
                ::snowddl_core::ddl::DdlValue,
                ::snowddl_core::ddl::EmissionError,
            > {
                if !::snowddl_core::ddl::ValueSet::is_value_set(self) {
                    return Ok(::snowddl_core::ddl::DdlValue::Unset);
                }
                let mut out = ::snowddl_core::ddl::DdlBuilder::new();
                ::snowddl_core::ddl::Ddl::write_ddl(self, &mut out)?;
                Ok(::snowddl_core::ddl::DdlValue::Clause(out.into_tokens()))
            }
        }

        impl #impl_generics ::snowddl_core::ddl::ValueSet for #struct_name #ty_generics #where_clause {
            fn is_value_set(&self) -> bool {
                #is_value_set
            }
        }
    };

    Ok(expanded)
}

fn field_spec(field: &DdlField) -> TokenStream2 {
    let name = field.ident.to_string();
    let attrs = &field.attrs;
    let kind = match attrs.kind.unwrap_or(Kind::Keyword) {
        Kind::Static => quote! { Static },
        Kind::Keyword => quote! { Keyword },
        Kind::Identifier => quote! { Identifier },
        Kind::Parameter => quote! { Parameter },
        Kind::List => quote! { List },
    };
    let literal = attrs
        .literal
        .as_ref()
        .map(|lit| quote! { .literal(#lit) });
    let quotes = match attrs.quotes {
        Some("single") => quote! { Single },
        Some("double") => quote! { Double },
        _ => quote! { None },
    };
    let equals = attrs.equals;
    let no_equals = attrs.no_equals;
    let parentheses = attrs.parentheses;
    let must_parentheses = attrs.must_parentheses;
    let no_parentheses = attrs.no_parentheses;
    let no_comma = attrs.no_comma;
    let required = field.required;

    quote! {
        ::snowddl_core::ddl::FieldSpec::new(#name, ::snowddl_core::ddl::FieldKind::#kind)
            #literal
            .modifiers(::snowddl_core::ddl::Modifiers {
                equals: #equals,
                no_equals: #no_equals,
                quotes: ::snowddl_core::ddl::Quotes::#quotes,
                parentheses: #parentheses,
                must_parentheses: #must_parentheses,
                no_parentheses: #no_parentheses,
                no_comma: #no_comma,
                required: #required,
            })
    }
}

fn parse_ddl_attrs(attrs: &[Attribute]) -> syn::Result<Option<DdlAttrs>> {
    let mut result: Option<DdlAttrs> = None;

    for attr in attrs {
        if !attr.path().is_ident("ddl") {
            continue;
        }
        if matches!(attr.meta, Meta::Path(_)) {
            return Err(syn::Error::new_spanned(
                attr,
                "expected #[ddl(static | keyword | identifier | parameter | list ...)]",
            ));
        }
        let parsed = result.get_or_insert_with(DdlAttrs::default);

        attr.parse_nested_meta(|meta| {
            let kind = if meta.path.is_ident("static") {
                Some(Kind::Static)
            } else if meta.path.is_ident("keyword") {
                Some(Kind::Keyword)
            } else if meta.path.is_ident("identifier") {
                Some(Kind::Identifier)
            } else if meta.path.is_ident("parameter") {
                Some(Kind::Parameter)
            } else if meta.path.is_ident("list") {
                Some(Kind::List)
            } else {
                None
            };

            if let Some(kind) = kind {
                if parsed.kind.is_some() {
                    return Err(meta.error("field kind is already set"));
                }
                parsed.kind = Some(kind);
                if meta.input.peek(Token![=]) {
                    parsed.literal = Some(parse_str_value(&meta)?);
                }
                return Ok(());
            }

            if meta.path.is_ident("equals") {
                parsed.equals = true;
            } else if meta.path.is_ident("no_equals") {
                parsed.no_equals = true;
            } else if meta.path.is_ident("single_quotes") {
                parsed.quotes = Some("single");
            } else if meta.path.is_ident("double_quotes") {
                parsed.quotes = Some("double");
            } else if meta.path.is_ident("no_quotes") {
                parsed.quotes = Some("none");
            } else if meta.path.is_ident("parentheses") {
                parsed.parentheses = true;
            } else if meta.path.is_ident("must_parentheses") {
                parsed.must_parentheses = true;
            } else if meta.path.is_ident("no_parentheses") {
                parsed.no_parentheses = true;
            } else if meta.path.is_ident("no_comma") {
                parsed.no_comma = true;
            } else {
                return Err(meta.error("unsupported ddl attribute"));
            }
            Ok(())
        })?;
    }

    if let Some(parsed) = &result {
        if parsed.kind.is_none() {
            return Err(syn::Error::new_spanned(
                &attrs[0],
                "ddl attribute needs one of static, keyword, identifier, parameter, list",
            ));
        }
    }

    Ok(result)
}

fn parse_str_value(meta: &syn::meta::ParseNestedMeta<'_>) -> syn::Result<String> {
    let value: Expr = meta.value()?.parse()?;
    if let Expr::Lit(lit) = &value {
        if let Lit::Str(s) = &lit.lit {
            return Ok(s.value());
        }
    }
    Err(syn::Error::new_spanned(value, "expected a string literal"))
}

fn is_option(ty: &Type) -> bool {
    if let Type::Path(path) = ty {
        if path.qself.is_none() {
            if let Some(segment) = path.path.segments.last() {
                return segment.ident == "Option";
            }
        }
    }
    false
}

fn derive_scan_row_impl(input: DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let mut decoders = Vec::new();
    for field in named_fields(&input, "ScanRow")? {
        let Some(ident) = &field.ident else {
            continue;
        };
        let column = column_name(&field.attrs)?
            .unwrap_or_else(|| ident.to_string().trim_start_matches("r#").to_string());
        decoders.push(quote! {
            #ident: row.decode(#column)?
        });
    }

    Ok(quote! {
        impl #impl_generics ::snowddl_core::row::ScanRow for #struct_name #ty_generics #where_clause {
            fn scan(
                row: &::snowddl_core::row::Row,
            ) -> ::core::result::Result<Self, ::snowddl_core::row::ScanError> {
                Ok(Self {
                    #(#decoders),*
                })
            }
        }
    })
}

fn column_name(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    let mut name = None;
    for attr in attrs {
        if !attr.path().is_ident("column") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let value: LitStr = meta.value()?.parse()?;
                name = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("unsupported column attribute"))
            }
        })?;
    }
    Ok(name)
}
