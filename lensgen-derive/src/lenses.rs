//! Implementation of the `#[derive(Lenses)]` macro.
//!
//! Generates lens accessor methods for struct fields and a
//! `DescribeRecord` implementation registering the struct's settable fields.

use proc_macro::TokenStream;
use proc_macro2::{TokenStream as TokenStream2, TokenTree};
use quote::{format_ident, quote};
use syn::{
    Attribute, Data, DeriveInput, Field, Fields, FieldsNamed, GenericParam, Generics, Ident, Type,
    parse_macro_input, parse_quote,
};

/// Main implementation of the Lenses derive macro.
pub fn derive_lenses_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let name = &input.ident;
    let generics = &input.generics;

    let expanded = match &input.data {
        Data::Struct(data_struct) => match &data_struct.fields {
            Fields::Named(named_fields) => generate_struct_lenses(name, generics, named_fields)
                .unwrap_or_else(syn::Error::into_compile_error),
            Fields::Unnamed(_) => syn::Error::new_spanned(
                name,
                "Lenses can only be derived for structs with named fields, not tuple structs.",
            )
            .to_compile_error(),
            Fields::Unit => syn::Error::new_spanned(
                name,
                "Lenses cannot be derived for unit structs (structs with no fields).",
            )
            .to_compile_error(),
        },
        Data::Enum(_) => {
            syn::Error::new_spanned(name, "Lenses can only be derived for structs, not enums.")
                .to_compile_error()
        }
        Data::Union(_) => {
            syn::Error::new_spanned(name, "Lenses cannot be derived for unions.").to_compile_error()
        }
    };

    TokenStream::from(expanded)
}

/// Options read from `#[lens(...)]` on one field.
#[derive(Debug, Default, PartialEq, Eq)]
struct FieldOptions {
    nested: bool,
    skip: bool,
}

impl FieldOptions {
    fn from_attributes(attributes: &[Attribute]) -> syn::Result<Self> {
        let mut options = Self::default();
        for attribute in attributes.iter().filter(|attribute| attribute.path().is_ident("lens")) {
            attribute.parse_nested_meta(|meta| {
                if meta.path.is_ident("nested") {
                    options.nested = true;
                    Ok(())
                } else if meta.path.is_ident("skip") {
                    options.skip = true;
                    Ok(())
                } else {
                    Err(meta.error("expected `nested` or `skip`"))
                }
            })?;
            if options.nested && options.skip {
                return Err(syn::Error::new_spanned(
                    attribute,
                    "a field cannot be both `nested` and `skip`",
                ));
            }
        }
        Ok(options)
    }
}

/// A settable field with its parsed options.
struct LensField<'f> {
    ident: &'f Ident,
    ty: &'f Type,
    nested: bool,
}

impl<'f> LensField<'f> {
    fn parse(field: &'f Field) -> syn::Result<Option<Self>> {
        let Some(ident) = field.ident.as_ref() else {
            return Err(syn::Error::new_spanned(field, "named field must have an identifier"));
        };
        let options = FieldOptions::from_attributes(&field.attrs)?;
        if options.skip {
            return Ok(None);
        }
        Ok(Some(Self {
            ident,
            ty: &field.ty,
            nested: options.nested,
        }))
    }

    /// The field name as it appears in the description, without `r#`.
    fn name(&self) -> String {
        let name = self.ident.to_string();
        name.strip_prefix("r#").map_or_else(|| name.clone(), str::to_string)
    }

    fn lens_method(&self) -> TokenStream2 {
        let field_name = self.ident;
        let field_type = self.ty;
        let method_name = format_ident!("{}_lens", self.name());
        let doc = format!(" Returns a lens focusing on the `{}` field.", self.name());

        quote! {
            #[doc = #doc]
            #[inline]
            #[must_use]
            pub fn #method_name() -> impl ::lensgen::optics::Lens<Self, #field_type> + Clone {
                ::lensgen::optics::FunctionLens::new(
                    |source: &Self| &source.#field_name,
                    |mut source: Self, value: #field_type| {
                        source.#field_name = value;
                        source
                    },
                )
            }
        }
    }

    fn value_type(&self) -> TokenStream2 {
        let field_type = self.ty;
        if self.nested {
            quote! { <#field_type as ::lensgen::schema::DescribeRecord>::record_type() }
        } else {
            let spelled = type_display(field_type);
            quote! { #spelled }
        }
    }
}

/// Generates lens methods and the `DescribeRecord` impl for a struct.
fn generate_struct_lenses(
    name: &Ident,
    generics: &Generics,
    fields: &FieldsNamed,
) -> syn::Result<TokenStream2> {
    let fields: Vec<LensField<'_>> = fields
        .named
        .iter()
        .map(LensField::parse)
        .filter_map(Result::transpose)
        .collect::<syn::Result<_>>()?;

    let lens_methods = fields.iter().map(LensField::lens_method);
    let field_names = fields.iter().map(LensField::name);
    let field_types = fields.iter().map(LensField::value_type);
    let nested_types: Vec<&Type> = fields
        .iter()
        .filter(|field| field.nested)
        .map(|field| field.ty)
        .collect();
    let record_name = name.to_string();

    let mut describe_generics = generics.clone();
    let where_clause = describe_generics.make_where_clause();
    for nested in describe_bounds(generics, &nested_types) {
        where_clause
            .predicates
            .push(parse_quote! { #nested: ::lensgen::schema::DescribeRecord });
    }

    let (impl_generics, type_generics, where_clause) = generics.split_for_impl();
    let (_, _, describe_where_clause) = describe_generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics #name #type_generics #where_clause {
            #(#lens_methods)*
        }

        impl #impl_generics ::lensgen::schema::DescribeRecord for #name #type_generics #describe_where_clause {
            fn record_type() -> ::lensgen::schema::TypeRef {
                ::lensgen::schema::TypeRef::new(#record_name)
            }

            fn describe(registry: &mut ::lensgen::schema::SchemaRegistry) {
                let record_type = <Self as ::lensgen::schema::DescribeRecord>::record_type();
                if registry.contains(&record_type) {
                    return;
                }
                registry.register(
                    ::lensgen::schema::RecordDescription::new(record_type)
                        #(.field(#field_names, #field_types))*
                );
                #(<#nested_types as ::lensgen::schema::DescribeRecord>::describe(registry);)*
            }
        }
    })
}

/// Nested field types whose `DescribeRecord` impl depends on the struct's
/// type parameters.
///
/// Concrete nested types are checked where they are used. Bounding them as
/// well would make `Box<Self>` fields an unresolvable trait obligation.
fn describe_bounds<'t>(generics: &Generics, nested: &[&'t Type]) -> Vec<&'t Type> {
    let parameters: Vec<&Ident> = generics
        .params
        .iter()
        .filter_map(|parameter| match parameter {
            GenericParam::Type(parameter) => Some(&parameter.ident),
            _ => None,
        })
        .collect();
    if parameters.is_empty() {
        return Vec::new();
    }
    nested
        .iter()
        .copied()
        .filter(|ty| mentions_any(quote!(#ty), &parameters))
        .collect()
}

fn mentions_any(tokens: TokenStream2, idents: &[&Ident]) -> bool {
    tokens.into_iter().any(|token| match token {
        TokenTree::Ident(ident) => idents.iter().any(|candidate| **candidate == ident),
        TokenTree::Group(group) => mentions_any(group.stream(), idents),
        TokenTree::Punct(_) | TokenTree::Literal(_) => false,
    })
}

/// Spells a type the way it is written in source, e.g. `Vec<String>`.
///
/// A space survives between two word characters, after a comma and around
/// an `->` arrow.
fn type_display(ty: &Type) -> String {
    let raw = quote!(#ty).to_string();
    let characters: Vec<char> = raw.chars().collect();
    let mut spelled = String::with_capacity(raw.len());

    for (index, &character) in characters.iter().enumerate() {
        if character != ' ' {
            spelled.push(character);
            continue;
        }
        let before = spelled.chars().last();
        let after = characters.get(index + 1).copied();
        let between_words = matches!(
            (before, after),
            (Some(before), Some(after)) if is_word(before) && is_word(after)
        );
        let around_arrow = spelled.ends_with("->")
            || characters[index + 1..].starts_with(&['-', '>']);
        if between_words || around_arrow || before == Some(',') {
            spelled.push(' ');
        }
    }
    spelled
}

const fn is_word(character: char) -> bool {
    character.is_ascii_alphanumeric() || character == '_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(parse_quote!(u32), "u32")]
    #[case(parse_quote!(Vec<String>), "Vec<String>")]
    #[case(parse_quote!(std::collections::HashMap<String, u32>), "std::collections::HashMap<String, u32>")]
    #[case(parse_quote!(&'static str), "&'static str")]
    #[case(parse_quote!(Option<Vec<(i32, bool)>>), "Option<Vec<(i32, bool)>>")]
    #[case(parse_quote!(fn(u32) -> u32), "fn(u32) -> u32")]
    #[case(parse_quote!(Box<dyn Fn(&str) -> String>), "Box<dyn Fn(&str) -> String>")]
    fn test_type_display(#[case] ty: Type, #[case] expected: &str) {
        assert_eq!(type_display(&ty), expected);
    }

    #[rstest]
    fn test_field_options() {
        let field: syn::FieldsNamed = parse_quote!({
            #[lens(nested)]
            name: Name,
            #[lens(skip)]
            cache: u64,
            age: u32,
        });
        let options: Vec<FieldOptions> = field
            .named
            .iter()
            .map(|field| FieldOptions::from_attributes(&field.attrs).unwrap())
            .collect();
        assert_eq!(
            options,
            vec![
                FieldOptions { nested: true, skip: false },
                FieldOptions { nested: false, skip: true },
                FieldOptions::default(),
            ]
        );
    }

    #[rstest]
    fn test_unknown_option_is_an_error() {
        let field: syn::FieldsNamed = parse_quote!({
            #[lens(rename = "x")]
            name: String,
        });
        assert!(FieldOptions::from_attributes(&field.named[0].attrs).is_err());
    }

    #[rstest]
    fn test_nested_and_skip_behind_other_attributes() {
        let field: syn::FieldsNamed = parse_quote!({
            #[doc = "the name"]
            #[lens(nested)]
            #[lens(skip)]
            name: Name,
        });
        let error = FieldOptions::from_attributes(&field.named[0].attrs).unwrap_err();
        assert_eq!(error.to_string(), "a field cannot be both `nested` and `skip`");
    }

    fn nested_field_types(fields: &syn::FieldsNamed) -> Vec<&Type> {
        fields.named.iter().map(|field| &field.ty).collect()
    }

    #[rstest]
    fn test_concrete_nested_types_are_not_bounded() {
        let input: DeriveInput = parse_quote! {
            struct Chain {
                #[lens(nested)]
                next: Box<Chain>,
            }
        };
        let Data::Struct(data) = &input.data else {
            unreachable!()
        };
        let Fields::Named(fields) = &data.fields else {
            unreachable!()
        };
        assert!(describe_bounds(&input.generics, &nested_field_types(fields)).is_empty());

        let tokens = generate_struct_lenses(&input.ident, &input.generics, fields)
            .unwrap()
            .to_string();
        assert!(!tokens.contains(": :: lensgen :: schema :: DescribeRecord"));
    }

    #[rstest]
    fn test_generic_nested_types_are_bounded() {
        let generics: Generics = parse_quote!(<T, U: Clone>);
        let fields: syn::FieldsNamed = parse_quote!({
            inner: Box<T>,
            name: Name,
            pair: (u32, Vec<U>),
        });
        let bounded: Vec<String> = describe_bounds(&generics, &nested_field_types(&fields))
            .into_iter()
            .map(type_display)
            .collect();
        assert_eq!(bounded, vec!["Box<T>", "(u32, Vec<U>)"]);
    }

    #[rstest]
    fn test_skipped_fields_are_not_described() {
        let input: DeriveInput = parse_quote! {
            struct Person {
                name: String,
                #[lens(skip)]
                cache: u64,
            }
        };
        let Data::Struct(data) = &input.data else {
            unreachable!()
        };
        let Fields::Named(fields) = &data.fields else {
            unreachable!()
        };
        let tokens = generate_struct_lenses(&input.ident, &input.generics, fields)
            .unwrap()
            .to_string();
        assert!(tokens.contains("name_lens"));
        assert!(!tokens.contains("cache_lens"));
        assert!(!tokens.contains("\"cache\""));
    }

    #[rstest]
    fn test_raw_identifier_name() {
        let fields: syn::FieldsNamed = parse_quote!({ r#type: String });
        let field = LensField::parse(&fields.named[0]).unwrap().unwrap();
        assert_eq!(field.name(), "type");
    }
}
