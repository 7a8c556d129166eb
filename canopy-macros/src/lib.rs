use proc_macro::TokenStream;
use quote::{quote, ToTokens};
use syn::{parse_macro_input, Data, DeriveInput, Field, Fields, Index};

/// Derive macro implementing `canopy::animation::Interpolate` field by field.
///
/// Every field must itself implement `Interpolate`, unless it is marked
/// `#[interpolate(skip)]`, in which case the `from` value is carried through
/// unchanged for the whole animation.
///
/// # Example
/// ```ignore
/// #[derive(Clone, PartialEq, Interpolate)]
/// pub struct Glow {
///     radius: f32,
///     colour: Color,
///     #[interpolate(skip)]
///     layer: u8,
/// }
/// ```
#[proc_macro_derive(Interpolate, attributes(interpolate))]
pub fn derive_interpolate(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let data = match &input.data {
        Data::Struct(data) => data,
        _ => {
            return syn::Error::new_spanned(
                &input.ident,
                "Interpolate can only be derived for structs",
            )
            .to_compile_error()
            .into();
        }
    };

    let body = match &data.fields {
        Fields::Named(fields) => {
            let mut assignments = Vec::new();
            for field in &fields.named {
                let skip = match is_skipped(field) {
                    Ok(skip) => skip,
                    Err(err) => return err.to_compile_error().into(),
                };
                let Some(name) = field.ident.as_ref() else {
                    continue;
                };
                assignments.push(field_value(name.to_token_stream(), name, skip));
            }
            quote! { Self { #(#assignments),* } }
        }
        Fields::Unnamed(fields) => {
            let mut values = Vec::new();
            for (i, field) in fields.unnamed.iter().enumerate() {
                let skip = match is_skipped(field) {
                    Ok(skip) => skip,
                    Err(err) => return err.to_compile_error().into(),
                };
                let index = Index::from(i);
                values.push(if skip {
                    quote! { ::core::clone::Clone::clone(&from.#index) }
                } else {
                    quote! {
                        ::canopy::animation::Interpolate::interpolate(&from.#index, &to.#index, t)
                    }
                });
            }
            quote! { Self(#(#values),*) }
        }
        Fields::Unit => quote! { Self },
    };

    let expanded = quote! {
        impl #impl_generics ::canopy::animation::Interpolate for #struct_name #ty_generics #where_clause {
            fn interpolate(from: &Self, to: &Self, t: f32) -> Self {
                let _ = (&from, &to, t);
                #body
            }
        }
    };

    TokenStream::from(expanded)
}

fn field_value(
    member: proc_macro2::TokenStream,
    name: &syn::Ident,
    skip: bool,
) -> proc_macro2::TokenStream {
    if skip {
        quote! { #member: ::core::clone::Clone::clone(&from.#name) }
    } else {
        quote! {
            #member: ::canopy::animation::Interpolate::interpolate(&from.#name, &to.#name, t)
        }
    }
}

fn is_skipped(field: &Field) -> syn::Result<bool> {
    let mut skip = false;
    for attr in field.attrs.iter().filter(|a| a.path().is_ident("interpolate")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                skip = true;
                Ok(())
            } else {
                Err(meta.error("unsupported interpolate attribute, expected `skip`"))
            }
        })?;
    }
    Ok(skip)
}
