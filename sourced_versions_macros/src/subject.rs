use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, LitStr};

pub fn derive_subject(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let options = match extract_options(&input) {
        Ok(options) => options,
        Err(err) => return err.to_compile_error().into(),
    };
    let tag = options
        .tag
        .unwrap_or_else(|| to_snake_case(&name.to_string()));
    let title = match options.title {
        Some(title) => quote! { ::core::option::Option::Some(#title) },
        None => quote! { ::core::option::Option::None },
    };

    let id_field = match extract_id_field(&input) {
        Ok(field) => field,
        Err(err) => return err.to_compile_error().into(),
    };

    let expanded = quote! {
        impl #impl_generics sourced_versions::Subject for #name #ty_generics #where_clause {
            const SUBJECT_TYPE: &'static str = #tag;
            const TITLE_FIELD: ::core::option::Option<&'static str> = #title;

            fn subject_id(&self) -> ::core::option::Option<u64> {
                self.#id_field
            }
        }
    };

    TokenStream::from(expanded)
}

#[derive(Default)]
struct SubjectOptions {
    tag: Option<String>,
    title: Option<String>,
}

fn extract_options(input: &DeriveInput) -> syn::Result<SubjectOptions> {
    let mut options = SubjectOptions::default();
    for attr in &input.attrs {
        if !attr.path().is_ident("subject") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("tag") {
                let value: LitStr = meta.value()?.parse()?;
                options.tag = Some(value.value());
                Ok(())
            } else if meta.path.is_ident("title") {
                let value: LitStr = meta.value()?.parse()?;
                options.title = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("unknown subject option; expected `tag` or `title`"))
            }
        })?;
    }
    Ok(options)
}

fn extract_id_field(input: &DeriveInput) -> syn::Result<syn::Ident> {
    let Data::Struct(data_struct) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Subject derive: only structs with named fields are supported",
        ));
    };
    let Fields::Named(fields) = &data_struct.fields else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Subject derive: only structs with named fields are supported",
        ));
    };

    for field in &fields.named {
        for attr in &field.attrs {
            if !attr.path().is_ident("subject") {
                continue;
            }
            let mut is_id = false;
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("id") {
                    is_id = true;
                    Ok(())
                } else {
                    Err(meta.error("unknown subject field option; expected `id`"))
                }
            })?;
            if is_id {
                if let Some(ident) = &field.ident {
                    return Ok(ident.clone());
                }
            }
        }
    }

    // Default: look for a field named "id"
    for field in &fields.named {
        if let Some(ident) = &field.ident {
            if ident == "id" {
                return Ok(ident.clone());
            }
        }
    }

    Err(syn::Error::new_spanned(
        &input.ident,
        "Subject derive: no field marked with #[subject(id)] and no field named `id`",
    ))
}

fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, ch) in s.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
        } else {
            result.push(ch);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn reads_tag_and_title() {
        let input: DeriveInput = parse_quote! {
            #[subject(tag = "post", title = "title")]
            struct Post { id: Option<u64>, title: String }
        };
        let options = extract_options(&input).unwrap();
        assert_eq!(options.tag.as_deref(), Some("post"));
        assert_eq!(options.title.as_deref(), Some("title"));
    }

    #[test]
    fn rejects_unknown_struct_option() {
        let input: DeriveInput = parse_quote! {
            #[subject(titel = "title")]
            struct Post { id: Option<u64> }
        };
        let err = extract_options(&input).err().unwrap();
        assert!(err.to_string().contains("unknown subject option"));
    }

    #[test]
    fn rejects_non_string_tag() {
        let input: DeriveInput = parse_quote! {
            #[subject(tag = 5)]
            struct Post { id: Option<u64> }
        };
        assert!(extract_options(&input).is_err());
    }

    #[test]
    fn id_field_marker_and_default() {
        let marked: DeriveInput = parse_quote! {
            struct Page { #[subject(id)] page_id: Option<u64>, id: Option<u64> }
        };
        assert_eq!(extract_id_field(&marked).unwrap(), "page_id");

        let plain: DeriveInput = parse_quote! {
            struct Note { id: Option<u64> }
        };
        assert_eq!(extract_id_field(&plain).unwrap(), "id");
    }

    #[test]
    fn rejects_unknown_field_option() {
        let input: DeriveInput = parse_quote! {
            struct Page { #[subject(key)] page_id: Option<u64> }
        };
        let err = extract_id_field(&input).err().unwrap();
        assert!(err.to_string().contains("unknown subject field option"));
    }

    #[test]
    fn snake_case_default_tag() {
        assert_eq!(to_snake_case("BlogPost"), "blog_post");
        assert_eq!(to_snake_case("Page"), "page");
    }
}
