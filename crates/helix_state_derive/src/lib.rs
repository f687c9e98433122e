use proc_macro::TokenStream;
use proc_macro2::{Ident, Span, TokenStream as TokenStream2};
use proc_macro_crate::{FoundCrate, crate_name};
use quote::{format_ident, quote};
use syn::{Attribute, Data, DeriveInput, Fields, LitStr, parse_macro_input};

#[proc_macro_derive(FormModel, attributes(form))]
pub fn derive_form_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    if !input.generics.params.is_empty() {
        return syn::Error::new_spanned(
            input.ident,
            "FormModel derive currently supports only non-generic structs",
        )
        .to_compile_error()
        .into();
    }

    let model_ident = input.ident;
    let fields_struct_ident = format_ident!("{model_ident}Fields");

    let named_fields = match input.data {
        Data::Struct(data) => match data.fields {
            Fields::Named(fields) => fields.named,
            _ => {
                return syn::Error::new(
                    Span::call_site(),
                    "FormModel derive requires a struct with named fields",
                )
                .to_compile_error()
                .into();
            }
        },
        _ => {
            return syn::Error::new(
                Span::call_site(),
                "FormModel derive is only supported on structs",
            )
            .to_compile_error()
            .into();
        }
    };

    let helix = helix_state_path();
    let mut fields_methods = Vec::new();
    let mut record_entries = Vec::new();

    for field in named_fields {
        let Some(field_ident) = field.ident else {
            continue;
        };
        let key = match field_key(&field.attrs) {
            Ok(Some(renamed)) => renamed,
            Ok(None) => field_ident.to_string(),
            Err(error) => return error.to_compile_error().into(),
        };

        fields_methods.push(quote! {
            pub const fn #field_ident(&self) -> #helix::form::FieldKey {
                #helix::form::FieldKey::new(#key)
            }
        });

        record_entries.push(quote! {
            (
                #key,
                #helix::value::Value::from(::core::clone::Clone::clone(&self.#field_ident)),
            )
        });
    }

    quote! {
        #[derive(Clone, Copy, Debug, Default)]
        pub struct #fields_struct_ident;

        impl #fields_struct_ident {
            #(#fields_methods)*
        }

        impl #helix::form::FormModel for #model_ident {
            type Fields = #fields_struct_ident;

            fn fields() -> Self::Fields {
                #fields_struct_ident
            }

            fn to_value(&self) -> #helix::value::Value {
                #helix::value::Value::record::<&'static str, #helix::value::Value>([
                    #(#record_entries),*
                ])
            }
        }
    }
    .into()
}

fn field_key(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    let mut renamed = None;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("form")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                let value: LitStr = meta.value()?.parse()?;
                renamed = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("unsupported form attribute, expected `rename`"))
            }
        })?;
    }
    Ok(renamed)
}

fn helix_state_path() -> TokenStream2 {
    match crate_name("helix_state") {
        Ok(FoundCrate::Name(name)) => {
            let ident = Ident::new(&name, Span::call_site());
            quote!(::#ident)
        }
        Ok(FoundCrate::Itself) => quote!(crate),
        Err(_) => quote!(::helix_state),
    }
}
