//! `#[derive(Gated)]` for backend request descriptors.
//!
//! ```ignore
//! #[derive(Gated)]
//! #[access(Premium)]
//! #[route(GET, "/dashboard/category/{category}")]
//! struct CategoryRequest { category: Category }
//! ```
//!
//! Every `{name}` in the route must be a field of the struct. Unknown
//! placeholders are rejected at compile time rather than producing a
//! request to the wrong path.

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::{
    parse_macro_input, Attribute, Data, DeriveInput, Error, Fields, Ident, LitStr, Result, Token,
};

#[proc_macro_derive(Gated, attributes(access, route))]
pub fn derive_gated(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand_gated(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand_gated(input: &DeriveInput) -> Result<proc_macro2::TokenStream> {
    let access = find_attr(&input.attrs, "access")?.parse_args::<AccessTier>()?;
    let route = find_attr(&input.attrs, "route")?.parse_args::<Route>()?;

    let fields = named_fields(input);
    let placeholders = route.placeholders()?;
    for placeholder in &placeholders {
        if !fields.iter().any(|f| f == placeholder) {
            return Err(Error::new_spanned(
                &route.template,
                format!(
                    "route placeholder `{{{placeholder}}}` does not name a field of `{}`",
                    input.ident
                ),
            ));
        }
    }

    let access_expr = access.tokens();
    let method_expr = route.method.tokens();
    let template = &route.template;
    let args = placeholders.iter().map(|p| {
        let field = Ident::new(p, template.span());
        quote! { #field = self.#field }
    });

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::shield_access::Gated for #name #ty_generics #where_clause {
            const METHOD: ::shield_access::Method = #method_expr;

            fn access(&self) -> ::shield_access::Access {
                #access_expr
            }

            fn path(&self) -> ::std::string::String {
                ::std::format!(#template #(, #args)*)
            }
        }
    })
}

fn find_attr<'a>(attrs: &'a [Attribute], name: &str) -> Result<&'a Attribute> {
    attrs
        .iter()
        .find(|attr| attr.path().is_ident(name))
        .ok_or_else(|| Error::new(Span::call_site(), format!("missing #[{name}(...)] attribute")))
}

fn named_fields(input: &DeriveInput) -> Vec<String> {
    match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => named
                .named
                .iter()
                .filter_map(|f| f.ident.as_ref().map(|i| i.to_string()))
                .collect(),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

enum AccessTier {
    Public,
    Authenticated,
    Premium,
}

impl AccessTier {
    fn tokens(&self) -> proc_macro2::TokenStream {
        match self {
            AccessTier::Public => quote! { ::shield_access::Access::Public },
            AccessTier::Authenticated => quote! { ::shield_access::Access::Authenticated },
            AccessTier::Premium => quote! { ::shield_access::Access::Premium },
        }
    }
}

impl Parse for AccessTier {
    fn parse(input: ParseStream<'_>) -> Result<Self> {
        let tier: Ident = input.parse()?;

        let parsed = match tier.to_string().as_str() {
            "Public" => Self::Public,
            "Authenticated" => Self::Authenticated,
            "Premium" => Self::Premium,
            other => {
                return Err(Error::new_spanned(
                    tier,
                    format!("unsupported access tier `{other}`; expected Public, Authenticated or Premium"),
                ))
            }
        };

        if input.is_empty() {
            Ok(parsed)
        } else {
            Err(input.error("unexpected tokens in #[access(...)] attribute"))
        }
    }
}

enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    fn tokens(&self) -> proc_macro2::TokenStream {
        match self {
            HttpMethod::Get => quote! { ::shield_access::Method::Get },
            HttpMethod::Post => quote! { ::shield_access::Method::Post },
        }
    }
}

struct Route {
    method: HttpMethod,
    template: LitStr,
}

impl Route {
    /// Field names referenced by `{...}` in the path, first use order, no repeats.
    fn placeholders(&self) -> Result<Vec<String>> {
        let path = self.template.value();
        if !path.starts_with('/') {
            return Err(Error::new_spanned(&self.template, "route path must start with `/`"));
        }

        let mut names: Vec<String> = Vec::new();
        let mut chars = path.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                }
                '{' => {
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(c) if c == '_' || c.is_ascii_alphanumeric() => name.push(c),
                            _ => {
                                return Err(Error::new_spanned(
                                    &self.template,
                                    "route placeholders must look like `{field}`",
                                ))
                            }
                        }
                    }
                    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
                        return Err(Error::new_spanned(
                            &self.template,
                            "route placeholders must look like `{field}`",
                        ));
                    }
                    if !names.contains(&name) {
                        names.push(name);
                    }
                }
                '}' => {
                    return Err(Error::new_spanned(&self.template, "unmatched `}` in route path"));
                }
                _ => {}
            }
        }
        Ok(names)
    }
}

impl Parse for Route {
    fn parse(input: ParseStream<'_>) -> Result<Self> {
        let method: Ident = input.parse()?;
        let method = match method.to_string().as_str() {
            "GET" => HttpMethod::Get,
            "POST" => HttpMethod::Post,
            other => {
                return Err(Error::new_spanned(
                    method,
                    format!("unsupported method `{other}`; expected GET or POST"),
                ))
            }
        };
        input.parse::<Token![,]>()?;
        let template: LitStr = input.parse()?;

        if input.is_empty() {
            Ok(Self { method, template })
        } else {
            Err(input.error("unexpected tokens in #[route(...)] attribute"))
        }
    }
}
