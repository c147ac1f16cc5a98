use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, parse_macro_input};

pub fn derive_component(input: TokenStream) -> TokenStream {
    // Parse the input tokens into a syntax tree
    let ast = parse_macro_input!(input as DeriveInput);

    // Get the type we are annotating along with any generics it carries
    let name = &ast.ident;
    let (impl_generics, type_generics, where_clause) = ast.generics.split_for_impl();

    // `::ember_engine` resolves inside the crate through `extern crate self as ember_engine;`
    // in lib.rs, and outside the crate through the normal dependency.
    TokenStream::from(quote! {
        impl #impl_generics ::ember_engine::ecs::Component for #name #type_generics #where_clause {
        }
    })
}
