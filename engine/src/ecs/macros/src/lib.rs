mod component;

use proc_macro::TokenStream;

/// Derive an empty `Component` impl, leaving the initialize/finalize hooks as no-ops.
#[proc_macro_derive(Component)]
pub fn derive_component(item: TokenStream) -> TokenStream {
    component::derive_component(item)
}
