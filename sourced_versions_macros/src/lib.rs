mod subject;

use proc_macro::TokenStream;

/// Derive macro implementing `sourced_versions::Subject`.
///
/// # Usage
///
/// ```ignore
/// use sourced_versions::Subject;
///
/// #[derive(Subject)]
/// #[subject(tag = "post", title = "title")]
/// struct Post {
///     #[subject(id)]
///     pub id: Option<u64>,
///     pub title: String,
/// }
/// ```
///
/// - `#[subject(tag = "...")]` sets the type tag stored with every version.
///   If omitted, defaults to the snake_case struct name.
/// - `#[subject(title = "...")]` names the attribute used as the default
///   version name. If omitted, versions are unnamed unless named explicitly.
/// - `#[subject(id)]` marks the `Option<u64>` identity field.
///   If omitted, defaults to a field named `id`.
#[proc_macro_derive(Subject, attributes(subject))]
pub fn derive_subject(input: TokenStream) -> TokenStream {
    subject::derive_subject(input)
}
