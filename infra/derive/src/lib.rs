#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros for the secure-fetch infrastructure.
//!
//! ## Usage
//! Every crate in the workspace declares its error enum with [`macro@sfetch_error`]:
//! ```toml
//! [dependencies]
//! sfetch-derive.workspace = true
//! thiserror.workspace = true
//! ```
//!
//! The examples below are `ignore`d to avoid compiling in this crate; the
//! `tests/ui` directory holds a compiling copy.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Attribute macro for defining crate-level error enums.
///
/// Turns a plain enum into an error type wired into the workspace conventions.
///
/// # Features
///
/// * **Automatic Derives**: Injects `#[derive(Debug, thiserror::Error)]`.
/// * **Type Aliasing**: Creates a `Result<T>` alias for the enum.
/// * **Context Support**: Generates a companion `...Ext` trait that adds `.context()`
///   to any `Result` that can be converted into this error type.
/// * **Standard Conversions**: Implements `From<T>` for variants containing a `source` field,
///   enabling the `?` operator for upstream errors.
/// * **Internal Fallback**: `From<&str>` and `From<String>` if an `Internal` variant exists.
/// * **Stable Labels**: `kind()` returns the variant name as a `&'static str`. Log events use
///   it to record *which* gate failed without formatting the error (and its context) itself.
///
/// # Requirements
///
/// 1. The macro must be applied to an **enum**.
/// 2. Variants that support context must include a `context: Option<Cow<'static, str>>` field.
/// 3. Variants wrapping external errors must include a `source: T` field or a field marked
///    with `#[source]`/`#[from]` (compatible with `thiserror`), plus a `context` field.
/// 4. Tuple variants are rejected. Unit variants are accepted and carry no context.
///
/// # Example
///
/// ```rust,ignore
/// use sfetch_derive::sfetch_error;
/// use std::borrow::Cow;
///
/// #[sfetch_error]
/// pub enum CodecError {
///     #[error("Malformed input{}: {message}", format_context(.context))]
///     Malformed { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
///
///     #[error("Authentication failed")]
///     AuthenticationFailed,
///
///     #[error("Internal fault{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn check(err: &CodecError) {
///     tracing::warn!(kind = err.kind(), "Rejected");
/// }
/// ```
#[proc_macro_attribute]
pub fn sfetch_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}
