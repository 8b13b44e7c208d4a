use std::borrow::Cow;

/// Configuration loading and validation failures.
///
/// None of the variants carries the secret value itself.
#[sfetch_derive::sfetch_error]
pub enum ConfigError {
    #[error("Missing secret{}: {message}", format_context(.context))]
    MissingSecret { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    #[error("Invalid URL{}: {message}", format_context(.context))]
    InvalidUrl { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    #[error("Invalid configuration{}: {message}", format_context(.context))]
    Invalid { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    #[error("Config error{}: {source}", format_context(.context))]
    Source { source: config::ConfigError, context: Option<Cow<'static, str>> },
    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
