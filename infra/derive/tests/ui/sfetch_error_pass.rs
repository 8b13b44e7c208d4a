use sfetch_derive::sfetch_error;
use std::borrow::Cow;

#[sfetch_error]
pub enum DemoError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read() -> Result<()> {
    let io: std::result::Result<(), std::io::Error> =
        Err(std::io::Error::new(std::io::ErrorKind::Other, "boom"));
    io.context("reading frame")?;
    Ok(())
}

fn main() {
    let err = read().unwrap_err();
    assert_eq!(err.kind(), "Io");
    assert_eq!(err.to_string(), "IO error (reading frame): boom");

    assert_eq!(DemoError::AuthenticationFailed.kind(), "AuthenticationFailed");

    let internal: DemoError = "fallback".into();
    assert_eq!(internal.kind(), "Internal");
    let labelled: Result<()> = Err(internal);
    let labelled = labelled.context("stage").unwrap_err();
    assert_eq!(labelled.to_string(), "Internal error (stage): fallback");
}
