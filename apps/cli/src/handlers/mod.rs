pub(crate) mod greet;
pub(crate) mod send;
