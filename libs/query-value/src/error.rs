use std::borrow::Cow;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("could not convert `{from}` to `{to}`")]
pub struct ConversionFailure {
    pub from: Cow<'static, str>,
    pub to: Cow<'static, str>,
}

impl ConversionFailure {
    pub fn new(from: impl Into<Cow<'static, str>>, to: impl Into<Cow<'static, str>>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}
