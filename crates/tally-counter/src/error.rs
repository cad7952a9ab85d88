use thiserror::Error;

use tally_dom::DomError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VariantError {
    #[error("unknown style variant {0:?} (expected \"solid\" or \"outline\")")]
    Unknown(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("{0:?} is not a valid custom element name")]
    InvalidName(String),

    #[error("custom element {0:?} is already defined")]
    AlreadyDefined(String),

    #[error("no custom element definition for <{0}>")]
    UnknownElement(String),

    #[error(transparent)]
    Dom(#[from] DomError),
}
