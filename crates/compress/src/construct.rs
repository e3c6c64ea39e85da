use crate::error::{Error, ErrorKind};
use crate::{CompressionType, Resolver};
use std::str::FromStr;

impl FromStr for CompressionType {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Resolver::default().resolve(s) {
            Some(kind) => Ok(kind),
            None => exn::bail!(ErrorKind::UnsupportedFormat(s.to_string())),
        }
    }
}

impl TryFrom<i32> for CompressionType {
    type Error = Error;
    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match Self::from_tag(value) {
            Some(kind) => Ok(kind),
            None => exn::bail!(ErrorKind::UnsupportedFormat(value.to_string())),
        }
    }
}

impl CompressionType {
    /// Look up a format by its integer tag. Any value outside the
    /// enumeration returns `None`.
    #[must_use]
    pub fn from_tag(tag: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| i32::from(kind.tag()) == tag)
    }
}
