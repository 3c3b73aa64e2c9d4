use alloc::string::String;
use core::fmt;

use crate::{DsError, DsResult};

/// A validated data store object name.
///
/// Names are slash-separated and safe to map onto a Unix-style path: they
/// never contain `..`, a backslash, a NUL byte, a leading or trailing slash,
/// or an empty segment.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectName(pub(crate) String);

impl ObjectName {
    pub fn new(name: &str) -> DsResult<Self> {
        Self::validate(name)?;
        Ok(Self(String::from(name)))
    }

    pub fn validate(name: &str) -> DsResult<()> {
        if name.is_empty()
            || name.contains("..")
            || name.contains('\\')
            || name.contains('\0')
            || name.starts_with('/')
            || name.ends_with('/')
            || name.contains("//")
        {
            return Err(DsError::InvalidName);
        }
        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObjectName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for ObjectName {
    type Error = DsError;

    fn try_from(name: &str) -> DsResult<Self> {
        Self::new(name)
    }
}
