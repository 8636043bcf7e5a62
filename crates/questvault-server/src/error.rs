//! Errors raised while assembling the service state.

use std::borrow::Cow;
use std::error::Error as StdError;

use strum::{AsRefStr, IntoStaticStr};

pub type BoxedError = Box<dyn StdError + Send + Sync>;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Settings are missing, out of range or contradict each other.
    Config,
    /// A blob or catalog store could not be opened.
    External,
}

/// Failure to turn a [`ServiceConfig`] into a running [`ServiceState`].
///
/// [`ServiceConfig`]: crate::service::ServiceConfig
/// [`ServiceState`]: crate::service::ServiceState
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {message}")]
    Config {
        message: Cow<'static, str>,
        #[source]
        source: Option<BoxedError>,
    },

    #[error("external error: {store}: {message}")]
    External {
        store: Cow<'static, str>,
        message: Cow<'static, str>,
        #[source]
        source: Option<BoxedError>,
    },
}

impl Error {
    pub fn config(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Failure of the named store, e.g. `"postgres"` or `"blob store"`.
    pub fn external(
        store: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::External {
            store: store.into(),
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, cause: impl Into<BoxedError>) -> Self {
        match &mut self {
            Self::Config { source, .. } | Self::External { source, .. } => {
                *source = Some(cause.into());
            }
        }
        self
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Config { .. } => ErrorKind::Config,
            Self::External { .. } => ErrorKind::External,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn external_errors_name_the_store() {
        let error = Error::external("postgres", "failed to connect");
        assert_eq!(error.kind(), ErrorKind::External);
        assert_eq!(
            error.to_string(),
            "external error: postgres: failed to connect"
        );
    }

    #[test]
    fn causes_are_chained() {
        let error = Error::config("bad secret").with_source(std::io::Error::other("empty"));
        assert_eq!(error.kind(), ErrorKind::Config);
        assert!(error.source().is_some());
    }
}
