use std::env;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Error {
    pub code: i32,
    pub message: String,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

impl std::error::Error for Error {}

impl From<env::VarError> for Error {
    fn from(_: env::VarError) -> Self {
        Error::env_var_error()
    }
}

impl From<reqwest::Error> for Error {
    fn from(_: reqwest::Error) -> Self {
        Error::request_error()
    }
}

impl From<tokio::time::error::Elapsed> for Error {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        Error::timeout_error()
    }
}

impl Error {
    pub fn unexpected_error() -> Self {
        Self {
            code: 0,
            message: "unexpected error".into(),
        }
    }

    pub fn env_var_error() -> Self {
        Self {
            code: 1,
            message: "environment variable error".into(),
        }
    }

    pub fn request_error() -> Self {
        Self {
            code: 2,
            message: "request error".into(),
        }
    }

    pub fn upstream_error() -> Self {
        Self {
            code: 3,
            message: "upstream error".into(),
        }
    }

    pub fn timeout_error() -> Self {
        Self {
            code: 4,
            message: "request timed out".into(),
        }
    }

    pub fn invalid_state_error() -> Self {
        Self {
            code: 100,
            message: "invalid state".into(),
        }
    }

    pub fn invalid_input_error() -> Self {
        Self {
            code: 101,
            message: "invalid input".into(),
        }
    }

    pub fn not_found_error() -> Self {
        Self {
            code: 103,
            message: "not found".into(),
        }
    }

    pub fn is_internal(&self) -> bool {
        (0..=99).contains(&self.code)
    }

    pub fn is_timeout_error(&self) -> bool {
        self.code == 4
    }

    pub fn is_not_found_error(&self) -> bool {
        self.code == 103
    }
}

#[test]
fn internal_codes() {
    assert!(Error::upstream_error().is_internal());
    assert!(Error::timeout_error().is_timeout_error());
    assert!(!Error::invalid_input_error().is_internal());
    assert!(Error::not_found_error().is_not_found_error());
}
