use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    LocationPermissionDenied,
    AwaitingLocation,
    SearchUnavailable,
    AddressNotFound,
    RouteUnavailable,
}

/// A transient, non-fatal message for the user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub retry: bool,
}

impl Notice {
    pub fn location_permission_denied() -> Self {
        Self {
            kind: NoticeKind::LocationPermissionDenied,
            message: "Location access is off. Enable it to request rides from where you are."
                .into(),
            retry: false,
        }
    }

    pub fn awaiting_location() -> Self {
        Self {
            kind: NoticeKind::AwaitingLocation,
            message: "Finding your location...".into(),
            retry: false,
        }
    }

    pub fn search_unavailable(err: &Error) -> Self {
        Self {
            kind: NoticeKind::SearchUnavailable,
            message: format!("Search is unavailable right now ({}).", err.message),
            retry: false,
        }
    }

    pub fn address_not_found(err: &Error) -> Self {
        Self {
            kind: NoticeKind::AddressNotFound,
            message: format!("Couldn't find that address ({}). Pick another result.", err.message),
            retry: false,
        }
    }

    pub fn route_unavailable(err: &Error) -> Self {
        let message = if err.is_timeout_error() {
            "Finding a route took too long.".to_string()
        } else {
            format!("No route found ({}).", err.message)
        };

        Self {
            kind: NoticeKind::RouteUnavailable,
            message,
            retry: true,
        }
    }
}
