//! Session lifecycle notifications.

// self
use crate::_prelude::*;

/// Why the session ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogoutReason {
	/// The access token expired and no refresh token was available.
	MissingRefreshToken,
	/// The refresh endpoint rejected the refresh token or failed.
	RefreshFailed,
	/// The server kept rejecting the credential after a refresh.
	Unauthorized,
}
impl LogoutReason {
	/// Returns a stable label suitable for log fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			LogoutReason::MissingRefreshToken => "missing_refresh_token",
			LogoutReason::RefreshFailed => "refresh_failed",
			LogoutReason::Unauthorized => "unauthorized",
		}
	}
}
impl Display for LogoutReason {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Change notification emitted by a [`Session`](crate::session::Session).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEvent {
	/// Login stored a fresh token pair.
	TokensIssued,
	/// A refresh installed a new access token.
	TokensRefreshed,
	/// Every credential was cleared.
	TokensCleared,
	/// The client must navigate to the login view.
	LoginRequired {
		/// Why the session ended.
		reason: LogoutReason,
	},
}

/// Receives [`SessionEvent`]s; implemented for plain closures.
pub trait SessionObserver
where
	Self: Send + Sync,
{
	/// Handles one event. Runs synchronously on the notifying task.
	fn notify(&self, event: &SessionEvent);
}
impl<F> SessionObserver for F
where
	F: Fn(&SessionEvent) + Send + Sync,
{
	fn notify(&self, event: &SessionEvent) {
		self(event)
	}
}
