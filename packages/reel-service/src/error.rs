pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Store error: {message}")]
	Store { message: String },
}
impl Error {
	pub(crate) fn invalid(message: impl Into<String>) -> Self {
		Self::InvalidRequest { message: message.into() }
	}
}

impl From<reel_storage::Error> for Error {
	fn from(err: reel_storage::Error) -> Self {
		// Requests are validated before they reach the store, so anything it rejects is a store fault.
		Self::Store { message: err.to_string() }
	}
}

impl From<reel_providers::Error> for Error {
	fn from(err: reel_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}
