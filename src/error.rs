//! Error codes

/// Errors that can occur when using this library
#[derive(thiserror::Error, Debug)]
pub enum Error {
	/// A required attribute in a search result was missing.
	#[error("Missing data")]
	Missing,
	/// A value did not conform to the expected syntax.
	#[error("Malformed data: {0}")]
	Invalid(String),
	/// The configuration is unusable, e.g. blank service credentials.
	#[error("Invalid configuration: {0}")]
	Config(String),
	/// The directory rejected the service account credentials.
	#[error("Service account bind was rejected")]
	ServiceBind,
	/// A remote operation did not complete within the configured timeout.
	#[error("Directory operation timed out")]
	Timeout,
	/// Reading TLS certificate or key material failed.
	#[error(transparent)]
	Io(#[from] std::io::Error),
	/// An underlying protocol error or similar occurred, or the LDAP library
	/// was used incorrectly.
	#[error(transparent)]
	Ldap(#[from] ldap3::LdapError),
}
