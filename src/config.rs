//! Config for the directory client.
use std::{fs::File, io::BufReader, path::PathBuf, sync::Arc, time::Duration};

use ldap3::LdapConnSettings;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Error;

/// Directory client configuration.
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct Config {
	/// The URL to connect to the server with. Supports ldap and ldaps
	/// schemes.
	pub url: Url,
	/// Name of the directory domain, e.g. `corp.example.com`. Forms the
	/// `LDAP://{domain}` base path and the `DC=` components of search bases.
	pub domain: String,
	/// Connection settings.
	pub connection: ConnectionConfig,
	/// The username the client itself binds with for queries.
	pub service_user: String,
	/// The password for the service account.
	pub service_password: String,
	/// Filters to use for searches
	pub searches: Searches,
	/// Names of attributes to search for and extract data from.
	pub attributes: AttributeConfig,
}

impl Config {
	/// Check that the configuration is usable before any remote call is
	/// attempted.
	pub(crate) fn validate(&self) -> Result<(), Error> {
		if self.domain.trim().is_empty() {
			return Err(Error::Config("domain name must not be blank".to_owned()));
		}
		if self.service_user.trim().is_empty() || self.service_password.trim().is_empty() {
			return Err(Error::Config("service account credentials must not be blank".to_owned()));
		}
		Ok(())
	}
}

/// Configuration for how to connect to the directory server
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConnectionConfig {
	/// Timeout to establish a connection in seconds.
	pub timeout: u64,

	/// Timeout for a single remote operation. Bounds every bind, search and
	/// unbind performed during a traversal.
	pub operation_timeout: Duration,

	/// TLS config
	pub tls: TLSConfig,
}

impl Default for ConnectionConfig {
	fn default() -> Self {
		Self {
			timeout: 10,
			operation_timeout: Duration::from_secs(30),
			tls: TLSConfig::default(),
		}
	}
}

/// TLS Configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TLSConfig {
	/// Use StartTLS extended operation for establishing a secure connection,
	/// rather than TLS on a dedicated port.
	pub starttls: bool,

	/// Disable verification of TLS certificates
	pub no_tls_verify: bool,

	/// TLS root certificates path
	pub root_certificates_path: Option<PathBuf>,

	/// Path of the TLS client key to use for the connection
	pub client_key_path: Option<PathBuf>,

	/// Path of the TLS client certificate to use for the connection
	pub client_certificate_path: Option<PathBuf>,
}

/// Configurable filters to use for directory searches
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Searches {
	/// The filter selecting user entries, combined with an exact account
	/// name match for identity lookups
	pub user_filter: String,
	/// The filter selecting group entries, combined with the name pattern
	/// for group searches
	pub group_filter: String,
}

impl Default for Searches {
	fn default() -> Self {
		Self {
			user_filter: "(objectClass=user)".to_owned(),
			group_filter: "(objectClass=group)".to_owned(),
		}
	}
}

/// Names of attributes to use for extracting relevant data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeConfig {
	/// The attribute containing the immutable unique id of a user
	pub pid: String,
	/// The attribute that holds a user's display name
	pub name: String,
	/// The attribute that holds the canonical short account name of users
	/// and groups
	pub account_name: String,
	/// The attribute that holds the account control bit flags
	pub account_control: String,
	/// The attribute naming an entry's object classes
	pub object_class: String,
	/// The attribute that holds a group's name
	pub group_name: String,
}

impl Default for AttributeConfig {
	fn default() -> Self {
		Self {
			pid: "objectGUID".to_owned(),
			name: "displayName".to_owned(),
			account_name: "sAMAccountName".to_owned(),
			account_control: "userAccountControl".to_owned(),
			object_class: "objectClass".to_owned(),
			group_name: "cn".to_owned(),
		}
	}
}

impl AttributeConfig {
	/// Returns the list of attributes the server should return when
	/// enumerating the children of an organizational unit.
	#[must_use]
	pub fn as_list(&self) -> Vec<String> {
		vec![
			self.pid.clone(),
			self.name.clone(),
			self.account_name.clone(),
			self.account_control.clone(),
			self.object_class.clone(),
		]
	}

	/// Returns the list of attributes the server should return for group
	/// searches.
	pub(crate) fn group_list(&self) -> Vec<String> {
		vec![self.group_name.clone(), self.account_name.clone(), self.object_class.clone()]
	}
}

impl ConnectionConfig {
	/// Create a [`LdapConnSettings`] based on this [`ConnectionConfig`]
	pub(crate) fn to_settings(&self) -> Result<LdapConnSettings, Error> {
		if matches!(
			(&self.tls.client_key_path, &self.tls.client_certificate_path),
			(Some(_), None) | (None, Some(_))
		) {
			return Err(Error::Config(
				"Both a client certificate and key file in PKCS8 format must be specified"
					.to_owned(),
			));
		}

		let mut settings = LdapConnSettings::new();

		settings = settings.set_conn_timeout(Duration::from_secs(self.timeout));
		settings = settings.set_starttls(self.tls.starttls);
		settings = settings.set_no_tls_verify(self.tls.no_tls_verify);

		if let Some(path) = &self.tls.root_certificates_path {
			let mut roots = rustls::RootCertStore::empty();
			for cert in rustls_pemfile::certs(&mut BufReader::new(File::open(path)?))? {
				roots
					.add(&rustls::Certificate(cert))
					.map_err(|_| Error::Config("could not parse root certificate".to_owned()))?;
			}

			let builder =
				rustls::ClientConfig::builder().with_safe_defaults().with_root_certificates(roots);

			let tls_config = match (&self.tls.client_key_path, &self.tls.client_certificate_path) {
				(Some(key_path), Some(cert_path)) => {
					let certs = rustls_pemfile::certs(&mut BufReader::new(File::open(cert_path)?))?
						.into_iter()
						.map(rustls::Certificate)
						.collect();
					let mut keys = rustls_pemfile::pkcs8_private_keys(&mut BufReader::new(
						File::open(key_path)?,
					))?;
					if keys.is_empty() {
						return Err(Error::Config(
							"no PKCS8 private key found in client key file".to_owned(),
						));
					}
					let key = rustls::PrivateKey(keys.remove(0));
					builder.with_client_auth_cert(certs, key).map_err(|_| {
						Error::Config("could not use client certificate and key".to_owned())
					})?
				}
				_ => builder.with_no_client_auth(),
			};
			settings = settings.set_config(Arc::new(tls_config));
		}
		Ok(settings)
	}
}
