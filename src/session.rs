//! The connection seam between the facade and the directory server.
use std::time::Duration;

use async_trait::async_trait;
use ldap3::{LdapConnAsync, Scope, SearchEntry};
use tracing::warn;

use crate::{config::Config, error::Error};

/// LDAP result code for a rejected credential pair.
const INVALID_CREDENTIALS: u32 = 49;

/// Scope of an LDAP search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
	/// The base object only.
	Base,
	/// Immediate children of the base. The scope used for tree traversal.
	OneLevel,
	/// The whole subtree below the base.
	Subtree,
}

impl From<SearchScope> for Scope {
	fn from(scope: SearchScope) -> Self {
		match scope {
			SearchScope::Base => Scope::Base,
			SearchScope::OneLevel => Scope::OneLevel,
			SearchScope::Subtree => Scope::Subtree,
		}
	}
}

/// A single authenticated channel to the directory service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub(crate) trait DirectorySession: Send {
	/// Bind with the given identity and password. `Ok(false)` means the
	/// directory rejected the credential pair; transport failures are
	/// errors.
	async fn simple_bind(&mut self, dn: &str, password: &str) -> Result<bool, Error>;

	/// Run a search, returning all matching entries.
	async fn search(
		&mut self,
		base: &str,
		scope: SearchScope,
		filter: &str,
		attrs: Vec<String>,
	) -> Result<Vec<SearchEntry>, Error>;

	/// Close the session.
	async fn unbind(&mut self) -> Result<(), Error>;
}

/// Opens sessions against a directory server.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub(crate) trait DirectoryConnector: Send + Sync {
	/// Open a fresh, not yet authenticated session.
	async fn connect(&self) -> Result<Box<dyn DirectorySession>, Error>;
}

/// The real connector, backed by `ldap3`.
#[derive(Debug, Clone)]
pub(crate) struct LdapConnector {
	/// The configuration to open connections with.
	config: Config,
}

impl LdapConnector {
	/// Create a connector for the given configuration.
	pub(crate) fn new(config: Config) -> Self {
		Self { config }
	}
}

#[async_trait]
impl DirectoryConnector for LdapConnector {
	/// Create a connection to an ldap server based on the settings and url
	/// specified in the configuration.
	async fn connect(&self) -> Result<Box<dyn DirectorySession>, Error> {
		let settings = self.config.connection.to_settings()?;
		let (conn, ldap) =
			LdapConnAsync::from_url_with_settings(settings, &self.config.url).await?;
		tokio::spawn(async move {
			if let Err(err) = conn.drive().await {
				warn!("Ldap connection error {err}");
			}
		});
		Ok(Box::new(LdapSession {
			inner: ldap,
			operation_timeout: self.config.connection.operation_timeout,
		}))
	}
}

/// A live `ldap3` session with per-operation timeouts.
struct LdapSession {
	/// The handle operations are issued through.
	inner: ldap3::Ldap,
	/// Time budget for each remote operation.
	operation_timeout: Duration,
}

#[async_trait]
impl DirectorySession for LdapSession {
	async fn simple_bind(&mut self, dn: &str, password: &str) -> Result<bool, Error> {
		let result =
			tokio::time::timeout(self.operation_timeout, self.inner.simple_bind(dn, password))
				.await
				.map_err(|_| Error::Timeout)??;
		if result.rc == INVALID_CREDENTIALS {
			return Ok(false);
		}
		result.success()?;
		Ok(true)
	}

	async fn search(
		&mut self,
		base: &str,
		scope: SearchScope,
		filter: &str,
		attrs: Vec<String>,
	) -> Result<Vec<SearchEntry>, Error> {
		let result = tokio::time::timeout(
			self.operation_timeout,
			self.inner.search(base, scope.into(), filter, attrs),
		)
		.await
		.map_err(|_| Error::Timeout)??;
		let (entries, _) = result.success()?;
		Ok(entries.into_iter().map(SearchEntry::construct).collect())
	}

	async fn unbind(&mut self) -> Result<(), Error> {
		tokio::time::timeout(self.operation_timeout, self.inner.unbind())
			.await
			.map_err(|_| Error::Timeout)??;
		Ok(())
	}
}
