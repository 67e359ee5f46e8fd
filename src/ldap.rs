//! The directory facade: authentication, lookups and tree retrieval.
use std::fmt;

use ldap3::SearchEntry;
use tracing::warn;

use crate::{
	config::{AttributeConfig, Config},
	entry::{is_account_disabled, SearchEntryExt},
	error::Error,
	ou::{Depth, OrganizationalUnit},
	path::DirectoryPath,
	session::{DirectoryConnector, DirectorySession, LdapConnector, SearchScope},
};

/// Data about a user account.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct UserEntry {
	/// The immutable globally unique ID of the user.
	pub pid: Vec<u8>,
	/// The canonical short account name.
	pub username: Option<String>,
	/// Display name.
	pub display_name: Option<String>,
	/// The raw account control bit flags.
	pub account_control: u32,
}

impl UserEntry {
	/// Converts a [`SearchEntry`] to a [`UserEntry`] using the attribute names
	/// in the given configuration.
	pub fn from_search(entry: &SearchEntry, attributes: &AttributeConfig) -> Result<Self, Error> {
		let pid = entry.bin_attr_first(&attributes.pid).ok_or(Error::Missing)?.to_owned();
		let username = entry.attr_first(&attributes.account_name).map(String::from);
		let display_name = entry.attr_first(&attributes.name).map(String::from);
		let account_control = match entry.u32_first(&attributes.account_control) {
			Some(Ok(flags)) => flags,
			Some(Err(err)) => {
				warn!("Unreadable account control on {}: {err}", entry.dn);
				0
			}
			None => 0,
		};
		Ok(Self { pid, username, display_name, account_control })
	}

	/// Whether the account control flags mark this account as disabled.
	#[must_use]
	pub fn is_disabled(&self) -> bool {
		is_account_disabled(self.account_control)
	}
}

/// Data about a group.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct GroupEntry {
	/// Name of the group.
	pub name: String,
	/// The canonical short account name the group is addressed and sorted
	/// by.
	pub account_name: String,
}

impl GroupEntry {
	/// Converts a [`SearchEntry`] to a [`GroupEntry`] using the attribute
	/// names in the given configuration.
	pub fn from_search(entry: &SearchEntry, attributes: &AttributeConfig) -> Result<Self, Error> {
		let name = entry.attr_first(&attributes.group_name).ok_or(Error::Missing)?.to_owned();
		let account_name =
			entry.attr_first(&attributes.account_name).ok_or(Error::Missing)?.to_owned();
		Ok(Self { name, account_name })
	}
}

/// Holds credentials and provides the query interface to one directory
/// domain.
///
/// The facade keeps no state across calls; every operation opens a session,
/// performs its remote calls and closes the session again.
pub struct Directory {
	/// The client configuration.
	config: Config,
	/// Opens a fresh session per top-level call.
	connector: Box<dyn DirectoryConnector>,
}

impl fmt::Debug for Directory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Directory").field("config", &self.config).finish_non_exhaustive()
	}
}

impl Directory {
	/// Create a facade for the configured domain.
	///
	/// Fails when the configuration is unusable, before any remote call is
	/// attempted.
	pub fn new(config: Config) -> Result<Self, Error> {
		config.validate()?;
		let connector = Box::new(LdapConnector::new(config.clone()));
		Ok(Self { config, connector })
	}

	/// Create a facade with a custom connector, for tests.
	#[cfg(test)]
	fn with_connector(config: Config, connector: Box<dyn DirectoryConnector>) -> Result<Self, Error> {
		config.validate()?;
		Ok(Self { config, connector })
	}

	/// The `LDAP://{domain}` base path all relative paths resolve against.
	#[must_use]
	pub fn base_path(&self) -> String {
		DirectoryPath::base(&self.config.domain).to_string()
	}

	/// Validate an end user's credential pair against the domain.
	///
	/// Returns `false` for an unknown user exactly as for a wrong password;
	/// the two outcomes are deliberately indistinguishable to the caller.
	/// Transport failures and rejected service credentials are errors.
	pub async fn authenticate_user(&self, username: &str, password: &str) -> Result<bool, Error> {
		// An empty password would be an unauthenticated bind, which the
		// server reports as success.
		if password.is_empty() {
			return Ok(false);
		}

		let mut session = self.service_session().await?;
		let found = self.search_user(&mut *session, username).await;
		close(&mut *session).await;
		let Some(entry) = found? else {
			return Ok(false);
		};

		let mut session = self.connector.connect().await?;
		let outcome = session.simple_bind(&entry.dn, password).await;
		close(&mut *session).await;
		outcome
	}

	/// Look up a user by exact account name.
	///
	/// `Ok(None)` is a definitive negative; infrastructure failures are
	/// surfaced as errors rather than folded into the negative.
	pub async fn find_user(&self, username: &str) -> Result<Option<UserEntry>, Error> {
		let mut session = self.service_session().await?;
		let found = self.search_user(&mut *session, username).await;
		close(&mut *session).await;
		found?.map(|entry| UserEntry::from_search(&entry, &self.config.attributes)).transpose()
	}

	/// Find the first group whose name matches the possibly wildcarded
	/// `name`, in the ordering of [`Directory::search_groups`].
	pub async fn find_group(&self, name: &str) -> Result<Option<GroupEntry>, Error> {
		Ok(self.search_groups(name).await?.into_iter().next())
	}

	/// Find all groups whose name matches the possibly wildcarded `filter`
	/// (`*` matches every group), sorted ascending by account name. The
	/// ordering is part of the contract.
	pub async fn search_groups(&self, filter: &str) -> Result<Vec<GroupEntry>, Error> {
		let mut session = self.service_session().await?;
		let found = self.search_group_entries(&mut *session, filter).await;
		close(&mut *session).await;

		let mut groups = Vec::new();
		for entry in found? {
			match GroupEntry::from_search(&entry, &self.config.attributes) {
				Ok(group) => groups.push(group),
				Err(err) => warn!("Skipping malformed group entry {}: {err}", entry.dn),
			}
		}
		groups.sort_by(|a, b| a.account_name.cmp(&b.account_name));
		Ok(groups)
	}

	/// The account names of all groups matching the possibly wildcarded
	/// `filter`, in the ordering of [`Directory::search_groups`].
	pub async fn group_names(&self, filter: &str) -> Result<Vec<String>, Error> {
		Ok(self.search_groups(filter).await?.into_iter().map(|group| group.account_name).collect())
	}

	/// Retrieve the organizational unit tree at `path`.
	///
	/// A missing or blank `path` addresses the domain root; a relative path
	/// like `Sales/East` is resolved against the base path. `recurse` gates
	/// whether sub-units are expanded and `depth` bounds how deep, where
	/// `None` means unlimited. Nothing is cached; every call re-fetches.
	pub async fn organizational_unit(
		&self,
		path: Option<&str>,
		recurse: bool,
		depth: Option<u32>,
	) -> Result<OrganizationalUnit, Error> {
		let path = DirectoryPath::resolve(&self.config.domain, path.unwrap_or_default());
		let budget = Depth::from_request(recurse, depth);

		let mut session = self.service_session().await?;
		let populated =
			OrganizationalUnit::populate(&mut *session, &path, budget, &self.config.attributes)
				.await;
		close(&mut *session).await;
		populated
	}

	/// Open a session and bind the service account.
	async fn service_session(&self) -> Result<Box<dyn DirectorySession>, Error> {
		let mut session = self.connector.connect().await?;
		if !session.simple_bind(&self.config.service_user, &self.config.service_password).await? {
			close(&mut *session).await;
			return Err(Error::ServiceBind);
		}
		Ok(session)
	}

	/// Find the directory entry of a user by exact account name.
	async fn search_user(
		&self,
		session: &mut dyn DirectorySession,
		username: &str,
	) -> Result<Option<SearchEntry>, Error> {
		let filter = format!(
			"(&{}({}={}))",
			self.config.searches.user_filter,
			self.config.attributes.account_name,
			escape_filter_value(username),
		);
		let base = DirectoryPath::base(&self.config.domain).search_base();
		let mut entries = session
			.search(&base, SearchScope::Subtree, &filter, self.config.attributes.as_list())
			.await?;
		if entries.is_empty() {
			return Ok(None);
		}
		Ok(Some(entries.remove(0)))
	}

	/// Fetch all group entries matching the name pattern.
	async fn search_group_entries(
		&self,
		session: &mut dyn DirectorySession,
		filter: &str,
	) -> Result<Vec<SearchEntry>, Error> {
		let filter = format!(
			"(&{}({}={}))",
			self.config.searches.group_filter,
			self.config.attributes.group_name,
			escape_filter_pattern(filter),
		);
		let base = DirectoryPath::base(&self.config.domain).search_base();
		session
			.search(&base, SearchScope::Subtree, &filter, self.config.attributes.group_list())
			.await
	}
}

/// Close a session, only logging failures so they never mask the result of
/// the operation the session was opened for.
async fn close(session: &mut dyn DirectorySession) {
	if let Err(err) = session.unbind().await {
		warn!("Failed to close directory session: {err}");
	}
}

/// Escape a literal value for embedding in a search filter per RFC 4515.
fn escape_filter_value(value: &str) -> String {
	escape_filter(value, true)
}

/// Escape a name pattern for embedding in a search filter, preserving `*`
/// as the wildcard.
fn escape_filter_pattern(pattern: &str) -> String {
	escape_filter(pattern, false)
}

/// Escape filter metacharacters, optionally including the `*` wildcard.
fn escape_filter(value: &str, escape_wildcards: bool) -> String {
	let mut escaped = String::with_capacity(value.len());
	for ch in value.chars() {
		match ch {
			'*' if escape_wildcards => escaped.push_str("\\2a"),
			'(' => escaped.push_str("\\28"),
			')' => escaped.push_str("\\29"),
			'\\' => escaped.push_str("\\5c"),
			'\0' => escaped.push_str("\\00"),
			_ => escaped.push(ch),
		}
	}
	escaped
}
