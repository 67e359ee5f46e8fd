//! The `LDAP://` path space used for addressing directory nodes.
use std::fmt;

use crate::error::Error;

/// Scheme prefix of directory paths, kept in the traditional ADSI casing.
const PROTOCOL_PREFIX: &str = "LDAP://";

/// Address of one node in the directory hierarchy.
///
/// Paths have the shape `LDAP://{domain}[/{relative}]`. The relative part is
/// either a slash separated chain of unit names as supplied by callers
/// (`Sales/East`) or a full distinguished name as carried by search results
/// (`OU=East,OU=Sales,DC=corp,DC=example,DC=com`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryPath {
	/// The domain the path is rooted at.
	domain: String,
	/// Location below the domain root, if any.
	relative: Option<String>,
}

impl DirectoryPath {
	/// The root path of a domain, `LDAP://{domain}`.
	#[must_use]
	pub fn base(domain: &str) -> Self {
		Self { domain: domain.to_owned(), relative: None }
	}

	/// Resolve a caller supplied path against the domain root.
	///
	/// Blank input addresses the root itself. Otherwise leading and trailing
	/// slashes are trimmed and, unless the input already starts with the
	/// domain's base path (compared case-insensitively), it is joined to the
	/// base path with a single slash.
	#[must_use]
	pub fn resolve(domain: &str, input: &str) -> Self {
		let trimmed = input.trim().trim_matches('/');
		if trimmed.is_empty() {
			return Self::base(domain);
		}

		let base = format!("{PROTOCOL_PREFIX}{domain}");
		if trimmed.len() >= base.len()
			&& trimmed.as_bytes()[..base.len()].eq_ignore_ascii_case(base.as_bytes())
		{
			let rest = trimmed[base.len()..].trim_matches('/');
			if trimmed.len() == base.len() || trimmed.as_bytes()[base.len()] == b'/' {
				return Self {
					domain: domain.to_owned(),
					relative: (!rest.is_empty()).then(|| rest.to_owned()),
				};
			}
		}

		Self { domain: domain.to_owned(), relative: Some(trimmed.to_owned()) }
	}

	/// The path of a child entry returned by a search, addressed by its
	/// distinguished name.
	#[must_use]
	pub fn child(&self, dn: &str) -> Self {
		Self { domain: self.domain.clone(), relative: Some(dn.to_owned()) }
	}

	/// The domain this path is rooted at.
	#[must_use]
	pub fn domain(&self) -> &str {
		&self.domain
	}

	/// The LDAP search base this path addresses.
	///
	/// A relative part containing `=` is taken to be a distinguished name
	/// already; a plain name chain like `Sales/East` maps to nested `OU=`
	/// components below the domain's `DC=` suffix.
	#[must_use]
	pub fn search_base(&self) -> String {
		match &self.relative {
			None => self.domain_dn(),
			Some(relative) if relative.contains('=') => relative.clone(),
			Some(relative) => {
				let mut components: Vec<String> = relative
					.split('/')
					.filter(|name| !name.is_empty())
					.rev()
					.map(|name| format!("OU={name}"))
					.collect();
				components.push(self.domain_dn());
				components.join(",")
			}
		}
	}

	/// The simple name of the node this path addresses: the value after the
	/// `=` of the leading relative distinguished name component, trimmed.
	///
	/// A node whose naming component carries no `=` separator violates the
	/// directory contract and fails loudly rather than yielding an empty
	/// name.
	pub fn leaf_name(&self) -> Result<String, Error> {
		let base = self.search_base();
		let leaf = base.split(',').next().unwrap_or_default();
		match leaf.split_once('=') {
			Some((_, value)) => Ok(value.trim().to_owned()),
			None => Err(Error::Invalid(format!("no naming component in `{leaf}`"))),
		}
	}

	/// The `DC=` components of the domain name.
	fn domain_dn(&self) -> String {
		self.domain
			.split('.')
			.filter(|part| !part.is_empty())
			.map(|part| format!("DC={part}"))
			.collect::<Vec<_>>()
			.join(",")
	}
}

impl fmt::Display for DirectoryPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.relative {
			None => write!(f, "{PROTOCOL_PREFIX}{}", self.domain),
			Some(relative) => write!(f, "{PROTOCOL_PREFIX}{}/{relative}", self.domain),
		}
	}
}

#[cfg(test)]
mod tests {
	#![allow(clippy::unwrap_used)]

	use super::DirectoryPath;

	#[test]
	fn resolve_blank_is_root() {
		let path = DirectoryPath::resolve("corp.example.com", "  ");
		assert_eq!(path.to_string(), "LDAP://corp.example.com");
		assert_eq!(path.search_base(), "DC=corp,DC=example,DC=com");
	}

	#[test]
	fn resolve_joins_relative_paths() {
		for input in ["Sales/East", "/Sales/East", "Sales/East/", "//Sales/East//"] {
			let path = DirectoryPath::resolve("corp.example.com", input);
			assert_eq!(path.to_string(), "LDAP://corp.example.com/Sales/East", "input: {input}");
		}
	}

	#[test]
	fn resolve_keeps_absolute_paths() {
		let path = DirectoryPath::resolve("corp.example.com", "ldap://CORP.example.COM/Sales");
		assert_eq!(path.to_string(), "LDAP://corp.example.com/Sales");

		let root = DirectoryPath::resolve("corp.example.com", "LDAP://corp.example.com/");
		assert_eq!(root.to_string(), "LDAP://corp.example.com");
	}

	#[test]
	fn resolve_rejects_lookalike_domains() {
		// The base must be a whole prefix component, not a substring match.
		let path = DirectoryPath::resolve("corp.example.com", "LDAP://corp.example.community");
		assert_eq!(path.to_string(), "LDAP://corp.example.com/LDAP://corp.example.community");
	}

	#[test]
	fn search_base_from_name_chain() {
		let path = DirectoryPath::resolve("corp.example.com", "Sales/East");
		assert_eq!(path.search_base(), "OU=East,OU=Sales,DC=corp,DC=example,DC=com");
	}

	#[test]
	fn search_base_from_distinguished_name() {
		let root = DirectoryPath::base("corp.example.com");
		let child = root.child("OU=Sales,DC=corp,DC=example,DC=com");
		assert_eq!(child.search_base(), "OU=Sales,DC=corp,DC=example,DC=com");
		assert_eq!(child.to_string(), "LDAP://corp.example.com/OU=Sales,DC=corp,DC=example,DC=com");
	}

	#[test]
	fn leaf_name_of_unit_and_root() {
		let unit = DirectoryPath::resolve("corp.example.com", "Sales/East");
		assert_eq!(unit.leaf_name().unwrap(), "East");

		let root = DirectoryPath::base("corp.example.com");
		assert_eq!(root.leaf_name().unwrap(), "corp");
	}

	#[test]
	fn leaf_name_without_separator_fails() {
		let path =
			DirectoryPath::base("corp.example.com").child("malformed,DC=corp,DC=example,DC=com");
		assert!(path.leaf_name().is_err());
	}
}
