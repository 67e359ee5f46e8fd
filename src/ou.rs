//! The organizational unit tree and its population algorithm.
use std::{future::Future, pin::Pin};

use tracing::{debug, warn};

use crate::{
	config::AttributeConfig,
	entry::SearchEntryExt,
	error::Error,
	ldap::UserEntry,
	path::DirectoryPath,
	session::{DirectorySession, SearchScope},
};

/// Object class that marks a child entry as a nested organizational unit.
const UNIT_OBJECT_CLASS: &str = "organizationalUnit";

/// Object classes that mark a child entry as a user account.
const USER_OBJECT_CLASSES: [&str; 2] = ["user", "person"];

/// Recursion budget for expanding nested organizational units.
///
/// The budget has three states rather than a signed counter, so that "no
/// limit", "n more levels" and "used up" cannot be confused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Depth {
	/// No limit, sub-units are expanded all the way down.
	Unlimited,
	/// Sub-units expanded below this node's children receive a budget
	/// smaller by one. `Remaining(0)` means one more level of sub-units,
	/// but no deeper.
	Remaining(u32),
	/// The budget is used up. Sub-units are not visited at all.
	Exhausted,
}

impl Depth {
	/// Convert the public `recurse`/`depth` call surface into a budget.
	/// Without recursion the budget starts out exhausted, which disables
	/// sub-unit expansion without affecting user listing.
	#[must_use]
	pub fn from_request(recurse: bool, depth: Option<u32>) -> Self {
		if !recurse {
			return Self::Exhausted;
		}
		depth.map_or(Self::Unlimited, Self::Remaining)
	}

	/// Whether a node populated with this budget may expand its sub-units.
	fn permits_descent(self) -> bool {
		!matches!(self, Self::Exhausted)
	}

	/// The budget handed to an expanded sub-unit.
	fn child(self) -> Self {
		match self {
			Self::Unlimited => Self::Unlimited,
			Self::Remaining(0) | Self::Exhausted => Self::Exhausted,
			Self::Remaining(budget) => Self::Remaining(budget - 1),
		}
	}
}

/// One node of the organizational unit tree.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct OrganizationalUnit {
	/// Simple name of the unit, e.g. `Sales` for a unit named `OU=Sales`.
	pub name: String,
	/// The full `LDAP://` path addressing this unit.
	pub path: String,
	/// The direct user members of this unit in enumeration order, excluding
	/// disabled accounts.
	pub users: Vec<UserEntry>,
	/// The direct child units in enumeration order. Empty unless population
	/// ran with a recursion budget that permitted descending here.
	pub organizational_units: Vec<OrganizationalUnit>,
}

impl OrganizationalUnit {
	/// Populate the unit at `path` from one level of remote child
	/// enumeration, recursing into nested units while `depth` permits.
	///
	/// A failed enumeration aborts population of this node and propagates,
	/// so a partially fetched tree is never silently returned as complete.
	pub(crate) fn populate<'a>(
		session: &'a mut dyn DirectorySession,
		path: &'a DirectoryPath,
		depth: Depth,
		attributes: &'a AttributeConfig,
	) -> Pin<Box<dyn Future<Output = Result<Self, Error>> + Send + 'a>> {
		Box::pin(async move {
			let base = path.search_base();
			debug!("Enumerating children of {base}");
			let entries = session
				.search(&base, SearchScope::OneLevel, "(objectClass=*)", attributes.as_list())
				.await?;

			let mut users = Vec::new();
			let mut organizational_units = Vec::new();
			for entry in entries {
				if entry.has_object_class(&attributes.object_class, UNIT_OBJECT_CLASS) {
					if !depth.permits_descent() {
						continue;
					}
					let child_path = path.child(&entry.dn);
					let child =
						Self::populate(&mut *session, &child_path, depth.child(), attributes)
							.await?;
					organizational_units.push(child);
				} else if USER_OBJECT_CLASSES
					.iter()
					.any(|class| entry.has_object_class(&attributes.object_class, class))
				{
					match UserEntry::from_search(&entry, attributes) {
						Ok(user) => {
							if !user.is_disabled() {
								users.push(user);
							}
						}
						Err(err) => warn!("Skipping malformed user entry {}: {err}", entry.dn),
					}
				}
			}

			Ok(Self { name: path.leaf_name()?, path: path.to_string(), users, organizational_units })
		})
	}
}
