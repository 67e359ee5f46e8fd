//! Helper methods for extracting data from search results.
use ldap3::SearchEntry;

use crate::error::Error;

/// The `userAccountControl` bit that marks an account as disabled.
pub const ACCOUNT_DISABLE: u32 = 0x0002;

/// Whether the given account control flags mark the account as disabled.
///
/// Entries carrying this bit are excluded from organizational unit
/// traversal results.
#[must_use]
pub fn is_account_disabled(flags: u32) -> bool {
	flags & ACCOUNT_DISABLE != 0
}

/// An extension trait for [`SearchEntry`] that provides convenience methods for
/// extracting data.
pub trait SearchEntryExt {
	/// Get the first value of an attribute. Will return `None` if attribute
	/// value is not valid UTF-8.
	fn attr_first(&self, attr: &str) -> Option<&str>;

	/// Get the first value of an attribute, in binary form
	fn bin_attr_first(&self, attr: &str) -> Option<&[u8]>;

	/// Get the first value of an attribute, interpreted as a decimal integer
	/// the way Active Directory serializes `userAccountControl`.
	fn u32_first(&self, attr: &str) -> Option<Result<u32, Error>> {
		self.attr_first(attr)
			.map(|value| value.parse::<u32>().map_err(|_| Error::Invalid(attr.to_owned())))
	}

	/// Whether any value of the given attribute names the object class,
	/// compared case-insensitively as LDAP requires.
	fn has_object_class(&self, attr: &str, class: &str) -> bool;
}

impl SearchEntryExt for SearchEntry {
	fn attr_first(&self, attr: &str) -> Option<&str> {
		let attr = self.attrs.get(attr)?;
		attr.first().map(String::as_str)
	}

	fn bin_attr_first(&self, attr: &str) -> Option<&[u8]> {
		if let Some(attr) = self.attrs.get(attr) {
			return attr.first().map(String::as_bytes);
		}

		if let Some(attr) = self.bin_attrs.get(attr) {
			return attr.first().map(Vec::as_slice);
		}
		None
	}

	fn has_object_class(&self, attr: &str, class: &str) -> bool {
		self.attrs
			.get(attr)
			.is_some_and(|values| values.iter().any(|value| value.eq_ignore_ascii_case(class)))
	}
}
