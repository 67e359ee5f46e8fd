//! A client-side facade for an Active Directory style LDAP service.
//!
//! The library authenticates end-user credentials, resolves users and groups
//! by name and materializes the organizational unit (OU) hierarchy as an
//! owned in-memory tree. Tree retrieval walks the remote hierarchy with a
//! bounded, depth-limited recursion that lists the direct user members of
//! every visited unit, skips disabled accounts and entries without a usable
//! identifier, and aborts loudly when the directory cannot be enumerated,
//! so a partial tree is never mistaken for the directory's actual contents.
//!
//! For a general primer on LDAP, the [introduction] in the `ldap3` crate
//! which is used here for interfacing with LDAP is an excellent resource.
//!
//! [introduction]: https://github.com/inejge/ldap3/blob/master/LDAP-primer.md
//!
//! # Getting started
//! A minimal example of browsing a directory might look like so:
//! ```no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use url::Url;
//! use ad_directory::{
//!     config::{AttributeConfig, Config, ConnectionConfig, Searches},
//!     Directory,
//! };
//!
//! // Configuration can also be deserialized with serde. It's hand-constructed
//! // here for demonstration purposes.
//! let config = Config {
//!     url: Url::parse("ldap://dc01.corp.example.com")?,
//!     domain: "corp.example.com".to_owned(),
//!     connection: ConnectionConfig::default(),
//!     service_user: "svc-directory".to_owned(),
//!     service_password: "verysecret".to_owned(),
//!     searches: Searches::default(),
//!     attributes: AttributeConfig::default(),
//! };
//!
//! let directory = Directory::new(config)?;
//!
//! if directory.authenticate_user("jdoe", "hunter2").await? {
//!     println!("jdoe authenticated");
//! }
//!
//! // Two levels of sub-units below Sales, with each unit's users.
//! let sales = directory.organizational_unit(Some("Sales"), true, Some(1)).await?;
//! for unit in &sales.organizational_units {
//!     println!("{}: {} users", unit.name, unit.users.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Limitations
//! * Every call opens its own connection; there is no pooling and no
//!   caching of directory responses.
//! * The directory is read-only to this library. Entries cannot be created,
//!   modified or deleted through it.
//! * Sibling units are traversed sequentially, keeping the server's
//!   enumeration order for the resulting tree at the cost of latency on
//!   wide hierarchies.
//! * [secrecy](https://docs.rs/secrecy) is not used for storing the service
//!   account password, it probably should be

pub mod config;
pub mod entry;
pub mod error;
pub mod ldap;
pub mod ou;
pub mod path;
mod session;

pub use ldap3::{self, SearchEntry};

pub use crate::{
	config::{AttributeConfig, Config, ConnectionConfig, Searches, TLSConfig},
	entry::{is_account_disabled, SearchEntryExt, ACCOUNT_DISABLE},
	error::Error,
	ldap::{Directory, GroupEntry, UserEntry},
	ou::{Depth, OrganizationalUnit},
	path::DirectoryPath,
};
