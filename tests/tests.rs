#![allow(
	clippy::dbg_macro,
	clippy::expect_used,
	clippy::missing_docs_in_private_items,
	clippy::print_stderr,
	clippy::print_stdout,
	clippy::unwrap_used,
	clippy::bool_assert_comparison
)]
use std::error::Error;

use ad_directory::{
	config::{AttributeConfig, Config, ConnectionConfig, Searches},
	Directory,
};
use serial_test::serial;
use tracing_subscriber::{filter::LevelFilter, EnvFilter};
use url::Url;

mod common;

use common::{ldap_add_group, ldap_add_organizational_unit, ldap_add_user, ldap_connect, ldap_delete};

#[must_use]
pub fn directory() -> Directory {
	let config = Config {
		url: Url::parse("ldap://localhost:1389").unwrap(),
		domain: "example.org".to_owned(),
		connection: ConnectionConfig::default(),
		service_user: "cn=admin,dc=example,dc=org".to_owned(),
		service_password: "adminpassword".to_owned(),
		searches: Searches {
			user_filter: "(objectClass=inetOrgPerson)".to_owned(),
			group_filter: "(objectClass=groupOfNames)".to_owned(),
		},
		attributes: AttributeConfig {
			pid: "entryUUID".to_owned(),
			name: "displayName".to_owned(),
			account_name: "cn".to_owned(),
			account_control: "employeeNumber".to_owned(),
			object_class: "objectClass".to_owned(),
			group_name: "cn".to_owned(),
		},
	};

	Directory::new(config).unwrap()
}

#[ignore = "docker"]
#[tokio::test]
#[serial]
async fn ou_traversal_test() -> Result<(), Box<dyn Error>> {
	let tracing_filter = EnvFilter::default().add_directive(LevelFilter::DEBUG.into());
	tracing_subscriber::fmt().with_env_filter(tracing_filter).init();

	let mut ldap = ldap_connect().await?;

	ldap_add_organizational_unit(&mut ldap, "ou=users,dc=example,dc=org").await?;
	ldap_add_user(
		&mut ldap,
		"cn=user01,ou=users,dc=example,dc=org",
		"User1",
		"MyName1",
		"512",
		"Passw0rd1",
	)
	.await?;
	ldap_add_user(
		&mut ldap,
		"cn=user02,ou=users,dc=example,dc=org",
		"User2",
		"MyName2",
		"514",
		"Passw0rd2",
	)
	.await?;
	ldap_add_organizational_unit(&mut ldap, "ou=staff,ou=users,dc=example,dc=org").await?;
	ldap_add_user(
		&mut ldap,
		"cn=user03,ou=staff,ou=users,dc=example,dc=org",
		"User3",
		"MyName3",
		"512",
		"Passw0rd3",
	)
	.await?;
	ldap_add_organizational_unit(&mut ldap, "ou=interns,ou=staff,ou=users,dc=example,dc=org")
		.await?;

	let directory = directory();

	// Without recursion only the direct, enabled users are listed.
	let flat = directory.organizational_unit(Some("users"), false, None).await?;
	assert_eq!(flat.name, "users");
	assert_eq!(flat.path, "LDAP://example.org/users");
	assert_eq!(flat.users.len(), 1, "the disabled account must be excluded");
	assert_eq!(flat.users[0].display_name.as_deref(), Some("MyName1"));
	assert!(flat.organizational_units.is_empty());

	// Depth 0 expands one level of sub-units and no deeper.
	let tree = directory.organizational_unit(Some("users"), true, Some(0)).await?;
	assert_eq!(tree.organizational_units.len(), 1);
	let staff = &tree.organizational_units[0];
	assert_eq!(staff.name, "staff");
	assert_eq!(staff.users.len(), 1);
	assert!(staff.organizational_units.is_empty());

	// Unlimited depth reaches the empty interns unit.
	let tree = directory.organizational_unit(Some("users"), true, None).await?;
	let staff = &tree.organizational_units[0];
	assert_eq!(staff.organizational_units.len(), 1);
	assert_eq!(staff.organizational_units[0].name, "interns");

	ldap_delete(&mut ldap, "ou=interns,ou=staff,ou=users,dc=example,dc=org").await?;
	ldap_delete(&mut ldap, "cn=user03,ou=staff,ou=users,dc=example,dc=org").await?;
	ldap_delete(&mut ldap, "ou=staff,ou=users,dc=example,dc=org").await?;
	ldap_delete(&mut ldap, "cn=user02,ou=users,dc=example,dc=org").await?;
	ldap_delete(&mut ldap, "cn=user01,ou=users,dc=example,dc=org").await?;
	ldap_delete(&mut ldap, "ou=users,dc=example,dc=org").await?;
	ldap.unbind().await?;

	Ok(())
}

#[ignore = "docker"]
#[tokio::test]
#[serial]
async fn authenticate_user_test() -> Result<(), Box<dyn Error>> {
	let mut ldap = ldap_connect().await?;

	ldap_add_organizational_unit(&mut ldap, "ou=users,dc=example,dc=org").await?;
	ldap_add_user(
		&mut ldap,
		"cn=user01,ou=users,dc=example,dc=org",
		"User1",
		"MyName1",
		"512",
		"Passw0rd1",
	)
	.await?;

	let directory = directory();

	assert_eq!(directory.authenticate_user("user01", "Passw0rd1").await?, true);
	assert_eq!(directory.authenticate_user("user01", "wrongpass").await?, false);
	// An unknown user is indistinguishable from a wrong password.
	assert_eq!(directory.authenticate_user("ghost", "wrongpass").await?, false);
	assert_eq!(directory.authenticate_user("user01", "").await?, false);

	ldap_delete(&mut ldap, "cn=user01,ou=users,dc=example,dc=org").await?;
	ldap_delete(&mut ldap, "ou=users,dc=example,dc=org").await?;
	ldap.unbind().await?;

	Ok(())
}

#[ignore = "docker"]
#[tokio::test]
#[serial]
async fn group_search_test() -> Result<(), Box<dyn Error>> {
	let mut ldap = ldap_connect().await?;

	let admin = "cn=admin,dc=example,dc=org";
	ldap_add_organizational_unit(&mut ldap, "ou=groups,dc=example,dc=org").await?;
	ldap_add_group(&mut ldap, "cn=zeta-users,ou=groups,dc=example,dc=org", admin).await?;
	ldap_add_group(&mut ldap, "cn=admins,ou=groups,dc=example,dc=org", admin).await?;
	ldap_add_group(&mut ldap, "cn=operators,ou=groups,dc=example,dc=org", admin).await?;

	let directory = directory();

	let names = directory.group_names("*").await?;
	assert_eq!(names, ["admins", "operators", "zeta-users"], "must be sorted ascending");

	let group = directory.find_group("oper*").await?.unwrap();
	assert_eq!(group.account_name, "operators");

	assert!(directory.find_group("nonexistent").await?.is_none());

	ldap_delete(&mut ldap, "cn=operators,ou=groups,dc=example,dc=org").await?;
	ldap_delete(&mut ldap, "cn=admins,ou=groups,dc=example,dc=org").await?;
	ldap_delete(&mut ldap, "cn=zeta-users,ou=groups,dc=example,dc=org").await?;
	ldap_delete(&mut ldap, "ou=groups,dc=example,dc=org").await?;
	ldap.unbind().await?;

	Ok(())
}
