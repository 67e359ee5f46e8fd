use std::error::Error;

use ldap3::LdapConnAsync;

pub async fn ldap_connect() -> Result<ldap3::Ldap, Box<dyn Error>> {
	let (conn, mut ldap) = LdapConnAsync::new("ldap://localhost:1389").await?;
	let _handle = tokio::spawn(async move {
		if let Err(err) = conn.drive().await {
			panic!("Ldap connection error {err}");
		}
	});
	ldap.simple_bind("cn=admin,dc=example,dc=org", "adminpassword").await?;
	Ok(ldap)
}

pub async fn ldap_add_organizational_unit(
	ldap: &mut ldap3::Ldap,
	dn: &str,
) -> Result<(), Box<dyn Error>> {
	ldap.add(dn, vec![("objectClass", ["organizationalUnit"].into())]).await?.success()?;
	Ok(())
}

pub async fn ldap_add_user(
	ldap: &mut ldap3::Ldap,
	dn: &str,
	sn: &str,
	display_name: &str,
	account_control: &str,
	password: &str,
) -> Result<(), Box<dyn Error>> {
	ldap.add(
		dn,
		vec![
			("objectClass", ["inetOrgPerson"].into()),
			("sn", [sn].into()),
			("displayName", [display_name].into()),
			("employeeNumber", [account_control].into()),
			("userPassword", [password].into()),
		],
	)
	.await?
	.success()?;
	Ok(())
}

pub async fn ldap_add_group(
	ldap: &mut ldap3::Ldap,
	dn: &str,
	member: &str,
) -> Result<(), Box<dyn Error>> {
	ldap.add(dn, vec![("objectClass", ["groupOfNames"].into()), ("member", [member].into())])
		.await?
		.success()?;
	Ok(())
}

pub async fn ldap_delete(ldap: &mut ldap3::Ldap, dn: &str) -> Result<(), Box<dyn Error>> {
	ldap.delete(dn).await?.success()?;
	Ok(())
}
