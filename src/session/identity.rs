//! Account payloads exchanged with the signup, registration, and identity endpoints.

// self
use crate::_prelude::*;

/// Organization-level role of a user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
	/// Organization administrator.
	Admin,
	/// Group supervisor.
	Supervisor,
	/// Support agent.
	Agent,
	/// Role added server-side after this client was built.
	#[serde(other)]
	Other,
}
impl Role {
	/// `true` for roles allowed into the organization admin screens.
	pub fn is_org_admin(self) -> bool {
		matches!(self, Role::Admin | Role::Supervisor)
	}
}

/// Organization the signed-in user belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
	/// Organization identifier.
	pub id: u64,
	/// Display name.
	pub name: String,
	/// Optional e-mail domain.
	#[serde(default)]
	pub domain: String,
}

/// Signed-in user returned by the identity endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
	/// User identifier.
	pub id: u64,
	/// Login name.
	pub username: String,
	/// Contact e-mail.
	#[serde(default)]
	pub email: String,
	/// Given name.
	#[serde(default)]
	pub first_name: String,
	/// Family name.
	#[serde(default)]
	pub last_name: String,
	/// Organization-level role.
	pub role: Role,
	/// Organization, absent for platform staff.
	#[serde(default)]
	pub organization: Option<Organization>,
}

/// Public signup payload; creates an agent account.
#[derive(Clone, Debug, Serialize)]
pub struct SignupRequest {
	/// Login name.
	pub username: String,
	/// Contact e-mail.
	pub email: String,
	/// Plain-text password; sent once, never stored.
	pub password: String,
}

/// Registration payload that creates a new organization or joins one by invite code.
#[derive(Clone, Debug, Default, Serialize)]
pub struct RegistrationRequest {
	/// Login name.
	pub username: String,
	/// Contact e-mail.
	pub email: String,
	/// Plain-text password; sent once, never stored.
	pub password: String,
	/// Given name.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub first_name: Option<String>,
	/// Family name.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub last_name: Option<String>,
	/// Name of the organization to create.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub organization_name: Option<String>,
	/// Invite code of the organization to join.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub organization_code: Option<String>,
	/// Requested role when joining by invite code.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub role: Option<Role>,
}

#[derive(Serialize)]
pub(crate) struct LoginBody<'a> {
	pub(crate) username: &'a str,
	pub(crate) password: &'a str,
}
