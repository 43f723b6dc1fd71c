use std::collections::BTreeSet;

use domain_core::builder::validate_not_nil;
use domain_core::{Builder, DomainEntity, Timestamps};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UserClaim {
    pub claim_type: String,
    pub value: String,
}

impl UserClaim {
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UserRole {
    pub name: String,
}

impl UserRole {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// An external login linked to the user, unique per provider.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UserLogin {
    pub login_provider: String,
    pub provider_key: String,
}

impl UserLogin {
    pub fn new(login_provider: impl Into<String>, provider_key: impl Into<String>) -> Self {
        Self {
            login_provider: login_provider.into(),
            provider_key: provider_key.into(),
        }
    }
}

/// Updatable state of a [`User`]. `password` always holds a hash.
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct UserData {
    pub user_name: String,
    #[validate(length(min = 1, message = "Email must not be empty"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: String,
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,
    pub is_active: bool,
    pub is_deleted: bool,
    pub is_email_confirmed: bool,
    pub is_two_factor_authentication_enabled: bool,
    pub security_stamp: String,
    pub claims: BTreeSet<UserClaim>,
    pub roles: BTreeSet<UserRole>,
    pub logins: BTreeSet<UserLogin>,
}

impl Default for UserData {
    fn default() -> Self {
        Self {
            user_name: String::new(),
            email: String::new(),
            password: String::new(),
            name: String::new(),
            is_active: true,
            is_deleted: false,
            is_email_confirmed: false,
            is_two_factor_authentication_enabled: false,
            security_stamp: new_security_stamp(),
            claims: BTreeSet::new(),
            roles: BTreeSet::new(),
            logins: BTreeSet::new(),
        }
    }
}

pub fn new_security_stamp() -> String {
    Uuid::new_v4().simple().to_string().to_uppercase()
}

/// A user account and the claims, roles and external logins it owns.
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct User {
    #[validate(custom(function = "validate_not_nil"))]
    id: Uuid,
    timestamps: Timestamps,
    #[validate(nested)]
    data: UserData,
}

impl User {
    pub fn user_name(&self) -> &str {
        &self.data.user_name
    }

    pub fn email(&self) -> &str {
        &self.data.email
    }

    pub fn password_hash(&self) -> &str {
        &self.data.password
    }

    pub fn name(&self) -> &str {
        &self.data.name
    }

    pub fn is_active(&self) -> bool {
        self.data.is_active
    }

    pub fn is_deleted(&self) -> bool {
        self.data.is_deleted
    }

    pub fn is_email_confirmed(&self) -> bool {
        self.data.is_email_confirmed
    }

    pub fn is_two_factor_authentication_enabled(&self) -> bool {
        self.data.is_two_factor_authentication_enabled
    }

    pub fn security_stamp(&self) -> &str {
        &self.data.security_stamp
    }

    pub fn claims(&self) -> &BTreeSet<UserClaim> {
        &self.data.claims
    }

    pub fn roles(&self) -> &BTreeSet<UserRole> {
        &self.data.roles
    }

    pub fn logins(&self) -> &BTreeSet<UserLogin> {
        &self.data.logins
    }

    pub fn has_role(&self, name: &str) -> bool {
        self.data.roles.iter().any(|role| role.name == name)
    }

    pub fn confirm_email(&mut self) {
        self.data.is_email_confirmed = true;
    }

    pub fn activate(&mut self) {
        self.data.is_active = true;
    }

    pub fn deactivate(&mut self) {
        self.data.is_active = false;
    }

    /// Returns `false` if the user already had the claim.
    pub fn add_claim(&mut self, claim: UserClaim) -> bool {
        self.data.claims.insert(claim)
    }

    /// Returns `false` if the user already had the role.
    pub fn add_role(&mut self, role: UserRole) -> bool {
        self.data.roles.insert(role)
    }

    /// Returns `false` if the login was already linked.
    pub fn add_login(&mut self, login: UserLogin) -> bool {
        self.data.logins.insert(login)
    }

    /// A user read back from storage; skips validation.
    pub(crate) fn restore(id: Uuid, data: UserData, timestamps: Timestamps) -> Self {
        Self {
            id,
            timestamps,
            data,
        }
    }
}

impl DomainEntity for User {
    type Id = Uuid;
    type Data = UserData;

    const TYPE_NAME: &'static str = "User";

    fn id(&self) -> Uuid {
        self.id
    }

    fn generate_id() -> Uuid {
        Uuid::now_v7()
    }

    fn timestamps(&self) -> &Timestamps {
        &self.timestamps
    }

    fn timestamps_mut(&mut self) -> &mut Timestamps {
        &mut self.timestamps
    }

    fn data(&self) -> &UserData {
        &self.data
    }

    fn data_mut(&mut self) -> &mut UserData {
        &mut self.data
    }
}

/// Builds a [`User`]. Id, name, email and password hash are required; the
/// user name falls back to the email.
///
/// A builder seeded with [`UserBuilder::from_user`] keeps the user's flags
/// and collections. Replacing the password hash issues a new security stamp.
#[derive(Debug, Clone, Default)]
pub struct UserBuilder {
    id: Option<Uuid>,
    data: UserData,
}

impl UserBuilder {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: Some(user.id),
            data: user.data.clone(),
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_new_id(self) -> Self {
        self.with_id(User::generate_id())
    }

    pub fn with_user_name(mut self, user_name: impl Into<String>) -> Self {
        self.data.user_name = user_name.into();
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.data.email = email.into();
        self
    }

    pub fn with_password_hash(mut self, hash: impl Into<String>) -> Self {
        let hash = hash.into();
        if hash != self.data.password {
            self.data.password = hash;
            self.data.security_stamp = new_security_stamp();
        }
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.data.name = name.into();
        self
    }

    pub fn with_active(mut self, is_active: bool) -> Self {
        self.data.is_active = is_active;
        self
    }

    pub fn with_email_confirmed(mut self, is_email_confirmed: bool) -> Self {
        self.data.is_email_confirmed = is_email_confirmed;
        self
    }
}

impl Builder for UserBuilder {
    type Output = User;

    fn do_build(self) -> User {
        let mut data = self.data;
        if data.user_name.is_empty() {
            data.user_name = data.email.clone();
        }

        User {
            id: self.id.unwrap_or_default(),
            timestamps: Timestamps::new(),
            data,
        }
    }
}
