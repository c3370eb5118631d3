use secrecy::{ExposeSecret, SecretString};

/// Login material for a switch management plane.
///
/// Used as HTTP basic auth by the REST driver and answered to the
/// `Username:` / `Password:` prompts by console drivers.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }

    /// The password in clear text, for the one place it goes on the wire.
    pub(crate) fn password(&self) -> &str {
        self.password.expose_secret()
    }
}
