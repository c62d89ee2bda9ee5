use serde::{Deserialize, Serialize};

/// One registered ERP XL installation with its database and license data.
///
/// Text fields use the empty string for "not set". `name` is the natural
/// key for lookups, but nothing enforces its uniqueness.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename = "InstallationPath", rename_all = "PascalCase", default)]
pub struct InstallationPath {
    pub name: String,
    pub path: String,
    pub database: String,
    pub license_server: String,
    pub license_key: String,
}

impl InstallationPath {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    pub fn with_license(
        mut self,
        server: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        self.license_server = server.into();
        self.license_key = key.into();
        self
    }

    /// License string passed to the XL client: `server::key`, or whichever
    /// half is present.
    pub fn formatted_license_info(&self) -> String {
        match (self.license_server.is_empty(), self.license_key.is_empty()) {
            (false, false) => {
                format!("{}::{}", self.license_server, self.license_key)
            },
            (false, true) => self.license_server.clone(),
            (true, false) => self.license_key.clone(),
            (true, true) => String::new(),
        }
    }

    /// Return whether every field is blank.
    pub fn is_empty(&self) -> bool {
        [
            &self.name,
            &self.path,
            &self.database,
            &self.license_server,
            &self.license_key,
        ]
        .iter()
        .all(|field| field.is_empty())
    }

    /// Copy the non-key fields of `other` onto this entry.
    pub(crate) fn assign_details(&mut self, other: &InstallationPath) {
        self.path.clone_from(&other.path);
        self.database.clone_from(&other.database);
        self.license_server.clone_from(&other.license_server);
        self.license_key.clone_from(&other.license_key);
    }
}
