use std::fmt;

/// Script run by [`SpecialAction::RegisterComponents`], relative to the
/// installation directory.
pub const REGISTRATION_SCRIPT: &str = "Rejestracja.bat";

const REGISTRY_COMPUTER_CONFIG: &str =
    r"HKEY_LOCAL_MACHINE\SOFTWARE\WOW6432Node\CDN\CDN XL";
const REGISTRY_USER_DATABASES: &str =
    r"HKEY_CURRENT_USER\Software\CDN\CDN XL\Bazy";
const REGISTRY_COMPUTER_DATABASES: &str =
    r"HKEY_LOCAL_MACHINE\SOFTWARE\WOW6432Node\CDN\CDN XL\Bazy";
const REGISTRY_DS_SERVICES: &str =
    r"HKEY_LOCAL_MACHINE\SOFTWARE\WOW6432Node\Comarch\DS";

/// Built-in behaviors selectable by a special button's action identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialAction {
    RegistryComputerConfig,
    RegistryUserDatabases,
    RegistryComputerDatabases,
    RegistryDsServices,
    RegisterComponents,
    ChangePathVariable,
    OpenTempFolder,
}

impl SpecialAction {
    pub const ALL: [SpecialAction; 7] = [
        Self::RegistryComputerConfig,
        Self::RegistryUserDatabases,
        Self::RegistryComputerDatabases,
        Self::RegistryDsServices,
        Self::RegisterComponents,
        Self::ChangePathVariable,
        Self::OpenTempFolder,
    ];

    pub fn identifier(self) -> &'static str {
        match self {
            Self::RegistryComputerConfig => "RegistryComputerConfig",
            Self::RegistryUserDatabases => "RegistryUserDatabases",
            Self::RegistryComputerDatabases => "RegistryComputerDatabases",
            Self::RegistryDsServices => "RegistryDsServices",
            Self::RegisterComponents => "RegisterComponents",
            Self::ChangePathVariable => "ChangePathVariable",
            Self::OpenTempFolder => "OpenTempFolder",
        }
    }

    /// Look up an action by identifier. Surrounding whitespace is ignored.
    pub fn parse(identifier: &str) -> Option<Self> {
        let identifier = identifier.trim();
        Self::ALL
            .into_iter()
            .find(|action| action.identifier() == identifier)
    }

    /// Human readable label used by the built-in templates.
    pub fn label(self) -> &'static str {
        match self {
            Self::RegistryComputerConfig => "Registry: computer configuration",
            Self::RegistryUserDatabases => "Registry: user databases",
            Self::RegistryComputerDatabases => "Registry: computer databases",
            Self::RegistryDsServices => "Registry: DS services",
            Self::RegisterComponents => "Register XL components",
            Self::ChangePathVariable => "Prioritize XL in PATH",
            Self::OpenTempFolder => "Open temp folder",
        }
    }

    /// Registry key opened by the registry view actions.
    pub fn registry_key(self) -> Option<&'static str> {
        match self {
            Self::RegistryComputerConfig => Some(REGISTRY_COMPUTER_CONFIG),
            Self::RegistryUserDatabases => Some(REGISTRY_USER_DATABASES),
            Self::RegistryComputerDatabases => {
                Some(REGISTRY_COMPUTER_DATABASES)
            },
            Self::RegistryDsServices => Some(REGISTRY_DS_SERVICES),
            _ => None,
        }
    }
}

impl fmt::Display for SpecialAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}
