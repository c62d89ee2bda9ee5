use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Argument sentinel requesting synthesized database/license arguments.
pub const ARGUMENTS_INCLUDE: &str = "include";
/// Argument sentinel requesting no arguments at all.
pub const ARGUMENTS_SKIP: &str = "skip";

/// Kind tag stored with every button.
///
/// Decoding is permissive: tags written by a newer release decode into
/// [`ButtonKind::Unknown`] and are written back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum ButtonKind {
    #[default]
    UserStandard,
    SystemStandard,
    SystemSpecial,
    Unknown(String),
}

impl ButtonKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::UserStandard => "UserStandard",
            Self::SystemStandard => "SystemStandard",
            Self::SystemSpecial => "SystemSpecial",
            Self::Unknown(raw) => raw,
        }
    }

    /// Decode a stored tag. Symbolic names and legacy ordinals are accepted.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "" | "UserStandard" | "0" => Self::UserStandard,
            "SystemStandard" | "1" => Self::SystemStandard,
            "SystemSpecial" | "2" => Self::SystemSpecial,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn is_standard(&self) -> bool {
        matches!(self, Self::UserStandard | Self::SystemStandard)
    }
}

impl fmt::Display for ButtonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ButtonKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ButtonKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        let kind = Self::parse(&raw);
        if let Self::Unknown(tag) = &kind {
            log::warn!("unknown button type \"{tag}\" kept as-is");
        }
        Ok(kind)
    }
}

/// A persisted launcher icon.
///
/// Equality covers every field; it drives exact-duplicate removal on
/// import and lookups when reordering.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename = "ButtonRecord", rename_all = "PascalCase", default)]
pub struct ButtonRecord {
    pub button_text: String,
    /// Relative to `directory`; empty opens the directory itself.
    pub file_name: String,
    pub image_source: String,
    pub run_as_admin: bool,
    /// Literal arguments or one of the `include` / `skip` sentinels.
    pub arguments: String,
    pub tool_tip_text: String,
    /// Empty means "use the selected installation's path".
    pub directory: String,
    pub button_type: ButtonKind,
    /// Only meaningful for [`ButtonKind::SystemSpecial`].
    pub action_identifier: String,
}

impl ButtonRecord {
    pub fn new(
        button_text: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            button_text: button_text.into(),
            file_name: file_name.into(),
            ..Self::default()
        }
    }

    /// Build a special-action button.
    pub fn special(
        button_text: impl Into<String>,
        action_identifier: impl Into<String>,
    ) -> Self {
        Self {
            button_text: button_text.into(),
            button_type: ButtonKind::SystemSpecial,
            action_identifier: action_identifier.into(),
            ..Self::default()
        }
    }

    pub fn with_directory(mut self, directory: impl Into<String>) -> Self {
        self.directory = directory.into();
        self
    }

    pub fn with_arguments(mut self, arguments: impl Into<String>) -> Self {
        self.arguments = arguments.into();
        self
    }

    pub fn with_image(mut self, image_source: impl Into<String>) -> Self {
        self.image_source = image_source.into();
        self
    }

    pub fn with_tool_tip(mut self, tool_tip_text: impl Into<String>) -> Self {
        self.tool_tip_text = tool_tip_text.into();
        self
    }

    pub fn with_kind(mut self, button_type: ButtonKind) -> Self {
        self.button_type = button_type;
        self
    }

    pub fn elevated(mut self, run_as_admin: bool) -> Self {
        self.run_as_admin = run_as_admin;
        self
    }

    /// Return whether the identifying fields are all blank.
    pub fn is_empty(&self) -> bool {
        self.button_text.is_empty()
            && self.file_name.is_empty()
            && self.image_source.is_empty()
    }

    /// Key used by duplicate removal.
    pub(crate) fn dedupe_key(&self) -> (String, String, String) {
        (
            self.button_text.clone(),
            self.file_name.clone(),
            self.image_source.clone(),
        )
    }
}
