use crate::error::XlPilotError;
use crate::model::{ButtonRecord, InstallationPath};

/// Characters rejected in user-supplied text before it is persisted.
pub const FORBIDDEN_CHARACTERS: [char; 6] =
    ['<', '>', '&', '\'', '"', '\u{a0}'];

/// Return whether `input` is free of forbidden characters.
pub fn validate_input(input: Option<&str>) -> bool {
    input.is_none_or(|text| !text.contains(FORBIDDEN_CHARACTERS))
}

/// Forbidden characters present in `text`, in first-seen order.
pub fn forbidden_characters(text: &str) -> Vec<char> {
    let mut found = Vec::new();
    for ch in text.chars().filter(|ch| FORBIDDEN_CHARACTERS.contains(ch)) {
        if !found.contains(&ch) {
            found.push(ch);
        }
    }
    found
}

fn check_field(field: &'static str, value: &str) -> Result<(), XlPilotError> {
    let found = forbidden_characters(value);
    if found.is_empty() {
        return Ok(());
    }

    let characters = found
        .iter()
        .map(|ch| match ch {
            '\u{a0}' => String::from("non-breaking space"),
            other => format!("'{other}'"),
        })
        .collect::<Vec<_>>()
        .join(", ");
    Err(XlPilotError::ForbiddenCharacters { field, characters })
}

pub fn validate_button(record: &ButtonRecord) -> Result<(), XlPilotError> {
    check_field("ButtonText", &record.button_text)?;
    check_field("FileName", &record.file_name)?;
    check_field("ImageSource", &record.image_source)?;
    check_field("Arguments", &record.arguments)?;
    check_field("ToolTipText", &record.tool_tip_text)?;
    check_field("Directory", &record.directory)?;
    check_field("ActionIdentifier", &record.action_identifier)
}

pub fn validate_installation_path(
    path: &InstallationPath,
) -> Result<(), XlPilotError> {
    check_field("Name", &path.name)?;
    check_field("Path", &path.path)?;
    check_field("Database", &path.database)?;
    check_field("LicenseServer", &path.license_server)?;
    check_field("LicenseKey", &path.license_key)
}
