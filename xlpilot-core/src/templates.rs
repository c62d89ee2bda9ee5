//! Built-in buttons offered in the toolbox.

use crate::dispatch::SpecialAction;
use crate::model::{ARGUMENTS_INCLUDE, ButtonKind, ButtonRecord};

/// Executable of the ERP XL client inside an installation directory.
pub const XL_CLIENT_EXECUTABLE: &str = "cdnxl.exe";

/// Standard buttons that run inside the selected installation.
pub fn system_buttons() -> Vec<ButtonRecord> {
    vec![
        ButtonRecord::new("ERP XL", XL_CLIENT_EXECUTABLE)
            .with_arguments(ARGUMENTS_INCLUDE)
            .with_image("Images/xl.png")
            .with_tool_tip("Start ERP XL with the installation's database")
            .with_kind(ButtonKind::SystemStandard),
        ButtonRecord::new("ERP XL (no login data)", XL_CLIENT_EXECUTABLE)
            .with_arguments("skip")
            .with_image("Images/xl.png")
            .with_tool_tip("Start ERP XL without database arguments")
            .with_kind(ButtonKind::SystemStandard),
        ButtonRecord::new("Installation folder", "")
            .with_image("Images/folder.png")
            .with_tool_tip("Open the installation directory")
            .with_kind(ButtonKind::SystemStandard),
    ]
}

/// One button per built-in special action.
pub fn special_buttons() -> Vec<ButtonRecord> {
    SpecialAction::ALL
        .into_iter()
        .map(|action| {
            let elevated = matches!(
                action,
                SpecialAction::RegisterComponents
                    | SpecialAction::ChangePathVariable
            );
            ButtonRecord::special(action.label(), action.identifier())
                .with_tool_tip(action.label())
                .elevated(elevated)
        })
        .collect()
}
