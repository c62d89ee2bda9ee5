mod button;
mod config;
mod installation;

pub use button::{ARGUMENTS_INCLUDE, ARGUMENTS_SKIP, ButtonKind, ButtonRecord};
pub use config::{
    BUTTON_EXPORT_ROOT, ButtonExport, ButtonSet, CONFIG_ROOT, Configuration,
    DIMENSION_COUNT, FLAG_COUNT, PATH_EXPORT_ROOT, PathExport, Subset,
};
pub use installation::InstallationPath;
