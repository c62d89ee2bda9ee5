use crate::model::{
    ARGUMENTS_INCLUDE, ARGUMENTS_SKIP, ButtonRecord, InstallationPath,
};

const DATABASE_PREFIX: &str = "baza=";
const LICENSE_PREFIX: &str = "klucz=";

/// Build the argument string for a standard launch.
///
/// With an installation context, an empty value or the `include` sentinel
/// expands to the XL database and license arguments and `skip` yields no
/// arguments. Any other value, and every value without a context, is
/// passed through verbatim.
pub fn resolve_arguments(
    record: &ButtonRecord,
    context: Option<&InstallationPath>,
) -> String {
    let Some(installation) = context else {
        return record.arguments.clone();
    };

    let requested = record.arguments.trim();
    if requested.is_empty() || requested.eq_ignore_ascii_case(ARGUMENTS_INCLUDE)
    {
        xl_arguments(installation)
    } else if requested.eq_ignore_ascii_case(ARGUMENTS_SKIP) {
        String::new()
    } else {
        record.arguments.clone()
    }
}

fn xl_arguments(installation: &InstallationPath) -> String {
    let license = installation.formatted_license_info();
    let mut parts = Vec::with_capacity(2);
    if !installation.database.is_empty() {
        parts.push(format!("{DATABASE_PREFIX}{}", installation.database));
    }
    if !license.is_empty() {
        parts.push(format!("{LICENSE_PREFIX}{license}"));
    }
    parts.join(",")
}
