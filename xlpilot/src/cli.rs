use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use xlpilot_core::model::{ButtonKind, ButtonSet, Subset};

#[derive(Parser, Debug)]
#[command(name = "xlpilot", version, about = "Launcher pilot for ERP XL")]
pub(crate) struct Cli {
    /// Configuration file to use instead of the per-user default
    #[arg(long, global = true, env = "XLPILOT_CONFIG", value_name = "PATH")]
    pub(crate) config: Option<PathBuf>,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Manage registered XL installations
    #[command(subcommand)]
    Paths(PathsCommand),
    /// Manage launcher buttons
    #[command(subcommand)]
    Buttons(ButtonsCommand),
    /// Run a button
    Launch(LaunchArgs),
    /// Print the built-in button templates
    Templates {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Debug)]
pub(crate) enum PathsCommand {
    List {
        #[arg(long)]
        json: bool,
    },
    Add(PathArgs),
    /// Replace path, database and license of the entry with this name
    Update(PathArgs),
    Remove {
        #[arg(long)]
        name: String,
    },
    /// Look for installations in the subfolders of a directory
    Discover {
        #[arg(long, value_name = "DIR")]
        root: PathBuf,
        /// Register the found installations
        #[arg(long)]
        save: bool,
    },
    /// Drop blank entries and repeated names
    Dedupe,
    Export { file: PathBuf },
    Import { file: PathBuf },
}

#[derive(Args, Debug)]
pub(crate) struct PathArgs {
    #[arg(long)]
    pub(crate) name: String,
    #[arg(long)]
    pub(crate) path: String,
    #[arg(long, default_value = "")]
    pub(crate) database: String,
    #[arg(long, default_value = "")]
    pub(crate) license_server: String,
    #[arg(long, default_value = "")]
    pub(crate) license_key: String,
}

#[derive(Subcommand, Debug)]
pub(crate) enum ButtonsCommand {
    List {
        #[arg(long, value_enum, default_value_t = SetArg::Xl)]
        set: SetArg,
        #[arg(long)]
        json: bool,
    },
    Add(ButtonArgs),
    Remove {
        #[arg(long, value_enum, default_value_t = SetArg::Xl)]
        set: SetArg,
        #[arg(long)]
        index: usize,
    },
    /// Move a button to another position
    Move {
        #[arg(long, value_enum, default_value_t = SetArg::Xl)]
        set: SetArg,
        #[arg(long)]
        from: usize,
        #[arg(long)]
        to: usize,
    },
    /// Drop blank buttons and repeated text/file/image combinations
    Dedupe {
        #[arg(long, value_enum, default_value_t = SetArg::Xl)]
        set: SetArg,
    },
    Export {
        #[arg(long, value_enum, default_value_t = SetArg::Xl)]
        set: SetArg,
        file: PathBuf,
    },
    Import {
        #[arg(long, value_enum, default_value_t = SetArg::Xl)]
        set: SetArg,
        file: PathBuf,
    },
}

#[derive(Args, Debug)]
pub(crate) struct ButtonArgs {
    #[arg(long, value_enum, default_value_t = SetArg::Xl)]
    pub(crate) set: SetArg,
    #[arg(long)]
    pub(crate) text: String,
    /// File relative to the directory; omit to open the directory
    #[arg(long, default_value = "")]
    pub(crate) file: String,
    #[arg(long, default_value = "")]
    pub(crate) image: String,
    /// Literal arguments, or `include` / `skip`
    #[arg(long = "args", default_value = "", allow_hyphen_values = true)]
    pub(crate) arguments: String,
    #[arg(long, default_value = "")]
    pub(crate) tooltip: String,
    /// Directory to run in; omit to use the selected installation
    #[arg(long, default_value = "")]
    pub(crate) dir: String,
    #[arg(long)]
    pub(crate) admin: bool,
    #[arg(long, value_enum, default_value_t = KindArg::User)]
    pub(crate) kind: KindArg,
    /// Special action identifier, for `--kind special`
    #[arg(long, default_value = "")]
    pub(crate) action: String,
}

#[derive(Args, Debug)]
pub(crate) struct LaunchArgs {
    #[arg(long, value_enum, default_value_t = SetArg::Xl)]
    pub(crate) set: SetArg,
    #[arg(long)]
    pub(crate) index: usize,
    /// Installation to run against; the XL set defaults to the first one
    #[arg(long = "path", value_name = "NAME")]
    pub(crate) installation: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SetArg {
    Xl,
    Other,
}

impl From<SetArg> for ButtonSet {
    fn from(set: SetArg) -> Self {
        match set {
            SetArg::Xl => ButtonSet::Primary,
            SetArg::Other => ButtonSet::Secondary,
        }
    }
}

impl From<SetArg> for Subset {
    fn from(set: SetArg) -> Self {
        ButtonSet::from(set).into()
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KindArg {
    User,
    System,
    Special,
}

impl From<KindArg> for ButtonKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::User => ButtonKind::UserStandard,
            KindArg::System => ButtonKind::SystemStandard,
            KindArg::Special => ButtonKind::SystemSpecial,
        }
    }
}
