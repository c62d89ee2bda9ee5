#[cfg(windows)]
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::XlPilotError;

#[cfg(windows)]
const REGEDIT_LAST_KEY: &str =
    r"HKEY_CURRENT_USER\Software\Microsoft\Windows\CurrentVersion\Applets\Regedit";
#[cfg(windows)]
const MACHINE_ENVIRONMENT_KEY: &str =
    r"HKEY_LOCAL_MACHINE\SYSTEM\CurrentControlSet\Control\Session Manager\Environment";

/// A fully resolved process launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    program: PathBuf,
    arguments: String,
    working_directory: Option<PathBuf>,
    elevated: bool,
}

impl LaunchRequest {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            arguments: String::new(),
            working_directory: None,
            elevated: false,
        }
    }

    pub fn with_arguments(mut self, arguments: impl Into<String>) -> Self {
        self.arguments = arguments.into();
        self
    }

    pub fn with_working_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }

    pub fn elevated(mut self, elevated: bool) -> Self {
        self.elevated = elevated;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Argument string exactly as resolved from the button.
    pub fn arguments(&self) -> &str {
        &self.arguments
    }

    pub fn working_directory(&self) -> Option<&Path> {
        self.working_directory.as_deref()
    }

    pub fn is_elevated(&self) -> bool {
        self.elevated
    }
}

/// Side effects the dispatcher needs from the operating system.
pub trait SystemPort {
    /// Start a process without waiting for it.
    fn launch(&self, request: &LaunchRequest) -> Result<(), XlPilotError>;

    /// Show a directory in the OS file browser.
    fn open_folder(&self, path: &Path) -> Result<(), XlPilotError>;

    /// Open the registry editor positioned at `key`.
    fn open_registry_view(&self, key: &str) -> Result<(), XlPilotError>;

    fn path_variable(&self) -> Result<String, XlPilotError>;

    /// Replace the machine-wide PATH value.
    fn set_path_variable(&self, value: &str) -> Result<(), XlPilotError>;

    fn temp_dir(&self) -> PathBuf {
        std::env::temp_dir()
    }
}

/// [`SystemPort`] backed by the running operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsSystem;

impl SystemPort for OsSystem {
    fn launch(&self, request: &LaunchRequest) -> Result<(), XlPilotError> {
        let mut command = build_command(request);
        let child = command.spawn().map_err(|source| {
            XlPilotError::LaunchFailed {
                program: request.program.clone(),
                source,
            }
        })?;
        log::info!(
            "launched {} (pid {}, elevated: {})",
            request.program.display(),
            child.id(),
            request.elevated
        );
        Ok(())
    }

    fn open_folder(&self, path: &Path) -> Result<(), XlPilotError> {
        open::that_detached(path).map_err(|source| {
            XlPilotError::LaunchFailed {
                program: path.to_path_buf(),
                source,
            }
        })?;
        log::info!("opened folder {}", path.display());
        Ok(())
    }

    #[cfg(windows)]
    fn open_registry_view(&self, key: &str) -> Result<(), XlPilotError> {
        let last_key = format!("Computer\\{key}");
        run_to_completion(Command::new("reg").args([
            "add",
            REGEDIT_LAST_KEY,
            "/v",
            "LastKey",
            "/t",
            "REG_SZ",
            "/d",
            last_key.as_str(),
            "/f",
        ]))?;
        self.launch(&LaunchRequest::new("regedit.exe").elevated(true))
    }

    #[cfg(not(windows))]
    fn open_registry_view(&self, _key: &str) -> Result<(), XlPilotError> {
        Err(XlPilotError::Unsupported("the registry editor"))
    }

    /// Raw machine-scope value, with `%VARIABLES%` left unexpanded.
    #[cfg(windows)]
    fn path_variable(&self) -> Result<String, XlPilotError> {
        let program = PathBuf::from("reg");
        let output = Command::new(&program)
            .args(["query", MACHINE_ENVIRONMENT_KEY, "/v", "Path"])
            .output()
            .map_err(|source| XlPilotError::LaunchFailed {
                program: program.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(XlPilotError::LaunchFailed {
                program,
                source: io::Error::other(format!(
                    "exited with {}",
                    output.status
                )),
            });
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_registry_value(&stdout, "Path").ok_or_else(|| {
            XlPilotError::Malformed {
                origin: MACHINE_ENVIRONMENT_KEY.to_string(),
                reason: String::from("no Path value in reg query output"),
            }
        })
    }

    #[cfg(not(windows))]
    fn path_variable(&self) -> Result<String, XlPilotError> {
        Ok(std::env::var_os("PATH")
            .map(|value| value.to_string_lossy().into_owned())
            .unwrap_or_default())
    }

    #[cfg(windows)]
    fn set_path_variable(&self, value: &str) -> Result<(), XlPilotError> {
        run_to_completion(Command::new("reg").args([
            "add",
            MACHINE_ENVIRONMENT_KEY,
            "/v",
            "Path",
            "/t",
            "REG_EXPAND_SZ",
            "/d",
            value,
            "/f",
        ]))
    }

    #[cfg(not(windows))]
    fn set_path_variable(&self, _value: &str) -> Result<(), XlPilotError> {
        Err(XlPilotError::Unsupported("changing the machine PATH"))
    }
}

#[cfg(windows)]
fn run_to_completion(command: &mut Command) -> Result<(), XlPilotError> {
    let program = PathBuf::from(command.get_program());
    let status = command.status().map_err(|source| {
        XlPilotError::LaunchFailed {
            program: program.clone(),
            source,
        }
    })?;
    if status.success() {
        return Ok(());
    }
    Err(XlPilotError::LaunchFailed {
        program,
        source: io::Error::other(format!("exited with {status}")),
    })
}

#[cfg(windows)]
fn build_command(request: &LaunchRequest) -> Command {
    use std::os::windows::process::CommandExt;

    let mut command = if request.elevated {
        let script = elevation_script(request);
        let mut command = Command::new("powershell.exe");
        command.args([
            "-NoProfile",
            "-WindowStyle",
            "Hidden",
            "-Command",
            script.as_str(),
        ]);
        command
    } else {
        let mut command = Command::new(&request.program);
        if !request.arguments.is_empty() {
            command.raw_arg(&request.arguments);
        }
        command
    };
    if let Some(dir) = &request.working_directory {
        command.current_dir(dir);
    }
    command
}

#[cfg(not(windows))]
fn build_command(request: &LaunchRequest) -> Command {
    let mut command = if request.elevated {
        let mut command = Command::new("pkexec");
        command.arg(&request.program);
        command
    } else {
        Command::new(&request.program)
    };
    command.args(split_arguments(&request.arguments));
    if let Some(dir) = &request.working_directory {
        command.current_dir(dir);
    }
    command
}

/// Extract the data of value `name` from `reg query` output.
#[cfg(any(windows, test))]
fn parse_registry_value(output: &str, name: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let line = line.trim_start();
        let head = line.get(..name.len())?;
        let rest = &line[name.len()..];
        if !head.eq_ignore_ascii_case(name)
            || !rest.starts_with(char::is_whitespace)
        {
            return None;
        }
        let rest = rest.trim_start();
        let (kind, data) =
            rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
        kind.starts_with("REG_")
            .then(|| data.trim_start().trim_end_matches('\r').to_string())
    })
}

/// PowerShell one-liner that starts the request through the UAC prompt.
#[cfg(any(windows, test))]
fn elevation_script(request: &LaunchRequest) -> String {
    let mut script = format!(
        "Start-Process -FilePath {} -Verb RunAs",
        quote_powershell(&request.program.to_string_lossy())
    );
    if !request.arguments.is_empty() {
        script.push_str(" -ArgumentList ");
        script.push_str(&quote_powershell(&request.arguments));
    }
    if let Some(dir) = &request.working_directory {
        script.push_str(" -WorkingDirectory ");
        script.push_str(&quote_powershell(&dir.to_string_lossy()));
    }
    script
}

#[cfg(any(windows, test))]
fn quote_powershell(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[cfg_attr(windows, allow(dead_code))]
fn split_arguments(arguments: &str) -> Vec<String> {
    if arguments.trim().is_empty() {
        return Vec::new();
    }
    match shell_words::split(arguments) {
        Ok(parts) => parts,
        Err(err) => {
            log::warn!("arguments parse failed, passing verbatim: {err}");
            vec![arguments.to_string()]
        },
    }
}
