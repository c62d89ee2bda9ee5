//! Turns a button click into exactly one external side effect.

mod arguments;
mod path_env;
mod special;
mod system;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;

pub use arguments::resolve_arguments;
pub use path_env::{PathBackup, apply_path_priority};
pub use special::{REGISTRATION_SCRIPT, SpecialAction};
pub use system::{LaunchRequest, OsSystem, SystemPort};

use crate::error::XlPilotError;
use crate::model::{ButtonKind, ButtonRecord, InstallationPath};
use crate::notifier::Notifier;

/// What a dispatch ended up doing.
#[derive(Debug)]
pub enum DispatchOutcome {
    Launched(LaunchRequest),
    OpenedFolder(PathBuf),
    SpecialCompleted(SpecialAction),
    /// Already reported through the notifier.
    Failed(XlPilotError),
}

impl DispatchOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}

/// Resolves buttons against an optional installation and performs them.
pub struct Dispatcher<'a> {
    system: &'a dyn SystemPort,
    notifier: &'a dyn Notifier,
    backup: PathBackup,
}

impl<'a> Dispatcher<'a> {
    pub fn new(system: &'a dyn SystemPort, notifier: &'a dyn Notifier) -> Self {
        Self {
            system,
            notifier,
            backup: PathBackup::default(),
        }
    }

    pub fn with_path_backup(mut self, backup: PathBackup) -> Self {
        self.backup = backup;
        self
    }

    /// Perform the button's action. Never fails past this call: every
    /// failure, panics included, is reported and returned as
    /// [`DispatchOutcome::Failed`].
    pub fn dispatch(
        &self,
        record: &ButtonRecord,
        context: Option<&InstallationPath>,
    ) -> DispatchOutcome {
        log::debug!(
            "dispatching \"{}\" ({}), installation: {:?}",
            record.button_text,
            record.button_type,
            context.map(|installation| installation.name.as_str())
        );

        let routed = panic::catch_unwind(AssertUnwindSafe(|| {
            self.route(record, context)
        }));
        let outcome = match routed {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(err)) => DispatchOutcome::Failed(err),
            Err(payload) => DispatchOutcome::Failed(XlPilotError::Internal(
                panic_message(payload.as_ref()),
            )),
        };

        if let DispatchOutcome::Failed(err) = &outcome {
            log::error!("button \"{}\" failed: {err}", record.button_text);
            self.notifier.error(&err.to_string());
        }
        outcome
    }

    fn route(
        &self,
        record: &ButtonRecord,
        context: Option<&InstallationPath>,
    ) -> Result<DispatchOutcome, XlPilotError> {
        match &record.button_type {
            ButtonKind::UserStandard | ButtonKind::SystemStandard => {
                self.run_standard(record, context)
            },
            ButtonKind::SystemSpecial => self.run_special(record, context),
            ButtonKind::Unknown(raw) => {
                Err(XlPilotError::UnsupportedButtonKind(raw.clone()))
            },
        }
    }

    fn run_standard(
        &self,
        record: &ButtonRecord,
        context: Option<&InstallationPath>,
    ) -> Result<DispatchOutcome, XlPilotError> {
        let directory = effective_directory(record, context);
        if directory.is_empty() {
            return Err(XlPilotError::MissingWorkingDirectory(
                record.button_text.clone(),
            ));
        }
        let directory = PathBuf::from(directory);

        if record.file_name.is_empty() {
            self.system.open_folder(&directory)?;
            return Ok(DispatchOutcome::OpenedFolder(directory));
        }

        let target = directory.join(&record.file_name);
        if target.is_file() {
            let request = LaunchRequest::new(target)
                .with_arguments(resolve_arguments(record, context))
                .with_working_directory(directory)
                .elevated(record.run_as_admin);
            self.system.launch(&request)?;
            Ok(DispatchOutcome::Launched(request))
        } else if target.is_dir() {
            self.system.open_folder(&target)?;
            Ok(DispatchOutcome::OpenedFolder(target))
        } else {
            Err(XlPilotError::MissingTargetFile(target))
        }
    }

    fn run_special(
        &self,
        record: &ButtonRecord,
        context: Option<&InstallationPath>,
    ) -> Result<DispatchOutcome, XlPilotError> {
        let action = SpecialAction::parse(&record.action_identifier)
            .ok_or_else(|| {
                XlPilotError::UnrecognizedSpecialAction(
                    record.action_identifier.clone(),
                )
            })?;

        match action {
            SpecialAction::RegistryComputerConfig
            | SpecialAction::RegistryUserDatabases
            | SpecialAction::RegistryComputerDatabases
            | SpecialAction::RegistryDsServices => {
                if let Some(key) = action.registry_key() {
                    self.system.open_registry_view(key)?;
                }
            },
            SpecialAction::RegisterComponents => {
                let installation = require_installation(action, context)?;
                self.run_registration(installation)?;
            },
            SpecialAction::ChangePathVariable => {
                let installation = require_installation(action, context)?;
                self.prioritize_in_path(installation)?;
            },
            SpecialAction::OpenTempFolder => {
                self.system.open_folder(&self.system.temp_dir())?;
            },
        }
        Ok(DispatchOutcome::SpecialCompleted(action))
    }

    fn run_registration(
        &self,
        installation: &InstallationPath,
    ) -> Result<(), XlPilotError> {
        let directory = PathBuf::from(&installation.path);
        let script = directory.join(REGISTRATION_SCRIPT);
        if !script.is_file() {
            return Err(XlPilotError::MissingTargetFile(script));
        }

        let request = LaunchRequest::new("cmd.exe")
            .with_arguments(format!("/c \"\"{}\" & pause\"", script.display()))
            .with_working_directory(directory)
            .elevated(true);
        self.system.launch(&request)
    }

    /// Back up PATH, then move the installation directory to its front.
    fn prioritize_in_path(
        &self,
        installation: &InstallationPath,
    ) -> Result<(), XlPilotError> {
        let current = self.system.path_variable()?;
        self.backup.store(&current)?;
        let updated = apply_path_priority(
            &current,
            &installation.path,
            path_env::PATH_SEPARATOR,
        );
        self.system.set_path_variable(&updated)?;
        log::info!("PATH now starts with {}", installation.path);
        Ok(())
    }
}

/// Buttons without their own directory run inside the installation.
fn effective_directory<'r>(
    record: &'r ButtonRecord,
    context: Option<&'r InstallationPath>,
) -> &'r str {
    match context {
        Some(installation) if record.directory.is_empty() => {
            &installation.path
        },
        _ => &record.directory,
    }
}

fn require_installation(
    action: SpecialAction,
    context: Option<&InstallationPath>,
) -> Result<&InstallationPath, XlPilotError> {
    context
        .filter(|installation| !installation.path.is_empty())
        .ok_or_else(|| {
            XlPilotError::MissingInstallation(action.identifier().to_string())
        })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return (*message).to_string();
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return message.clone();
    }
    String::from("dispatch panicked")
}
