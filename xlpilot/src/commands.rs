use std::io::{self, Write};

use anyhow::{Context, anyhow, bail};
use serde::Serialize;
use xlpilot_core::dispatch::{Dispatcher, OsSystem};
use xlpilot_core::model::{ButtonRecord, ButtonSet, InstallationPath, Subset};
use xlpilot_core::{ConfigStore, discover_installations, templates};

use crate::cli::{ButtonArgs, ButtonsCommand, Command, PathArgs, PathsCommand};
use crate::notifier::StderrNotifier;

/// Run one command. `Ok(false)` means a failure was already reported.
pub(crate) fn run(
    store: &mut ConfigStore,
    command: Command,
) -> anyhow::Result<bool> {
    match command {
        Command::Paths(command) => run_paths(store, command),
        Command::Buttons(command) => run_buttons(store, command),
        Command::Launch(args) => {
            let set = ButtonSet::from(args.set);
            let record = store
                .config()
                .buttons(set)
                .get(args.index)
                .cloned()
                .with_context(|| format!("no button at index {}", args.index))?;
            let context = launch_context(store, set, args.installation)?;

            let notifier = StderrNotifier;
            let dispatcher = Dispatcher::new(&OsSystem, &notifier);
            Ok(dispatcher.dispatch(&record, context.as_ref()).is_success())
        },
        Command::Templates { json } => {
            let mut buttons = templates::system_buttons();
            buttons.extend(templates::special_buttons());
            print_buttons(&buttons, json)?;
            Ok(true)
        },
    }
}

fn run_paths(
    store: &mut ConfigStore,
    command: PathsCommand,
) -> anyhow::Result<bool> {
    match command {
        PathsCommand::List { json } => {
            let paths = store.config().installation_paths();
            if json {
                print_json(paths)?;
            } else {
                for path in paths {
                    println!(
                        "{}\t{}\t{}\t{}",
                        path.name,
                        path.path,
                        path.database,
                        path.formatted_license_info()
                    );
                }
            }
        },
        PathsCommand::Add(args) => {
            store.add_installation_path(installation_from(args))?;
        },
        PathsCommand::Update(args) => {
            let name = args.name.clone();
            if !store.update_installation_path(&installation_from(args))? {
                bail!("no installation named \"{name}\"");
            }
        },
        PathsCommand::Remove { name } => {
            if !store.remove_installation_path(&name)? {
                bail!("no installation named \"{name}\"");
            }
        },
        PathsCommand::Discover { root, save } => {
            let found = discover_installations(&root).map_err(|err| {
                anyhow!("failed to scan {}: {err}", root.display())
            })?;
            for path in &found {
                println!("{}\t{}", path.name, path.path);
            }
            if save {
                let mut paths = store.installation_paths();
                paths.add_range(found);
                paths.remove_duplicates();
                store.replace_installation_paths(paths)?;
            }
        },
        PathsCommand::Dedupe => {
            let mut paths = store.installation_paths();
            paths.filter_empty_entries();
            paths.remove_duplicates();
            store.replace_installation_paths(paths)?;
        },
        PathsCommand::Export { file } => {
            store.export_subset(&file, Subset::InstallationPaths)?;
        },
        PathsCommand::Import { file } => {
            store.import_subset(&file, Subset::InstallationPaths)?;
        },
    }
    Ok(true)
}

fn run_buttons(
    store: &mut ConfigStore,
    command: ButtonsCommand,
) -> anyhow::Result<bool> {
    match command {
        ButtonsCommand::List { set, json } => {
            print_buttons(store.config().buttons(set.into()), json)?;
        },
        ButtonsCommand::Add(args) => {
            let set = ButtonSet::from(args.set);
            store.add_button(set, button_from(args))?;
        },
        ButtonsCommand::Remove { set, index } => {
            if store.remove_button(set.into(), index)?.is_none() {
                bail!("no button at index {index}");
            }
        },
        ButtonsCommand::Move { set, from, to } => {
            let mut buttons = store.buttons(set.into());
            if !buttons.move_item(from, to) {
                bail!("no button at index {from}");
            }
            store.replace_buttons(set.into(), buttons)?;
        },
        ButtonsCommand::Dedupe { set } => {
            let mut buttons = store.buttons(set.into());
            buttons.filter_empty_entries();
            buttons.remove_duplicates();
            store.replace_buttons(set.into(), buttons)?;
        },
        ButtonsCommand::Export { set, file } => {
            store.export_subset(&file, set.into())?;
        },
        ButtonsCommand::Import { set, file } => {
            store.import_subset(&file, set.into())?;
        },
    }
    Ok(true)
}

fn launch_context(
    store: &ConfigStore,
    set: ButtonSet,
    name: Option<String>,
) -> anyhow::Result<Option<InstallationPath>> {
    match name {
        Some(name) => store
            .find_installation_path(&name)
            .cloned()
            .map(Some)
            .with_context(|| format!("no installation named \"{name}\"")),
        None if set == ButtonSet::Primary => {
            Ok(store.config().installation_paths().first().cloned())
        },
        None => Ok(None),
    }
}

fn installation_from(args: PathArgs) -> InstallationPath {
    InstallationPath::new(args.name, args.path)
        .with_database(args.database)
        .with_license(args.license_server, args.license_key)
}

fn button_from(args: ButtonArgs) -> ButtonRecord {
    let mut record = ButtonRecord::new(args.text, args.file)
        .with_image(args.image)
        .with_arguments(args.arguments)
        .with_tool_tip(args.tooltip)
        .with_directory(args.dir)
        .with_kind(args.kind.into())
        .elevated(args.admin);
    if record.button_type.is_standard() && !args.action.is_empty() {
        log::warn!("action identifier ignored for standard buttons");
    } else {
        record.action_identifier = args.action;
    }
    record
}

fn print_buttons(buttons: &[ButtonRecord], json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(buttons);
    }
    for (index, button) in buttons.iter().enumerate() {
        let target = if button.button_type.is_standard() {
            button.file_name.as_str()
        } else {
            button.action_identifier.as_str()
        };
        println!(
            "{index}\t{}\t{}\t{target}{}",
            button.button_text,
            button.button_type,
            if button.run_as_admin { "\t(admin)" } else { "" }
        );
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
