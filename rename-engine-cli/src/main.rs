use anyhow::{bail, Context, Result};
use clap::Parser;
use rename_engine_core::{enumerate_directory, Config, Manager, ManagerError, SequentialItemFactory};
use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

mod cli;
mod observer;
mod table;

use cli::{merge_flags, Cli, Commands, RenameFlagArgs};
use observer::TerminalObserver;

fn main() {
    let interrupted = Arc::new(AtomicBool::new(false));
    let interrupted_for_handler = interrupted.clone();
    ctrlc::set_handler(move || {
        eprintln!("\nReceived SIGINT. Cancelling...");
        interrupted_for_handler.store(true, Ordering::SeqCst);
    })
    .expect("error installing SIGINT handler");

    let cli = Cli::parse();
    init_tracing(&cli.log_level);
    let use_color = !cli.no_color && io::stdout().is_terminal();

    let result = run(cli, &interrupted, use_color);

    if interrupted.load(Ordering::SeqCst) {
        eprintln!("Interrupted.");
        process::exit(130);
    }

    match result {
        Ok(()) => process::exit(0),
        Err(err) => {
            eprintln!("Error: {err:#}");
            let exit_code = if err.downcast_ref::<ManagerError>().map(|e| matches!(e, ManagerError::NoWork)).unwrap_or(false) {
                1
            } else {
                2
            };
            process::exit(exit_code);
        },
    }
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn run(cli: Cli, interrupted: &AtomicBool, use_color: bool) -> Result<()> {
    let config = Config::load().unwrap_or_default();

    match cli.command {
        Commands::Preview { root, search, replace, flags } => {
            let manager = build_manager(&root, &flags, &search, &replace, &config)?;
            manager.wait_for_preview();
            if interrupted.load(Ordering::SeqCst) {
                manager.cancel_preview();
                return Ok(());
            }
            println!("{}", table::render(&manager, use_color));
            Ok(())
        },

        Commands::Rename { root, search, replace, flags, yes } => {
            let manager = build_manager(&root, &flags, &search, &replace, &config)?;
            manager.wait_for_preview();
            if interrupted.load(Ordering::SeqCst) {
                manager.cancel_preview();
                return Ok(());
            }
            println!("{}", table::render(&manager, use_color));

            let eligible = manager.get_rename_item_count();
            if eligible == 0 {
                bail!(ManagerError::NoWork);
            }
            if !yes && !confirm(eligible)? {
                println!("Aborted.");
                return Ok(());
            }

            let count = manager.rename(None)?;
            println!("Renamed {count} item(s).");
            Ok(())
        },
    }
}

fn build_manager(
    root: &Path,
    flag_args: &RenameFlagArgs,
    search: &str,
    replace: &str,
    config: &Config,
) -> Result<Arc<Manager>> {
    let manager = Manager::new(root, None);
    manager.advise(Arc::new(TerminalObserver));

    let factory = SequentialItemFactory::new();
    let entries =
        enumerate_directory(&factory, root, flag_args.recursive).with_context(|| format!("failed to enumerate {}", root.display()))?;
    for entry in entries {
        manager.add_item(entry.original_name(), entry.parent_path(), entry.is_folder())?;
    }

    let flags = merge_flags(config.defaults, flag_args.to_rename_flags());
    manager.put_flags(flags)?;

    let adapter = manager.get_regex_adapter()?;
    adapter.put_search_term(search);
    adapter.put_replace_term(replace);

    Ok(manager)
}

fn confirm(eligible: usize) -> Result<bool> {
    eprint!("Rename {eligible} item(s)? [y/N] ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let choice = input.trim().to_lowercase();
    Ok(choice == "y" || choice == "yes")
}
