//! Turns the composed commands into the process entry point.

use clap::error::ErrorKind;
use std::ffi::OsString;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};

use super::command::{Command, CommandContext, START_COMMAND};
use crate::config::Configure;
use crate::error::CompositionError;
use crate::module::BootstrapDescriptor;
use crate::server::App;

/// Called once, right after `start` has bound its listener.
pub type OnListen = Box<dyn FnOnce(&App, SocketAddr) + Send>;

pub const EXIT_OK: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_USAGE: i32 = 2;

pub struct EntryPoint {
    configure: Arc<Configure>,
    bootstrap: Arc<BootstrapDescriptor>,
    commands: Vec<Arc<Command>>,
    on_listen: Option<OnListen>,
}

/// Extra commands come first, then the commands of every feature.
pub fn assemble(
    configure: Arc<Configure>,
    bootstrap: Arc<BootstrapDescriptor>,
    extra: Vec<Command>,
    on_listen: Option<OnListen>,
) -> Result<EntryPoint, CompositionError> {
    let mut commands: Vec<Arc<Command>> = extra.into_iter().map(Arc::new).collect();
    for command in bootstrap.commands() {
        if !commands.iter().any(|c| Arc::ptr_eq(c, command)) {
            commands.push(command.clone());
        }
    }

    for (i, command) in commands.iter().enumerate() {
        let name = command.name();
        if name == START_COMMAND || commands[..i].iter().any(|c| c.name() == name) {
            return Err(CompositionError::ConflictingCommand {
                name: name.to_string(),
            });
        }
    }

    Ok(EntryPoint {
        configure,
        bootstrap,
        commands,
        on_listen,
    })
}

impl EntryPoint {
    pub fn command_names(&self) -> Vec<&str> {
        std::iter::once(START_COMMAND)
            .chain(self.commands.iter().map(|c| c.name()))
            .collect()
    }

    fn cli(&self) -> clap::Command {
        let start = clap::Command::new(START_COMMAND).about("Start the HTTP server");
        self.commands.iter().fold(
            clap::Command::new("folio")
                .version(env!("CARGO_PKG_VERSION"))
                .about("Folio content backend")
                .subcommand(start),
            |cli, command| cli.subcommand(command.to_clap()),
        )
    }

    /// Parse `args`, run the chosen command and return the process exit code.
    ///
    /// Argument errors are reported before the application is built. The
    /// application is closed after the command whatever its outcome.
    pub async fn run<I, T>(self, args: I) -> i32
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = match self.cli().try_get_matches_from(args) {
            Ok(matches) => matches,
            Err(e) => {
                return match e.kind() {
                    ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                        let _ = e.print();
                        EXIT_OK
                    }
                    _ => {
                        let rendered = e.to_string();
                        let line = rendered.lines().next().unwrap_or("invalid arguments");
                        eprintln!("{}", line);
                        EXIT_USAGE
                    }
                };
            }
        };

        let app = match App::build(self.configure.clone(), self.bootstrap.clone()).await {
            Ok(app) => Arc::new(app),
            Err(e) => {
                error!(error = %e, "Application failed to build");
                eprintln!("error: {}", e);
                return EXIT_FAILURE;
            }
        };

        let result = match matches.subcommand() {
            None | Some((START_COMMAND, _)) => app.listen(self.on_listen).await,
            Some((name, sub)) => match self.commands.iter().find(|c| c.name() == name) {
                Some(command) => {
                    info!(command = name, "Running command");
                    command
                        .invoke(CommandContext {
                            app: app.clone(),
                            matches: sub.clone(),
                        })
                        .await
                }
                None => Err(anyhow::anyhow!("unknown command `{}`", name)),
            },
        };

        app.close();
        match result {
            Ok(()) => EXIT_OK,
            Err(e) => {
                error!(error = %format!("{:#}", e), "Command failed");
                eprintln!("error: {:#}", e);
                EXIT_FAILURE
            }
        }
    }
}
