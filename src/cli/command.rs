//! Named process commands contributed by features.

use clap::{Arg, ArgAction, ArgMatches};
use futures::future::{BoxFuture, FutureExt};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::server::App;

/// Name of the built-in serve command.
pub const START_COMMAND: &str = "start";

pub type CommandFuture = BoxFuture<'static, anyhow::Result<()>>;

pub type CommandHandler = Arc<dyn Fn(CommandContext) -> CommandFuture + Send + Sync>;

/// What a command handler receives.
#[derive(Clone)]
pub struct CommandContext {
    pub app: Arc<App>,
    pub matches: ArgMatches,
}

impl CommandContext {
    pub fn value(&self, name: &str) -> Option<String> {
        self.matches.get_one::<String>(name).cloned()
    }

    pub fn flag(&self, name: &str) -> bool {
        self.matches.get_flag(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArgKind {
    Option,
    Flag,
    Positional,
}

/// Argument schema of a command.
#[derive(Debug, Clone)]
pub struct ArgSpec {
    name: &'static str,
    help: &'static str,
    kind: ArgKind,
    required: bool,
}

impl ArgSpec {
    /// `--name <value>`
    pub fn option(name: &'static str, help: &'static str) -> Self {
        Self::with_kind(name, help, ArgKind::Option)
    }

    /// `--name`
    pub fn flag(name: &'static str, help: &'static str) -> Self {
        Self::with_kind(name, help, ArgKind::Flag)
    }

    pub fn positional(name: &'static str, help: &'static str) -> Self {
        Self::with_kind(name, help, ArgKind::Positional)
    }

    fn with_kind(name: &'static str, help: &'static str, kind: ArgKind) -> Self {
        Self {
            name,
            help,
            kind,
            required: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn to_clap(&self) -> Arg {
        let arg = Arg::new(self.name).help(self.help);
        match self.kind {
            ArgKind::Option => arg.long(self.name).required(self.required),
            ArgKind::Flag => arg.long(self.name).action(ArgAction::SetTrue),
            ArgKind::Positional => arg.required(self.required),
        }
    }
}

pub struct Command {
    name: String,
    about: String,
    args: Vec<ArgSpec>,
    handler: CommandHandler,
}

impl Command {
    pub fn new<F, Fut>(name: impl Into<String>, about: impl Into<String>, handler: F) -> Self
    where
        F: Fn(CommandContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self {
            name: name.into(),
            about: about.into(),
            args: Vec::new(),
            handler: Arc::new(move |ctx| handler(ctx).boxed()),
        }
    }

    pub fn arg(mut self, arg: ArgSpec) -> Self {
        self.args.push(arg);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn about(&self) -> &str {
        &self.about
    }

    pub fn to_clap(&self) -> clap::Command {
        self.args.iter().fold(
            clap::Command::new(self.name.clone()).about(self.about.clone()),
            |cmd, arg| cmd.arg(arg.to_clap()),
        )
    }

    pub fn invoke(&self, ctx: CommandContext) -> CommandFuture {
        (self.handler)(ctx)
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("args", &self.args)
            .finish()
    }
}
