use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use crate::cli::history::HistoryArg;
use crate::cli::load::LoadArg;
use crate::cli::variants::VariantsArg;
use crate::config::Settings;

#[derive(Debug, Parser)]
#[command(name = "lrseq", version, about, long_about = None, propagate_version = true)]
pub struct App {
    #[command(subcommand)]
    pub cmd: Commands,

    /// Config file, `lrseq.toml` in the working directory by default.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Base URL or local directory the dataset paths are relative to.
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Load on the current task instead of a worker thread.
    #[arg(long, global = true)]
    pub no_worker: bool,

    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(alias = "l", name = "load", about = "Load a dataset variant and summarize it")]
    Load(LoadArg),
    #[command(alias = "ls", name = "variants", about = "List configured dataset variants")]
    Variants(VariantsArg),
    #[command(name = "history", about = "Append today's sample counts to the history CSV")]
    History(HistoryArg),
}

impl App {
    pub fn settings(&self) -> anyhow::Result<Settings> {
        let mut settings = Settings::load(self.config.as_deref())?;
        if let Some(base_url) = &self.base_url {
            settings.loader.base_url = base_url.clone();
        }
        if self.no_worker {
            settings.loader.use_worker = false;
        }
        Ok(settings)
    }

    pub async fn run(self) -> anyhow::Result<()> {
        match &self.cmd {
            Commands::Load(arg) => arg.run(self.settings()?).await,
            Commands::Variants(arg) => arg.run(&self.settings()?),
            Commands::History(arg) => arg.run(),
        }
    }
}
