use std::path::PathBuf;

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use nowplaylist::{cli, config, error, logging};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Poll the now-playing source and mirror songs into the playlist
    Run,

    /// Authorize with Spotify and print the refresh token
    Auth,

    /// Show the user the refresh token belongs to
    Whoami,

    /// List your playlists
    Playlists,

    /// List track ids in the configured playlist
    Playlist,

    /// Add songs from a newline-delimited JSON file to the playlist
    Import(ImportOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct ImportOptions {
    /// File with one `{"artist": ..., "title": ...}` object per line
    #[clap(long, default_value = "songs.txt")]
    file: PathBuf,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Command::Completions(opt) = &cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(opt.shell, &mut cmd, name, &mut std::io::stdout());
        return;
    }

    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let settings = match config::Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => error!("Invalid configuration: {}", e),
    };
    logging::init(&settings.log_level);

    let result = match cli.command {
        Command::Run => cli::run(settings).await,
        Command::Auth => cli::auth(settings).await,
        Command::Whoami => cli::whoami(settings).await,
        Command::Playlists => cli::playlists(settings).await,
        Command::Playlist => cli::playlist(settings).await,
        Command::Import(opt) => cli::import(settings, opt.file).await,
        Command::Completions(_) => Ok(()),
    };

    if let Err(e) = result {
        error!("{:#}", e);
    }
}
