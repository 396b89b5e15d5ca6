use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use estech_loader::actions::ActionSet;
use estech_loader::app::{next_notification, LoaderApp, Notification};
use estech_loader::config::ConfigSyncEngine;
use estech_loader::launcher::{open_target, Resolution};
use estech_loader::logging;
use estech_loader::platform::{SystemLauncher, SystemLookup};
use estech_loader::settings::{LoaderSettings, Preferences, StaticPreferences, SystemPreferences};
use estech_loader::url_scheme::{canonical_command, parse_command};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

/// ES Tech Loader - launcher with remotely managed actions
#[derive(Parser, Debug)]
#[command(name = "estech-loader")]
#[command(about = "Launcher with remotely managed actions", long_about = None)]
struct Args {
    /// Local override document (defaults to the OS system location)
    #[arg(long, env = "ESTECH_LOCAL_CONFIG", global = true)]
    local_config: Option<PathBuf>,

    /// Cache file (defaults to the per-user data directory)
    #[arg(long, env = "ESTECH_CACHE_FILE", global = true)]
    cache: Option<PathBuf>,

    /// Remote URL override; takes precedence over the preferences file
    #[arg(long, global = true)]
    remote_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run in the background, reading commands from stdin
    Run {
        /// Seconds between background refreshes (0 disables periodic refresh)
        #[arg(long)]
        refresh_interval: Option<u64>,
    },
    /// Print the actions from the local or cached configuration
    List,
    /// Fetch the remote configuration once
    Refresh,
    /// Launch the action with the given command
    Open { command: String },
    /// Handle an estech:// URL
    Url { url: String },
}

fn settings(args: &Args) -> anyhow::Result<(LoaderSettings, Arc<dyn Preferences>)> {
    let settings = LoaderSettings::resolve(args.local_config.clone(), args.cache.clone())?;

    let preferences: Arc<dyn Preferences> = match &args.remote_url {
        Some(url) => Arc::new(StaticPreferences::new(Some(url.clone()))),
        None => Arc::new(SystemPreferences::new(settings.preferences_path())),
    };
    Ok((settings, preferences))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();
    let args = Args::parse();
    let (settings, preferences) = settings(&args)?;
    let mut engine = ConfigSyncEngine::from_settings(&settings, preferences)
        .context("failed to set up the config engine")?;

    match args.command {
        Command::Run { refresh_interval } => {
            let period = match refresh_interval {
                Some(0) => None,
                Some(secs) => Some(Duration::from_secs(secs)),
                None => Some(settings.refresh_interval),
            };
            run(engine, period).await
        }
        Command::List => {
            let active = engine.initialize();
            print_actions(&ActionSet::from_config(active.as_deref()));
            Ok(())
        }
        Command::Refresh => {
            engine.initialize();
            let outcome = engine.fetch_latest().await;
            let failure = outcome.as_ref().err().cloned();
            let signal = engine.apply(outcome);
            println!("{:?}", signal);
            if let Some(active) = engine.active() {
                println!("active version: {}", active.version);
            }
            match failure {
                Some(e) => Err(anyhow::Error::new(e).context("remote config refresh failed")),
                None => Ok(()),
            }
        }
        Command::Open { command } => open(&mut engine, &command),
        Command::Url { url } => {
            let command = parse_command(&url)?;
            open(&mut engine, &command)
        }
    }
}

fn print_actions(actions: &ActionSet) {
    println!("source: {:?}", actions.source());
    for action in actions.iter() {
        println!("{:<12} {}", action.command, action.title);
    }
}

fn open(engine: &mut ConfigSyncEngine, command: &str) -> anyhow::Result<()> {
    let active = engine.initialize();
    let actions = ActionSet::from_config(active.as_deref());
    let command = canonical_command(&command.to_lowercase()).to_string();
    let Some(action) = actions.find(&command) else {
        bail!("unknown command: {command}");
    };

    match open_target(&action.target, &SystemLookup, &SystemLauncher)? {
        Resolution::Found(target) => {
            println!("launched {}", target.location.display());
            Ok(())
        }
        Resolution::NotFound => bail!("{} is not installed", action.title),
    }
}

async fn run(engine: ConfigSyncEngine, period: Option<Duration>) -> anyhow::Result<()> {
    let app = LoaderApp::new(engine, Arc::new(SystemLookup), Arc::new(SystemLauncher));
    print_actions(app.actions());

    let handle = app.handle();
    let mut notifications = app.subscribe();
    let loop_task = tokio::spawn(app.run(period));

    tokio::spawn(async move {
        while let Some(notification) = next_notification(&mut notifications).await {
            match notification {
                Notification::MenuRebuilt { version, titles } => {
                    println!("menu rebuilt (version {:?}): {}", version, titles.join(", "))
                }
                other => println!("{:?}", other),
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let sent = match line {
            "" => true,
            "quit" | "exit" => {
                handle.shutdown();
                break;
            }
            "refresh" => handle.refresh(),
            url if url.contains("://") => handle.open_url(url),
            command => handle.activate(command.strip_prefix("open ").unwrap_or(command).trim()),
        };
        if !sent {
            break;
        }
    }

    // stdin closed without "quit"
    handle.shutdown();
    loop_task.await?;
    Ok(())
}
