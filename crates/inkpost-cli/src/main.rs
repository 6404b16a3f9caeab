//! inkpost - terminal front-end for the inkpost blogging server.
//!
//! Sign in, read the feed and write posts from the command line. The
//! session is kept in the per-environment cache directory between runs.

mod app;
mod output;

use std::io;
use std::path::Path;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::App;
use inkpost_core::{Config, Environment};

/// Log file written next to the session in the cache directory
const LOG_FILE: &str = "inkpost.log";

#[derive(Parser, Debug)]
#[command(name = "inkpost", about = "Sign in, browse and write inkpost posts", version)]
struct Cli {
    /// Backend to use: development or production
    #[arg(long = "env", global = true)]
    environment: Option<Environment>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account
    Signup {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Sign in and keep the session
    Login {
        #[arg(long)]
        email: Option<String>,
        /// Remember the password in the OS keychain
        #[arg(long)]
        remember: bool,
    },
    /// End the session here and on the server
    Logout {
        /// Also forget the password remembered in the keychain
        #[arg(long)]
        forget: bool,
    },
    /// Show the local session
    Status,
    /// Show the signed-in user's profile
    Whoami,
    Posts(PostsCommand),
    /// List the bundled images posts can use
    Images,
}

#[derive(Args, Debug)]
struct PostsCommand {
    #[command(subcommand)]
    command: PostsSubcommand,
}

#[derive(Subcommand, Debug)]
enum PostsSubcommand {
    /// One page of the feed
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Show one or more posts
    Show {
        #[arg(required = true)]
        post_ids: Vec<String>,
    },
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        /// Bundled image file name, see `inkpost images`
        #[arg(long)]
        image: String,
    },
    /// Edit a post; omitted fields keep their current value
    Edit {
        post_id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        image: Option<String>,
    },
    Delete {
        post_id: String,
    },
}

/// Initialize the tracing subscriber. Logs go to stderr and, when the cache
/// directory is usable, to a file there as well.
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let appender = log_dir.and_then(|dir| {
        std::fs::create_dir_all(dir).ok()?;
        RollingFileAppender::builder()
            .rotation(Rotation::NEVER)
            .filename_prefix(LOG_FILE)
            .build(dir)
            .ok()
    });
    let (file_layer, guard) = match appender {
        Some(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

fn load_config(environment: Option<Environment>) -> Config {
    let mut config = Config::load().unwrap_or_else(|e| {
        eprintln!("Warning: failed to load config ({}), using defaults", e);
        Config::default()
    });
    if let Some(environment) = environment {
        config.environment = environment;
    }
    config
}

async fn run(cli: Cli, config: Config) -> Result<()> {
    let mut app = App::new(config)?;

    match cli.command {
        Command::Signup { name, email } => app.signup(name, email).await,
        Command::Login { email, remember } => app.login(email, remember).await,
        Command::Logout { forget } => app.logout(forget).await,
        Command::Status => {
            app.status();
            Ok(())
        }
        Command::Whoami => app.whoami().await,
        Command::Images => {
            app::print_images();
            Ok(())
        }
        Command::Posts(posts) => match posts.command {
            PostsSubcommand::List { page } => app.list_posts(page).await,
            PostsSubcommand::Show { post_ids } => app.show_posts(&post_ids).await,
            PostsSubcommand::Create {
                title,
                content,
                image,
            } => app.create_post(title, content, &image).await,
            PostsSubcommand::Edit {
                post_id,
                title,
                content,
                image,
            } => app.edit_post(&post_id, title, content, image.as_deref()).await,
            PostsSubcommand::Delete { post_id } => app.delete_post(&post_id).await,
        },
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = load_config(cli.environment);

    let log_dir = config.cache_dir().ok();
    let guard = init_tracing(log_dir.as_deref());
    info!(environment = %config.environment, "inkpost starting");

    let result = run(cli, config).await;
    if let Err(ref e) = result {
        warn!(error = %e, "Command failed");
    }
    drop(guard);

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_environment_flag_anywhere() {
        let args = ["inkpost", "posts", "list", "--page", "3", "--env", "prod"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.environment, Some(Environment::Production));
        match cli.command {
            Command::Posts(PostsCommand {
                command: PostsSubcommand::List { page },
            }) => assert_eq!(page, 3),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_show_requires_an_id() {
        assert!(Cli::try_parse_from(["inkpost", "posts", "show"]).is_err());
        let cli = Cli::try_parse_from(["inkpost", "posts", "show", "a", "b"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Posts(PostsCommand {
                command: PostsSubcommand::Show { ref post_ids }
            }) if post_ids.len() == 2
        ));
    }

    #[test]
    fn test_create_requires_image() {
        let without_image = ["inkpost", "posts", "create", "--title", "T", "--content", "C"];
        assert!(Cli::try_parse_from(without_image).is_err());

        let with_image = [
            "inkpost",
            "posts",
            "create",
            "--title",
            "T",
            "--content",
            "C",
            "--image",
            "desert-road.jpg",
        ];
        assert!(Cli::try_parse_from(with_image).is_ok());
    }

    #[test]
    fn test_unknown_environment_is_rejected() {
        assert!(Cli::try_parse_from(["inkpost", "--env", "staging", "status"]).is_err());
    }
}
