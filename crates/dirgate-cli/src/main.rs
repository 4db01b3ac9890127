//! Dirgate - Active Directory authentication from the command line
//!
//! Verifies credentials, changes and resets passwords, and resolves
//! distinguished names against an LDAP directory.

mod commands;
mod config;
mod output;
mod secrets;

use clap::{Parser, Subcommand};
use commands::CommandContext;
use config::DirectoryArgs;
use dirgate_auth::DirectoryClient;
use dirgate_core::config::LoggingConfig;
use dirgate_core::DirgateConfig;
use output::OutputFormat;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "dirgate")]
#[command(author = "Dirgate Team")]
#[command(version = dirgate_core::VERSION)]
#[command(about = "Active Directory authentication and password management", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    directory: DirectoryArgs,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "DIRGATE_LOG_LEVEL")]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a user's password
    ///
    /// The password is read from DIRGATE_PASSWORD, else from stdin.
    Verify {
        /// Username or user principal name
        username: String,
    },

    /// Change a user's own password
    ///
    /// Passwords are read from DIRGATE_OLD_PASSWORD and DIRGATE_NEW_PASSWORD,
    /// else one line each from stdin, old first.
    ChangePassword {
        /// Username or user principal name
        username: String,
    },

    /// Reset another user's password as an administrator
    ///
    /// Passwords are read from DIRGATE_ADMIN_PASSWORD and
    /// DIRGATE_NEW_PASSWORD, else one line each from stdin, admin first.
    ResetPassword {
        /// Account whose password is reset
        target: String,

        /// Administrator username or user principal name
        #[arg(long, env = "DIRGATE_ADMIN_USER")]
        admin: String,
    },

    /// Look up the distinguished name of an entry
    ///
    /// The bind password is read from DIRGATE_PASSWORD, else from stdin.
    ResolveDn {
        /// Value to match
        value: String,

        /// Attribute to match on
        #[arg(long, default_value = dirgate_core::UPN_ATTRIBUTE)]
        attribute: String,

        /// Account to bind as for the search
        #[arg(long, env = "DIRGATE_BIND_USER")]
        bind_user: String,
    },

    /// Validate the configuration
    ConfigCheck {
        /// Also open and close a connection to the server
        #[arg(long)]
        connect: bool,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Verify { .. } => "verify",
            Commands::ChangePassword { .. } => "change-password",
            Commands::ResetPassword { .. } => "reset-password",
            Commands::ResolveDn { .. } => "resolve-dn",
            Commands::ConfigCheck { .. } => "config-check",
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let operation = cli.command.name();
    let output_format = cli.output;

    let result = match config::load(cli.config.as_deref(), &cli.directory) {
        Ok(config) => {
            init_logging(&config.logging, cli.log_level.as_deref());
            run(cli, config).await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match output_format {
                OutputFormat::Json => println!("{}", output::error_json(operation, &e)),
                OutputFormat::Text => eprintln!("{}", output::error_text(&e)),
            }
            ExitCode::from(output::exit_code(&e))
        }
    }
}

/// Logs go to stderr so stdout stays parseable
fn init_logging(logging: &LoggingConfig, level: Option<&str>) {
    let level = level.unwrap_or(&logging.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if logging.format == "json" {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .with(filter)
            .init();
    }
}

async fn run(cli: Cli, config: DirgateConfig) -> anyhow::Result<()> {
    let directory = config.directory.to_directory_config()?;
    debug!(
        server = %directory.server,
        port = directory.port,
        security = %directory.security,
        "Loaded directory configuration"
    );

    let ctx = CommandContext {
        client: DirectoryClient::new(directory),
        output_format: cli.output,
    };

    match cli.command {
        Commands::Verify { username } => {
            let password = secrets::secret(secrets::PASSWORD_VAR, "password")?;
            commands::verify::execute(&ctx, &username, &password).await
        }
        Commands::ChangePassword { username } => {
            let old_password = secrets::secret(secrets::OLD_PASSWORD_VAR, "old password")?;
            let new_password = secrets::secret(secrets::NEW_PASSWORD_VAR, "new password")?;
            commands::change_password::execute(&ctx, &username, &old_password, &new_password)
                .await
        }
        Commands::ResetPassword { target, admin } => {
            let admin_password = secrets::secret(secrets::ADMIN_PASSWORD_VAR, "admin password")?;
            let new_password = secrets::secret(secrets::NEW_PASSWORD_VAR, "new password")?;
            commands::reset_password::execute(&ctx, &admin, &admin_password, &target, &new_password)
                .await
        }
        Commands::ResolveDn {
            value,
            attribute,
            bind_user,
        } => {
            let password = secrets::secret(secrets::PASSWORD_VAR, "password")?;
            commands::resolve_dn::execute(&ctx, &bind_user, &password, &attribute, &value).await
        }
        Commands::ConfigCheck { connect } => commands::config_check::execute(&ctx, connect).await,
    }
}
