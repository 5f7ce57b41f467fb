//! scoped-acl command-line tool
//!
//! Resolves, stores and checks episode and series policies kept in a
//! filesystem policy store.

use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand};
use scoped_acl::{
    access_control::{AccessControlEntry, AccessControlList, AccessDecision, AclScope, ScopeResolver},
    config::{AppConfig, LogFormat, load_config},
    identity::{CallerContext, create_role_provider},
    store::{ContentObject, FsPolicyStore, SharedPolicyStore},
    xacml,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Scoped ACL - episode and series access control lists as XACML policies
#[derive(Parser, Debug)]
#[command(name = "scoped-acl")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "SCOPED_ACL_CONFIG", global = true)]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "SCOPED_ACL_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the effective ACL of an object as JSON
    Resolve {
        /// Content object id
        #[arg(long)]
        object: String,

        /// Requested scope (episode, series, merged, global)
        #[arg(long, default_value = "merged", value_parser = parse_scope)]
        scope: AclScope,
    },

    /// Replace the policy of an object at a scope
    Set {
        /// Content object id
        #[arg(long)]
        object: String,

        /// Scope to write (episode, series)
        #[arg(long, value_parser = parse_scope)]
        scope: AclScope,

        /// Resource id written into the policy (defaults to the object id)
        #[arg(long)]
        resource: Option<String>,

        #[command(flatten)]
        acl: AclInput,
    },

    /// Remove the policy of an object at a scope
    Remove {
        /// Content object id
        #[arg(long)]
        object: String,

        /// Scope to remove (episode, series)
        #[arg(long, value_parser = parse_scope)]
        scope: AclScope,
    },

    /// Check whether an action is permitted; exits with status 1 when denied
    Check {
        /// Content object id
        #[arg(long)]
        object: String,

        /// Action to check
        #[arg(long)]
        action: String,

        /// Role held by the caller (repeatable)
        #[arg(long = "role", conflicts_with = "user", required_unless_present = "user")]
        roles: Vec<String>,

        /// Look the caller's roles up in [identity]
        #[arg(long)]
        user: Option<String>,
    },

    /// Print the XACML policy for an ACL
    Encode {
        /// Resource id written into the policy
        #[arg(long, default_value = "")]
        resource: String,

        #[command(flatten)]
        acl: AclInput,
    },

    /// Print the ACL of a XACML policy file as JSON
    Decode {
        /// Policy file
        file: PathBuf,
    },
}

/// ACL given inline or as a JSON file
#[derive(ClapArgs, Debug)]
struct AclInput {
    /// Entry as ROLE:ACTION:allow|deny (repeatable)
    #[arg(long = "entry", value_name = "ROLE:ACTION:EFFECT", conflicts_with = "file")]
    entries: Vec<AccessControlEntry>,

    /// JSON file holding an array of entries
    #[arg(long)]
    file: Option<PathBuf>,
}

impl AclInput {
    async fn into_acl(self) -> anyhow::Result<AccessControlList> {
        match self.file {
            Some(path) => {
                let json = tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                serde_json::from_str(&json)
                    .with_context(|| format!("Failed to parse ACL from {}", path.display()))
            }
            None => Ok(self.entries.into_iter().collect()),
        }
    }
}

fn parse_scope(s: &str) -> Result<AclScope, String> {
    AclScope::try_parse(s).ok_or_else(|| {
        format!("unknown scope '{}' (expected episode, series, merged or global)", s)
    })
}

fn init_logging(args: &Args, config: &AppConfig) {
    let level = args.log_level.as_deref().unwrap_or(&config.logging.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match config.logging.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init(),
    }
}

fn create_resolver(config: &AppConfig) -> ScopeResolver {
    let root = config.store.root_path();
    debug!(root = %root.display(), "Using filesystem policy store");
    let store: SharedPolicyStore = Arc::new(FsPolicyStore::new(root));
    ScopeResolver::new(store, &config.policy)
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration
    let config = load_config(args.config.as_deref())
        .inspect_err(|e| eprintln!("Failed to load configuration: {}", e))?;

    // Initialize logging
    init_logging(&args, &config);
    debug!(version = env!("CARGO_PKG_VERSION"), merge_mode = %config.policy.merge_mode, "Starting scoped-acl");

    match args.command {
        Command::Resolve { object, scope } => {
            let resolver = create_resolver(&config);
            let resolved = resolver
                .resolve(&ContentObject::new(object), scope)
                .await
                .inspect_err(|e| error!(error = %e, "Failed to resolve ACL"))?;
            print_json(&resolved)?;
        }
        Command::Set {
            object,
            scope,
            resource,
            acl,
        } => {
            let acl = acl.into_acl().await?;
            let resource = resource.unwrap_or_else(|| object.clone());
            let resolver = create_resolver(&config);
            let stored = resolver
                .set_policy(&ContentObject::new(object), scope, &acl, &resource)
                .await
                .inspect_err(|e| error!(error = %e, "Failed to store policy"))?;
            print_json(&stored)?;
        }
        Command::Remove { object, scope } => {
            let resolver = create_resolver(&config);
            match resolver
                .remove_policy(&ContentObject::new(object), scope)
                .await
                .inspect_err(|e| error!(error = %e, "Failed to remove policy"))?
            {
                Some(location) => println!("removed {}", location),
                None => println!("no {} policy", scope),
            }
        }
        Command::Check {
            object,
            action,
            roles,
            user,
        } => {
            let roles = match user {
                Some(user) => {
                    let provider = create_role_provider(&config.identity)?;
                    provider.roles(&CallerContext::new(user)).await?
                }
                None => roles,
            };
            let resolver = create_resolver(&config);
            let decision = resolver
                .has_permission(&ContentObject::new(object), &action, roles.as_slice())
                .await
                .inspect_err(|e| error!(error = %e, "Failed to check permission"))?;

            match decision {
                AccessDecision::Allowed => println!("allowed"),
                AccessDecision::Denied(reason) => {
                    info!(action = %action, reason = %reason, "Permission denied");
                    println!("denied: {}", reason);
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Command::Encode { resource, acl } => {
            let acl = acl.into_acl().await?;
            print!("{}", xacml::encode(&acl, &resource)?);
        }
        Command::Decode { file } => {
            let bytes = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let acl = xacml::decode_bytes(&bytes)?;
            print_json(&acl)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
