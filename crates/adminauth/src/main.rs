mod runtime_impl;

use std::sync::Arc;

use adminauth_core::auth::{collect_roles, decode_payload, has_role, inspect_header};
use adminauth_core::client::{BackendClient, TokenResolver};
use adminauth_core::login::LoginFlow;
use adminauth_core::runtime::MemoryStore;
use adminauth_core::{AuthConfig, AuthSignal, SessionError, SessionSynchronizer, UserProfile};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use runtime_impl::{ConsoleNavigator, NativeHttpClient, StaticProvider, TracingNotifier};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "adminauth", version, about = "Admin panel session and token tooling")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the resolved configuration
    Config,
    /// Decode a compact token without verifying it
    Decode { token: String },
    /// Collect roles from one or more tokens and check admission
    Roles {
        /// Extra claim names to probe after the configured ones
        #[arg(long = "claim")]
        claims: Vec<String>,
        tokens: Vec<String>,
    },
    /// Run one session synchronization cycle against the given tokens
    Sync {
        #[arg(long)]
        sub: String,
        #[arg(long)]
        access_token: String,
        #[arg(long)]
        id_token: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        /// Current location of the app
        #[arg(long, default_value = "/login")]
        path: String,
    },
    /// Print the provider authorize URL for a redirect login
    AuthorizeUrl {
        #[arg(long)]
        email: Option<String>,
    },
    /// Log in through the backend with email and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Exchange an OAuth callback code with the backend
    Callback { code: String },
    /// Ask the backend what it sees in a bearer token
    DebugToken {
        #[arg(long)]
        token: String,
    },
}

/// Resolver returning a fixed bearer token
struct FixedToken(String);

#[async_trait]
impl TokenResolver for FixedToken {
    async fn resolve(&self) -> Result<Option<String>, SessionError> {
        Ok(Some(self.0.clone()))
    }
}

type CliSynchronizer = SessionSynchronizer<StaticProvider, Arc<ConsoleNavigator>, TracingNotifier>;

fn synchronizer(
    config: &AuthConfig,
    navigator: Arc<ConsoleNavigator>,
    id_token: Option<String>,
    access_token: Option<String>,
) -> CliSynchronizer {
    let provider = StaticProvider::new(&config.domain, &config.client_id, id_token, access_token);
    SessionSynchronizer::new(provider, navigator, TracingNotifier, config.clone())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AuthConfig::from_env();

    match cli.command {
        Command::Config => {
            print_json(&serde_json::json!({
                "config": config,
                "namespace": config.namespace(),
                "loginScope": config.login_scope(),
                "resourceParams": config.resource_params(),
                "roleClaimCandidates": config.role_claim_candidates(),
                "missing": config.missing_required(),
            }))?;
        }
        Command::Decode { token } => {
            let claims = decode_payload(Some(&token)).context("token payload could not be decoded")?;
            print_json(&serde_json::json!({
                "header": inspect_header(&token),
                "claims": claims,
            }))?;
        }
        Command::Roles { claims, tokens } => {
            let mut candidates = config.role_claim_candidates();
            for claim in claims {
                if !candidates.contains(&claim) {
                    candidates.push(claim);
                }
            }

            let decoded: Vec<_> = tokens.iter().map(|t| decode_payload(Some(t))).collect();
            let sources: Vec<_> = decoded.iter().map(Option::as_ref).collect();
            let roles = collect_roles(&sources, &candidates);

            print_json(&serde_json::json!({
                "candidates": candidates,
                "roles": roles,
                "admitted": has_role(&roles, &config.admin_role),
            }))?;
        }
        Command::Sync {
            sub,
            access_token,
            id_token,
            name,
            email,
            path,
        } => {
            let navigator = Arc::new(ConsoleNavigator::new(&path));
            let sync = synchronizer(&config, navigator, id_token, Some(access_token))
                .with_diagnostics(true);

            let user = UserProfile {
                sub,
                name,
                nickname: None,
                email,
            };
            sync.on_auth_change(AuthSignal::signed_in(user)).await;

            print_json(&serde_json::json!({
                "state": sync.state().label(),
                "session": sync.session(),
                "diagnostics": sync.diagnostics(),
            }))?;
        }
        Command::AuthorizeUrl { email } => {
            let navigator = Arc::new(ConsoleNavigator::new("/login"));
            let sync = synchronizer(&config, navigator, None, None);
            let backend = BackendClient::new(NativeHttpClient::new()?, MemoryStore::new(), &config.api_url);
            LoginFlow::new(&sync, &backend)
                .login_with_redirect(email.as_deref())
                .await;
        }
        Command::Login { email, password } => {
            let navigator = Arc::new(ConsoleNavigator::new("/login"));
            let sync = synchronizer(&config, navigator.clone(), None, None);
            let backend = BackendClient::new(NativeHttpClient::new()?, MemoryStore::new(), &config.api_url)
                .with_navigator(navigator);

            match LoginFlow::new(&sync, &backend)
                .login_with_credentials(&email, &password)
                .await
            {
                Ok(session) => print_json(&session)?,
                Err(SessionError::Auth(adminauth_core::AuthError::Validation(fields))) => {
                    print_json(&fields)?;
                    bail!("credentials rejected before login");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Command::Callback { code } => {
            let navigator = Arc::new(ConsoleNavigator::new("/callback"));
            let sync = synchronizer(&config, navigator.clone(), None, None);
            let backend = BackendClient::new(NativeHttpClient::new()?, MemoryStore::new(), &config.api_url)
                .with_navigator(navigator);

            let session = LoginFlow::new(&sync, &backend).handle_callback(&code).await?;
            print_json(&session)?;
        }
        Command::DebugToken { token } => {
            let navigator = Arc::new(ConsoleNavigator::new("/dashboard"));
            let backend = BackendClient::new(NativeHttpClient::new()?, MemoryStore::new(), &config.api_url)
                .with_navigator(navigator)
                .with_token_resolver(Arc::new(FixedToken(token)));

            let info = backend.debug_token().await?;
            print_json(&info)?;
        }
    }

    Ok(())
}
