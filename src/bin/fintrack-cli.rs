use std::process::ExitCode;

use clap::{Parser, Subcommand};
use uuid::Uuid;

use fintrack::auth::dto::{LoginRequest, RegisterRequest};
use fintrack::client::{Dashboard, HttpApi, TokenFile};
use fintrack::transactions::TransactionKind;

/// Command-line dashboard for a fintrack server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Base URL of the fintrack server.
    #[arg(long, env = "FINTRACK_API_URL", default_value = "http://localhost:5000")]
    api_url: String,

    /// File the login token is stored in.
    #[arg(long, env = "FINTRACK_TOKEN_FILE", default_value = ".fintrack-token")]
    token_file: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account and stay signed in.
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Sign in and store the token.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the stored token.
    Logout,
    /// Show totals and every transaction.
    List,
    /// Record an income or expense.
    Add {
        name: String,
        amount: String,
        /// income or expense
        #[arg(long = "type", default_value = "income")]
        kind: TransactionKind,
    },
    /// Delete one transaction.
    Delete { id: Uuid },
    /// Delete several transactions at once; nothing is deleted if any is not yours.
    DeleteMany {
        #[arg(required = true)]
        ids: Vec<Uuid>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let tokens = TokenFile::new(&args.token_file);
    let api = HttpApi::new(&args.api_url);

    match args.command {
        Command::Register {
            name,
            email,
            password,
        } => {
            let res = api
                .register(&RegisterRequest {
                    name,
                    email,
                    password,
                })
                .await
                .map_err(|e| {
                    tracing::debug!(error = %e, "register failed");
                    anyhow::anyhow!("Registration failed. Please try again.")
                })?;
            tokens.save(&res.token)?;
            println!(
                "Registered {} <{}> (token saved to {})",
                res.user.name,
                res.user.email,
                tokens.path().display()
            );
            return Ok(());
        }
        Command::Login { email, password } => {
            let res = api
                .login(&LoginRequest { email, password })
                .await
                .map_err(|e| {
                    tracing::debug!(error = %e, "login failed");
                    anyhow::anyhow!("Invalid email or password")
                })?;
            tokens.save(&res.token)?;
            println!(
                "Signed in as {} (token saved to {})",
                res.user.email,
                tokens.path().display()
            );
            return Ok(());
        }
        Command::Logout => {
            tokens.clear()?;
            println!("Signed out");
            return Ok(());
        }
        _ => {}
    }

    let token = tokens.load()?.ok_or_else(|| {
        anyhow::anyhow!("Not signed in; run `fintrack-cli login` first")
    })?;
    let mut dash = Dashboard::new(api.with_token(token));

    // The dashboard always starts from a fresh list; a failed fetch is shown
    // in the rendered error line.
    let loaded = dash.load().await.is_ok();

    let outcome = match args.command {
        Command::List => Ok(()),
        Command::Add { name, amount, kind } if loaded => {
            dash.set_name(name);
            dash.set_amount(amount);
            dash.set_kind(kind);
            dash.add().await.map(|_| ())
        }
        Command::Delete { id } if loaded => dash.delete(id).await,
        Command::DeleteMany { ids } if loaded => {
            for id in ids {
                dash.select(id);
            }
            dash.delete_selected().await
        }
        _ => Ok(()),
    };

    print!("{}", dash.render());
    match (loaded, outcome) {
        (true, Ok(())) => Ok(()),
        (_, Err(e)) => Err(e.into()),
        (false, Ok(())) => Err(anyhow::anyhow!("could not load transactions")),
    }
}
