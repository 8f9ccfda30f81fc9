//! Command line interface for pixauth.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pixauth::auth::PixivAuth;
use pixauth::error::{AuthError, Result};
use pixauth::login::PixivLogin;
use pixauth::oauth::TokenClient;
use pixauth::proxy::ProxyConfig;
use pixauth::token::TokenResponse;

#[derive(Parser)]
#[command(name = "pixauth", version, about = "Get your pixiv access/refresh token pair")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Retrieve tokens by logging in through a browser window
    #[command(visible_alias = "l")]
    Login {
        /// Your E-mail address / pixiv ID
        #[arg(short, long)]
        username: Option<String>,

        /// Your current pixiv password
        #[arg(short, long)]
        password: Option<String>,

        /// Output the response as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// `login` with stored or interactively prompted credentials
    #[command(name = "login-interactive", visible_alias = "li")]
    LoginInteractive {
        /// Path of the stored credentials file
        #[arg(long, value_name = "PATH", default_value = "client.json")]
        auth_json: PathBuf,

        /// Output the response as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// `login` in headless mode
    #[command(name = "login-headless", visible_alias = "lh")]
    LoginHeadless {
        /// Your E-mail address / pixiv ID
        #[arg(short, long)]
        username: String,

        /// Your current pixiv password
        #[arg(short, long)]
        password: String,

        /// Output the response as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Refresh tokens
    #[command(visible_alias = "r")]
    Refresh {
        /// Output the response as JSON
        #[arg(short, long)]
        json: bool,

        refresh_token: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pixauth=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let proxy = ProxyConfig::from_env();

    let (result, json) = match cli.command {
        Command::Login {
            username,
            password,
            json,
        } => {
            eprintln!("[!]: A browser window will be launched. Please login.");
            let login = PixivLogin::new(false, username, password);
            (login.login(&proxy).await, json)
        }
        Command::LoginInteractive { auth_json, json } => {
            (PixivAuth::new(auth_json).auth(&proxy).await, json)
        }
        Command::LoginHeadless {
            username,
            password,
            json,
        } => {
            let login = PixivLogin::new(true, Some(username), Some(password));
            (login.login(&proxy).await, json)
        }
        Command::Refresh {
            json,
            refresh_token,
        } => (refresh(&proxy, &refresh_token).await, json),
    };

    match result {
        Ok(response) => {
            eprintln!("[+]: Success!");
            print_token_response(&response, json);
            ExitCode::SUCCESS
        }
        Err(AuthError::MalformedResponse { body, .. }) => {
            eprintln!("error:");
            println!("{body}");
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("[!]: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn refresh(proxy: &ProxyConfig, refresh_token: &str) -> Result<TokenResponse> {
    TokenClient::new(proxy)?.refresh(refresh_token).await
}

fn print_token_response(response: &TokenResponse, json: bool) {
    if json {
        let out = serde_json::json!({
            "access_token": response.access_token,
            "refresh_token": response.refresh_token,
            "expires_in": response.expires_in,
        });
        println!("{}", serde_json::to_string_pretty(&out).unwrap_or_default());
    } else {
        println!("access_token: {}", response.access_token);
        println!("refresh_token: {}", response.refresh_token);
        println!("expires_in: {}", response.expires_in);
    }
}
