/*!
Command handler for the CLI

The tool has a single operation: run one authorization attempt and report
the result.  The handler here is thin glue over `auth::flow`: it maps CLI
flags to an `AuthFlowConfig`, renders the token report, and decides which
failures are reported-but-normal (the operator denied, the callback never
came, the token endpoint said no) versus fatal (the redirect port could
not be bound).
*/

use std::sync::Arc;
use std::time::Duration;

use colored::Colorize;

use crate::auth::flow::{AuthFlow, AuthFlowConfig, TokenResponse};
use crate::cli::Cli;
use crate::clipboard;
use crate::error::{Result, SpottokenError};

/// Builds the flow configuration from parsed CLI flags.
pub fn flow_config_from_cli(cli: &Cli) -> AuthFlowConfig {
    AuthFlowConfig {
        client_id: cli.client_id.clone(),
        client_secret: cli.client_secret_opt(),
        scope: cli.scope.clone(),
        redirect_port: cli.port,
        authorize_url: cli.auth_url.clone(),
        token_url: cli.token_url.clone(),
        wait_timeout: Duration::from_secs(cli.timeout),
    }
}

/// Runs one authorization attempt and reports the outcome.
///
/// Authorization-phase failures (denied, no code, rejected exchange) are
/// printed and the process still exits 0, matching the reference behavior
/// of this tool: the operator simply re-invokes it to try again.  Only
/// startup problems (port in use, invalid endpoint URL) propagate as
/// errors.
pub async fn fetch_token(cli: Cli) -> Result<()> {
    tracing::info!("starting authorization attempt for client {}", cli.client_id);

    let config = flow_config_from_cli(&cli);
    let flow = AuthFlow::new(Arc::new(reqwest::Client::new()), config);

    match flow.run().await {
        Ok(token) => {
            print!("{}", render_token_report(&token));
            if clipboard::copy_best_effort("access token", &token.access_token) {
                println!("[-] Access token copied to clipboard.");
            }
            Ok(())
        }
        Err(e) => match e.downcast_ref::<SpottokenError>() {
            Some(SpottokenError::Authorization(msg)) => {
                eprintln!("{} {}", "[!]".red(), format!("Authorization failed: {msg}").red());
                Ok(())
            }
            Some(SpottokenError::TokenExchange { status, body }) => {
                eprintln!("{} Error fetching token: {}", "[!]".red(), status);
                eprintln!("{body}");
                Ok(())
            }
            _ => Err(e),
        },
    }
}

/// Renders the human-readable token report printed on success.
///
/// The refresh token line appears only when the server granted one, and
/// likewise for expiry and scope.
pub fn render_token_report(token: &TokenResponse) -> String {
    let rule = "=".repeat(60);
    let mut out = String::new();

    out.push_str(&format!("\n{rule}\n"));
    out.push_str("SUCCESS! HERE IS YOUR TOKEN DATA\n");
    out.push_str(&format!("{rule}\n"));
    out.push_str(&format!("\nAccess Token:\n{}\n", token.access_token));

    if let Some(ref refresh) = token.refresh_token {
        out.push_str(&format!("\nRefresh Token (Keep this safe!):\n{refresh}\n"));
    }
    if let Some(expires_in) = token.expires_in {
        out.push_str(&format!("\nExpires in: {expires_in} seconds\n"));
    }
    if let Some(ref scope) = token.scope {
        out.push_str(&format!("Scope: {scope}\n"));
    }

    out.push_str(&format!("{rule}\n"));
    out
}
