use anyhow::{Context, Result, bail};
use chrono::{TimeZone, Utc};
use clap::Parser;
use market_auth::config::{self, AuthConfig};
use market_auth::{AuthCtx, Role, TokenCodec};

/// Mint or inspect a bearer credential signed with the shared secret.
///
/// Reads JWT_SECRET and AUTH_ISSUER from the environment (or .env), the same
/// keys both services use, so the output is accepted by them as-is.
#[derive(Parser, Debug)]
#[command(name = "token-gen", version, about)]
struct Args {
    /// Subject (the account email)
    #[arg(long, required_unless_present = "inspect")]
    subject: Option<String>,

    /// Numeric user id carried in the userId claim
    #[arg(long, required_unless_present = "inspect")]
    user_id: Option<i64>,

    /// Role to grant; repeat for several (LAND_OWNER, FARMER, BUYER)
    #[arg(long = "role", value_parser = parse_role)]
    roles: Vec<Role>,

    /// Lifetime in seconds. Default: ACCESS_TOKEN_TTL_SECONDS or 3600.
    #[arg(long, env = "ACCESS_TOKEN_TTL_SECONDS", default_value_t = 3600)]
    ttl: u64,

    /// Validate an existing token and print who it identifies
    #[arg(long, value_name = "TOKEN", conflicts_with_all = ["subject", "user_id", "roles"])]
    inspect: Option<String>,

    /// Print only the token
    #[arg(long, default_value_t = false)]
    quiet: bool,
}

fn parse_role(raw: &str) -> Result<Role, String> {
    raw.trim()
        .to_ascii_uppercase()
        .replace('-', "_")
        .parse::<Role>()
        .map_err(|e| e.to_string())
}

fn rfc3339(ts: i64) -> String {
    Utc.timestamp_opt(ts, 0)
        .single()
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| ts.to_string())
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let secret = config::require_env("JWT_SECRET")?;
    let issuer = config::require_env("AUTH_ISSUER")?;
    let auth = AuthConfig::new(secret, issuer, args.ttl)?;
    let codec = TokenCodec::new(&auth);

    if let Some(token) = args.inspect.as_deref() {
        return inspect(&codec, token.trim());
    }

    let (Some(subject), Some(user_id)) = (args.subject, args.user_id) else {
        bail!("--subject and --user-id are required to mint a token");
    };

    let identity = AuthCtx::new(subject, user_id, args.roles);
    let token = codec.mint(&identity).context("failed to sign token")?;

    if args.quiet {
        println!("{token}");
        return Ok(());
    }

    let claims = codec.decode(&token)?;
    println!("Authorization: Bearer {token}");
    println!();
    println!("{}", serde_json::to_string_pretty(&claims)?);
    println!("expires: {}", rfc3339(claims.exp));
    Ok(())
}

fn inspect(codec: &TokenCodec, token: &str) -> Result<()> {
    match codec.validate(token) {
        Ok(identity) => {
            let claims = codec.decode(token)?;
            let roles: Vec<&str> = identity.roles.iter().map(Role::as_str).collect();
            println!("valid");
            println!("subject: {}", identity.subject);
            println!("user_id: {}", identity.user_id);
            println!("roles:   [{}]", roles.join(", "));
            println!("issued:  {}", rfc3339(claims.iat));
            println!("expires: {}", rfc3339(claims.exp));
            Ok(())
        }
        Err(e) => bail!("rejected: {e}"),
    }
}
