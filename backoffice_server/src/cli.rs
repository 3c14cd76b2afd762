use std::{env, env::VarError};

/// There's no real CLI for the server, so just do quick 'n dirty
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        // We don't expect any CLI args, so always print the help
        display_readme();
        display_envs();
    }
    has_cli_args
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

// Be explicit about which envars to print, so as to avoid accidentally exposing secrets
const DISPLAY_ENVS: [&str; 13] = [
    "RUST_LOG",
    "BO_HOST",
    "BO_PORT",
    "BO_DATABASE_URL",
    "BO_JWT_EXPIRY_SECS",
    "BO_RATE_LIMIT_MAX_REQUESTS",
    "BO_RATE_LIMIT_WINDOW_SECS",
    "BO_LOGIN_THROTTLE_SECS",
    "BO_USE_X_FORWARDED_FOR",
    "BO_USE_FORWARDED",
    "BO_SHOPIFY_SHOP",
    "BO_SHOPIFY_API_VERSION",
    "BO_SHOPIFY_HMAC_CHECKS",
];

fn display_envs() {
    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}
