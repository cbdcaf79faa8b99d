//! pzdeploys - Entry Point
//!
//! Polls Render and Vercel for in-progress deploys and prints the tray menu
//! whenever it changes.

use std::collections::HashMap;
use std::env;
use std::sync::Arc;

use pzdeploys::app::diagnostic::run_diagnostic;
use pzdeploys::app::options::AppOptions;
use pzdeploys::app::run::run;
use pzdeploys::authn::credentials::{CredentialKey, FileCredentialProvider};
use pzdeploys::logs::{init_logging, LogOptions};
use pzdeploys::storage::layout::StorageLayout;
use pzdeploys::storage::settings::Settings;
use pzdeploys::tray::presenter::{ConsolePresenter, SystemOpener};
use pzdeploys::utils::version_info;

use secrecy::SecretString;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut cli_args: HashMap<String, String> = HashMap::new();

    for arg in args.iter().skip(1) {
        if let Some((key, value)) = arg.split_once('=') {
            // Handle --key=value format
            let clean_key = key.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), value.to_string());
        } else if arg.starts_with("--") {
            // Handle standalone flags like --version
            let clean_key = arg.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), "true".to_string());
        }
    }

    // Print version and exit
    if cli_args.contains_key("version") {
        match serde_json::to_string_pretty(&version_info()) {
            Ok(version) => println!("{}", version),
            Err(e) => eprintln!("Failed to render version info: {e}"),
        }
        return;
    }

    let layout = StorageLayout::default();
    let credentials = Arc::new(FileCredentialProvider::new(layout.credentials_file()));

    // Persist credentials and exit
    if cli_args.contains_key("store-credentials") {
        std::process::exit(store_credentials(&credentials, &cli_args).await);
    }
    if let Some(key) = cli_args.get("remove-credential") {
        std::process::exit(remove_credential(&credentials, key).await);
    }

    let settings = match Settings::load(&layout.settings_file()).await {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    // Initialize logging
    let log_options = LogOptions {
        log_level: settings.log_level,
        json_format: settings.json_logs,
        log_dir: settings.log_to_file.then(|| layout.logs_dir()),
        ..Default::default()
    };
    let _log_guard = match init_logging(log_options) {
        Ok(guard) => guard,
        Err(e) => {
            println!("Failed to initialize logging: {e}");
            None
        }
    };

    let options = AppOptions::from_settings(&settings);
    let presenter = Arc::new(ConsolePresenter::new(
        options.icons.clone(),
        options.tooltip.clone(),
    ));

    // Run diagnostics
    if cli_args.contains_key("diagnostic") || cli_args.contains_key("diag") {
        if let Err(e) = run_diagnostic(&options, credentials, presenter).await {
            error!("Diagnostics failed: {e}");
            std::process::exit(1);
        }
        return;
    }

    info!("Running deploy monitor with options: {:?}", options);
    let result = run(
        options,
        credentials,
        presenter,
        Arc::new(SystemOpener),
        await_shutdown_signal(),
    )
    .await;
    if let Err(e) = result {
        error!("Deploy monitor stopped with an error: {e}");
        std::process::exit(1);
    }
}

/// Store every credential passed as `--<key>=<value>`. Returns the exit code.
async fn store_credentials(
    credentials: &FileCredentialProvider,
    cli_args: &HashMap<String, String>,
) -> i32 {
    let mut stored = 0;
    for key in CredentialKey::ALL {
        let flag = key.as_str().replace('_', "-");
        let Some(value) = cli_args.get(&flag) else {
            continue;
        };
        match credentials
            .store_credential(key, &SecretString::from(value.clone()))
            .await
        {
            Ok(()) => {
                println!("Stored {}", key);
                stored += 1;
            }
            Err(e) => {
                eprintln!("[ERROR] Failed to store {}: {}", key, e);
                return 1;
            }
        }
    }

    if stored == 0 {
        eprintln!(
            "Nothing to store. Provide --render-api-key=<key>, --vercel-api-key=<key> or --vercel-team-id=<id>"
        );
        return 1;
    }
    0
}

async fn remove_credential(credentials: &FileCredentialProvider, key: &str) -> i32 {
    let key = match key.parse::<CredentialKey>() {
        Ok(key) => key,
        Err(e) => {
            eprintln!("[ERROR] {}", e);
            return 1;
        }
    };
    match credentials.remove_credential(key).await {
        Ok(true) => {
            println!("Removed {}", key);
            0
        }
        Ok(false) => {
            println!("{} was not stored", key);
            0
        }
        Err(e) => {
            eprintln!("[ERROR] Failed to remove {}: {}", key, e);
            1
        }
    }
}

async fn await_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let sigterm = signal(SignalKind::terminate());
        let sigint = signal(SignalKind::interrupt());
        let (mut sigterm, mut sigint) = match (sigterm, sigint) {
            (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
            _ => {
                error!("Failed to install signal handlers, falling back to Ctrl+C");
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };

        tokio::select! {
            _ = sigterm.recv() => {
                info!("SIGTERM received, shutting down...");
            }
            _ = sigint.recv() => {
                info!("SIGINT received, shutting down...");
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl+C received, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {e}");
        }
        info!("Ctrl+C received, shutting down...");
    }
}
