//! `bondsman init`: write a default node configuration.

use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (defaults to current directory).
    #[arg(default_value = ".")]
    pub dir: PathBuf,

    /// Arbiter identity written into the configuration.
    #[arg(long, default_value = "admin")]
    pub arbiter: String,
}

fn default_config(arbiter: &str) -> String {
    format!(
        r#"# Bondsman Node Configuration

[engine]
arbiter = "{arbiter}"
fee_percent = 10
min_amount = 100

[api]
listen_addr = "127.0.0.1"
port = 9101

[storage]
data_dir = "./data"

[logging]
level = "info"
format = "text"
"#
    )
}

pub fn run(args: &InitArgs) -> anyhow::Result<()> {
    if args.arbiter.trim().is_empty() || args.arbiter.contains('"') {
        anyhow::bail!("invalid arbiter identity {:?}", args.arbiter);
    }

    let config_path = args.dir.join("bondsman.toml");

    if config_path.exists() {
        anyhow::bail!("configuration file already exists at {}", config_path.display());
    }

    std::fs::create_dir_all(&args.dir)?;
    std::fs::write(&config_path, default_config(&args.arbiter))?;
    println!("Initialized Bondsman node at {}", config_path.display());
    println!("Edit bondsman.toml to customize your configuration.");
    println!("Run 'bondsman-node' to start the node.");

    // Create data directory
    let data_dir = args.dir.join("data");
    std::fs::create_dir_all(&data_dir)?;

    Ok(())
}
