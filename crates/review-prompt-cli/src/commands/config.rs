use clap::Subcommand;
use review_prompt_core::ReviewConfig;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "policy.minimum_application_launches")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value (0 disables a policy threshold)
        value: String,
    },
    /// List all config values
    List,
    /// Reset config to defaults
    Reset,
    /// Print the config file location
    Path,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let config = ReviewConfig::load()?;
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(format!("unknown or unset key: {key}").into()),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = ReviewConfig::load()?;
            config.set(&key, &value)?;
            config.save()?;
            println!("ok");
        }
        ConfigAction::List => {
            let config = ReviewConfig::load()?;
            let content = toml::to_string_pretty(&config)?;
            println!("{content}");
        }
        ConfigAction::Reset => {
            ReviewConfig::default().save()?;
            println!("config reset to defaults");
        }
        ConfigAction::Path => {
            println!("{}", ReviewConfig::path()?.display());
        }
    }
    Ok(())
}
