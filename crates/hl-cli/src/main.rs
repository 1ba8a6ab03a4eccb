//! Hushlist CLI
//!
//! CLI tool for building digest block lists and checking text and URLs
//! against a JSON configuration.

mod logger;

use clap::{Parser, Subcommand};

use hl_core::{
    canonical_phrase, canonical_site, digest_str, BlockingDecisionService, ConfigProvider, Digest, JsonFileConfig,
};

#[derive(Parser)]
#[command(name = "hl-cli")]
#[command(about = "Hushlist block list tools")]
struct Cli {
    /// Log engine diagnostics to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Digest block list entries and print them as a JSON array
    Digest {
        /// Treat entries as sites (canonicalize scheme, www., trailing slash)
        #[arg(short, long)]
        site: bool,

        /// Words, phrases, or sites to digest (punctuation and extra spaces are dropped)
        #[arg(required = true)]
        entries: Vec<String>,
    },

    /// Word-level check of text against the word digests
    Check {
        /// Configuration file
        #[arg(short, long)]
        config: String,

        text: String,
    },

    /// Redact blocked phrases in text
    Scrub {
        /// Configuration file
        #[arg(short, long)]
        config: String,

        text: String,
    },

    /// Check a URL with both site granularities
    Url {
        /// Configuration file
        #[arg(short, long)]
        config: String,

        url: String,
    },

    /// Load a configuration file and report its contents
    Validate {
        /// Configuration file
        #[arg(short, long)]
        config: String,
    },
}

fn main() {
    let cli = Cli::parse();
    logger::install(cli.verbose);

    let result = match cli.command {
        Commands::Digest { site, entries } => cmd_digest(&entries, site),
        Commands::Check { config, text } => cmd_check(&config, &text),
        Commands::Scrub { config, text } => cmd_scrub(&config, &text),
        Commands::Url { config, url } => cmd_url(&config, &url),
        Commands::Validate { config } => cmd_validate(&config),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn load_service(path: &str) -> Result<BlockingDecisionService<JsonFileConfig>, String> {
    let service = BlockingDecisionService::new(JsonFileConfig::new(path));
    service
        .initialize()
        .map_err(|e| format!("Failed to load '{}': {}", path, e))?;
    Ok(service)
}

fn cmd_digest(entries: &[String], site: bool) -> Result<(), String> {
    let digests = entries
        .iter()
        .map(|entry| digest_entry(entry, site))
        .collect::<Result<Vec<Digest>, String>>()?;

    let json = serde_json::to_string_pretty(&digests).map_err(|e| format!("Failed to encode digests: {}", e))?;
    println!("{}", json);
    Ok(())
}

/// Digest one entry in the form the engine hashes at check time.
fn digest_entry(entry: &str, site: bool) -> Result<Digest, String> {
    let canonical = if site {
        canonical_site(entry).map_err(|e| format!("Invalid site '{}': {}", entry, e))?
    } else {
        canonical_phrase(entry).ok_or_else(|| format!("Entry '{}' has no words to block", entry))?
    };
    Ok(digest_str(&canonical))
}

fn cmd_check(config: &str, text: &str) -> Result<(), String> {
    let service = load_service(config)?;
    println!("{}", service.contains_blocked_word(text));
    Ok(())
}

fn cmd_scrub(config: &str, text: &str) -> Result<(), String> {
    let service = load_service(config)?;
    let outcome = service.scrub(text);
    println!("{}", outcome.text);
    eprintln!("  Matches:  {}", outcome.match_count);
    Ok(())
}

fn cmd_url(config: &str, url: &str) -> Result<(), String> {
    let service = load_service(config)?;
    println!("Navigation blocked:  {}", service.should_block_url(url));
    println!("Site blocked:        {}", service.is_site_blocked(url));
    Ok(())
}

fn cmd_validate(path: &str) -> Result<(), String> {
    let provider = JsonFileConfig::new(path);
    let config = provider
        .load()
        .map_err(|e| format!("Invalid configuration: {}", e))?;

    println!("Configuration '{}' is valid", path);
    println!("  Enabled:       {}", config.enabled);
    println!("  Word digests:  {}", config.word_set().len());
    println!("  Site digests:  {}", config.site_set().len());
    println!("  Max n-gram:    {}", config.max_ngram);
    println!("  Replacements:  {}", config.replacements.len());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hl_core::{EngineConfig, StaticConfig};

    fn service_blocking(entries: &[&str]) -> BlockingDecisionService<StaticConfig> {
        let config = EngineConfig {
            word_digests: entries.iter().map(|e| digest_entry(e, false).unwrap()).collect(),
            replacements: vec!["***".to_string()],
            ..EngineConfig::default()
        };
        let service = BlockingDecisionService::new(StaticConfig::new(config));
        service.initialize().unwrap();
        service
    }

    #[test]
    fn test_digest_entry_matches_text_with_punctuation() {
        let service = service_blocking(&["don't", "sit  down", "e-mail"]);

        assert!(service.contains_blocked_word("I don't know"));
        assert_eq!(service.scrub("I don't know").text, "I *** know");
        assert_eq!(service.scrub("please sit  down").text, "please ***");
        assert_eq!(service.scrub("send e-mail").text, "send ***");
    }

    #[test]
    fn test_digest_entry_site() {
        assert_eq!(
            digest_entry("https://WWW.Example.com/", true).unwrap(),
            digest_str("example.com")
        );
        assert!(digest_entry("", true).is_err());
    }

    #[test]
    fn test_digest_entry_rejects_punctuation_only() {
        assert!(digest_entry(" ... ", false).is_err());
    }
}
