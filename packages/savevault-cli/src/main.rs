//! SaveVault CLI
//!
//! Triggers saves and loads against a local data directory:
//!
//! 1. **init**: load the RSA key pair, generating and persisting one on first
//!    run, and print its fingerprint.
//!
//! 2. **save**: encrypt a payload taken from `--data`, `--file`, stdin, or the
//!    built-in demo game state, replacing the previous save.
//!
//! 3. **load**: decrypt and print the current save.
//!
//! 4. **status**: show where files live and whether they exist.
//!
//! Logs go to stderr so payloads printed on stdout stay pipeable.

mod game_data;

use std::io::{Read, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, Report, WrapErr};

use game_data::GameData;
use savevault_core::config::DEFAULT_KEY_BITS;
use savevault_core::{HybridEncryptionManager, KeyStore, VaultConfig};

// ── CLI Arguments ─────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "savevault", version, about = "Encrypted local save data")]
struct Args {
    /// Directory holding the key file and the save file
    #[arg(long, global = true, env = "SAVEVAULT_DIR")]
    data_dir: Option<PathBuf>,

    /// RSA modulus size used when a key pair has to be generated
    #[arg(long, global = true, default_value_t = DEFAULT_KEY_BITS, env = "SAVEVAULT_KEY_BITS")]
    key_bits: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load or create the key pair
    Init,

    /// Encrypt a payload and replace the save file
    Save {
        /// Payload text
        #[arg(long, conflicts_with_all = ["file", "demo"])]
        data: Option<String>,

        /// Read the payload from a file
        #[arg(long, conflicts_with = "demo")]
        file: Option<PathBuf>,

        /// Save the sample game state
        #[arg(long)]
        demo: bool,
    },

    /// Decrypt and print the save file
    Load {
        /// Parse the payload as game state and pretty-print it
        #[arg(long)]
        pretty: bool,
    },

    /// Show file locations and presence
    Status,
}

// ── Entry Point ───────────────────────────────────────────────────────────────

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "savevault=info,savevault_core=info".into()),
        )
        .init();

    let args = Args::parse();
    let stdout = std::io::stdout();
    run(args, &mut stdout.lock())
}

fn run(args: Args, out: &mut impl Write) -> color_eyre::Result<()> {
    let config = vault_config(&args)?;

    match args.command {
        Command::Init => init(config, out),
        Command::Save { data, file, demo } => {
            let payload = read_payload(data, file, demo)?;
            save(config, &payload, out)
        }
        Command::Load { pretty } => load(config, pretty, out),
        Command::Status => status(config, out),
    }
}

fn vault_config(args: &Args) -> color_eyre::Result<VaultConfig> {
    let data_dir = args
        .data_dir
        .clone()
        .or_else(|| dirs::data_dir().map(|dir| dir.join("savevault")))
        .ok_or_else(|| eyre!("No data directory found; pass --data-dir or set SAVEVAULT_DIR"))?;

    let config = VaultConfig::new(data_dir).with_key_bits(args.key_bits);
    config.validate()?;
    Ok(config)
}

fn read_payload(
    data: Option<String>,
    file: Option<PathBuf>,
    demo: bool,
) -> color_eyre::Result<String> {
    if demo {
        return Ok(serde_json::to_string_pretty(&GameData::demo())?);
    }
    if let Some(data) = data {
        return Ok(data);
    }
    if let Some(path) = file {
        return std::fs::read_to_string(&path)
            .wrap_err_with(|| format!("Failed to read payload from {}", path.display()));
    }

    let mut payload = String::new();
    std::io::stdin()
        .read_to_string(&mut payload)
        .wrap_err("Failed to read payload from stdin")?;
    Ok(payload)
}

fn ready_manager(config: VaultConfig) -> color_eyre::Result<HybridEncryptionManager> {
    let mut manager = HybridEncryptionManager::new(config);
    manager.initialize()?;
    Ok(manager)
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn init(config: VaultConfig, out: &mut impl Write) -> color_eyre::Result<()> {
    let manager = ready_manager(config)?;
    let keys = manager.key_pair()?;

    let key_path = manager.config().key_file_path();

    writeln!(out, "Key file:    {}", key_path.display())?;
    writeln!(out, "Key size:    {} bits", keys.modulus_bits())?;
    writeln!(out, "Fingerprint: {}", keys.fingerprint())?;
    Ok(())
}

fn save(config: VaultConfig, payload: &str, out: &mut impl Write) -> color_eyre::Result<()> {
    let manager = ready_manager(config)?;
    manager.save(payload)?;

    writeln!(
        out,
        "Saved {} bytes to {}",
        payload.len(),
        manager.save_path().display()
    )?;
    Ok(())
}

fn load(config: VaultConfig, pretty: bool, out: &mut impl Write) -> color_eyre::Result<()> {
    let manager = ready_manager(config)?;

    let payload = match manager.load() {
        Ok(Some(payload)) => payload,
        Ok(None) => {
            writeln!(out, "No save data at {}", manager.save_path().display())?;
            return Ok(());
        }
        Err(e) if e.is_save_unreadable() => {
            tracing::warn!(code = e.code(), "Save data unreadable");
            return Err(
                Report::new(e).wrap_err("Save data is unreadable; save again to start fresh")
            );
        }
        Err(e) => return Err(e.into()),
    };

    if pretty {
        let data: GameData =
            serde_json::from_str(&payload).wrap_err("Save data is not game state JSON")?;
        writeln!(out, "{} (level {})", data.name, data.level)?;
        for item in &data.inventory {
            writeln!(out, "  {:>5} × {}", item.amount, item.name)?;
        }
    } else {
        write!(out, "{}", payload)?;
        if !payload.ends_with('\n') {
            writeln!(out)?;
        }
    }
    Ok(())
}

fn status(config: VaultConfig, out: &mut impl Write) -> color_eyre::Result<()> {
    let store = KeyStore::new(config.clone())?;

    writeln!(out, "Data directory: {}", config.data_dir.display())?;
    writeln!(
        out,
        "Key file:       {} ({})",
        store.key_file_path().display(),
        presence(store.exists())
    )?;
    writeln!(
        out,
        "Save file:      {} ({})",
        config.save_file_path().display(),
        presence(config.save_file_path().is_file())
    )?;
    Ok(())
}

fn presence(exists: bool) -> &'static str {
    if exists {
        "present"
    } else {
        "missing"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(dir: &std::path::Path, rest: &[&str]) -> Args {
        let mut argv = vec![
            "savevault".to_string(),
            "--data-dir".to_string(),
            dir.display().to_string(),
            "--key-bits".to_string(),
            "1024".to_string(),
        ];
        argv.extend(rest.iter().map(|s| s.to_string()));
        Args::try_parse_from(argv).unwrap()
    }

    fn run_to_string(args: Args) -> color_eyre::Result<String> {
        let mut out = Vec::new();
        run(args, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_payload_sources_conflict() {
        let result = Args::try_parse_from(["savevault", "save", "--data", "x", "--demo"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_from_flags() {
        let dir = tempfile::tempdir().unwrap();
        let config = vault_config(&args(dir.path(), &["status"])).unwrap();

        assert_eq!(config.key_bits, 1024);
        assert_eq!(config.data_dir, dir.path());
    }

    #[test]
    fn test_unknown_padding_flag_rejected() {
        let result = Args::try_parse_from(["savevault", "--legacy-padding", "status"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_unreloadable_key_bits_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut parsed = args(dir.path(), &["init"]);
        parsed.key_bits = 4104;

        assert!(vault_config(&parsed).is_err());
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[test]
    fn test_weak_key_bits_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut parsed = args(dir.path(), &["init"]);
        parsed.key_bits = 512;

        assert!(vault_config(&parsed).is_err());
    }

    #[test]
    fn test_status_before_init_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let output = run_to_string(args(dir.path(), &["status"])).unwrap();

        assert!(output.contains("missing"));
        assert!(!output.contains("present"));
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[test]
    fn test_demo_save_then_pretty_load() {
        let dir = tempfile::tempdir().unwrap();

        let output = run_to_string(args(dir.path(), &["load"])).unwrap();
        assert!(output.starts_with("No save data"));

        run_to_string(args(dir.path(), &["save", "--demo"])).unwrap();
        let output = run_to_string(args(dir.path(), &["load", "--pretty"])).unwrap();
        assert!(output.starts_with("Hero (level 5)"));
        assert!(output.contains("Potion"));

        run_to_string(args(dir.path(), &["save", "--data", "plain text"])).unwrap();
        let output = run_to_string(args(dir.path(), &["load"])).unwrap();
        assert_eq!(output, "plain text\n");
    }

    #[test]
    fn test_unreadable_save_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        run_to_string(args(dir.path(), &["save", "--data", "x"])).unwrap();
        std::fs::write(dir.path().join("gamedata.sav"), "only\ntwo").unwrap();

        let err = run_to_string(args(dir.path(), &["load"])).unwrap_err();
        assert!(err.to_string().contains("unreadable"));
    }
}
