//! # Save / Load Demo
//!
//! Walks through the full lifecycle against a throwaway directory:
//! 1. First run generates and persists a key pair
//! 2. A save is written and read back
//! 3. A restart reuses the same key pair
//! 4. A tampered save is rejected
//!
//! ## Run
//!
//! ```bash
//! cargo run --example save_load_demo
//! ```

use savevault_core::{HybridEncryptionManager, SaveRecord, VaultConfig};

fn main() {
    println!("=== SaveVault Core: Save / Load Demo ===\n");

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = VaultConfig::new(dir.path());

    // Step 1: First run
    println!(
        "Step 1: Initializing (generates a {}-bit key pair)...",
        config.key_bits
    );
    let mut manager = HybridEncryptionManager::new(config.clone());
    manager.initialize().expect("Failed to initialize");

    let fingerprint = manager.key_pair().expect("Not ready").fingerprint();
    println!("  Key file: {}", config.key_file_path().display());
    println!("  Fingerprint: {}", fingerprint);
    println!();

    // Step 2: Save and load
    println!("Step 2: Saving game state...");
    let state = r#"{
    "Name": "Hero",
    "Level": 5,
    "Inventory": [
        { "Name": "Potion", "amount": 3 }
    ]
}"#;
    manager.save(state).expect("Failed to save");

    let on_disk = std::fs::read_to_string(manager.save_path()).expect("Failed to read save");
    for (label, line) in ["wrapped key", "wrapped IV", "ciphertext"].iter().zip(on_disk.lines()) {
        println!("  {:<12} {}...", label, &line[..line.len().min(32)]);
    }

    let loaded = manager.load().expect("Failed to load");
    assert_eq!(loaded.as_deref(), Some(state));
    println!("  Loaded back {} bytes", state.len());
    println!();

    // Step 3: Restart
    println!("Step 3: Restarting with the same directory...");
    let mut restarted = HybridEncryptionManager::new(config);
    restarted.initialize().expect("Failed to initialize");
    let reloaded = restarted.key_pair().expect("Not ready").fingerprint();
    assert_eq!(reloaded, fingerprint);
    let restored = restarted.load().expect("Failed to load");
    assert_eq!(restored.as_deref(), Some(state));
    println!("  Same key pair, save still readable");
    println!();

    // Step 4: Tamper
    println!("Step 4: Flipping one ciphertext byte...");
    let mut record = SaveRecord::parse(on_disk.as_bytes()).expect("Failed to parse");
    record.ciphertext[0] ^= 0x01;
    std::fs::write(restarted.save_path(), record.encode()).expect("Failed to write");

    match restarted.load() {
        Err(e) if e.is_save_unreadable() => println!("  Rejected: {} (code {})", e, e.code()),
        other => panic!("Tampered save was accepted: {:?}", other),
    }

    println!("\n=== Demo Complete ===");
}
