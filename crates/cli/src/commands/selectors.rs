use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use conform_core::analysis::{normalize_signature, selector_hex, signature_hash};
use conform_core::model::Standard;
use conform_core::selectors::{lookup_signature, scan_bytecode, SelectorEntry};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct StandardInfo {
    name: &'static str,
    function: &'static str,
    default_signature: &'static str,
    selector: String,
}

#[derive(Debug, Serialize)]
struct SelectorInfo {
    signature: String,
    normalized: String,
    hash: String,
    selector: String,
    known: Option<&'static SelectorEntry>,
}

/// List the standard presets and their default signatures.
pub fn standards_command(json: bool) -> Result<()> {
    let standards: Vec<StandardInfo> = Standard::ALL
        .iter()
        .map(|s| StandardInfo {
            name: s.as_str(),
            function: s.function_name(),
            default_signature: s.default_signature(),
            selector: selector_hex(s.default_signature()),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&standards)?);
        return Ok(());
    }

    println!("Standards:");
    for s in &standards {
        println!("- {} {} {}", s.name, s.selector, s.default_signature);
    }
    Ok(())
}

/// Print the canonical form, hash and selector of a function signature.
pub fn selector_command(signature: &str, json: bool) -> Result<()> {
    if !signature.contains('(') {
        return Err(anyhow!("Invalid signature '{signature}': expected name(type, ...)"));
    }
    let info = SelectorInfo {
        signature: signature.to_string(),
        normalized: normalize_signature(signature),
        hash: signature_hash(signature).to_string(),
        selector: selector_hex(signature),
        known: lookup_signature(signature),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("Signature: {}", info.signature);
    println!("Normalized: {}", info.normalized);
    println!("Keccak-256: {}", info.hash);
    println!("Selector: {}", info.selector);
    if let Some(entry) = info.known {
        println!("Known: {} {}", entry.erc, entry.signature);
        if let (Some(hook), Some(magic)) = (entry.receiver_hook, entry.magic_value) {
            println!("Receiver hook: {hook} (must return {magic})");
        }
    }
    Ok(())
}

/// Look for catalogued selectors in deployed bytecode.
pub fn scan_bytecode_command(hex: Option<&str>, file: Option<&str>, json: bool) -> Result<()> {
    let code = match (hex, file) {
        (Some(h), _) => h.to_string(),
        (None, Some(f)) => {
            let path = Path::new(f);
            fs::read_to_string(path).with_context(|| format!("Failed to read bytecode at {}", path.display()))?
        }
        (None, None) => return Err(anyhow!("Either --hex or --file is required")),
    };

    let matches = scan_bytecode(&code);

    if json {
        println!("{}", serde_json::to_string_pretty(&matches)?);
        return Ok(());
    }

    if matches.is_empty() {
        println!("No known selectors found.");
        return Ok(());
    }
    println!("Selectors found:");
    for entry in &matches {
        match entry.receiver_hook {
            Some(hook) => println!("- {} {} {} -> {hook}", entry.selector, entry.erc, entry.signature),
            None => println!("- {} {} {}", entry.selector, entry.erc, entry.signature),
        }
    }
    Ok(())
}
