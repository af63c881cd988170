//! Catalog of transfer-style entry points that hand control to the recipient,
//! and a scan for their selectors in deployed bytecode.

use serde::Serialize;

use crate::analysis::selector_hex;

/// One known entry point, keyed by its 4-byte selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SelectorEntry {
    pub selector: &'static str,
    pub erc: &'static str,
    pub signature: &'static str,
    /// Callback the token invokes on the recipient, if the standard defines one.
    pub receiver_hook: Option<&'static str>,
    /// Value the hook must return to accept the call.
    pub magic_value: Option<&'static str>,
}

const fn entry(
    selector: &'static str,
    erc: &'static str,
    signature: &'static str,
    receiver_hook: Option<&'static str>,
    magic_value: Option<&'static str>,
) -> SelectorEntry {
    SelectorEntry { selector, erc, signature, receiver_hook, magic_value }
}

pub const CATALOG: &[SelectorEntry] = &[
    entry(
        "0xf242432a",
        "ERC-1155",
        "safeTransferFrom(address,address,uint256,uint256,bytes)",
        Some("onERC1155Received"),
        Some("0xf23a6e61"),
    ),
    entry(
        "0x2eb2c2d6",
        "ERC-1155",
        "safeBatchTransferFrom(address,address,uint256[],uint256[],bytes)",
        Some("onERC1155BatchReceived"),
        Some("0xbc197c81"),
    ),
    entry(
        "0xb88d4fde",
        "ERC-721",
        "safeTransferFrom(address,address,uint256,bytes)",
        Some("onERC721Received"),
        Some("0x150b7a02"),
    ),
    entry("0xbe45fd62", "ERC-223", "transfer(address,uint256,bytes)", Some("tokenFallback"), None),
    entry("0x9bd9bbc6", "ERC-777", "send(address,uint256,bytes)", Some("tokensReceived"), None),
    entry(
        "0x62ad1b83",
        "ERC-777",
        "operatorSend(address,address,uint256,bytes,bytes)",
        Some("tokensReceived"),
        None,
    ),
    entry("0x1296ee62", "ERC-1363", "transferAndCall(address,uint256)", Some("onTransferReceived"), None),
    entry(
        "0x4000aea0",
        "ERC-1363",
        "transferAndCall(address,uint256,bytes)",
        Some("onTransferReceived"),
        None,
    ),
    entry(
        "0xd8fbe994",
        "ERC-1363",
        "transferFromAndCall(address,address,uint256)",
        Some("onTransferReceived"),
        None,
    ),
    entry(
        "0xc1d34b89",
        "ERC-1363",
        "transferFromAndCall(address,address,uint256,bytes)",
        Some("onTransferReceived"),
        None,
    ),
    entry("0x3177029f", "ERC-1363", "approveAndCall(address,uint256)", Some("onApprovalReceived"), None),
    entry(
        "0xcae9ca51",
        "ERC-1363",
        "approveAndCall(address,uint256,bytes)",
        Some("onApprovalReceived"),
        None,
    ),
];

/// Catalog entry for a selector (`0x`-prefixed or bare, any case).
pub fn lookup(selector: &str) -> Option<&'static SelectorEntry> {
    let wanted = bare_hex(selector);
    CATALOG.iter().find(|e| bare_hex(e.selector) == wanted)
}

/// Catalog entry whose signature normalizes to the same selector as `signature`.
pub fn lookup_signature(signature: &str) -> Option<&'static SelectorEntry> {
    lookup(&selector_hex(signature))
}

/// Every catalog entry whose selector occurs in `bytecode`.
///
/// This is a plain substring scan, so it can report selectors that only occur
/// as data. Empty bytecode matches nothing.
pub fn scan_bytecode(bytecode: &str) -> Vec<&'static SelectorEntry> {
    let code = bare_hex(bytecode.trim());
    if code.is_empty() {
        return Vec::new();
    }
    CATALOG.iter().filter(|e| code.contains(&bare_hex(e.selector))).collect()
}

fn bare_hex(text: &str) -> String {
    let text = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")).unwrap_or(text);
    text.to_ascii_lowercase()
}
