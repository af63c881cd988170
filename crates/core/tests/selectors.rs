use conform_core::analysis::selector_hex;
use conform_core::selectors::{lookup, lookup_signature, scan_bytecode, CATALOG};

#[test]
fn catalog_selectors_match_their_signatures() {
    for entry in CATALOG {
        assert_eq!(selector_hex(entry.signature), entry.selector, "{}", entry.signature);
    }
}

#[test]
fn lookup_accepts_prefixed_bare_and_mixed_case() {
    let entry = lookup("0x2eb2c2d6").expect("batch transfer");
    assert_eq!(entry.erc, "ERC-1155");
    assert_eq!(entry.receiver_hook, Some("onERC1155BatchReceived"));
    assert_eq!(entry.magic_value, Some("0xbc197c81"));
    assert_eq!(lookup("2EB2C2D6"), Some(entry));
    assert!(lookup("0xdeadbeef").is_none());
}

#[test]
fn lookup_signature_normalizes_first() {
    let entry = lookup_signature(
        "safeTransferFrom(address from, address to, uint256 id, uint256 amount, bytes calldata data)",
    )
    .expect("single transfer");
    assert_eq!(entry.selector, "0xf242432a");
    assert_eq!(entry.magic_value, Some("0xf23a6e61"));
}

#[test]
fn bytecode_scan_reports_embedded_selectors() {
    let bytecode = "0x6080604052348015600f57600080fd5b5060043610603c5760003560e01c80632eb2c2d614604157806388b88d4fde1460";
    let found: Vec<&str> = scan_bytecode(bytecode).iter().map(|e| e.selector).collect();
    assert_eq!(found, vec!["0x2eb2c2d6", "0xb88d4fde"]);
    assert!(scan_bytecode("").is_empty());
    assert!(scan_bytecode("0x").is_empty());
}
