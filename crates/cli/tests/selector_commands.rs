use std::fs;

use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn standards_lists_every_preset() {
    assert_cmd::cargo::cargo_bin_cmd!("sol-conform")
        .arg("standards")
        .assert()
        .success()
        .stdout(predicate::str::contains("- erc1155-batch-transfer 0x2eb2c2d6"))
        .stdout(predicate::str::contains("- set-approval-for-all 0xa22cb465"))
        .stdout(predicate::str::contains("- erc2612-permit 0xd505accf"))
        .stdout(predicate::str::contains("- erc5267-domain 0x84b0196e"));

    let output = assert_cmd::cargo::cargo_bin_cmd!("sol-conform")
        .arg("standards")
        .arg("--json")
        .output()
        .expect("run standards --json");
    let standards: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(standards.as_array().map(Vec::len), Some(8));
    assert_eq!(standards[6]["function"], "permit");
}

#[test]
fn selector_reports_hash_and_known_hook() {
    assert_cmd::cargo::cargo_bin_cmd!("sol-conform")
        .arg("selector")
        .arg("safeBatchTransferFrom(address from, address to, uint256[] calldata ids, uint256[] calldata amounts, bytes calldata data)")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Normalized: safeBatchTransferFrom(address,address,uint256[],uint256[],bytes)",
        ))
        .stdout(predicate::str::contains("Selector: 0x2eb2c2d6"))
        .stdout(predicate::str::contains("Receiver hook: onERC1155BatchReceived (must return 0xbc197c81)"));

    let output = assert_cmd::cargo::cargo_bin_cmd!("sol-conform")
        .arg("selector")
        .arg("setApprovalForAll(address,bool)")
        .arg("--json")
        .output()
        .expect("run selector --json");
    let info: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(info["selector"], "0xa22cb465");
    assert_eq!(info["hash"].as_str().map(str::len), Some(66));
    assert!(info["known"].is_null());
}

#[test]
fn selector_rejects_bare_names() {
    assert_cmd::cargo::cargo_bin_cmd!("sol-conform")
        .arg("selector")
        .arg("permit")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid signature 'permit'"));
}

#[test]
fn scan_bytecode_from_hex_and_file() {
    assert_cmd::cargo::cargo_bin_cmd!("sol-conform")
        .arg("scan-bytecode")
        .arg("--hex")
        .arg("0x60806040526004361061004c5760003560e01c80632eb2c2d61461005157")
        .assert()
        .success()
        .stdout(predicate::str::contains("Selectors found:"))
        .stdout(predicate::str::contains("0x2eb2c2d6 ERC-1155"))
        .stdout(predicate::str::contains("-> onERC1155BatchReceived"));

    let dir = tempdir().expect("tempdir");
    let file = dir.path().join("code.hex");
    fs::write(&file, "0x6080604052\n").expect("write bytecode");
    assert_cmd::cargo::cargo_bin_cmd!("sol-conform")
        .arg("scan-bytecode")
        .arg("--file")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("No known selectors found."));
}

#[test]
fn scan_bytecode_requires_an_input() {
    assert_cmd::cargo::cargo_bin_cmd!("sol-conform")
        .arg("scan-bytecode")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Either --hex or --file is required"));

    assert_cmd::cargo::cargo_bin_cmd!("sol-conform")
        .arg("scan-bytecode")
        .arg("--hex")
        .arg("00")
        .arg("--file")
        .arg("code.hex")
        .assert()
        .failure();
}
