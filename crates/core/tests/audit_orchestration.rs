use std::fs;

use conform_core::model::{Profile, Standard};
use conform_core::services::audit::{Auditor, FileOutcome, NO_VALID_IMPLEMENTATIONS};
use conform_core::services::sources::{DirectorySource, MemorySource};
use conform_core::services::verifiers::default_verifier_registry;
use tempfile::tempdir;

const BATCH_SIG: &str =
    "safeBatchTransferFrom(address from, address to, uint256[] memory ids, uint256[] memory amounts, bytes memory data)";

const COMPLIANT_APPROVAL: &str = r#"
function setApprovalForAll(address operator, bool approved) public {
    require(msg.sender != operator);
    emit ApprovalForAll(msg.sender, operator, approved);
}
"#;

const PARTIAL_APPROVAL: &str = r#"
function setApprovalForAll(address operator, bool approved) public {
    emit ApprovalForAll(msg.sender, operator, approved);
}
"#;

#[test]
fn missing_target_is_a_per_file_error_document() {
    let registry = default_verifier_registry();
    let auditor = Auditor::from_registry(&registry, Standard::Erc1155BatchTransfer, BATCH_SIG).expect("auditor");
    let err = auditor.analyze_source("contract Empty { function other() public {} }").unwrap_err();
    assert_eq!(err, "safeBatchTransferFrom function not found");

    let provider = MemorySource::new().with_file("Empty.sol", "contract Empty {}");
    let batch = auditor.audit(&provider, false).expect("batch");
    let json: serde_json::Value = serde_json::from_str(&batch.to_json().expect("json")).expect("parse");
    assert_eq!(json[0]["error"], "safeBatchTransferFrom function not found");
    assert_eq!(json[0]["file"], "Empty.sol");
}

#[test]
fn self_recursive_and_assembly_targets_are_skipped() {
    let registry = default_verifier_registry();
    let auditor =
        Auditor::from_registry(&registry, Standard::SetApprovalForAll, "setApprovalForAll(address operator, bool approved)")
            .expect("auditor");

    let recursive = "function setApprovalForAll(address operator, bool approved) public { setApprovalForAll(operator, approved); }";
    assert_eq!(auditor.analyze_source(recursive).unwrap_err(), NO_VALID_IMPLEMENTATIONS);

    let assembly = r#"
    function setApprovalForAll(address operator, bool approved) public {
        assembly { sstore(0, approved) }
        emit ApprovalForAll(msg.sender, operator, approved);
    }
    "#;
    assert_eq!(auditor.analyze_source(assembly).unwrap_err(), NO_VALID_IMPLEMENTATIONS);

    let callee_assembly = r#"
    function setApprovalForAll(address operator, bool approved) public { _store(operator, approved); }
    function _store(address operator, bool approved) internal { assembly ("memory-safe") { sstore(operator, approved) } }
    "#;
    assert_eq!(auditor.analyze_source(callee_assembly).unwrap_err(), NO_VALID_IMPLEMENTATIONS);
}

#[test]
fn skipped_overload_does_not_hide_a_clean_one() {
    let registry = default_verifier_registry();
    let auditor =
        Auditor::from_registry(&registry, Standard::SetApprovalForAll, "setApprovalForAll(address,bool)").expect("auditor");
    let source = format!(
        "{COMPLIANT_APPROVAL}\ncontract Other {{ function setApprovalForAll(address operator, bool approved) public {{ assembly {{ }} }} }}"
    );
    let reports = auditor.analyze_source(&source).expect("implementations");
    assert_eq!(reports.len(), 1);
    assert!(reports[0].all_requirements_met);
}

#[test]
fn batch_keeps_one_document_per_file_and_rolls_up() {
    let registry = default_verifier_registry();
    let auditor =
        Auditor::from_registry(&registry, Standard::SetApprovalForAll, "setApprovalForAll(address,bool)").expect("auditor");
    let provider = MemorySource::new()
        .with_file("a/Compliant.sol", COMPLIANT_APPROVAL)
        .with_file("b/Partial.sol", PARTIAL_APPROVAL)
        .with_file("c/Missing.sol", "contract Nothing {}")
        .with_unreadable("d/Broken.sol", "stream did not contain valid UTF-8");

    for parallel in [false, true] {
        let batch = auditor.audit(&provider, parallel).expect("batch");
        let files: Vec<&str> = batch.outcomes().iter().map(|o| o.file()).collect();
        assert_eq!(files, vec!["a/Compliant.sol", "b/Partial.sol", "c/Missing.sol", "d/Broken.sol"]);

        let s = batch.summary;
        assert_eq!(s.files, 4);
        assert_eq!(s.analyzed, 2);
        assert_eq!(s.failed, 2);
        assert_eq!(s.implementations, 2);
        assert_eq!(s.fully_compliant, 1);
        assert_eq!(s.partially_compliant, 2);

        assert_eq!(
            batch.files[3].outcome.error(),
            Some("Error processing file: stream did not contain valid UTF-8")
        );
        assert!(batch.files[3].content_hash.is_none());
        assert_eq!(batch.files[0].content_hash.as_deref().map(str::len), Some(64));
    }
}

#[test]
fn gas_family_profile_marks_the_file() {
    let source = r#"
    function safeBatchTransferFrom(address from, address to, uint256[] memory ids, uint256[] memory amounts, bytes memory data) public {
        for (uint256 i = 0; i < ids.length; ++i) { safeTransferFrom(from, to, ids[i], amounts[i], data); }
    }
    function safeTransferFrom(address from, address to, uint256 id, uint256 amount, bytes memory data) public {}
    "#;
    let registry = default_verifier_registry();
    let auditor = Auditor::from_registry(&registry, Standard::Erc1155BatchTransfer, BATCH_SIG)
        .expect("auditor")
        .with_profile(Profile::GasFamily);
    let batch = auditor.audit(&MemorySource::new().with_file("Gas.sol", source), false).expect("batch");
    match &batch.files[0].outcome {
        FileOutcome::Report { gas_error_file, .. } => assert_eq!(gas_error_file.as_deref(), Some("Gas.sol")),
        other => panic!("unexpected outcome {other:?}"),
    }
    let json: serde_json::Value = serde_json::from_str(&batch.to_json().expect("json")).expect("parse");
    assert_eq!(json[0]["gas_error_file"], "Gas.sol");
    assert_eq!(json[0]["all_implementations"][0]["requirements"]["gas_family_errors"], true);
}

#[test]
fn report_json_shape_and_file_output() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("Approve.sol"), COMPLIANT_APPROVAL).expect("write source");

    let registry = default_verifier_registry();
    let auditor =
        Auditor::from_registry(&registry, Standard::SetApprovalForAll, "setApprovalForAll(address,bool)").expect("auditor");
    let batch = auditor.audit(&DirectorySource::new(dir.path()), false).expect("batch");

    let out = dir.path().join("report.json");
    batch.write_json(&out).expect("write report");
    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).expect("read")).expect("parse");

    let doc = &json[0];
    assert!(doc["file"].as_str().expect("file").ends_with("Approve.sol"));
    assert_eq!(doc["summary"]["total_implementations"], 1);
    let implementation = &doc["all_implementations"][0];
    assert_eq!(implementation["function"], "setApprovalForAll");
    assert_eq!(implementation["parameters"]["operator"], "address");
    assert_eq!(implementation["parameters"]["approved"], "bool");
    assert_eq!(implementation["requirements"]["self_approval_check"], true);
    assert_eq!(implementation["all_requirements_met"], true);
    assert!(implementation["implementation_location"]["end"].as_u64() > implementation["implementation_location"]["start"].as_u64());
    assert!(doc.get("gas_error_file").is_none());
}

#[test]
fn auditor_rejects_signatures_without_a_parameter_list() {
    let registry = default_verifier_registry();
    assert!(Auditor::from_registry(&registry, Standard::SetApprovalForAll, "setApprovalForAll").is_err());
}

#[test]
fn registry_covers_every_standard() {
    use conform_core::services::audit::AuditError;
    use conform_core::services::verifiers::VerifierRegistry;

    let registry = default_verifier_registry();
    let names = registry.names();
    assert_eq!(names.len(), Standard::ALL.len());
    assert!(names.windows(2).all(|w| w[0] <= w[1]));
    for standard in Standard::ALL {
        assert_eq!(registry.get(standard).map(|v| v.standard()), Some(standard));
    }

    let empty = VerifierRegistry::new();
    let err = Auditor::from_registry(&empty, Standard::Erc2612Permit, Standard::Erc2612Permit.default_signature())
        .err()
        .expect("no verifier registered");
    assert!(matches!(err, AuditError::UnknownStandard(ref name) if name == "erc2612-permit"));
}
