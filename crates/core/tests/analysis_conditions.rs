use conform_core::analysis::{harvest_conditions, if_revert_conditions, length_aliases, require_conditions};
use conform_core::model::{CodeUnit, ConditionKind, SourceLabel};

#[test]
fn require_arguments_are_whitespace_collapsed() {
    let code = "require(\n    from == msg.sender,\n    \"not owner\"\n);\nrequire(ids.length == amounts.length);";
    assert_eq!(
        require_conditions(code),
        vec!["from == msg.sender, \"not owner\"".to_string(), "ids.length == amounts.length".to_string()]
    );
}

#[test]
fn require_nesting_past_the_cap_is_skipped() {
    assert_eq!(require_conditions("require(f(g(x)));"), vec!["f(g(x))".to_string()]);
    assert!(require_conditions("require(f(g(h(x))));").is_empty());
}

#[test]
fn if_guards_count_only_when_they_revert() {
    let code = r#"
        if (to == address(0)) revert ZeroAddress();
        if (amount > limit) {
            revert("too much");
        }
        if (paused) { return; }
        else if (x) revert();
    "#;
    assert_eq!(
        if_revert_conditions(code),
        vec!["to == address(0)".to_string(), "amount > limit".to_string(), "x".to_string()]
    );
}

#[test]
fn harvest_tags_conditions_with_their_source() {
    let main = "function t() public { if (a != b) revert(); require(c); _inner(); }";
    let inner = "function _inner() internal { require(d); }";
    let units = [CodeUnit::main(main), CodeUnit::internal(inner, "_inner")];
    let harvested = harvest_conditions(&units);

    let seen: Vec<(&str, ConditionKind, &SourceLabel)> =
        harvested.iter().map(|c| (c.content.as_str(), c.kind, &c.source)).collect();
    let inner_label = SourceLabel::Internal("_inner".to_string());
    assert_eq!(
        seen,
        vec![
            ("c", ConditionKind::Require, &SourceLabel::Main),
            ("a != b", ConditionKind::IfRevert, &SourceLabel::Main),
            ("d", ConditionKind::Require, &inner_label),
        ]
    );
    assert_eq!(SourceLabel::Main.to_string(), "main function");
    assert_eq!(inner_label.to_string(), "internal function _inner");
}

#[test]
fn length_aliases_are_collected_across_units() {
    let main = "uint256 n = ids.length; uint m = ids.length;";
    let inner = "uint256 n = ids.length; uint256 k = amounts.length;";
    let units = [CodeUnit::main(main), CodeUnit::internal(inner, "_check")];
    assert_eq!(length_aliases(&units, "ids"), vec!["n".to_string(), "m".to_string()]);
}
