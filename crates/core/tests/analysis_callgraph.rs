use conform_core::analysis::{extract_functions, resolve_calls, CallClosure};
use conform_core::model::FunctionRecord;

fn find<'a>(functions: &'a [FunctionRecord], name: &str) -> &'a FunctionRecord {
    functions.iter().find(|f| f.name == name).expect("function present")
}

fn names(closure: &CallClosure) -> Vec<&str> {
    closure.callees().iter().map(|f| f.name.as_str()).collect()
}

#[test]
fn collects_transitive_callees_depth_first() {
    let source = r#"
        function entry() public { _check(); _move(); }
        function _check() internal { _guard(); }
        function _guard() internal { require(ok); }
        function _move() internal { balances[a] -= 1; }
    "#;
    let functions = extract_functions(source);
    let closure = resolve_calls(&find(&functions, "entry").body, &functions);
    assert_eq!(names(&closure), vec!["_check", "_guard", "_move"]);
}

#[test]
fn mutual_recursion_terminates_with_each_name_once() {
    let source = r#"
        function a() public { b(); }
        function b() internal { a(); }
    "#;
    let functions = extract_functions(source);
    let closure = resolve_calls(&find(&functions, "a").body, &functions);
    assert_eq!(names(&closure), vec!["b", "a"]);
}

#[test]
fn self_call_only_is_reported_as_self_recursive() {
    let source = "function f() public { f(); }";
    let functions = extract_functions(source);
    let closure = resolve_calls(&functions[0].body, &functions);
    assert_eq!(closure, CallClosure::SelfRecursive);
    assert!(closure.callees().is_empty());
}

#[test]
fn keywords_builtins_events_and_member_calls_are_not_callees() {
    let source = r#"
        event Moved(address to);
        function transfer(address to) public {
            require(to != address(0));
            bytes32 h = keccak256(abi.encode(to));
            emit Moved(to);
            token.helper(to);
        }
        function helper(address to) internal {}
        function Moved(address to) internal {}
    "#;
    let functions = extract_functions(source);
    let closure = resolve_calls(&find(&functions, "transfer").body, &functions);
    assert_eq!(closure, CallClosure::NoCalls);
}

#[test]
fn is_contract_helpers_are_never_callees() {
    let source = r#"
        function transfer(address to) public {
            if (isContract(to)) { _notify(to); }
            if (ISCONTRACT(to)) { }
        }
        function isContract(address account) internal view returns (bool) {
            uint256 size;
            assembly { size := extcodesize(account) }
            return size > 0;
        }
        function _notify(address to) internal {}
    "#;
    let functions = extract_functions(source);
    let closure = resolve_calls(&find(&functions, "transfer").body, &functions);
    assert_eq!(names(&closure), vec!["_notify"]);
}
