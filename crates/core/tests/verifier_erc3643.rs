use conform_core::model::{RequirementReport, Standard};
use conform_core::services::audit::Auditor;
use conform_core::services::verifiers::default_verifier_registry;

fn requirements(standard: Standard, source: &str) -> RequirementReport {
    let registry = default_verifier_registry();
    let auditor = Auditor::from_registry(&registry, standard, standard.default_signature()).expect("auditor");
    let mut reports = auditor.analyze_source(source).expect("implementations");
    assert_eq!(reports.len(), 1);
    reports.remove(0).requirements
}

const BATCH_TRANSFER: &str = r#"
contract Token {
    function batchTransfer(address[] calldata _toList, uint256[] calldata _amounts) external {
        for (uint256 i = 0; i < _toList.length; i++) {
            transfer(_toList[i], _amounts[i]);
        }
    }

    function transfer(address _to, uint256 _amount) public returns (bool) {
        require(msg.sender != address(0) && _to != address(0), "zero address");
        require(!_frozen[_to] && !_frozen[msg.sender], "wallet is frozen");
        require(_balances[msg.sender] >= _amount, "Insufficient Balance");
        require(_tokenIdentityRegistry.isVerified(_to) && _tokenCompliance.canTransfer(msg.sender, _to, _amount), "Transfer not possible");
        _transfer(msg.sender, _to, _amount);
        return true;
    }

    function _transfer(address _from, address _to, uint256 _amount) internal {
        _balances[_from] -= _amount;
        _balances[_to] += _amount;
        emit Transfer(_from, _to, _amount);
    }
}
"#;

#[test]
fn batch_transfer_follows_callees_for_every_check() {
    let report = requirements(Standard::Erc3643BatchTransfer, BATCH_TRANSFER);
    let RequirementReport::Erc3643Transfer(r) = &report else { panic!("unexpected report {report:?}") };
    assert!(r.erc3643_zero_address_check_from);
    assert!(r.erc3643_zero_address_check_to);
    assert!(r.erc3643_frozen_wallet_check);
    assert!(r.erc3643_balance_check);
    assert!(r.erc3643_identity_registry_check);
    assert!(r.erc3643_compliance_check);
    assert!(r.erc3643_event_emission_check);
    assert!(report.all_met());
}

#[test]
fn empty_batch_transfer_meets_nothing() {
    let source = "function batchTransfer(address[] calldata _toList, uint256[] calldata _amounts) external { }";
    let report = requirements(Standard::Erc3643BatchTransfer, source);
    assert!(!report.some_met());
    assert_eq!(report.get("erc3643_balance_check"), Some(false));
}

const FORCED: &str = r#"
contract Token {
    function batchForcedTransfer(address[] calldata _fromList, address[] calldata _toList, uint256[] calldata _amounts) external {
        require(_fromList.length == _toList.length, "length");
        for (uint256 i = 0; i < _fromList.length; i++) {
            require(_fromList[i] != address(0) && _toList[i] != address(0), "zero");
            forcedTransfer(_fromList[i], _toList[i], _amounts[i]);
        }
    }

    function forcedTransfer(address _from, address _to, uint256 _amount) public returns (bool) {
        uint256 freeBalance = balanceOf(_from) - frozenTokens[_from];
        if (_amount > freeBalance) {
            uint256 tokensToUnfreeze = _amount - freeBalance;
            require(frozenTokens[_from] >= tokensToUnfreeze, "insufficient frozen");
            frozenTokens[_from] = frozenTokens[_from] - tokensToUnfreeze;
            emit TokensUnfrozen(_from, tokensToUnfreeze);
        }
        if (tokenIdentityRegistry.isVerified(_to)) {
            _transfer(_from, _to, _amount);
            tokenCompliance.transferred(_from, _to, _amount);
            return true;
        }
        revert("Transfer not possible");
    }

    function _transfer(address _from, address _to, uint256 _amount) internal {
        emit Transfer(_from, _to, _amount);
    }
}
"#;

#[test]
fn forced_transfer_recognizes_partial_unfreeze() {
    let report = requirements(Standard::Erc3643BatchForcedTransfer, FORCED);
    let RequirementReport::Erc3643ForcedTransfer(r) = &report else { panic!("unexpected report {report:?}") };
    assert!(r.length_matching_check);
    assert!(r.zero_address_check_from);
    assert!(r.zero_address_check_to);
    assert!(r.frozen_tokens_unfreeze_check);
    assert!(r.frozen_tokens_balance_check);
    assert!(r.identity_registry_check);
    assert!(r.compliance_check);
    assert!(r.unfreeze_event_check);
    assert!(r.transfer_event_check);
}

#[test]
fn unfreeze_needs_branch_and_decrement_in_one_body() {
    let source = r#"
    function batchForcedTransfer(address[] calldata _fromList, address[] calldata _toList, uint256[] calldata _amounts) external {
        if (_amount > freeBalance) { _unfreeze(); }
    }
    function _unfreeze() internal {
        frozenTokens[_from] = frozenTokens[_from] - tokensToUnfreeze;
    }
    "#;
    let report = requirements(Standard::Erc3643BatchForcedTransfer, source);
    assert_eq!(report.get("frozen_tokens_unfreeze_check"), Some(false));
}

#[test]
fn batch_mint_checks() {
    let source = r#"
    function batchMint(address[] calldata _toList, uint256[] calldata _amounts) external {
        require(_toList.length == _amounts.length, "length");
        for (uint256 i = 0; i < _toList.length; i++) {
            mint(_toList[i], _amounts[i]);
        }
    }
    function mint(address _to, uint256 _amount) public {
        require(tokenIdentityRegistry.isVerified(_to), "Identity is not verified.");
        require(tokenCompliance.canTransfer(msg.sender, _to, _amount), "Compliance not followed");
        _mint(_to, _amount);
        tokenCompliance.created(_to, _amount);
    }
    function _mint(address _userAddress, uint256 _amount) internal {
        require(_userAddress != address(0), "mint to zero");
        _balances[_userAddress] += _amount;
        emit Transfer(address(0), _userAddress, _amount);
    }
    "#;
    let report = requirements(Standard::Erc3643BatchMint, source);
    let RequirementReport::Erc3643Mint(r) = &report else { panic!("unexpected report {report:?}") };
    assert!(r.length_matching_check);
    assert!(r.zero_address_check);
    assert!(r.identity_registry_check);
    assert!(r.compliance_check);
    assert!(r.mint_event_check);
    assert!(r.compliance_created_check);
}

#[test]
fn batch_burn_checks() {
    let source = r#"
    function batchBurn(address[] calldata _userAddresses, uint256[] calldata _amounts) external {
        require(_userAddresses.length == _amounts.length, "length");
        for (uint256 i = 0; i < _userAddresses.length; i++) {
            burn(_userAddresses[i], _amounts[i]);
        }
    }
    function burn(address _userAddress, uint256 _amount) public {
        require(_balances[_userAddress] >= _amount, "cannot burn more than balance");
        uint256 freeBalance = _balances[_userAddress] - frozenTokens[_userAddress];
        if (_amount > freeBalance) {
            uint256 tokensToUnfreeze = _amount - freeBalance;
            require(frozenTokens[_userAddress] >= tokensToUnfreeze, "frozen");
            frozenTokens[_userAddress] = frozenTokens[_userAddress] - tokensToUnfreeze;
            emit TokensUnfrozen(_userAddress, tokensToUnfreeze);
        }
        _burn(_userAddress, _amount);
        tokenCompliance.destroyed(_userAddress, _amount);
    }
    function _burn(address _userAddress, uint256 _amount) internal {
        require(_userAddress != address(0), "burn from zero");
        emit Transfer(_userAddress, address(0), _amount);
    }
    "#;
    let report = requirements(Standard::Erc3643BatchBurn, source);
    let RequirementReport::Erc3643Burn(r) = &report else { panic!("unexpected report {report:?}") };
    assert!(r.length_matching_check);
    assert!(r.zero_address_check);
    assert!(r.balance_check);
    assert!(r.frozen_unfreeze_check);
    assert!(r.frozen_balance_check);
    assert!(r.unfreeze_event_check);
    assert!(r.burn_event_check);
    assert!(r.compliance_destroyed_check);
    assert!(report.all_met());
}
