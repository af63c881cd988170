use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Token-standard entry points the auditor knows how to verify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Standard {
    Erc1155BatchTransfer,
    Erc3643BatchTransfer,
    Erc3643BatchForcedTransfer,
    Erc3643BatchMint,
    Erc3643BatchBurn,
    SetApprovalForAll,
    Erc2612Permit,
    Erc5267Domain,
}

impl Standard {
    pub const ALL: [Standard; 8] = [
        Standard::Erc1155BatchTransfer,
        Standard::Erc3643BatchTransfer,
        Standard::Erc3643BatchForcedTransfer,
        Standard::Erc3643BatchMint,
        Standard::Erc3643BatchBurn,
        Standard::SetApprovalForAll,
        Standard::Erc2612Permit,
        Standard::Erc5267Domain,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Standard::Erc1155BatchTransfer => "erc1155-batch-transfer",
            Standard::Erc3643BatchTransfer => "erc3643-batch-transfer",
            Standard::Erc3643BatchForcedTransfer => "erc3643-batch-forced-transfer",
            Standard::Erc3643BatchMint => "erc3643-batch-mint",
            Standard::Erc3643BatchBurn => "erc3643-batch-burn",
            Standard::SetApprovalForAll => "set-approval-for-all",
            Standard::Erc2612Permit => "erc2612-permit",
            Standard::Erc5267Domain => "erc5267-domain",
        }
    }

    /// Entry-point function name the standard mandates.
    pub fn function_name(&self) -> &'static str {
        match self {
            Standard::Erc1155BatchTransfer => "safeBatchTransferFrom",
            Standard::Erc3643BatchTransfer => "batchTransfer",
            Standard::Erc3643BatchForcedTransfer => "batchForcedTransfer",
            Standard::Erc3643BatchMint => "batchMint",
            Standard::Erc3643BatchBurn => "batchBurn",
            Standard::SetApprovalForAll => "setApprovalForAll",
            Standard::Erc2612Permit => "permit",
            Standard::Erc5267Domain => "eip712Domain",
        }
    }

    /// Canonical signature used when only the standard is given.
    pub fn default_signature(&self) -> &'static str {
        match self {
            Standard::Erc1155BatchTransfer => {
                "safeBatchTransferFrom(address from, address to, uint256[] memory ids, uint256[] memory amounts, bytes memory data)"
            }
            Standard::Erc3643BatchTransfer => {
                "batchTransfer(address[] calldata _toList, uint256[] calldata _amounts)"
            }
            Standard::Erc3643BatchForcedTransfer => {
                "batchForcedTransfer(address[] calldata _fromList, address[] calldata _toList, uint256[] calldata _amounts)"
            }
            Standard::Erc3643BatchMint => {
                "batchMint(address[] calldata _toList, uint256[] calldata _amounts)"
            }
            Standard::Erc3643BatchBurn => {
                "batchBurn(address[] calldata _userAddresses, uint256[] calldata _amounts)"
            }
            Standard::SetApprovalForAll => "setApprovalForAll(address operator, bool approved)",
            Standard::Erc2612Permit => {
                "permit(address owner, address spender, uint256 value, uint256 deadline, uint8 v, bytes32 r, bytes32 s)"
            }
            Standard::Erc5267Domain => "eip712Domain()",
        }
    }

    /// Infer the standard from the function name of a target signature.
    pub fn infer_from_signature(signature: &str) -> Option<Standard> {
        let name = signature.split('(').next().unwrap_or_default().trim();
        Standard::ALL.into_iter().find(|s| s.function_name() == name)
    }

    /// Resolve an explicit standard and/or signature into a concrete pair.
    ///
    /// An explicit signature wins over the preset; an explicit standard wins over inference.
    pub fn resolve(
        standard: Option<&str>,
        signature: Option<&str>,
    ) -> Result<(Standard, String), StandardError> {
        let signature = signature.map(str::trim).filter(|s| !s.is_empty());
        if let Some(sig) = signature {
            if !sig.contains('(') {
                return Err(StandardError::InvalidSignature(sig.to_string()));
            }
        }
        let standard = match standard {
            Some(name) => name.parse::<Standard>()?,
            None => {
                let sig = signature.ok_or(StandardError::MissingTarget)?;
                Standard::infer_from_signature(sig)
                    .ok_or_else(|| StandardError::CannotInfer(sig.to_string()))?
            }
        };
        let signature =
            signature.map(str::to_string).unwrap_or_else(|| standard.default_signature().to_string());
        Ok((standard, signature))
    }
}

impl fmt::Display for Standard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Standard {
    type Err = StandardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Standard::ALL
            .into_iter()
            .find(|std| std.as_str() == wanted)
            .ok_or_else(|| StandardError::Unknown(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StandardError {
    #[error("Unknown standard '{0}' (expected one of: {list})", list = standard_names().join(", "))]
    Unknown(String),
    #[error("Cannot infer a standard from signature '{0}'; pass a standard explicitly")]
    CannotInfer(String),
    #[error("Invalid target signature '{0}': expected name(type name, ...)")]
    InvalidSignature(String),
    #[error("Either a standard or a target signature is required")]
    MissingTarget,
    #[error("Unknown profile '{0}' (expected standard or gas-family)")]
    UnknownProfile(String),
}

fn standard_names() -> Vec<&'static str> {
    Standard::ALL.iter().map(|s| s.as_str()).collect()
}

/// Verifier configuration profile.
///
/// `GasFamily` additionally reports whether a batch transfer delegates to the
/// single-item `safeTransferFrom`. That flag never counts toward the checklist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Profile {
    #[default]
    Standard,
    GasFamily,
}

impl Profile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Standard => "standard",
            Profile::GasFamily => "gas-family",
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Profile {
    type Err = StandardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Profile::Standard),
            "gas-family" | "gas" => Ok(Profile::GasFamily),
            other => Err(StandardError::UnknownProfile(other.to_string())),
        }
    }
}
