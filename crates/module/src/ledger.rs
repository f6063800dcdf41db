//! The ledger capability the engine runs against.
//!
//! The engine never owns account storage. It reads accounts through
//! [`Ledger`] and hands every mutation back as one [`Transaction`], which the
//! ledger applies all-or-nothing.

use auction_types::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Per-account mutation counter used for compare-and-swap writes.
pub type Version = u64;

/// Owner of plain wallets that no program controls. A signature from this
/// identity authorizes nothing.
pub const SYSTEM_OWNER: Address = [0u8; 32];

/// A ledger account.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub lamports: u64,
    pub owner: Address,
    pub data: Vec<u8>,
    /// Incremented by every committed transaction that touches the account
    pub version: Version,
}

/// One step of a transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    /// Move lamports. A missing destination is created as a system wallet.
    Transfer {
        from: Address,
        to: Address,
        amount: u64,
    },
    /// Allocate a new account. Fails if anything already lives there.
    CreateAccount {
        address: Address,
        owner: Address,
        data: Vec<u8>,
    },
    /// Replace an account's data if its committed version still matches.
    WriteData {
        address: Address,
        expected_version: Version,
        data: Vec<u8>,
    },
}

/// An atomic batch of operations issued on behalf of a program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    /// Program whose accounts the transaction may debit, create and write
    pub program: Address,
    /// Accounts that authorized the transaction
    pub signers: Vec<Address>,
    pub operations: Vec<Operation>,
    /// Lines recorded alongside the committed transaction
    pub logs: Vec<String>,
}

impl Transaction {
    pub fn new(program: Address, signer: Address) -> Self {
        Self {
            program,
            signers: vec![signer],
            operations: Vec::new(),
            logs: Vec::new(),
        }
    }

    pub fn transfer(&mut self, from: Address, to: Address, amount: u64) -> &mut Self {
        self.operations.push(Operation::Transfer { from, to, amount });
        self
    }

    pub fn create_account(&mut self, address: Address, owner: Address, data: Vec<u8>) -> &mut Self {
        self.operations.push(Operation::CreateAccount {
            address,
            owner,
            data,
        });
        self
    }

    pub fn write_data(
        &mut self,
        address: Address,
        expected_version: Version,
        data: Vec<u8>,
    ) -> &mut Self {
        self.operations.push(Operation::WriteData {
            address,
            expected_version,
            data,
        });
        self
    }

    pub fn log(&mut self, line: impl Into<String>) -> &mut Self {
        self.logs.push(line.into());
        self
    }

    pub fn is_signer(&self, address: &Address) -> bool {
        self.signers.contains(address)
    }
}

/// Result of a committed transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Sequence number assigned at commit
    pub slot: u64,
}

/// Errors reported by the ledger. Any error means nothing was applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Account already exists: {}", hex::encode(.0))]
    AccountExists(Address),

    #[error("Account not found: {}", hex::encode(.0))]
    AccountNotFound(Address),

    #[error("Insufficient funds in {}: need {required}, have {available}", hex::encode(.address))]
    InsufficientFunds {
        address: Address,
        required: u64,
        available: u64,
    },

    #[error("Version conflict on {}: expected {expected}, found {actual}", hex::encode(.address))]
    VersionConflict {
        address: Address,
        expected: Version,
        actual: Version,
    },

    #[error("Missing signature or program authority for {}", hex::encode(.0))]
    MissingAuthority(Address),

    #[error("Account {} is not owned by the invoking program", hex::encode(.0))]
    IllegalOwner(Address),

    #[error("Balance overflow on {}", hex::encode(.0))]
    BalanceOverflow(Address),
}

/// Account storage with atomic multi-operation transactions.
pub trait Ledger {
    /// Current committed state of an account.
    fn account(&self, address: &Address) -> Option<Account>;

    /// All accounts owned by `owner`, in no particular order.
    fn accounts_owned_by(&self, owner: &Address) -> Vec<(Address, Account)>;

    /// Apply every operation or none of them.
    fn submit_transaction(&mut self, tx: Transaction) -> Result<Receipt, LedgerError>;

    fn balance(&self, address: &Address) -> u64 {
        self.account(address).map(|a| a.lamports).unwrap_or(0)
    }

    fn exists(&self, address: &Address) -> bool {
        self.account(address).is_some()
    }
}
