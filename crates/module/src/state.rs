//! In-memory ledger.
//!
//! A real deployment talks to a chain through the [`Ledger`] trait; this
//! implementation keeps every account in a map and is what the mock chain
//! and the test suites run against.

use crate::ledger::{Account, Ledger, LedgerError, Operation, Receipt, Transaction, SYSTEM_OWNER};
use auction_types::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Log lines recorded by one committed transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionLog {
    pub slot: u64,
    pub lines: Vec<String>,
}

/// Ledger state held entirely in memory.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    /// Last committed slot
    slot: u64,

    /// All accounts by address
    accounts: HashMap<Address, Account>,

    /// Logs of committed transactions, oldest first
    logs: Vec<TransactionLog>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slot(&self) -> u64 {
        self.slot
    }

    pub fn logs(&self) -> &[TransactionLog] {
        &self.logs
    }

    /// Credit a system wallet, creating it if needed. Returns the new balance.
    pub fn airdrop(&mut self, address: Address, lamports: u64) -> Result<u64, LedgerError> {
        let account = self.accounts.entry(address).or_insert_with(|| Account {
            owner: SYSTEM_OWNER,
            ..Default::default()
        });
        account.lamports = account
            .lamports
            .checked_add(lamports)
            .ok_or(LedgerError::BalanceOverflow(address))?;
        account.version += 1;
        Ok(account.lamports)
    }

    /// Open a funded wallet controlled by `owner` rather than by its own key.
    pub fn create_owned_wallet(
        &mut self,
        address: Address,
        owner: Address,
        lamports: u64,
    ) -> Result<(), LedgerError> {
        if self.accounts.contains_key(&address) {
            return Err(LedgerError::AccountExists(address));
        }
        self.accounts.insert(
            address,
            Account {
                lamports,
                owner,
                data: Vec::new(),
                version: 1,
            },
        );
        Ok(())
    }

    /// Copy an account into the staging map on first touch.
    fn staged<'a>(
        &self,
        staged: &'a mut HashMap<Address, Account>,
        address: &Address,
    ) -> Option<&'a mut Account> {
        if !staged.contains_key(address) {
            let current = self.accounts.get(address)?.clone();
            staged.insert(*address, current);
        }
        staged.get_mut(address)
    }

    fn exists_staged(&self, staged: &HashMap<Address, Account>, address: &Address) -> bool {
        staged.contains_key(address) || self.accounts.contains_key(address)
    }

    fn stage(
        &self,
        staged: &mut HashMap<Address, Account>,
        tx: &Transaction,
        op: &Operation,
    ) -> Result<(), LedgerError> {
        match op {
            Operation::Transfer { from, to, amount } => {
                let source = self.staged(staged, from).ok_or(LedgerError::InsufficientFunds {
                    address: *from,
                    required: *amount,
                    available: 0,
                })?;

                // System wallets answer only to their own key
                let owner_signed = source.owner != SYSTEM_OWNER && tx.is_signer(&source.owner);
                let authorized =
                    tx.is_signer(from) || source.owner == tx.program || owner_signed;
                if !authorized {
                    return Err(LedgerError::MissingAuthority(*from));
                }
                if source.lamports < *amount {
                    return Err(LedgerError::InsufficientFunds {
                        address: *from,
                        required: *amount,
                        available: source.lamports,
                    });
                }
                source.lamports -= amount;

                if !self.exists_staged(staged, to) {
                    staged.insert(
                        *to,
                        Account {
                            owner: SYSTEM_OWNER,
                            ..Default::default()
                        },
                    );
                }
                let destination = self
                    .staged(staged, to)
                    .ok_or(LedgerError::AccountNotFound(*to))?;
                destination.lamports = destination
                    .lamports
                    .checked_add(*amount)
                    .ok_or(LedgerError::BalanceOverflow(*to))?;
            }

            Operation::CreateAccount {
                address,
                owner,
                data,
            } => {
                if self.exists_staged(staged, address) {
                    return Err(LedgerError::AccountExists(*address));
                }
                if *owner != tx.program {
                    return Err(LedgerError::IllegalOwner(*address));
                }
                staged.insert(
                    *address,
                    Account {
                        lamports: 0,
                        owner: *owner,
                        data: data.clone(),
                        version: 0,
                    },
                );
            }

            Operation::WriteData {
                address,
                expected_version,
                data,
            } => {
                let committed = self
                    .accounts
                    .get(address)
                    .ok_or(LedgerError::AccountNotFound(*address))?;
                if committed.version != *expected_version {
                    return Err(LedgerError::VersionConflict {
                        address: *address,
                        expected: *expected_version,
                        actual: committed.version,
                    });
                }

                let account = self
                    .staged(staged, address)
                    .ok_or(LedgerError::AccountNotFound(*address))?;
                if account.owner != tx.program {
                    return Err(LedgerError::IllegalOwner(*address));
                }
                account.data = data.clone();
            }
        }
        Ok(())
    }
}

impl Ledger for InMemoryLedger {
    fn account(&self, address: &Address) -> Option<Account> {
        self.accounts.get(address).cloned()
    }

    fn accounts_owned_by(&self, owner: &Address) -> Vec<(Address, Account)> {
        let mut owned: Vec<(Address, Account)> = self
            .accounts
            .iter()
            .filter(|(_, account)| account.owner == *owner)
            .map(|(address, account)| (*address, account.clone()))
            .collect();
        owned.sort_by(|a, b| a.0.cmp(&b.0));
        owned
    }

    fn submit_transaction(&mut self, tx: Transaction) -> Result<Receipt, LedgerError> {
        let mut staged = HashMap::new();
        for op in &tx.operations {
            self.stage(&mut staged, &tx, op)?;
        }

        self.slot += 1;
        let touched = staged.len();
        for (address, mut account) in staged {
            account.version = self.accounts.get(&address).map(|a| a.version).unwrap_or(0) + 1;
            self.accounts.insert(address, account);
        }
        self.logs.push(TransactionLog {
            slot: self.slot,
            lines: tx.logs,
        });

        debug!(slot = self.slot, touched, "transaction committed");
        Ok(Receipt { slot: self.slot })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROGRAM: Address = [9u8; 32];
    const ALICE: Address = [1u8; 32];
    const BOB: Address = [2u8; 32];

    #[test]
    fn test_airdrop_operations() {
        let mut ledger = InMemoryLedger::new();
        assert_eq!(ledger.balance(&ALICE), 0);
        assert!(!ledger.exists(&ALICE));

        assert_eq!(ledger.airdrop(ALICE, 100).unwrap(), 100);
        assert_eq!(ledger.airdrop(ALICE, 50).unwrap(), 150);

        let account = ledger.account(&ALICE).unwrap();
        assert_eq!(account.owner, SYSTEM_OWNER);
        assert_eq!(account.version, 2);
    }

    #[test]
    fn test_transfer_creates_destination() {
        let mut ledger = InMemoryLedger::new();
        ledger.airdrop(ALICE, 100).unwrap();

        let mut tx = Transaction::new(PROGRAM, ALICE);
        tx.transfer(ALICE, BOB, 40);
        let receipt = ledger.submit_transaction(tx).unwrap();

        assert_eq!(receipt.slot, 1);
        assert_eq!(ledger.balance(&ALICE), 60);
        assert_eq!(ledger.balance(&BOB), 40);
        assert_eq!(ledger.account(&BOB).unwrap().owner, SYSTEM_OWNER);
    }

    #[test]
    fn test_failed_transaction_applies_nothing() {
        let mut ledger = InMemoryLedger::new();
        ledger.airdrop(ALICE, 100).unwrap();

        let mut tx = Transaction::new(PROGRAM, ALICE);
        tx.transfer(ALICE, BOB, 60).transfer(ALICE, BOB, 60);
        let result = ledger.submit_transaction(tx);

        assert!(matches!(
            result,
            Err(LedgerError::InsufficientFunds {
                required: 60,
                available: 40,
                ..
            })
        ));
        assert_eq!(ledger.balance(&ALICE), 100);
        assert!(!ledger.exists(&BOB));
        assert_eq!(ledger.slot(), 0);
        assert!(ledger.logs().is_empty());
    }

    #[test]
    fn test_transfer_requires_authority() {
        let mut ledger = InMemoryLedger::new();
        ledger.airdrop(ALICE, 100).unwrap();

        let tx = {
            let mut tx = Transaction::new(PROGRAM, BOB);
            tx.transfer(ALICE, BOB, 10);
            tx
        };
        assert_eq!(
            ledger.submit_transaction(tx),
            Err(LedgerError::MissingAuthority(ALICE))
        );
    }

    #[test]
    fn test_system_owner_signature_moves_nothing() {
        let mut ledger = InMemoryLedger::new();
        ledger.airdrop(ALICE, 100).unwrap();

        let mut tx = Transaction::new(PROGRAM, SYSTEM_OWNER);
        tx.transfer(ALICE, BOB, 100);
        assert_eq!(
            ledger.submit_transaction(tx),
            Err(LedgerError::MissingAuthority(ALICE))
        );
        assert_eq!(ledger.balance(&ALICE), 100);
    }

    #[test]
    fn test_owner_may_debit_owned_wallet() {
        let mut ledger = InMemoryLedger::new();
        let wallet = [3u8; 32];
        ledger.create_owned_wallet(wallet, ALICE, 10).unwrap();

        let mut tx = Transaction::new(PROGRAM, ALICE);
        tx.transfer(wallet, BOB, 10);
        ledger.submit_transaction(tx).unwrap();
        assert_eq!(ledger.balance(&wallet), 0);
    }

    #[test]
    fn test_create_then_write_with_version() {
        let mut ledger = InMemoryLedger::new();
        let record = [4u8; 32];

        let mut tx = Transaction::new(PROGRAM, ALICE);
        tx.create_account(record, PROGRAM, vec![1]);
        ledger.submit_transaction(tx).unwrap();
        assert_eq!(ledger.account(&record).unwrap().version, 1);

        let mut stale = Transaction::new(PROGRAM, ALICE);
        stale.write_data(record, 0, vec![2]);
        assert!(matches!(
            ledger.submit_transaction(stale),
            Err(LedgerError::VersionConflict {
                expected: 0,
                actual: 1,
                ..
            })
        ));

        let mut fresh = Transaction::new(PROGRAM, ALICE);
        fresh.write_data(record, 1, vec![2]);
        ledger.submit_transaction(fresh).unwrap();

        let account = ledger.account(&record).unwrap();
        assert_eq!(account.data, vec![2]);
        assert_eq!(account.version, 2);
    }

    #[test]
    fn test_create_existing_account_fails() {
        let mut ledger = InMemoryLedger::new();
        ledger.airdrop(ALICE, 1).unwrap();

        let mut tx = Transaction::new(PROGRAM, ALICE);
        tx.create_account(ALICE, PROGRAM, vec![]);
        assert_eq!(
            ledger.submit_transaction(tx),
            Err(LedgerError::AccountExists(ALICE))
        );
    }

    #[test]
    fn test_program_cannot_write_foreign_account() {
        let mut ledger = InMemoryLedger::new();
        ledger.airdrop(ALICE, 1).unwrap();

        let mut tx = Transaction::new(PROGRAM, ALICE);
        tx.write_data(ALICE, 1, vec![1]);
        assert_eq!(
            ledger.submit_transaction(tx),
            Err(LedgerError::IllegalOwner(ALICE))
        );
    }

    #[test]
    fn test_accounts_owned_by_filters_and_sorts() {
        let mut ledger = InMemoryLedger::new();
        let mut tx = Transaction::new(PROGRAM, ALICE);
        tx.create_account([6u8; 32], PROGRAM, vec![])
            .create_account([5u8; 32], PROGRAM, vec![]);
        ledger.submit_transaction(tx).unwrap();
        ledger.airdrop(ALICE, 1).unwrap();

        let owned = ledger.accounts_owned_by(&PROGRAM);
        let addresses: Vec<Address> = owned.into_iter().map(|(a, _)| a).collect();
        assert_eq!(addresses, vec![[5u8; 32], [6u8; 32]]);
    }

    #[test]
    fn test_logs_recorded_per_slot() {
        let mut ledger = InMemoryLedger::new();
        ledger.airdrop(ALICE, 10).unwrap();

        let mut tx = Transaction::new(PROGRAM, ALICE);
        tx.transfer(ALICE, BOB, 1).log("hello");
        ledger.submit_transaction(tx).unwrap();

        assert_eq!(
            ledger.logs(),
            &[TransactionLog {
                slot: 1,
                lines: vec!["hello".to_string()],
            }]
        );
    }
}
