//! Gold movement capability.
//!
//! The board never touches player inventories. It asks a [`Treasury`] to
//! take a stake from a placer and to pay a collector. [`Bank`] is the
//! in-memory implementation used by the standalone host and by tests.

use std::collections::BTreeMap;

use bounty_types::PlayerSerial;

/// Errors raised by a treasury.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreasuryError {
    /// The player cannot cover the amount.
    #[error("player {player} has {available} gold, needs {needed}")]
    InsufficientFunds {
        /// The player being debited.
        player: PlayerSerial,
        /// Gold requested.
        needed: u64,
        /// Gold held.
        available: u64,
    },

    /// The player has no account with the treasury.
    #[error("no treasury account for player {0}")]
    UnknownAccount(PlayerSerial),

    /// The deposit would overflow the account.
    #[error("deposit of {amount} gold would overflow the account of {player}")]
    Overflow {
        /// The player being credited.
        player: PlayerSerial,
        /// Gold offered.
        amount: u64,
    },
}

/// Moves gold between players and the board.
pub trait Treasury {
    /// Take gold from a player. Nothing moves on error.
    ///
    /// # Errors
    ///
    /// Returns [`TreasuryError`] if the player cannot pay.
    fn withdraw(&mut self, player: PlayerSerial, amount: u64) -> Result<(), TreasuryError>;

    /// Give gold to a player.
    ///
    /// # Errors
    ///
    /// Returns [`TreasuryError`] if the deposit cannot be made.
    fn deposit(&mut self, player: PlayerSerial, amount: u64) -> Result<(), TreasuryError>;
}

/// In-memory gold balances.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bank {
    balances: BTreeMap<PlayerSerial, u64>,
}

impl Bank {
    /// Create an empty bank.
    pub const fn new() -> Self {
        Self {
            balances: BTreeMap::new(),
        }
    }

    /// Open an account, or reset an existing one, with the given balance.
    pub fn open(&mut self, player: PlayerSerial, balance: u64) {
        self.balances.insert(player, balance);
    }

    /// Current balance, `None` for unknown players.
    pub fn balance(&self, player: PlayerSerial) -> Option<u64> {
        self.balances.get(&player).copied()
    }

    /// Gold held across all accounts.
    pub fn total(&self) -> u128 {
        self.balances
            .values()
            .fold(0_u128, |acc, &b| acc.saturating_add(u128::from(b)))
    }
}

impl Treasury for Bank {
    fn withdraw(&mut self, player: PlayerSerial, amount: u64) -> Result<(), TreasuryError> {
        let balance = self
            .balances
            .get_mut(&player)
            .ok_or(TreasuryError::UnknownAccount(player))?;
        *balance = balance
            .checked_sub(amount)
            .ok_or(TreasuryError::InsufficientFunds {
                player,
                needed: amount,
                available: *balance,
            })?;
        Ok(())
    }

    fn deposit(&mut self, player: PlayerSerial, amount: u64) -> Result<(), TreasuryError> {
        let balance = self
            .balances
            .get_mut(&player)
            .ok_or(TreasuryError::UnknownAccount(player))?;
        *balance = balance
            .checked_add(amount)
            .ok_or(TreasuryError::Overflow { player, amount })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: PlayerSerial = PlayerSerial(1);

    #[test]
    fn withdraw_within_balance() {
        let mut bank = Bank::new();
        bank.open(ALICE, 1_000);
        assert!(bank.withdraw(ALICE, 600).is_ok());
        assert_eq!(bank.balance(ALICE), Some(400));
    }

    #[test]
    fn overdraft_leaves_balance_untouched() {
        let mut bank = Bank::new();
        bank.open(ALICE, 100);
        assert_eq!(
            bank.withdraw(ALICE, 600),
            Err(TreasuryError::InsufficientFunds {
                player: ALICE,
                needed: 600,
                available: 100,
            })
        );
        assert_eq!(bank.balance(ALICE), Some(100));
    }

    #[test]
    fn unknown_accounts_are_rejected() {
        let mut bank = Bank::new();
        assert_eq!(
            bank.deposit(ALICE, 5),
            Err(TreasuryError::UnknownAccount(ALICE))
        );
    }

    #[test]
    fn deposit_overflow_is_rejected() {
        let mut bank = Bank::new();
        bank.open(ALICE, u64::MAX);
        assert!(matches!(
            bank.deposit(ALICE, 1),
            Err(TreasuryError::Overflow { .. })
        ));
        assert_eq!(bank.total(), u128::from(u64::MAX));
    }
}
