use bastion_core::Economy;

/// Gold balance kept by the simulation when the host supplies no economy of its own.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Ledger {
    balance: u32,
}

impl Ledger {
    /// Creates a ledger holding the provided starting gold.
    #[must_use]
    pub const fn new(starting_gold: u32) -> Self {
        Self {
            balance: starting_gold,
        }
    }
}

impl Economy for Ledger {
    fn balance(&self) -> u32 {
        self.balance
    }

    fn credit(&mut self, amount: u32) {
        self.balance = self.balance.saturating_add(amount);
    }

    fn debit(&mut self, amount: u32) -> bool {
        match self.balance.checked_sub(amount) {
            Some(rest) => {
                self.balance = rest;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debit_refuses_overdraft() {
        let mut ledger = Ledger::new(60);
        assert!(ledger.debit(50));
        assert_eq!(ledger.balance(), 10);
        assert!(!ledger.debit(11));
        assert_eq!(ledger.balance(), 10, "failed debit must not change the balance");
        ledger.credit(5);
        assert_eq!(ledger.balance(), 15);
    }
}
