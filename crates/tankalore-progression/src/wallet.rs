use log::info;
use serde::{Deserialize, Serialize};

/// Session earnings plus the banked total they flow into.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    session: u64,
    total: u64,
}

impl Wallet {
    pub fn with_total(total: u64) -> Self {
        Self { session: 0, total }
    }

    pub fn session(&self) -> u64 {
        self.session
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn set_total(&mut self, total: u64) {
        self.total = total;
    }

    pub fn add(&mut self, amount: u64) {
        self.session = self.session.saturating_add(amount);
    }

    pub fn can_afford(&self, cost: u64) -> bool {
        self.total >= cost
    }

    /// Spend from the banked total.
    pub fn spend(&mut self, cost: u64) -> Result<(), String> {
        if !self.can_afford(cost) {
            return Err(format!(
                "Insufficient currency: have {}, need {}",
                self.total, cost
            ));
        }
        self.total -= cost;
        Ok(())
    }

    /// Move session earnings into the total. Returns the amount banked.
    pub fn end_session(&mut self) -> u64 {
        let banked = self.session;
        self.total = self.total.saturating_add(banked);
        self.session = 0;
        if banked > 0 {
            info!("Banked {} currency (total {})", banked, self.total);
        }
        banked
    }

    /// Discard unbanked earnings.
    pub fn reset_session(&mut self) {
        self.session = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_earnings_bank_on_end() {
        let mut w = Wallet::with_total(100);
        w.add(30);
        w.add(12);
        assert_eq!(w.session(), 42);
        assert_eq!(w.total(), 100);
        assert_eq!(w.end_session(), 42);
        assert_eq!(w.total(), 142);
        assert_eq!(w.session(), 0);
        assert_eq!(w.end_session(), 0);
    }

    #[test]
    fn spend_checks_total_only() {
        let mut w = Wallet::with_total(50);
        w.add(1000);
        assert!(w.spend(60).is_err());
        assert!(w.spend(50).is_ok());
        assert_eq!(w.total(), 0);
    }
}
