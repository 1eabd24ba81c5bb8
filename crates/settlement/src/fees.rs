use cosmwasm_std::{Addr, Uint128};
use multiswap_types::{is_null_addr, FeeSplit, DEFAULT_FEE_BPS, MAX_FEE_BPS};

use crate::SettlementError;

/// Protocol fee rate and the address it is paid to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeLedger {
    rate_bps: u16,
    recipient: Addr,
}

impl FeeLedger {
    /// Fee ledger at the default rate
    pub fn new(recipient: Addr) -> Result<Self, SettlementError> {
        Self::with_rate(DEFAULT_FEE_BPS, recipient)
    }

    pub fn with_rate(rate_bps: u16, recipient: Addr) -> Result<Self, SettlementError> {
        check_rate(rate_bps)?;
        check_recipient(&recipient)?;
        Ok(Self {
            rate_bps,
            recipient,
        })
    }

    pub fn rate_bps(&self) -> u16 {
        self.rate_bps
    }

    pub fn recipient(&self) -> &Addr {
        &self.recipient
    }

    /// Replace the rate, returning the previous one. Rates above the cap are
    /// rejected and leave the stored rate untouched.
    pub fn set_rate(&mut self, rate_bps: u16) -> Result<u16, SettlementError> {
        check_rate(rate_bps)?;
        Ok(std::mem::replace(&mut self.rate_bps, rate_bps))
    }

    /// Replace the recipient, returning the previous one
    pub fn set_recipient(&mut self, recipient: Addr) -> Result<Addr, SettlementError> {
        check_recipient(&recipient)?;
        Ok(std::mem::replace(&mut self.recipient, recipient))
    }

    pub fn split(&self, total: Uint128) -> Result<FeeSplit, SettlementError> {
        Ok(FeeSplit::compute(total, self.rate_bps)?)
    }
}

fn check_rate(rate_bps: u16) -> Result<(), SettlementError> {
    if rate_bps > MAX_FEE_BPS {
        return Err(SettlementError::FeeRateTooHigh {
            rate_bps,
            max_bps: MAX_FEE_BPS,
        });
    }
    Ok(())
}

fn check_recipient(recipient: &Addr) -> Result<(), SettlementError> {
    if is_null_addr(recipient) {
        return Err(SettlementError::InvalidRecipient);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger() -> FeeLedger {
        FeeLedger::new(Addr::unchecked("treasury")).unwrap()
    }

    #[test]
    fn test_defaults() {
        let fees = ledger();
        assert_eq!(fees.rate_bps(), DEFAULT_FEE_BPS);
        assert_eq!(fees.recipient(), &Addr::unchecked("treasury"));
    }

    #[test]
    fn test_set_rate_within_cap() {
        let mut fees = ledger();
        assert_eq!(fees.set_rate(0).unwrap(), DEFAULT_FEE_BPS);
        assert_eq!(fees.set_rate(MAX_FEE_BPS).unwrap(), 0);
        assert_eq!(fees.rate_bps(), MAX_FEE_BPS);
    }

    #[test]
    fn test_set_rate_above_cap_keeps_rate() {
        let mut fees = ledger();
        let err = fees.set_rate(500).unwrap_err();

        assert!(matches!(
            err,
            SettlementError::FeeRateTooHigh {
                rate_bps: 500,
                max_bps: MAX_FEE_BPS
            }
        ));
        assert_eq!(fees.rate_bps(), DEFAULT_FEE_BPS);

        assert!(fees.set_rate(MAX_FEE_BPS + 1).is_err());
    }

    #[test]
    fn test_null_recipient_rejected() {
        assert!(matches!(
            FeeLedger::new(Addr::unchecked("")),
            Err(SettlementError::InvalidRecipient)
        ));

        let mut fees = ledger();
        assert!(matches!(
            fees.set_recipient(Addr::unchecked("  ")),
            Err(SettlementError::InvalidRecipient)
        ));
        assert_eq!(fees.recipient(), &Addr::unchecked("treasury"));

        let old = fees.set_recipient(Addr::unchecked("dao")).unwrap();
        assert_eq!(old, Addr::unchecked("treasury"));
    }

    #[test]
    fn test_split_uses_current_rate() {
        let mut fees = ledger();
        fees.set_rate(100).unwrap();

        let split = fees.split(Uint128::new(12_345)).unwrap();
        assert_eq!(split.fee, Uint128::new(123));
        assert_eq!(split.net, Uint128::new(12_222));
    }
}
