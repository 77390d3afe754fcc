use anchor_lang::{prelude::*, AnchorDeserialize, AnchorSerialize};
use vesting_common::{FeePercent, FeeSchedule};

#[derive(Clone, Debug, PartialEq, Eq, InitSpace, AnchorSerialize, AnchorDeserialize)]
pub struct PartnerFeeRecord {
    pub partner: Pubkey,
    pub partner_fee: u32,
    pub treasury_fee: u32,
}

/// Per-partner fee overrides held by the fee oracle account.
#[account]
#[derive(Debug, Default, PartialEq, Eq)]
pub struct FeeTable {
    pub entries: Vec<PartnerFeeRecord>,
}

impl FeeTable {
    /// Fees applied to a stream created through `partner`. Unknown or absent partners pay the default treasury fee
    /// and no partner fee.
    pub fn fees_for(&self, partner: Option<&Pubkey>) -> FeeSchedule {
        let record = partner.and_then(|partner| self.entries.iter().find(|record| record.partner == *partner));

        match record {
            Some(record) => FeeSchedule {
                treasury: FeePercent::from_raw(record.treasury_fee),
                partner: FeePercent::from_raw(record.partner_fee),
            },
            None => FeeSchedule { treasury: FeePercent::DEFAULT_TREASURY, partner: FeePercent::ZERO },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_partner_overrides_defaults() {
        let partner = Pubkey::new_unique();
        let table = FeeTable {
            entries: vec![PartnerFeeRecord { partner, partner_fee: 5_000, treasury_fee: 1_000 }],
        };

        let fees = table.fees_for(Some(&partner));
        assert_eq!(fees.treasury.raw(), 1_000);
        assert_eq!(fees.partner.raw(), 5_000);

        let fees = table.fees_for(Some(&Pubkey::new_unique()));
        assert_eq!(fees.treasury, FeePercent::DEFAULT_TREASURY);
        assert!(fees.partner.is_zero());

        assert_eq!(table.fees_for(None).treasury, FeePercent::DEFAULT_TREASURY);
    }
}
