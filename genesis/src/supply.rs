// Copyright (c) The Meridian Core Contributors
// SPDX-License-Identifier: Apache-2.0

//! Conserved distribution of a token's declared supply across an ordered
//! beneficiary set. Entry 0 is the residual entry: it absorbs the
//! integer-division remainder and every opt-in deduction, so the sum of
//! all entries always equals the declared supply exactly.

use crate::Error;
use meridian_config::TokenDistributionEntry;
use meridian_crypto::{Address, NetworkType};
use std::collections::BTreeMap;

/// Splits `supply` across `beneficiaries`, or validates an explicit
/// distribution as-is. Even integer floor split, remainder added
/// entirely to the first entry.
pub fn distribute(
    token: &str,
    supply: u64,
    beneficiaries: &[Address],
    explicit: Option<Vec<TokenDistributionEntry>>,
) -> Result<Vec<TokenDistributionEntry>, Error> {
    if let Some(entries) = explicit {
        validate_conservation(token, supply, &entries)?;
        return Ok(entries);
    }

    if beneficiaries.is_empty() {
        return Err(Error::NoBeneficiaries(token.into()));
    }

    let count = beneficiaries.len() as u64;
    let share = supply / count;
    let remainder = supply - share * count;
    let entries = beneficiaries
        .iter()
        .enumerate()
        .map(|(i, address)| TokenDistributionEntry {
            address: address.clone(),
            amount: if i == 0 { share + remainder } else { share },
        })
        .collect::<Vec<_>>();

    validate_conservation(token, supply, &entries)?;
    Ok(entries)
}

/// Appends each opt-in balance to the distribution and deducts it from
/// the residual entry. Fatal if the residual entry would drop below 1,
/// if an opt-in address duplicates an existing entry, or if conservation
/// breaks afterwards. Duplicate opt-in addresses are a caller error,
/// never merged silently.
pub fn apply_opt_in(
    network: NetworkType,
    token: &str,
    supply: u64,
    distributions: &mut Vec<TokenDistributionEntry>,
    balances: &BTreeMap<String, u64>,
) -> Result<(), Error> {
    if distributions.is_empty() {
        return Err(Error::MissingResidualBeneficiary);
    }

    for (encoded, amount) in balances {
        let address = Address::from_encoded(network, encoded)?;
        if distributions.iter().any(|entry| entry.address == address) {
            return Err(Error::DuplicateOptInAddress(encoded.clone()));
        }
        let residual = &mut distributions[0];
        if *amount >= residual.amount {
            return Err(Error::ResidualUnderflow {
                address: residual.address.to_string(),
                available: residual.amount,
                deduction: *amount,
            });
        }
        residual.amount -= amount;
        distributions.push(TokenDistributionEntry {
            address,
            amount: *amount,
        });
    }

    validate_conservation(token, supply, distributions)
}

pub fn validate_conservation(
    token: &str,
    supply: u64,
    entries: &[TokenDistributionEntry],
) -> Result<(), Error> {
    let total: u128 = entries.iter().map(|entry| u128::from(entry.amount)).sum();
    if total != u128::from(supply) {
        return Err(Error::SupplyMismatch {
            token: token.into(),
            expected: supply,
            actual: total,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_crypto::Account;
    use proptest::prelude::*;

    const NETWORK: NetworkType = NetworkType::PrivateTest;

    fn addresses(count: usize) -> Vec<Address> {
        (0..count)
            .map(|_| Account::generate(NETWORK).address)
            .collect()
    }

    fn sum(entries: &[TokenDistributionEntry]) -> u128 {
        entries.iter().map(|e| u128::from(e.amount)).sum()
    }

    #[test]
    fn remainder_goes_to_first_entry() {
        let beneficiaries = addresses(3);
        let entries = distribute("currency", 10, &beneficiaries, None).unwrap();
        assert_eq!(entries[0].amount, 4);
        assert_eq!(entries[1].amount, 3);
        assert_eq!(entries[2].amount, 3);
    }

    #[test]
    fn explicit_distribution_is_used_as_is_but_validated() {
        let beneficiaries = addresses(2);
        let explicit = vec![
            TokenDistributionEntry {
                address: beneficiaries[0].clone(),
                amount: 7,
            },
            TokenDistributionEntry {
                address: beneficiaries[1].clone(),
                amount: 3,
            },
        ];
        let entries = distribute("currency", 10, &[], Some(explicit.clone())).unwrap();
        assert_eq!(entries, explicit);

        let err = distribute("currency", 11, &[], Some(explicit)).unwrap_err();
        assert!(matches!(err, Error::SupplyMismatch { expected: 11, .. }));
    }

    #[test]
    fn no_beneficiaries_is_fatal() {
        assert!(matches!(
            distribute("currency", 10, &[], None).unwrap_err(),
            Error::NoBeneficiaries(_)
        ));
    }

    #[test]
    fn opt_in_deducts_from_residual_and_conserves() {
        let beneficiaries = addresses(2);
        let mut entries = distribute("currency", 1000, &beneficiaries, None).unwrap();
        let opted_in = Account::generate(NETWORK).address;
        let mut balances = BTreeMap::new();
        balances.insert(opted_in.to_string(), 123);

        apply_opt_in(NETWORK, "currency", 1000, &mut entries, &balances).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].amount, 500 - 123);
        assert_eq!(entries[2].address, opted_in);
        assert_eq!(sum(&entries), 1000);
    }

    #[test]
    fn opt_in_exceeding_residual_is_fatal() {
        let beneficiaries = addresses(2);
        let mut entries = distribute("currency", 1000, &beneficiaries, None).unwrap();
        let mut balances = BTreeMap::new();
        balances.insert(Account::generate(NETWORK).address.to_string(), 500);

        let err = apply_opt_in(NETWORK, "currency", 1000, &mut entries, &balances).unwrap_err();
        assert!(matches!(
            err,
            Error::ResidualUnderflow {
                available: 500,
                deduction: 500,
                ..
            }
        ));
    }

    #[test]
    fn duplicate_opt_in_address_is_fatal() {
        let beneficiaries = addresses(2);
        let mut entries = distribute("currency", 1000, &beneficiaries, None).unwrap();
        let mut balances = BTreeMap::new();
        balances.insert(beneficiaries[1].to_string(), 10);

        assert!(matches!(
            apply_opt_in(NETWORK, "currency", 1000, &mut entries, &balances).unwrap_err(),
            Error::DuplicateOptInAddress(_)
        ));
    }

    proptest! {
        #[test]
        fn distribution_conserves_supply(supply in 0u64..=u64::MAX / 2, count in 1usize..32) {
            let beneficiaries = addresses(count);
            let entries = distribute("currency", supply, &beneficiaries, None).unwrap();
            prop_assert_eq!(entries.len(), count);
            prop_assert_eq!(sum(&entries), u128::from(supply));
        }
    }
}
