// src/services/reconciliation.rs
//
// Funding and progress views computed from the ledger and the settled
// payments. Everything here is pure; the payment service loads the rows.

use std::cmp::Ordering;
use std::collections::HashMap;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::{error::AppError, money::to_cents},
    models::{
        animal::Animal,
        donor::Donor,
        payment::{AnimalFunding, DonorProgress, DonorSettlement, FundingStatus, PaidAttribution, ProgressStatus},
        share::{Holding, SEVENTHS_PER_ANIMAL},
    },
};

/// Amount to charge a donor: Σ porsi × price over its holdings, private
/// animals contributing nothing. Summed exactly, rounded once to cents.
pub fn charge_amount(holdings: &[Holding]) -> Result<Decimal, AppError> {
    if holdings.is_empty() {
        return Err(AppError::Validation(
            "Donor has no ownership share in any animal".into(),
        ));
    }

    let total = to_cents(holdings.iter().map(Holding::billed_value).sum());
    if total.is_zero() {
        return Err(AppError::Validation(
            "Nothing to charge: the donor only owns private animals".into(),
        ));
    }
    Ok(total)
}

/// Compares at cent precision.
pub fn classify_funding(target: Decimal, collected: Decimal) -> FundingStatus {
    match to_cents(collected).cmp(&to_cents(target)) {
        Ordering::Less => FundingStatus::Unpaid,
        Ordering::Equal => FundingStatus::FullyFunded,
        Ordering::Greater => FundingStatus::OverTarget,
    }
}

/// Fraction of each donor's current bill that its settled payments cover,
/// capped at one. Donors without a settled payment are absent (nothing
/// covered). Settled money is spread pro rata over all of the donor's
/// holdings, so a share grown after paying is only partly funded.
pub fn settled_coverage(holdings: &[Holding], settlements: &[DonorSettlement]) -> HashMap<Uuid, Decimal> {
    let mut billed: HashMap<Uuid, Decimal> = HashMap::new();
    for h in holdings {
        *billed.entry(h.donor_id).or_default() += h.billed_value();
    }

    settlements
        .iter()
        .map(|s| {
            let bill = to_cents(billed.get(&s.donor_id).copied().unwrap_or_default());
            let ratio = if bill.is_zero() {
                Decimal::ONE
            } else {
                (to_cents(s.settled_amount) / bill).min(Decimal::ONE)
            };
            (s.donor_id, ratio)
        })
        .collect()
}

/// Funding of one animal. `shares` are the animal's holdings, `coverage`
/// comes from [`settled_coverage`].
pub fn fund_animal(animal: &Animal, shares: &[&Holding], coverage: &HashMap<Uuid, Decimal>) -> AnimalFunding {
    if animal.is_private {
        let status = if shares.is_empty() {
            FundingStatus::Unpaid
        } else {
            FundingStatus::FullyFunded
        };
        return AnimalFunding {
            animal_id: animal.id,
            kind: animal.kind,
            is_private: true,
            target: Decimal::ZERO,
            collected: Decimal::ZERO,
            status,
        };
    }

    let collected = to_cents(
        shares
            .iter()
            .map(|h| h.billed_value() * coverage.get(&h.donor_id).copied().unwrap_or_default())
            .sum(),
    );

    AnimalFunding {
        animal_id: animal.id,
        kind: animal.kind,
        is_private: false,
        target: animal.price,
        collected,
        status: classify_funding(animal.price, collected),
    }
}

/// Funding view for every animal, in the order given. `holdings` must hold
/// every share of the donors involved, not only those of `animals`.
pub fn animal_funding(animals: &[Animal], holdings: &[Holding], settlements: &[DonorSettlement]) -> Vec<AnimalFunding> {
    let coverage = settled_coverage(holdings, settlements);
    let mut by_animal: HashMap<Uuid, Vec<&Holding>> = HashMap::new();
    for h in holdings {
        by_animal.entry(h.animal_id).or_default().push(h);
    }

    animals
        .iter()
        .map(|a| {
            let shares = by_animal.get(&a.id).map(Vec::as_slice).unwrap_or(&[]);
            fund_animal(a, shares, &coverage)
        })
        .collect()
}

/// The slaughter gate: a private animal needs an owner, any other animal
/// needs its settled total to reach the price.
pub fn is_eligible_for_slaughter(funding: &AnimalFunding) -> bool {
    funding.status != FundingStatus::Unpaid
}

pub fn classify_progress(billed: Decimal, paid: Decimal) -> ProgressStatus {
    let (billed, paid) = (to_cents(billed), to_cents(paid));
    if billed.is_zero() || paid.is_zero() {
        return ProgressStatus::Unpaid;
    }
    match paid.cmp(&billed) {
        Ordering::Less => ProgressStatus::Partial,
        Ordering::Equal => ProgressStatus::Paid,
        Ordering::Greater => ProgressStatus::OverPaid,
    }
}

/// Progress view for every donor, in the order given.
pub fn donor_progress(
    donors: &[Donor],
    holdings: &[Holding],
    settlements: &[DonorSettlement],
    attribution: PaidAttribution,
) -> Vec<DonorProgress> {
    let mut by_donor: HashMap<Uuid, Vec<&Holding>> = HashMap::new();
    for h in holdings {
        by_donor.entry(h.donor_id).or_default().push(h);
    }
    let settled: HashMap<Uuid, Decimal> = settlements
        .iter()
        .map(|s| (s.donor_id, s.settled_amount))
        .collect();
    let coverage = settled_coverage(holdings, settlements);

    donors
        .iter()
        .map(|d| {
            let shares = by_donor.get(&d.id).map(Vec::as_slice).unwrap_or(&[]);
            let sevenths: i64 = shares.iter().map(|h| i64::from(h.porsi_sevenths)).sum();
            let billed = to_cents(shares.iter().map(|h| h.billed_value()).sum());

            let paid = match attribution {
                PaidAttribution::Ledger => {
                    to_cents(billed * coverage.get(&d.id).copied().unwrap_or_default())
                }
                PaidAttribution::Direct => to_cents(settled.get(&d.id).copied().unwrap_or_default()),
            };

            let progress = if billed.is_zero() {
                Decimal::ZERO
            } else {
                (paid / billed).round_dp(4)
            };

            DonorProgress {
                donor_id: d.id,
                donor_name: d.name.clone(),
                total_porsi: Decimal::from(sevenths) / Decimal::from(SEVENTHS_PER_ANIMAL),
                billed,
                paid,
                progress,
                status: classify_progress(billed, paid),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    use crate::models::animal::AnimalKind;

    fn animal(kind: AnimalKind, price: i64, is_private: bool) -> Animal {
        Animal {
            id: Uuid::new_v4(),
            kind,
            weight: Decimal::from(250),
            price: Decimal::from(price),
            is_private,
            registered_on: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn holding(animal: &Animal, donor_id: Uuid, sevenths: i16) -> Holding {
        Holding {
            donor_id,
            animal_id: animal.id,
            animal_kind: animal.kind,
            price: animal.price,
            is_private: animal.is_private,
            porsi_sevenths: sevenths,
        }
    }

    fn donor(id: Uuid, name: &str) -> Donor {
        Donor {
            id,
            user_id: None,
            name: Some(name.into()),
            phone: Some("0812".into()),
            email: Some("d@example.com".into()),
            address: Some("Jl. Kenanga".into()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn cents(units: i64) -> Decimal {
        Decimal::new(units, 2)
    }

    fn settled(donor_id: Uuid, amount: i64) -> DonorSettlement {
        DonorSettlement {
            donor_id,
            settled_amount: Decimal::from(amount),
        }
    }

    #[test]
    fn charge_amount_sums_porsi_times_price() {
        let a = animal(AnimalKind::Sapi, 7_000_000, false);
        let goat = animal(AnimalKind::Kambing, 3_500_000, false);
        let x = Uuid::new_v4();
        let holdings = vec![holding(&a, x, 3), holding(&goat, x, 7)];
        assert_eq!(charge_amount(&holdings).unwrap(), Decimal::from(6_500_000));
    }

    #[test]
    fn charge_amount_rounds_once_at_the_end() {
        // 1/7 of 1,000,000 twice: 285714.2857… rounds to 285714.29, whereas
        // rounding each term first would give 285714.28
        let a = animal(AnimalKind::Sapi, 1_000_000, false);
        let b = animal(AnimalKind::Sapi, 1_000_000, false);
        let x = Uuid::new_v4();
        let holdings = vec![holding(&a, x, 1), holding(&b, x, 1)];
        assert_eq!(charge_amount(&holdings).unwrap(), cents(28_571_429));
    }

    #[test]
    fn private_shares_bill_nothing() {
        let private = animal(AnimalKind::Sapi, 0, true);
        let a = animal(AnimalKind::Sapi, 7_000_000, false);
        let x = Uuid::new_v4();

        let only_private = vec![holding(&private, x, 7)];
        assert!(matches!(charge_amount(&only_private), Err(AppError::Validation(_))));

        let mixed = vec![holding(&private, x, 7), holding(&a, x, 1)];
        assert_eq!(charge_amount(&mixed).unwrap(), Decimal::from(1_000_000));
    }

    #[test]
    fn no_shares_is_rejected() {
        assert!(matches!(charge_amount(&[]), Err(AppError::Validation(_))));
    }

    #[test]
    fn funding_boundaries_at_one_cent() {
        let target = Decimal::from(7_000_000);
        assert_eq!(classify_funding(target, target), FundingStatus::FullyFunded);
        assert_eq!(classify_funding(target, target - cents(1)), FundingStatus::Unpaid);
        assert_eq!(classify_funding(target, target + cents(1)), FundingStatus::OverTarget);
    }

    #[test]
    fn two_settled_donors_fully_fund_shared_sapi() {
        let a = animal(AnimalKind::Sapi, 7_000_000, false);
        let (x, y) = (Uuid::new_v4(), Uuid::new_v4());
        let holdings = vec![holding(&a, x, 3), holding(&a, y, 4)];

        let only_x = vec![settled(x, 3_000_000)];
        let view = animal_funding(std::slice::from_ref(&a), &holdings, &only_x);
        assert_eq!(view[0].collected, Decimal::from(3_000_000));
        assert_eq!(view[0].status, FundingStatus::Unpaid);
        assert!(!is_eligible_for_slaughter(&view[0]));

        let both = vec![settled(x, 3_000_000), settled(y, 4_000_000)];
        let view = animal_funding(std::slice::from_ref(&a), &holdings, &both);
        assert_eq!(view[0].collected, Decimal::from(7_000_000));
        assert_eq!(view[0].status, FundingStatus::FullyFunded);
        assert!(is_eligible_for_slaughter(&view[0]));
    }

    #[test]
    fn share_grown_after_settlement_is_not_funded() {
        let a = animal(AnimalKind::Sapi, 7_000_000, false);
        let x = Uuid::new_v4();
        // paid for 1/7, then raised the share to the whole animal
        let holdings = vec![holding(&a, x, 7)];
        let payments = vec![settled(x, 1_000_000)];

        let view = animal_funding(std::slice::from_ref(&a), &holdings, &payments);
        assert_eq!(view[0].collected, Decimal::from(1_000_000));
        assert_eq!(view[0].status, FundingStatus::Unpaid);
        assert!(!is_eligible_for_slaughter(&view[0]));
    }

    #[test]
    fn settled_money_is_spread_over_all_holdings() {
        let a = animal(AnimalKind::Sapi, 7_000_000, false);
        let goat = animal(AnimalKind::Kambing, 3_000_000, false);
        let (x, y) = (Uuid::new_v4(), Uuid::new_v4());
        // x owes 4,000,000 on the cow and 3,000,000 on the goat but paid only 3,500,000
        let holdings = vec![holding(&a, x, 4), holding(&goat, x, 7), holding(&a, y, 3)];
        let payments = vec![settled(x, 3_500_000), settled(y, 3_000_000)];

        let coverage = settled_coverage(&holdings, &payments);
        assert_eq!(coverage[&x], Decimal::new(5, 1));
        assert_eq!(coverage[&y], Decimal::ONE);

        let view = animal_funding(&[a, goat], &holdings, &payments);
        assert_eq!(view[0].collected, Decimal::from(5_000_000));
        assert_eq!(view[0].status, FundingStatus::Unpaid);
        assert_eq!(view[1].collected, Decimal::from(1_500_000));
        assert_eq!(view[1].status, FundingStatus::Unpaid);
    }

    #[test]
    fn overpayment_does_not_fund_other_donors_shares() {
        let a = animal(AnimalKind::Sapi, 7_000_000, false);
        let (x, y) = (Uuid::new_v4(), Uuid::new_v4());
        let holdings = vec![holding(&a, x, 3), holding(&a, y, 4)];
        let payments = vec![settled(x, 7_000_000)];

        let view = animal_funding(std::slice::from_ref(&a), &holdings, &payments);
        assert_eq!(view[0].collected, Decimal::from(3_000_000));
        assert_eq!(view[0].status, FundingStatus::Unpaid);
    }

    #[test]
    fn charge_rounded_to_cents_still_covers_the_share() {
        // 1/7 of 1,000,000 is billed as 142857.14
        let a = animal(AnimalKind::Sapi, 1_000_000, false);
        let donors: Vec<Uuid> = (0..7).map(|_| Uuid::new_v4()).collect();
        let holdings: Vec<Holding> = donors.iter().map(|d| holding(&a, *d, 1)).collect();
        let payments: Vec<DonorSettlement> = donors
            .iter()
            .map(|d| DonorSettlement { donor_id: *d, settled_amount: cents(14_285_714) })
            .collect();

        let view = animal_funding(std::slice::from_ref(&a), &holdings, &payments);
        assert_eq!(view[0].status, FundingStatus::FullyFunded);
    }

    #[test]
    fn private_animal_is_funded_once_owned() {
        let b = animal(AnimalKind::Sapi, 0, true);
        let view = animal_funding(std::slice::from_ref(&b), &[], &[]);
        assert_eq!(view[0].status, FundingStatus::Unpaid);
        assert!(!is_eligible_for_slaughter(&view[0]));

        let owned = vec![holding(&b, Uuid::new_v4(), 7)];
        let view = animal_funding(std::slice::from_ref(&b), &owned, &[]);
        assert_eq!(view[0].target, Decimal::ZERO);
        assert_eq!(view[0].status, FundingStatus::FullyFunded);
        assert!(is_eligible_for_slaughter(&view[0]));
    }

    #[test]
    fn animal_without_shares_is_unpaid() {
        let a = animal(AnimalKind::Domba, 2_500_000, false);
        let view = animal_funding(std::slice::from_ref(&a), &[], &[]);
        assert_eq!(view[0].collected, Decimal::ZERO);
        assert_eq!(view[0].status, FundingStatus::Unpaid);
    }

    #[test]
    fn progress_statuses() {
        let billed = Decimal::from(3_000_000);
        assert_eq!(classify_progress(billed, Decimal::ZERO), ProgressStatus::Unpaid);
        assert_eq!(classify_progress(billed, Decimal::from(1_000_000)), ProgressStatus::Partial);
        assert_eq!(classify_progress(billed, billed), ProgressStatus::Paid);
        assert_eq!(classify_progress(billed, billed + cents(1)), ProgressStatus::OverPaid);
        assert_eq!(classify_progress(Decimal::ZERO, Decimal::from(10)), ProgressStatus::Unpaid);
    }

    #[test]
    fn ledger_attribution_counts_full_bill_once_settled() {
        let a = animal(AnimalKind::Sapi, 7_000_000, false);
        let b = animal(AnimalKind::Sapi, 7_000_000, false);
        let x = Uuid::new_v4();
        let holdings = vec![holding(&a, x, 3), holding(&b, x, 1)];
        // two settled payments must not double the paid total
        let settlements = vec![DonorSettlement {
            donor_id: x,
            settled_amount: Decimal::from(8_000_000),
        }];

        let view = donor_progress(&[donor(x, "X")], &holdings, &settlements, PaidAttribution::Ledger);
        assert_eq!(view[0].billed, Decimal::from(4_000_000));
        assert_eq!(view[0].paid, Decimal::from(4_000_000));
        assert_eq!(view[0].progress, Decimal::ONE);
        assert_eq!(view[0].status, ProgressStatus::Paid);
        assert_eq!(view[0].total_porsi, Decimal::from(4) / Decimal::from(7));
    }

    #[test]
    fn ledger_attribution_is_capped_by_settled_money() {
        let a = animal(AnimalKind::Sapi, 7_000_000, false);
        let x = Uuid::new_v4();
        let holdings = vec![holding(&a, x, 7)];
        let payments = vec![settled(x, 1_000_000)];

        let view = donor_progress(&[donor(x, "X")], &holdings, &payments, PaidAttribution::Ledger);
        assert_eq!(view[0].billed, Decimal::from(7_000_000));
        assert_eq!(view[0].paid, Decimal::from(1_000_000));
        assert_eq!(view[0].status, ProgressStatus::Partial);
    }

    #[test]
    fn direct_attribution_uses_settled_amounts() {
        let a = animal(AnimalKind::Sapi, 7_000_000, false);
        let (x, y) = (Uuid::new_v4(), Uuid::new_v4());
        let holdings = vec![holding(&a, x, 3), holding(&a, y, 4)];
        let settlements = vec![DonorSettlement {
            donor_id: x,
            settled_amount: Decimal::from(1_500_000),
        }];
        let donors = [donor(x, "X"), donor(y, "Y")];

        let view = donor_progress(&donors, &holdings, &settlements, PaidAttribution::Direct);
        assert_eq!(view[0].paid, Decimal::from(1_500_000));
        assert_eq!(view[0].progress, Decimal::new(5, 1));
        assert_eq!(view[0].status, ProgressStatus::Partial);
        assert_eq!(view[1].paid, Decimal::ZERO);
        assert_eq!(view[1].status, ProgressStatus::Unpaid);
    }

    #[test]
    fn donor_without_shares_has_zero_progress() {
        let x = Uuid::new_v4();
        let view = donor_progress(&[donor(x, "X")], &[], &[], PaidAttribution::Ledger);
        assert_eq!(view[0].billed, Decimal::ZERO);
        assert_eq!(view[0].progress, Decimal::ZERO);
        assert_eq!(view[0].status, ProgressStatus::Unpaid);
    }
}
