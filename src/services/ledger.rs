// src/services/ledger.rs
//
// Porsi law and capacity rules of the ownership ledger. Pure functions; the
// share service calls them while holding the animal row lock.

use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        animal::{Animal, AnimalKind},
        share::{OwnershipShare, Porsi, SEVENTHS_PER_ANIMAL},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerMutation {
    /// A new (donor, animal) share.
    Create,
    /// The donor's existing share is replaced with a new porsi.
    Replace,
}

/// Derives the porsi a donor may hold on `animal` from the requested headcount.
///
/// - sapi: `headcount / 7`, headcount in 1..=7. Required unless private.
/// - kambing/domba: always the whole animal; headcount, if given, must be 1.
/// - private: always the whole animal.
pub fn porsi_for(animal: &Animal, headcount: Option<i16>) -> Result<Porsi, AppError> {
    if let Some(h) = headcount {
        if !(1..=SEVENTHS_PER_ANIMAL).contains(&h) {
            return Err(AppError::Validation(format!(
                "Headcount must be between 1 and {}",
                SEVENTHS_PER_ANIMAL
            )));
        }
    }

    let porsi = match animal.kind {
        AnimalKind::Sapi => match headcount {
            Some(h) => Porsi::from_sevenths(h)
                .ok_or_else(|| AppError::Validation("Invalid headcount".into()))?,
            None if animal.is_private => Porsi::WHOLE,
            None => return Err(AppError::Validation("Headcount is required for a shared sapi".into())),
        },
        AnimalKind::Kambing | AnimalKind::Domba => match headcount {
            None | Some(1) => Porsi::WHOLE,
            Some(_) => {
                return Err(AppError::Validation(
                    "A kambing or domba belongs to exactly one person".into(),
                ));
            }
        },
    };

    if animal.is_private && !porsi.is_whole() {
        return Err(AppError::Validation(
            "A private animal must be owned whole (porsi 1.0)".into(),
        ));
    }

    Ok(porsi)
}

/// Checks that giving `donor_id` the share `porsi` keeps the animal within
/// capacity. `existing` is every current share of the animal; on `Replace`
/// the donor's own current share is left out of the sum.
pub fn ensure_capacity(
    animal: &Animal,
    existing: &[OwnershipShare],
    donor_id: Uuid,
    porsi: Porsi,
    mutation: LedgerMutation,
) -> Result<(), AppError> {
    let holds_share = existing.iter().any(|s| s.donor_id == donor_id);
    match mutation {
        LedgerMutation::Create if holds_share => {
            return Err(AppError::Conflict("Donor already holds a share of this animal".into()));
        }
        LedgerMutation::Replace if !holds_share => {
            return Err(AppError::not_found("Ownership share"));
        }
        _ => {}
    }

    let others: Vec<&OwnershipShare> = existing.iter().filter(|s| s.donor_id != donor_id).collect();

    if (animal.is_private || !animal.kind.is_shareable()) && !others.is_empty() {
        return if animal.is_private {
            Err(AppError::Conflict("This private animal is already owned".into()))
        } else {
            Err(AppError::CapacityExceeded("This animal already has an owner".into()))
        };
    }

    let allocated: i32 = others.iter().map(|s| i32::from(s.porsi_sevenths)).sum();
    if allocated + i32::from(porsi.sevenths()) > i32::from(SEVENTHS_PER_ANIMAL) {
        return Err(AppError::CapacityExceeded(format!(
            "Total porsi would exceed the animal's capacity ({}/{} already allocated)",
            allocated, SEVENTHS_PER_ANIMAL
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;

    fn animal(kind: AnimalKind, price: i64, is_private: bool) -> Animal {
        Animal {
            id: Uuid::new_v4(),
            kind,
            weight: Decimal::from(300),
            price: Decimal::from(price),
            is_private,
            registered_on: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn share(animal: &Animal, donor_id: Uuid, sevenths: i16) -> OwnershipShare {
        OwnershipShare {
            donor_id,
            animal_id: animal.id,
            porsi_sevenths: sevenths,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn assert_capacity_exceeded(result: Result<(), AppError>) {
        assert!(matches!(result, Err(AppError::CapacityExceeded(_))), "got {:?}", result);
    }

    #[test]
    fn sapi_porsi_is_headcount_sevenths() {
        let sapi = animal(AnimalKind::Sapi, 7_000_000, false);
        for h in 1..=7 {
            assert_eq!(porsi_for(&sapi, Some(h)).unwrap().sevenths(), h);
        }
        assert!(matches!(porsi_for(&sapi, Some(0)), Err(AppError::Validation(_))));
        assert!(matches!(porsi_for(&sapi, Some(8)), Err(AppError::Validation(_))));
        assert!(matches!(porsi_for(&sapi, None), Err(AppError::Validation(_))));
    }

    #[test]
    fn goat_class_is_always_whole() {
        for kind in [AnimalKind::Kambing, AnimalKind::Domba] {
            let goat = animal(kind, 3_000_000, false);
            assert_eq!(porsi_for(&goat, Some(1)).unwrap(), Porsi::WHOLE);
            assert_eq!(porsi_for(&goat, None).unwrap(), Porsi::WHOLE);
            assert!(matches!(porsi_for(&goat, Some(2)), Err(AppError::Validation(_))));
        }
    }

    #[test]
    fn private_animal_requires_whole_porsi() {
        let private = animal(AnimalKind::Sapi, 0, true);
        assert_eq!(porsi_for(&private, None).unwrap(), Porsi::WHOLE);
        assert_eq!(porsi_for(&private, Some(7)).unwrap(), Porsi::WHOLE);
        assert!(matches!(porsi_for(&private, Some(3)), Err(AppError::Validation(_))));
    }

    #[test]
    fn shared_sapi_fills_to_exactly_one_then_rejects() {
        let a = animal(AnimalKind::Sapi, 7_000_000, false);
        let (x, y, z) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

        let px = porsi_for(&a, Some(3)).unwrap();
        ensure_capacity(&a, &[], x, px, LedgerMutation::Create).unwrap();
        let mut ledger = vec![share(&a, x, px.sevenths())];

        let py = porsi_for(&a, Some(4)).unwrap();
        ensure_capacity(&a, &ledger, y, py, LedgerMutation::Create).unwrap();
        ledger.push(share(&a, y, py.sevenths()));

        let total: i16 = ledger.iter().map(|s| s.porsi_sevenths).sum();
        assert_eq!(total, SEVENTHS_PER_ANIMAL);

        let pz = porsi_for(&a, Some(1)).unwrap();
        assert_capacity_exceeded(ensure_capacity(&a, &ledger, z, pz, LedgerMutation::Create));
    }

    #[test]
    fn second_owner_of_private_animal_conflicts() {
        let b = animal(AnimalKind::Sapi, 0, true);
        let (x, y) = (Uuid::new_v4(), Uuid::new_v4());

        let px = porsi_for(&b, None).unwrap();
        ensure_capacity(&b, &[], x, px, LedgerMutation::Create).unwrap();
        let ledger = vec![share(&b, x, px.sevenths())];

        let py = porsi_for(&b, None).unwrap();
        let result = ensure_capacity(&b, &ledger, y, py, LedgerMutation::Create);
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[test]
    fn second_owner_of_goat_exceeds_capacity() {
        let goat = animal(AnimalKind::Kambing, 3_000_000, false);
        let ledger = vec![share(&goat, Uuid::new_v4(), 7)];
        assert_capacity_exceeded(ensure_capacity(
            &goat,
            &ledger,
            Uuid::new_v4(),
            Porsi::WHOLE,
            LedgerMutation::Create,
        ));
    }

    #[test]
    fn replace_excludes_own_share_from_sum() {
        let a = animal(AnimalKind::Sapi, 7_000_000, false);
        let (x, y) = (Uuid::new_v4(), Uuid::new_v4());
        let ledger = vec![share(&a, x, 3), share(&a, y, 4)];

        // x goes from 3 to 2: fits only if its own 3 is not counted again
        let p = porsi_for(&a, Some(2)).unwrap();
        ensure_capacity(&a, &ledger, x, p, LedgerMutation::Replace).unwrap();

        // x back to 3 is a no-op in total
        let p = porsi_for(&a, Some(3)).unwrap();
        ensure_capacity(&a, &ledger, x, p, LedgerMutation::Replace).unwrap();

        let p = porsi_for(&a, Some(4)).unwrap();
        assert_capacity_exceeded(ensure_capacity(&a, &ledger, x, p, LedgerMutation::Replace));
    }

    #[test]
    fn replace_of_private_owner_keeps_single_owner() {
        let b = animal(AnimalKind::Sapi, 0, true);
        let x = Uuid::new_v4();
        let ledger = vec![share(&b, x, 7)];
        ensure_capacity(&b, &ledger, x, Porsi::WHOLE, LedgerMutation::Replace).unwrap();
    }

    #[test]
    fn duplicate_create_conflicts_and_missing_replace_is_not_found() {
        let a = animal(AnimalKind::Sapi, 7_000_000, false);
        let x = Uuid::new_v4();
        let ledger = vec![share(&a, x, 1)];
        let p = porsi_for(&a, Some(1)).unwrap();

        assert!(matches!(
            ensure_capacity(&a, &ledger, x, p, LedgerMutation::Create),
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            ensure_capacity(&a, &ledger, Uuid::new_v4(), p, LedgerMutation::Replace),
            Err(AppError::NotFound(_))
        ));
    }
}
