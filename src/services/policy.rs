// src/services/policy.rs
//
// Who may create shares and payments on behalf of a donor.

use crate::{
    common::error::AppError,
    models::{
        auth::{Role, User},
        donor::Donor,
    },
};

/// admin: any donor. panitia: offline donors only. user: its own donor only.
pub fn ensure_can_act_for_donor(actor: &User, donor: &Donor) -> Result<(), AppError> {
    match actor.role {
        Role::Admin => Ok(()),
        Role::Panitia => {
            if donor.is_offline() {
                Ok(())
            } else {
                Err(AppError::Forbidden(
                    "Panitia may only act for donors without a user account".into(),
                ))
            }
        }
        Role::User => {
            if donor.user_id == Some(actor.id) {
                Ok(())
            } else {
                Err(AppError::Forbidden("You may only act for your own donor record".into()))
            }
        }
    }
}

/// Read access to a donor's records: staff see everyone, users see themselves.
pub fn ensure_can_view_donor(actor: &User, donor: &Donor) -> Result<(), AppError> {
    match actor.role {
        Role::Admin | Role::Panitia => Ok(()),
        Role::User if donor.user_id == Some(actor.id) => Ok(()),
        Role::User => Err(AppError::Forbidden("You may only view your own donor record".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn user(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            username: "budi".into(),
            name: "Budi".into(),
            email: "budi@example.com".into(),
            password_hash: String::new(),
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn donor(user_id: Option<Uuid>) -> Donor {
        Donor {
            id: Uuid::new_v4(),
            user_id,
            name: Some("Budi".into()),
            phone: Some("0812".into()),
            email: Some("budi@example.com".into()),
            address: Some("Jl. Melati 1".into()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn admin_may_act_for_anyone() {
        let admin = user(Role::Admin);
        assert!(ensure_can_act_for_donor(&admin, &donor(None)).is_ok());
        assert!(ensure_can_act_for_donor(&admin, &donor(Some(Uuid::new_v4()))).is_ok());
    }

    #[test]
    fn panitia_only_for_offline_donors() {
        let panitia = user(Role::Panitia);
        assert!(ensure_can_act_for_donor(&panitia, &donor(None)).is_ok());
        assert!(matches!(
            ensure_can_act_for_donor(&panitia, &donor(Some(Uuid::new_v4()))),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn user_only_for_self() {
        let me = user(Role::User);
        assert!(ensure_can_act_for_donor(&me, &donor(Some(me.id))).is_ok());
        assert!(matches!(
            ensure_can_act_for_donor(&me, &donor(Some(Uuid::new_v4()))),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            ensure_can_act_for_donor(&me, &donor(None)),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn staff_may_view_any_donor() {
        let other = donor(Some(Uuid::new_v4()));
        assert!(ensure_can_view_donor(&user(Role::Panitia), &other).is_ok());
        assert!(ensure_can_view_donor(&user(Role::User), &other).is_err());
    }
}
