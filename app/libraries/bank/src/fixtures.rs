use app_cryptography::hash::hash;
use app_schema::{
    auth::{
        staff::Staff,
        user::{AuthUser, Role},
    },
    customer::{Customer, CustomerStatus},
    identity::Identity,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

pub const PASSWORD: &str = "correct horse";

pub fn customer(id: i64, username: &str, status: CustomerStatus) -> Customer {
    Customer {
        id,
        username: username.to_owned(),
        email: format!("{username}@a2hl.test"),
        name: format!("{username} nguyen"),
        date_of_birth: NaiveDate::from_ymd_opt(1995, 6, 1).unwrap(),
        phone_number: format!("+8490000{id:04}"),
        address: "1 Le Loi, Hanoi".to_owned(),
        password_hash: String::new(),
        account_number: format!("1000000{id:05}"),
        balance: Decimal::ZERO,
        status,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// A customer who can log in with [`PASSWORD`] and holds `balance`.
pub fn funded_customer(id: i64, username: &str, balance: i64) -> Customer {
    Customer {
        password_hash: hash(PASSWORD).unwrap(),
        balance: Decimal::new(balance, 0),
        ..customer(id, username, CustomerStatus::Active)
    }
}

pub fn identity(id: i64, customer_id: i64) -> Identity {
    Identity {
        id,
        customer_id,
        identity_number: format!("0790{customer_id:08}"),
        registration_date: NaiveDate::from_ymd_opt(2015, 1, 1).unwrap(),
        front_image: "front.png".to_owned(),
        back_image: "back.png".to_owned(),
        staff_id_approved: None,
        approved_at: None,
        created_at: Utc::now(),
    }
}

pub fn staff() -> Staff {
    Staff {
        id: Uuid::new_v4(),
        username: "teller".to_owned(),
        email: "teller@a2hl.test".to_owned(),
        name: "Teller".to_owned(),
        password_hash: String::new(),
        created_at: Utc::now(),
    }
}

pub fn staff_actor(staff: &Staff) -> AuthUser {
    AuthUser {
        id: staff.id.to_string(),
        name: staff.name.clone(),
        email: staff.email.clone(),
        role: Role::Staff,
        session: 1,
    }
}

pub fn customer_actor(customer: &Customer) -> AuthUser {
    AuthUser {
        id: customer.id.to_string(),
        name: customer.name.clone(),
        email: customer.email.clone(),
        role: Role::Customer,
        session: 1,
    }
}
