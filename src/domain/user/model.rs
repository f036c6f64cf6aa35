//! User aggregate domain model

use chrono::NaiveDate;

/// A role string granted to a user, used for authorization decisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authority {
    pub id: i64,
    pub authority: String,
    pub create_at: NaiveDate,
    pub update_at: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Country {
    pub id: i64,
    pub country_name: String,
    pub code: String,
    pub create_at: NaiveDate,
    pub update_at: NaiveDate,
}

/// User domain model.
///
/// `password_hash` holds the tagged hash produced by the delegating
/// password encoder; it never crosses the API boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub firstname: String,
    pub lastname: String,
    pub birthdate: Option<NaiveDate>,
    pub phone_number: Option<String>,
    pub profile_image: Option<String>,
    pub status: bool,
    pub authorities: Vec<Authority>,
    pub country: Option<Country>,
    pub status_change_at: NaiveDate,
    pub create_at: NaiveDate,
    pub update_at: NaiveDate,
    pub last_login: Option<NaiveDate>,
}

impl User {
    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.iter().any(|a| a.authority == authority)
    }
}
