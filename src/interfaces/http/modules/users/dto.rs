//! User transfer representations

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::domain::{Country, CountryRef, CreateUserDto, User};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CountryDto {
    pub id: i64,
    pub country_name: String,
    pub code: String,
}

impl From<Country> for CountryDto {
    fn from(c: Country) -> Self {
        Self {
            id: c.id,
            country_name: c.country_name,
            code: c.code,
        }
    }
}

/// User API representation. The stored password hash and the enabled flag
/// stay behind the boundary.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub firstname: String,
    pub lastname: String,
    pub birthdate: Option<NaiveDate>,
    pub phone_number: Option<String>,
    pub profile_image: Option<String>,
    pub country: Option<CountryDto>,
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            username: u.username,
            firstname: u.firstname,
            lastname: u.lastname,
            birthdate: u.birthdate,
            phone_number: u.phone_number,
            profile_image: u.profile_image,
            country: u.country.map(CountryDto::from),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CountryRequest {
    /// Existing country id; name and code are used to find-or-create
    /// when absent.
    pub id: Option<i64>,
    #[validate(length(min = 1, message = "must not be blank"))]
    pub country_name: String,
    #[validate(length(min = 1, message = "must not be blank"))]
    pub code: String,
}

/// Create user request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "must not be blank"))]
    pub username: String,
    #[validate(length(min = 1, message = "must not be blank"))]
    pub password: String,
    #[validate(length(min = 1, message = "must not be blank"))]
    pub firstname: String,
    #[validate(length(min = 1, message = "must not be blank"))]
    pub lastname: String,
    #[validate(custom(function = past_or_present))]
    pub birthdate: Option<NaiveDate>,
    pub phone_number: Option<String>,
    pub profile_image: Option<String>,
    #[validate(nested)]
    pub country: CountryRequest,
}

fn past_or_present(birthdate: &NaiveDate) -> Result<(), ValidationError> {
    if *birthdate > Utc::now().date_naive() {
        let mut err = ValidationError::new("past_or_present");
        err.message = Some("must be in the past or present".into());
        return Err(err);
    }
    Ok(())
}

impl From<CreateUserRequest> for CreateUserDto {
    fn from(r: CreateUserRequest) -> Self {
        Self {
            email: r.email,
            username: r.username,
            password: r.password,
            firstname: r.firstname,
            lastname: r.lastname,
            birthdate: r.birthdate,
            phone_number: r.phone_number,
            profile_image: r.profile_image,
            country: CountryRef {
                id: r.country.id,
                country_name: r.country.country_name,
                code: r.country.code,
            },
        }
    }
}

/// Query parameters for the status toggle endpoint
#[derive(Debug, Deserialize, IntoParams)]
pub struct ToggleParams {
    /// True to enable the user, false to disable
    pub enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn request() -> CreateUserRequest {
        CreateUserRequest {
            email: "user@gmail.com".into(),
            username: "user".into(),
            password: "password".into(),
            firstname: "Javier".into(),
            lastname: "Gonzalez".into(),
            birthdate: Some(Utc::now().date_naive()),
            phone_number: Some("1234567890".into()),
            profile_image: None,
            country: CountryRequest {
                id: None,
                country_name: "Mexico".into(),
                code: "MX".into(),
            },
        }
    }

    #[test]
    fn todays_birthdate_is_accepted() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn future_birthdate_is_rejected() {
        let mut req = request();
        req.birthdate = Some(Utc::now().date_naive() + Duration::days(1));
        assert!(req.validate().is_err());
    }

    #[test]
    fn blank_country_name_is_rejected() {
        let mut req = request();
        req.country.country_name = "".into();
        assert!(req.validate().is_err());
    }

    #[test]
    fn camel_case_wire_format() {
        let user = UserDto {
            id: 1,
            email: "user@gmail.com".into(),
            username: "user".into(),
            firstname: "Javier".into(),
            lastname: "Gonzalez".into(),
            birthdate: None,
            phone_number: Some("1234567890".into()),
            profile_image: Some("path".into()),
            country: Some(CountryDto {
                id: 1,
                country_name: "Mexico".into(),
                code: "MX".into(),
            }),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("phoneNumber").is_some());
        assert!(json.get("profileImage").is_some());
        assert!(json["country"].get("countryName").is_some());
        // The hash never crosses the boundary: there is no such field at all.
        assert!(json.get("password").is_none());
        assert!(json.get("status").is_none());
    }
}
