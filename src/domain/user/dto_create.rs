use chrono::NaiveDate;

/// Country reference carried by a creation request: either an existing id,
/// or a (name, code) pair to find-or-create.
#[derive(Debug, Clone)]
pub struct CountryRef {
    pub id: Option<i64>,
    pub country_name: String,
    pub code: String,
}

#[derive(Debug, Clone)]
pub struct CreateUserDto {
    pub email: String,
    pub username: String,
    /// Already encoded by the password encoding strategy when it reaches
    /// the repository.
    pub password: String,
    pub firstname: String,
    pub lastname: String,
    pub birthdate: Option<NaiveDate>,
    pub phone_number: Option<String>,
    pub profile_image: Option<String>,
    pub country: CountryRef,
}
