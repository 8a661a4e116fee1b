use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    models::usermodel::{User, UserRole},
    utils::currency::paise_to_rupees,
};

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct RegisterUserDto {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(length(min = 3, message = "Username must be at least 3 characters"))]
    pub username: String,

    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Email is invalid")
    )]
    pub email: String,

    #[validate(length(min = 10, max = 20, message = "Phone number must be between 10-20 characters"))]
    pub phone: Option<String>,

    #[validate(length(min = 1, message = "State is required"))]
    pub state: String,

    #[validate(
        length(min = 1, message = "Password is required"),
        length(min = 8, message = "Password must be at least 8 characters")
    )]
    pub password: String,

    #[validate(
        length(min = 1, message = "Confirm Password is required"),
        must_match(other = "password", message = "passwords do not match")
    )]
    #[serde(rename = "passwordConfirm")]
    pub password_confirm: String,

    /// Referral code of the user who invited this one, if any.
    pub referral_code: Option<String>,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct LoginUserDto {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(
        length(min = 1, message = "Password is required"),
        length(min = 8, message = "Password must be at least 8 characters")
    )]
    pub password: String,
}

/// User projection returned to the client; never includes the password hash.
#[derive(Debug, Serialize, Deserialize)]
pub struct FilterUserDto {
    pub id: String,
    pub name: String,
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    pub state: String,
    pub role: String,
    pub referral_code: String,
    pub referred_by: Option<String>,
    pub rank: String,
    pub balance: f64,
    pub total_payout: f64,
    pub total_commission_earned: f64,
    pub referral_count: i32,
    pub team_size: i32,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl FilterUserDto {
    pub fn filter_user(user: &User) -> Self {
        FilterUserDto {
            id: user.id.to_string(),
            name: user.name.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            state: user.state.clone(),
            role: user.role.to_str().to_string(),
            referral_code: user.referral_code.clone(),
            referred_by: user.referred_by.clone(),
            rank: user.rank.clone(),
            balance: paise_to_rupees(user.balance),
            total_payout: paise_to_rupees(user.total_payout),
            total_commission_earned: paise_to_rupees(user.total_commission_earned),
            referral_count: user.referral_count,
            team_size: user.team_size,
            created_at: user.created_at,
        }
    }

    pub fn filter_users(users: &[User]) -> Vec<FilterUserDto> {
        users.iter().map(FilterUserDto::filter_user).collect()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserData {
    pub user: FilterUserDto,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponseDto {
    pub status: String,
    pub data: UserData,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserListResponseDto {
    pub status: String,
    pub users: Vec<FilterUserDto>,
    pub results: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserLoginResponseDto {
    pub status: String,
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Response {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UsernameAvailabilityDto {
    pub available: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleUpdateDto {
    pub role: UserRole,
}
