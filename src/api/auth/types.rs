use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

/// Minimum password length in characters / 密码最小长度
pub const MIN_PASSWORD_LEN: usize = 6;

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        match self.email.trim().split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
            _ => return Err("Invalid email address"),
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err("Password must be at least 6 characters");
        }
        if self.password != self.password_confirmation {
            return Err("Password confirmation does not match");
        }
        Ok(())
    }
}
