use serde::Deserialize;

/// A session issued by the server on login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginResult {
    pub token: String,
    pub user_id: String,
    pub expires_in: String,
}

/// Fields of the signup form.
#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Signup verdict. Flags the server omits count as valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SignupResult {
    pub success: bool,
    #[serde(rename = "isNameValid")]
    pub is_name_valid: bool,
    #[serde(rename = "isEmailValid")]
    pub is_email_valid: bool,
    #[serde(rename = "isPasswordValid")]
    pub is_password_valid: bool,
    #[serde(rename = "isConfirmPasswordValid")]
    pub is_confirm_password_valid: bool,
    #[serde(rename = "userExists")]
    pub user_exists: bool,
}

impl Default for SignupResult {
    fn default() -> Self {
        Self {
            success: false,
            is_name_valid: true,
            is_email_valid: true,
            is_password_valid: true,
            is_confirm_password_valid: true,
            user_exists: false,
        }
    }
}

impl SignupResult {
    pub fn field_errors(&self) -> Vec<&'static str> {
        let mut errors = Vec::new();
        if self.user_exists {
            errors.push("An account with this email already exists");
        }
        if !self.is_name_valid {
            errors.push("Name is required");
        }
        if !self.is_email_valid {
            errors.push("Enter a valid email address");
        }
        if !self.is_password_valid {
            errors.push("Password must be at least 5 characters");
        }
        if !self.is_confirm_password_valid {
            errors.push("Passwords do not match");
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signup_result_errors() {
        let result: SignupResult =
            serde_json::from_str(r#"{"success": false, "userExists": true, "isPasswordValid": false}"#)
                .unwrap();
        assert_eq!(
            result.field_errors(),
            vec![
                "An account with this email already exists",
                "Password must be at least 5 characters"
            ]
        );
    }

    #[test]
    fn test_signup_success_has_no_errors() {
        let result: SignupResult = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(result.success);
        assert!(result.field_errors().is_empty());
    }
}
