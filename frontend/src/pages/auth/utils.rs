use leptos::*;

pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AuthTab {
    #[default]
    SignIn,
    SignUp,
}

#[derive(Clone, Copy)]
pub struct AuthFormState {
    pub email: RwSignal<String>,
    pub password: RwSignal<String>,
    pub full_name: RwSignal<String>,
    pub tab: RwSignal<AuthTab>,
}

impl Default for AuthFormState {
    fn default() -> Self {
        Self {
            email: create_rw_signal(String::new()),
            password: create_rw_signal(String::new()),
            full_name: create_rw_signal(String::new()),
            tab: create_rw_signal(AuthTab::default()),
        }
    }
}

pub fn validate_sign_in(email: &str, password: &str) -> Result<(), String> {
    if email.trim().is_empty() {
        return Err("Please enter your email address".into());
    }
    if password.is_empty() {
        return Err("Please enter your password".into());
    }
    Ok(())
}

pub fn validate_sign_up(email: &str, password: &str, full_name: &str) -> Result<(), String> {
    if full_name.trim().is_empty() {
        return Err("Please enter your full name".into());
    }
    validate_sign_in(email, password)?;
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_in_requires_email_and_password() {
        assert!(validate_sign_in("", "secret").is_err());
        assert!(validate_sign_in("   ", "secret").is_err());
        assert!(validate_sign_in("jane@example.ca", "").is_err());
        assert!(validate_sign_in("jane@example.ca", "ab").is_ok());
    }

    #[test]
    fn sign_up_enforces_minimum_password_length() {
        assert_eq!(
            validate_sign_up("new@user.com", "ab", "Jane Doe"),
            Err("Password must be at least 6 characters long".to_string())
        );
        assert_eq!(
            validate_sign_up("new@user.com", "abcde", "Jane Doe"),
            Err("Password must be at least 6 characters long".to_string())
        );
        assert_eq!(validate_sign_up("new@user.com", "abcdef", "Jane Doe"), Ok(()));
    }

    #[test]
    fn sign_up_requires_full_name() {
        assert_eq!(
            validate_sign_up("new@user.com", "abcdef", "  "),
            Err("Please enter your full name".to_string())
        );
    }
}
