use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    Login,
    Signup,
}

impl AuthMode {
    pub fn title(&self) -> &'static str {
        match self {
            AuthMode::Login => "Log In to Your Account",
            AuthMode::Signup => "Create a New Account",
        }
    }

    pub fn button_text(&self) -> &'static str {
        match self {
            AuthMode::Login => "Log In",
            AuthMode::Signup => "Create Account",
        }
    }

    pub fn shows_confirm_password(&self) -> bool {
        *self == AuthMode::Signup
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{}", missing_field_message(.0))]
    MissingField(AuthMode),

    #[error("Passwords do not match.")]
    PasswordMismatch,
}

fn missing_field_message(mode: &AuthMode) -> &'static str {
    match mode {
        AuthMode::Login => "Please enter both email and password.",
        AuthMode::Signup => "Please fill out all fields.",
    }
}

/// Emitted when the simulated backend accepts the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuccessEvent {
    pub mode: AuthMode,
    pub email: String,
}

/// Validate a submission. There is no credential check: anything that
/// passes validation is accepted.
pub fn submit(
    mode: AuthMode,
    email: &str,
    password: &str,
    confirm_password: &str,
) -> Result<SuccessEvent, ValidationError> {
    match mode {
        AuthMode::Login => {
            if email.is_empty() || password.is_empty() {
                return Err(ValidationError::MissingField(mode));
            }
            info!(%email, "simulating login");
        }
        AuthMode::Signup => {
            if email.is_empty() || password.is_empty() || confirm_password.is_empty() {
                return Err(ValidationError::MissingField(mode));
            }
            if password != confirm_password {
                return Err(ValidationError::PasswordMismatch);
            }
            info!(%email, "simulating account creation");
        }
    }

    Ok(SuccessEvent {
        mode,
        email: email.to_string(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthField {
    Email,
    Password,
    ConfirmPassword,
}

/// Login/signup form state
#[derive(Debug, Default)]
pub struct AuthForm {
    pub mode: AuthMode,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub error: Option<String>,
    focus: Option<AuthField>,
}

impl AuthForm {
    pub fn new() -> Self {
        Self {
            focus: Some(AuthField::Email),
            ..Self::default()
        }
    }

    pub fn select_login_tab(&mut self) {
        self.select(AuthMode::Login);
    }

    pub fn select_signup_tab(&mut self) {
        self.select(AuthMode::Signup);
    }

    pub fn select(&mut self, mode: AuthMode) {
        self.mode = mode;
        self.error = None;
        if !mode.shows_confirm_password() && self.focus == Some(AuthField::ConfirmPassword) {
            self.focus = Some(AuthField::Email);
        }
    }

    pub fn submit(&mut self) -> Result<SuccessEvent, ValidationError> {
        self.error = None;
        let result = submit(self.mode, &self.email, &self.password, &self.confirm_password);
        if let Err(e) = &result {
            self.error = Some(e.to_string());
        }
        result
    }

    pub fn focus(&self) -> Option<AuthField> {
        self.focus
    }

    /// Fields the current mode renders, in tab order
    pub fn fields(&self) -> Vec<AuthField> {
        let mut fields = vec![AuthField::Email, AuthField::Password];
        if self.mode.shows_confirm_password() {
            fields.push(AuthField::ConfirmPassword);
        }
        fields
    }

    pub fn focus_next(&mut self) {
        let fields = self.fields();
        let idx = self
            .focus
            .and_then(|f| fields.iter().position(|x| *x == f))
            .map(|i| (i + 1) % fields.len())
            .unwrap_or(0);
        self.focus = fields.get(idx).copied();
    }

    pub fn focus_prev(&mut self) {
        let fields = self.fields();
        let idx = self
            .focus
            .and_then(|f| fields.iter().position(|x| *x == f))
            .map(|i| (i + fields.len() - 1) % fields.len())
            .unwrap_or(0);
        self.focus = fields.get(idx).copied();
    }

    pub fn field_mut(&mut self, field: AuthField) -> &mut String {
        match field {
            AuthField::Email => &mut self.email,
            AuthField::Password => &mut self.password,
            AuthField::ConfirmPassword => &mut self.confirm_password,
        }
    }

    pub fn insert_char(&mut self, c: char) {
        if let Some(field) = self.focus {
            self.field_mut(field).push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(field) = self.focus {
            self.field_mut(field).pop();
        }
    }
}
