//! The account signup form. Account creation itself belongs to an external
//! identity service, reached through the [`IdentityService`] trait; this
//! module owns only the local rules around it: the service must be available,
//! the email must be present, the password must be at least
//! [`MIN_PASSWORD_LENGTH`] characters, a submission makes at most one remote
//! call, and no second submission starts while one is in flight.

use std::cell::{Cell, RefCell};
use std::fmt;

/// The minimum password length, in characters, enforced before any remote
/// call.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// The opaque identifier of a newly created account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountId(pub String);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An error reported by the identity service. `code` may carry an `auth/`
/// prefix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteAuthError {
    pub code: String,
    pub message: String,
}

impl RemoteAuthError {
    pub fn new(code: &str, message: &str) -> RemoteAuthError {
        RemoteAuthError {
            code: code.to_owned(),
            message: message.to_owned(),
        }
    }
}

/// Creates accounts. Implementations talk to whatever backend holds the
/// accounts.
pub trait IdentityService {
    fn create_account(&self, email: &str, password: &str) -> Result<AccountId, RemoteAuthError>;
}

/// Why a submission did not create an account. The [`fmt::Display`] text is
/// shown to the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SignupError {
    ServiceUnavailable,
    EmailRequired,
    PasswordTooShort,
    InFlight,
    EmailAlreadyInUse,
    WeakPassword,
    InvalidEmail,

    /// Any service error with an unrecognized code, carrying its raw message.
    Failed(String),
}

impl From<RemoteAuthError> for SignupError {
    fn from(err: RemoteAuthError) -> SignupError {
        let code = err.code.trim_start_matches("auth/");
        match code {
            "email-already-in-use" => SignupError::EmailAlreadyInUse,
            "weak-password" => SignupError::WeakPassword,
            "invalid-email" => SignupError::InvalidEmail,
            _ => SignupError::Failed(err.message),
        }
    }
}

impl fmt::Display for SignupError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SignupError::ServiceUnavailable => {
                write!(f, "Authentication service is not ready. Please try again.")
            }
            SignupError::EmailRequired => write!(f, "Please enter your email address."),
            SignupError::PasswordTooShort => write!(
                f,
                "Password must be at least {} characters long.",
                MIN_PASSWORD_LENGTH
            ),
            SignupError::InFlight => write!(f, "A signup is already in progress."),
            SignupError::EmailAlreadyInUse => write!(
                f,
                "This email address is already in use. Try logging in instead."
            ),
            SignupError::WeakPassword => write!(
                f,
                "The password is too weak. Please use {} or more characters.",
                MIN_PASSWORD_LENGTH
            ),
            SignupError::InvalidEmail => write!(f, "The email address format is invalid."),
            SignupError::Failed(message) => write!(f, "Signup failed: {}", message),
        }
    }
}

impl std::error::Error for SignupError {}

/// A successful signup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignupSuccess {
    pub account: AccountId,
}

impl fmt::Display for SignupSuccess {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Success! Account created for user ID: {}.", self.account)
    }
}

/// The state of the form's submit control.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormStatus {
    /// No identity service is configured; submission is disabled.
    Unavailable,
    Ready,
    Submitting,
}

/// The signup form. `service` is `None` when no identity backend is
/// available.
pub struct SignupForm<'s> {
    service: Option<&'s dyn IdentityService>,
    in_flight: Cell<bool>,
}

impl<'s> SignupForm<'s> {
    pub fn new(service: Option<&'s dyn IdentityService>) -> SignupForm<'s> {
        SignupForm {
            service,
            in_flight: Cell::new(false),
        }
    }

    pub fn status(&self) -> FormStatus {
        if self.service.is_none() {
            FormStatus::Unavailable
        } else if self.in_flight.get() {
            FormStatus::Submitting
        } else {
            FormStatus::Ready
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.status() != FormStatus::Ready
    }

    pub fn button_label(&self) -> &'static str {
        match self.status() {
            FormStatus::Unavailable => "Loading Service...",
            FormStatus::Ready => "Sign Up",
            FormStatus::Submitting => "Signing Up...",
        }
    }

    /// Submits the form. Local checks run first; the identity service is
    /// called at most once, and only when they all pass.
    pub fn submit(&self, email: &str, password: &str) -> Result<SignupSuccess, SignupError> {
        if self.in_flight.get() {
            return Err(SignupError::InFlight);
        }
        let service = self.service.ok_or(SignupError::ServiceUnavailable)?;
        if email.trim().is_empty() {
            return Err(SignupError::EmailRequired);
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(SignupError::PasswordTooShort);
        }

        let _guard = InFlightGuard::set(&self.in_flight);
        log::debug!("creating account for {}", email);
        match service.create_account(email, password) {
            Ok(account) => {
                log::info!("created account {}", account);
                Ok(SignupSuccess { account })
            }
            Err(err) => {
                log::warn!("signup failed: {} ({})", err.code, err.message);
                Err(err.into())
            }
        }
    }
}

/// Holds the in-flight flag for the duration of a remote call and clears it
/// on every exit path.
struct InFlightGuard<'a>(&'a Cell<bool>);

impl<'a> InFlightGuard<'a> {
    fn set(flag: &'a Cell<bool>) -> InFlightGuard<'a> {
        flag.set(true);
        InFlightGuard(flag)
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// An in-process [`IdentityService`] for local development. Accounts live
/// only as long as the value.
#[derive(Default)]
pub struct MemoryIdentityService {
    accounts: RefCell<Vec<(String, AccountId)>>,
}

impl MemoryIdentityService {
    pub fn new() -> MemoryIdentityService {
        MemoryIdentityService::default()
    }

    pub fn len(&self) -> usize {
        self.accounts.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl IdentityService for MemoryIdentityService {
    fn create_account(&self, email: &str, password: &str) -> Result<AccountId, RemoteAuthError> {
        let (local, domain) = match email.find('@') {
            Some(i) => (&email[..i], &email[i + 1..]),
            None => ("", ""),
        };
        if local.is_empty() || domain.is_empty() || domain.contains('@') {
            return Err(RemoteAuthError::new(
                "auth/invalid-email",
                "The email address is badly formatted.",
            ));
        }
        if password.chars().count() < 6 {
            return Err(RemoteAuthError::new(
                "auth/weak-password",
                "Password should be at least 6 characters.",
            ));
        }

        let mut accounts = self.accounts.borrow_mut();
        if accounts.iter().any(|(e, _)| e.eq_ignore_ascii_case(email)) {
            return Err(RemoteAuthError::new(
                "auth/email-already-in-use",
                "The email address is already in use by another account.",
            ));
        }
        let id = AccountId(format!("local-{:06}", accounts.len() + 1));
        accounts.push((email.to_owned(), id.clone()));
        Ok(id)
    }
}
