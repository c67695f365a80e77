//! External service integrations.

pub mod identity;
pub mod pdf;
pub mod recaptcha;
pub mod whatsapp;

pub use identity::{FirebaseTokenVerifier, StaticKeyVerifier};
pub use recaptcha::RecaptchaVerifier;
pub use whatsapp::build_notifier;
