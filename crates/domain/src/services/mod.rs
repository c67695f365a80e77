//! Domain services for the village portal.
//!
//! Services contain business logic over the store and verifier traits.

pub mod auth_gate;
pub mod captcha;
pub mod content;
pub mod letter_workflow;
pub mod notification;

pub use auth_gate::{
    AdminAllowList, AdminIdentity, AuthError, AuthGate, TokenVerificationError, TokenVerifier,
    VerifiedIdentity,
};
pub use captcha::{CaptchaError, CaptchaVerifier};
pub use content::{ContentError, ContentService, PublicContent};
pub use letter_workflow::{LetterWorkflow, WorkflowError, CONTACT_PHONE_FIELD};
pub use notification::{
    LetterFinishedNotice, MockNotificationService, NotificationResult, NotificationService,
};
