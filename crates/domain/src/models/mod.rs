//! Domain models for the village portal.

pub mod content;
pub mod letter_fields;
pub mod letter_request;
pub mod letter_type;

pub use content::{
    merge_patch, BudgetLine, BudgetPayload, BudgetSection, BusinessPayload, ContentEntity,
    ContentKind, ContentPayload, CountEntry, DemographicPayload, GalleryPayload, NewContentEntity,
    NewsPayload, PhotoItem, StructureMemberPayload, SubAreaPayload, UnknownContentKind, VideoItem,
    MAX_BUDGET_AMOUNT,
};
pub use letter_fields::{Applicant, DocumentRow, LetterFields, Sex};
pub use letter_request::{
    LetterRequest, LetterRequestUpdate, LetterStatus, LetterSubmission, NewLetterRequest,
    PendingCount, StatusFilter, SubmitLetterResponse,
};
pub use letter_type::{LetterType, LetterTypeDescriptor, UnknownLetterType, LETTER_TYPES};
