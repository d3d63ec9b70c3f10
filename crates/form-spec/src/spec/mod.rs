pub mod form;
pub mod question;

pub use form::{FontChoice, FormRecord, FormStyle, PublishState, PublishStatus, clamp_title};
pub use question::{FileRef, Question, QuestionId, QuestionKind, QuestionPatch};
