#![allow(missing_docs)]

pub mod answers;
pub mod config;
pub mod contract;
pub mod editor;
pub mod embed;
pub mod publish;
pub mod render;
pub mod schema;
pub mod session;
pub mod share;
pub mod spec;
pub mod stats;
pub mod store;

pub use answers::AnswerRecord;
pub use config::{ConfigError, EngineConfig};
pub use contract::{Affordance, AnswerFormat, KindContract, OwnedFields, contract};
pub use editor::{Direction, EditError, QuestionList, default_questions};
pub use embed::{Dimension, EmbedError, EmbedMode, EmbedSize, Unit, embed_code};
pub use publish::{PublishError, PublishManager, PublishPhase, PublishTicket, PublishedSnapshot};
pub use render::{OutlineEntry, PreviewPayload, build_preview, outline, render_json_ui, render_text};
pub use schema::{answer_record_schema, form_record_schema, published_snapshot_schema};
pub use session::FormEditingSession;
pub use share::{ShareLink, SocialNetwork, derive_slug};
pub use spec::{
    FileRef, FontChoice, FormRecord, FormStyle, PublishState, PublishStatus, Question, QuestionId,
    QuestionKind, QuestionPatch,
};
pub use stats::{
    Baseline, IndividualTable, QuestionSummary, ResponseBody, ResponseReport, ResponseStats,
    SummaryBody, build_report, completion_rate,
};
pub use store::{FormStore, JsonDirStore, MemoryStore, StoreError};
