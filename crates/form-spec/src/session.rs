use chrono::{DateTime, Utc};
use tracing::debug;

use crate::answers::AnswerRecord;
use crate::config::EngineConfig;
use crate::editor::{Direction, EditError, QuestionList};
use crate::embed::{EmbedError, EmbedMode, EmbedSize, embed_code};
use crate::publish::{PublishError, PublishManager, PublishTicket, PublishedSnapshot};
use crate::share::{ShareLink, SocialNetwork};
use crate::spec::form::{FormRecord, FormStyle, clamp_title};
use crate::spec::question::{FileRef, Question, QuestionId, QuestionPatch};
use crate::stats::{Baseline, ResponseReport, build_report};
use crate::store::{FormStore, StoreError};

/// Editing state of one form, owned by the caller for the length of an
/// editing session. Every content edit marks the form as having a draft.
#[derive(Debug, Clone)]
pub struct FormEditingSession {
    id: String,
    owner_id: String,
    title: String,
    created_at: DateTime<Utc>,
    style: FormStyle,
    share: ShareLink,
    questions: QuestionList,
    publisher: PublishManager,
    config: EngineConfig,
}

impl FormEditingSession {
    /// Opens a stored form. Fails when the stored question list is
    /// inconsistent. A missing share link is derived from the form id, so
    /// reopening the same record yields the same link.
    pub fn open(record: FormRecord, config: EngineConfig) -> Result<Self, EditError> {
        let questions = QuestionList::try_from_questions(record.questions)?;
        let share = record
            .share
            .unwrap_or_else(|| ShareLink::for_form(&record.id, &record.title, &config));
        let publisher = PublishManager::restore(&record.publish_state, record.published);
        debug!(form_id = %record.id, slug = %share.slug, "opened editing session");
        Ok(Self {
            id: record.id,
            owner_id: record.owner_id,
            title: record.title,
            created_at: record.created_at,
            style: record.style,
            share,
            questions,
            publisher,
            config,
        })
    }

    /// Starts a brand-new form for `owner_id` with the default questions and
    /// a freshly generated share link.
    pub fn create(owner_id: &str, title: &str, config: EngineConfig) -> Self {
        let record = FormRecord::new(owner_id, title);
        let share = ShareLink::generate(&record.title, &config);
        debug!(form_id = %record.id, slug = %share.slug, "created form");
        Self {
            id: record.id,
            owner_id: record.owner_id,
            title: record.title,
            created_at: record.created_at,
            style: record.style,
            share,
            questions: QuestionList::default(),
            publisher: PublishManager::default(),
            config,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn style(&self) -> &FormStyle {
        &self.style
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn questions(&self) -> &QuestionList {
        &self.questions
    }

    pub fn share_link(&self) -> &ShareLink {
        &self.share
    }

    pub fn publisher(&self) -> &PublishManager {
        &self.publisher
    }

    /// Snapshot served by the public link, if the form was ever published.
    pub fn published(&self) -> Option<&PublishedSnapshot> {
        self.publisher.snapshot()
    }

    /// Current state in its stored shape.
    pub fn to_record(&self) -> FormRecord {
        FormRecord {
            id: self.id.clone(),
            owner_id: self.owner_id.clone(),
            title: self.title.clone(),
            questions: self.questions.questions().to_vec(),
            publish_state: self.publisher.state(),
            share: Some(self.share.clone()),
            style: self.style.clone(),
            published: self.publisher.snapshot().cloned(),
            created_at: self.created_at,
        }
    }

    fn touched<T>(&mut self, result: Result<T, EditError>) -> Result<T, EditError> {
        if result.is_ok() {
            self.publisher.note_edit();
        }
        result
    }

    /// Renames the form; the share link keeps the slug it was created with.
    pub fn set_title(&mut self, title: &str) {
        self.title = clamp_title(title);
        self.publisher.note_edit();
    }

    pub fn set_style(&mut self, style: FormStyle) {
        self.style = style;
        self.publisher.note_edit();
    }

    pub fn create_and_append(&mut self) -> QuestionId {
        let id = self.questions.create_and_append();
        self.publisher.note_edit();
        id
    }

    pub fn create_and_insert_after(&mut self, index: isize) -> Result<QuestionId, EditError> {
        let result = self.questions.create_and_insert_after(index);
        self.touched(result)
    }

    pub fn move_question(&mut self, index: usize, direction: Direction) -> bool {
        let moved = self.questions.move_question(index, direction);
        if moved {
            self.publisher.note_edit();
        }
        moved
    }

    pub fn remove(&mut self, id: &QuestionId) -> Result<Question, EditError> {
        let result = self.questions.remove(id);
        self.touched(result)
    }

    pub fn remove_active(&mut self) -> Result<Question, EditError> {
        let id = self.questions.active_id().clone();
        self.remove(&id)
    }

    pub fn select(&mut self, id: &QuestionId) -> Result<(), EditError> {
        self.questions.select(id)
    }

    pub fn select_next(&mut self) {
        self.questions.select_next();
    }

    pub fn select_previous(&mut self) {
        self.questions.select_previous();
    }

    pub fn update(&mut self, id: &QuestionId, patch: QuestionPatch) -> Result<(), EditError> {
        let result = self.questions.update(id, patch);
        self.touched(result)
    }

    pub fn update_active(&mut self, patch: QuestionPatch) -> Result<(), EditError> {
        let id = self.questions.active_id().clone();
        self.update(&id, patch)
    }

    pub fn add_option(&mut self, id: &QuestionId, text: &str) -> Result<(), EditError> {
        let result = self.questions.add_option(id, text);
        self.touched(result)
    }

    pub fn remove_option(&mut self, id: &QuestionId, index: usize) -> Result<String, EditError> {
        let result = self.questions.remove_option(id, index);
        self.touched(result)
    }

    pub fn update_option(
        &mut self,
        id: &QuestionId,
        index: usize,
        text: &str,
    ) -> Result<(), EditError> {
        let result = self.questions.update_option(id, index, text);
        self.touched(result)
    }

    pub fn attach_file(&mut self, id: &QuestionId, file: FileRef) -> Result<(), EditError> {
        let result = self.questions.attach_file(id, file);
        self.touched(result)
    }

    /// Only an actual removal marks a draft.
    pub fn detach_file(&mut self, id: &QuestionId) -> Result<Option<FileRef>, EditError> {
        let removed = self.questions.detach_file(id)?;
        if removed.is_some() {
            self.publisher.note_edit();
        }
        Ok(removed)
    }

    /// First half of a publish for hosts that persist asynchronously. The
    /// ticket's record is what must be saved.
    pub fn begin_publish(&mut self) -> Result<PublishTicket, PublishError> {
        let record = self.to_record();
        self.publisher.begin(record)
    }

    /// Second half of a publish, fed with the outcome of the save.
    pub fn finish_publish(
        &mut self,
        ticket: PublishTicket,
        outcome: Result<(), StoreError>,
    ) -> Result<&PublishedSnapshot, PublishError> {
        self.publisher.finish(ticket, outcome)
    }

    /// Publishes through `store` in one call. A failed save leaves the prior
    /// state in place; retrying reuses the same share link.
    pub fn request_publish(
        &mut self,
        store: &dyn FormStore,
    ) -> Result<&PublishedSnapshot, PublishError> {
        let ticket = self.begin_publish()?;
        let outcome = store.save(ticket.record());
        self.finish_publish(ticket, outcome)
    }

    /// Saves the current draft without publishing it.
    pub fn save_draft(&self, store: &dyn FormStore) -> Result<(), StoreError> {
        store.save(&self.to_record())
    }

    pub fn embed_code(&self, mode: EmbedMode, size: &EmbedSize) -> Result<String, EmbedError> {
        embed_code(&self.share.url, mode, size, &self.style)
    }

    pub fn social_share_url(&self, network: SocialNetwork) -> String {
        network.share_url(&self.share.url, &self.title)
    }

    /// Response report for the current question list.
    pub fn report(&self, records: &[AnswerRecord], baseline: Baseline) -> ResponseReport {
        build_report(self.questions.questions(), records, baseline, &self.config)
    }
}
