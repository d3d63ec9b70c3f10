use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::contract::contract;
use crate::spec::question::{FileRef, Question, QuestionId, QuestionKind, QuestionPatch};

/// Title given to questions created by the editor.
pub const NEW_QUESTION_TITLE: &str = "Nova pergunta...";

/// Failures of question list operations. A failed operation leaves the list
/// and the cursor untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("question '{0}' was not found")]
    NotFound(QuestionId),
    #[error("index {index} is out of range for {len} entries")]
    OutOfRange { index: isize, len: usize },
    #[error("cannot remove the only question")]
    LastQuestion,
    #[error("{kind} questions have no {field}")]
    FieldNotOwned {
        kind: QuestionKind,
        field: &'static str,
    },
    #[error("the form already has a {0} step")]
    DuplicateStructural(QuestionKind),
    #[error("a {0} step must be the {slot} question", slot = required_slot(.0))]
    MisplacedStructural(QuestionKind),
    #[error("question id '{0}' appears more than once")]
    DuplicateId(QuestionId),
}

fn required_slot(kind: &QuestionKind) -> &'static str {
    if *kind == QuestionKind::Welcome {
        "first"
    } else {
        "last"
    }
}

/// Welcome and thank-you steps are pinned to the first and last slot.
fn is_pinned(kind: QuestionKind) -> bool {
    matches!(kind, QuestionKind::Welcome | QuestionKind::ThankYou)
}

fn check_slot(kind: QuestionKind, index: usize, len: usize) -> Result<(), EditError> {
    let misplaced = match kind {
        QuestionKind::Welcome => index != 0,
        QuestionKind::ThankYou => index + 1 != len,
        _ => false,
    };
    if misplaced {
        Err(EditError::MisplacedStructural(kind))
    } else {
        Ok(())
    }
}

/// Checks a loaded list: unique ids, at most one welcome and one thank-you
/// step, each in its pinned slot.
fn validate_list(questions: &[Question]) -> Result<(), EditError> {
    let mut ids = HashSet::new();
    let mut pinned = HashSet::new();
    for question in questions {
        if !ids.insert(&question.id) {
            return Err(EditError::DuplicateId(question.id.clone()));
        }
        if is_pinned(question.kind) && !pinned.insert(question.kind) {
            return Err(EditError::DuplicateStructural(question.kind));
        }
    }
    questions
        .iter()
        .enumerate()
        .try_for_each(|(index, question)| check_slot(question.kind, index, questions.len()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

/// Questions seeded into a form that has none yet.
pub fn default_questions() -> Vec<Question> {
    vec![
        Question::new("1".into(), QuestionKind::ProperName, "Qual é o seu nome?")
            .with_required(true),
        Question::new("2".into(), QuestionKind::Email, "Qual seu melhor e-mail?")
            .with_required(true),
        Question::new(
            "3".into(),
            QuestionKind::SatisfactionScale,
            "Como você avalia nosso serviço?",
        ),
        Question::new("end".into(), QuestionKind::ThankYou, "Obrigado por participar!"),
    ]
}

/// Ordered, never-empty list of questions plus the active-question cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionList {
    questions: Vec<Question>,
    active: QuestionId,
}

impl Default for QuestionList {
    fn default() -> Self {
        Self::seeded(default_questions())
    }
}

impl QuestionList {
    /// Wraps stored `questions`, seeding the default form when it is empty.
    /// The cursor starts on the first question.
    pub fn try_from_questions(questions: Vec<Question>) -> Result<Self, EditError> {
        if questions.is_empty() {
            return Ok(Self::default());
        }
        validate_list(&questions)?;
        Ok(Self::seeded(questions))
    }

    fn seeded(mut questions: Vec<Question>) -> Self {
        for question in &mut questions {
            question.reshape();
        }
        let active = questions[0].id.clone();
        Self { questions, active }
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn into_questions(self) -> Vec<Question> {
        self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Question> {
        self.questions.iter()
    }

    pub fn get(&self, id: &QuestionId) -> Option<&Question> {
        self.questions.iter().find(|question| &question.id == id)
    }

    pub fn position(&self, id: &QuestionId) -> Option<usize> {
        self.questions.iter().position(|question| &question.id == id)
    }

    pub fn active_id(&self) -> &QuestionId {
        &self.active
    }

    pub fn active_index(&self) -> usize {
        self.position(&self.active).unwrap_or(0)
    }

    pub fn active(&self) -> &Question {
        &self.questions[self.active_index()]
    }

    fn require(&self, id: &QuestionId) -> Result<usize, EditError> {
        self.position(id)
            .ok_or_else(|| EditError::NotFound(id.clone()))
    }

    fn trailing_thank_you(&self) -> bool {
        self.questions
            .last()
            .is_some_and(|question| question.kind == QuestionKind::ThankYou)
    }

    fn fresh_question() -> Question {
        Question::new(
            QuestionId::generate(),
            QuestionKind::DEFAULT,
            NEW_QUESTION_TITLE,
        )
    }

    /// Appends a new short-text question, keeping a trailing thank-you step
    /// last. The new question becomes active.
    pub fn create_and_append(&mut self) -> QuestionId {
        let question = Self::fresh_question();
        let id = question.id.clone();
        let index = if self.trailing_thank_you() {
            self.questions.len() - 1
        } else {
            self.questions.len()
        };
        self.questions.insert(index, question);
        self.active = id.clone();
        debug!(question_id = %id, index, "appended question");
        id
    }

    /// Inserts a new question right after `index`; `-1` inserts before the
    /// first entry. Explicit placement ignores the thank-you rule.
    pub fn create_and_insert_after(&mut self, index: isize) -> Result<QuestionId, EditError> {
        let len = self.questions.len();
        if index < -1 || index >= len as isize {
            return Err(EditError::OutOfRange { index, len });
        }
        let question = Self::fresh_question();
        let id = question.id.clone();
        let at = (index + 1) as usize;
        self.questions.insert(at, question);
        self.active = id.clone();
        debug!(question_id = %id, index = at, "inserted question");
        Ok(id)
    }

    /// Swaps the entry at `index` with its neighbour and reports whether
    /// anything moved. Moving past either edge is a no-op.
    pub fn move_question(&mut self, index: usize, direction: Direction) -> bool {
        let target = match direction {
            Direction::Up => index.checked_sub(1),
            Direction::Down => Some(index + 1),
        };
        match target {
            Some(target) if index < self.questions.len() && target < self.questions.len() => {
                self.questions.swap(index, target);
                debug!(from = index, to = target, "moved question");
                true
            }
            _ => {
                debug!(index, ?direction, "move past edge ignored");
                false
            }
        }
    }

    /// Removes a question. The cursor, if it pointed at the removed entry,
    /// moves to the preceding entry or the first one.
    pub fn remove(&mut self, id: &QuestionId) -> Result<Question, EditError> {
        let index = self.require(id)?;
        if self.questions.len() <= 1 {
            return Err(EditError::LastQuestion);
        }
        let removed = self.questions.remove(index);
        if &self.active == id {
            let previous = index.saturating_sub(1);
            self.active = self.questions[previous].id.clone();
        }
        debug!(question_id = %id, index, "removed question");
        Ok(removed)
    }

    pub fn select(&mut self, id: &QuestionId) -> Result<(), EditError> {
        self.require(id)?;
        self.active = id.clone();
        Ok(())
    }

    pub fn has_next(&self) -> bool {
        self.active_index() + 1 < self.questions.len()
    }

    pub fn has_previous(&self) -> bool {
        self.active_index() > 0
    }

    /// Moves the cursor forward; a no-op on the last entry.
    pub fn select_next(&mut self) {
        if self.has_next() {
            self.active = self.questions[self.active_index() + 1].id.clone();
        }
    }

    /// Moves the cursor back; a no-op on the first entry.
    pub fn select_previous(&mut self) {
        if self.has_previous() {
            self.active = self.questions[self.active_index() - 1].id.clone();
        }
    }

    /// Merges `patch` into the question. Changing the kind re-shapes the
    /// kind-owned fields; patch fields the resulting kind does not own are
    /// ignored. A question only turns into a welcome or thank-you step when
    /// it already sits in that step's slot.
    pub fn update(&mut self, id: &QuestionId, patch: QuestionPatch) -> Result<(), EditError> {
        let index = self.require(id)?;
        let kind = patch.kind.unwrap_or(self.questions[index].kind);
        if is_pinned(kind)
            && self
                .questions
                .iter()
                .any(|other| &other.id != id && other.kind == kind)
        {
            return Err(EditError::DuplicateStructural(kind));
        }
        if kind != self.questions[index].kind {
            check_slot(kind, index, self.questions.len())?;
        }

        let owned = contract(kind).owned;
        let question = &mut self.questions[index];
        if kind != question.kind {
            question.kind = kind;
            question.reshape();
        }
        if let Some(title) = patch.title {
            question.title = title;
        }
        if let Some(description) = patch.description {
            question.description = description;
        }
        if let Some(required) = patch.required {
            question.required = required;
        }
        match patch.options {
            Some(options) if owned.options => question.options = Some(options),
            Some(_) => debug!(question_id = %id, %kind, "options ignored"),
            None => {}
        }
        match patch.list_options {
            Some(list) if owned.list_options => question.list_options = Some(list),
            Some(_) => debug!(question_id = %id, %kind, "list options ignored"),
            None => {}
        }
        debug!(question_id = %id, "updated question");
        Ok(())
    }

    fn options_mut(&mut self, id: &QuestionId) -> Result<&mut Vec<String>, EditError> {
        let index = self.require(id)?;
        let question = &mut self.questions[index];
        if !contract(question.kind).owned.options {
            return Err(EditError::FieldNotOwned {
                kind: question.kind,
                field: "options",
            });
        }
        Ok(question.options.get_or_insert_with(Vec::new))
    }

    /// Appends an option. Blank text is a no-op.
    pub fn add_option(&mut self, id: &QuestionId, text: &str) -> Result<(), EditError> {
        let options = self.options_mut(id)?;
        if text.trim().is_empty() {
            debug!(question_id = %id, "blank option ignored");
            return Ok(());
        }
        options.push(text.to_string());
        Ok(())
    }

    pub fn remove_option(&mut self, id: &QuestionId, index: usize) -> Result<String, EditError> {
        let options = self.options_mut(id)?;
        if index >= options.len() {
            return Err(EditError::OutOfRange {
                index: index as isize,
                len: options.len(),
            });
        }
        Ok(options.remove(index))
    }

    pub fn update_option(
        &mut self,
        id: &QuestionId,
        index: usize,
        text: &str,
    ) -> Result<(), EditError> {
        let options = self.options_mut(id)?;
        let len = options.len();
        let slot = options.get_mut(index).ok_or(EditError::OutOfRange {
            index: index as isize,
            len,
        })?;
        *slot = text.to_string();
        Ok(())
    }

    /// Stores the binary-storage reference on a file-attachment question,
    /// replacing any previous one.
    pub fn attach_file(&mut self, id: &QuestionId, file: FileRef) -> Result<(), EditError> {
        let index = self.require(id)?;
        let question = &mut self.questions[index];
        if !contract(question.kind).owned.attached_file {
            return Err(EditError::FieldNotOwned {
                kind: question.kind,
                field: "attached file",
            });
        }
        question.attached_file = Some(file);
        Ok(())
    }

    /// Clears the file slot, returning the file that was attached, if any.
    pub fn detach_file(&mut self, id: &QuestionId) -> Result<Option<FileRef>, EditError> {
        let index = self.require(id)?;
        let question = &mut self.questions[index];
        if !contract(question.kind).owned.attached_file {
            return Err(EditError::FieldNotOwned {
                kind: question.kind,
                field: "attached file",
            });
        }
        Ok(question.attached_file.take())
    }
}
