use crate::index::VectorIndex;
use crate::{ConversationEntry, IndexError, QuestionCategory};
use uuid::Uuid;

/// Everything one user accumulates between start and exit: the merged
/// index, the conversation so far and the current hypothesis questions.
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    index: Option<VectorIndex>,
    history: Vec<ConversationEntry>,
    category: Option<QuestionCategory>,
    predefined_questions: Vec<String>,
    selected: Option<usize>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            index: None,
            history: Vec::new(),
            category: None,
            predefined_questions: Vec::new(),
            selected: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn index(&self) -> Option<&VectorIndex> {
        self.index.as_ref()
    }

    /// Installs `batch` as the index, or merges it into the existing one.
    /// On error the existing index is left as it was.
    pub fn absorb_index(&mut self, batch: VectorIndex) -> Result<(), IndexError> {
        match self.index.as_mut() {
            Some(existing) => existing.merge_from(batch),
            None => {
                self.index = Some(batch);
                Ok(())
            }
        }
    }

    /// Replaces the predefined questions with the category's set and
    /// preselects the first one.
    pub fn select_category(&mut self, category: QuestionCategory) {
        self.category = Some(category);
        self.predefined_questions = category
            .questions()
            .iter()
            .map(|question| question.to_string())
            .collect();
        self.selected = if self.predefined_questions.is_empty() {
            None
        } else {
            Some(0)
        };
    }

    /// Chooses a predefined question by zero-based position. Returns false
    /// when the position is out of range; the selection is then unchanged.
    pub fn choose_predefined(&mut self, position: usize) -> bool {
        if position < self.predefined_questions.len() {
            self.selected = Some(position);
            true
        } else {
            false
        }
    }

    pub fn category(&self) -> Option<QuestionCategory> {
        self.category
    }

    pub fn predefined_questions(&self) -> &[String] {
        &self.predefined_questions
    }

    pub fn selected_question(&self) -> Option<&str> {
        self.selected
            .and_then(|position| self.predefined_questions.get(position))
            .map(String::as_str)
    }

    /// Custom text wins over the predefined selection; blank text counts as absent.
    pub fn resolve_question(&self, custom: Option<&str>) -> Option<String> {
        custom
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .or_else(|| self.selected_question())
            .map(str::to_string)
    }

    pub fn record(&mut self, entry: ConversationEntry) {
        self.history.push(entry);
    }

    pub fn history(&self) -> &[ConversationEntry] {
        &self.history
    }
}
