use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;

use serde_json::Value;

use crate::error::ApiError;
use crate::types::AutomationRequest;

/// Field-scoped validation messages. Never sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldErrors<F: Ord> {
    errors: BTreeMap<F, Vec<String>>,
}

impl<F: Ord> Default for FieldErrors<F> {
    fn default() -> Self {
        Self {
            errors: BTreeMap::new(),
        }
    }
}

impl<F: Ord + Copy> FieldErrors<F> {
    pub fn add(&mut self, field: F, message: impl Into<String>) {
        self.errors.entry(field).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }

    pub fn has(&self, field: F) -> bool {
        self.errors.contains_key(&field)
    }

    pub fn messages(&self, field: F) -> &[String] {
        self.errors.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (F, &[String])> {
        self.errors.iter().map(|(f, m)| (*f, m.as_slice()))
    }
}

/// One automation domain's input model.
///
/// `check` is the validator and the request builder in one: a draft either
/// yields a valid request or the full set of field errors.
pub trait AutomationForm: Clone {
    type Field: Copy + Ord + Debug + Send + 'static;
    type Outcome: Clone + Debug + Send + 'static;

    fn check(&self) -> Result<AutomationRequest, FieldErrors<Self::Field>>;

    /// Decode a 2xx response body into this domain's result, failing closed
    /// on unexpected shapes.
    fn decode(body: Value) -> Result<Self::Outcome, ApiError>;

    fn validate(&self) -> FieldErrors<Self::Field> {
        self.check().err().unwrap_or_default()
    }
}

/// Draft values plus the bookkeeping that decides which errors are visible.
#[derive(Debug, Clone)]
pub struct FormState<F: AutomationForm> {
    draft: F,
    touched: BTreeSet<F::Field>,
    errors: FieldErrors<F::Field>,
    submit_attempted: bool,
}

impl<F: AutomationForm> FormState<F> {
    pub fn new(draft: F) -> Self {
        let errors = draft.validate();
        Self {
            draft,
            touched: BTreeSet::new(),
            errors,
            submit_attempted: false,
        }
    }

    pub fn draft(&self) -> &F {
        &self.draft
    }

    /// Apply an edit and re-run validation.
    pub fn edit(&mut self, apply: impl FnOnce(&mut F)) {
        apply(&mut self.draft);
        self.errors = self.draft.validate();
    }

    pub fn blur(&mut self, field: F::Field) {
        self.touched.insert(field);
        self.errors = self.draft.validate();
    }

    pub fn is_touched(&self, field: F::Field) -> bool {
        self.touched.contains(&field)
    }

    pub fn submit_attempted(&self) -> bool {
        self.submit_attempted
    }

    /// Marks a submit attempt and validates, returning the request when the
    /// draft is clean.
    pub(crate) fn attempt(&mut self) -> Option<AutomationRequest> {
        self.submit_attempted = true;
        match self.draft.check() {
            Ok(request) => {
                self.errors = FieldErrors::default();
                Some(request)
            }
            Err(errors) => {
                self.errors = errors;
                None
            }
        }
    }

    pub fn errors(&self) -> &FieldErrors<F::Field> {
        &self.errors
    }

    /// Messages for `field` that the user should see right now.
    pub fn visible_errors(&self, field: F::Field) -> &[String] {
        if self.submit_attempted || self.touched.contains(&field) {
            self.errors.messages(field)
        } else {
            &[]
        }
    }
}
