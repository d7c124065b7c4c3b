//! Page composition layer.
//!
//! A [`ModulePage`] wires one module's schema, form state, existence loader,
//! and submission pipeline together and owns the only mutable copy of that
//! page's state. UI toolkits sit on top of this; nothing here renders.
//!
//! Context (capability set, edit credential) is passed in at construction,
//! scoped to the page, never read from ambient globals. The report viewer's
//! refresh cycle is deliberately not owned here: after a submission ack the
//! caller re-invokes it alongside the loader.

use tracing::{info, warn};

use crate::form::{
    EditKey, FormState, Mode, SubmissionPipeline, SubmitContext, SubmitError, RecordSink,
    ValidationError,
};
use crate::loader::{ExistenceLoader, LoadOutcome, RecordSource};
use crate::schema::FormSchema;
use crate::types::Result;

/// What this session may do, resolved once at login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub can_create: bool,
    pub can_edit_own: bool,
    pub can_edit_any: bool,
}

impl Capabilities {
    pub fn read_only() -> Self {
        Self::default()
    }

    pub fn full() -> Self {
        Self {
            can_create: true,
            can_edit_own: true,
            can_edit_any: true,
        }
    }

    pub fn can_edit(&self) -> bool {
        self.can_edit_own || self.can_edit_any
    }
}

/// Per-page context supplied by the session layer.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub capabilities: Capabilities,
    /// Credential for edit-gated modules. Re-prompted (not discarded with
    /// the form) when the backend rejects it.
    pub edit_credential: Option<String>,
}

/// The single visible outcome of a mutating action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    Saved(String),
    /// User-correctable; names the offending field where there is one.
    Invalid(String),
    /// Session lacks the capability for this action.
    Denied(String),
    /// Backend rejected the request; detail shown verbatim when available.
    Failed(String),
    /// A submit is already in flight; this one was dropped.
    Busy,
}

pub struct ModulePage<S: RecordSource, K: RecordSink> {
    schema: FormSchema,
    state: FormState,
    loader: ExistenceLoader<S>,
    pipeline: SubmissionPipeline<K>,
    ctx: PageContext,
}

impl<S: RecordSource, K: RecordSink> ModulePage<S, K> {
    pub fn new(schema: FormSchema, source: S, sink: K, ctx: PageContext) -> Self {
        let state = FormState::new(&schema);
        Self {
            schema,
            state,
            loader: ExistenceLoader::new(source),
            pipeline: SubmissionPipeline::new(sink),
            ctx,
        }
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn context(&self) -> &PageContext {
        &self.ctx
    }

    /// Update the edit credential after a re-prompt, leaving entered field
    /// values intact.
    pub fn set_edit_credential(&mut self, credential: Option<String>) {
        self.ctx.edit_credential = credential;
    }

    pub fn set_field(&mut self, key: &str, value: &str) -> Result<()> {
        self.state.set_field(&self.schema, key, value)
    }

    /// Point the page at a new edit key and look up the record under it.
    ///
    /// Found: fresh state seeded from the record, edit mode. Not found:
    /// fresh blank state, create mode. Superseded: no state change at all.
    /// Lookup failure: the current state is left untouched and the error is
    /// surfaced for the page to display.
    pub async fn select_key(&mut self, key: EditKey) -> Result<()> {
        match self.loader.load(&key).await? {
            LoadOutcome::Found(record) => {
                let mut fresh = FormState::new(&self.schema);
                fresh.edit_key = Some(key);
                fresh.apply_loaded_record(&self.schema, &record);
                self.state = fresh;
            }
            LoadOutcome::NotFound => {
                let mut fresh = FormState::new(&self.schema);
                fresh.edit_key = Some(key);
                self.state = fresh;
            }
            LoadOutcome::Superseded => {}
        }
        Ok(())
    }

    /// Submit the current form. Exactly one visible outcome comes back.
    /// Extra payload values (location selections) are merged verbatim.
    pub async fn submit(&mut self, extra: crate::form::Record) -> PageOutcome {
        let key = match self.state.edit_key.clone() {
            Some(key) => key,
            None => return PageOutcome::Invalid("select a date first".to_string()),
        };

        match self.state.mode {
            Mode::Create if !self.ctx.capabilities.can_create => {
                return PageOutcome::Denied("this session cannot create records".to_string());
            }
            Mode::Edit if !self.ctx.capabilities.can_edit() => {
                return PageOutcome::Denied("this session cannot edit records".to_string());
            }
            _ => {}
        }

        let submit_ctx = SubmitContext {
            edit_credential: self.ctx.edit_credential.clone(),
            extra,
        };

        match self
            .pipeline
            .submit(&self.schema, &self.state, &key, &submit_ctx)
            .await
        {
            Ok(ack) => {
                info!(module = %self.schema.id, "saved");
                // Re-load so mode flips to edit and derived fields appear.
                if let Err(e) = self.select_key(key).await {
                    warn!(error = %e, "post-save reload failed");
                }
                PageOutcome::Saved(ack.message.unwrap_or_else(|| "saved".to_string()))
            }
            Err(SubmitError::Validation(v)) => PageOutcome::Invalid(self.validation_message(&v)),
            Err(SubmitError::InFlight) => PageOutcome::Busy,
            Err(SubmitError::Server { status, detail }) => {
                warn!(module = %self.schema.id, status, "submission rejected");
                PageOutcome::Failed(detail)
            }
            Err(SubmitError::Engine(e)) => PageOutcome::Failed(e.to_string()),
        }
    }

    /// Render a validation error with the field's label, not its wire key.
    fn validation_message(&self, error: &ValidationError) -> String {
        match error {
            ValidationError::NotNumeric { field } => {
                let label = self
                    .schema
                    .field(field)
                    .map(|f| f.label.as_str())
                    .unwrap_or(field.as_str());
                format!("'{label}' must be a number")
            }
            other => other.to_string(),
        }
    }
}
