//! Submission pipeline.
//!
//! Turns a [`FormState`] into a wire payload and issues the upsert call:
//! empty strings become null, number fields are coerced to floats, the edit
//! key is merged in, and edit-gated modules require a credential before the
//! request goes out. All user-correctable problems come back as
//! [`ValidationError`] values before any network call; backend rejections
//! come back as [`SubmitError::Server`] with the backend's detail message.
//! No retries; every failure surfaces exactly once.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

use crate::schema::FormSchema;
use crate::types::EngineError;

use super::state::{EditKey, FormState, Mode, Record};

/// Successful upsert acknowledgement.
#[derive(Debug, Clone, Default)]
pub struct Ack {
    /// Backend-supplied confirmation message, when it sends one.
    pub message: Option<String>,
}

/// User-correctable rejection, detected locally before any network call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("nothing to submit: every field is empty")]
    Empty,
    #[error("field '{field}' is not numeric")]
    NotNumeric { field: String },
    #[error("editing this module requires a credential")]
    MissingCredential,
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// A submit for this form is already in flight; the double-click is
    /// dropped, not queued.
    #[error("a submission is already in flight")]
    InFlight,
    /// Backend rejected the payload. FormState is left unchanged so the
    /// user can correct and resubmit.
    #[error("server rejected submission ({status}): {detail}")]
    Server { status: u16, detail: String },
    #[error(transparent)]
    Engine(EngineError),
}

impl From<EngineError> for SubmitError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Server { status, detail } => SubmitError::Server { status, detail },
            other => SubmitError::Engine(other),
        }
    }
}

/// Where payloads go. The real sink is the HTTP client; tests plug in mocks.
#[async_trait]
pub trait RecordSink: Send + Sync {
    async fn upsert(&self, key: &EditKey, payload: &Record) -> crate::types::Result<Ack>;
}

// Shared sinks behind Arc keep the same contract.
#[async_trait]
impl<T: RecordSink + ?Sized> RecordSink for std::sync::Arc<T> {
    async fn upsert(&self, key: &EditKey, payload: &Record) -> crate::types::Result<Ack> {
        (**self).upsert(key, payload).await
    }
}

/// Submission context supplied by the page layer.
#[derive(Debug, Clone, Default)]
pub struct SubmitContext {
    /// Credential for edit-gated modules (`edit_password` on the wire). The
    /// backend validates it; the pipeline only refuses to call out without
    /// one when gating applies.
    pub edit_credential: Option<String>,
    /// Page-level values merged into the payload verbatim (location axis
    /// selections, sampling shift context, ...).
    pub extra: Record,
}

/// Build the wire payload for a form. Pure; performs no I/O.
pub fn build_payload(schema: &FormSchema, state: &FormState) -> Result<Record, ValidationError> {
    let mut payload = Record::new();
    let mut non_null = 0usize;

    for field in &schema.fields {
        let raw = state.value(&field.key).unwrap_or_default();
        let value = if raw.is_empty() {
            Value::Null
        } else if field.field_type.is_numeric() {
            let parsed: f64 = raw.trim().parse().map_err(|_| ValidationError::NotNumeric {
                field: field.key.clone(),
            })?;
            // "inf"/"nan" parse, but serialize to null; a reading that is
            // not a finite number is not a reading.
            if !parsed.is_finite() {
                return Err(ValidationError::NotNumeric {
                    field: field.key.clone(),
                });
            }
            non_null += 1;
            Value::from(parsed)
        } else {
            non_null += 1;
            Value::String(raw.to_string())
        };
        payload.insert(field.key.clone(), value);
    }

    if non_null == 0 {
        return Err(ValidationError::Empty);
    }

    Ok(payload)
}

/// Merge the composite edit key into a payload.
fn merge_edit_key(payload: &mut Record, key: &EditKey) {
    match key {
        EditKey::Unit { unit, date } => {
            payload.insert("report_date".into(), Value::String(date.to_string()));
            payload.insert("unit".into(), Value::String(unit.clone()));
        }
        EditKey::Station { date } => {
            payload.insert("report_date".into(), Value::String(date.to_string()));
        }
        EditKey::Module { module, date } => {
            payload.insert("date".into(), Value::String(date.to_string()));
            payload.insert("module".into(), Value::String(module.clone()));
        }
    }
}

pub struct SubmissionPipeline<S: RecordSink> {
    sink: S,
    in_flight: AtomicBool,
}

impl<S: RecordSink> SubmissionPipeline<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Validate, serialize, and post one form. The edit key must be set by
    /// the time a submit is attempted; the page layer guarantees that.
    pub async fn submit(
        &self,
        schema: &FormSchema,
        state: &FormState,
        key: &EditKey,
        ctx: &SubmitContext,
    ) -> Result<Ack, SubmitError> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Err(SubmitError::InFlight);
        }
        let result = self.submit_inner(schema, state, key, ctx).await;
        self.in_flight.store(false, Ordering::SeqCst);
        result
    }

    async fn submit_inner(
        &self,
        schema: &FormSchema,
        state: &FormState,
        key: &EditKey,
        ctx: &SubmitContext,
    ) -> Result<Ack, SubmitError> {
        let mut payload = build_payload(schema, state)?;

        if state.mode == Mode::Edit && schema.edit_gated {
            match &ctx.edit_credential {
                Some(credential) => {
                    payload.insert("edit_password".into(), Value::String(credential.clone()));
                }
                None => return Err(ValidationError::MissingCredential.into()),
            }
        }

        for (k, v) in &ctx.extra {
            payload.insert(k.clone(), v.clone());
        }
        merge_edit_key(&mut payload, key);

        debug!(
            schema = %schema.id,
            mode = ?state.mode,
            fields = payload.len(),
            "submitting payload"
        );

        let ack = self.sink.upsert(key, &payload).await?;
        info!(schema = %schema.id, key = ?key, "submission acknowledged");
        Ok(ack)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldSchema, FieldType};
    use chrono::NaiveDate;
    use std::sync::atomic::AtomicUsize;

    fn schema(edit_gated: bool) -> FormSchema {
        FormSchema {
            id: "unit_report".into(),
            label: "Unit Daily Report".into(),
            fields: vec![
                FieldSchema::new("generation_mu", "Generation (MU)", FieldType::Number),
                FieldSchema::new("remarks", "Remarks", FieldType::Textarea),
            ],
            groups: vec![],
            locations: vec![],
            edit_gated,
        }
    }

    fn key() -> EditKey {
        EditKey::Unit {
            unit: "Unit-1".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        }
    }

    /// Counts calls; always acks.
    struct CountingSink {
        calls: AtomicUsize,
    }

    impl CountingSink {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl RecordSink for CountingSink {
        async fn upsert(&self, _key: &EditKey, _payload: &Record) -> crate::types::Result<Ack> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Ack::default())
        }
    }

    #[test]
    fn payload_maps_empty_to_null_and_numbers_to_floats() {
        let schema = schema(false);
        let mut state = FormState::new(&schema);
        state.set_field(&schema, "generation_mu", "500").unwrap();

        let payload = build_payload(&schema, &state).unwrap();
        assert_eq!(payload["generation_mu"], Value::from(500.0));
        assert_eq!(payload["remarks"], Value::Null);
    }

    #[test]
    fn blank_form_is_rejected_before_any_call() {
        let schema = schema(false);
        let state = FormState::new(&schema);
        assert_eq!(build_payload(&schema, &state), Err(ValidationError::Empty));
    }

    #[test]
    fn non_numeric_input_names_the_field() {
        let schema = schema(false);
        let mut state = FormState::new(&schema);
        state.set_field(&schema, "generation_mu", "abc").unwrap();
        assert_eq!(
            build_payload(&schema, &state),
            Err(ValidationError::NotNumeric {
                field: "generation_mu".into()
            })
        );
    }

    #[test]
    fn non_finite_input_is_rejected_not_nulled() {
        // f64 parses "inf" and "nan", but JSON has no encoding for them:
        // Value::from would turn the entry into null and the empty-payload
        // check would have already been satisfied by a value that never
        // reaches the wire.
        for raw in ["inf", "-inf", "nan", "NaN", "infinity"] {
            let schema = schema(false);
            let mut state = FormState::new(&schema);
            state.set_field(&schema, "generation_mu", raw).unwrap();
            assert_eq!(
                build_payload(&schema, &state),
                Err(ValidationError::NotNumeric {
                    field: "generation_mu".into()
                }),
                "input {raw:?}"
            );
        }
    }

    #[tokio::test]
    async fn validation_failures_never_reach_the_sink() {
        let schema = schema(false);
        let state = FormState::new(&schema);
        let pipeline = SubmissionPipeline::new(CountingSink::new());

        let err = pipeline
            .submit(&schema, &state, &key(), &SubmitContext::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SubmitError::Validation(ValidationError::Empty)
        ));
        assert_eq!(pipeline.sink().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn edit_without_credential_is_refused_when_gated() {
        let schema = schema(true);
        let mut state = FormState::new(&schema);
        state.set_field(&schema, "generation_mu", "500").unwrap();
        state.mode = Mode::Edit;

        let pipeline = SubmissionPipeline::new(CountingSink::new());
        let err = pipeline
            .submit(&schema, &state, &key(), &SubmitContext::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SubmitError::Validation(ValidationError::MissingCredential)
        ));
        assert_eq!(pipeline.sink().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn edit_with_credential_carries_edit_password() {
        struct CapturingSink {
            saw_password: AtomicBool,
        }

        #[async_trait]
        impl RecordSink for CapturingSink {
            async fn upsert(&self, _key: &EditKey, payload: &Record) -> crate::types::Result<Ack> {
                if payload.get("edit_password") == Some(&Value::String("shift-pass".into())) {
                    self.saw_password.store(true, Ordering::SeqCst);
                }
                Ok(Ack::default())
            }
        }

        let schema = schema(true);
        let mut state = FormState::new(&schema);
        state.set_field(&schema, "generation_mu", "500").unwrap();
        state.mode = Mode::Edit;

        let pipeline = SubmissionPipeline::new(CapturingSink {
            saw_password: AtomicBool::new(false),
        });
        let ctx = SubmitContext {
            edit_credential: Some("shift-pass".into()),
            ..Default::default()
        };
        pipeline.submit(&schema, &state, &key(), &ctx).await.unwrap();
        assert!(pipeline.sink().saw_password.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn reentrant_submit_is_dropped_while_one_is_in_flight() {
        use std::sync::Arc;
        use tokio::sync::Notify;

        /// Parks inside upsert until released, counting entries.
        struct GatedSink {
            gate: Arc<Notify>,
            calls: AtomicUsize,
        }

        #[async_trait]
        impl RecordSink for GatedSink {
            async fn upsert(&self, _key: &EditKey, _payload: &Record) -> crate::types::Result<Ack> {
                self.calls.fetch_add(1, Ordering::SeqCst);
                self.gate.notified().await;
                Ok(Ack::default())
            }
        }

        let gate = Arc::new(Notify::new());
        let pipeline = Arc::new(SubmissionPipeline::new(GatedSink {
            gate: gate.clone(),
            calls: AtomicUsize::new(0),
        }));

        let form_schema = schema(false);
        let mut state = FormState::new(&form_schema);
        state.set_field(&form_schema, "generation_mu", "500").unwrap();

        // First submit parks inside the sink, holding the busy flag.
        let first = {
            let pipeline = pipeline.clone();
            let form_schema = form_schema.clone();
            let state = state.clone();
            tokio::spawn(async move {
                pipeline
                    .submit(&form_schema, &state, &key(), &SubmitContext::default())
                    .await
            })
        };
        tokio::task::yield_now().await;

        // The double-click is dropped, not queued.
        let second = pipeline
            .submit(&form_schema, &state, &key(), &SubmitContext::default())
            .await;
        assert!(matches!(second.unwrap_err(), SubmitError::InFlight));

        gate.notify_one();
        first.await.unwrap().unwrap();
        assert_eq!(pipeline.sink().calls.load(Ordering::SeqCst), 1);

        // Flag cleared: the next submit goes through again.
        let third = {
            let pipeline = pipeline.clone();
            let form_schema = form_schema.clone();
            let state = state.clone();
            tokio::spawn(async move {
                pipeline
                    .submit(&form_schema, &state, &key(), &SubmitContext::default())
                    .await
            })
        };
        tokio::task::yield_now().await;
        gate.notify_one();
        third.await.unwrap().unwrap();
        assert_eq!(pipeline.sink().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn create_mode_merges_edit_key_fields() {
        struct KeySink;

        #[async_trait]
        impl RecordSink for KeySink {
            async fn upsert(&self, _key: &EditKey, payload: &Record) -> crate::types::Result<Ack> {
                assert_eq!(payload["report_date"], Value::String("2024-01-01".into()));
                assert_eq!(payload["unit"], Value::String("Unit-1".into()));
                Ok(Ack::default())
            }
        }

        let schema = schema(false);
        let mut state = FormState::new(&schema);
        state.set_field(&schema, "generation_mu", "500").unwrap();

        let pipeline = SubmissionPipeline::new(KeySink);
        pipeline
            .submit(&schema, &state, &key(), &SubmitContext::default())
            .await
            .unwrap();
    }
}
