//! Form state and submission.
//!
//! - [`state`]: the editable key/value snapshot behind one data-entry form
//! - [`submit`]: payload coercion, local validation, and the upsert call

pub mod state;
pub mod submit;

pub use state::{EditKey, FormState, Mode, Record};
pub use submit::{
    Ack, RecordSink, SubmissionPipeline, SubmitContext, SubmitError, ValidationError,
};
