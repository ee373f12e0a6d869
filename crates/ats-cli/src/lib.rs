//! Facade crate tying the `ats-*` library crates together, plus a set of
//! echo-style stub collaborators the `ats-cli` binary uses so the pipeline
//! can be exercised end to end without a real LLM, vector DB, or database
//! wired in. These stubs are for local trial runs only, never production.

pub mod stubs;

pub mod prelude {
    pub use ats_classify::prelude::*;
    pub use ats_core::config::{is_allowed_extension, PipelineConfig, ALLOWED_EXTENSIONS};
    pub use ats_core::error::*;
    pub use ats_core::record::{Mastercategory, ResumeRecord};
    pub use ats_core::status::{FailureReason, Status};
    pub use ats_extract::prelude::*;
    pub use ats_ingest::prelude::*;
    pub use ats_search::prelude::*;
    pub use ats_vector::prelude::*;

    pub use crate::stubs::{EchoLlm, InMemoryFileLocator, InMemoryResumeRepository};
}
