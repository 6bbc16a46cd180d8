//! health-core: Domain logic for the health assistant
//!
//! Everything in this crate is pure: lab-report parsing, risk triage,
//! profile-based context and prompt construction. The HTTP server in
//! `health-server` owns all I/O.

pub mod error;
pub mod lab;
pub mod profile;
pub mod prompt;
pub mod roles;
pub mod triage;

pub use error::CoreError;
pub use lab::{Flag, LabFinding, LabResult, ReferenceRange};
pub use profile::{BmiCategory, HealthProfile};
pub use prompt::{ChatLine, ChatPrompt, Speaker};
pub use roles::{QuestionStatus, Role, ThreadSender};
