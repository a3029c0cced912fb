//! Price alerts: registry, periodic evaluation and webhook delivery.

mod evaluator;
mod registry;
mod webhook;

pub use evaluator::{AlertEvaluator, EvaluationSummary};
pub use registry::AlertRegistry;
pub use webhook::{WebhookNotifier, WebhookPayload};
