pub mod lexicon;
pub mod link_classifier;
pub mod live_probes;
pub mod merger;
pub mod navigator;
pub mod pipeline;
pub mod text_extractor;
pub mod types;

pub use lexicon::{load_lexicons, Lexicons};
pub use pipeline::{extract_from_html, ContactPipeline};
pub use types::ContactRecord;
