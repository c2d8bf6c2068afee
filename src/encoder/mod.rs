pub mod backend;
pub mod synthetic;

pub use backend::{Encoder, EncoderEvent, EncoderFactory, Segment};
pub use synthetic::{SyntheticEncoder, SyntheticEncoderConfig, SyntheticEncoderFactory, WEBM_MIME_TYPE};
