use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Zero-length vector: {what}")]
    ZeroLength { what: &'static str },
}
