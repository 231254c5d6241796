use thiserror::Error;

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Invalid subscriber configuration: {0}")]
    InvalidConfig(String),
}
