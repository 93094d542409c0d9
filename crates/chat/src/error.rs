use std::path::PathBuf;

use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ConfigError {
    #[snafu(display("failed to extract chat config from {path:?} on `{stage}`: {source}"))]
    Extract {
        stage: &'static str,
        path: PathBuf,
        #[snafu(source(from(figment::Error, Box::new)))]
        source: Box<figment::Error>,
    },
    #[snafu(display("reply pattern #{index} '{pattern}' is invalid on `{stage}`: {source}"))]
    InvalidReplyPattern {
        stage: &'static str,
        index: usize,
        pattern: String,
        source: regex::Error,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum AttachmentError {
    #[snafu(display("failed to read attachment {path:?} on `{stage}`: {source}"))]
    ReadFile {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("data url is malformed on `{stage}`: {details}"))]
    MalformedDataUrl {
        stage: &'static str,
        details: String,
    },
    #[snafu(display("data url payload is not valid base64 on `{stage}`: {source}"))]
    DecodeDataUrl {
        stage: &'static str,
        source: base64::DecodeError,
    },
}

pub type AttachmentResult<T> = Result<T, AttachmentError>;
