use crate::foundation::error::DpError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
}

/// Short transient message for the person operating a session.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    /// Phrase `err` for an end user. Internal errors are logged and reported generically.
    pub fn from_error(err: &DpError) -> Self {
        if err.is_user_facing() {
            return Self::error(input_message(err));
        }
        let message = match err {
            DpError::Validation(msg) | DpError::InvalidArgument(msg) => msg.clone(),
            other => {
                tracing::warn!(error = %other, "internal error surfaced as notice");
                "Something went wrong. Please try again".to_owned()
            }
        };
        Self::error(message)
    }
}

/// Instruction for an input the user can correct.
fn input_message(err: &DpError) -> String {
    match err {
        DpError::InvalidFileType(_) => "Please upload an image file".to_owned(),
        DpError::FileTooLarge { limit, .. } => {
            format!("File size must be less than {}", format_byte_limit(*limit))
        }
        DpError::MissingRequiredField("photo") => "Please upload your photo".to_owned(),
        DpError::MissingRequiredField("name") => "Please enter your name".to_owned(),
        DpError::MissingRequiredField(field) => format!("Please provide a {field}"),
        other => other.to_string(),
    }
}

const KIB: u64 = 1024;
const MIB: u64 = 1024 * KIB;

/// Whole megabytes when exact, otherwise kilobytes rounded up.
fn format_byte_limit(limit: u64) -> String {
    if limit >= MIB && limit % MIB == 0 {
        format!("{}MB", limit / MIB)
    } else {
        format!("{}KB", limit.div_ceil(KIB))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/notice.rs"]
mod tests;
