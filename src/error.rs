use std::time::Duration;

pub type AppResult<T> = Result<T, AppError>;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("I/O error: {context}")]
    Io {
        #[source]
        source: std::io::Error,
        context: String,
    },
    #[error("storage error: {context}")]
    Storage {
        #[source]
        source: std::io::Error,
        context: String,
    },
    #[error("{}", render_failure_message(.code, .message))]
    Render { code: Option<i32>, message: String },
    #[error("renderer did not finish within {}ms", .limit.as_millis())]
    RenderTimeout { limit: Duration },
    #[error("render canceled")]
    Canceled,
    #[error("bad page artifact {file_name}: {reason}")]
    Parse { file_name: String, reason: String },
    #[error("failed to copy {location} to a local file")]
    Copy {
        location: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("unsupported: {0}")]
    Unsupported(String),
}

fn render_failure_message(code: &Option<i32>, message: &str) -> String {
    let message = message.trim();
    match code {
        Some(code) => format!("renderer exited with code {code}: {message}"),
        None => format!("renderer terminated by signal: {message}"),
    }
}

impl From<std::io::Error> for AppError {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            source,
            context: "I/O operation failed".to_string(),
        }
    }
}

impl AppError {
    pub fn io_with_context(source: std::io::Error, context: impl Into<String>) -> Self {
        Self::Io {
            source,
            context: context.into(),
        }
    }

    pub fn storage(source: std::io::Error, context: impl Into<String>) -> Self {
        Self::Storage {
            source,
            context: context.into(),
        }
    }

    pub fn render(code: Option<i32>, message: impl Into<String>) -> Self {
        Self::Render {
            code,
            message: message.into(),
        }
    }

    pub fn parse(file_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            file_name: file_name.into(),
            reason: reason.into(),
        }
    }

    pub fn copy(
        location: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Copy {
            location: location.into(),
            source: Box::new(source),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported(message.into())
    }

    pub fn is_render_failure(&self) -> bool {
        matches!(self, Self::Render { .. } | Self::RenderTimeout { .. })
    }
}
