use thiserror::Error;

#[derive(Debug, Error)]
pub enum WizardError {
    #[error("unknown wizard step '{id}'")]
    UnknownStep { id: String },
    #[error("navigation history is empty")]
    EmptyHistory,
    #[error("step '{id}' is not available under the current signals")]
    InvalidStepState { id: String },
    #[error("invalid step registry: {message}")]
    InvalidRegistry { message: String },
    #[error("wizard has not been started")]
    NotStarted,
    #[error("wizard has exited")]
    Exited,
    #[error("{message}")]
    Collaborator {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl WizardError {
    pub fn unknown_step(id: impl Into<String>) -> Self {
        Self::UnknownStep { id: id.into() }
    }

    pub(crate) fn collaborator(message: impl Into<String>, source: anyhow::Error) -> Self {
        Self::Collaborator {
            message: message.into(),
            source,
        }
    }
}
