//! Human-readable text for domain error kinds.
//!
//! The domain only raises symbolic [`ErrorKind`]s; boundary layers call
//! [`message_for`] or build an [`ErrorPayload`] when they need text.
//! Messages are in Brazilian Portuguese.

use serde::{Deserialize, Serialize};

use crate::models::{DomainError, ErrorCategory, ErrorKind};

/// Message text for `kind`.
pub fn message_for(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::SlotExpired => "O slot expirou.",
        ErrorKind::BlockedConflict => "O slot foi bloqueado.",
        ErrorKind::NotAvailable => "O slot solicitado nao esta disponivel.",
        ErrorKind::NotReserved => "O slot solicitado nao esta reservado.",
        ErrorKind::InvalidSlot => "O slot selecionado é inválido.",
        ErrorKind::InvalidSchedule => "O horário selecionado é inválido.",
        ErrorKind::ScheduleDateRequired => "A data do agendamento nao pode ser nula",
        ErrorKind::ScheduleBlocked => "O horário selecionado é bloqueado.",
        ErrorKind::ScheduleReserved => "O horário selecionado ja foi reservado.",
        ErrorKind::InvalidDuration => "A duração do reagendamento deve ser positiva.",
        ErrorKind::SlotNotFound => "O slot solicitado nao pertence a agenda.",
    }
}

/// Error body handed to callers outside the domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub code: ErrorKind,
    pub category: ErrorCategory,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorPayload {
    /// Encode the payload as a JSON document.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Decode a payload previously produced by [`ErrorPayload::to_json`].
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

impl From<&DomainError> for ErrorPayload {
    fn from(err: &DomainError) -> Self {
        Self {
            code: err.kind(),
            category: err.category(),
            message: message_for(err.kind()).to_string(),
            details: err.details().map(str::to_string),
        }
    }
}

impl From<DomainError> for ErrorPayload {
    fn from(err: DomainError) -> Self {
        Self::from(&err)
    }
}
