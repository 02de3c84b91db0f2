//! Envio de um relatório para o caminho já resolvido.
//!
//! Só faz I/O: abre, escreve uma vez, fecha. A política de cache fica com
//! o loop, que decide o que fazer com um [`SendOutcome`] de falha.

use crate::hid::{DeviceError, HidBackend, HidHandle};
use crate::types::{DevicePath, Report};

/// Resultado de um envio.
#[derive(Debug)]
pub enum SendOutcome {
    /// O SO aceitou `n` bytes.
    Sent(usize),
    /// `write` retornou 0 bytes.
    Rejected,
    /// Erro ao abrir ou escrever.
    Failed(DeviceError),
}

impl SendOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SendOutcome::Sent(_))
    }
}

/// Envia `report` para `path`. Nunca retorna erro: falhas viram outcome.
pub fn send<B: HidBackend>(backend: &B, path: &DevicePath, report: &Report) -> SendOutcome {
    let mut handle = match backend.open(path) {
        Ok(handle) => handle,
        Err(e) => return SendOutcome::Failed(e),
    };

    match handle.write(report.as_bytes()) {
        Ok(0) => SendOutcome::Rejected,
        Ok(n) => SendOutcome::Sent(n),
        Err(e) => SendOutcome::Failed(e),
    }
}
