//! Fronteira com a pilha HID do SO.
//!
//! O binário implementa [`HidBackend`] com `hidapi`; os testes usam um
//! backend em memória. Handles são fechados no `Drop`, então nenhum
//! caminho de erro deixa um dispositivo aberto.

use crate::types::{DevicePath, InterfaceDescriptor};

/// Erros de I/O HID. Todos recuperáveis no loop.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("Falha ao enumerar dispositivos HID: {0}")]
    Enumerate(String),

    #[error("Falha ao abrir {path}: {reason}")]
    Open { path: DevicePath, reason: String },

    #[error("Falha ao escrever em {path}: {reason}")]
    Write { path: DevicePath, reason: String },

    #[error("Caminho HID inválido: {0}")]
    InvalidPath(DevicePath),
}

/// Handle aberto de uma interface. Fechar = `drop`.
pub trait HidHandle {
    /// Escreve um relatório completo e retorna os bytes aceitos pelo SO.
    fn write(&mut self, data: &[u8]) -> Result<usize, DeviceError>;
}

/// Enumeração e abertura de interfaces HID.
pub trait HidBackend {
    type Handle: HidHandle;

    /// Lista todas as interfaces HID do sistema, sem filtro.
    fn enumerate(&mut self) -> Result<Vec<InterfaceDescriptor>, DeviceError>;

    fn open(&self, path: &DevicePath) -> Result<Self::Handle, DeviceError>;
}
