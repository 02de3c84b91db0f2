//! # Telemetry Core
//!
//! Núcleo do HID Host: layout do relatório enviado ao display, configuração
//! TOML e a descoberta/cache/envio para a interface HID gravável.
//! Nada aqui depende de `hidapi` ou do SO: o binário injeta as
//! implementações de [`TelemetrySource`] e [`HidBackend`].
//!
//! ## Módulos
//! - [`types`] – Identidade, caminhos HID, amostras e relatório
//! - [`protocol`] – Encoder do layout fixo de bytes
//! - [`config`] – Configuração via TOML
//! - [`source`] – Trait da fonte de métricas
//! - [`hid`] – Trait do backend HID e erros de dispositivo
//! - [`resolver`] – Escolha da interface por escrita de teste
//! - [`cache`] – Cache do caminho com revalidação periódica
//! - [`transmitter`] – Um envio: abrir, escrever, fechar
//! - [`polling`] – Loop principal

pub mod types;
pub mod protocol;
pub mod config;
pub mod source;
pub mod hid;
pub mod resolver;
pub mod cache;
pub mod transmitter;
pub mod polling;

// Re-exports convenientes
pub use types::{DeviceIdentity, DevicePath, FieldSelection, InterfaceDescriptor, MetricsSnapshot, Report};
pub use protocol::{encode_report, test_pattern, ProtocolError, MIN_REPORT_SIZE};
pub use config::{ConfigError, HostConfig, HostSettings};
pub use source::TelemetrySource;
pub use hid::{DeviceError, HidBackend, HidHandle};
pub use polling::{PollingLoop, RunMode};
