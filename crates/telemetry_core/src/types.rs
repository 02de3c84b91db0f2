//! Tipos compartilhados entre o encoder, o resolver e o loop de envio.
//!
//! Nada aqui faz I/O: são valores simples, criados a cada ciclo ou
//! carregados uma vez na inicialização.

use chrono::NaiveDateTime;
use std::fmt;

// ──────────────────────────────────────────────
// Identidade do dispositivo
// ──────────────────────────────────────────────

/// Par VID/PID do display. Imutável, carregado da configuração.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceIdentity {
    pub vendor_id: u16,
    pub product_id: u16,
}

impl DeviceIdentity {
    pub fn new(vendor_id: u16, product_id: u16) -> Self {
        Self {
            vendor_id,
            product_id,
        }
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "VID=0x{:04X} PID=0x{:04X}",
            self.vendor_id, self.product_id
        )
    }
}

// ──────────────────────────────────────────────
// Interfaces HID
// ──────────────────────────────────────────────

/// Caminho opaco de uma interface HID, exatamente como o SO o entrega.
///
/// No Windows é algo como `\\?\HID#VID_1234&PID_5678&MI_01#...`, no Linux
/// um `/dev/hidrawN`. Não há garantia de UTF-8.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DevicePath(Vec<u8>);

impl DevicePath {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Busca de substring sem diferenciar maiúsculas (ASCII).
    pub fn contains_ignore_case(&self, needle: &str) -> bool {
        let needle = needle.as_bytes();
        if needle.is_empty() {
            return true;
        }
        self.0
            .windows(needle.len())
            .any(|w| w.eq_ignore_ascii_case(needle))
    }
}

impl fmt::Display for DevicePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

impl From<&str> for DevicePath {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

/// Uma interface retornada pela enumeração HID.
///
/// `usage_page`, `usage` e `interface_number` são apenas informativos:
/// o firmware não os expõe de forma consistente, então a escolha da
/// interface é feita por escrita de teste.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceDescriptor {
    pub vendor_id: u16,
    pub product_id: u16,
    pub path: DevicePath,
    pub usage_page: u16,
    pub usage: u16,
    pub interface_number: i32,
}

impl InterfaceDescriptor {
    pub fn matches(&self, identity: &DeviceIdentity) -> bool {
        self.vendor_id == identity.vendor_id && self.product_id == identity.product_id
    }
}

// ──────────────────────────────────────────────
// Métricas
// ──────────────────────────────────────────────

/// Amostra de um ciclo. Criada, codificada e descartada.
///
/// Os percentuais são `i32` com sinal: ruído de sensor pode sair de 0–100
/// e o encoder faz o clamp.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSnapshot {
    pub cpu_percent: i32,
    pub ram_percent: i32,
    pub disk_percent: i32,
    pub gpu_percent: i32,
    pub volume_percent: i32,
    pub timestamp: NaiveDateTime,
}

/// Quais campos do relatório são preenchidos.
/// Campos desativados continuam no layout, zerados em ASCII.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSelection {
    pub cpu: bool,
    pub ram: bool,
    pub gpu: bool,
    pub disk: bool,
    pub date: bool,
    pub time: bool,
    pub volume: bool,
}

impl FieldSelection {
    pub fn none() -> Self {
        Self {
            cpu: false,
            ram: false,
            gpu: false,
            disk: false,
            date: false,
            time: false,
            volume: false,
        }
    }
}

impl Default for FieldSelection {
    fn default() -> Self {
        Self {
            cpu: true,
            ram: true,
            gpu: true,
            disk: true,
            date: true,
            time: true,
            volume: true,
        }
    }
}

// ──────────────────────────────────────────────
// Relatório
// ──────────────────────────────────────────────

/// Relatório HID de tamanho fixo, pronto para `write`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report(Vec<u8>);

impl Report {
    pub(crate) fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_display_is_hex() {
        let id = DeviceIdentity::new(0x1A2B, 0x00FF);
        assert_eq!(id.to_string(), "VID=0x1A2B PID=0x00FF");
    }

    #[test]
    fn path_search_ignores_case() {
        let path = DevicePath::from(r"\\?\HID#VID_1234&PID_5678&MI_00&Col01#KBD");
        assert!(path.contains_ignore_case("kbd"));
        assert!(path.contains_ignore_case("mi_00"));
        assert!(!path.contains_ignore_case("mouse"));
    }

    #[test]
    fn path_display_tolerates_invalid_utf8() {
        let path = DevicePath::new(vec![b'/', 0xFF, b'x']);
        assert_eq!(path.to_string(), "/\u{FFFD}x");
    }

    #[test]
    fn default_selection_enables_everything() {
        let all = FieldSelection::default();
        assert!(all.cpu && all.ram && all.gpu && all.disk && all.date && all.time && all.volume);
        assert_ne!(FieldSelection::none(), all);
    }
}
