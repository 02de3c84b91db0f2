//! Configuração via TOML (`hid-config.toml` ao lado do executável).
//!
//! ```toml
//! vendor_id = "0x1234"     # ou 4660
//! product_id = "0x5678"
//! report_size = 32
//! interval = 10            # segundos entre envios
//! recheck_interval = 10    # ciclos até revalidar o caminho HID
//! send_cpu = "y"           # "y" ativa, qualquer outro valor desativa
//! ```

use crate::protocol::{DEFAULT_REPORT_SIZE, MIN_REPORT_SIZE};
use crate::types::{DeviceIdentity, FieldSelection};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Nome do arquivo procurado ao lado do executável.
pub const CONFIG_FILE_NAME: &str = "hid-config.toml";

/// Maior `interval` aceito (um dia).
pub const MAX_INTERVAL_SECS: u64 = 86_400;

/// Arquivo escrito quando não existe configuração.
pub const CONFIG_TEMPLATE: &str = r#"# HID Host – configuração
#
# Preencha vendor_id/product_id com o VID/PID do display.
# Aceita "0x1234", "0o11064", "0b...", decimal ou inteiro TOML.
vendor_id = ""
product_id = ""

# Tamanho do relatório HID em bytes (mínimo 26)
report_size = 32

# Segundos entre envios (1 a 86400)
interval = 10

# Ciclos até revalidar o caminho HID em cache
recheck_interval = 10

# Campos enviados: "y" ativa, qualquer outro valor desativa
send_cpu = "y"
send_ram = "y"
send_gpu = "y"
send_disk = "y"
send_date = "y"
send_time = "y"
send_volume = "y"
"#;

/// Erros de configuração. Todos fatais na inicialização.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Erro ao ler {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Erro ao parsear {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Erro ao serializar configuração: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Erro ao salvar {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Criado {0} padrão. Preencha vendor_id/product_id e reinicie.")]
    TemplateCreated(PathBuf),

    #[error("Campo obrigatório `{0}` não configurado")]
    MissingDeviceId(&'static str),

    #[error("Configuração inválida: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

// ──────────────────────────────────────────────
// Flag "y"/"n"
// ──────────────────────────────────────────────

/// Flag de campo. Aceita `"y"` (qualquer caixa) ou booleano TOML.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Toggle(pub bool);

impl Default for Toggle {
    fn default() -> Self {
        Toggle(true)
    }
}

impl Serialize for Toggle {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(if self.0 { "y" } else { "n" })
    }
}

impl<'de> Deserialize<'de> for Toggle {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Bool(bool),
            Text(String),
        }

        Ok(match Raw::deserialize(d)? {
            Raw::Bool(b) => Toggle(b),
            Raw::Text(s) => Toggle(s.trim().eq_ignore_ascii_case("y")),
        })
    }
}

// ──────────────────────────────────────────────
// VID/PID
// ──────────────────────────────────────────────

/// Interpreta um literal numérico: `0x`, `0o`, `0b` ou decimal.
pub fn parse_usb_id(text: &str) -> Result<u16, String> {
    let t = text.trim().to_ascii_lowercase();
    let (digits, radix) = if let Some(rest) = t.strip_prefix("0x") {
        (rest, 16)
    } else if let Some(rest) = t.strip_prefix("0o") {
        (rest, 8)
    } else if let Some(rest) = t.strip_prefix("0b") {
        (rest, 2)
    } else {
        (t.as_str(), 10)
    };

    u16::from_str_radix(digits, radix).map_err(|e| format!("ID USB inválido {text:?}: {e}"))
}

fn deserialize_usb_id<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u16>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }

    match Raw::deserialize(d)? {
        Raw::Number(n) => u16::try_from(n)
            .map(Some)
            .map_err(|_| D::Error::custom(format!("ID USB {n} fora de 0–65535"))),
        Raw::Text(s) if s.trim().is_empty() => Ok(None),
        Raw::Text(s) => parse_usb_id(&s).map(Some).map_err(D::Error::custom),
    }
}

fn serialize_usb_id<S: Serializer>(id: &Option<u16>, s: S) -> Result<S::Ok, S::Error> {
    match id {
        Some(id) => s.serialize_str(&format!("0x{id:04X}")),
        None => s.serialize_str(""),
    }
}

// ──────────────────────────────────────────────
// Arquivo
// ──────────────────────────────────────────────

/// Conteúdo do `hid-config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    #[serde(
        deserialize_with = "deserialize_usb_id",
        serialize_with = "serialize_usb_id"
    )]
    pub vendor_id: Option<u16>,
    #[serde(
        deserialize_with = "deserialize_usb_id",
        serialize_with = "serialize_usb_id"
    )]
    pub product_id: Option<u16>,
    /// Tamanho do relatório HID (bytes)
    pub report_size: usize,
    /// Intervalo entre envios (segundos, mínimo efetivo 1)
    pub interval: u64,
    /// Ciclos até revalidar o caminho em cache
    pub recheck_interval: u32,
    pub send_cpu: Toggle,
    pub send_ram: Toggle,
    pub send_gpu: Toggle,
    pub send_disk: Toggle,
    pub send_date: Toggle,
    pub send_time: Toggle,
    pub send_volume: Toggle,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            vendor_id: None,
            product_id: None,
            report_size: DEFAULT_REPORT_SIZE,
            interval: 10,
            recheck_interval: 10,
            send_cpu: Toggle::default(),
            send_ram: Toggle::default(),
            send_gpu: Toggle::default(),
            send_disk: Toggle::default(),
            send_date: Toggle::default(),
            send_time: Toggle::default(),
            send_volume: Toggle::default(),
        }
    }
}

/// Configuração validada, pronta para o loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostSettings {
    pub identity: DeviceIdentity,
    pub report_size: usize,
    pub interval: Duration,
    pub recheck_interval: u32,
    pub fields: FieldSelection,
}

impl HostConfig {
    /// Carrega de um arquivo TOML existente.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str::<HostConfig>(&content).map_err(|source| {
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })?;
        info!("Configuração carregada de {}", path.display());
        Ok(config)
    }

    /// Como [`HostConfig::load`], mas escreve [`CONFIG_TEMPLATE`] se o
    /// arquivo não existir.
    ///
    /// O template não tem VID/PID, então a criação sempre termina em
    /// [`ConfigError::TemplateCreated`].
    pub fn load_or_create(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            std::fs::write(path, CONFIG_TEMPLATE).map_err(|source| ConfigError::Write {
                path: path.to_path_buf(),
                source,
            })?;
            info!("Template de configuração criado em {}", path.display());
            return Err(ConfigError::TemplateCreated(path.to_path_buf()));
        }
        Self::load(path)
    }

    /// Salva configuração em arquivo TOML.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Configuração salva em {}", path.display());
        Ok(())
    }

    /// Retorna o caminho padrão do `hid-config.toml`.
    pub fn default_path() -> PathBuf {
        let exe_dir = std::env::current_exe()
            .map(|p| p.parent().unwrap_or(Path::new(".")).to_path_buf())
            .unwrap_or_else(|_| PathBuf::from("."));
        exe_dir.join(CONFIG_FILE_NAME)
    }

    pub fn fields(&self) -> FieldSelection {
        FieldSelection {
            cpu: self.send_cpu.0,
            ram: self.send_ram.0,
            gpu: self.send_gpu.0,
            disk: self.send_disk.0,
            date: self.send_date.0,
            time: self.send_time.0,
            volume: self.send_volume.0,
        }
    }

    /// Valida a configuração e retorna lista de erros.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.vendor_id.is_none() {
            errors.push("vendor_id não configurado".into());
        }
        if self.product_id.is_none() {
            errors.push("product_id não configurado".into());
        }
        if self.report_size < MIN_REPORT_SIZE {
            errors.push(format!(
                "report_size inválido: {} (mínimo {MIN_REPORT_SIZE})",
                self.report_size
            ));
        }
        if self.interval > MAX_INTERVAL_SECS {
            errors.push(format!(
                "interval inválido: {}s (máximo {MAX_INTERVAL_SECS}s)",
                self.interval
            ));
        }

        errors
    }

    /// Converte em [`HostSettings`], falhando em qualquer erro de validação.
    pub fn into_settings(self) -> Result<HostSettings, ConfigError> {
        let vendor_id = self
            .vendor_id
            .ok_or(ConfigError::MissingDeviceId("vendor_id"))?;
        let product_id = self
            .product_id
            .ok_or(ConfigError::MissingDeviceId("product_id"))?;

        let errors = self.validate();
        if !errors.is_empty() {
            return Err(ConfigError::Invalid(errors));
        }

        Ok(HostSettings {
            identity: DeviceIdentity::new(vendor_id, product_id),
            report_size: self.report_size,
            interval: Duration::from_secs(self.interval.max(1)),
            recheck_interval: self.recheck_interval,
            fields: self.fields(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> HostConfig {
        toml::from_str(s).unwrap()
    }

    #[test]
    fn ids_accept_strings_and_integers() {
        let config = parse(
            r#"
vendor_id = "0x1A2B"
product_id = 4660
"#,
        );
        assert_eq!(config.vendor_id, Some(0x1A2B));
        assert_eq!(config.product_id, Some(0x1234));
    }

    #[test]
    fn id_literals() {
        assert_eq!(parse_usb_id("0xFFFF"), Ok(0xFFFF));
        assert_eq!(parse_usb_id(" 0X10 "), Ok(16));
        assert_eq!(parse_usb_id("0o17"), Ok(15));
        assert_eq!(parse_usb_id("0b101"), Ok(5));
        assert_eq!(parse_usb_id("1234"), Ok(1234));
        assert!(parse_usb_id("0x10000").is_err());
        assert!(parse_usb_id("vid").is_err());
    }

    #[test]
    fn out_of_range_integer_is_parse_error() {
        assert!(toml::from_str::<HostConfig>("vendor_id = 70000").is_err());
        assert!(toml::from_str::<HostConfig>("vendor_id = -1").is_err());
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let config = parse(
            r#"
vendor_id = "0x1234"
product_id = "0x5678"
"#,
        );
        assert_eq!(config.report_size, 32);
        assert_eq!(config.interval, 10);
        assert_eq!(config.recheck_interval, 10);
        assert_eq!(config.fields(), FieldSelection::default());
    }

    #[test]
    fn flags_follow_y_convention() {
        let config = parse(
            r#"
send_cpu = "Y"
send_ram = "n"
send_gpu = "yes"
send_disk = false
send_date = true
"#,
        );
        let fields = config.fields();
        assert!(fields.cpu);
        assert!(!fields.ram);
        assert!(!fields.gpu);
        assert!(!fields.disk);
        assert!(fields.date);
        assert!(fields.time);
    }

    #[test]
    fn settings_from_valid_config() {
        let config = parse(
            r#"
vendor_id = "0x1234"
product_id = "0x5678"
report_size = 64
interval = 0
recheck_interval = 3
send_volume = "n"
"#,
        );
        let settings = config.into_settings().unwrap();
        assert_eq!(settings.identity, DeviceIdentity::new(0x1234, 0x5678));
        assert_eq!(settings.report_size, 64);
        assert_eq!(settings.interval, Duration::from_secs(1));
        assert_eq!(settings.recheck_interval, 3);
        assert!(!settings.fields.volume);
    }

    #[test]
    fn missing_ids_are_fatal() {
        let err = HostConfig::default().into_settings().unwrap_err();
        assert!(matches!(err, ConfigError::MissingDeviceId("vendor_id")));

        let err = parse(r#"vendor_id = "0x1234""#).into_settings().unwrap_err();
        assert!(matches!(err, ConfigError::MissingDeviceId("product_id")));

        let config = parse(
            r#"
vendor_id = ""
product_id = "0x5678"
"#,
        );
        assert!(config.vendor_id.is_none());
    }

    #[test]
    fn small_report_is_invalid() {
        let err = parse(
            r#"
vendor_id = 1
product_id = 2
report_size = 16
"#,
        )
        .into_settings()
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref e) if e.len() == 1));
    }

    #[test]
    fn huge_interval_is_invalid() {
        let err = parse(
            r#"
vendor_id = 1
product_id = 2
interval = 9223372036854775807
"#,
        )
        .into_settings()
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref e) if e[0].contains("interval")));

        let config = parse(&format!(
            "vendor_id = 1\nproduct_id = 2\ninterval = {MAX_INTERVAL_SECS}"
        ));
        let settings = config.into_settings().unwrap();
        assert_eq!(settings.interval, Duration::from_secs(MAX_INTERVAL_SECS));
    }

    #[test]
    fn template_parses_to_defaults() {
        assert!(CONFIG_TEMPLATE.lines().any(|l| l.starts_with('#')));

        let config = parse(CONFIG_TEMPLATE);
        let defaults = HostConfig::default();
        assert_eq!(config.vendor_id, None);
        assert_eq!(config.product_id, None);
        assert_eq!(config.report_size, defaults.report_size);
        assert_eq!(config.interval, defaults.interval);
        assert_eq!(config.recheck_interval, defaults.recheck_interval);
        assert_eq!(config.fields(), defaults.fields());
    }

    #[test]
    fn default_config_roundtrips_through_toml() {
        let mut config = HostConfig::default();
        config.vendor_id = Some(0x1234);
        config.send_gpu = Toggle(false);
        let text = toml::to_string_pretty(&config).unwrap();
        assert!(text.contains(r#"vendor_id = "0x1234""#));
        assert!(text.contains(r#"product_id = """#));

        let dir = std::env::temp_dir().join(format!("hid-config-save-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(CONFIG_FILE_NAME);
        config.save(&path).unwrap();
        let parsed = HostConfig::load(&path).unwrap();
        let _ = std::fs::remove_dir_all(&dir);

        assert_eq!(parsed.vendor_id, Some(0x1234));
        assert_eq!(parsed.product_id, None);
        assert!(!parsed.fields().gpu);
    }

    #[test]
    fn missing_file_creates_template() {
        let dir = std::env::temp_dir().join(format!("hid-config-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(CONFIG_FILE_NAME);
        let _ = std::fs::remove_file(&path);

        let err = HostConfig::load_or_create(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TemplateCreated(_)));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), CONFIG_TEMPLATE);

        // Segunda carga lê o template, que ainda não tem VID/PID
        let config = HostConfig::load_or_create(&path).unwrap();
        assert!(matches!(
            config.into_settings(),
            Err(ConfigError::MissingDeviceId("vendor_id"))
        ));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
