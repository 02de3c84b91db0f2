//! Layout binário do relatório enviado ao display.
//!
//! O firmware lê campos ASCII em posições fixas. Campos desativados são
//! preenchidos com `'0'`, nunca omitidos, para o layout não mudar quando a
//! configuração muda:
//!
//! ```text
//! ┌────┬─────┬─────┬─────┬──────┬────────┬──────┬─────┬──────────┐
//! │ 0  │ CPU │ RAM │ GPU │ Disk │ DDMMYY │ HHMM │ Vol │ 0x00 ... │
//! │ 1B │ 3B  │ 3B  │ 3B  │ 3B   │ 6B     │ 4B   │ 3B  │ até N    │
//! └────┴─────┴─────┴─────┴──────┴────────┴──────┴─────┴──────────┘
//! ```
//!
//! Mudar este layout exige atualizar o firmware junto.

use crate::types::{FieldSelection, MetricsSnapshot, Report};
use std::ops::Range;

/// Byte 0: reservado / report ID, sempre 0.
pub const RESERVED_BYTE: usize = 0;
pub const CPU_FIELD: Range<usize> = 1..4;
pub const RAM_FIELD: Range<usize> = 4..7;
pub const GPU_FIELD: Range<usize> = 7..10;
pub const DISK_FIELD: Range<usize> = 10..13;
pub const DATE_FIELD: Range<usize> = 13..19;
pub const TIME_FIELD: Range<usize> = 19..23;
pub const VOLUME_FIELD: Range<usize> = 23..26;

/// Menor relatório que comporta todos os campos.
pub const MIN_REPORT_SIZE: usize = 26;

/// Tamanho usual de um relatório raw HID.
pub const DEFAULT_REPORT_SIZE: usize = 32;

/// Erros do protocolo.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("report_size {size} é pequeno demais (mínimo {min})")]
    ReportTooSmall { size: usize, min: usize },
}

/// Codifica uma amostra no relatório de `report_size` bytes.
///
/// Percentuais fora de 0–100 sofrem clamp. Função pura.
pub fn encode_report(
    snapshot: &MetricsSnapshot,
    fields: &FieldSelection,
    report_size: usize,
) -> Result<Report, ProtocolError> {
    if report_size < MIN_REPORT_SIZE {
        return Err(ProtocolError::ReportTooSmall {
            size: report_size,
            min: MIN_REPORT_SIZE,
        });
    }

    let mut buf = vec![0u8; report_size];
    buf[RESERVED_BYTE] = 0;

    put_percent(&mut buf, CPU_FIELD, fields.cpu, snapshot.cpu_percent);
    put_percent(&mut buf, RAM_FIELD, fields.ram, snapshot.ram_percent);
    put_percent(&mut buf, GPU_FIELD, fields.gpu, snapshot.gpu_percent);
    put_percent(&mut buf, DISK_FIELD, fields.disk, snapshot.disk_percent);

    let date = snapshot.timestamp.format("%d%m%y").to_string();
    put_ascii(&mut buf, DATE_FIELD, fields.date.then_some(date.as_str()));

    let time = snapshot.timestamp.format("%H%M").to_string();
    put_ascii(&mut buf, TIME_FIELD, fields.time.then_some(time.as_str()));

    put_percent(&mut buf, VOLUME_FIELD, fields.volume, snapshot.volume_percent);

    Ok(Report::from_bytes(buf))
}

/// Padrão de teste `0, 1, 2, …` (mod 256) do tamanho do relatório.
///
/// Útil para conferir no firmware se todos os bytes chegam na ordem.
pub fn test_pattern(report_size: usize) -> Report {
    Report::from_bytes((0..report_size).map(|i| (i % 256) as u8).collect())
}

fn put_percent(buf: &mut [u8], range: Range<usize>, enabled: bool, value: i32) {
    let text = format!("{:03}", value.clamp(0, 100));
    put_ascii(buf, range, enabled.then_some(text.as_str()));
}

/// Escreve `text` no intervalo; `None` vira `'0'` em todo o campo.
fn put_ascii(buf: &mut [u8], range: Range<usize>, text: Option<&str>) {
    let field = &mut buf[range];
    match text {
        Some(text) => {
            debug_assert_eq!(text.len(), field.len(), "largura errada: {text:?}");
            if text.len() == field.len() {
                field.copy_from_slice(text.as_bytes());
            } else {
                field.fill(b'0');
            }
        }
        None => field.fill(b'0'),
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_snapshot() -> MetricsSnapshot {
        MetricsSnapshot {
            cpu_percent: 45,
            ram_percent: 78,
            disk_percent: 60,
            gpu_percent: 0,
            volume_percent: 30,
            timestamp: NaiveDate::from_ymd_opt(2024, 3, 5)
                .and_then(|d| d.and_hms_opt(14, 7, 0))
                .unwrap(),
        }
    }

    fn field(report: &Report, range: Range<usize>) -> &str {
        std::str::from_utf8(&report.as_bytes()[range]).unwrap()
    }

    #[test]
    fn full_report_layout() {
        let report = encode_report(&sample_snapshot(), &FieldSelection::default(), 32).unwrap();
        let bytes = report.as_bytes();

        assert_eq!(bytes.len(), 32);
        assert_eq!(bytes[0], 0);
        assert_eq!(&bytes[1..26], b"0450780000600503241407030" as &[u8]);
        assert!(bytes[26..].iter().all(|&b| b == 0));
    }

    #[test]
    fn disabled_gpu_is_zero_padded() {
        let fields = FieldSelection {
            gpu: false,
            ..Default::default()
        };
        let mut snapshot = sample_snapshot();
        snapshot.gpu_percent = 87;

        let report = encode_report(&snapshot, &fields, 32).unwrap();
        assert_eq!(field(&report, GPU_FIELD), "000");
        assert_eq!(field(&report, CPU_FIELD), "045");
        assert_eq!(field(&report, DISK_FIELD), "060");
    }

    #[test]
    fn disabled_gpu_with_zero_reading() {
        let fields = FieldSelection {
            gpu: false,
            ..Default::default()
        };
        let report = encode_report(&sample_snapshot(), &fields, 32).unwrap();
        assert_eq!(&report.as_bytes()[1..26], b"0450780000600503241407030" as &[u8]);
    }

    #[test]
    fn everything_disabled_is_ascii_zeros() {
        let report = encode_report(&sample_snapshot(), &FieldSelection::none(), 32).unwrap();
        let bytes = report.as_bytes();
        assert_eq!(bytes[0], 0);
        assert!(bytes[1..MIN_REPORT_SIZE].iter().all(|&b| b == b'0'));
        assert!(bytes[MIN_REPORT_SIZE..].iter().all(|&b| b == 0));
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let mut snapshot = sample_snapshot();
        snapshot.cpu_percent = 150;
        snapshot.ram_percent = -5;
        snapshot.volume_percent = 101;

        let report = encode_report(&snapshot, &FieldSelection::default(), 32).unwrap();
        assert_eq!(field(&report, CPU_FIELD), "100");
        assert_eq!(field(&report, RAM_FIELD), "000");
        assert_eq!(field(&report, VOLUME_FIELD), "100");
    }

    #[test]
    fn percent_fields_are_zero_padded_decimal() {
        let mut snapshot = sample_snapshot();
        for value in [0, 7, 42, 99, 100] {
            snapshot.disk_percent = value;
            let report = encode_report(&snapshot, &FieldSelection::default(), 32).unwrap();
            assert_eq!(field(&report, DISK_FIELD), format!("{value:03}"));
        }
    }

    #[test]
    fn date_and_time_use_ddmmyy_hhmm() {
        let mut snapshot = sample_snapshot();
        snapshot.timestamp = NaiveDate::from_ymd_opt(1999, 12, 31)
            .and_then(|d| d.and_hms_opt(23, 59, 58))
            .unwrap();
        let report = encode_report(&snapshot, &FieldSelection::default(), 32).unwrap();
        assert_eq!(field(&report, DATE_FIELD), "311299");
        assert_eq!(field(&report, TIME_FIELD), "2359");
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "largura errada")]
    fn wrong_width_text_is_caught_in_debug() {
        let mut buf = [0u8; MIN_REPORT_SIZE];
        put_ascii(&mut buf, CPU_FIELD, Some("1234"));
    }

    #[test]
    fn disabled_field_fills_zeros() {
        let mut buf = [0xFFu8; MIN_REPORT_SIZE];
        put_ascii(&mut buf, DATE_FIELD, None);
        assert_eq!(&buf[DATE_FIELD], b"000000");
        assert_eq!(buf[DATE_FIELD.start - 1], 0xFF);
        assert_eq!(buf[DATE_FIELD.end], 0xFF);
    }

    #[test]
    fn minimum_size_has_no_padding() {
        let report =
            encode_report(&sample_snapshot(), &FieldSelection::default(), MIN_REPORT_SIZE).unwrap();
        assert_eq!(report.len(), MIN_REPORT_SIZE);
        assert_eq!(field(&report, VOLUME_FIELD), "030");
    }

    #[test]
    fn large_report_is_zero_filled() {
        let report = encode_report(&sample_snapshot(), &FieldSelection::default(), 65).unwrap();
        assert_eq!(report.len(), 65);
        assert!(report.as_bytes()[26..].iter().all(|&b| b == 0));
    }

    #[test]
    fn rejects_small_report() {
        assert_eq!(
            encode_report(&sample_snapshot(), &FieldSelection::default(), 25),
            Err(ProtocolError::ReportTooSmall { size: 25, min: 26 })
        );
    }

    #[test]
    fn test_pattern_counts_up() {
        let report = test_pattern(300);
        let bytes = report.as_bytes();
        assert_eq!(bytes[0], 0);
        assert_eq!(bytes[1], 1);
        assert_eq!(bytes[255], 255);
        assert_eq!(bytes[256], 0);
        assert_eq!(bytes.len(), 300);
    }
}
