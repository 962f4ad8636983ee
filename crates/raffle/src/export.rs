//! Spreadsheet reports of the board.
//!
//! A report is first built as a plain [`Report`] (rows of [`Cell`]s) from one
//! snapshot of the store, then rendered to XLSX. Tests inspect the model; the
//! HTTP layer only sees the rendered [`ExportFile`].

use chrono::{DateTime, Utc};
use rust_xlsxwriter::{Workbook, XlsxError};

use crate::config::RaffleConfig;
use crate::error::RaffleError;
use crate::types::Slot;

/// MIME type of the rendered workbook.
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Which report to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// Every slot with status, name and last update.
    Full,
    /// Taken slots only, numbered, plus the collected total.
    Occupied,
}

impl ReportKind {
    /// Download file name stamped with `now`.
    pub fn file_name(&self, now: DateTime<Utc>) -> String {
        let stamp = now.format("%Y%m%d_%H%M");
        match self {
            Self::Full => format!("rifa_{stamp}.xlsx"),
            Self::Occupied => format!("rifa_ocupados_{stamp}.xlsx"),
        }
    }
}

/// A single spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
}

impl Cell {
    fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }
}

/// Spreadsheet content before rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub sheet_name: &'static str,
    pub column_width: f64,
    /// Title block above the table. An empty row renders as a blank line.
    pub preamble: Vec<Vec<Cell>>,
    pub columns: Vec<&'static str>,
    /// One row per exported slot.
    pub rows: Vec<Vec<Cell>>,
    /// Summary block below the table (occupied report only).
    pub summary: Vec<Vec<Cell>>,
    /// Collected total, when the report computes one.
    pub total: Option<f64>,
}

/// A rendered report ready to be served as a download.
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

fn preamble(config: &RaffleConfig) -> Vec<Vec<Cell>> {
    let mut rows = vec![
        vec![Cell::text(&config.title)],
        vec![Cell::text(&config.prize_text), Cell::text(&config.date_text)],
    ];
    if !config.bank_info.is_empty() {
        rows.push(vec![Cell::text(format!(
            "Datos bancarios: {}",
            config.bank_info
        ))]);
    }
    rows
}

/// Build the report of all slots.
pub fn full_report(slots: &[Slot], config: &RaffleConfig) -> Report {
    let mut preamble = preamble(config);
    preamble.push(Vec::new());

    let rows = slots
        .iter()
        .map(|slot| {
            vec![
                Cell::text(slot.id.to_string()),
                Cell::text(if slot.taken { "Ocupado" } else { "Libre" }),
                Cell::text(&slot.claimant_name),
                Cell::text(slot.updated_at.format(TIMESTAMP_FORMAT).to_string()),
            ]
        })
        .collect();

    Report {
        sheet_name: "Rifa 00-99",
        column_width: 20.0,
        preamble,
        columns: vec!["Número", "Estado", "Nombre", "Actualizado"],
        rows,
        summary: Vec::new(),
        total: None,
    }
}

/// Build the report of taken slots and the collected total.
pub fn occupied_report(slots: &[Slot], config: &RaffleConfig) -> Report {
    let price = config.price_per_slot;
    let mut preamble = preamble(config);
    preamble.push(vec![Cell::text(format!(
        "Precio por número (valor numérico): {price}"
    ))]);
    preamble.push(Vec::new());

    let rows: Vec<Vec<Cell>> = slots
        .iter()
        .filter(|slot| slot.taken)
        .enumerate()
        .map(|(i, slot)| {
            vec![
                Cell::Number((i + 1) as f64),
                Cell::text(slot.id.to_string()),
                Cell::text(&slot.claimant_name),
                Cell::text(slot.updated_at.format(TIMESTAMP_FORMAT).to_string()),
            ]
        })
        .collect();

    let count = rows.len();
    let total = count as f64 * price;

    Report {
        sheet_name: "Participantes",
        column_width: 22.0,
        preamble,
        columns: vec!["#", "Número", "Nombre", "Fecha/Hora (UTC)"],
        rows,
        summary: vec![
            Vec::new(),
            vec![Cell::text("Total ocupados"), Cell::Number(count as f64)],
            vec![Cell::text("Precio por número"), Cell::Number(price)],
            vec![Cell::text("Total recaudado"), Cell::Number(total)],
        ],
        total: Some(total),
    }
}

fn export_error(e: XlsxError) -> RaffleError {
    RaffleError::Export {
        reason: format!("spreadsheet rendering failed: {e}"),
        source: Some(Box::new(e)),
    }
}

impl Report {
    /// Build the report of the given kind.
    pub fn build(kind: ReportKind, slots: &[Slot], config: &RaffleConfig) -> Self {
        match kind {
            ReportKind::Full => full_report(slots, config),
            ReportKind::Occupied => occupied_report(slots, config),
        }
    }

    /// Render to an XLSX workbook with a single sheet.
    pub fn to_xlsx(&self) -> Result<Vec<u8>, RaffleError> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name(self.sheet_name).map_err(export_error)?;

        let header: Vec<Cell> = self.columns.iter().map(|c| Cell::text(*c)).collect();
        let lines = self
            .preamble
            .iter()
            .chain(std::iter::once(&header))
            .chain(self.rows.iter())
            .chain(self.summary.iter());

        for (row, cells) in lines.enumerate() {
            let row = row as u32;
            for (col, cell) in cells.iter().enumerate() {
                let col = col as u16;
                match cell {
                    Cell::Text(s) => sheet.write_string(row, col, s.as_str()),
                    Cell::Number(n) => sheet.write_number(row, col, *n),
                }
                .map_err(export_error)?;
            }
        }

        for col in 0..self.columns.len() as u16 {
            sheet
                .set_column_width(col, self.column_width)
                .map_err(export_error)?;
        }

        workbook.save_to_buffer().map_err(export_error)
    }

    /// Render and wrap as a download stamped with `now`.
    pub fn into_file(self, kind: ReportKind, now: DateTime<Utc>) -> Result<ExportFile, RaffleError> {
        Ok(ExportFile {
            file_name: kind.file_name(now),
            content_type: XLSX_MIME,
            bytes: self.to_xlsx()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SlotId;
    use chrono::TimeZone;

    fn board(taken: &[(u8, &str)]) -> Vec<Slot> {
        let at = Utc.with_ymd_and_hms(2026, 12, 24, 18, 30, 5).unwrap();
        SlotId::all()
            .map(|id| {
                let mut slot = Slot::free(id, at);
                if let Some((_, name)) = taken.iter().find(|(n, _)| *n == id.value()) {
                    slot.taken = true;
                    slot.claimant_name = name.to_string();
                }
                slot
            })
            .collect()
    }

    #[test]
    fn full_report_has_one_row_per_slot() {
        let report = full_report(&board(&[(7, "Ana")]), &RaffleConfig::default());
        assert_eq!(report.rows.len(), 100);
        assert_eq!(report.total, None);
        assert_eq!(
            report.rows[7],
            vec![
                Cell::text("07"),
                Cell::text("Ocupado"),
                Cell::text("Ana"),
                Cell::text("2026-12-24 18:30:05"),
            ]
        );
        assert_eq!(report.rows[8][1], Cell::text("Libre"));
    }

    #[test]
    fn preamble_includes_bank_info_only_when_set() {
        let plain = full_report(&board(&[]), &RaffleConfig::default());
        assert_eq!(plain.preamble.len(), 3);

        let config = RaffleConfig {
            bank_info: "CBU 123".into(),
            ..Default::default()
        };
        let with_bank = full_report(&board(&[]), &config);
        assert_eq!(with_bank.preamble.len(), 4);
        assert_eq!(
            with_bank.preamble[2],
            vec![Cell::text("Datos bancarios: CBU 123")]
        );
    }

    #[test]
    fn occupied_report_numbers_taken_slots_and_totals() {
        let config = RaffleConfig {
            price_per_slot: 2500.0,
            ..Default::default()
        };
        let report = occupied_report(&board(&[(3, "Ana"), (42, "Luis"), (99, "Eva")]), &config);

        assert_eq!(report.rows.len(), 3);
        assert_eq!(report.rows[0][0], Cell::Number(1.0));
        assert_eq!(report.rows[0][1], Cell::text("03"));
        assert_eq!(report.rows[2][0], Cell::Number(3.0));
        assert_eq!(report.rows[2][2], Cell::text("Eva"));
        assert_eq!(report.total, Some(7500.0));
        assert_eq!(
            report.summary.last(),
            Some(&vec![Cell::text("Total recaudado"), Cell::Number(7500.0)])
        );
    }

    #[test]
    fn occupied_report_of_empty_board() {
        let report = occupied_report(&board(&[]), &RaffleConfig::default());
        assert!(report.rows.is_empty());
        assert_eq!(report.total, Some(0.0));
    }

    #[test]
    fn renders_xlsx_archive() {
        let report = occupied_report(&board(&[(1, "Ana")]), &RaffleConfig::default());
        let bytes = report.to_xlsx().unwrap();
        // XLSX is a zip container.
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn file_names_are_stamped() {
        let now = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 0).unwrap();
        assert_eq!(ReportKind::Full.file_name(now), "rifa_20260102_0304.xlsx");
        assert_eq!(
            ReportKind::Occupied.file_name(now),
            "rifa_ocupados_20260102_0304.xlsx"
        );
    }
}
