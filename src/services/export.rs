// src/services/export.rs
// Planilha "Tabela de Operações"

use rust_decimal::{prelude::ToPrimitive, Decimal};
use rust_xlsxwriter::{Format, Workbook};

use crate::{common::error::AppError, models::operation::Operation};

pub const EXPORT_FILE_NAME: &str = "Tabela de Operações.xlsx";
pub const EXPORT_SHEET_NAME: &str = "Tabela de Operações";
pub const EXPORT_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const HEADERS: [&str; 7] = [
    "cliente",
    "tipoDeOperacao",
    "dataDaOperacao",
    "statusDaOperacao",
    "valorLiberado",
    "comissao",
    "valorRecebido",
];

#[derive(Debug, Clone, PartialEq)]
pub struct OperationExportRow {
    pub cliente: String,
    pub tipo_de_operacao: String,
    /// dd/mm/aaaa
    pub data_da_operacao: String,
    pub status_da_operacao: &'static str,
    pub valor_liberado: Decimal,
    pub comissao: Decimal,
    pub valor_recebido: Decimal,
}

impl From<&Operation> for OperationExportRow {
    fn from(op: &Operation) -> Self {
        Self {
            cliente: op.cliente.clone(),
            tipo_de_operacao: op.dados.tipo_da_operacao.clone(),
            data_da_operacao: op.dados.data_da_operacao.format("%d/%m/%Y").to_string(),
            status_da_operacao: op.dados.status_da_operacao.as_str(),
            valor_liberado: op.dados.valor_liberado,
            comissao: op.dados.comissao,
            valor_recebido: op.valor_recebido,
        }
    }
}

pub fn to_export_rows(operations: &[Operation]) -> Vec<OperationExportRow> {
    operations.iter().map(OperationExportRow::from).collect()
}

/// Content-Disposition do download; o nome acentuado vai no `filename*`.
pub fn content_disposition() -> String {
    let ascii: String = EXPORT_FILE_NAME
        .chars()
        .map(|c| match c {
            'ç' => 'c',
            'õ' => 'o',
            c if c.is_ascii() => c,
            _ => '_',
        })
        .collect();
    let encoded: String = EXPORT_FILE_NAME
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'.' | b'-' | b'_' => (b as char).to_string(),
            _ => format!("%{:02X}", b),
        })
        .collect();
    format!("attachment; filename=\"{}\"; filename*=UTF-8''{}", ascii, encoded)
}

/// Monta o .xlsx em memória: cabeçalho na linha 0, valores como números.
pub fn write_xlsx(rows: &[OperationExportRow]) -> Result<Vec<u8>, AppError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let money = Format::new().set_num_format("#,##0.00");

    let sheet = workbook.add_worksheet();
    sheet.set_name(EXPORT_SHEET_NAME)?;

    for (col, header) in HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &bold)?;
    }

    for (i, row) in rows.iter().enumerate() {
        let line = i as u32 + 1;
        sheet.write_string(line, 0, &row.cliente)?;
        sheet.write_string(line, 1, &row.tipo_de_operacao)?;
        sheet.write_string(line, 2, &row.data_da_operacao)?;
        sheet.write_string(line, 3, row.status_da_operacao)?;
        for (col, value) in [(4, row.valor_liberado), (5, row.comissao), (6, row.valor_recebido)] {
            sheet.write_number_with_format(line, col, value.to_f64().unwrap_or_default(), &money)?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}
