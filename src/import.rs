//! Spreadsheet parsing for bulk product import, plus the downloadable template.
//!
//! Both formats are read as a header row followed by data rows. Columns are
//! recognised by header name, so their order does not matter and unknown
//! columns are ignored.

use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};
use rust_xlsxwriter::{Workbook, XlsxError};

use crate::{
    dto::products::{ProductFields, parse_price},
    error::{AppError, AppResult},
};

pub const TEMPLATE_HEADERS: [&str; 4] = ["name", "price", "description", "imageUrl"];
pub const TEMPLATE_FILE_NAME: &str = "products-template.xlsx";
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const TEMPLATE_SHEET: &str = "Products";
const TEMPLATE_ROWS: [(&str, f64, &str, &str); 2] = [
    (
        "Blue T-Shirt",
        49.9,
        "Basic blue cotton t-shirt",
        "https://example.com/images/blue-shirt.jpg",
    ),
    (
        "Slim Jeans",
        129.9,
        "Slim fit denim jeans",
        "https://example.com/images/slim-jeans.jpg",
    ),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    Csv,
    Xlsx,
}

impl SheetFormat {
    pub fn from_file_name(name: &str) -> Option<Self> {
        let lower = name.trim().to_ascii_lowercase();
        if lower.ends_with(".csv") {
            Some(SheetFormat::Csv)
        } else if lower.ends_with(".xlsx") {
            Some(SheetFormat::Xlsx)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Name,
    Price,
    Description,
    ImageUrl,
}

fn column_for_header(header: &str) -> Option<Column> {
    let key: String = header
        .trim_start_matches('\u{feff}')
        .chars()
        .filter(|c| !matches!(c, '_' | ' ' | '-'))
        .collect::<String>()
        .to_ascii_lowercase();
    match key.as_str() {
        "name" => Some(Column::Name),
        "price" => Some(Column::Price),
        "description" => Some(Column::Description),
        "imageurl" | "image" => Some(Column::ImageUrl),
        _ => None,
    }
}

/// One data row with the cells of the recognised columns.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub name: Option<String>,
    pub price: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

impl RawRow {
    fn set(&mut self, column: Column, value: String) {
        let value = value.trim().to_string();
        if value.is_empty() {
            return;
        }
        let slot = match column {
            Column::Name => &mut self.name,
            Column::Price => &mut self.price,
            Column::Description => &mut self.description,
            Column::ImageUrl => &mut self.image_url,
        };
        *slot = Some(value);
    }

    /// `None` when any required cell is empty or the price is not a
    /// non-negative number.
    pub fn into_fields(self) -> Option<ProductFields> {
        let price = parse_price(self.price.as_deref()?)?;
        Some(ProductFields {
            name: self.name?,
            description: self.description?,
            price,
            image_url: self.image_url?,
        })
    }
}

pub fn read_rows(format: SheetFormat, bytes: &[u8]) -> AppResult<Vec<RawRow>> {
    match format {
        SheetFormat::Csv => read_csv(bytes),
        SheetFormat::Xlsx => read_xlsx(bytes),
    }
}

/// Drops incomplete rows.
pub fn valid_products(rows: Vec<RawRow>) -> Vec<ProductFields> {
    rows.into_iter().filter_map(RawRow::into_fields).collect()
}

fn rows_from_table<I>(headers: &[String], rows: I) -> Vec<RawRow>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let columns: Vec<Option<Column>> = headers.iter().map(|h| column_for_header(h)).collect();
    rows.into_iter()
        .map(|cells| {
            let mut row = RawRow::default();
            for (column, value) in columns.iter().zip(cells) {
                if let Some(column) = column {
                    row.set(*column, value);
                }
            }
            row
        })
        .collect()
}

fn read_csv(bytes: &[u8]) -> AppResult<Vec<RawRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| AppError::validation(format!("Could not read CSV file: {e}")))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record =
            record.map_err(|e| AppError::validation(format!("Could not read CSV file: {e}")))?;
        rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }

    Ok(rows_from_table(&headers, rows))
}

fn read_xlsx(bytes: &[u8]) -> AppResult<Vec<RawRow>> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))
        .map_err(|e| AppError::validation(format!("Could not read XLSX file: {e}")))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::validation("XLSX file has no sheets"))?
        .map_err(|e| AppError::validation(format!("Could not read XLSX file: {e}")))?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(Vec::new());
    };
    let headers: Vec<String> = header_row.iter().map(cell_text).collect();

    Ok(rows_from_table(
        &headers,
        rows.map(|row| row.iter().map(cell_text).collect::<Vec<_>>()),
    ))
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        other => other.to_string(),
    }
}

/// XLSX workbook with the expected header row and two sample products.
pub fn build_template() -> AppResult<Vec<u8>> {
    write_template().map_err(|e| AppError::Internal(anyhow::Error::new(e)))
}

fn write_template() -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(TEMPLATE_SHEET)?;

    for (col, header) in (0u16..).zip(TEMPLATE_HEADERS) {
        sheet.write_string(0, col, header)?;
    }
    for (row, (name, price, description, image_url)) in (1u32..).zip(TEMPLATE_ROWS) {
        sheet.write_string(row, 0, name)?;
        sheet.write_number(row, 1, price)?;
        sheet.write_string(row, 2, description)?;
        sheet.write_string(row, 3, image_url)?;
    }

    workbook.save_to_buffer()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn headers_are_matched_loosely() {
        assert_eq!(column_for_header("imageUrl"), Some(Column::ImageUrl));
        assert_eq!(column_for_header("image_url"), Some(Column::ImageUrl));
        assert_eq!(column_for_header(" Price "), Some(Column::Price));
        assert_eq!(column_for_header("\u{feff}name"), Some(Column::Name));
        assert_eq!(column_for_header("sku"), None);
    }

    #[test]
    fn csv_rows_follow_header_order() {
        let csv = "price,name,imageUrl,description,sku\n10.5,Mug,http://x/mug.jpg,A mug,M-1\n";
        let rows = read_rows(SheetFormat::Csv, csv.as_bytes()).unwrap();
        let fields = valid_products(rows);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "Mug");
        assert_eq!(fields[0].price, dec!(10.50));
        assert_eq!(fields[0].image_url, "http://x/mug.jpg");
    }

    #[test]
    fn template_round_trips_through_the_xlsx_reader() {
        let bytes = build_template().unwrap();
        let rows = read_rows(SheetFormat::Xlsx, &bytes).unwrap();
        let fields = valid_products(rows);
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].name, "Blue T-Shirt");
        assert_eq!(fields[0].price, dec!(49.90));
        assert_eq!(fields[1].price, dec!(129.90));
    }
}
