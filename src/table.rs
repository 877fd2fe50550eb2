//! Recipe table loading
//!
//! Reads recipe rows from CSV or Excel sheets (or a directory of them, or a
//! SQLite database written by `import`). Each sheet has one row per recipe
//! variant: an output item, a batch yield and up to eight
//! material/quantity column pairs. Japanese headers (完成品名, 完成個数,
//! 材料N, 必要数N) are accepted as well.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use calamine::{Reader, open_workbook_auto};
use csv::ReaderBuilder;
use regex::Regex;
use walkdir::WalkDir;

use crate::catalog::RecipeCatalog;
use crate::db;
use crate::error::{MalformedRow, TableError};
use crate::models::{Ingredient, MAX_INGREDIENT_SLOTS, RecipeRow};

static MATERIAL_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:material_slot_|材料)(\d+)$").expect("valid regex"));
static QUANTITY_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:required_qty_slot_|必要数)(\d+)$").expect("valid regex"));

const OUTPUT_HEADERS: &[&str] = &["output_item", "完成品名"];
const YIELD_HEADERS: &[&str] = &["yield_per_batch", "完成個数"];

/// Header row plus data rows, every cell trimmed
#[derive(Debug, Default)]
struct RawTable {
    headers: Vec<String>,
    records: Vec<Vec<String>>,
}

/// Column positions resolved from a header row
#[derive(Debug)]
struct ColumnLayout {
    output: usize,
    yield_per_batch: usize,
    // (slot number, material column, quantity column)
    slots: Vec<(usize, Option<usize>, Option<usize>)>,
}

impl ColumnLayout {
    fn from_headers(headers: &[String]) -> Result<Self, TableError> {
        let find = |names: &[&str]| headers.iter().position(|h| names.contains(&h.as_str()));

        let output = find(OUTPUT_HEADERS).ok_or(TableError::MissingColumn("output_item"))?;
        let yield_per_batch =
            find(YIELD_HEADERS).ok_or(TableError::MissingColumn("yield_per_batch"))?;

        let mut slots: Vec<(usize, Option<usize>, Option<usize>)> = (1..=MAX_INGREDIENT_SLOTS)
            .map(|slot| (slot, None, None))
            .collect();

        for (col, header) in headers.iter().enumerate() {
            if let Some(slot) = slot_number(&MATERIAL_HEADER, header) {
                slots[slot - 1].1 = Some(col);
            } else if let Some(slot) = slot_number(&QUANTITY_HEADER, header) {
                slots[slot - 1].2 = Some(col);
            }
        }

        slots.retain(|(_, material, quantity)| material.is_some() || quantity.is_some());

        Ok(Self {
            output,
            yield_per_batch,
            slots,
        })
    }
}

fn slot_number(pattern: &Regex, header: &str) -> Option<usize> {
    let slot: usize = pattern.captures(header)?[1].parse().ok()?;
    if (1..=MAX_INGREDIENT_SLOTS).contains(&slot) {
        Some(slot)
    } else {
        tracing::debug!(header, "ignoring ingredient column beyond slot limit");
        None
    }
}

/// Summary of a table load
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LoadStats {
    pub files: usize,
    pub rows: usize,
    pub skipped: usize,
}

impl std::fmt::Display for LoadStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Loaded {} recipe rows from {} file(s). Skipped malformed rows: {}",
            self.rows, self.files, self.skipped
        )
    }
}

/// Build a catalog from `path`, or an empty catalog if anything goes wrong
///
/// Never returns a partially loaded table: a file that cannot be read
/// empties the whole catalog. Malformed rows are skipped individually.
pub fn load_catalog(path: &Path) -> RecipeCatalog {
    match read_rows(path) {
        Ok((rows, stats)) => {
            tracing::info!(
                path = %path.display(),
                rows = stats.rows,
                skipped = stats.skipped,
                "recipe table loaded"
            );
            RecipeCatalog::from_rows(rows)
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "failed to load recipe table");
            RecipeCatalog::default()
        }
    }
}

/// Read every recipe row from a file, directory or database
pub fn read_rows(path: &Path) -> Result<(Vec<RecipeRow>, LoadStats), TableError> {
    let mut stats = LoadStats::default();
    let mut rows = Vec::new();

    if path.is_dir() {
        for file in find_table_files(path) {
            rows.extend(read_file_rows(&file, &mut stats)?);
        }
    } else {
        rows.extend(read_file_rows(path, &mut stats)?);
    }

    Ok((rows, stats))
}

/// Find all recipe sheets under a directory, sorted by path
pub fn find_table_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| matches!(extension(p).as_str(), "csv" | "xlsx" | "xls"))
        .collect();
    files.sort();
    files
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

fn read_file_rows(path: &Path, stats: &mut LoadStats) -> Result<Vec<RecipeRow>, TableError> {
    let table = match extension(path).as_str() {
        "csv" => read_csv(path)?,
        "xlsx" | "xls" => read_excel(path)?,
        "db" | "sqlite" | "sqlite3" => {
            let conn = db::open_existing(path)?;
            let rows = db::load_rows(&conn)?;
            stats.files += 1;
            stats.rows += rows.len();
            return Ok(rows);
        }
        other => return Err(TableError::UnsupportedFormat(other.to_string())),
    };

    let layout = ColumnLayout::from_headers(&table.headers)?;
    let mut rows = Vec::new();

    for (idx, record) in table.records.iter().enumerate() {
        // Header is line 1
        let line = idx + 2;
        match parse_row(&layout, record) {
            Ok(row) => rows.push(row),
            Err(reason) => {
                tracing::warn!(
                    file = %path.display(),
                    line,
                    %reason,
                    "skipping malformed recipe row"
                );
                stats.skipped += 1;
            }
        }
    }

    stats.files += 1;
    stats.rows += rows.len();
    Ok(rows)
}

fn read_csv(path: &Path) -> Result<RawTable, TableError> {
    let file = File::open(path).map_err(|source| TableError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let headers = reader
        .headers()?
        .iter()
        .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        let cells: Vec<String> = record.iter().map(|c| c.trim().to_string()).collect();
        if cells.iter().all(String::is_empty) {
            continue;
        }
        records.push(cells);
    }

    Ok(RawTable { headers, records })
}

fn read_excel(path: &Path) -> Result<RawTable, TableError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| TableError::Excel(e.to_string()))?;

    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| TableError::Excel("workbook has no sheets".to_string()))?;
    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| TableError::Excel(e.to_string()))?;

    let mut rows = range.rows();
    let headers = rows
        .next()
        .ok_or_else(|| TableError::Excel("sheet has no header row".to_string()))?
        .iter()
        .map(|cell| cell.to_string().trim().to_string())
        .collect();

    let mut records = Vec::new();
    for row in rows {
        let cells: Vec<String> = row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();
        if cells.iter().all(String::is_empty) {
            continue;
        }
        records.push(cells);
    }

    Ok(RawTable { headers, records })
}

fn cell(record: &[String], col: Option<usize>) -> &str {
    col.and_then(|c| record.get(c)).map(String::as_str).unwrap_or("")
}

/// Convert one data row into a recipe, filtering blank ingredient slots
fn parse_row(layout: &ColumnLayout, record: &[String]) -> Result<RecipeRow, MalformedRow> {
    let output_item = cell(record, Some(layout.output));
    if output_item.is_empty() {
        return Err(MalformedRow::EmptyOutput);
    }

    let raw_yield = cell(record, Some(layout.yield_per_batch));
    let yield_per_batch =
        parse_yield(raw_yield).ok_or_else(|| MalformedRow::InvalidYield(raw_yield.to_string()))?;

    let mut ingredients = Vec::new();
    for &(slot, material_col, quantity_col) in &layout.slots {
        let material = cell(record, material_col);
        let quantity = cell(record, quantity_col);

        match (material.is_empty(), quantity.is_empty()) {
            (true, true) => continue,
            (true, false) => {
                return Err(MalformedRow::MissingMaterial {
                    slot,
                    quantity: quantity.to_string(),
                });
            }
            _ => {}
        }

        let amount = parse_quantity(quantity).ok_or_else(|| MalformedRow::InvalidQuantity {
            slot,
            material: material.to_string(),
            quantity: quantity.to_string(),
        })?;
        ingredients.push(Ingredient::new(material, amount));
    }

    Ok(RecipeRow::new(output_item, yield_per_batch, ingredients))
}

fn parse_yield(raw: &str) -> Option<u32> {
    let value: f64 = raw.parse().ok()?;
    if value >= 1.0 && value.fract() == 0.0 && value <= f64::from(u32::MAX) {
        Some(value as u32)
    } else {
        None
    }
}

fn parse_quantity(raw: &str) -> Option<f64> {
    let value: f64 = raw.parse().ok()?;
    (value.is_finite() && value > 0.0).then_some(value)
}
