use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use arrow::array::{
    Array, ArrayRef, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
    LargeStringArray, StringArray,
};
use arrow::datatypes::DataType;
use once_cell::sync::Lazy;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;
use zip::ZipArchive;

use super::model::{
    Listing, ListingsDataset, COL_AVAILABILITY_GROUP, COL_HOST_IS_BIG, REQUIRED_COLUMNS,
};

/// File the app tries to open on startup, resolved against the working
/// directory. A sibling `<name>.zip` is unpacked first when present.
pub const DEFAULT_DATASET: &str = "Airbnb_Open_Data_Final_features.csv";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found: {0}")]
    NotFound(PathBuf),
    #[error("unsupported file extension: .{0}")]
    Unsupported(String),
    #[error("required column '{0}' is missing")]
    MissingColumn(&'static str),
    #[error("archive contains no CSV entry")]
    EmptyArchive,
    #[error("{0}")]
    Format(String),
    #[error("row {row}: {source}")]
    Row { row: usize, source: csv::Error },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Archive(#[from] zip::result::ZipError),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error(transparent)]
    Arrow(#[from] arrow::error::ArrowError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a listings table from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`           – flat export, one listing per row (recommended)
/// * `.zip`           – archive holding such a CSV
/// * `.parquet`/`.pq` – Parquet file, one listing per row
/// * `.json`          – `[{ "NAME": ..., "price": ..., ... }, ...]`
pub fn load_file(path: &Path) -> Result<ListingsDataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "zip" => load_zip(path),
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        other => Err(LoadError::Unsupported(other.to_string())),
    }
}

static CACHE: Lazy<Mutex<HashMap<PathBuf, Arc<ListingsDataset>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Memoized wrapper around [`load_file`]. A path is parsed once per process;
/// later requests share the same table. Failed loads are not cached, so a
/// fixed file can be retried.
pub fn load_cached(path: &Path) -> Result<Arc<ListingsDataset>, LoadError> {
    let mut cache = CACHE.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(dataset) = cache.get(path) {
        return Ok(Arc::clone(dataset));
    }

    let dataset = Arc::new(load_file(path)?);
    log::info!(
        "loaded {} listings from {}",
        dataset.len(),
        path.display()
    );
    cache.insert(path.to_path_buf(), Arc::clone(&dataset));
    Ok(dataset)
}

/// If `path` is missing but a sibling `<path>.zip` exists, extract that
/// archive into the parent directory. Returns whether `path` exists
/// afterwards.
pub fn ensure_unpacked(path: &Path) -> Result<bool, LoadError> {
    if path.exists() {
        return Ok(true);
    }

    let mut sibling = path.as_os_str().to_owned();
    sibling.push(".zip");
    let sibling = PathBuf::from(sibling);
    if !sibling.exists() {
        return Ok(false);
    }

    let target = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut archive = ZipArchive::new(File::open(&sibling)?)?;
    archive.extract(target)?;
    log::info!("extracted {} into {}", sibling.display(), target.display());
    Ok(path.exists())
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<ListingsDataset, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }
    parse_csv(File::open(path)?)
}

/// Parse CSV from any reader. Shared by the plain-file and zip paths.
fn parse_csv<R: Read>(input: R) -> Result<ListingsDataset, LoadError> {
    let mut reader = csv::Reader::from_reader(input);
    let header_record = reader.headers()?.clone();

    let columns: Vec<String> = header_record
        .iter()
        .filter(|name| !is_index_artifact(name))
        .map(|name| name.to_string())
        .collect();
    ensure_required(&columns)?;

    let mut listings = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result.map_err(|source| LoadError::Row { row, source })?;
        let listing: Listing = record
            .deserialize(Some(&header_record))
            .map_err(|source| LoadError::Row { row, source })?;
        listings.push(listing);
    }

    warn_missing_derived(&columns);
    Ok(ListingsDataset::from_listings(listings, columns))
}

// ---------------------------------------------------------------------------
// Zip loader
// ---------------------------------------------------------------------------

/// Stream the first CSV entry of the archive straight into the CSV parser.
fn load_zip(path: &Path) -> Result<ListingsDataset, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let mut archive = ZipArchive::new(File::open(path)?)?;
    for i in 0..archive.len() {
        let entry = archive.by_index(i)?;
        if entry.name().to_ascii_lowercase().ends_with(".csv") {
            return parse_csv(entry);
        }
    }
    Err(LoadError::EmptyArchive)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet export with one listing per row. Works with files written
/// by both **Pandas** (`df.to_parquet()`) and **Polars**
/// (`df.write_parquet()`); integer-typed numeric columns are widened to f64.
fn load_parquet(path: &Path) -> Result<ListingsDataset, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let builder = ParquetRecordBatchReaderBuilder::try_new(File::open(path)?)?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .filter(|name| !is_index_artifact(name))
        .collect();
    ensure_required(&columns)?;

    let mut listings = Vec::new();
    for batch in builder.build()? {
        let batch = batch?;
        let col = |name: &str| batch.column_by_name(name);

        for row in 0..batch.num_rows() {
            listings.push(Listing {
                id: opt_i64(col("id"), row),
                name: opt_str(col("NAME"), row),
                neighbourhood_group: opt_str(col("neighbourhood group"), row),
                neighbourhood: opt_str(col("neighbourhood"), row),
                country: opt_str(col("country"), row),
                lat: opt_f64(col("lat"), row),
                long: opt_f64(col("long"), row),
                room_type: opt_str(col("room type"), row),
                price: opt_f64(col("price"), row),
                construction_year: opt_f64(col("Construction year"), row),
                minimum_nights: opt_f64(col("minimum nights"), row),
                availability_365: opt_f64(col("availability 365"), row),
                number_of_reviews: opt_f64(col("number of reviews"), row),
                reviews_per_month: opt_f64(col("reviews per month"), row),
                review_rate: opt_f64(col("review rate number"), row),
                occupancy_rate: opt_f64(col("occupancy_rate"), row),
                popularity_score: opt_f64(col("popularity_score"), row),
                price_per_room: opt_f64(col("price_per_room"), row),
                price_per_min_night: opt_f64(col("price_per_minimum_night"), row),
                host_is_big: opt_bool(col(COL_HOST_IS_BIG), row),
                availability_group: opt_str(col(COL_AVAILABILITY_GROUP), row),
            });
        }
    }

    warn_missing_derived(&columns);
    Ok(ListingsDataset::from_listings(listings, columns))
}

// -- Arrow helpers --
//
// All of these are permissive: a missing column, a null cell or an
// unexpected physical type comes back as `None` rather than an error.

fn opt_str(col: Option<&ArrayRef>, row: usize) -> Option<String> {
    let col = col?;
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Utf8 => col
            .as_any()
            .downcast_ref::<StringArray>()
            .map(|a| a.value(row).to_string()),
        DataType::LargeUtf8 => col
            .as_any()
            .downcast_ref::<LargeStringArray>()
            .map(|a| a.value(row).to_string()),
        _ => None,
    }
}

fn opt_f64(col: Option<&ArrayRef>, row: usize) -> Option<f64> {
    let col = col?;
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Float64 => col
            .as_any()
            .downcast_ref::<Float64Array>()
            .map(|a| a.value(row)),
        DataType::Float32 => col
            .as_any()
            .downcast_ref::<Float32Array>()
            .map(|a| f64::from(a.value(row))),
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .map(|a| a.value(row) as f64),
        DataType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()
            .map(|a| f64::from(a.value(row))),
        _ => None,
    }
}

fn opt_i64(col: Option<&ArrayRef>, row: usize) -> Option<i64> {
    let col = col?;
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .map(|a| a.value(row)),
        DataType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()
            .map(|a| i64::from(a.value(row))),
        DataType::Float64 => col
            .as_any()
            .downcast_ref::<Float64Array>()
            .map(|a| a.value(row) as i64),
        _ => None,
    }
}

fn opt_bool(col: Option<&ArrayRef>, row: usize) -> Option<bool> {
    let col = col?;
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Boolean => col
            .as_any()
            .downcast_ref::<BooleanArray>()
            .map(|a| a.value(row)),
        // 0/1 flag columns survive some exports as plain numbers.
        _ => opt_f64(Some(col), row).map(|v| v != 0.0),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default
/// `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "NAME": "Cozy loft", "room type": "Entire home/apt", "price": 120, ... },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<ListingsDataset, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path)?;
    let root: JsonValue = serde_json::from_str(&text)?;

    let JsonValue::Array(records) = root else {
        return Err(LoadError::Format(
            "expected a top-level JSON array of records".to_string(),
        ));
    };

    let mut columns: Vec<String> = Vec::new();
    for record in &records {
        let Some(object) = record.as_object() else {
            continue;
        };
        for key in object.keys() {
            if !is_index_artifact(key) && !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
    }
    ensure_required(&columns)?;

    let mut listings = Vec::with_capacity(records.len());
    for (row, record) in records.into_iter().enumerate() {
        let listing: Listing = serde_json::from_value(record)
            .map_err(|e| LoadError::Format(format!("row {row}: {e}")))?;
        listings.push(listing);
    }

    warn_missing_derived(&columns);
    Ok(ListingsDataset::from_listings(listings, columns))
}

// ---------------------------------------------------------------------------
// Shared checks
// ---------------------------------------------------------------------------

/// Index columns that dataframe exports leave behind ("Unnamed: 0",
/// "__index_level_0__"). They carry no listing data.
fn is_index_artifact(name: &str) -> bool {
    name.starts_with("Unnamed") || name.starts_with("__index_level_")
}

fn ensure_required(columns: &[String]) -> Result<(), LoadError> {
    for &required in REQUIRED_COLUMNS {
        if !columns.iter().any(|c| c == required) {
            return Err(LoadError::MissingColumn(required));
        }
    }
    Ok(())
}

/// The engineered grouping columns are optional; their filters deactivate
/// when absent, which is easy to mistake for a broken control.
fn warn_missing_derived(columns: &[String]) {
    for derived in [COL_AVAILABILITY_GROUP, COL_HOST_IS_BIG] {
        if !columns.iter().any(|c| c == derived) {
            log::warn!("column '{derived}' not present; its filter will be inactive");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use zip::write::FileOptions;
    use zip::{CompressionMethod, ZipWriter};

    use super::*;

    const SAMPLE_CSV: &str = "\
Unnamed: 0,id,NAME,neighbourhood group,neighbourhood,country,lat,long,room type,price,Construction year,minimum nights,availability 365,number of reviews,reviews per month,review rate number,occupancy_rate,popularity_score,price_per_room,price_per_minimum_night,host_is_big,availability_group
0,1001,Cozy loft,Brooklyn,Williamsburg,United States,40.71,-73.96,Entire home/apt,120,2015,3,180,42,1.2,4.0,0.49,12.5,120.0,40.0,0,Medium
1,1002,Midtown suite,Manhattan,Midtown,United States,40.75,-73.99,Private room,95,2009,2,40,10,0.4,3.0,0.11,3.1,95.0,47.5,1,Low
2,1003,Garden flat,Brooklyn,Park Slope,United States,40.67,-73.98,Entire home/apt,150,2018,5,300,77,2.1,5.0,0.82,31.0,150.0,30.0,0,High
";

    fn zip_bytes(entry_name: &str, content: &str) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut writer = ZipWriter::new(std::io::Cursor::new(&mut buf));
            let options: FileOptions<'_, ()> =
                FileOptions::default().compression_method(CompressionMethod::Stored);
            writer.start_file(entry_name, options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
            writer.finish().unwrap();
        }
        buf
    }

    #[test]
    fn csv_load_drops_index_artifacts() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("listings.csv");
        std::fs::write(&path, SAMPLE_CSV)?;

        let dataset = load_file(&path)?;
        assert_eq!(dataset.len(), 3);
        assert!(!dataset.columns.iter().any(|c| c.starts_with("Unnamed")));
        assert!(dataset.has_column(COL_HOST_IS_BIG));
        assert_eq!(dataset.listings[0].name.as_deref(), Some("Cozy loft"));
        assert_eq!(dataset.listings[1].host_is_big, Some(true));
        assert_eq!(dataset.listings[0].id, Some(1001));
        Ok(())
    }

    #[test]
    fn missing_file_is_reported_with_its_path() {
        let err = load_file(Path::new("definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = load_file(Path::new("listings.xlsx")).unwrap_err();
        assert!(matches!(err, LoadError::Unsupported(ext) if ext == "xlsx"));
    }

    #[test]
    fn missing_required_column_is_named() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("listings.csv");
        std::fs::write(&path, "NAME,room type\nCozy loft,Private room\n")?;

        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn("neighbourhood group")));
        Ok(())
    }

    #[test]
    fn malformed_row_carries_its_row_number() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("listings.csv");
        let mut broken = SAMPLE_CSV.to_string();
        broken.push_str(
            "3,1004,Bad row,Brooklyn,Park Slope,United States,40.6,-73.9,\
Private room,not-a-price,2018,5,300,77,2.1,5.0,0.82,31.0,150.0,30.0,0,High\n",
        );
        std::fs::write(&path, broken)?;

        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, LoadError::Row { row: 3, .. }));
        Ok(())
    }

    #[test]
    fn optional_columns_may_be_absent() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("listings.csv");
        let header = "NAME,neighbourhood group,neighbourhood,country,room type,price,\
Construction year,minimum nights,availability 365,number of reviews,reviews per month,\
review rate number,occupancy_rate,popularity_score,price_per_room,price_per_minimum_night";
        let row = "Cozy loft,Brooklyn,Williamsburg,United States,Entire home/apt,120,\
2015,3,180,42,1.2,4.0,0.49,12.5,120.0,40.0";
        std::fs::write(&path, format!("{header}\n{row}\n"))?;

        let dataset = load_file(&path)?;
        assert_eq!(dataset.len(), 1);
        assert!(!dataset.has_column(COL_HOST_IS_BIG));
        assert!(!dataset.has_column(COL_AVAILABILITY_GROUP));
        assert_eq!(dataset.listings[0].host_is_big, None);
        Ok(())
    }

    #[test]
    fn zip_archives_load_their_first_csv_entry() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("listings.zip");
        std::fs::write(&path, zip_bytes("listings.csv", SAMPLE_CSV))?;

        let dataset = load_file(&path)?;
        assert_eq!(dataset.len(), 3);
        Ok(())
    }

    #[test]
    fn zip_without_a_csv_entry_is_rejected() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("listings.zip");
        std::fs::write(&path, zip_bytes("readme.txt", "no data here"))?;

        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, LoadError::EmptyArchive));
        Ok(())
    }

    #[test]
    fn sibling_archive_is_unpacked_on_demand() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let csv_path = dir.path().join("listings.csv");
        let zip_path = dir.path().join("listings.csv.zip");
        std::fs::write(&zip_path, zip_bytes("listings.csv", SAMPLE_CSV))?;

        assert!(!csv_path.exists());
        assert!(ensure_unpacked(&csv_path)?);
        assert!(csv_path.exists());
        assert_eq!(load_file(&csv_path)?.len(), 3);
        Ok(())
    }

    #[test]
    fn unpacking_without_source_or_archive_reports_absence() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        assert!(!ensure_unpacked(&dir.path().join("nothing.csv"))?);
        Ok(())
    }

    #[test]
    fn repeated_loads_share_one_parsed_table() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("listings.csv");
        std::fs::write(&path, SAMPLE_CSV)?;

        let first = load_cached(&path)?;
        let second = load_cached(&path)?;
        assert!(Arc::ptr_eq(&first, &second));
        Ok(())
    }

    #[test]
    fn json_records_load_like_csv() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("listings.json");
        std::fs::write(
            &path,
            r#"[
              {"id": 1001, "NAME": "Cozy loft", "neighbourhood group": "Brooklyn",
               "neighbourhood": "Williamsburg", "country": "United States",
               "room type": "Entire home/apt", "price": 120.0,
               "Construction year": 2015, "minimum nights": 3,
               "availability 365": 180, "number of reviews": 42,
               "reviews per month": 1.2, "review rate number": 4.0,
               "occupancy_rate": 0.49, "popularity_score": 12.5,
               "price_per_room": 120.0, "price_per_minimum_night": 40.0,
               "host_is_big": 0, "availability_group": "Medium"}
            ]"#,
        )?;

        let dataset = load_file(&path)?;
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.listings[0].host_is_big, Some(false));
        assert_eq!(dataset.listings[0].price, Some(120.0));
        Ok(())
    }
}
