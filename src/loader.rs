use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;

use polars::prelude::*;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::domain::TablyError;

#[derive(Debug)]
enum FileType {
    CSV,
    PARQUET,
    ARROW,
}

#[derive(Debug)]
struct FileInfo {
    path: PathBuf,
    file_type: FileType,
}

// One stringified column of the loaded data. `max_width` is the widest cell
// (or the header), used by the UI to size the rendered columns.
#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub data: Vec<String>,
    pub max_width: usize,
}

impl Column {
    pub fn new(name: impl Into<String>, data: Vec<String>) -> Self {
        let name = name.into();
        let max_width = data
            .iter()
            .map(|s| s.chars().count())
            .max()
            .unwrap_or(0)
            .max(name.chars().count());
        Column {
            name,
            data,
            max_width,
        }
    }
}

// The immutable row collection behind a table. Replaced wholesale when new
// data is supplied, never mutated in place. Row identity is the row's index
// in here, which keeps selections stable across filtering.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    name: String,
    columns: Vec<Column>,
}

impl Dataset {
    pub fn from_columns(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Dataset {
            name: name.into(),
            columns,
        }
    }

    pub fn load(path: PathBuf) -> Result<Self, TablyError> {
        let file_info = Self::get_file_info(path)?;
        let frame = match file_info.file_type {
            FileType::CSV => Self::load_csv(&file_info.path)?,
            FileType::PARQUET => Self::load_parquet(&file_info.path)?,
            FileType::ARROW => Self::load_arrow(&file_info.path)?,
        };

        // Collect the frame and stringify it column by column in parallel.
        // The returned columns hold all data as Strings in memory.
        let start_time = Instant::now();
        let df = frame.collect()?;
        let c_: Result<Vec<Column>, _> = df
            .get_column_names()
            .par_iter()
            .map(|name| Self::load_column(&df, name))
            .collect();
        let columns = c_?;

        let data_loading_duration = start_time.elapsed().as_millis();
        info!("Loading data took {data_loading_duration}ms ...");
        for c in columns.iter() {
            debug!(
                "Column \"{}\", width {}, # rows {}",
                c.name,
                c.max_width,
                c.data.len()
            );
        }

        let name = file_info
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("???")
            .to_string();

        Ok(Dataset { name, columns })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn headers(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column_widths(&self) -> Vec<usize> {
        self.columns.iter().map(|c| c.max_width).collect()
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map(|c| c.data.len()).unwrap_or(0)
    }

    // Cells of one row, in column order.
    pub fn row(&self, idx: usize) -> Vec<String> {
        self.columns
            .iter()
            .filter_map(|c| c.data.get(idx).cloned())
            .collect()
    }

    fn detect_file_type(path: &Path) -> Result<FileType, TablyError> {
        match path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_uppercase())
            .as_deref()
        {
            Some("CSV") => Ok(FileType::CSV),
            Some("PARQUET") | Some("PQ") => Ok(FileType::PARQUET),
            Some("ARROW") | Some("IPC") | Some("FEATHER") => Ok(FileType::ARROW),
            _ => Err(TablyError::UnknownFileType),
        }
    }

    fn get_file_info(path: PathBuf) -> Result<FileInfo, TablyError> {
        let metadata = fs::metadata(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => TablyError::FileNotFound,
            ErrorKind::PermissionDenied => TablyError::PermissionDenied,
            _ => TablyError::IoError(e),
        })?;
        if !metadata.is_file() {
            return Err(TablyError::LoadingFailed("Not a file!".into()));
        }

        let file_type = Self::detect_file_type(&path)?;

        Ok(FileInfo { path, file_type })
    }

    fn load_column(df: &DataFrame, col_name: &str) -> Result<Column, PolarsError> {
        let col = df.column(col_name)?.cast(&DataType::String)?;
        let series = col.str()?;
        let mut data = Vec::with_capacity(series.len());

        for value in series.into_iter() {
            let ss = match value {
                Some(s) => s.to_string().replace("\r\n", " ↵ ").replace("\n", " ↵ "),
                None => String::from("∅"),
            };
            data.push(ss);
        }

        Ok(Column::new(col_name, data))
    }

    fn load_csv(path: &PathBuf) -> Result<LazyFrame, PolarsError> {
        LazyCsvReader::new(PlPath::Local(path.as_path().into()))
            .with_has_header(true)
            .finish()
    }

    fn load_parquet(path: &PathBuf) -> Result<LazyFrame, PolarsError> {
        LazyFrame::scan_parquet(
            PlPath::Local(path.as_path().into()),
            ScanArgsParquet::default(),
        )
    }

    fn load_arrow(path: &PathBuf) -> Result<LazyFrame, PolarsError> {
        LazyFrame::scan_ipc(
            PlPath::Local(path.as_path().into()),
            polars::io::ipc::IpcScanOptions,
            UnifiedScanArgs::default(),
        )
    }
}
