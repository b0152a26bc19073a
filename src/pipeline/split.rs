use crate::constants::MAX_ROWS;
use crate::error::Result;
use crate::geometry::clean_geometry;
use csv::{QuoteStyle, Writer, WriterBuilder};
use std::collections::HashMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::info;

pub struct SplitResult {
    /// One CSV per attribute/tag combination per MAX_ROWS rows, in creation
    /// order. This order becomes the band order of the stacked images.
    pub csv_files: Vec<PathBuf>,
    pub roads_file: Option<PathBuf>,
    pub rows: u64,
}

/// Step 3: fan the osmium text export out into per-combination CSVs and,
/// for configured road tags, a cleaned roads CSV.
pub fn split_osmium_text_file(
    txt_file: &Path,
    output_dir: &Path,
    roads_file_path: &Path,
    road_tags: &HashMap<String, (String, String)>,
    write_roads: bool,
) -> Result<SplitResult> {
    use std::io::{BufRead, BufReader};

    fs::create_dir_all(output_dir)?;

    let mut writers: HashMap<String, Writer<File>> = HashMap::new();
    let mut row_counts: HashMap<String, usize> = HashMap::new();
    let mut csv_files = Vec::new();
    let mut rows: u64 = 0;

    let mut roads_writer = if write_roads {
        let mut w = always_quoted_writer(roads_file_path)?;
        w.write_record(["wkt", "attribute", "tag"])?;
        Some(w)
    } else {
        None
    };

    let reader = BufReader::new(File::open(txt_file)?);
    for line in reader.lines() {
        let line = line?;
        let (wkt, attribute_tags) = match parse_row(&line) {
            Some(parsed) => parsed,
            None => continue,
        };

        for attr_tag in attribute_tags {
            let rollover = row_counts
                .get(attr_tag)
                .map_or(true, |count| *count >= MAX_ROWS - 1);
            if rollover || !writers.contains_key(attr_tag) {
                // metadata derives attribute/tag from this shape later
                let path = output_dir.join(format!("{}_{}.csv", attr_tag, uuid::Uuid::new_v4()));
                let mut writer = always_quoted_writer(&path)?;
                writer.write_record(["WKT", "BURN"])?;
                csv_files.push(path);
                writers.insert(attr_tag.to_string(), writer);
                row_counts.insert(attr_tag.to_string(), 0);
            }

            let writer = writers.get_mut(attr_tag).expect("writer just inserted");
            // BURN stays empty; the burn value is fixed at rasterize time
            writer.write_record([wkt, ""])?;
            *row_counts.get_mut(attr_tag).expect("count just inserted") += 1;
            rows += 1;

            if let Some(roads) = roads_writer.as_mut() {
                if let Some((attribute, tag)) = road_tags.get(attr_tag) {
                    if let Some(cleaned) = clean_geometry(wkt) {
                        roads.write_record([cleaned.as_str(), attribute, tag])?;
                    }
                }
            }
        }
    }

    for writer in writers.values_mut() {
        writer.flush()?;
    }
    let roads_file = match roads_writer {
        Some(mut w) => {
            w.flush()?;
            Some(roads_file_path.to_path_buf())
        }
        None => None,
    };

    info!(
        "Split {} rows into {} CSV files",
        rows,
        csv_files.len()
    );
    Ok(SplitResult {
        csv_files,
        roads_file,
        rows,
    })
}

fn always_quoted_writer(path: &Path) -> Result<Writer<File>> {
    Ok(WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_path(path)?)
}

/// A text export row is `<WKT><sep><attr=tag>,<attr=tag>,...`; the WKT ends
/// at the last `)`. Rows with no tag list are skipped.
fn parse_row(row: &str) -> Option<(&str, Vec<&str>)> {
    let end = row.rfind(')')? + 1;
    let wkt = &row[..end];
    let tags: Vec<&str> = row.get(end + 1..)?.split(',').collect();
    if tags.first().map_or(true, |t| t.is_empty()) {
        return None;
    }
    Some((wkt, tags))
}
