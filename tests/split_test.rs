use anyhow::Result;
use hii_osm_rasterize::constants::MAX_ROWS;
use hii_osm_rasterize::pipeline::split::split_osmium_text_file;
use std::collections::HashMap;
use std::fs;
use std::io::{BufWriter, Write};
use tempfile::tempdir;

fn road_tags() -> HashMap<String, (String, String)> {
    let mut tags = HashMap::new();
    tags.insert(
        "highway=residential".to_string(),
        ("highway".to_string(), "residential".to_string()),
    );
    tags
}

#[test]
fn splits_rows_per_attribute_tag_and_extracts_roads() -> Result<()> {
    let tmp = tempdir()?;
    let text_file = tmp.path().join("export.txt");
    fs::write(
        &text_file,
        "LINESTRING(1 1,2 2) highway=residential,surface=asphalt\n\
         POINT(5 5) amenity=fuel\n\
         POLYGON((0 0,0.001 0,0.001 0.001,0 0.001,0 0)) landuse=quarry\n\
         POINT(9 9)\n\
         \n\
         LINESTRING(3 3,4 4) highway=residential\n",
    )?;

    let split_dir = tmp.path().join("split_files");
    let roads_path = tmp.path().join("roads.csv");
    let result =
        split_osmium_text_file(&text_file, &split_dir, &roads_path, &road_tags(), true)?;

    // 4 combinations seen: highway=residential, surface=asphalt, amenity=fuel,
    // landuse=quarry. The untagged and empty rows are skipped.
    assert_eq!(result.csv_files.len(), 4);
    assert_eq!(result.rows, 5);

    let residential = result
        .csv_files
        .iter()
        .find(|p| {
            p.file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with("highway=residential_")
        })
        .expect("residential CSV missing");
    let content = fs::read_to_string(residential)?;
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines[0], "\"WKT\",\"BURN\"");
    assert_eq!(lines[1], "\"LINESTRING(1 1,2 2)\",\"\"");
    assert_eq!(lines[2], "\"LINESTRING(3 3,4 4)\",\"\"");

    // Both residential rows land in the roads extract with the mapped pair.
    let roads = fs::read_to_string(result.roads_file.unwrap())?;
    let road_lines: Vec<&str> = roads.lines().collect();
    assert_eq!(road_lines[0], "\"wkt\",\"attribute\",\"tag\"");
    assert_eq!(road_lines.len(), 3);
    assert!(road_lines[1].ends_with("\"highway\",\"residential\""));

    Ok(())
}

#[test]
fn no_roads_skips_the_roads_extract() -> Result<()> {
    let tmp = tempdir()?;
    let text_file = tmp.path().join("export.txt");
    fs::write(&text_file, "LINESTRING(1 1,2 2) highway=residential\n")?;

    let split_dir = tmp.path().join("split_files");
    let roads_path = tmp.path().join("roads.csv");
    let result =
        split_osmium_text_file(&text_file, &split_dir, &roads_path, &road_tags(), false)?;

    assert!(result.roads_file.is_none());
    assert!(!roads_path.exists());
    assert_eq!(result.csv_files.len(), 1);
    Ok(())
}

#[test]
fn degenerate_road_polygons_are_dropped_from_the_extract() -> Result<()> {
    let tmp = tempdir()?;
    let text_file = tmp.path().join("export.txt");
    // a polygon that collapses to a point under 5-decimal rounding
    fs::write(
        &text_file,
        "POLYGON((5.000001 5.000001,5.000002 5.000001,5.000002 5.000002,5.000001 5.000001)) highway=residential\n",
    )?;

    let split_dir = tmp.path().join("split_files");
    let roads_path = tmp.path().join("roads.csv");
    let result =
        split_osmium_text_file(&text_file, &split_dir, &roads_path, &road_tags(), true)?;

    // the row still reaches its combination CSV
    assert_eq!(result.rows, 1);
    // but not the roads extract
    let roads = fs::read_to_string(result.roads_file.unwrap())?;
    assert_eq!(roads.lines().count(), 1); // header only
    Ok(())
}

#[test]
fn rolls_over_to_a_new_csv_at_the_row_cap() -> Result<()> {
    let tmp = tempdir()?;
    let text_file = tmp.path().join("export.txt");
    {
        let mut writer = BufWriter::new(fs::File::create(&text_file)?);
        for _ in 0..MAX_ROWS {
            writeln!(writer, "POINT(1 1) amenity=fuel")?;
        }
    }

    let split_dir = tmp.path().join("split_files");
    let roads_path = tmp.path().join("roads.csv");
    let result =
        split_osmium_text_file(&text_file, &split_dir, &roads_path, &road_tags(), false)?;

    assert_eq!(result.rows as usize, MAX_ROWS);
    assert_eq!(result.csv_files.len(), 2);

    let first = fs::read_to_string(&result.csv_files[0])?;
    let second = fs::read_to_string(&result.csv_files[1])?;
    // header + capped rows in the first file, the remainder in the second
    assert_eq!(first.lines().count(), MAX_ROWS); // header + MAX_ROWS - 1 rows
    assert_eq!(second.lines().count(), 2); // header + 1 row
    Ok(())
}
