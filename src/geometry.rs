use crate::constants::{MIN_GEOM_AREA, POLYGON_PRECISION};
use geo::{ChamberlainDuquetteArea, Coord, Geometry, LineString, MultiPolygon, Polygon};
use tracing::warn;
use wkt::{ToWkt, TryFromWkt};

/// Polygon hygiene for the roads extract. Non-polygon WKT passes through
/// untouched. Polygons are rounded to `POLYGON_PRECISION` decimal places;
/// geometries that collapse under rounding, end up empty, or cover less than
/// `MIN_GEOM_AREA` square meters on the WGS84 sphere are dropped.
pub fn clean_geometry(wkt: &str) -> Option<String> {
    if !wkt.contains("POLYGON") {
        return Some(wkt.to_string());
    }

    let geom: Geometry<f64> = match Geometry::try_from_wkt_str(wkt) {
        Ok(g) => g,
        Err(e) => {
            warn!("UNPARSEABLE [{}] - {}", e, wkt);
            return None;
        }
    };

    let cleaned: Geometry<f64> = match geom {
        Geometry::Polygon(p) => match clean_polygon(&p) {
            Some(p) => Geometry::Polygon(p),
            None => {
                warn!("DEGENERATE - {}", wkt);
                return None;
            }
        },
        Geometry::MultiPolygon(mp) => {
            let polygons: Vec<Polygon<f64>> =
                mp.0.iter().filter_map(clean_polygon).collect();
            if polygons.is_empty() {
                warn!("EMPTY - {}", wkt);
                return None;
            }
            Geometry::MultiPolygon(MultiPolygon(polygons))
        }
        other => return Some(other.wkt_string()),
    };

    let area = match &cleaned {
        Geometry::Polygon(p) => p.chamberlain_duquette_unsigned_area(),
        Geometry::MultiPolygon(mp) => mp.chamberlain_duquette_unsigned_area(),
        _ => unreachable!(),
    };
    if area < MIN_GEOM_AREA {
        warn!("AREA[{:.2}] - {}", area, wkt);
        return None;
    }

    Some(cleaned.wkt_string())
}

fn clean_polygon(polygon: &Polygon<f64>) -> Option<Polygon<f64>> {
    let exterior = clean_ring(polygon.exterior())?;
    let interiors: Vec<LineString<f64>> =
        polygon.interiors().iter().filter_map(clean_ring).collect();
    Some(Polygon::new(exterior, interiors))
}

/// Rounds a ring's coordinates and drops consecutive duplicates the rounding
/// introduces. A ring left with fewer than 4 coordinates is degenerate.
fn clean_ring(ring: &LineString<f64>) -> Option<LineString<f64>> {
    let mut coords: Vec<Coord<f64>> = Vec::with_capacity(ring.0.len());
    for c in &ring.0 {
        let rounded = Coord {
            x: round(c.x),
            y: round(c.y),
        };
        if coords.last() != Some(&rounded) {
            coords.push(rounded);
        }
    }

    // deduping may have eaten the closing coordinate
    if coords.first() != coords.last() {
        if let Some(&first) = coords.first() {
            coords.push(first);
        }
    }

    if coords.len() < 4 {
        return None;
    }
    Some(LineString::from(coords))
}

fn round(value: f64) -> f64 {
    let factor = 10f64.powi(POLYGON_PRECISION as i32);
    (value * factor).round() / factor
}
