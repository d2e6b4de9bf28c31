//! Plain-text result exports.
//!
//! Each export is the optional statistics block, one header line, then one
//! row per result:
//!
//! ```text
//! Dataset_ID<TAB>Distance                        k-NN, Linear Scan
//! Dataset_A_ID<TAB>Dataset_B_ID                  PBSM, Naive
//! Skyline Points (ID, xmin, ymin, xmax, ymax):   Skyline
//! ```

use crate::compute::join::JoinPair;
use crate::compute::knn::Neighbor;
use crate::error::Result;
use gridquery_types::rect::Rectangle;
use gridquery_types::stats::{Algorithm, QueryStats};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub const NEIGHBORS_HEADER: &str = "Dataset_ID\tDistance";
pub const PAIRS_HEADER: &str = "Dataset_A_ID\tDataset_B_ID";
pub const SKYLINE_HEADER: &str = "Skyline Points (ID, xmin, ymin, xmax, ymax):";

/// Suggested file name for an algorithm's export, e.g. `results_PBSM.txt`.
pub fn default_file_name(algorithm: Algorithm) -> String {
    format!("results_{}.txt", algorithm.name())
}

fn write_stats<W: Write>(writer: &mut W, stats: Option<&QueryStats>) -> Result<()> {
    if let Some(stats) = stats {
        writeln!(writer, "{}", stats)?;
    }
    Ok(())
}

fn warn_if_empty(len: usize, what: &str) {
    if len == 0 {
        log::warn!("No {} results to export; writing header only", what);
    }
}

/// Neighbors in the given order, distances to four decimals.
pub fn write_neighbors<W: Write>(
    writer: &mut W,
    neighbors: &[Neighbor<'_>],
    stats: Option<&QueryStats>,
) -> Result<()> {
    warn_if_empty(neighbors.len(), "nearest-neighbor");
    write_stats(writer, stats)?;
    writeln!(writer, "{}", NEIGHBORS_HEADER)?;
    for n in neighbors {
        writeln!(writer, "{}\t{:.4}", n.rect.id(), n.distance)?;
    }
    Ok(())
}

pub fn write_pairs<W: Write>(
    writer: &mut W,
    pairs: &[JoinPair<'_>],
    stats: Option<&QueryStats>,
) -> Result<()> {
    warn_if_empty(pairs.len(), "join");
    write_stats(writer, stats)?;
    writeln!(writer, "{}", PAIRS_HEADER)?;
    for pair in pairs {
        writeln!(writer, "{}\t{}", pair.left.id(), pair.right.id())?;
    }
    Ok(())
}

/// Skyline rows as `id, xmin, ymin, xmax, ymax`.
///
/// Coordinates always carry a fractional part (`0.0`, not `0`).
pub fn write_skyline<W: Write>(
    writer: &mut W,
    skyline: &[&Rectangle],
    stats: Option<&QueryStats>,
) -> Result<()> {
    warn_if_empty(skyline.len(), "skyline");
    write_stats(writer, stats)?;
    writeln!(writer, "{}", SKYLINE_HEADER)?;
    for r in skyline {
        writeln!(
            writer,
            "{}, {:?}, {:?}, {:?}, {:?}",
            r.id(),
            r.xmin(),
            r.ymin(),
            r.xmax(),
            r.ymax()
        )?;
    }
    Ok(())
}

fn export_to_path<P, F>(path: P, write: F) -> Result<()>
where
    P: AsRef<Path>,
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    write(&mut writer)?;
    writer.flush()?;
    log::info!("Exported results to {}", path.as_ref().display());
    Ok(())
}

pub fn export_neighbors_to_path<P: AsRef<Path>>(
    path: P,
    neighbors: &[Neighbor<'_>],
    stats: Option<&QueryStats>,
) -> Result<()> {
    export_to_path(path, |w| write_neighbors(w, neighbors, stats))
}

pub fn export_pairs_to_path<P: AsRef<Path>>(
    path: P,
    pairs: &[JoinPair<'_>],
    stats: Option<&QueryStats>,
) -> Result<()> {
    export_to_path(path, |w| write_pairs(w, pairs, stats))
}

pub fn export_skyline_to_path<P: AsRef<Path>>(
    path: P,
    skyline: &[&Rectangle],
    stats: Option<&QueryStats>,
) -> Result<()> {
    export_to_path(path, |w| write_skyline(w, skyline, stats))
}
