//! Getting Started
//!
//! Generates two datasets, indexes them in a grid and runs every query type.
//! Set `RUST_LOG=debug` to see the per-query log lines.

use gridquery::export;
use gridquery::{Bounds, GridKnn, LinearScan, NaiveSpatialJoin, PbsmJoin, Session, SkylineQuery};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    println!("=== gridquery - Getting Started ===\n");

    let mut session = Session::builder()
        .bounds(Bounds::new(0.0, 0.0, 100.0, 100.0))
        .partitions(10)
        .seed(2024)
        .build()?;
    println!("✓ Created a 10x10 grid over [0,0]-[100,100]\n");

    // ========================================
    // 1. Generate and load
    // ========================================
    let generator = session.generator()?;
    let a = generator.generate(200, Some("A"))?;
    let b = generator.with_seed(2025).generate(200, Some("B"))?;

    let report = session.grid_mut().load_rectangles(a.clone(), "A")?;
    println!("1. Loaded {} rectangles as 'A'", report.loaded);
    let report = session.grid_mut().load_rectangles(b.clone(), "B")?;
    println!("   Loaded {} rectangles as 'B'\n", report.loaded);

    let grid = session.grid();

    // ========================================
    // 2. Nearest neighbors
    // ========================================
    println!("2. Five nearest neighbors of (50, 50)");
    let (flat, flat_stats) = LinearScan::new(&a).knn(50.0, 50.0, 5)?;
    let (indexed, grid_stats) = GridKnn::new(grid, "A").knn(50.0, 50.0, 5)?;
    for (n, m) in flat.iter().zip(&indexed) {
        println!(
            "   {:>5} {:.4}   {:>5} {:.4}",
            n.rect.id(),
            n.distance,
            m.rect.id(),
            m.distance
        );
    }
    println!("\n{}\n\n{}\n", flat_stats, grid_stats);

    // ========================================
    // 3. Spatial join
    // ========================================
    let (naive, naive_stats) = NaiveSpatialJoin::new(&a, &b).execute();
    let (pbsm, pbsm_stats) = PbsmJoin::new(grid).execute();
    println!(
        "3. Join: naive found {} pairs, PBSM found {}",
        naive.len(),
        pbsm.len()
    );
    println!("\n{}\n\n{}\n", naive_stats, pbsm_stats);

    // ========================================
    // 4. Skyline
    // ========================================
    let (skyline, skyline_stats) = SkylineQuery::new(grid, "A").run();
    println!("4. Skyline of 'A'\n");
    export::write_skyline(&mut std::io::stdout().lock(), &skyline, Some(&skyline_stats))?;

    Ok(())
}
