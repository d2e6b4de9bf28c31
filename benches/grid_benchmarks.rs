use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use gridquery::{
    Bounds, Generator, Grid, GridKnn, LinearScan, NaiveSpatialJoin, PbsmJoin, Rectangle,
    SkylineQuery,
};

fn dataset(n: usize, label: &str, seed: u64) -> Vec<Rectangle> {
    Generator::new(Bounds::default())
        .unwrap()
        .with_seed(seed)
        .generate(n, Some(label))
        .unwrap()
}

fn benchmark_knn(c: &mut Criterion) {
    let mut group = c.benchmark_group("knn");

    for size in [1_000, 10_000] {
        let rects = dataset(size, "R", 1);
        let mut grid = Grid::new(Bounds::default(), 20).unwrap();
        grid.load_rectangles(rects.clone(), "default").unwrap();

        group.bench_with_input(BenchmarkId::new("linear_scan", size), &rects, |b, rects| {
            let scan = LinearScan::new(rects);
            b.iter(|| scan.knn(black_box(42.0), black_box(17.0), 10).unwrap())
        });

        group.bench_with_input(BenchmarkId::new("grid_knn", size), &grid, |b, grid| {
            let knn = GridKnn::new(grid, "default");
            b.iter(|| knn.knn(black_box(42.0), black_box(17.0), 10).unwrap())
        });
    }

    group.finish();
}

fn benchmark_joins(c: &mut Criterion) {
    let mut group = c.benchmark_group("join");
    group.sample_size(10);

    for size in [200, 1_000] {
        let a = dataset(size, "A", 2);
        let b = dataset(size, "B", 3);

        group.bench_with_input(BenchmarkId::new("naive", size), &size, |bench, _| {
            bench.iter(|| NaiveSpatialJoin::new(black_box(&a), black_box(&b)).execute())
        });

        for m in [10, 40] {
            let mut grid = Grid::new(Bounds::default(), m).unwrap();
            grid.load_rectangles(a.clone(), "A").unwrap();
            grid.load_rectangles(b.clone(), "B").unwrap();
            group.bench_with_input(
                BenchmarkId::new(format!("pbsm_m{}", m), size),
                &grid,
                |bench, grid| bench.iter(|| PbsmJoin::new(grid).execute()),
            );
        }
    }

    group.finish();
}

fn benchmark_skyline(c: &mut Criterion) {
    let mut group = c.benchmark_group("skyline");

    for m in [1, 10, 50] {
        let mut grid = Grid::new(Bounds::default(), m).unwrap();
        grid.load_rectangles(dataset(20_000, "S", 4), "default")
            .unwrap();
        group.bench_with_input(BenchmarkId::new("grid_skyline", m), &grid, |b, grid| {
            b.iter(|| SkylineQuery::new(grid, "default").run())
        });
    }

    group.finish();
}

fn benchmark_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("load");
    group.sample_size(10);

    let rects = dataset(50_000, "L", 5);
    group.bench_function("index_50k_m20", |b| {
        b.iter(|| {
            let mut grid = Grid::new(Bounds::default(), 20).unwrap();
            grid.load_rectangles(black_box(rects.clone()), "default")
                .unwrap()
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_knn,
    benchmark_joins,
    benchmark_skyline,
    benchmark_load
);

criterion_main!(benches);
