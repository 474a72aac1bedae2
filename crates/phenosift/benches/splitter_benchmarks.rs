//! Splitter and row-check performance benchmarks.
//!
//! Measures row splitting and per-row validation across file sizes.

use std::io::Write;
use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tempfile::NamedTempFile;

use phenosift::context::{ColumnCount, ColumnIndices, FileType};
use phenosift::split;
use phenosift::store::MemoryStore;
use phenosift::validators::{DuplicateTraitValidator, RawRowValidator};
use phenosift::{ExpectedColumns, FileRef, HeaderDefinition, ImportCheck, ImportConfig, LocalFiles, Requirement};

/// Generate synthetic trait rows with the specified count, header included.
fn generate_trait_tsv(rows: usize) -> String {
    let mut data = String::from("Trait Name\tMethod Short Name\tUnit\tType\n");
    for row in 0..rows {
        data.push_str(&format!(
            "Trait {row}\tTM-{row}\tunit-{}\t{}\n",
            row % 40,
            if row % 2 == 0 { "Quantitative" } else { "Qualitative" }
        ));
    }
    data
}

/// Benchmark splitting single lines of varying widths.
fn bench_split_row(c: &mut Criterion) {
    let mut group = c.benchmark_group("split_row");

    for cols in [4, 10, 50].iter() {
        let line: String = (0..*cols)
            .map(|i| format!("\"cell value {i}\""))
            .collect::<Vec<_>>()
            .join("\t");

        group.throughput(Throughput::Bytes(line.len() as u64));
        group.bench_with_input(BenchmarkId::new("cols", cols), &line, |b, line| {
            b.iter(|| {
                black_box(
                    split::split_row(line, "text/tab-separated-values", *cols).unwrap(),
                )
            })
        });
    }

    group.finish();
}

/// Benchmark the raw row check over whole files worth of lines.
fn bench_raw_row_check(c: &mut Criterion) {
    let mut group = c.benchmark_group("raw_row_check");

    for rows in [100, 1_000, 10_000].iter() {
        let data = generate_trait_tsv(*rows);

        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::new("rows", rows), &data, |b, data| {
            let mut validator = RawRowValidator::new();
            validator
                .set_file_mime_type("text/tab-separated-values")
                .unwrap();
            validator.set_expected_columns(4, true).unwrap();

            b.iter(|| {
                for line in data.lines() {
                    black_box(validator.validate_raw_row(line).unwrap());
                }
            })
        });
    }

    group.finish();
}

/// Benchmark duplicate detection with a growing seen-set.
fn bench_duplicate_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("duplicate_detection");

    for rows in [100, 1_000, 10_000].iter() {
        let cells: Vec<Vec<String>> = (0..*rows)
            .map(|row| {
                vec![
                    format!("Trait {row}"),
                    format!("TM-{row}"),
                    format!("unit-{}", row % 40),
                ]
            })
            .collect();

        group.bench_with_input(BenchmarkId::new("rows", rows), &cells, |b, cells| {
            b.iter_with_setup(
                || {
                    let mut validator =
                        DuplicateTraitValidator::new(Arc::new(MemoryStore::new()));
                    validator.set_indices(vec![0, 1, 2]).unwrap();
                    validator
                },
                |mut validator| {
                    for (line, row) in cells.iter().enumerate() {
                        black_box(validator.validate_row(row, line + 2).unwrap());
                    }
                },
            )
        });
    }

    group.finish();
}

/// Benchmark a full import check run end to end.
fn bench_import_check(c: &mut Criterion) {
    let mut group = c.benchmark_group("import_check");
    group.sample_size(20);

    for rows in [1_000, 10_000].iter() {
        let data = generate_trait_tsv(*rows);

        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::new("rows", rows), &data, |b, data| {
            let config = ImportConfig {
                supported_mime_types: vec!["text/tab-separated-values".to_string()],
                file_mime_type: "text/tab-separated-values".to_string(),
                headers: vec![
                    HeaderDefinition::new("Trait Name", Requirement::Required, 0),
                    HeaderDefinition::new("Method Short Name", Requirement::Required, 1),
                    HeaderDefinition::new("Unit", Requirement::Required, 2),
                    HeaderDefinition::new("Type", Requirement::Required, 3),
                ],
                expected_columns: ExpectedColumns::new(4, true),
                required_indices: vec![0, 1, 2],
                value_list_indices: vec![3],
                valid_values: vec!["Quantitative".to_string(), "Qualitative".to_string()],
                trait_indices: vec![0, 1, 2],
                genus: None,
                project: None,
            };
            let check = ImportCheck::new(
                Arc::new(LocalFiles::new()),
                Arc::new(MemoryStore::new()),
                config,
            );

            b.iter_with_setup(
                || {
                    let mut temp = NamedTempFile::with_suffix(".tsv").unwrap();
                    temp.write_all(data.as_bytes()).unwrap();
                    temp
                },
                |temp| {
                    black_box(
                        check
                            .run(&FileRef::Path(temp.path().to_path_buf()))
                            .unwrap(),
                    )
                },
            )
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_split_row,
    bench_raw_row_check,
    bench_duplicate_detection,
    bench_import_check
);
criterion_main!(benches);
