//! Fuzz test for the CSV call reader
//!
//! Feeds arbitrary bytes to the reader and checks that:
//! - It never panics
//! - It yields at most one error and stops after it
//! - Whatever it accepts runs through the ordered detector cleanly
//!
//! Run with: cargo +nightly fuzz run csv_reader_fuzz -- -max_total_time=60

#![no_main]

use callcheck_detect::OrderedDetector;
use callcheck_storage::CsvCallReader;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let rows: Vec<_> = CsvCallReader::new(data, "fuzz").collect();

    let errors = rows.iter().filter(|row| row.is_err()).count();
    assert!(errors <= 1, "reader must stop after the first error");
    if errors == 1 {
        assert!(rows.last().is_some_and(|row| row.is_err()), "error must be the final item");
    }

    let calls: Vec<_> = rows.into_iter().filter_map(Result::ok).collect();
    let total = calls.len();
    let outcome = OrderedDetector::new().detect(calls);

    // Accepted, rejected and duplicate calls account for every input.
    assert!(outcome.accepted_count() + outcome.report.count <= total);
    assert!(outcome.report.comparisons <= total as u64);
});
