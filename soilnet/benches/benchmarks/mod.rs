pub mod bench_preprocessing;
