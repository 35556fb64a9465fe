//! Integration tests for locate-then-sample across the whole engine.

use std::sync::Arc;

use horizon_sampler_core::{
    Cell, LocalizationMethod, Lnrds, Localizer, MemoryTable, Sampler, SampleError, Series, Spsds,
    SpsdsConfig, Stmdl, Streamable,
};
use tracing_subscriber::EnvFilter;

fn setup() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn peak_table() -> Arc<MemoryTable> {
    Arc::new(MemoryTable::from_column([0.0, 10.0, 20.0, 10.0, 0.0]))
}

#[test]
fn test_clamping_holds_for_every_streamable() {
    setup();
    let table = peak_table();
    let series: Arc<dyn Streamable> = Arc::new(Series::new([1.0, 2.0, 3.0]));
    let spsds: Arc<dyn Streamable> =
        Arc::new(Spsds::with_config(table.clone(), SpsdsConfig::column(0)));
    let lnrds: Arc<dyn Streamable> = Arc::new(Lnrds::wrap(Arc::new(Spsds::with_config(
        table,
        SpsdsConfig::column(0),
    ))));

    for stream in [series, spsds, lnrds] {
        assert_eq!(stream.move_to(stream.departure() - 1.0), stream.departure());
        assert_eq!(stream.move_to(stream.arrival() + 1.0), stream.arrival());
    }
}

#[test]
fn test_spsds_bound_follows_row_count() {
    setup();
    let table = Arc::new(MemoryTable::from_rows(vec![vec![1, 2], vec![3, 4], vec![5, 6]]));
    let spsds = Spsds::new(table);
    spsds.set_column_index(1);
    assert_eq!(spsds.arrival(), 2.0);
    assert_eq!(spsds.move_to(-0.6), 0.0);
    assert_eq!(spsds.move_to(7.0), 2.0);
    assert_eq!(spsds.get_long().unwrap(), 6);
}

#[test]
fn test_interpolation_over_table_column() {
    setup();
    let spsds = Arc::new(Spsds::with_config(peak_table(), SpsdsConfig::column(0)));
    let lnrds = Lnrds::wrap(spsds);

    for k in 0..5 {
        lnrds.move_to(k as f64);
        assert_eq!(lnrds.get_real().unwrap(), [0.0, 10.0, 20.0, 10.0, 0.0][k]);
    }
    for (pos, expected) in [(0.5, 5.0), (1.5, 15.0), (2.5, 15.0), (3.5, 5.0)] {
        lnrds.move_to(pos);
        assert_eq!(lnrds.get_real().unwrap(), expected, "at {pos}");
    }
}

#[test]
fn test_stmdl_bounds_after_reset() {
    setup();
    let series = Arc::new(Series::new([2.0, 4.0, 6.0]));
    let stmdl = Stmdl::new(Some(series), LocalizationMethod::AbsoluteForward);
    stmdl.reset().unwrap();

    let locd = stmdl.departure_value();
    assert!(!stmdl.validate(locd - 1e-9));
    assert!(stmdl.validate(locd));
}

#[test]
fn test_end_to_end_table_sampling() {
    setup();
    let spsds = Arc::new(Spsds::with_config(peak_table(), SpsdsConfig::column(0)));
    let stmdl = Arc::new(Stmdl::new(
        Some(spsds.clone()),
        LocalizationMethod::AbsoluteForward,
    ));
    let sampler = Sampler::new(Some(stmdl), Some(spsds.clone()));
    sampler.reset().unwrap();

    assert_eq!(sampler.map_real(15.0).unwrap(), 10.0);
    assert_eq!(spsds.locate(), 1.0);
}

#[test]
fn test_end_to_end_interpolated_sampling() {
    setup();
    // Depth of each sample and the temperature measured there.
    let table = Arc::new(MemoryTable::from_rows(vec![
        vec![0.0, 20.0],
        vec![10.0, 18.0],
        vec![20.0, 12.0],
        vec![30.0, 11.0],
    ]));
    let depth = Arc::new(Lnrds::wrap(Arc::new(Spsds::with_config(
        table.clone(),
        SpsdsConfig::column(0),
    ))));
    let temperature = Arc::new(Lnrds::wrap(Arc::new(Spsds::with_config(
        table,
        SpsdsConfig::column(1),
    ))));

    let sampler = Sampler::builder()
        .localizer(Arc::new(Stmdl::wrap(depth)))
        .streamable(temperature)
        .build()
        .unwrap();

    assert!(sampler.validate(25.0));
    assert!(!sampler.validate(31.0));
    assert_eq!(sampler.map_real(15.0).unwrap(), 15.0);
    assert_eq!(sampler.map_long(20.0).unwrap(), 12);
}

#[test]
fn test_relative_backward_sampling() {
    setup();
    let times = Arc::new(Series::new([0.0, 1.0, 2.0, 3.0, 4.0]));
    let values = Arc::new(Series::new(["0.5", "1.5", "2.5", "3.5", "4.5"]));
    let stmdl = Arc::new(Stmdl::new(Some(times), LocalizationMethod::RelativeBackward));
    let sampler = Sampler::new(Some(stmdl.clone()), Some(values.clone()));
    sampler.reset().unwrap();

    assert_eq!(stmdl.reference(), 4.0);
    let pos = stmdl.locate_real(3.0).unwrap();
    assert_eq!(pos, 1.0);
    assert_eq!(values.get_real_at(pos).unwrap(), 1.5);
    assert_eq!(values.get_long_at(pos).unwrap(), 1);
}

#[test]
fn test_schema_error_propagates_through_sampler() {
    setup();
    let table = Arc::new(MemoryTable::from_rows(vec![vec![Cell::Real(1.0)]]));
    let bundle = Arc::new(Spsds::with_config(table, SpsdsConfig::bundle(0, 0)));
    let stmdl = Arc::new(Stmdl::wrap(bundle.clone()));
    let sampler = Sampler::new(Some(stmdl), Some(bundle));

    assert_eq!(sampler.reset(), Err(SampleError::not_a_stack(0, 0)));
    assert_eq!(sampler.map_real(1.0), Err(SampleError::not_a_stack(0, 0)));
}

#[test]
fn test_sampler_is_shareable_across_threads() {
    setup();
    let spsds = Arc::new(Spsds::with_config(peak_table(), SpsdsConfig::column(0)));
    let sampler = Arc::new(Sampler::new(
        Some(Arc::new(Stmdl::wrap(spsds.clone()))),
        Some(spsds),
    ));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let sampler = sampler.clone();
            std::thread::spawn(move || {
                for _ in 0..50 {
                    let value = sampler.map_real(20.0).unwrap();
                    assert!((0.0..=20.0).contains(&value));
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }
}
