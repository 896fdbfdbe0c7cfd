//! End-to-end pass over real files: load an export, apply sidebar filters,
//! and feed the survivors through the chart aggregations.

use std::io::Write;
use std::path::Path;

use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use stayscope::data::filter::{filtered_indices, FilterSpec, NumericRange};
use stayscope::data::loader::{ensure_unpacked, load_file};
use stayscope::data::model::{Listing, ListingsDataset};
use stayscope::data::stats;

const FIXTURE: &str = "\
Unnamed: 0,id,NAME,neighbourhood group,neighbourhood,country,lat,long,room type,price,Construction year,minimum nights,availability 365,number of reviews,reviews per month,review rate number,occupancy_rate,popularity_score,price_per_room,price_per_minimum_night,host_is_big,availability_group
0,1001,Cozy loft,Brooklyn,Williamsburg,United States,40.71,-73.96,Entire home/apt,120,2015,3,180,42,1.2,4.0,0.49,12.5,120,40,0,Medium
1,1002,Midtown suite,Manhattan,Midtown,United States,40.75,-73.99,Private room,95,2009,2,40,10,0.4,3.0,0.11,3.1,95,47.5,1,Low
2,1003,Garden flat,Brooklyn,Park Slope,United States,40.67,-73.98,Entire home/apt,150,2018,5,300,77,2.1,5.0,0.82,31,150,30,0,High
3,1004,Harlem walkup,Manhattan,Harlem,United States,40.81,-73.95,Shared room,50,2001,1,365,5,0.2,2.5,0.01,1.2,50,50,1,High
4,1005,Astoria studio,Queens,Astoria,United States,40.76,-73.92,Private room,80,2012,2,120,30,0.9,4.5,0.5,13.5,80,40,0,Medium
5,1006,Bushwick loft,Brooklyn,Bushwick,United States,40.69,-73.91,Private room,80,2020,2,200,60,1.8,4.2,0.63,25.2,80,40,1,Medium
";

fn load_fixture(dir: &Path) -> anyhow::Result<ListingsDataset> {
    let path = dir.join("listings.csv");
    std::fs::write(&path, FIXTURE)?;
    Ok(load_file(&path)?)
}

fn survivors<'a>(ds: &'a ListingsDataset, indices: &'a [usize]) -> impl Iterator<Item = &'a Listing> + 'a {
    indices.iter().map(move |&i| &ds.listings[i])
}

fn zip_bytes(entry_name: &str, content: &str) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut writer = ZipWriter::new(std::io::Cursor::new(&mut buf));
        let options: FileOptions<'_, ()> =
            FileOptions::default().compression_method(CompressionMethod::Deflated);
        writer.start_file(entry_name, options).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
        writer.finish().unwrap();
    }
    buf
}

#[test]
fn load_filter_aggregate_round_trip() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let dataset = load_fixture(dir.path())?;
    assert_eq!(dataset.len(), 6);

    // Default spec keeps the whole table.
    let spec = FilterSpec::for_dataset(&dataset);
    assert_eq!(filtered_indices(&dataset, &spec).len(), 6);

    // Narrow to Brooklyn listings priced 80..=150.
    let mut spec = FilterSpec::for_dataset(&dataset);
    spec.neighbourhood_groups = ["Brooklyn".to_string()].into_iter().collect();
    spec.price = NumericRange::new(80.0, 150.0);
    let visible = filtered_indices(&dataset, &spec);
    assert_eq!(visible, vec![0, 2, 5]);

    // Every grouped aggregate over the survivors only mentions categories
    // they actually carry.
    let counts = stats::value_counts(
        survivors(&dataset, &visible).map(|l| l.room_type.as_deref()),
    );
    assert_eq!(
        counts,
        vec![
            ("Entire home/apt".to_string(), 2),
            ("Private room".to_string(), 1),
        ]
    );

    let avg_price = stats::group_mean(
        survivors(&dataset, &visible).map(|l| (l.neighbourhood_group.as_deref(), l.price)),
    );
    assert_eq!(avg_price.len(), 1);
    assert_eq!(avg_price[0].0, "Brooklyn");
    assert!((avg_price[0].1 - (120.0 + 150.0 + 80.0) / 3.0).abs() < 1e-9);

    Ok(())
}

#[test]
fn boundary_prices_survive_an_exact_range() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let dataset = load_fixture(dir.path())?;

    let mut spec = FilterSpec::for_dataset(&dataset);
    spec.price = NumericRange::new(80.0, 80.0);
    let visible = filtered_indices(&dataset, &spec);
    assert_eq!(visible, vec![4, 5]);
    Ok(())
}

#[test]
fn empty_selection_empties_every_chart_input() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let dataset = load_fixture(dir.path())?;

    let mut spec = FilterSpec::for_dataset(&dataset);
    spec.room_types.clear();
    let visible = filtered_indices(&dataset, &spec);
    assert!(visible.is_empty());

    // Downstream aggregations degrade to empty/NaN instead of failing.
    assert!(stats::value_counts(
        survivors(&dataset, &visible).map(|l| l.neighbourhood_group.as_deref())
    )
    .is_empty());
    assert!(stats::histogram(survivors(&dataset, &visible).map(|l| l.price), 50).is_none());
    assert!(stats::mean(survivors(&dataset, &visible).map(|l| l.price)).is_nan());
    Ok(())
}

#[test]
fn zip_paths_match_the_flat_file() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let flat = load_fixture(dir.path())?;

    // A .zip opened directly streams its CSV entry.
    let direct = dir.path().join("listings.zip");
    std::fs::write(&direct, zip_bytes("listings.csv", FIXTURE))?;
    let from_direct = load_file(&direct)?;

    // A missing .csv with a sibling .csv.zip gets unpacked first.
    let unpack_dir = tempfile::tempdir()?;
    let csv_path = unpack_dir.path().join("export.csv");
    std::fs::write(
        unpack_dir.path().join("export.csv.zip"),
        zip_bytes("export.csv", FIXTURE),
    )?;
    assert!(ensure_unpacked(&csv_path)?);
    let from_sibling = load_file(&csv_path)?;

    for dataset in [&from_direct, &from_sibling] {
        assert_eq!(dataset.len(), flat.len());
        assert_eq!(dataset.columns, flat.columns);
        assert_eq!(
            dataset.listings[0].name.as_deref(),
            flat.listings[0].name.as_deref()
        );
    }
    Ok(())
}
