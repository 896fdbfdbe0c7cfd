//! Writes a deterministic synthetic listings export in every container the
//! app can open: `sample_listings.csv`, `sample_listings.csv.zip` and
//! `sample_listings.parquet`, all with identical rows.

use std::fs::File;
use std::io::Write;
use std::sync::Arc;

use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }
}

struct Row {
    id: i64,
    name: String,
    neighbourhood_group: String,
    neighbourhood: String,
    country: String,
    lat: f64,
    long: f64,
    room_type: String,
    price: f64,
    construction_year: f64,
    minimum_nights: f64,
    availability_365: f64,
    number_of_reviews: f64,
    reviews_per_month: f64,
    review_rate: f64,
    occupancy_rate: f64,
    popularity_score: f64,
    price_per_room: f64,
    price_per_minimum_night: f64,
    host_is_big: i64,
    availability_group: String,
}

fn generate_rows(n: usize, rng: &mut SimpleRng) -> Vec<Row> {
    let areas: &[(&str, &[&str], f64, f64, f64)] = &[
        // (group, neighbourhoods, base price, lat, long)
        ("Manhattan", &["Midtown", "Harlem", "Chelsea"], 180.0, 40.78, -73.97),
        ("Brooklyn", &["Williamsburg", "Park Slope", "Bushwick"], 120.0, 40.68, -73.95),
        ("Queens", &["Astoria", "Flushing", "Ridgewood"], 95.0, 40.73, -73.87),
        ("Bronx", &["Fordham", "Mott Haven"], 80.0, 40.85, -73.89),
        ("Staten Island", &["St. George", "Tottenville"], 70.0, 40.58, -74.15),
    ];
    let room_types: &[(&str, f64, f64)] = &[
        // (label, price multiplier, rooms)
        ("Entire home/apt", 1.5, 2.0),
        ("Private room", 0.8, 1.0),
        ("Shared room", 0.5, 1.0),
    ];
    let adjectives = ["Cozy", "Sunny", "Modern", "Quiet", "Spacious", "Charming"];
    let nouns = ["loft", "studio", "apartment", "brownstone", "suite", "flat"];

    (0..n)
        .map(|i| {
            let &(group, neighbourhoods, base_price, lat0, long0) = rng.pick(areas);
            let &(room_type, multiplier, rooms) = rng.pick(room_types);
            let neighbourhood = *rng.pick(neighbourhoods);

            let price = (base_price * multiplier * rng.range(0.6, 1.6)).round();
            let minimum_nights = (rng.range(1.0, 14.0)).round().max(1.0);
            let availability_365 = rng.range(0.0, 365.0).round();
            let number_of_reviews = rng.range(0.0, 250.0).round();
            let reviews_per_month = (number_of_reviews / 36.0 * 10.0).round() / 10.0;
            let review_rate = (rng.range(1.0, 5.0) * 10.0).round() / 10.0;

            let occupancy_rate = if availability_365 > 0.0 {
                ((number_of_reviews * minimum_nights / availability_365).min(1.0) * 100.0)
                    .round()
                    / 100.0
            } else {
                0.0
            };
            let popularity_score =
                ((number_of_reviews * review_rate / 10.0) * 10.0).round() / 10.0;
            let availability_group = if availability_365 < 120.0 {
                "Low"
            } else if availability_365 < 240.0 {
                "Medium"
            } else {
                "High"
            };

            Row {
                id: 1000 + i as i64,
                name: format!(
                    "{} {} in {}",
                    rng.pick(&adjectives),
                    rng.pick(&nouns),
                    neighbourhood
                ),
                neighbourhood_group: group.to_string(),
                neighbourhood: neighbourhood.to_string(),
                country: "United States".to_string(),
                lat: ((lat0 + rng.range(-0.05, 0.05)) * 10000.0).round() / 10000.0,
                long: ((long0 + rng.range(-0.05, 0.05)) * 10000.0).round() / 10000.0,
                room_type: room_type.to_string(),
                price,
                construction_year: rng.range(1995.0, 2023.0).round(),
                minimum_nights,
                availability_365,
                number_of_reviews,
                reviews_per_month,
                review_rate,
                occupancy_rate,
                popularity_score,
                price_per_room: (price / rooms).round(),
                price_per_minimum_night: (price / minimum_nights * 10.0).round() / 10.0,
                host_is_big: (rng.next_f64() < 0.3) as i64,
                availability_group: availability_group.to_string(),
            }
        })
        .collect()
}

const HEADER: &[&str] = &[
    "id",
    "NAME",
    "neighbourhood group",
    "neighbourhood",
    "country",
    "lat",
    "long",
    "room type",
    "price",
    "Construction year",
    "minimum nights",
    "availability 365",
    "number of reviews",
    "reviews per month",
    "review rate number",
    "occupancy_rate",
    "popularity_score",
    "price_per_room",
    "price_per_minimum_night",
    "host_is_big",
    "availability_group",
];

fn csv_bytes(rows: &[Row]) -> anyhow::Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER)?;
    for r in rows {
        writer.write_record([
            r.id.to_string(),
            r.name.clone(),
            r.neighbourhood_group.clone(),
            r.neighbourhood.clone(),
            r.country.clone(),
            r.lat.to_string(),
            r.long.to_string(),
            r.room_type.clone(),
            r.price.to_string(),
            r.construction_year.to_string(),
            r.minimum_nights.to_string(),
            r.availability_365.to_string(),
            r.number_of_reviews.to_string(),
            r.reviews_per_month.to_string(),
            r.review_rate.to_string(),
            r.occupancy_rate.to_string(),
            r.popularity_score.to_string(),
            r.price_per_room.to_string(),
            r.price_per_minimum_night.to_string(),
            r.host_is_big.to_string(),
            r.availability_group.clone(),
        ])?;
    }
    Ok(writer.into_inner()?)
}

fn write_zip(path: &str, entry_name: &str, content: &[u8]) -> anyhow::Result<()> {
    let mut writer = ZipWriter::new(File::create(path)?);
    let options: FileOptions<'_, ()> =
        FileOptions::default().compression_method(CompressionMethod::Deflated);
    writer.start_file(entry_name, options)?;
    writer.write_all(content)?;
    writer.finish()?;
    Ok(())
}

fn write_parquet(path: &str, rows: &[Row]) -> anyhow::Result<()> {
    let str_col = |f: fn(&Row) -> &str| -> Arc<StringArray> {
        Arc::new(StringArray::from(rows.iter().map(f).collect::<Vec<_>>()))
    };
    let f64_col = |f: fn(&Row) -> f64| -> Arc<Float64Array> {
        Arc::new(Float64Array::from(rows.iter().map(f).collect::<Vec<_>>()))
    };

    let schema = Arc::new(Schema::new(
        HEADER
            .iter()
            .map(|&name| {
                let data_type = match name {
                    "id" | "host_is_big" => DataType::Int64,
                    "NAME" | "neighbourhood group" | "neighbourhood" | "country"
                    | "room type" | "availability_group" => DataType::Utf8,
                    _ => DataType::Float64,
                };
                Field::new(name, data_type, false)
            })
            .collect::<Vec<_>>(),
    ));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from(
                rows.iter().map(|r| r.id).collect::<Vec<_>>(),
            )),
            str_col(|r| &r.name),
            str_col(|r| &r.neighbourhood_group),
            str_col(|r| &r.neighbourhood),
            str_col(|r| &r.country),
            f64_col(|r| r.lat),
            f64_col(|r| r.long),
            str_col(|r| &r.room_type),
            f64_col(|r| r.price),
            f64_col(|r| r.construction_year),
            f64_col(|r| r.minimum_nights),
            f64_col(|r| r.availability_365),
            f64_col(|r| r.number_of_reviews),
            f64_col(|r| r.reviews_per_month),
            f64_col(|r| r.review_rate),
            f64_col(|r| r.occupancy_rate),
            f64_col(|r| r.popularity_score),
            f64_col(|r| r.price_per_room),
            f64_col(|r| r.price_per_minimum_night),
            Arc::new(Int64Array::from(
                rows.iter().map(|r| r.host_is_big).collect::<Vec<_>>(),
            )),
            str_col(|r| &r.availability_group),
        ],
    )?;

    let mut writer = ArrowWriter::try_new(File::create(path)?, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate_rows(400, &mut rng);

    let csv = csv_bytes(&rows)?;
    std::fs::write("sample_listings.csv", &csv)?;
    write_zip("sample_listings.csv.zip", "sample_listings.csv", &csv)?;
    write_parquet("sample_listings.parquet", &rows)?;

    println!(
        "Wrote {} listings to sample_listings.csv, sample_listings.csv.zip \
         and sample_listings.parquet",
        rows.len()
    );
    Ok(())
}
