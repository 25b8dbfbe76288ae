//! Writes synthetic fixtures in the exact source formats the loaders read:
//! a raw search-record CSV and a prediction export. Deterministic, so the
//! same files come out on every run.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Duration, TimeZone, Utc};
use serde_json::json;

use stopsearch::data::schema;

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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    fn pick<'a>(&mut self, options: &[&'a str]) -> &'a str {
        options[(self.next_u64() % options.len() as u64) as usize]
    }
}

const SEARCH_TYPES: &[&str] = &["Person search", "Vehicle search", "Person and Vehicle search"];
const LEGISLATION: &[&str] = &[
    "Misuse of Drugs Act 1971 (section 23)",
    "Police and Criminal Evidence Act 1984 (section 1)",
    "Criminal Justice and Public Order Act 1994 (section 60)",
];
const SEARCH_TARGETS: &[&str] = &["Controlled drugs", "Offensive weapons", "Stolen goods", "Article for use in theft"];
const OUTCOMES: &[&str] = &[
    "A no further action disposal",
    "Arrest",
    "Community resolution",
    "Summons / charged by post",
];
/// Station name with the rough centre the coordinates scatter around.
const STATIONS: &[(&str, f64, f64)] = &[
    ("metropolitan", 51.51, -0.12),
    ("kent", 51.27, 0.52),
    ("thames-valley", 51.75, -1.26),
    ("cleveland", 54.57, -1.23),
];

fn main() -> Result<()> {
    env_logger::init();

    let out_dir: PathBuf = std::env::args().nth(1).unwrap_or_else(|| "data".to_string()).into();
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(42);

    write_train_csv(&out_dir.join("train.csv"), &mut rng)?;
    write_prediction_csv(&out_dir.join("heroku_data.csv"), &mut rng)?;

    println!("Wrote fixtures to {}", out_dir.display());
    Ok(())
}

fn write_train_csv(path: &std::path::Path, rng: &mut SimpleRng) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;

    let mut header = vec![schema::ID_COLUMN];
    header.extend(schema::COLUMN_RENAMES.iter().map(|(source, _)| *source));
    writer.write_record(&header)?;

    let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).single().context("epoch")?;
    for id in 1..=600i64 {
        let date = start + Duration::minutes((rng.next_u64() % (26 * 7 * 24 * 60)) as i64);
        let (station, lat0, long0) = STATIONS[(rng.next_u64() % STATIONS.len() as u64) as usize];
        let located = rng.chance(0.85);
        let (lat, long) = if located {
            (
                format!("{:.6}", rng.gauss(lat0, 0.05)),
                format!("{:.6}", rng.gauss(long0, 0.08)),
            )
        } else {
            (String::new(), String::new())
        };
        let found = rng.chance(0.22);
        let outcome = if found { rng.pick(&OUTCOMES[1..]) } else { OUTCOMES[0] };
        let ethnicity_self = if rng.chance(0.9) {
            rng.pick(schema::ETHNICITY_SELF_DOMAIN)
        } else {
            ""
        };

        let id_field = id.to_string();
        let date_field = date.format("%Y-%m-%dT%H:%M:%S+00:00").to_string();
        writer.write_record([
            id_field.as_str(),
            rng.pick(SEARCH_TYPES),
            date_field.as_str(),
            if rng.chance(0.1) { "True" } else { "False" },
            lat.as_str(),
            long.as_str(),
            rng.pick(schema::SEX_DOMAIN),
            rng.pick(schema::AGE_DOMAIN),
            ethnicity_self,
            rng.pick(schema::ETHNICITY_OFFICER_DOMAIN),
            rng.pick(LEGISLATION),
            rng.pick(SEARCH_TARGETS),
            outcome,
            if found { "True" } else { "False" },
            if rng.chance(0.04) { "True" } else { "False" },
            station,
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_prediction_csv(path: &std::path::Path, rng: &mut SimpleRng) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(["request", "predicted_outcome", "true_outcome"])?;

    for id in 1..=200i64 {
        let (station, _, _) = STATIONS[(rng.next_u64() % STATIONS.len() as u64) as usize];
        let request = json!({
            "observation_id": 10_000 + id,
            "type": rng.pick(SEARCH_TYPES),
            "station": station,
            "age": rng.pick(schema::AGE_DOMAIN),
            "hour": (rng.next_u64() % 24) as i64,
        });
        let truth = rng.chance(0.25);
        let predicted = if rng.chance(0.8) { truth } else { !truth };
        writer.write_record([
            request.to_string().as_str(),
            if predicted { "True" } else { "False" },
            if truth { "True" } else { "False" },
        ])?;
    }
    writer.flush()?;
    Ok(())
}
