use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const ROCK_CODES: &[&str] = &["OVB", "SAP", "BAS", "QTZV", "GRN", "SHZ"];

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

    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

struct Hole {
    id: String,
    east: f64,
    north: f64,
    elevation: f64,
    depth: f64,
    azimuth: f64,
    dip: f64,
}

fn round(v: f64, decimals: i32) -> f64 {
    let f = 10f64.powi(decimals);
    (v * f).round() / f
}

fn main() {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_data"));
    std::fs::create_dir_all(&out_dir).expect("Failed to create output directory");

    let mut rng = SimpleRng::new(42);

    // 5 × 4 drilling grid, 50 m spacing, with jitter.
    let mut holes = Vec::new();
    for row in 0..4 {
        for col in 0..5 {
            let n = holes.len() + 1;
            holes.push(Hole {
                id: format!("DH{n:03}"),
                east: round(450_000.0 + col as f64 * 50.0 + rng.gauss(0.0, 3.0), 2),
                north: round(6_120_000.0 + row as f64 * 50.0 + rng.gauss(0.0, 3.0), 2),
                elevation: round(320.0 + rng.gauss(0.0, 4.0), 2),
                depth: round(rng.uniform(80.0, 220.0), 1),
                azimuth: round(rng.uniform(80.0, 100.0), 1),
                dip: round(rng.uniform(-75.0, -55.0), 1),
            });
        }
    }

    write_collars(&out_dir, &holes);
    write_survey(&out_dir, &holes, &mut rng);
    write_lithology(&out_dir, &holes, &mut rng);
    let n_assays = write_assays(&out_dir, &holes, &mut rng);

    println!(
        "Wrote {} holes and {n_assays} assay intervals to {}",
        holes.len(),
        out_dir.display()
    );
}

fn csv_writer(dir: &Path, name: &str) -> csv::Writer<std::fs::File> {
    csv::Writer::from_path(dir.join(name)).expect("Failed to create CSV file")
}

fn write_collars(dir: &Path, holes: &[Hole]) {
    let mut w = csv_writer(dir, "collars.csv");
    w.write_record(["HOLE_ID", "X", "Y", "Z", "MAX_DEPTH"]).expect("write header");
    for h in holes {
        w.write_record([
            h.id.clone(),
            h.east.to_string(),
            h.north.to_string(),
            h.elevation.to_string(),
            h.depth.to_string(),
        ])
        .expect("write collar");
    }
    w.flush().expect("flush collars");
}

fn write_survey(dir: &Path, holes: &[Hole], rng: &mut SimpleRng) {
    let mut w = csv_writer(dir, "survey.csv");
    w.write_record(["HOLE_ID", "DEPTH", "AZIMUTH", "DIP"]).expect("write header");
    for h in holes {
        let mut depth = 0.0;
        let (mut az, mut dip) = (h.azimuth, h.dip);
        while depth <= h.depth {
            w.write_record([h.id.clone(), depth.to_string(), round(az, 1).to_string(), round(dip, 1).to_string()])
                .expect("write survey");
            depth += 30.0;
            az += rng.gauss(0.3, 0.5);
            dip += rng.gauss(0.4, 0.3);
        }
    }
    w.flush().expect("flush survey");
}

fn write_lithology(dir: &Path, holes: &[Hole], rng: &mut SimpleRng) {
    let mut w = csv_writer(dir, "lithology.csv");
    w.write_record(["HOLE_ID", "FROM", "TO", "ROCK"]).expect("write header");
    for h in holes {
        let mut from = 0.0;
        let mut code = 0usize;
        while from < h.depth {
            let to = round((from + rng.uniform(5.0, 40.0)).min(h.depth), 1);
            w.write_record([h.id.clone(), from.to_string(), to.to_string(), ROCK_CODES[code].to_string()])
                .expect("write lithology");
            from = to;
            code = (code + 1 + (rng.next_u64() % 2) as usize) % ROCK_CODES.len();
        }
    }
    w.flush().expect("flush lithology");
}

fn write_assays(dir: &Path, holes: &[Hole], rng: &mut SimpleRng) -> usize {
    let mut ids = Vec::new();
    let mut from = Vec::new();
    let mut to = Vec::new();
    let mut au = Vec::new();
    let mut cu = Vec::new();

    for h in holes {
        let mut d = 0.0;
        while d + 2.0 <= h.depth {
            ids.push(h.id.clone());
            from.push(d);
            to.push(d + 2.0);
            // Log-normal grades; roughly one interval in twenty is unsampled.
            let sampled = rng.next_f64() > 0.05;
            au.push(sampled.then(|| round(rng.gauss(-1.0, 1.2).exp(), 3)));
            cu.push(sampled.then(|| round(rng.gauss(-3.0, 0.8).exp() * 100.0, 2)));
            d += 2.0;
        }
    }

    let mut w = csv_writer(dir, "assays.csv");
    w.write_record(["HOLE_ID", "FROM", "TO", "AU_PPM", "CU_PCT"]).expect("write header");
    let fmt = |v: Option<f64>| v.map(|x| x.to_string()).unwrap_or_default();
    for i in 0..ids.len() {
        w.write_record([ids[i].clone(), from[i].to_string(), to[i].to_string(), fmt(au[i]), fmt(cu[i])])
            .expect("write assay");
    }
    w.flush().expect("flush assays");

    // Same intervals as Parquet.
    let schema = Arc::new(Schema::new(vec![
        Field::new("HOLE_ID", DataType::Utf8, false),
        Field::new("FROM", DataType::Float64, false),
        Field::new("TO", DataType::Float64, false),
        Field::new("AU_PPM", DataType::Float64, true),
        Field::new("CU_PCT", DataType::Float64, true),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(ids.iter().map(|s| s.as_str()).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(from)),
            Arc::new(Float64Array::from(to)),
            Arc::new(Float64Array::from(au)),
            Arc::new(Float64Array::from(cu)),
        ],
    )
    .expect("Failed to create RecordBatch");

    let file = std::fs::File::create(dir.join("assays.parquet")).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    ids.len()
}
