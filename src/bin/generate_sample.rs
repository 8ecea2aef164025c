use chrono::{Days, NaiveDate};

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

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn main() {
    let mut rng = SimpleRng::new(42);

    let countries = ["Australia", "Canada", "Germany", "India", "UK", "USA"];
    // (category, product, typical box price)
    let products = [
        ("Lip Care", "Lip Balm", 12.0),
        ("Lip Care", "Matte Lipstick", 18.0),
        ("Skincare", "Face Cream", 32.0),
        ("Skincare", "Vitamin C Serum", 45.0),
        ("Skincare", "Body Lotion", 22.0),
        ("Fragrance", "Eau de Parfum", 85.0),
        ("Makeup", "Foundation", 38.0),
        ("Makeup", "Mascara", 24.0),
    ];
    let sales_persons = [
        "Alice Nguyen",
        "Bob Carter",
        "Carmen Diaz",
        "Dmitri Ivanov",
        "Emma Laurent",
        "Farid Khan",
        "Grace Okafor",
        "Hiro Tanaka",
    ];

    let start = NaiveDate::from_ymd_opt(2021, 1, 1).expect("valid start date");
    let span_days = 730u64; // two years

    let output_path = "sample_sales.csv";
    let mut writer = csv::Writer::from_path(output_path).expect("Failed to create output file");
    writer
        .write_record([
            "Date",
            "Country",
            "Category",
            "Product",
            "Sales Person",
            "Boxes Shipped",
            "Amount ($)",
        ])
        .expect("Failed to write header");

    let n_rows = 1000;
    for _ in 0..n_rows {
        let date = start
            .checked_add_days(Days::new(rng.next_u64() % span_days))
            .expect("date within range");
        let country = rng.pick(&countries);
        let (category, product, price) = rng.pick(&products);
        let person = rng.pick(&sales_persons);

        let boxes = 1 + (rng.next_u64() % 40) as u32;
        // Per-box price wobbles around the list price.
        let amount = (f64::from(boxes) * rng.gauss(*price, price * 0.1)).max(1.0);

        writer
            .write_record([
                date.format("%Y-%m-%d").to_string(),
                (*country).to_string(),
                (*category).to_string(),
                (*product).to_string(),
                (*person).to_string(),
                boxes.to_string(),
                format!("{amount:.2}"),
            ])
            .expect("Failed to write row");
    }

    writer.flush().expect("Failed to flush output");
    println!("Wrote {n_rows} sales records to {output_path}");
}
