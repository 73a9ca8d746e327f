use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

/// Write a synthetic food delivery orders CSV
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// output file
    #[arg(long, default_value = "food_delivery_sample.csv")]
    output: PathBuf,

    /// number of orders
    #[arg(long, default_value_t = 5000)]
    orders: usize,

    /// PRNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

#[derive(Debug, Serialize)]
struct OrderRow {
    order_id: String,
    customer_id: String,
    restaurant_id: String,
    order_year: i32,
    order_month: u32,
    order_day: u32,
    order_hour: u32,
    delivery_year: i32,
    delivery_month: u32,
    delivery_day: u32,
    delivery_hour: u32,
    order_value: f64,
    delivery_fee: f64,
    commission_fee: f64,
    discount_value: f64,
    payment_method: &'static str,
    discount_source: &'static str,
    discounts_and_offers: &'static str,
}

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

    /// Uniform integer in `lo..=hi`.
    fn range(&mut self, lo: u32, hi: u32) -> u32 {
        lo + (self.next_u64() % u64::from(hi - lo + 1)) as u32
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

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        2 if (year % 4 == 0 && year % 100 != 0) || year % 400 == 0 => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Add `hours` to a date-hour, rolling over days, months and years.
fn add_hours(year: i32, month: u32, day: u32, hour: u32, hours: u32) -> (i32, u32, u32, u32) {
    let (mut year, mut month, mut day, mut hour) = (year, month, day, hour + hours);
    while hour >= 24 {
        hour -= 24;
        day += 1;
        if day > days_in_month(year, month) {
            day = 1;
            month += 1;
            if month > 12 {
                month = 1;
                year += 1;
            }
        }
    }
    (year, month, day, hour)
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

const PAYMENT_METHODS: [&str; 4] = [
    "Credit Card",
    "Cash on Delivery",
    "Digital Wallet",
    "Debit Card",
];
const OFFERS: [(&str, &str, f64); 4] = [
    ("None", "None", 0.0),
    ("10% off", "Restaurant", 0.10),
    ("15% New User", "Platform", 0.15),
    ("5% on App", "Platform", 0.05),
];
/// Relative weight of each hour of the day; lunch and dinner peaks.
const HOUR_WEIGHTS: [u32; 24] = [
    1, 1, 1, 1, 1, 1, 2, 3, 4, 4, 5, 8, 12, 10, 6, 5, 6, 9, 13, 14, 11, 7, 4, 2,
];

fn weighted_hour(rng: &mut SimpleRng) -> u32 {
    let total: u32 = HOUR_WEIGHTS.iter().sum();
    let mut pick = rng.range(0, total - 1);
    for (hour, &w) in HOUR_WEIGHTS.iter().enumerate() {
        if pick < w {
            return hour as u32;
        }
        pick -= w;
    }
    23
}

fn generate_order(rng: &mut SimpleRng, index: usize) -> OrderRow {
    let order_year = 2015 + rng.range(0, 9) as i32;
    let order_month = rng.range(1, 12);
    let order_day = rng.range(1, days_in_month(order_year, order_month));
    let order_hour = weighted_hour(rng);
    let (delivery_year, delivery_month, delivery_day, delivery_hour) =
        add_hours(order_year, order_month, order_day, order_hour, rng.range(0, 2));

    let order_value = round2(rng.gauss(1050.0, 500.0).clamp(100.0, 2000.0));
    let delivery_fee = *rng.pick(&[0.0, 30.0, 40.0, 50.0]);
    let commission_fee = round2(order_value * (0.1 + 0.2 * rng.next_f64()));
    let &(offer, source, rate) = rng.pick(&OFFERS);

    OrderRow {
        order_id: format!("O{:05}", index + 1),
        customer_id: format!("C{:04}", rng.range(1, 2000)),
        restaurant_id: format!("R{:03}", rng.range(1, 500)),
        order_year,
        order_month,
        order_day,
        order_hour,
        delivery_year,
        delivery_month,
        delivery_day,
        delivery_hour,
        order_value,
        delivery_fee,
        commission_fee,
        discount_value: round2(order_value * rate),
        payment_method: *rng.pick(&PAYMENT_METHODS),
        discount_source: source,
        discounts_and_offers: offer,
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = SimpleRng::new(args.seed);

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    for i in 0..args.orders {
        writer
            .serialize(generate_order(&mut rng, i))
            .with_context(|| format!("writing order {i}"))?;
    }
    writer.flush().context("flushing CSV")?;

    println!("Wrote {} orders to {}", args.orders, args.output.display());
    Ok(())
}
