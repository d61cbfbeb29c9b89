use clap::Parser;
use rand::Rng;
use rand::rngs::ThreadRng;
use serde_json::{Map, Value, json};
use std::fs;

/// A CLI tool to generate randomized prefilled applicant payloads for the
/// annai journey engine
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The path to write the generated JSON file to
    #[arg(short, long, default_value = "generated_prefill.json")]
    output: String,

    /// The number of payloads to generate
    #[arg(long, default_value_t = 1)]
    count: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut rng = rand::rng();

    println!("Generating {} prefill payload(s)...", cli.count);

    let payloads: Vec<Value> = (0..cli.count)
        .map(|_| Value::Object(generate_payload(&mut rng)))
        .collect();
    let output = if cli.count == 1 {
        serde_json::to_string_pretty(&payloads[0])?
    } else {
        serde_json::to_string_pretty(&payloads)?
    };
    fs::write(&cli.output, output)?;

    println!(
        "Successfully generated and saved prefill data to '{}'",
        cli.output
    );

    Ok(())
}

const FIRST_NAMES: &[&str] = &["Aarav", "Diya", "Kabir", "Meera", "Rohan", "Sanya", "Vikram"];
const LAST_NAMES: &[&str] = &["Sharma", "Verma", "Iyer", "Patel", "Reddy", "Singh", "Nair"];
const CITIES: &[(&str, &str)] = &[
    ("New Delhi", "Delhi"),
    ("Mumbai", "Maharashtra"),
    ("Bengaluru", "Karnataka"),
    ("Chennai", "Tamil Nadu"),
    ("Pune", "Maharashtra"),
];
const INCOME_RANGES: &[&str] = &["5-10L", "10-15L", "15-20L", "20L+"];
const EMPLOYERS: &[&str] = &[
    "Acme Industries",
    "Bluefin Analytics",
    "Crestline Logistics",
    "Meridian Software",
];

fn pick<'a>(rng: &mut ThreadRng, values: &'a [&'a str]) -> &'a str {
    values[rng.random_range(0..values.len())]
}

fn generate_payload(rng: &mut ThreadRng) -> Map<String, Value> {
    let first = pick(rng, FIRST_NAMES);
    let last = pick(rng, LAST_NAMES);
    let (city, state) = CITIES[rng.random_range(0..CITIES.len())];
    let mobile: String = format!("9{:09}", rng.random_range(0..1_000_000_000u64));
    let pincode = format!("{}", rng.random_range(110_001..700_000));

    let mut payload = Map::new();
    payload.insert("mobileNumber".to_string(), json!(mobile));
    payload.insert(
        "email".to_string(),
        json!(format!(
            "{}.{}@example.com",
            first.to_lowercase(),
            last.to_lowercase()
        )),
    );
    payload.insert(
        "dob".to_string(),
        json!(format!(
            "{}-{:02}-{:02}",
            rng.random_range(1960..2002),
            rng.random_range(1..13),
            rng.random_range(1..29)
        )),
    );
    payload.insert("fatherName".to_string(), json!(format!("R. {last}")));
    payload.insert("permanentAddressLine1".to_string(), json!("12, Lake View Road"));
    payload.insert("permanentAddressCity".to_string(), json!(city));
    payload.insert("permanentAddressState".to_string(), json!(state));
    payload.insert("permanentAddressPincode".to_string(), json!(pincode));
    payload.insert("incomeRange".to_string(), json!(pick(rng, INCOME_RANGES)));
    payload.insert("employerName".to_string(), json!(pick(rng, EMPLOYERS)));
    payload.insert(
        "sameAsPermanentAddress".to_string(),
        json!(rng.random_range(0..4) != 0),
    );
    payload
}
