use anyhow::Result;
use pvwatts::{Client, RequestParams};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Configure the key via PVWATTS_API_KEY or a `.pvwattsrc` file; DEMO_KEY otherwise.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let client = Client::from_env()?;

    let params = RequestParams::default()
        .system_size(4.0)
        .lat(40.0)
        .lon(-105.0)
        .azimuth(180.0)
        .tilt(40.0)
        .derate(0.77)
        .track_mode(0.0);

    let result = client.request(&params)?;
    for e in result.errors() {
        eprintln!("service error: {}", e);
    }

    let monthly = result.monthly()?;
    for (month, kwh) in monthly.ac_monthly.iter().enumerate() {
        println!("{:>2}: {:8.1} kWh", month + 1, kwh);
    }
    println!("annual: {:.1} kWh", monthly.ac_annual);
    Ok(())
}
