use anyhow::{Context, Result};
use placeweave_core::{AppError, Config, ConfigError, GeocodeError};
use placeweave_geocode::{GeoQuery, Geocoder};

const USAGE: &str = "Usage:
  placeweave reverse <lat> <lon>
  placeweave forward <place name>
  placeweave ip";

#[tokio::main]
async fn main() -> Result<()> {
    placeweave_core::init()?;

    if let Err(e) = run().await {
        tracing::error!("Placeweave failed: {:#}", e);
        eprintln!("{:#}", e);
        eprintln!("{}", user_hint(&e));
        std::process::exit(1);
    }

    Ok(())
}

fn user_hint(e: &anyhow::Error) -> &'static str {
    if let Some(app) = e.downcast_ref::<AppError>() {
        app.user_message()
    } else if let Some(config) = e.downcast_ref::<ConfigError>() {
        config.user_message()
    } else {
        "An unexpected error occurred. Please try again."
    }
}

async fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        println!("{}", USAGE);
        return Ok(());
    };

    let (config, _warnings) = Config::load_validated()?;
    let geocoder = Geocoder::new(&config.geocode).map_err(AppError::from)?;

    let output = match command.as_str() {
        "reverse" => {
            let query = parse_coordinates(&args[1..])?;
            let place = geocoder
                .reverse_geocode(query.latitude, query.longitude)
                .await
                .ok_or_else(|| {
                    AppError::from(GeocodeError::NotFound(format!(
                        "{}, {}",
                        query.latitude, query.longitude
                    )))
                })?;
            serde_json::to_string_pretty(&place)?
        }
        "forward" => {
            let text = args[1..].join(" ");
            let hit = geocoder
                .forward_geocode(&text)
                .await
                .ok_or_else(|| AppError::from(GeocodeError::NotFound(text.clone())))?;
            serde_json::to_string_pretty(&hit)?
        }
        "ip" => {
            let location = geocoder
                .locate_by_ip()
                .await
                .ok_or_else(|| AppError::from(GeocodeError::NotFound("public IP".into())))?;
            serde_json::to_string_pretty(&location)?
        }
        other => {
            anyhow::bail!("Unknown command: {}\n{}", other, USAGE);
        }
    };

    println!("{}", output);
    tracing::info!("Placeweave finished");

    Ok(())
}

fn parse_coordinates(args: &[String]) -> Result<GeoQuery> {
    let [lat, lon] = args else {
        anyhow::bail!("Expected <lat> <lon>\n{}", USAGE);
    };

    let query = GeoQuery::new(
        lat.parse().context("Latitude is not a number")?,
        lon.parse().context("Longitude is not a number")?,
    );

    if !query.is_in_range() {
        return Err(AppError::from(GeocodeError::InvalidCoordinates(format!(
            "{}, {}",
            lat, lon
        )))
        .into());
    }

    Ok(query)
}
