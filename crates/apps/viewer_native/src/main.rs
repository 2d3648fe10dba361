use std::cell::RefCell;
use std::path::PathBuf;
use std::process::ExitCode;

use catalog::ViewerConfig;
use clap::Parser;
use interaction::{
    HeadlessEngine, MemorySurface, PickOutcome, Region, RegistrationReport, ScreenPoint, Viewer,
    bootstrap,
};
use scene::camera::Viewport;
use scene::components::Shape3D;
use streaming::{IonClient, Residency, StaticAssetService};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Headless building viewer: loads tilesets from Cesium ion and replays clicks"
)]
struct Args {
    /// Viewer configuration (JSON). Defaults to the bundled demo.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Cesium ion access token (overrides CESIUM_ION_ACCESS_TOKEN)
    #[arg(long)]
    token: Option<String>,

    /// Max number of tileset fetches in flight
    #[arg(long)]
    parallelism: Option<usize>,

    /// Resolve every asset locally instead of calling Cesium ion
    #[arg(long)]
    offline: bool,

    /// Click at pixel X,Y once loading is done (repeatable)
    #[arg(long = "click", value_parser = parse_point)]
    clicks: Vec<ScreenPoint>,

    #[arg(long, default_value_t = 1280.0)]
    width: f64,

    #[arg(long, default_value_t = 720.0)]
    height: f64,
}

fn parse_point(s: &str) -> Result<ScreenPoint, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got {s:?}"))?;
    let x = x.trim().parse::<f64>().map_err(|e| format!("bad X: {e}"))?;
    let y = y.trim().parse::<f64>().map_err(|e| format!("bad Y: {e}"))?;
    Ok(ScreenPoint::new(x, y))
}

fn load_config(args: &Args) -> Result<ViewerConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => ViewerConfig::from_path(path)?,
        None => ViewerConfig::default_demo(),
    };
    config.apply_env();
    if let Some(token) = &args.token {
        config.access_token = Some(token.clone());
    }
    if let Some(n) = args.parallelism {
        config.parallelism = n;
    }
    config.validate()?;
    Ok(config)
}

fn describe(residency: &Residency) -> String {
    match residency {
        Residency::Failed(err) => format!("failed ({err})"),
        other => format!("{other:?}").to_lowercase(),
    }
}

async fn run(args: Args) -> Result<RegistrationReport, Box<dyn std::error::Error>> {
    let config = load_config(&args)?;
    let engine = HeadlessEngine::new(Viewport::new(args.width, args.height))
        .with_billboard_pick_size(config.billboard_pick_size_m);
    let viewer = RefCell::new(Viewer::new(engine, MemorySurface::full(), &config));

    let report = if args.offline {
        let service = StaticAssetService::offline(config.asset_ids());
        bootstrap(&viewer, &service, &config).await
    } else {
        let token = config.require_access_token()?;
        let service = IonClient::new(config.ion_api_url.as_str(), token)
            .with_probe_tileset(config.probe_tileset);
        bootstrap(&viewer, &service, &config).await
    };

    if let Some(base) = &report.base {
        println!("base tileset: {}", describe(base));
    }
    for b in &report.buildings {
        println!(
            "{} [{}]: {} volume={:?} icons={}",
            b.name,
            b.asset_id,
            describe(&b.residency),
            b.volume.map(|v| v.0),
            b.icons
        );
    }

    let mut v = viewer.borrow_mut();
    for (entity, transform, drawable) in v.engine.world().drawables_3d() {
        let kind = match drawable.shape {
            Shape3D::Box { .. } => "volume",
            Shape3D::Billboard { .. } => "marker",
        };
        match v.engine.project(transform.position) {
            Some(p) => println!("{kind} #{} at {:.0},{:.0}", entity.index(), p.x, p.y),
            None => println!("{kind} #{} behind camera", entity.index()),
        }
    }
    if let Some(readout) = v.camera_settled() {
        info!(
            lon = readout.geographic.lon_deg,
            lat = readout.geographic.lat_deg,
            height = readout.geographic.height_m,
            "camera"
        );
    }

    for point in args.clicks {
        let outcome = v.click(point);
        let line = match &outcome {
            PickOutcome::Volume { volume, url } => format!("volume {} -> {url}", volume.0),
            PickOutcome::Icon { kind, url } => format!("icon {kind} -> {url}"),
            PickOutcome::NoOverlay { url } => format!("no overlay region for {url}"),
            PickOutcome::Miss => "miss".to_string(),
            PickOutcome::Inactive => "ignored".to_string(),
        };
        println!("click {},{}: {line}", point.x, point.y);
    }

    let status = v
        .surface
        .content(Region::LoadingOverlay)
        .filter(|_| v.surface.is_visible(Region::LoadingOverlay));
    if let Some(status) = status {
        println!("status: {status}");
    }
    Ok(report)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    match run(args).await {
        Ok(report) if report.failed_count() == 0 => ExitCode::SUCCESS,
        Ok(report) => {
            error!(failed = report.failed_count(), "some buildings failed to load");
            ExitCode::from(2)
        }
        Err(err) => {
            error!(%err, "viewer failed");
            ExitCode::FAILURE
        }
    }
}
