use infill::*;
use std::path::PathBuf;
use structopt::StructOpt;
use tracing_subscriber::EnvFilter;

/// Infill -- placement of infill balise groups under a temporary speed restriction
#[derive(StructOpt, Debug)]
#[structopt(name="infill")]
struct Opt {
    /// Verbose mode (-v, -vv)
    #[structopt(short = "v", long = "verbose", parse(from_occurrences))]
    verbose: u8,

    /// Parameter file (JSON)
    #[structopt(parse(from_os_str))]
    parameters: PathBuf,

    /// Output JSON result file
    #[structopt(short = "j", long = "json", parse(from_os_str))]
    json: Option<PathBuf>,

    /// Include the scenario trajectories in the JSON result
    #[structopt(short = "T", long = "with-trajectories")]
    with_trajectories: bool,

    /// Output markant points of the scenario trajectories to file
    #[structopt(short = "t", long = "trajectories", parse(from_os_str))]
    trajectories: Option<PathBuf>,

    /// Output loss surface (three infill balise groups only) to file
    #[structopt(short = "s", long = "surface", parse(from_os_str))]
    surface: Option<PathBuf>,
}

fn init_logging(verbose: u8) -> AppResult<()> {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    // Records of the `log` facade are forwarded to the subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| failure::err_msg(format!("{}", e)))?;
    Ok(())
}

fn write_string(path: &PathBuf, string: &str) -> AppResult<()> {
    use std::fs::File;
    use std::io::{BufWriter, Write};
    let file = File::create(path)?;
    let mut writer = BufWriter::new(&file);
    write!(writer, "{}", string)?;
    Ok(())
}

fn run(opt :&Opt) -> AppResult<()> {
    let tic = std::time::Instant::now();

    let params = get_parameters(&opt.parameters)?;
    let placement = plan(&params)?;

    if let Some(ref json) = opt.json {
        use std::fs::File;
        use std::io::BufWriter;
        let file = File::create(json)?;
        let mut writer = BufWriter::new(&file);
        output::json::json_results(&params, &placement, opt.with_trajectories, &mut writer)?;
    }

    if let Some(ref trajectories) = opt.trajectories {
        write_string(trajectories, &output::text::markant_points(&placement)?)?;
    }

    if let Some(ref surface) = opt.surface {
        match placement.loss_surface {
            Some(ref s) => {
                write_string(surface, &output::text::loss_surface(s)?)?;
                if let Some(((outer, inner), loss)) = s.min() {
                    log::info!("Loss surface: {} pairs, minimum {:.2} s at {} m & {} m",
                               s.len(), loss, inner, outer);
                }
            },
            None => log::warn!("No loss surface computed for {} balise groups",
                               params.track.balises),
        }
    }

    log::info!("Duration: {:.2} s", tic.elapsed().as_secs_f64());
    Ok(())
}

pub fn main() {
    let opt = Opt::from_args();
    if let Err(e) = init_logging(opt.verbose) {
        println!("Error:\n{}", e.as_fail());
        std::process::exit(1);
    }
    log::debug!("{:?}", opt);
    match run(&opt) {
        Ok(()) => {},
        Err(e) => {
            println!("Error:\n{}", e.as_fail());
            std::process::exit(1);
        },
    }
}
