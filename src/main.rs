use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use glam::DVec3;
use nalgebra::DMatrix;
use tracing::{info, warn, Level};

use vfrom_rs::config::CaseConfig;
use vfrom_rs::discretization::generator::create_flat_mesh;
use vfrom_rs::discretization::{Mesh, MeshTopology};
use vfrom_rs::fields::assign::{assign_one, set_box_to_value};
use vfrom_rs::fields::{FieldSet, ScalarField};
use vfrom_rs::numerics::timing::{finalize_and_log, reset_timing};
use vfrom_rs::numerics::{
    h1_seminorm, list_errors, mass_matrix, orthonormalize, project_orthogonal, stencil,
    stencil_pair, unvectorize_columns, vectorize_fields, GalerkinProjector, RandomSampler,
    Tolerances,
};
use vfrom_rs::processing::csv_writer;
use vfrom_rs::processing::summary::ReductionSummary;

/// Snapshot vectorisation, projection and error evaluation on finite-volume meshes
#[derive(Parser)]
#[command(name = "vfrom")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about, long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// JSON case file; defaults are used when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sample snapshots, build a basis and evaluate the projection
    Run(RunArgs),
    /// Print the stencil around one or two cells
    Stencil(StencilArgs),
    /// Print mesh statistics
    Info,
}

#[derive(Args)]
struct RunArgs {
    /// Overrides the sampling seed of the case file
    #[arg(long)]
    seed: Option<u64>,

    /// Overrides the output directory of the case file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct StencilArgs {
    /// Seed cell id
    cell: usize,

    /// Optional second seed cell id
    #[arg(long)]
    second: Option<usize>,

    /// Number of neighbour layers
    #[arg(short = 'n', long, default_value_t = 1, allow_negative_numbers = true)]
    layers: i32,

    /// Write the stencil as an indicator field to this CSV file
    #[arg(long)]
    indicator: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    let config = match &cli.config {
        Some(path) => CaseConfig::from_file(path)
            .with_context(|| format!("loading case {}", path.display()))?,
        None => CaseConfig::default(),
    };

    match cli.command {
        Commands::Run(args) => run(config, args),
        Commands::Stencil(args) => print_stencil(&config, args),
        Commands::Info => {
            let mesh = build_mesh(&config);
            ReductionSummary::from_mesh(&mesh).print_to_console();
            Ok(())
        }
    }
}

fn build_mesh(config: &CaseConfig) -> Mesh {
    let m = &config.mesh;
    let mesh = create_flat_mesh(m.width, m.cells[0], m.cells[1], m.thickness);
    info!(
        "mesh: {}x{} cells, {} faces",
        m.cells[0],
        m.cells[1],
        mesh.faces.len()
    );
    mesh
}

/// Temperature-like snapshots of a blocked domain: every parameter scales a
/// smooth bump centred in its own block, so all snapshots live in a space
/// of dimension `params.ncols()`.
fn block_snapshots(mesh: &Mesh, width: [f64; 2], params: &DMatrix<f64>) -> FieldSet<f64> {
    let blocks = params.ncols();
    let columns = (blocks as f64).sqrt().ceil() as usize;
    let rows = blocks.div_ceil(columns);
    let centres: Vec<DVec3> = (0..blocks)
        .map(|b| {
            DVec3::new(
                width[0] * ((b % columns) as f64 + 0.5) / columns as f64,
                width[1] * ((b / columns) as f64 + 0.5) / rows as f64,
                0.0,
            )
        })
        .collect();
    let sigma2 = (width[0] / columns as f64).powi(2) * 0.25;

    params
        .row_iter()
        .enumerate()
        .map(|(i, mu)| {
            ScalarField::from_fn(format!("T{i}"), mesh, |_, x| {
                let x = DVec3::new(x.x, x.y, 0.0);
                centres
                    .iter()
                    .zip(mu.iter())
                    .map(|(c, m)| m * (-(x - *c).length_squared() / sigma2).exp())
                    .sum()
            })
        })
        .collect()
}

fn run(mut config: CaseConfig, args: RunArgs) -> anyhow::Result<()> {
    if let Some(seed) = args.seed {
        config.sampling.seed = Some(seed);
    }
    if let Some(dir) = args.output {
        config.output.dir = dir;
    }
    let out = config.output.dir.clone();
    fs::create_dir_all(&out).with_context(|| format!("creating {}", out.display()))?;
    reset_timing();

    let mesh = build_mesh(&config);
    let mut summary = ReductionSummary::from_mesh(&mesh);

    let mut sampler = match config.sampling.seed {
        Some(seed) => RandomSampler::seeded(seed),
        None => RandomSampler::from_entropy(),
    };
    let bounds = DMatrix::from_fn(2, config.sampling.bounds.len(), |i, j| {
        config.sampling.bounds[j][i]
    });
    let params = sampler.uniform_columns(config.sampling.num_snapshots, &bounds)?;
    csv_writer::write_matrix(out.join("parameters.csv"), "mu", &params.transpose())?;

    let snapshots = block_snapshots(&mesh, config.mesh.width, &params);
    let modes = snapshots.truncated(config.num_modes);
    info!(
        "{} snapshots, {} modes, {} dofs",
        snapshots.len(),
        modes.len(),
        mesh.num_cells()
    );
    if modes.len() < params.ncols() {
        warn!(
            "{} modes cannot span {} parameters; expect non-zero projection errors",
            modes.len(),
            params.ncols()
        );
    }

    let mass = mass_matrix(&modes, &mesh)?;
    summary.add_mass_info(snapshots.len(), &mass);
    csv_writer::write_matrix(out.join("mass.csv"), "m", &mass)?;

    let projector = GalerkinProjector::new(&modes, &mesh)?;
    let coeffs = projector.coefficients(&snapshots)?;
    let reconstructed = projector.reconstruct_fields("T_rec", &mesh, &coeffs)?;
    let errors = list_errors(&snapshots, &reconstructed, &mesh)?;
    summary.add_projection_errors(&errors);
    csv_writer::write_matrix(out.join("coefficients.csv"), "s", &coeffs)?;
    csv_writer::write_single_column(out.join("errors.csv"), "rel_l2", errors.as_slice())?;

    let ortho = orthonormalize(&modes, &mesh, &Tolerances::default())?;
    let ortho_coeffs = project_orthogonal(&snapshots, &ortho, &mesh)?;
    let ortho_rec: FieldSet<f64> =
        unvectorize_columns("T_orth", &mesh, &(vectorize_fields(&ortho)? * &ortho_coeffs))?;
    let ortho_errors = list_errors(&snapshots, &ortho_rec, &mesh)?;
    summary.add_orthogonal_errors(&ortho_errors);
    csv_writer::write_matrix(out.join("coefficients_ortho.csv"), "s", &ortho_coeffs)?;

    let seminorms = snapshots
        .iter()
        .map(|s| h1_seminorm(s, &mesh))
        .collect::<Result<Vec<f64>, _>>()?;
    summary.add_h1_info(&seminorms);

    if config.output.write_fields {
        let mut source = ScalarField::zeros("S", &mesh);
        let [lo, hi] = config.source.corners;
        let painted = set_box_to_value(
            &mut source,
            &mesh,
            [DVec3::from_array(lo), DVec3::from_array(hi)],
            config.source.value,
        )?;
        info!("source region covers {painted} cells");
        csv_writer::write_field(out.join("source.csv"), &source, &mesh)?;
        csv_writer::write_field(out.join("snapshot0.csv"), &snapshots[0], &mesh)?;
        csv_writer::write_field(out.join("reconstruction0.csv"), &reconstructed[0], &mesh)?;
    }

    finalize_and_log();
    summary.write_to_file(out.join("summary.txt"))?;
    summary.print_to_console();
    info!("results written to {}", out.display());
    Ok(())
}

fn print_stencil(config: &CaseConfig, args: StencilArgs) -> anyhow::Result<()> {
    let mesh = build_mesh(config);
    let cells = match args.second {
        Some(second) => stencil_pair(&mesh, args.cell, second, args.layers)?,
        None => stencil(&mesh, args.cell, args.layers)?,
    };
    println!(
        "{}",
        cells
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    );

    if let Some(path) = args.indicator {
        let mut indicator = ScalarField::zeros("stencil", &mesh);
        assign_one(&mut indicator, &cells)?;
        csv_writer::write_field(&path, &indicator, &mesh)?;
        info!("indicator written to {}", path.display());
    }
    Ok(())
}
