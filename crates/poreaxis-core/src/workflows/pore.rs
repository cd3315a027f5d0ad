use crate::core::models::atom::AtomSphere;
use crate::core::models::path_point::RawPath;
use crate::core::path::MolecularPath;
use crate::core::spatial::{KdTreeNeighborSearch, NeighborSearch};
use crate::engine::config::{ConfigError, MolecularPathConfig, PathFindingConfig};
use crate::engine::error::EngineError;
use crate::engine::path_finding::build_path_finder;
use crate::engine::progress::{Progress, ProgressReporter};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone)]
pub struct PoreResult {
    /// Support points as produced by the path finder.
    pub raw_path: RawPath,
    /// The continuous centre line and radius profile.
    pub path: MolecularPath,
    /// Neighbour search radius used for this frame.
    pub neighbor_cutoff: f64,
}

/// Analyses the pore in a single frame.
///
/// # Arguments
///
/// * `atoms` - The frame's atom spheres.
/// * `path_finding` - Strategy and tunables of the path finder.
/// * `molecular_path` - Settings of the fitted curve.
/// * `reporter` - Receives phase events.
///
/// # Return
///
/// The raw support points and the fitted path.
///
/// # Errors
///
/// Returns [`EngineError::Config`] for an invalid configuration or frame,
/// and a recoverable error if the frame does not admit a path of at least two
/// points.
#[instrument(skip_all, name = "pore_workflow")]
pub fn run(
    atoms: &[AtomSphere],
    path_finding: &PathFindingConfig,
    molecular_path: &MolecularPathConfig,
    reporter: &ProgressReporter,
) -> Result<PoreResult, EngineError> {
    path_finding.validate()?;
    molecular_path.validate()?;

    let index = reporter.phase("Preparation", || {
        validate_frame(atoms)?;
        info!(atoms = atoms.len(), "Building neighbour index.");
        Ok::<_, EngineError>(KdTreeNeighborSearch::new(atoms.to_vec()))
    })?;

    let result = run_with_index(&index, path_finding, molecular_path, reporter)?;
    info!(
        points = result.raw_path.len(),
        length = result.path.length(),
        "Pore workflow complete."
    );
    Ok(result)
}

/// Analyses the pore in a frame behind an arbitrary neighbour index.
///
/// Errors of the index are returned as [`EngineError::NeighborSearch`] with the
/// original error as source.
pub fn run_with_index<N: NeighborSearch>(
    index: &N,
    path_finding: &PathFindingConfig,
    molecular_path: &MolecularPathConfig,
    reporter: &ProgressReporter,
) -> Result<PoreResult, EngineError> {
    let neighbor_cutoff = path_finding.resolve_neighbor_cutoff(index.max_radius());

    let raw_path = reporter.phase("Path Finding", || {
        info!(
            method = %path_finding.method,
            neighbor_cutoff,
            "Marching through the pore."
        );
        build_path_finder(path_finding, index)?.find_path()
    })?;

    let path = reporter.phase("Curve Fitting", || {
        info!(points = raw_path.len(), "Fitting centre line and radius profile.");
        MolecularPath::new(&raw_path, molecular_path.extrapolation_distance)
    })?;

    Ok(PoreResult {
        raw_path,
        path,
        neighbor_cutoff,
    })
}

/// Analyses every frame of a trajectory independently.
///
/// Frames are processed in parallel when the `parallel` feature is enabled. The
/// results keep the order of `frames`, and a failing frame does not affect the
/// others.
///
/// # Errors
///
/// An invalid configuration is reported once, before any frame is processed.
#[instrument(skip_all, name = "trajectory_workflow", fields(frames = frames.len()))]
pub fn run_trajectory(
    frames: &[Vec<AtomSphere>],
    path_finding: &PathFindingConfig,
    molecular_path: &MolecularPathConfig,
    reporter: &ProgressReporter,
) -> Result<Vec<Result<PoreResult, EngineError>>, EngineError> {
    path_finding.validate()?;
    molecular_path.validate()?;

    reporter.report(Progress::ScanStart {
        total_frames: frames.len() as u64,
    });

    let analyse = |(frame_index, atoms): (usize, &Vec<AtomSphere>)| {
        let result = run(atoms, path_finding, molecular_path, &ProgressReporter::new());
        if let Err(e) = &result {
            warn!(frame = frame_index, error = %e, "Frame analysis failed.");
        }
        reporter.report(Progress::FrameDone {
            index: frame_index,
            succeeded: result.is_ok(),
        });
        result
    };

    #[cfg(feature = "parallel")]
    let results: Vec<_> = frames.par_iter().enumerate().map(analyse).collect();
    #[cfg(not(feature = "parallel"))]
    let results: Vec<_> = frames.iter().enumerate().map(analyse).collect();

    reporter.report(Progress::ScanFinish);

    let succeeded = results.iter().filter(|r| r.is_ok()).count();
    info!(
        succeeded,
        failed = results.len() - succeeded,
        "Trajectory scan complete."
    );
    Ok(results)
}

fn validate_frame(atoms: &[AtomSphere]) -> Result<(), ConfigError> {
    match atoms.iter().position(|atom| !atom.is_valid()) {
        Some(index) => Err(ConfigError::InvalidParameter {
            name: "atoms",
            reason: format!(
                "atom {} has a non-finite position or a negative radius ({})",
                index, atoms[index].radius
            ),
        }),
        None => Ok(()),
    }
}
