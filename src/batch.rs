//! Batch generation
//!
//! Expands a [`Config`] into one job per printer/filament combination and
//! writes each calibration file. Jobs share only immutable profile data, so
//! they can run on the rayon thread pool. A failed job never stops the
//! others.

use pacal_camtools::{
    CamToolError, CamToolResult, CylinderParameters, PressureAdvanceCylinderGenerator,
};
use pacal_core::{FilamentProfile, PrinterProfile, ProfileCatalog, ProfileError};
use pacal_settings::Config;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// One G-code file to generate
#[derive(Debug, Clone)]
pub struct GenerationJob {
    pub printer: PrinterProfile,
    pub filament: FilamentProfile,
    /// `<output>/<printer>/<prefix>-<filament>.gcode`
    pub path: PathBuf,
}

/// Result of a single job
#[derive(Debug)]
pub struct JobOutcome {
    pub printer: String,
    pub filament: String,
    pub path: PathBuf,
    pub result: CamToolResult<()>,
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Outcome of a batch run, in job order
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<JobOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// True when every job wrote its file
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &JobOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }
}

/// Plan one job per selected printer and filament
///
/// Empty filters select every profile. Selected profiles keep catalog order
/// and a name given twice is only planned once.
///
/// # Errors
/// Returns [`ProfileError::NotFound`] for a filter naming no profile.
pub fn plan_jobs(
    config: &Config,
    printer_filter: &[String],
    filament_filter: &[String],
) -> Result<Vec<GenerationJob>, ProfileError> {
    let catalog = config.catalog();
    let printers = select(&catalog.printers, printer_filter, |n| catalog.printer(n))?;
    let filaments = select(&catalog.filaments, filament_filter, |n| catalog.filament(n))?;

    let jobs: Vec<GenerationJob> = printers
        .iter()
        .flat_map(|printer| {
            filaments.iter().map(move |filament| GenerationJob {
                printer: (*printer).clone(),
                filament: (*filament).clone(),
                path: config.output_path(&printer.name, filament.name()),
            })
        })
        .collect();

    tracing::debug!(jobs = jobs.len(), "Planned generation jobs");
    Ok(jobs)
}

/// Profiles named by `filter`, in catalog order
fn select<'a, T>(
    profiles: &'a [T],
    filter: &[String],
    lookup: impl Fn(&str) -> Result<&'a T, ProfileError>,
) -> Result<Vec<&'a T>, ProfileError> {
    if filter.is_empty() {
        return Ok(profiles.iter().collect());
    }
    let wanted = filter
        .iter()
        .map(|name| lookup(name.as_str()))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(profiles
        .iter()
        .filter(|p| wanted.iter().any(|w| std::ptr::eq(*w, *p)))
        .collect())
}

/// Generate one file, creating the printer directory when missing
///
/// Profiles are validated before anything is created on disk.
pub fn run_job(job: &GenerationJob, cylinder: &CylinderParameters) -> CamToolResult<()> {
    let generator = PressureAdvanceCylinderGenerator::new(
        cylinder.clone(),
        job.printer.clone(),
        job.filament.clone(),
    );
    generator.validate()?;

    if let Some(dir) = job.path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    generator.write_to_file(&job.path)
}

/// Run every job and collect the outcomes
pub fn run_all(config: &Config, jobs: &[GenerationJob], parallel: bool) -> BatchReport {
    let run = |job: &GenerationJob| {
        let result = run_job(job, &config.cylinder);
        log_outcome(&job.path, &result);
        JobOutcome {
            printer: job.printer.name.clone(),
            filament: job.filament.name().to_string(),
            path: job.path.clone(),
            result,
        }
    };

    let outcomes = if parallel {
        jobs.par_iter().map(run).collect()
    } else {
        jobs.iter().map(run).collect()
    };

    let report = BatchReport { outcomes };
    info!(
        succeeded = report.succeeded(),
        failed = report.failed(),
        "Batch finished"
    );
    report
}

fn log_outcome(path: &Path, result: &Result<(), CamToolError>) {
    match result {
        Ok(()) => info!(path = %path.display(), "Generated"),
        Err(e) => error!(path = %path.display(), error = %e, "Generation failed"),
    }
}

/// Human readable listing of the catalog
pub fn catalog_summary(catalog: &ProfileCatalog) -> String {
    let mut out = String::from("Printers:\n");
    for p in &catalog.printers {
        let kind = if p.geometry.is_delta() {
            "delta"
        } else {
            "cartesian"
        };
        out.push_str(&format!(
            "  {:<12} {:<9} nozzle {:.2} mm, PA {:.3}..{:.3}\n",
            p.name, kind, p.nozzle_diameter, p.pa_min, p.pa_max
        ));
    }
    out.push_str("Filaments:\n");
    for f in &catalog.filaments {
        out.push_str(&format!(
            "  {:<12} {:.2} mm, {} C / {} C bed\n",
            f.name(),
            f.diameter(),
            f.hotend_temp(),
            f.bed_temp()
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn small_config(dir: &Path) -> Config {
        Config {
            output_directory: dir.to_path_buf(),
            cylinder: CylinderParameters {
                radius: 10.0,
                segments: 16,
                layers: 4,
                brims: 1,
            },
            ..Default::default()
        }
    }

    fn names(filter: &[&str]) -> Vec<String> {
        filter.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_plan_all_combinations() {
        let config = Config::new();
        let jobs = plan_jobs(&config, &[], &[]).unwrap();
        let planned: Vec<(String, String)> = jobs
            .iter()
            .map(|j| (j.printer.name.clone(), j.filament.name().to_string()))
            .collect();
        assert_eq!(
            planned,
            vec![
                ("HEvo".to_string(), "PLA".to_string()),
                ("HEvo".to_string(), "PETG".to_string()),
                ("P3Steel".to_string(), "PLA".to_string()),
                ("P3Steel".to_string(), "PETG".to_string()),
            ]
        );
        assert_eq!(
            jobs[1].path,
            Path::new(".").join("HEvo").join("pa_cal-PETG.gcode")
        );
    }

    #[test]
    fn test_plan_with_filters() {
        let config = Config::new();
        let jobs =
            plan_jobs(&config, &names(&["p3steel", "P3STEEL"]), &names(&["petg"])).unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].printer.name, "P3Steel");
        assert_eq!(jobs[0].filament.name(), "PETG");
    }

    #[test]
    fn test_plan_unknown_filter() {
        let config = Config::new();
        let err = plan_jobs(&config, &names(&["Prusa"]), &[]).unwrap_err();
        assert_eq!(err.to_string(), "Unknown printer profile: Prusa");
    }

    #[test]
    fn test_run_all_writes_tree() {
        let dir = tempdir().unwrap();
        let config = small_config(dir.path());
        let jobs = plan_jobs(&config, &[], &[]).unwrap();

        let report = run_all(&config, &jobs, true);
        assert!(report.is_success());
        assert_eq!(report.succeeded(), 4);

        for (printer, filament) in [("HEvo", "PLA"), ("HEvo", "PETG"), ("P3Steel", "PLA")] {
            let path = dir
                .path()
                .join(printer)
                .join(format!("pa_cal-{}.gcode", filament));
            let gcode = std::fs::read_to_string(&path).unwrap();
            assert!(gcode.starts_with("; Pressure advance calibration cylinder"));
            assert!(gcode.contains(&format!("; For printer: {} ", printer)));
        }
    }

    #[test]
    fn test_failed_job_does_not_stop_others() {
        let dir = tempdir().unwrap();
        let config = small_config(dir.path());
        // A plain file where the HEvo directory should go
        std::fs::write(dir.path().join("HEvo"), "").unwrap();

        let jobs = plan_jobs(&config, &[], &[]).unwrap();
        let report = run_all(&config, &jobs, false);

        assert_eq!(report.failed(), 2);
        assert_eq!(report.succeeded(), 2);
        assert!(report.failures().all(|o| o.printer == "HEvo"));
        assert!(dir.path().join("P3Steel").join("pa_cal-PETG.gcode").exists());
    }

    #[test]
    fn test_profile_name_cannot_leave_output_directory() {
        let dir = tempdir().unwrap();
        let mut config = small_config(&dir.path().join("out"));
        config.printers[0].name = "../escaped".to_string();
        assert!(config.validate().is_err());

        let jobs = plan_jobs(&config, &[], &[]).unwrap();
        let report = run_all(&config, &jobs, false);

        assert_eq!(report.failed(), 2);
        assert!(report
            .failures()
            .all(|o| o.result.as_ref().is_err_and(|e| e.is_configuration_error())));
        assert!(!dir.path().join("escaped").exists());
        assert!(dir.path().join("out").join("P3Steel").join("pa_cal-PLA.gcode").exists());
    }

    #[test]
    fn test_catalog_summary() {
        let summary = catalog_summary(&ProfileCatalog::builtin());
        assert!(summary.starts_with("Printers:\n"));
        assert!(summary.contains("HEvo"));
        assert!(summary.contains("cartesian"));
        assert!(summary.contains("Filaments:\n"));
        assert!(summary.contains("PETG         1.75 mm, 260 C / 90 C bed"));
    }
}
